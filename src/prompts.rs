//! Prompts for LLM-based translation.
//!
//! Kept in one place so the wording can be inspected by tests without a
//! provider. Only [`crate::pipeline::translate::LlmTranslator`] uses them.

use crate::content::Language;

/// System prompt for translating résumé text.
pub const TRANSLATION_SYSTEM_PROMPT: &str = r#"You are a professional translator specialising in résumés and technical career documents.

Rules:
1. Translate the user's text faithfully. Do not add, drop or summarise content.
2. Keep product names, company names, certifications and technology terms (VMware, Nutanix, Proxmox, ITIL, ISO 27001, …) unchanged.
3. Preserve line breaks and punctuation.
4. Use concise, professional business language.
5. Output ONLY the translated text. No quotes, no preamble, no explanations."#;

/// User message for one chunk.
///
/// When `source` is `None` the model is asked to detect the language.
pub fn translation_request(text: &str, source: Option<Language>, target: Language) -> String {
    match source {
        Some(src) => format!(
            "Translate the following text from {} to {}:\n\n{}",
            src.display_name(),
            target.display_name(),
            text
        ),
        None => format!(
            "Translate the following text to {}:\n\n{}",
            target.display_name(),
            text
        ),
    }
}
