//! Translation: backends behind one trait, plus sentence-aware chunking.
//!
//! A failed translation is never fatal. [`TranslationService::translate`]
//! returns the original text on any backend error and counts the failure
//! so the run report can mention it.
//!
//! ## Chunking
//!
//! Free translation endpoints reject long requests (the Google endpoint
//! caps at 5 000 characters). Text longer than the chunk limit is split
//! after sentence terminators (`.`, `!`, `?` followed by whitespace) and
//! the sentences are packed greedily into chunks. A single sentence longer
//! than the limit is cut at the last whitespace before the limit.

use crate::content::Language;
use crate::error::TranslateError;
use crate::prompts::{translation_request, TRANSLATION_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default chunk size in characters.
pub const CHUNK_LIMIT: usize = 4500;

const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

// ── Backends ─────────────────────────────────────────────────────────────

/// A translation backend.
///
/// `source` of `None` asks the backend to detect the language.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Short backend name for logs and reports.
    fn name(&self) -> &str;

    async fn translate(
        &self,
        text: &str,
        source: Option<Language>,
        target: Language,
    ) -> Result<String, TranslateError>;
}

/// Identity backend, used when translation is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    fn name(&self) -> &str {
        "none"
    }

    async fn translate(
        &self,
        text: &str,
        _source: Option<Language>,
        _target: Language,
    ) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}

/// The free Google Translate web endpoint (`translate_a/single`, `client=gtx`).
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(timeout_secs: u64) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TranslateError::Request {
                detail: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: GOOGLE_ENDPOINT.to_string(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(
        &self,
        text: &str,
        source: Option<Language>,
        target: Language,
    ) -> Result<String, TranslateError> {
        let sl = source.map_or("auto", Language::code);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", sl),
                ("tl", target.code()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await
            .map_err(|e| TranslateError::Request {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| TranslateError::Request {
            detail: e.to_string(),
        })?;
        parse_google_response(&body)
    }
}

/// Concatenate the translated segments `[0][i][0]` of a `translate_a/single`
/// response.
fn parse_google_response(body: &str) -> Result<String, TranslateError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| TranslateError::MalformedResponse {
            detail: e.to_string(),
        })?;
    let segments = value
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslateError::MalformedResponse {
            detail: "missing segment array".into(),
        })?;
    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|s| s.as_str()))
        .collect();
    if text.is_empty() {
        return Err(TranslateError::MalformedResponse {
            detail: "no translated segments".into(),
        });
    }
    Ok(text)
}

/// Translation through any `edgequake-llm` provider.
pub struct LlmTranslator {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl LlmTranslator {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            options: CompletionOptions {
                temperature: Some(0.1),
                max_tokens: Some(4096),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    fn name(&self) -> &str {
        "llm"
    }

    async fn translate(
        &self,
        text: &str,
        source: Option<Language>,
        target: Language,
    ) -> Result<String, TranslateError> {
        let messages = vec![
            ChatMessage::system(TRANSLATION_SYSTEM_PROMPT),
            ChatMessage::user(translation_request(text, source, target)),
        ];
        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| TranslateError::Provider {
                detail: e.to_string(),
            })?;
        debug!(
            "LLM translation: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        let out = response.content.trim();
        if out.is_empty() {
            return Err(TranslateError::MalformedResponse {
                detail: "empty completion".into(),
            });
        }
        Ok(out.to_string())
    }
}

// ── Service ──────────────────────────────────────────────────────────────

/// A backend bound to a language pair, with chunking and failure counting.
pub struct TranslationService {
    backend: Arc<dyn Translator>,
    source: Language,
    target: Language,
    chunk_limit: usize,
    timeout: Duration,
    failures: AtomicUsize,
}

impl TranslationService {
    pub fn new(backend: Arc<dyn Translator>, source: Language, target: Language) -> Self {
        Self {
            backend,
            source,
            target,
            chunk_limit: CHUNK_LIMIT,
            timeout: Duration::from_secs(30),
            failures: AtomicUsize::new(0),
        }
    }

    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = limit.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Number of texts that came back untranslated because of an error.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Translate `text`, or return it unchanged on failure.
    ///
    /// Whitespace-only text is returned as is without a backend call.
    pub async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let chunks = chunk_text(text, self.chunk_limit);
        if chunks.len() > 1 {
            debug!(
                "Translating {} chars in {} chunks",
                text.chars().count(),
                chunks.len()
            );
        }

        let mut out = String::with_capacity(text.len());
        for chunk in &chunks {
            match self.translate_chunk(chunk).await {
                Ok(t) => {
                    // Backends may trim; keep the chunk's own outer whitespace.
                    let core = chunk.trim();
                    let lead = &chunk[..chunk.len() - chunk.trim_start().len()];
                    let trail = &chunk[lead.len() + core.len()..];
                    out.push_str(lead);
                    out.push_str(t.trim());
                    out.push_str(trail);
                }
                Err(e) => {
                    warn!(
                        "{} translation failed, keeping original text: {}",
                        self.backend.name(),
                        e
                    );
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    return text.to_string();
                }
            }
        }
        out
    }

    async fn translate_chunk(&self, chunk: &str) -> Result<String, TranslateError> {
        let call = self
            .backend
            .translate(chunk, Some(self.source), self.target);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(TranslateError::Request {
                detail: format!("timed out after {}s", self.timeout.as_secs()),
            }),
        }
    }
}

// ── Chunking ─────────────────────────────────────────────────────────────

static RE_SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Split after each sentence terminator; the terminator and the following
/// whitespace stay with the preceding sentence. Concatenating the pieces
/// gives back `text`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in RE_SENTENCE_END.find_iter(text) {
        pieces.push(&text[last..m.end()]);
        last = m.end();
    }
    if last < text.len() {
        pieces.push(&text[last..]);
    }
    pieces
}

/// Pack sentences into chunks of at most `limit` characters.
///
/// Text of at most `limit` characters is a single chunk.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        let len = sentence.chars().count();
        if len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.extend(hard_split(sentence, limit).into_iter().map(str::to_string));
        } else if current_len + len > limit {
            chunks.push(std::mem::replace(&mut current, sentence.to_string()));
            current_len = len;
        } else {
            current.push_str(sentence);
            current_len += len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Cut an over-long sentence at the last whitespace before `limit`
/// characters, or at `limit` itself when there is none.
fn hard_split(mut s: &str, limit: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    while s.chars().count() > limit {
        let cut = s
            .char_indices()
            .nth(limit)
            .map_or(s.len(), |(i, _)| i);
        let head = &s[..cut];
        let at = match head.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
            Some((i, c)) if i > 0 => i + c.len_utf8(),
            _ => cut,
        };
        pieces.push(&s[..at]);
        s = &s[at..];
    }
    if !s.is_empty() {
        pieces.push(s);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every chunk it receives and answers with it upper-cased.
    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Translator for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn translate(
            &self,
            text: &str,
            _source: Option<Language>,
            _target: Language,
        ) -> Result<String, TranslateError> {
            self.calls.lock().unwrap().push(text.to_string());
            Ok(text.to_uppercase())
        }
    }

    struct Failing;

    #[async_trait]
    impl Translator for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn translate(
            &self,
            _text: &str,
            _source: Option<Language>,
            _target: Language,
        ) -> Result<String, TranslateError> {
            Err(TranslateError::Http { status: 429 })
        }
    }

    /// Echoes each chunk without its surrounding whitespace.
    struct Trimming;

    #[async_trait]
    impl Translator for Trimming {
        fn name(&self) -> &str {
            "trimming"
        }

        async fn translate(
            &self,
            text: &str,
            _source: Option<Language>,
            _target: Language,
        ) -> Result<String, TranslateError> {
            Ok(text.trim().to_string())
        }
    }

    fn service(backend: Arc<dyn Translator>) -> TranslationService {
        TranslationService::new(backend, Language::Swedish, Language::English)
    }

    #[test]
    fn sentences_keep_their_terminators() {
        let pieces = split_sentences("Ett. Två! Tre? Fyra");
        assert_eq!(pieces, vec!["Ett. ", "Två! ", "Tre? ", "Fyra"]);
        assert_eq!(pieces.concat(), "Ett. Två! Tre? Fyra");
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("Kort text. Två meningar.", 100).len(), 1);
    }

    #[test]
    fn chunks_respect_limit_and_sentence_boundaries() {
        let text = "Aaaa aaaa. Bbbb bbbb. Cccc cccc. Dddd dddd.";
        let chunks = chunk_text(text, 22);
        assert_eq!(chunks, vec!["Aaaa aaaa. Bbbb bbbb. ", "Cccc cccc. Dddd dddd."]);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 22));
    }

    #[test]
    fn long_sentence_is_split_at_whitespace() {
        let text = "alpha beta gamma delta epsilon";
        let chunks = chunk_text(text, 12);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
        assert_eq!(chunks[0], "alpha beta ");
    }

    #[test]
    fn chunk_limit_counts_characters() {
        let text = "åäö åäö. ÅÄÖ ÅÄÖ.";
        assert_eq!(chunk_text(text, text.chars().count()).len(), 1);
    }

    #[test]
    fn google_response_segments_are_joined() {
        let body = r#"[[["Hello. ","Hej. ",null,null,10],["World","Världen",null,null,10]],null,"sv"]"#;
        assert_eq!(parse_google_response(body).unwrap(), "Hello. World");
    }

    #[test]
    fn google_response_garbage_is_malformed() {
        assert!(matches!(
            parse_google_response("<html>quota</html>"),
            Err(TranslateError::MalformedResponse { .. })
        ));
        assert!(matches!(
            parse_google_response("[null]"),
            Err(TranslateError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn under_limit_makes_exactly_one_call() {
        let backend = Arc::new(Recording::default());
        let svc = service(backend.clone());
        let out = svc.translate("Hej världen. Allt väl.").await;
        assert_eq!(out, "HEJ VÄRLDEN. ALLT VÄL.");
        assert_eq!(backend.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn over_limit_concatenates_chunk_translations() {
        let backend = Arc::new(Recording::default());
        let svc = service(backend.clone()).with_chunk_limit(22);
        let text = "Aaaa aaaa. Bbbb bbbb. Cccc cccc. Dddd dddd.";
        let out = svc.translate(text).await;
        assert_eq!(out, text.to_uppercase());
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.ends_with(". ") || c.ends_with('.')));
    }

    #[tokio::test]
    async fn failure_returns_input_and_is_counted() {
        let svc = service(Arc::new(Failing));
        assert_eq!(svc.translate("Hej").await, "Hej");
        assert_eq!(svc.translate("Då").await, "Då");
        assert_eq!(svc.failures(), 2);
    }

    #[tokio::test]
    async fn blank_text_skips_backend() {
        let backend = Arc::new(Recording::default());
        let svc = service(backend.clone());
        assert_eq!(svc.translate("  \n").await, "  \n");
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn noop_is_identity() {
        let svc = service(Arc::new(NoopTranslator));
        let out = tokio_test::block_on(svc.translate("Oförändrad text."));
        assert_eq!(out, "Oförändrad text.");
        assert_eq!(svc.backend_name(), "none");
    }

    #[tokio::test]
    async fn chunk_separators_survive_trimming_backend() {
        let text = "Aaaa aaaa. Bbbb bbbb. Cccc cccc. Dddd dddd.";
        let svc = service(Arc::new(Trimming)).with_chunk_limit(22);
        assert!(chunk_text(text, 22).len() > 1);
        assert_eq!(svc.translate(text).await, text);
        assert_eq!(svc.translate("  Ett. Två.\n").await, "  Ett. Två.\n");
    }
}
