//! Error types for the cvgen library.
//!
//! Two kinds of failure exist and they are kept apart:
//!
//! * [`CvError`]: **Fatal** for the unit of work it is returned from: the
//!   template cannot be read, the output cannot be written, the configuration
//!   is invalid. A fatal error while assembling one language aborts only that
//!   language; [`CvError::AllLanguagesFailed`] is raised when nothing at all
//!   was produced.
//!
//! * [`TranslateError`], [`AssetError`], [`LanguageError`]: **Non-fatal**.
//!   A failed translation falls back to the original text, a missing logo is
//!   skipped, a failed language is recorded in the
//!   [`crate::generate::GenerationReport`] while the other language proceeds.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors returned by the cvgen library.
#[derive(Debug, Error)]
pub enum CvError {
    // ── Template errors ───────────────────────────────────────────────────
    /// Template file was not found at the given path.
    #[error("Template not found: '{path}'\nPass --template <PATH> pointing at a .docx file.")]
    TemplateNotFound { path: PathBuf },

    /// Template exists but could not be read or is not a zip container.
    #[error("Template '{path}' is unreadable: {detail}")]
    TemplateUnreadable { path: PathBuf, detail: String },

    /// Template is a zip container but not a usable word-processing package.
    #[error("Invalid template package: {detail}")]
    InvalidTemplate { detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An image to embed could not be read or decoded.
    #[error("Image '{path}' is unreadable: {detail}")]
    ImageUnreadable { path: PathBuf, detail: String },

    /// Serialising the zip container failed.
    #[error("Failed to build document package: {0}")]
    PackageWrite(String),

    // ── Run-level errors ──────────────────────────────────────────────────
    /// Every selected language failed; no document was written.
    #[error("All {total} language runs failed.\nFirst error: {first_error}")]
    AllLanguagesFailed { total: usize, first_error: String },

    /// The LLM translation provider is not initialised (missing API key etc.).
    #[error("Translation provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A translation call failed. Callers substitute the original text.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum TranslateError {
    /// The request never produced a response (DNS, TLS, timeout …).
    #[error("translation request failed: {detail}")]
    Request { detail: String },

    /// The service answered with a non-success status (quota, 5xx …).
    #[error("translation service returned HTTP {status}")]
    Http { status: u16 },

    /// The response body did not have the expected shape.
    #[error("malformed translation response: {detail}")]
    MalformedResponse { detail: String },

    /// The LLM provider returned an error.
    #[error("LLM provider error: {detail}")]
    Provider { detail: String },
}

/// Resolving a company logo failed. The entry is rendered without a logo.
#[derive(Debug, Clone, Error)]
pub enum AssetError {
    /// Reading or writing the cache directory failed.
    #[error("logo cache I/O failed for '{path}': {detail}")]
    Io { path: PathBuf, detail: String },

    /// Fetching the logo page or the image itself failed.
    #[error("logo fetch from '{url}' failed: {detail}")]
    Fetch { url: String, detail: String },
}

/// A single language run failed; stored in the run report.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum LanguageError {
    /// Assembly of the document failed (template, output …).
    #[error("{language}: document generation failed: {detail}")]
    AssemblyFailed { language: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_languages_failed_display() {
        let e = CvError::AllLanguagesFailed {
            total: 2,
            first_error: "template missing".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("All 2 language runs failed"), "got: {msg}");
        assert!(msg.contains("template missing"));
    }

    #[test]
    fn template_not_found_mentions_flag() {
        let e = CvError::TemplateNotFound {
            path: PathBuf::from("/nope/cv.docx"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/nope/cv.docx"));
        assert!(msg.contains("--template"));
    }

    #[test]
    fn translate_http_display() {
        let e = TranslateError::Http { status: 429 };
        assert!(e.to_string().contains("429"));
    }

    #[test]
    fn language_error_display() {
        let e = LanguageError::AssemblyFailed {
            language: "sv".into(),
            detail: "disk full".into(),
        };
        assert_eq!(e.to_string(), "sv: document generation failed: disk full");
    }
}
