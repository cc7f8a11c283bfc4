//! Progress-callback trait for generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to follow a
//! run language by language and section by section.
//!
//! # Example
//!
//! ```rust
//! use cvgen::{GenerationConfig, GenerationProgressCallback, Language};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     sections: Arc<AtomicUsize>,
//! }
//!
//! impl GenerationProgressCallback for CountingCallback {
//!     fn on_section(&self, language: Language, section: &str) {
//!         self.sections.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}: {}", language, section);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     sections: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = GenerationConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::content::Language;
use std::path::Path;
use std::sync::Arc;

/// Called by the generator as it produces each document.
///
/// Languages are generated one after the other, so events never overlap.
/// All methods have default no-op implementations.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once before the first language.
    ///
    /// # Arguments
    /// * `total_languages`: number of documents that will be generated
    fn on_run_start(&self, total_languages: usize) {
        let _ = total_languages;
    }

    /// Called when assembly of one document begins.
    fn on_language_start(&self, language: Language) {
        let _ = language;
    }

    /// Called after each section has been appended to the document.
    ///
    /// # Arguments
    /// * `section`: section label as rendered, e.g. "WORK EXPERIENCE"
    fn on_section(&self, language: Language, section: &str) {
        let _ = (language, section);
    }

    /// Called after a document has been written.
    fn on_language_complete(&self, language: Language, output: &Path) {
        let _ = (language, output);
    }

    /// Called when a document could not be produced.
    fn on_language_error(&self, language: Language, error: &str) {
        let _ = (language, error);
    }

    /// Called once after every selected language has been attempted.
    ///
    /// # Arguments
    /// * `total_languages`: languages attempted
    /// * `success_count`  : documents written
    fn on_run_complete(&self, total_languages: usize, success_count: usize) {
        let _ = (total_languages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        languages: Arc<AtomicUsize>,
        sections: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
        completed_total: Arc<AtomicUsize>,
    }

    impl GenerationProgressCallback for TrackingCallback {
        fn on_language_start(&self, _language: Language) {
            self.languages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_section(&self, _language: Language, _section: &str) {
            self.sections.fetch_add(1, Ordering::SeqCst);
        }

        fn on_language_error(&self, _language: Language, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_run_complete(&self, _total: usize, success_count: usize) {
            self.completed_total.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(2);
        cb.on_language_start(Language::Swedish);
        cb.on_section(Language::Swedish, "UTBILDNING");
        cb.on_language_complete(Language::Swedish, Path::new("cv.docx"));
        cb.on_language_error(Language::English, "template missing");
        cb.on_run_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            languages: Arc::new(AtomicUsize::new(0)),
            sections: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(AtomicUsize::new(0)),
            completed_total: Arc::new(AtomicUsize::new(0)),
        };

        tracker.on_language_start(Language::Swedish);
        tracker.on_section(Language::Swedish, "PROFIL");
        tracker.on_section(Language::Swedish, "UTBILDNING");
        tracker.on_language_start(Language::English);
        tracker.on_language_error(Language::English, "disk full");
        tracker.on_run_complete(2, 1);

        assert_eq!(tracker.languages.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.sections.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completed_total.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_run_start(1);
        cb.on_section(Language::English, "EDUCATION");
    }
}
