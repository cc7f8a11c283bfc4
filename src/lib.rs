//! # cvgen
//!
//! Generate a bilingual (Swedish/English) résumé as `.docx` documents.
//!
//! Content comes from the personal website's React components when a
//! checkout is available, otherwise from built-in content. The English side
//! of site content is machine-translated. Documents are built on a Word
//! template whose styles and margins are kept while its body is replaced.
//!
//! ## Pipeline Overview
//!
//! ```text
//! site checkout (optional)
//!  │
//!  ├─ 1. Extract    records from Experience/Skills/Projects/Hero components
//!  ├─ 2. Translate  Swedish → English (Google, any LLM, or none)
//!  ├─ 3. Logos      cache dir → site public/ → logo page scrape
//!  ├─ 4. Assemble   template body replaced, images, links, page numbers
//!  └─ 5. Output     {base}_SV.docx, {base}_ENG.docx
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cvgen::{generate, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GenerationConfig::builder()
//!         .template_path("mall.docx")
//!         .site_root("../site")
//!         .output_dir("out")
//!         .build()?;
//!     let report = generate(&config).await?;
//!     for path in report.outputs() {
//!         println!("{}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cvgen` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod content;
pub mod docx;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder, LanguageSelection, TranslatorKind};
pub use content::{BilingualContent, ContentOrigin, CvContent, Language};
pub use error::{AssetError, CvError, LanguageError, TranslateError};
pub use generate::{
    generate, generate_language, generate_sync, load_content, GenerationReport, LanguageOutcome,
    LoadedContent,
};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
