//! Configuration types for résumé generation.
//!
//! All generation behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. Defaults reproduce the classic layout:
//! the `mall-kronologiskt` template, `profile_pic.jpg`, both languages and
//! fallback content when no site checkout is given.

use crate::content::Language;
use crate::error::CvError;
use crate::pipeline::assets::DEFAULT_LOGO_PAGE;
use crate::pipeline::translate::CHUNK_LIMIT;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Template used when none is given.
pub const DEFAULT_TEMPLATE: &str = "mall-kronologiskt-cv-251020-variant.docx";
/// Profile picture used when none is given.
pub const DEFAULT_PROFILE_IMAGE: &str = "profile_pic.jpg";
/// Output file stem; the language suffix is appended.
pub const DEFAULT_OUTPUT_BASE: &str = "Daniel_Hansson_CV_2025";

/// Configuration for a generation run.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use cvgen::{GenerationConfig, LanguageSelection, TranslatorKind};
///
/// let config = GenerationConfig::builder()
///     .output_dir("out")
///     .languages(LanguageSelection::English)
///     .translator(TranslatorKind::None)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Template `.docx`; its styles, margins and section setup are reused.
    pub template_path: PathBuf,

    /// Profile picture floated next to the contact block.
    pub profile_image: PathBuf,

    /// Directory the documents are written to. Default: current directory.
    pub output_dir: PathBuf,

    /// Output file stem. Default: `Daniel_Hansson_CV_2025`.
    pub output_base_name: String,

    /// Which documents to produce. Default: both.
    pub languages: LanguageSelection,

    /// Website checkout to read content from. If None, fixtures only.
    pub site_root: Option<PathBuf>,

    /// Logo cache directory. Default: `logos`.
    pub logo_dir: PathBuf,

    /// Page whose `<img alt>` tags are searched for missing logos.
    /// If None, logos are only taken from the cache directory.
    pub logo_page_url: Option<String>,

    /// Translation backend for site content. Default: Google.
    pub translator: TranslatorKind,

    /// LLM model identifier for [`TranslatorKind::Llm`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Per-chunk translation timeout in seconds. Default: 30.
    pub translation_timeout_secs: u64,

    /// Logo page and image download timeout in seconds. Default: 5.
    pub fetch_timeout_secs: u64,

    /// Longest text sent to the translator in one call, in characters.
    /// Default: 4500.
    pub chunk_limit: usize,

    /// Receives run, language and section events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE),
            profile_image: PathBuf::from(DEFAULT_PROFILE_IMAGE),
            output_dir: PathBuf::from("."),
            output_base_name: DEFAULT_OUTPUT_BASE.to_string(),
            languages: LanguageSelection::default(),
            site_root: None,
            logo_dir: PathBuf::from("logos"),
            logo_page_url: Some(DEFAULT_LOGO_PAGE.to_string()),
            translator: TranslatorKind::default(),
            model: None,
            provider_name: None,
            provider: None,
            translation_timeout_secs: 30,
            fetch_timeout_secs: 5,
            chunk_limit: CHUNK_LIMIT,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("template_path", &self.template_path)
            .field("profile_image", &self.profile_image)
            .field("output_dir", &self.output_dir)
            .field("output_base_name", &self.output_base_name)
            .field("languages", &self.languages)
            .field("site_root", &self.site_root)
            .field("logo_dir", &self.logo_dir)
            .field("logo_page_url", &self.logo_page_url)
            .field("translator", &self.translator)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("chunk_limit", &self.chunk_limit)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }

    /// Output path of the document for `language`.
    pub fn output_path(&self, language: Language) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.docx",
            self.output_base_name,
            language.file_suffix()
        ))
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_path = path.into();
        self
    }

    pub fn profile_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.profile_image = path.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn output_base_name(mut self, name: impl Into<String>) -> Self {
        self.config.output_base_name = name.into();
        self
    }

    pub fn languages(mut self, selection: LanguageSelection) -> Self {
        self.config.languages = selection;
        self
    }

    pub fn site_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.site_root = Some(root.into());
        self
    }

    pub fn logo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.logo_dir = dir.into();
        self
    }

    pub fn logo_page_url(mut self, url: impl Into<String>) -> Self {
        self.config.logo_page_url = Some(url.into());
        self
    }

    /// Never fetch logos over the network.
    pub fn no_remote_logos(mut self) -> Self {
        self.config.logo_page_url = None;
        self
    }

    pub fn translator(mut self, kind: TranslatorKind) -> Self {
        self.config.translator = kind;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn translation_timeout_secs(mut self, secs: u64) -> Self {
        self.config.translation_timeout_secs = secs.max(1);
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs.max(1);
        self
    }

    pub fn chunk_limit(mut self, chars: usize) -> Self {
        self.config.chunk_limit = chars.clamp(100, 5000);
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, CvError> {
        let c = &self.config;
        if c.output_base_name.trim().is_empty() {
            return Err(CvError::InvalidConfig(
                "Output base name must not be empty".into(),
            ));
        }
        if c.output_base_name.contains(['/', '\\']) {
            return Err(CvError::InvalidConfig(format!(
                "Output base name must not contain path separators, got '{}'",
                c.output_base_name
            )));
        }
        if c.chunk_limit == 0 {
            return Err(CvError::InvalidConfig("Chunk limit must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which language documents to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LanguageSelection {
    Swedish,
    English,
    /// Swedish first, then English. (default)
    #[default]
    Both,
}

impl LanguageSelection {
    /// Selected languages in generation order.
    pub fn languages(self) -> Vec<Language> {
        match self {
            LanguageSelection::Swedish => vec![Language::Swedish],
            LanguageSelection::English => vec![Language::English],
            LanguageSelection::Both => vec![Language::Swedish, Language::English],
        }
    }
}

/// Translation backend used for site content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TranslatorKind {
    /// Keep the Swedish text in the English document.
    None,
    /// Google's public translate endpoint. (default)
    #[default]
    Google,
    /// Any provider supported by `edgequake-llm`.
    Llm,
}
