//! Generation entry points.
//!
//! A run loads the content once, then assembles one document per selected
//! language, Swedish first. Languages are independent: a failure while
//! assembling or writing one is recorded in the [`GenerationReport`] and
//! the other language still runs. Only the logo cache is shared between
//! them.

use crate::config::{GenerationConfig, TranslatorKind};
use crate::content::{fallback, site, BilingualContent, ContentOrigin, Language};
use crate::docx::Document;
use crate::error::{CvError, LanguageError};
use crate::pipeline::assemble::{assemble, AssemblySummary};
use crate::pipeline::assets::{LogoCache, RemoteFetch};
use crate::pipeline::translate::{
    GoogleTranslator, LlmTranslator, NoopTranslator, TranslationService, Translator,
};
use crate::progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
use edgequake_llm::{LLMProvider, ProviderFactory};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const DEFAULT_LLM_MODEL: &str = "gpt-4.1-nano";

/// Result of one language's document.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageOutcome {
    pub language: Language,
    /// Written document, if generation succeeded.
    pub output: Option<PathBuf>,
    pub paragraphs: usize,
    pub logos: usize,
    pub profile_image: bool,
    pub error: Option<LanguageError>,
}

impl LanguageOutcome {
    pub fn succeeded(&self) -> bool {
        self.output.is_some()
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub origin: ContentOrigin,
    /// Translation backend name ("none" when nothing was translated).
    pub translator: String,
    /// Texts left untranslated because the backend failed.
    pub translation_failures: usize,
    /// Catalog companies with a logo file after the run.
    pub logos_found: usize,
    pub languages: Vec<LanguageOutcome>,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn succeeded(&self) -> usize {
        self.languages.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.languages.len() - self.succeeded()
    }

    /// Paths of all written documents.
    pub fn outputs(&self) -> impl Iterator<Item = &PathBuf> {
        self.languages.iter().filter_map(|o| o.output.as_ref())
    }
}

/// Content of a run plus what translating it cost.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedContent {
    pub content: BilingualContent,
    pub translator: String,
    pub translation_failures: usize,
}

/// Generate the selected documents.
///
/// # Returns
/// `Ok(GenerationReport)` when at least one document was written (check
/// `report.failed()` for the others).
///
/// # Errors
/// Returns `Err(CvError)` only for fatal errors:
/// - The LLM translator was selected but no provider could be created
/// - Every selected language failed
pub async fn generate(config: &GenerationConfig) -> Result<GenerationReport, CvError> {
    let started = Instant::now();
    let progress: ProgressCallback = config
        .progress_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback));
    let languages = config.languages.languages();
    info!(
        "Generating {} document(s) from template {}",
        languages.len(),
        config.template_path.display()
    );
    progress.on_run_start(languages.len());

    // ── Step 1: Content ──────────────────────────────────────────────────
    let loaded = load_content(config).await?;

    // ── Step 2: Logo cache ───────────────────────────────────────────────
    let mut logos = logo_cache(config);

    // ── Step 3: One document per language ────────────────────────────────
    let mut outcomes = Vec::with_capacity(languages.len());
    for &language in &languages {
        progress.on_language_start(language);
        let outcome = match generate_language(
            config,
            &loaded.content,
            language,
            &mut logos,
            progress.as_ref(),
        )
        .await
        {
            Ok((path, summary)) => {
                info!("{}: wrote {}", language, path.display());
                progress.on_language_complete(language, &path);
                LanguageOutcome {
                    language,
                    output: Some(path),
                    paragraphs: summary.paragraphs,
                    logos: summary.logos,
                    profile_image: summary.profile_image,
                    error: None,
                }
            }
            Err(e) => {
                warn!("{}: generation failed: {}", language, e);
                progress.on_language_error(language, &e.to_string());
                LanguageOutcome {
                    language,
                    output: None,
                    paragraphs: 0,
                    logos: 0,
                    profile_image: false,
                    error: Some(LanguageError::AssemblyFailed {
                        language: language.code().to_string(),
                        detail: e.to_string(),
                    }),
                }
            }
        };
        outcomes.push(outcome);
    }

    let report = GenerationReport {
        origin: loaded.content.origin,
        translator: loaded.translator,
        translation_failures: loaded.translation_failures,
        logos_found: logos.found(),
        languages: outcomes,
        duration_ms: started.elapsed().as_millis() as u64,
    };
    progress.on_run_complete(report.languages.len(), report.succeeded());

    if report.succeeded() == 0 {
        let first_error = report
            .languages
            .iter()
            .find_map(|o| o.error.as_ref().map(|e| e.to_string()))
            .unwrap_or_else(|| "no language selected".to_string());
        return Err(CvError::AllLanguagesFailed {
            total: report.languages.len(),
            first_error,
        });
    }

    info!(
        "Done in {}ms: {}/{} documents",
        report.duration_ms,
        report.succeeded(),
        report.languages.len()
    );
    Ok(report)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(config: &GenerationConfig) -> Result<GenerationReport, CvError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CvError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(config))
}

/// Load the content of a run: the site checkout when configured (English
/// translated from Swedish), otherwise the built-in content.
///
/// Nothing is translated when English is not among the selected languages.
pub async fn load_content(config: &GenerationConfig) -> Result<LoadedContent, CvError> {
    let Some(site_root) = &config.site_root else {
        debug!("No site root configured; using built-in content");
        return Ok(LoadedContent {
            content: fallback::bilingual(),
            translator: NoopTranslator.name().to_string(),
            translation_failures: 0,
        });
    };

    let needs_english = config.languages.languages().contains(&Language::English);
    let backend: Arc<dyn Translator> = if needs_english {
        create_translator(config).await?
    } else {
        Arc::new(NoopTranslator)
    };
    let service = TranslationService::new(backend, Language::Swedish, Language::English)
        .with_chunk_limit(config.chunk_limit)
        .with_timeout(Duration::from_secs(config.translation_timeout_secs));
    info!(
        "Reading site content from {} (translator: {})",
        site_root.display(),
        service.backend_name()
    );

    let content = site::load_site_content(site_root, &service).await;
    Ok(LoadedContent {
        content,
        translator: service.backend_name().to_string(),
        translation_failures: service.failures(),
    })
}

/// Assemble and write the document for one language.
pub async fn generate_language(
    config: &GenerationConfig,
    content: &BilingualContent,
    language: Language,
    logos: &mut LogoCache,
    progress: &dyn GenerationProgressCallback,
) -> Result<(PathBuf, AssemblySummary), CvError> {
    let mut doc = Document::open(&config.template_path)?;
    let summary = assemble(
        &mut doc,
        &fallback::contact(),
        content.for_language(language),
        language,
        &config.profile_image,
        logos,
        progress,
    )
    .await?;

    let path = config.output_path(language);
    doc.save(&path)?;
    Ok((path, summary))
}

fn logo_cache(config: &GenerationConfig) -> LogoCache {
    let mut cache = LogoCache::new(&config.logo_dir);
    if let Some(site_root) = &config.site_root {
        let public = site_root.join("public");
        if public.is_dir() {
            if let Err(e) = cache.seed_from_dir(&public) {
                warn!("Could not copy logos from {}: {}", public.display(), e);
            }
        }
    }
    if let Some(url) = &config.logo_page_url {
        match RemoteFetch::new(url, config.fetch_timeout_secs) {
            Ok(fetch) => cache = cache.with_source(Box::new(fetch)),
            Err(e) => warn!("Remote logo lookup disabled: {}", e),
        }
    }
    cache
}

async fn create_translator(config: &GenerationConfig) -> Result<Arc<dyn Translator>, CvError> {
    match config.translator {
        TranslatorKind::None => Ok(Arc::new(NoopTranslator)),
        TranslatorKind::Google => {
            let google = GoogleTranslator::new(config.translation_timeout_secs)
                .map_err(|e| CvError::Internal(format!("HTTP client: {}", e)))?;
            Ok(Arc::new(google))
        }
        TranslatorKind::Llm => {
            let provider = resolve_provider(config).await?;
            Ok(Arc::new(LlmTranslator::new(provider)))
        }
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, CvError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        CvError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. **Pre-built provider** (`config.provider`).
/// 2. **Named provider + model** (`config.provider_name`).
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **OpenAI** when `OPENAI_API_KEY` is set.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
async fn resolve_provider(config: &GenerationConfig) -> Result<Arc<dyn LLMProvider>, CvError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_LLM_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_LLM_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| CvError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --translator google.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
