//! CLI binary for cvgen.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GenerationConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use cvgen::{
    generate, load_content, GenerationConfig, GenerationProgressCallback, Language,
    LanguageSelection, ProgressCallback, TranslatorKind,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner showing the section being written and one
/// log line per finished document.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<Language, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading content…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed(&self, language: Language) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&language))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_languages: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Generating {total_languages} document(s)…"))
        ));
    }

    fn on_language_start(&self, language: Language) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(language, Instant::now());
        }
        self.bar.set_prefix(language.file_suffix());
        self.bar.set_message("contact");
    }

    fn on_section(&self, _language: Language, section: &str) {
        self.bar.set_message(section.to_string());
    }

    fn on_language_complete(&self, language: Language, output: &Path) {
        let secs = self.elapsed(language);
        self.bar.println(format!(
            "  {} {:<3}  {}  {}",
            green("✓"),
            language.file_suffix(),
            output.display(),
            dim(&format!("{secs:.1}s")),
        ));
    }

    fn on_language_error(&self, language: Language, error: &str) {
        let secs = self.elapsed(language);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:<3}  {}  {}",
            red("✗"),
            language.file_suffix(),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
    }

    fn on_run_complete(&self, total_languages: usize, success_count: usize) {
        let failed = total_languages.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} document(s) written",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents written  ({} failed)",
                if failed == total_languages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_languages,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Both languages from built-in content
  cvgen --template mall.docx --image profile_pic.jpg

  # Read content from a website checkout, English translated by Google
  cvgen --site-root ../site --output-dir out

  # Swedish only, no network at all
  cvgen --lang sv --translator none --no-remote-logos

  # Translate with an LLM
  cvgen --site-root ../site --translator llm --provider openai --model gpt-4.1-mini

  # Show the content that would be rendered
  cvgen --site-root ../site --dump-content > content.json

OUTPUT:
  {base}_SV.docx and {base}_ENG.docx in --output-dir
  (base: Daniel_Hansson_CV_2025 unless --base-name is given)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (--translator llm)
  ANTHROPIC_API_KEY       Anthropic API key (--translator llm)
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Log filter, e.g. cvgen=debug
"#;

/// Generate bilingual résumé documents from a Word template.
#[derive(Parser, Debug)]
#[command(
    name = "cvgen",
    version,
    about = "Generate Swedish and English résumé documents (.docx) from a template",
    long_about = "Generate Swedish and English résumé documents from a Word template. \
Content is read from the personal website's component files when --site-root is given, \
otherwise built-in content is used. English text from the site is machine-translated.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Word template (.docx); its styles and margins are reused.
    #[arg(long, env = "CVGEN_TEMPLATE", default_value = cvgen::config::DEFAULT_TEMPLATE)]
    template: PathBuf,

    /// Profile picture floated next to the contact block.
    #[arg(long, env = "CVGEN_IMAGE", default_value = cvgen::config::DEFAULT_PROFILE_IMAGE)]
    image: PathBuf,

    /// Directory for the generated documents.
    #[arg(short, long, env = "CVGEN_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Which documents to generate.
    #[arg(long, env = "CVGEN_LANG", value_enum, default_value = "both")]
    lang: LangArg,

    /// Website checkout with components/*.tsx and public/ logos.
    #[arg(long, env = "CVGEN_SITE_ROOT")]
    site_root: Option<PathBuf>,

    /// Logo cache directory.
    #[arg(long, env = "CVGEN_LOGO_DIR", default_value = "logos")]
    logo_dir: PathBuf,

    /// Page scraped for logos missing from the cache.
    #[arg(long, env = "CVGEN_LOGO_PAGE", default_value = cvgen::pipeline::assets::DEFAULT_LOGO_PAGE)]
    logo_page: String,

    /// Never download logos.
    #[arg(long, env = "CVGEN_NO_REMOTE_LOGOS")]
    no_remote_logos: bool,

    /// Translation backend for site content.
    #[arg(long, env = "CVGEN_TRANSLATOR", value_enum, default_value = "google")]
    translator: TranslatorArg,

    /// LLM provider for --translator llm: openai, anthropic, gemini, ollama.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID for --translator llm.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Output file stem; _SV / _ENG and .docx are appended.
    #[arg(long, env = "CVGEN_BASE_NAME", default_value = cvgen::config::DEFAULT_OUTPUT_BASE)]
    base_name: String,

    /// Longest text sent to the translator in one request (characters).
    #[arg(long, env = "CVGEN_CHUNK_LIMIT", default_value_t = 4500,
          value_parser = clap::value_parser!(u64).range(100..=5000))]
    chunk_limit: u64,

    /// Print the loaded content as JSON and exit without writing documents.
    #[arg(long, env = "CVGEN_DUMP_CONTENT")]
    dump_content: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "CVGEN_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "CVGEN_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CVGEN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CVGEN_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LangArg {
    Sv,
    En,
    Both,
}

impl From<LangArg> for LanguageSelection {
    fn from(v: LangArg) -> Self {
        match v {
            LangArg::Sv => LanguageSelection::Swedish,
            LangArg::En => LanguageSelection::English,
            LangArg::Both => LanguageSelection::Both,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TranslatorArg {
    Google,
    Llm,
    None,
}

impl From<TranslatorArg> for TranslatorKind {
    fn from(v: TranslatorArg) -> Self {
        match v {
            TranslatorArg::Google => TranslatorKind::Google,
            TranslatorArg::Llm => TranslatorKind::Llm,
            TranslatorArg::None => TranslatorKind::None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dump_content;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Content dump ─────────────────────────────────────────────────────
    if cli.dump_content {
        let loaded = load_content(&config)
            .await
            .context("Failed to load content")?;
        println!(
            "{}",
            serde_json::to_string_pretty(&loaded).context("Failed to serialise content")?
        );
        return Ok(());
    }

    // ── Run generation ───────────────────────────────────────────────────
    let report = generate(&config).await.context("Generation failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        if !show_progress {
            for outcome in &report.languages {
                match (&outcome.output, &outcome.error) {
                    (Some(path), _) => eprintln!("Wrote {}", path.display()),
                    (None, Some(e)) => eprintln!("Failed {}", e),
                    (None, None) => {}
                }
            }
        }
        eprintln!(
            "   {} content  /  {} translator ({} failures)  /  {} logos  —  {}ms total",
            dim(&format!("{:?}", report.origin).to_lowercase()),
            dim(&report.translator),
            report.translation_failures,
            report.logos_found,
            report.duration_ms,
        );
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .template_path(&cli.template)
        .profile_image(&cli.image)
        .output_dir(&cli.output_dir)
        .output_base_name(&cli.base_name)
        .languages(cli.lang.into())
        .logo_dir(&cli.logo_dir)
        .translator(cli.translator.into())
        .chunk_limit(cli.chunk_limit as usize);

    if let Some(ref root) = cli.site_root {
        builder = builder.site_root(root);
    }
    builder = if cli.no_remote_logos {
        builder.no_remote_logos()
    } else {
        builder.logo_page_url(&cli.logo_page)
    };
    if let Some(ref p) = cli.provider {
        builder = builder.provider_name(p);
    }
    if let Some(ref m) = cli.model {
        builder = builder.model(m);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
