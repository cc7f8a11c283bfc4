//! Company logo resolution.
//!
//! A work-experience entry is matched against [`LOGO_CATALOG`] by company
//! name (or, for the combined early-career entry, by title). The matched
//! [`LogoEntry`] is then resolved to an image file through the
//! [`AssetSource`]s of a [`LogoCache`], in order:
//!
//! 1. [`LocalCache`]: the file already sits in the cache directory.
//! 2. [`RemoteFetch`]: scan the public logo page for an `<img>` whose `alt`
//!    contains the entry's alt text, download its `src` into the cache
//!    directory.
//!
//! Each catalog key is resolved at most once per run; the outcome (found
//! or not) is memoized in the cache. Failures are logged and the entry is
//! rendered without a logo.

use crate::error::AssetError;
use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Default page listing the company logos.
pub const DEFAULT_LOGO_PAGE: &str = "https://rekrytera.danielhansson.nu";

/// Image extensions probed in the cache directory.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

// ── Catalog ──────────────────────────────────────────────────────────────

/// A known company logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoEntry {
    /// Cache key.
    pub key: &'static str,
    /// File name in the site's `public/` directory and in the cache.
    pub file_name: &'static str,
    /// Text searched for in `<img alt>` on the logo page.
    pub alt: &'static str,
    /// Lower-case substrings of the company name that select this logo.
    company_patterns: &'static [&'static str],
    /// Lower-case substrings of the job title that select this logo.
    title_patterns: &'static [&'static str],
}

impl LogoEntry {
    fn matches(&self, company: &str, title: &str) -> bool {
        let company = company.to_lowercase();
        let title = title.to_lowercase();
        (!company.is_empty() && self.company_patterns.iter().any(|p| company.contains(p)))
            || self.title_patterns.iter().any(|p| title.contains(p))
    }
}

pub static LOGO_CATALOG: &[LogoEntry] = &[
    LogoEntry {
        key: "InfraCom",
        file_name: "infracom-logo.png",
        alt: "InfraCom",
        company_patterns: &["infracom"],
        title_patterns: &[],
    },
    LogoEntry {
        key: "Redpill Linpro",
        file_name: "redpill-linpro-logo.png",
        alt: "Redpill Linpro",
        company_patterns: &["redpill linpro"],
        title_patterns: &[],
    },
    LogoEntry {
        key: "T&M Hansson IT",
        file_name: "hanssonit-logo.png",
        alt: "T&M Hansson IT",
        company_patterns: &["t&m hansson it"],
        title_patterns: &[],
    },
    LogoEntry {
        key: "SenseNode",
        file_name: "sensenode-logo.png",
        alt: "SenseNode",
        company_patterns: &["sensenode"],
        title_patterns: &[],
    },
    LogoEntry {
        key: "Vessinge IT",
        file_name: "vessinge-logo.png",
        alt: "Vessinge IT",
        company_patterns: &["vessinge it"],
        title_patterns: &[],
    },
    LogoEntry {
        key: "Orestad Linux",
        file_name: "orestad-logo.png",
        alt: "Orestad Linux",
        company_patterns: &["örestad linux", "orestad linux"],
        title_patterns: &[],
    },
    LogoEntry {
        key: "HSN Konsult",
        file_name: "hsn-konsult-logo.jpg",
        alt: "HSN Konsult",
        company_patterns: &["hsn konsult"],
        title_patterns: &["previous sales career", "tidigare entreprenörskarriär"],
    },
];

/// The catalog entry for a work-experience entry, if any.
pub fn lookup(company: &str, title: &str) -> Option<&'static LogoEntry> {
    LOGO_CATALOG.iter().find(|e| e.matches(company, title))
}

// ── Sources ──────────────────────────────────────────────────────────────

/// One way of turning a catalog entry into a local image file.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Short name for logs.
    fn kind(&self) -> &'static str;

    /// `Ok(None)` when this source simply does not have the logo.
    async fn locate(
        &self,
        entry: &LogoEntry,
        cache_dir: &Path,
    ) -> Result<Option<PathBuf>, AssetError>;
}

/// Files already present in the cache directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalCache;

#[async_trait]
impl AssetSource for LocalCache {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn locate(
        &self,
        entry: &LogoEntry,
        cache_dir: &Path,
    ) -> Result<Option<PathBuf>, AssetError> {
        let exact = cache_dir.join(entry.file_name);
        if exact.is_file() {
            return Ok(Some(exact));
        }
        // A previous download may have used the extension served by the site.
        let stem = Path::new(entry.file_name);
        Ok(IMAGE_EXTENSIONS
            .iter()
            .map(|ext| cache_dir.join(stem.with_extension(ext)))
            .find(|p| p.is_file()))
    }
}

/// Scrape the logo page and download the matching image.
pub struct RemoteFetch {
    client: reqwest::Client,
    page_url: Url,
    page: OnceCell<String>,
}

impl RemoteFetch {
    pub fn new(page_url: &str, timeout_secs: u64) -> Result<Self, AssetError> {
        let fetch_err = |detail: String| AssetError::Fetch {
            url: page_url.to_string(),
            detail,
        };
        let page_url = Url::parse(page_url).map_err(|e| fetch_err(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| fetch_err(e.to_string()))?;
        Ok(Self {
            client,
            page_url,
            page: OnceCell::new(),
        })
    }

    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, AssetError> {
        let fetch_err = |detail: String| AssetError::Fetch {
            url: url.to_string(),
            detail,
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP {}", response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// The logo page HTML, fetched once.
    async fn page_html(&self) -> Result<&str, AssetError> {
        self.page
            .get_or_try_init(|| async {
                debug!("Fetching logo page {}", self.page_url);
                let bytes = self.get_bytes(&self.page_url).await?;
                Ok::<_, AssetError>(String::from_utf8_lossy(&bytes).into_owned())
            })
            .await
            .map(String::as_str)
    }
}

#[async_trait]
impl AssetSource for RemoteFetch {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn locate(
        &self,
        entry: &LogoEntry,
        cache_dir: &Path,
    ) -> Result<Option<PathBuf>, AssetError> {
        let html = self.page_html().await?;
        let Some(src) = find_logo_src(html, entry.alt) else {
            debug!("No <img alt> matching '{}' on logo page", entry.alt);
            return Ok(None);
        };
        let url = self.page_url.join(&src).map_err(|e| AssetError::Fetch {
            url: src.clone(),
            detail: e.to_string(),
        })?;

        let bytes = self.get_bytes(&url).await?;
        let ext = image_extension(url.path()).unwrap_or("png");
        let path = cache_dir.join(Path::new(entry.file_name).with_extension(ext));

        let io_err = |e: std::io::Error| AssetError::Io {
            path: path.clone(),
            detail: e.to_string(),
        };
        tokio::fs::create_dir_all(cache_dir).await.map_err(io_err)?;
        tokio::fs::write(&path, &bytes).await.map_err(io_err)?;

        info!("Downloaded {} logo ({} bytes)", entry.key, bytes.len());
        Ok(Some(path))
    }
}

/// `src` of the first `<img>` whose `alt` contains `alt` (case-insensitive).
pub fn find_logo_src(html: &str, alt: &str) -> Option<String> {
    let document = scraper::Html::parse_document(html);
    let img_sel = scraper::Selector::parse("img[alt]").unwrap();
    let needle = alt.to_lowercase();

    document
        .select(&img_sel)
        .find(|img| {
            img.value()
                .attr("alt")
                .is_some_and(|a| a.to_lowercase().contains(&needle))
        })
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}

/// Lower-case image extension of a URL path, if it is one we embed.
fn image_extension(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().copied().find(|e| *e == ext)
}

// ── Cache ────────────────────────────────────────────────────────────────

/// Logo paths discovered during a run, keyed by catalog key.
///
/// Append-only: a key resolved once (found or not) is never looked up
/// again, so each company costs at most one remote fetch per run.
pub struct LogoCache {
    dir: PathBuf,
    resolved: HashMap<&'static str, Option<PathBuf>>,
    sources: Vec<Box<dyn AssetSource>>,
}

impl LogoCache {
    /// A cache over `dir` that only looks at local files.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            resolved: HashMap::new(),
            sources: vec![Box::new(LocalCache)],
        }
    }

    /// Append a source, tried after the existing ones.
    pub fn with_source(mut self, source: Box<dyn AssetSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record a known logo path.
    pub fn insert(&mut self, entry: &'static LogoEntry, path: PathBuf) {
        self.resolved.insert(entry.key, Some(path));
    }

    /// Number of catalog keys with a logo file.
    pub fn found(&self) -> usize {
        self.resolved.values().filter(|p| p.is_some()).count()
    }

    /// Copy catalog logos from the site's `public/` directory into the
    /// cache directory. Existing cache files are kept. Returns the number
    /// of files copied.
    pub fn seed_from_dir(&self, public_dir: &Path) -> Result<usize, AssetError> {
        let io_err = |path: &Path, e: std::io::Error| AssetError::Io {
            path: path.to_path_buf(),
            detail: e.to_string(),
        };
        std::fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;

        let mut copied = 0;
        for entry in LOGO_CATALOG {
            let src = public_dir.join(entry.file_name);
            let dst = self.dir.join(entry.file_name);
            if !src.is_file() {
                debug!("Logo not in site public dir: {}", entry.file_name);
                continue;
            }
            if dst.exists() {
                continue;
            }
            std::fs::copy(&src, &dst).map_err(|e| io_err(&dst, e))?;
            copied += 1;
        }
        if copied > 0 {
            info!("Copied {} logos from {}", copied, public_dir.display());
        }
        Ok(copied)
    }

    /// Resolve a catalog entry, consulting each source at most once.
    pub async fn resolve(&mut self, entry: &'static LogoEntry) -> Option<PathBuf> {
        if let Some(known) = self.resolved.get(entry.key) {
            return known.clone();
        }

        let mut found = None;
        for source in &self.sources {
            match source.locate(entry, &self.dir).await {
                Ok(Some(path)) => {
                    debug!("{} logo via {}: {}", entry.key, source.kind(), path.display());
                    found = Some(path);
                    break;
                }
                Ok(None) => {}
                Err(e) => warn!("{} logo lookup ({}) failed: {}", entry.key, source.kind(), e),
            }
        }
        if found.is_none() {
            debug!("No logo for {}", entry.key);
        }
        self.resolved.insert(entry.key, found.clone());
        found
    }

    /// Logo for a work-experience entry, if the company is known and the
    /// image can be found.
    pub async fn logo_for(&mut self, company: &str, title: &str) -> Option<PathBuf> {
        let entry = lookup(company, title)?;
        self.resolve(entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts lookups and never finds anything.
    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl AssetSource for Counting {
        fn kind(&self) -> &'static str {
            "counting"
        }

        async fn locate(
            &self,
            _entry: &LogoEntry,
            _cache_dir: &Path,
        ) -> Result<Option<PathBuf>, AssetError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[test]
    fn lookup_by_company() {
        assert_eq!(
            lookup("InfraCom Smart Digital Solutions", "Datacenter Manager").map(|e| e.key),
            Some("InfraCom")
        );
        assert_eq!(
            lookup("Örestad Linux AB", "Account Manager").map(|e| e.key),
            Some("Orestad Linux")
        );
        assert_eq!(lookup("Acme", "Janitor"), None);
    }

    #[test]
    fn lookup_by_title_for_early_career() {
        assert_eq!(
            lookup("", "Previous Sales Career").map(|e| e.key),
            Some("HSN Konsult")
        );
        assert_eq!(
            lookup("", "Tidigare entreprenörskarriär och försäljning").map(|e| e.key),
            Some("HSN Konsult")
        );
    }

    #[test]
    fn logo_src_matched_by_alt() {
        let html = r#"<html><body>
            <img src="/hero.jpg" alt="Daniel">
            <div><img src="/sensenode-logo.png" alt="SenseNode" class="company-logo"></div>
            <img src="/hsn-konsult-logo.jpg" alt="HSN Konsult AB">
        </body></html>"#;
        assert_eq!(
            find_logo_src(html, "sensenode").as_deref(),
            Some("/sensenode-logo.png")
        );
        assert_eq!(
            find_logo_src(html, "HSN Konsult").as_deref(),
            Some("/hsn-konsult-logo.jpg")
        );
        assert_eq!(find_logo_src(html, "InfraCom"), None);
    }

    #[test]
    fn extension_from_url_path() {
        assert_eq!(image_extension("/logos/a.JPG"), Some("jpg"));
        assert_eq!(image_extension("/logos/a.svg"), None);
        assert_eq!(image_extension("/logos/a"), None);
    }

    #[tokio::test]
    async fn cached_company_never_hits_later_sources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("infracom-logo.png"), b"png").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache =
            LogoCache::new(dir.path()).with_source(Box::new(Counting(calls.clone())));

        let path = cache.logo_for("InfraCom", "Datacenter Manager").await;
        assert_eq!(path, Some(dir.path().join("infracom-logo.png")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn misses_are_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache =
            LogoCache::new(dir.path()).with_source(Box::new(Counting(calls.clone())));

        assert_eq!(cache.logo_for("SenseNode", "Engineer").await, None);
        assert_eq!(cache.logo_for("SenseNode", "Engineer").await, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn local_cache_accepts_other_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("orestad-logo.jpeg"), b"jpg").unwrap();
        let entry = lookup("Orestad Linux", "").unwrap();
        let found = LocalCache.locate(entry, dir.path()).await.unwrap();
        assert_eq!(found, Some(dir.path().join("orestad-logo.jpeg")));
    }

    #[test]
    fn seeding_copies_catalog_files_only() {
        let public = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        std::fs::write(public.path().join("vessinge-logo.png"), b"v").unwrap();
        std::fs::write(public.path().join("favicon.ico"), b"f").unwrap();

        let cache = LogoCache::new(cache_dir.path().join("logos"));
        assert_eq!(cache.seed_from_dir(public.path()).unwrap(), 1);
        assert!(cache.dir().join("vessinge-logo.png").is_file());
        assert!(!cache.dir().join("favicon.ico").exists());
        // Second run finds the file already cached.
        assert_eq!(cache.seed_from_dir(public.path()).unwrap(), 0);
    }
}
