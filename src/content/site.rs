//! Content loaded from a checkout of the personal website.
//!
//! The website keeps its career data as array literals inside React
//! components. Each component file is read and its records are mapped onto
//! the typed content. The English side is produced by translating the
//! Swedish text; names, places and keyword lists are left as they are.
//!
//! Any section that yields no records is filled from [`super::fallback`],
//! so a partial checkout still produces a complete document.

use super::fallback::{self, DEFAULT_PROFILE_TITLE};
use super::{BilingualContent, ContentOrigin, CvContent, Experience, Language, Project, SkillCategory};
use crate::pipeline::extract::{extract_element_text, extract_records, Record};
use crate::pipeline::translate::TranslationService;
use std::path::Path;
use tracing::{debug, info, warn};

/// Component files, relative to the site root.
pub const HERO_FILE: &str = "components/Hero.tsx";
pub const EXPERIENCE_FILE: &str = "components/Experience.tsx";
pub const SKILLS_FILE: &str = "components/Skills.tsx";
pub const PROJECTS_FILE: &str = "components/Projects.tsx";

/// Experience entries with this highlight start on a new page.
const PAGE_BREAK_HIGHLIGHT: &str = "Karriärutveckling";

/// Swedish date words and their English replacements.
const DATE_WORDS: &[(&str, &str)] = &[("Nuvarande", "Present"), ("Maj", "May")];

/// Read the component files under `site_root` and build both languages.
///
/// Missing or unreadable files are logged and treated as empty; the
/// affected sections come from the fixtures. `translator` translates
/// Swedish to English.
pub async fn load_site_content(
    site_root: &Path,
    translator: &TranslationService,
) -> BilingualContent {
    let mut swedish = CvContent::default();
    let mut english = CvContent::default();
    let mut found_any = false;

    // ── Hero: profile title and text ─────────────────────────────────────
    if let Some(src) = read_component(site_root, HERO_FILE).await {
        if let Some(title) = extract_element_text(&src, "text-xl") {
            english.profile_title = translator.translate(&title).await;
            swedish.profile_title = title;
            found_any = true;
        }
        if let Some(text) = extract_element_text(&src, "max-w-2xl") {
            english.profile_text = translator.translate(&text).await;
            swedish.profile_text = text;
            found_any = true;
        }
    }

    // ── Experience ───────────────────────────────────────────────────────
    if let Some(src) = read_component(site_root, EXPERIENCE_FILE).await {
        let records = extract_records(&src, "experiences");
        debug!("{}: {} experience records", EXPERIENCE_FILE, records.len());
        for record in &records {
            let sv = experience_from_record(record);
            let en = Experience {
                title: translator.translate(&sv.title).await,
                description: translator.translate(&sv.description).await,
                date: english_date(&sv.date),
                ..sv.clone()
            };
            swedish.experiences.push(sv);
            english.experiences.push(en);
        }
        found_any |= !records.is_empty();
    }

    // ── Skills ───────────────────────────────────────────────────────────
    if let Some(src) = read_component(site_root, SKILLS_FILE).await {
        let records = extract_records(&src, "skillCategories");
        debug!("{}: {} skill categories", SKILLS_FILE, records.len());
        for record in &records {
            let title = record.text("title").unwrap_or_default().to_string();
            let skills = record.list("skills").join(", ");
            english.skills.push(SkillCategory {
                title: translator.translate(&title).await,
                skills: skills.clone(),
            });
            swedish.skills.push(SkillCategory { title, skills });
        }
        found_any |= !records.is_empty();
    }

    // ── Projects ─────────────────────────────────────────────────────────
    if let Some(src) = read_component(site_root, PROJECTS_FILE).await {
        let records = extract_records(&src, "projects");
        debug!("{}: {} projects", PROJECTS_FILE, records.len());
        for record in &records {
            let name = record.text("title").unwrap_or_default().to_string();
            let description = record.text("description").unwrap_or_default().to_string();
            english.projects.push(Project {
                name: name.clone(),
                description: translator.translate(&description).await,
            });
            swedish.projects.push(Project { name, description });
        }
        found_any |= !records.is_empty();
    }

    fill_from_fixtures(&mut swedish, Language::Swedish);
    fill_from_fixtures(&mut english, Language::English);

    let origin = if found_any {
        ContentOrigin::Site
    } else {
        warn!(
            "No content found under {}; using built-in content",
            site_root.display()
        );
        ContentOrigin::Fallback
    };
    info!(
        "Site content: {} experiences, {} skill categories, {} projects ({} translation failures)",
        swedish.experiences.len(),
        swedish.skills.len(),
        swedish.projects.len(),
        translator.failures()
    );

    BilingualContent {
        origin,
        swedish,
        english,
    }
}

async fn read_component(site_root: &Path, rel: &str) -> Option<String> {
    let path = site_root.join(rel);
    match tokio::fs::read_to_string(&path).await {
        Ok(src) => Some(src),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not present", path.display());
            None
        }
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            None
        }
    }
}

fn experience_from_record(record: &Record) -> Experience {
    let text = |key: &str| record.text(key).unwrap_or_default().to_string();
    Experience {
        title: text("title"),
        company: text("company"),
        location: text("location"),
        date: text("period"),
        description: text("description"),
        keywords: record.list("skills").join(", "),
        page_break_before: record.text("highlight") == Some(PAGE_BREAK_HIGHLIGHT),
    }
}

/// Swedish period text with month and "current" words in English.
pub fn english_date(date: &str) -> String {
    DATE_WORDS
        .iter()
        .fold(date.to_string(), |d, (sv, en)| d.replace(sv, en))
}

/// Fill empty sections from the fixtures of `language`. Competencies,
/// education, certificates and spoken languages always come from there.
fn fill_from_fixtures(content: &mut CvContent, language: Language) {
    if content.profile_title.is_empty() {
        content.profile_title = DEFAULT_PROFILE_TITLE.to_string();
    }
    if content.profile_text.is_empty() {
        content.profile_text = fallback::profile_text(language).to_string();
    }
    if content.experiences.is_empty() {
        content.experiences = fallback::experiences(language);
    }
    if content.skills.is_empty() {
        content.skills = fallback::skills(language);
    }
    if content.projects.is_empty() {
        content.projects = fallback::projects(language);
    }
    content.competencies = fallback::competencies(language);
    content.education = fallback::education(language);
    content.certificates = fallback::certificates(language);
    content.languages = fallback::spoken_languages(language);
}
