//! Typed résumé content, per language.
//!
//! The assembler never sees raw [`crate::pipeline::extract::Record`]s; the
//! site loader and the fallback fixtures both produce the types below.
//! [`BilingualContent`] holds one [`CvContent`] per language and every
//! sequence in the two halves is index-aligned: entry *i* of the Swedish
//! experiences is the source of entry *i* of the English ones.

pub mod fallback;
pub mod site;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A document language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Swedish,
    English,
}

impl Language {
    /// ISO 639-1 code, as passed to translation backends.
    pub fn code(self) -> &'static str {
        match self {
            Language::Swedish => "sv",
            Language::English => "en",
        }
    }

    /// Suffix used in output file names.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Language::Swedish => "SV",
            Language::English => "ENG",
        }
    }

    /// English display name, used in LLM prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Swedish => "Swedish",
            Language::English => "English",
        }
    }

    /// Section headings for documents in this language.
    pub fn headings(self) -> &'static Headings {
        match self {
            Language::Swedish => &SWEDISH_HEADINGS,
            Language::English => &ENGLISH_HEADINGS,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fixed section labels of one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Headings {
    pub work_experience: &'static str,
    pub competencies: &'static str,
    pub education: &'static str,
    pub certificates: &'static str,
    pub skills: &'static str,
    pub languages: &'static str,
    pub projects: &'static str,
}

pub const SWEDISH_HEADINGS: Headings = Headings {
    work_experience: "ARBETSLIVSERFARENHET",
    competencies: "NYCKELKOMPETENSER",
    education: "UTBILDNING",
    certificates: "Certifieringar:",
    skills: "IT-KOMPETENS",
    languages: "SPRÅK",
    projects: "PROJEKT & OPEN SOURCE",
};

pub const ENGLISH_HEADINGS: Headings = Headings {
    work_experience: "WORK EXPERIENCE",
    competencies: "KEY COMPETENCIES",
    education: "EDUCATION",
    certificates: "Certificates:",
    skills: "IT SKILLS",
    languages: "LANGUAGES",
    projects: "PROJECTS & OPEN SOURCE",
};

/// Contact block rendered as the first paragraph of every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    /// Phone number as displayed.
    pub phone: String,
    /// Phone number as dialled (`tel:` link target).
    pub phone_dial: String,
    /// Host + path, without scheme.
    pub linkedin: String,
    pub github: String,
    pub website: String,
    pub location: String,
}

/// One work-experience entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub location: String,
    pub date: String,
    pub description: String,
    /// Comma-separated keyword list.
    pub keywords: String,
    /// Start this entry on a new page.
    #[serde(default)]
    pub page_break_before: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub school: String,
    pub date: String,
}

/// A skill category and its comma-joined skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub title: String,
    pub skills: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
}

/// Everything rendered into one language's document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvContent {
    pub profile_title: String,
    pub profile_text: String,
    pub competencies: Vec<String>,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub certificates: Vec<String>,
    pub skills: Vec<SkillCategory>,
    pub projects: Vec<Project>,
    /// Spoken languages with proficiency, e.g. "English (Fluent)".
    pub languages: Vec<String>,
}

/// Where the content of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentOrigin {
    /// Extracted from the website component files (missing sections filled
    /// from the fixtures).
    Site,
    /// Hardcoded fixtures only.
    Fallback,
}

/// Swedish and English content, index-aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualContent {
    pub origin: ContentOrigin,
    pub swedish: CvContent,
    pub english: CvContent,
}

impl BilingualContent {
    /// Content for one language.
    pub fn for_language(&self, language: Language) -> &CvContent {
        match language {
            Language::Swedish => &self.swedish,
            Language::English => &self.english,
        }
    }

    /// True when every sequence has the same length in both languages.
    pub fn is_aligned(&self) -> bool {
        let (a, b) = (&self.swedish, &self.english);
        a.competencies.len() == b.competencies.len()
            && a.experiences.len() == b.experiences.len()
            && a.education.len() == b.education.len()
            && a.certificates.len() == b.certificates.len()
            && a.skills.len() == b.skills.len()
            && a.projects.len() == b.projects.len()
            && a.languages.len() == b.languages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_codes_and_suffixes() {
        assert_eq!(Language::Swedish.code(), "sv");
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Swedish.file_suffix(), "SV");
        assert_eq!(Language::English.file_suffix(), "ENG");
    }

    #[test]
    fn headings_per_language() {
        assert_eq!(
            Language::English.headings().work_experience,
            "WORK EXPERIENCE"
        );
        assert_eq!(
            Language::Swedish.headings().work_experience,
            "ARBETSLIVSERFARENHET"
        );
    }

    #[test]
    fn misaligned_content_is_detected() {
        let mut content = fallback::bilingual();
        assert!(content.is_aligned());
        content.english.projects.pop();
        assert!(!content.is_aligned());
    }
}
