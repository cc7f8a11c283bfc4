//! Document assembly: typed content → paragraphs of an opened template.
//!
//! Section layout, in order:
//!
//! ```text
//! contact block (floating photo, name, links, location)
//! PROFILE TITLE     profile text
//! COMPETENCIES      bullets
//! WORK EXPERIENCE   [page break] logo + title / company | location | date /
//!                   description / Keywords: …
//! EDUCATION         degree, school (date)
//! Certificates:     bullets
//! IT SKILLS         category: skills
//! LANGUAGES         bullets
//! PROJECTS          name: description
//! ```
//!
//! Missing images never fail assembly; they are logged and left out.

use crate::content::{Contact, CvContent, Education, Experience, Language};
use crate::docx::{AnchorPosition, Document, Paragraph, Run, EMU_PER_INCH};
use crate::error::CvError;
use crate::pipeline::assets::LogoCache;
use crate::progress::GenerationProgressCallback;
use std::path::Path;
use tracing::{debug, warn};

/// Profile photo width: 1.9 in.
pub const PROFILE_IMAGE_WIDTH_EMU: u64 = EMU_PER_INCH * 19 / 10;
/// Company logo height: 0.35 in.
pub const LOGO_HEIGHT_EMU: u64 = EMU_PER_INCH * 35 / 100;
/// Page offset of the profile photo's top-left corner.
pub const PROFILE_IMAGE_POSITION: AnchorPosition = AnchorPosition {
    x: 4_900_000,
    y: 900_000,
};

const HYPERLINK_COLOR: &str = "0563C1";
const BULLET_PREFIX: &str = "• ";

/// What went into one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    pub paragraphs: usize,
    pub logos: usize,
    pub profile_image: bool,
}

/// Style ids resolved once per template.
struct Styles {
    heading: Option<String>,
    bullet: Option<String>,
    hyperlink: Option<String>,
}

struct Assembler<'a> {
    doc: &'a mut Document,
    styles: Styles,
    language: Language,
    progress: &'a dyn GenerationProgressCallback,
    summary: AssemblySummary,
}

/// Append all sections of `content` to `doc` and set the page-number header.
pub async fn assemble(
    doc: &mut Document,
    contact: &Contact,
    content: &CvContent,
    language: Language,
    profile_image: &Path,
    logos: &mut LogoCache,
    progress: &dyn GenerationProgressCallback,
) -> Result<AssemblySummary, CvError> {
    let styles = Styles {
        heading: doc.style_id("Heading 2").map(str::to_string),
        bullet: doc.style_id("List Bullet").map(str::to_string),
        hyperlink: doc.style_id("Hyperlink").map(str::to_string),
    };
    if styles.bullet.is_none() {
        debug!("Template has no 'List Bullet' style; using '{}' prefix", BULLET_PREFIX.trim());
    }

    let mut a = Assembler {
        doc,
        styles,
        language,
        progress,
        summary: AssemblySummary::default(),
    };
    let headings = language.headings();

    a.contact(contact, profile_image);

    // ── Profile ──────────────────────────────────────────────────────────
    a.header(&content.profile_title);
    a.push(Paragraph::new().space_after(0).run(Run::text(&content.profile_text)));
    a.spacer();
    a.section_done(&content.profile_title);

    // ── Competencies ─────────────────────────────────────────────────────
    a.header(headings.competencies);
    a.bullets(&content.competencies);
    a.spacer();
    a.section_done(headings.competencies);

    // ── Work experience ──────────────────────────────────────────────────
    a.header(headings.work_experience);
    for job in &content.experiences {
        let logo = logos.logo_for(&job.company, &job.title).await;
        a.experience(job, logo.as_deref());
    }
    a.spacer();
    a.section_done(headings.work_experience);

    // ── Education ────────────────────────────────────────────────────────
    a.header(headings.education);
    for edu in &content.education {
        a.education(edu);
    }
    a.spacer();
    a.section_done(headings.education);

    // ── Certificates ─────────────────────────────────────────────────────
    a.push(
        Paragraph::new()
            .space_before(0)
            .space_after(3)
            .run(Run::text(headings.certificates).bold()),
    );
    a.bullets(&content.certificates);
    a.spacer();
    a.section_done(headings.certificates);

    // ── IT skills ────────────────────────────────────────────────────────
    a.header(headings.skills);
    for cat in &content.skills {
        a.push(
            Paragraph::new()
                .space_after(0)
                .run(Run::text(format!("{}: ", cat.title)).bold())
                .run(Run::text(&cat.skills)),
        );
    }
    a.section_done(headings.skills);

    // ── Languages ────────────────────────────────────────────────────────
    a.header(headings.languages);
    a.bullets(&content.languages);
    a.spacer();
    a.section_done(headings.languages);

    // ── Projects ─────────────────────────────────────────────────────────
    a.header(headings.projects);
    for proj in &content.projects {
        a.push(
            Paragraph::new()
                .space_after(0)
                .run(Run::text(&proj.name).bold())
                .run(Run::text(format!(": {}", proj.description))),
        );
    }
    a.spacer();
    a.section_done(headings.projects);

    a.doc.set_page_number_header()?;
    debug!(
        "{}: {} paragraphs, {} logos",
        language, a.summary.paragraphs, a.summary.logos
    );
    Ok(a.summary)
}

impl Assembler<'_> {
    fn push(&mut self, paragraph: Paragraph) {
        self.doc.push(paragraph);
        self.summary.paragraphs += 1;
    }

    fn section_done(&self, label: &str) {
        self.progress.on_section(self.language, label);
    }

    fn header(&mut self, text: &str) {
        let p = Paragraph::new()
            .style(self.styles.heading.as_deref())
            .space_before(6)
            .space_after(3)
            .run(Run::text(text).bold().caps());
        self.push(p);
    }

    fn spacer(&mut self) {
        self.push(Paragraph::new().space_after(6));
    }

    fn bullets(&mut self, items: &[String]) {
        for item in items {
            let p = match &self.styles.bullet {
                Some(id) => Paragraph::new().style(Some(id.as_str())).run(Run::text(item)),
                None => Paragraph::new().run(Run::text(format!("{}{}", BULLET_PREFIX, item))),
            };
            self.push(p.space_after(0));
        }
    }

    fn link_run(&self, text: &str) -> Run {
        match &self.styles.hyperlink {
            Some(id) => Run::text(text).style(id.as_str()),
            None => Run::text(text).color(HYPERLINK_COLOR).underline(),
        }
    }

    fn contact(&mut self, contact: &Contact, profile_image: &Path) {
        let mut p = Paragraph::new().space_after(12);

        if profile_image.is_file() {
            match self.doc.floating_image(
                profile_image,
                PROFILE_IMAGE_WIDTH_EMU,
                PROFILE_IMAGE_POSITION,
            ) {
                Ok(run) => {
                    p = p.run(run);
                    self.summary.profile_image = true;
                }
                Err(e) => warn!("Profile image skipped: {}", e),
            }
        } else {
            warn!("Profile image not found: {}", profile_image.display());
        }

        p = p
            .run(Run::text(&contact.name).bold().size(16))
            .run(Run::text("\n"));

        let links = [
            ("Email: ", format!("mailto:{}", contact.email), &contact.email),
            ("Telephone: ", format!("tel:{}", contact.phone_dial), &contact.phone),
            ("LinkedIn: ", format!("https://{}", contact.linkedin), &contact.linkedin),
            ("GitHub: ", format!("https://{}", contact.github), &contact.github),
            ("Website: ", format!("https://{}", contact.website), &contact.website),
        ];
        for (label, url, text) in links {
            let rel_id = self.doc.add_hyperlink(&url);
            p = p
                .run(Run::text(label))
                .hyperlink(rel_id, self.link_run(text))
                .run(Run::text("\n"));
        }

        p = p
            .run(Run::text("Location: "))
            .run(Run::text(&contact.location));
        self.push(p);
    }

    fn experience(&mut self, job: &Experience, logo: Option<&Path>) {
        if job.page_break_before {
            self.push(Paragraph::new().run(Run::page_break()));
        }

        let mut title = Paragraph::new().space_after(0);
        if let Some(path) = logo {
            match self.doc.inline_image(path, LOGO_HEIGHT_EMU) {
                Ok(run) => {
                    title = title.run(run).run(Run::text("  "));
                    self.summary.logos += 1;
                }
                Err(e) => warn!("Logo for {} skipped: {}", job.company, e),
            }
        }
        self.push(title.run(Run::text(&job.title).bold()));

        self.push(
            Paragraph::new()
                .space_after(0)
                .run(Run::text(experience_info_line(job))),
        );
        self.push(
            Paragraph::new()
                .space_after(0)
                .run(Run::text(&job.description)),
        );
        self.push(
            Paragraph::new()
                .space_after(0)
                .run(Run::text(format!("Keywords: {}", job.keywords)).italic().size(9)),
        );
    }

    fn education(&mut self, edu: &Education) {
        self.push(
            Paragraph::new()
                .space_after(0)
                .run(Run::text(&edu.degree).bold())
                .run(Run::text(education_suffix(edu))),
        );
    }
}

/// "company | location | date", skipping empty parts.
pub fn experience_info_line(job: &Experience) -> String {
    let parts: Vec<&str> = [&job.company, &job.location, &job.date]
        .into_iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        job.date.clone()
    } else {
        parts.join(" | ")
    }
}

/// Text after the bold degree: ", school (date)", ", school", " (date)" or "".
pub fn education_suffix(edu: &Education) -> String {
    match (edu.school.is_empty(), edu.date.is_empty()) {
        (false, false) => format!(", {} ({})", edu.school, edu.date),
        (false, true) => format!(", {}", edu.school),
        (true, false) => format!(" ({})", edu.date),
        (true, true) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fallback;
    use crate::docx::{Inline, Package};
    use crate::progress::NoopProgressCallback;

    fn template(styles: &str) -> Document {
        let mut pkg = Package::default();
        pkg.set_part(
            "[Content_Types].xml",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#,
        );
        pkg.set_part(
            "word/document.xml",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p/><w:sectPr/></w:body></w:document>"#,
        );
        pkg.set_part(
            "word/styles.xml",
            format!(
                r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:styles>"#,
                styles
            ),
        );
        Document::from_package(pkg).unwrap()
    }

    const STYLES: &str = concat!(
        r#"<w:style w:styleId="Rubrik2"><w:name w:val="heading 2"/></w:style>"#,
        r#"<w:style w:styleId="Punktlista"><w:name w:val="List Bullet"/></w:style>"#,
        r#"<w:style w:styleId="Hyperlnk"><w:name w:val="Hyperlink"/></w:style>"#
    );

    async fn build(doc: &mut Document, language: Language) -> AssemblySummary {
        let dir = tempfile::tempdir().unwrap();
        let mut logos = LogoCache::new(dir.path());
        assemble(
            doc,
            &fallback::contact(),
            &fallback::content(language),
            language,
            Path::new("/no/such/photo.jpg"),
            &mut logos,
            &NoopProgressCallback,
        )
        .await
        .unwrap()
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.paragraphs().iter().map(|p| p.plain_text()).collect()
    }

    #[test]
    fn info_line_skips_empty_parts() {
        let mut job = Experience {
            company: "InfraCom".into(),
            location: String::new(),
            date: "2023".into(),
            ..Default::default()
        };
        assert_eq!(experience_info_line(&job), "InfraCom | 2023");
        job.company.clear();
        assert_eq!(experience_info_line(&job), "2023");
    }

    #[test]
    fn education_suffix_rules() {
        let edu = |school: &str, date: &str| Education {
            degree: "X".into(),
            school: school.into(),
            date: date.into(),
        };
        assert_eq!(education_suffix(&edu("LTH", "2010")), ", LTH (2010)");
        assert_eq!(education_suffix(&edu("LTH", "")), ", LTH");
        assert_eq!(education_suffix(&edu("", "2010")), " (2010)");
        assert_eq!(education_suffix(&edu("", "")), "");
    }

    #[tokio::test]
    async fn sections_appear_in_order() {
        let mut doc = template(STYLES);
        build(&mut doc, Language::English).await;
        let texts = texts(&doc);
        let pos = |needle: &str| {
            texts
                .iter()
                .position(|t| t == needle)
                .unwrap_or_else(|| panic!("missing {needle}"))
        };
        let order = [
            pos("KEY COMPETENCIES"),
            pos("WORK EXPERIENCE"),
            pos("EDUCATION"),
            pos("Certificates:"),
            pos("IT SKILLS"),
            pos("LANGUAGES"),
            pos("PROJECTS & OPEN SOURCE"),
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{order:?}");
        assert_eq!(texts[pos("WORK EXPERIENCE") + 1], "Datacenter Manager");
    }

    #[tokio::test]
    async fn page_break_precedes_flagged_title() {
        let mut doc = template(STYLES);
        build(&mut doc, Language::Swedish).await;
        let content = fallback::content(Language::Swedish);
        let flagged = content
            .experiences
            .iter()
            .find(|e| e.page_break_before)
            .unwrap();

        let paragraphs = doc.paragraphs();
        let idx = paragraphs
            .iter()
            .position(|p| p.plain_text() == flagged.title)
            .unwrap();
        assert!(paragraphs[idx - 1].to_xml().contains(r#"<w:br w:type="page"/>"#));
    }

    #[tokio::test]
    async fn contact_block_links() {
        let mut doc = template(STYLES);
        build(&mut doc, Language::English).await;
        let contact = &doc.paragraphs()[0];
        let links = contact
            .content()
            .iter()
            .filter(|i| matches!(i, Inline::Hyperlink { .. }))
            .count();
        assert_eq!(links, 5);
        let text = contact.plain_text();
        assert!(text.starts_with("Daniel Hansson\nEmail: mailto@danielhansson.nu\n"));
        assert!(text.ends_with("Location: Genarp, Skåne, Sweden"));
        assert!(contact.to_xml().contains(r#"<w:rStyle w:val="Hyperlnk"/>"#));
    }

    #[tokio::test]
    async fn missing_styles_fall_back_to_direct_formatting() {
        let mut doc = template("");
        build(&mut doc, Language::English).await;
        let texts = texts(&doc);
        let first_competency = &fallback::competencies(Language::English)[0];
        assert!(texts.contains(&format!("• {}", first_competency)));
        let contact = doc.paragraphs()[0].to_xml();
        assert!(contact.contains(r#"<w:color w:val="0563C1"/>"#));
    }

    #[tokio::test]
    async fn header_is_added() {
        let mut doc = template(STYLES);
        build(&mut doc, Language::English).await;
        let pkg = doc.into_package();
        assert!(pkg.xml_part("word/header1.xml").unwrap().contains("NUMPAGES"));
    }
}
