//! End-to-end tests for cvgen.
//!
//! Each test builds a small template package in memory, runs the whole
//! generator into a temporary directory and reads the written documents
//! back. No network access: remote logos and translation are disabled.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use cvgen::{
    generate, generate_sync, ContentOrigin, GenerationConfig, GenerationProgressCallback,
    Language, LanguageError, LanguageSelection, TranslatorKind,
};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zip::write::SimpleFileOptions;

// ── Test helpers ─────────────────────────────────────────────────────────────

const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn template_parts() -> Vec<(&'static str, String)> {
    vec![
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#
                .to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#
                .to_string(),
        ),
        (
            "word/document.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W}"><w:body><w:tbl><w:tr><w:tc><w:p><w:r><w:t>Old table</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:t>Old paragraph</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134"/></w:sectPr></w:body></w:document>"#
            ),
        ),
        (
            "word/_rels/document.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#
                .to_string(),
        ),
        (
            "word/styles.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{W}"><w:style w:type="paragraph" w:styleId="Rubrik2"><w:name w:val="heading 2"/></w:style><w:style w:type="paragraph" w:styleId="Punktlista"><w:name w:val="List Bullet"/></w:style><w:style w:type="character" w:styleId="Hyperlnk"><w:name w:val="Hyperlink"/></w:style></w:styles>"#
            ),
        ),
    ]
}

fn write_template(path: &Path) {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in template_parts() {
        writer
            .start_file(name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    let bytes = writer.finish().unwrap().into_inner();
    std::fs::write(path, bytes).unwrap();
}

fn write_png(path: &Path, w: u32, h: u32) {
    image::RgbImage::new(w, h).save(path).unwrap();
}

/// A temp workspace with a template, a profile picture and an empty logo dir.
struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_template(&dir.path().join("template.docx"));
        write_png(&dir.path().join("profile.png"), 300, 400);
        std::fs::create_dir_all(dir.path().join("logos")).unwrap();
        Self { dir }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn config(&self) -> cvgen::GenerationConfigBuilder {
        GenerationConfig::builder()
            .template_path(self.path("template.docx"))
            .profile_image(self.path("profile.png"))
            .output_dir(self.path("out"))
            .logo_dir(self.path("logos"))
            .no_remote_logos()
            .translator(TranslatorKind::None)
    }
}

fn read_part_bytes(docx: &Path, name: &str) -> Option<Vec<u8>> {
    let bytes = std::fs::read(docx).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut out = Vec::new();
    file.read_to_end(&mut out).unwrap();
    Some(out)
}

fn read_part(docx: &Path, name: &str) -> Option<String> {
    read_part_bytes(docx, name).map(|b| String::from_utf8(b).unwrap())
}

/// One body paragraph as seen by a reader of the document.
#[derive(Debug, Default)]
struct Para {
    text: String,
    page_break: bool,
    drawing: bool,
}

fn paragraphs(document_xml: &str) -> Vec<Para> {
    let mut reader = Reader::from_str(document_xml);
    let mut out = Vec::new();
    let mut current: Option<Para> = None;
    let mut in_text = false;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => current = Some(Para::default()),
                b"t" => in_text = true,
                b"drawing" => {
                    if let Some(p) = current.as_mut() {
                        p.drawing = true;
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match (e.local_name().as_ref(), current.as_mut()) {
                (b"p", None) => out.push(Para::default()),
                (b"br", Some(p)) => {
                    let is_page = e
                        .attributes()
                        .flatten()
                        .any(|a| a.key.as_ref() == b"w:type" && a.value.as_ref() == b"page");
                    if is_page {
                        p.page_break = true;
                    } else {
                        p.text.push('\n');
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(p) = current.as_mut() {
                    p.text.push_str(&t.unescape().unwrap());
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let Some(p) = current.take() {
                        out.push(p);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    out
}

fn index_of(paras: &[Para], text: &str) -> usize {
    paras
        .iter()
        .position(|p| p.text.trim() == text)
        .unwrap_or_else(|| panic!("paragraph {text:?} not found"))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_both_languages_from_builtin_content() {
    let ws = Workspace::new();
    let config = ws.config().build().unwrap();
    let report = generate(&config).await.unwrap();

    assert_eq!(report.origin, ContentOrigin::Fallback);
    assert_eq!(report.succeeded(), 2);
    let sv = ws.path("out/Daniel_Hansson_CV_2025_SV.docx");
    let en = ws.path("out/Daniel_Hansson_CV_2025_ENG.docx");
    assert!(sv.is_file());
    assert!(en.is_file());

    let en_paras = paragraphs(&read_part(&en, "word/document.xml").unwrap());
    let heading = index_of(&en_paras, "WORK EXPERIENCE");
    assert_eq!(en_paras[heading + 1].text.trim(), "Datacenter Manager");

    let sv_paras = paragraphs(&read_part(&sv, "word/document.xml").unwrap());
    let heading = index_of(&sv_paras, "ARBETSLIVSERFARENHET");
    assert_eq!(sv_paras[heading + 1].text.trim(), "Datacenter Manager");
}

#[tokio::test]
async fn test_template_body_is_replaced_but_section_kept() {
    let ws = Workspace::new();
    let config = ws.config().languages(LanguageSelection::English).build().unwrap();
    generate(&config).await.unwrap();

    let xml = read_part(&ws.path("out/Daniel_Hansson_CV_2025_ENG.docx"), "word/document.xml")
        .unwrap();
    assert!(!xml.contains("Old table"));
    assert!(!xml.contains("Old paragraph"));
    assert!(!xml.contains("<w:tbl>"));
    assert!(xml.contains(r#"<w:pgMar w:top="1134""#));
}

#[tokio::test]
async fn test_page_break_precedes_flagged_entries() {
    let ws = Workspace::new();
    let config = ws.config().languages(LanguageSelection::English).build().unwrap();
    generate(&config).await.unwrap();

    let paras = paragraphs(
        &read_part(&ws.path("out/Daniel_Hansson_CV_2025_ENG.docx"), "word/document.xml").unwrap(),
    );
    let specialist = index_of(&paras, "Application Specialist");
    assert!(paras[specialist - 1].page_break);
    let account = index_of(&paras, "Account Manager");
    assert!(paras[account - 1].page_break);

    let manager = index_of(&paras, "Datacenter Manager");
    assert!(!paras[manager - 1].page_break);
    assert_eq!(paras.iter().filter(|p| p.page_break).count(), 2);
}

#[tokio::test]
async fn test_page_number_header() {
    let ws = Workspace::new();
    let config = ws.config().languages(LanguageSelection::Swedish).build().unwrap();
    generate(&config).await.unwrap();

    let docx = ws.path("out/Daniel_Hansson_CV_2025_SV.docx");
    let header = read_part(&docx, "word/header1.xml").expect("header part");
    let page = header.find(" PAGE ").unwrap();
    let total = header.find(" NUMPAGES ").unwrap();
    assert!(page < total);
    assert!(header.contains(r#"<w:jc w:val="right"/>"#));

    let xml = read_part(&docx, "word/document.xml").unwrap();
    assert!(xml.contains(r#"<w:headerReference w:type="default""#));
    let ct = read_part(&docx, "[Content_Types].xml").unwrap();
    assert!(ct.contains("/word/header1.xml"));
}

#[tokio::test]
async fn test_profile_image_floats_and_links_resolve() {
    let ws = Workspace::new();
    let config = ws.config().languages(LanguageSelection::English).build().unwrap();
    let report = generate(&config).await.unwrap();
    assert!(report.languages[0].profile_image);

    let docx = ws.path("out/Daniel_Hansson_CV_2025_ENG.docx");
    let xml = read_part(&docx, "word/document.xml").unwrap();
    assert!(xml.contains("<wp:posOffset>4900000</wp:posOffset>"));
    assert!(xml.contains("<wp:posOffset>900000</wp:posOffset>"));
    // 300x400 px at 1.9 in wide.
    assert!(xml.contains(r#"<wp:extent cx="1737360" cy="2316480"/>"#));
    let png = read_part_bytes(&docx, "word/media/cvgen_image1.png").expect("media part");
    assert!(png.starts_with(b"\x89PNG"));

    let rels = read_part(&docx, "word/_rels/document.xml.rels").unwrap();
    assert!(rels.contains(r#"Target="mailto:mailto@danielhansson.nu" TargetMode="External""#));
    assert!(rels.contains(r#"Target="tel:+46734045555""#));
    assert!(rels.contains(r#"Target="https://github.com/enoch85""#));

    let paras = paragraphs(&xml);
    assert!(paras[0].drawing);
    assert!(paras[0].text.starts_with("Daniel Hansson\n"));
}

#[tokio::test]
async fn test_cached_logo_is_embedded() {
    let ws = Workspace::new();
    write_png(&ws.path("logos/infracom-logo.png"), 200, 100);
    let config = ws.config().languages(LanguageSelection::English).build().unwrap();
    let report = generate(&config).await.unwrap();

    assert_eq!(report.languages[0].logos, 1);
    assert_eq!(report.logos_found, 1);

    let docx = ws.path("out/Daniel_Hansson_CV_2025_ENG.docx");
    let xml = read_part(&docx, "word/document.xml").unwrap();
    // 0.35 in high, twice as wide.
    assert!(xml.contains(r#"<wp:extent cx="640080" cy="320040"/>"#));

    let paras = paragraphs(&xml);
    let title = paras
        .iter()
        .find(|p| p.text.trim() == "Datacenter Manager")
        .unwrap();
    assert!(title.drawing);
}

#[tokio::test]
async fn test_missing_profile_image_is_not_fatal() {
    let ws = Workspace::new();
    let config = ws
        .config()
        .profile_image(ws.path("nope.jpg"))
        .languages(LanguageSelection::Swedish)
        .build()
        .unwrap();
    let report = generate(&config).await.unwrap();
    assert_eq!(report.succeeded(), 1);
    assert!(!report.languages[0].profile_image);
}

#[tokio::test]
async fn test_site_content_without_translation() {
    let ws = Workspace::new();
    let site = ws.path("site");
    std::fs::create_dir_all(site.join("components")).unwrap();
    std::fs::write(
        site.join("components/Projects.tsx"),
        r#"
const projects = [
  { title: "nextcloud-vm", description: "Skript som installerar Nextcloud.", github: "https://github.com/nextcloud/vm" },
  { title: "cvgen", description: "Genererar CV." },
];
"#,
    )
    .unwrap();

    let config = ws.config().site_root(&site).build().unwrap();
    let report = generate(&config).await.unwrap();
    assert_eq!(report.origin, ContentOrigin::Site);
    assert_eq!(report.translator, "none");

    let paras = paragraphs(
        &read_part(&ws.path("out/Daniel_Hansson_CV_2025_ENG.docx"), "word/document.xml").unwrap(),
    );
    let projects = index_of(&paras, "PROJECTS & OPEN SOURCE");
    assert_eq!(
        paras[projects + 1].text,
        "nextcloud-vm: Skript som installerar Nextcloud."
    );
    assert_eq!(paras[projects + 2].text, "cvgen: Genererar CV.");
}

#[tokio::test]
async fn test_missing_template_fails_run() {
    let ws = Workspace::new();
    let config = ws
        .config()
        .template_path(ws.path("missing.docx"))
        .build()
        .unwrap();
    let err = generate(&config).await.unwrap_err();
    assert!(err.to_string().contains("All 2 language runs failed"));
    assert!(!ws.path("out/Daniel_Hansson_CV_2025_SV.docx").exists());
}

#[tokio::test]
async fn test_unwritable_output_fails_only_that_language() {
    let ws = Workspace::new();
    std::fs::create_dir_all(ws.path("out/Daniel_Hansson_CV_2025_SV.docx")).unwrap();
    let config = ws.config().build().unwrap();
    let report = generate(&config).await.unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 1);
    assert!(ws.path("out/Daniel_Hansson_CV_2025_ENG.docx").is_file());

    let sv = report
        .languages
        .iter()
        .find(|o| o.language == Language::Swedish)
        .unwrap();
    assert!(sv.output.is_none());
    match sv.error.as_ref().unwrap() {
        LanguageError::AssemblyFailed { language, .. } => assert_eq!(language, "sv"),
    }
}

#[tokio::test]
async fn test_progress_events() {
    #[derive(Default)]
    struct Counter {
        languages: AtomicUsize,
        sections: AtomicUsize,
        completed: AtomicUsize,
    }

    impl GenerationProgressCallback for Counter {
        fn on_language_start(&self, _language: Language) {
            self.languages.fetch_add(1, Ordering::SeqCst);
        }
        fn on_section(&self, _language: Language, _section: &str) {
            self.sections.fetch_add(1, Ordering::SeqCst);
        }
        fn on_language_complete(&self, _language: Language, _output: &Path) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    let ws = Workspace::new();
    let counter = Arc::new(Counter::default());
    let config = ws
        .config()
        .progress_callback(counter.clone() as Arc<dyn GenerationProgressCallback>)
        .build()
        .unwrap();
    generate(&config).await.unwrap();

    assert_eq!(counter.languages.load(Ordering::SeqCst), 2);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 2);
    // profile, competencies, experience, education, certificates, skills,
    // languages, projects
    assert_eq!(counter.sections.load(Ordering::SeqCst), 16);
}

#[test]
fn test_generate_sync() {
    let ws = Workspace::new();
    let config = ws
        .config()
        .languages(LanguageSelection::Swedish)
        .output_base_name("cv")
        .build()
        .unwrap();
    let report = generate_sync(&config).unwrap();
    assert_eq!(
        report.outputs().collect::<Vec<_>>(),
        vec![&ws.path("out/cv_SV.docx")]
    );
}
