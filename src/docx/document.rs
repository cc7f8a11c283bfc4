//! The main document part of a template package, opened for rebuilding.
//!
//! Opening a template splits `word/document.xml` into the text before the
//! body content, the body children worth keeping, the final `w:sectPr` and
//! the text after the body. Paragraphs and tables of the template are
//! dropped; new paragraphs are appended with [`Document::push`] and the
//! whole part is re-serialised by [`Document::into_package`].

use super::markup::{self, AnchorPosition, Paragraph, Picture, Run};
use super::package::Package;
use super::parts::{attr, for_each_element, ContentTypes, Relationships, StyleMap};
use super::{
    CT_HEADER, NS_R, NS_W, NS_WP, REL_HEADER, REL_HYPERLINK, REL_IMAGE, REL_OFFICE_DOCUMENT,
    REL_STYLES, XML_DECL,
};
use crate::error::CvError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// English Metric Units per inch (drawing extents and offsets).
pub const EMU_PER_INCH: u64 = 914_400;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PACKAGE_RELS_PART: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// An embedded image: relationship id and pixel dimensions.
#[derive(Debug, Clone)]
struct Media {
    rel_id: String,
    width_px: u32,
    height_px: u32,
    name: String,
}

/// A template being rebuilt.
#[derive(Debug)]
pub struct Document {
    package: Package,
    main_part: String,
    rels_part: String,

    prefix: String,
    kept: Vec<String>,
    sect_pr: Option<String>,
    suffix: String,
    paragraphs: Vec<Paragraph>,

    rels: Relationships,
    content_types: ContentTypes,
    styles: StyleMap,

    media: HashMap<PathBuf, Media>,
    next_doc_pr: u32,
}

/// Main document part split around its body content.
#[derive(Debug)]
struct BodySplit {
    prefix: String,
    kept: Vec<String>,
    sect_pr: Option<String>,
    suffix: String,
    max_doc_pr: u32,
}

impl Document {
    /// Open a template `.docx` from disk.
    pub fn open(path: &Path) -> Result<Self, CvError> {
        Self::from_package(Package::open(path)?)
    }

    pub fn from_package(package: Package) -> Result<Self, CvError> {
        let invalid = |detail: String| CvError::InvalidTemplate { detail };

        let content_types =
            ContentTypes::parse(&package.xml_part(CONTENT_TYPES_PART)?).map_err(invalid)?;

        let main_part = match package.part(PACKAGE_RELS_PART) {
            Some(_) => {
                let rels = Relationships::parse(&package.xml_part(PACKAGE_RELS_PART)?)
                    .map_err(invalid)?;
                rels.find_by_type(REL_OFFICE_DOCUMENT)
                    .map(|r| r.target.trim_start_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string())
            }
            None => DEFAULT_MAIN_PART.to_string(),
        };
        let rels_part = rels_part_for(&main_part);

        let rels = if package.contains(&rels_part) {
            Relationships::parse(&package.xml_part(&rels_part)?).map_err(invalid)?
        } else {
            Relationships::default()
        };

        let styles_part = rels
            .find_by_type(REL_STYLES)
            .map(|r| resolve_target(&main_part, &r.target))
            .unwrap_or_else(|| "word/styles.xml".to_string());
        let styles = if package.contains(&styles_part) {
            StyleMap::parse(&package.xml_part(&styles_part)?).map_err(invalid)?
        } else {
            warn!("Template has no style part; named styles fall back to direct formatting");
            StyleMap::default()
        };

        let split = split_body(&package.xml_part(&main_part)?)?;
        debug!(
            "Template: main part '{}', {} kept body elements, {} styles, sectPr {}",
            main_part,
            split.kept.len(),
            styles.len(),
            if split.sect_pr.is_some() { "present" } else { "absent" }
        );

        Ok(Self {
            package,
            main_part,
            rels_part,
            prefix: split.prefix,
            kept: split.kept,
            sect_pr: split.sect_pr,
            suffix: split.suffix,
            paragraphs: Vec::new(),
            rels,
            content_types,
            styles,
            media: HashMap::new(),
            next_doc_pr: split.max_doc_pr + 1,
        })
    }

    // ── Content ──────────────────────────────────────────────────────────

    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Style id for a style display name, if the template defines it.
    pub fn style_id(&self, name: &str) -> Option<&str> {
        self.styles.id_for(name)
    }

    /// Register an external hyperlink target; returns its relationship id.
    pub fn add_hyperlink(&mut self, url: &str) -> String {
        self.rels.add(REL_HYPERLINK, url, true)
    }

    // ── Images ───────────────────────────────────────────────────────────

    /// A run holding `path` as an inline picture `height_emu` high, width
    /// scaled to the image's aspect ratio.
    pub fn inline_image(&mut self, path: &Path, height_emu: u64) -> Result<Run, CvError> {
        let media = self.embed_image(path)?;
        let width_emu = height_emu * media.width_px as u64 / media.height_px as u64;
        let pic = self.picture(&media, width_emu, height_emu);
        Ok(Run::drawing(markup::inline_drawing(&pic)))
    }

    /// A run holding `path` as a picture `width_emu` wide, floating at a
    /// fixed page position.
    pub fn floating_image(
        &mut self,
        path: &Path,
        width_emu: u64,
        position: AnchorPosition,
    ) -> Result<Run, CvError> {
        let media = self.embed_image(path)?;
        let height_emu = width_emu * media.height_px as u64 / media.width_px as u64;
        let pic = self.picture(&media, width_emu, height_emu);
        Ok(Run::drawing(markup::anchored_drawing(&pic, position)))
    }

    fn picture(&mut self, media: &Media, cx: u64, cy: u64) -> Picture {
        let doc_pr_id = self.next_doc_pr;
        self.next_doc_pr += 1;
        Picture {
            rel_id: media.rel_id.clone(),
            doc_pr_id,
            name: media.name.clone(),
            cx,
            cy,
        }
    }

    /// Copy an image into the package once per path.
    fn embed_image(&mut self, path: &Path) -> Result<Media, CvError> {
        if let Some(media) = self.media.get(path) {
            return Ok(media.clone());
        }
        let unreadable = |detail: String| CvError::ImageUnreadable {
            path: path.to_path_buf(),
            detail,
        };

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let content_type = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            other => return Err(unreadable(format!("unsupported image type '{}'", other))),
        };

        let (width_px, height_px) =
            image::image_dimensions(path).map_err(|e| unreadable(e.to_string()))?;
        if width_px == 0 || height_px == 0 {
            return Err(unreadable("image has zero size".into()));
        }
        let data = std::fs::read(path).map_err(|e| unreadable(e.to_string()))?;

        let media_dir = match self.main_part.rsplit_once('/') {
            Some((dir, _)) => format!("{}/media", dir),
            None => "media".to_string(),
        };
        let mut n = self.media.len() + 1;
        let name = loop {
            let candidate = format!("cvgen_image{}.{}", n, ext);
            if !self.package.contains(&format!("{}/{}", media_dir, candidate)) {
                break candidate;
            }
            n += 1;
        };
        self.package
            .set_part(&format!("{}/{}", media_dir, name), data);
        self.content_types.ensure_default(&ext, content_type);
        let rel_id = self
            .rels
            .add(REL_IMAGE, &format!("media/{}", name), false);
        debug!(
            "Embedded {} ({}x{} px) as {}",
            path.display(),
            width_px,
            height_px,
            rel_id
        );

        let media = Media {
            rel_id,
            width_px,
            height_px,
            name,
        };
        self.media.insert(path.to_path_buf(), media.clone());
        Ok(media)
    }

    // ── Header ───────────────────────────────────────────────────────────

    /// Make the default header a right-aligned "PAGE (NUMPAGES)" line.
    ///
    /// An existing default header part is replaced; otherwise a new header
    /// part is created and referenced from the section properties.
    pub fn set_page_number_header(&mut self) -> Result<(), CvError> {
        let paragraph = Paragraph::new()
            .align_right()
            .run(Run::field("PAGE"))
            .run(Run::text(" ("))
            .run(Run::field("NUMPAGES"))
            .run(Run::text(")"));
        let header_xml = format!(
            r#"{}<w:hdr xmlns:w="{}" xmlns:r="{}">{}</w:hdr>"#,
            XML_DECL,
            NS_W,
            NS_R,
            paragraph.to_xml()
        );

        if let Some(rel_id) = self.default_header_ref()? {
            let target = self
                .rels
                .get(&rel_id)
                .map(|r| r.target.clone())
                .ok_or_else(|| CvError::InvalidTemplate {
                    detail: format!("default header reference '{}' has no relationship", rel_id),
                })?;
            let part = resolve_target(&self.main_part, &target);
            debug!("Replacing default header part {}", part);
            self.content_types.ensure_override(&part, CT_HEADER);
            self.package.set_part(&part, header_xml);
            return Ok(());
        }

        let dir = self
            .main_part
            .rsplit_once('/')
            .map(|(d, _)| format!("{}/", d))
            .unwrap_or_default();
        let mut n = 1;
        while self.package.contains(&format!("{}header{}.xml", dir, n)) {
            n += 1;
        }
        let file = format!("header{}.xml", n);
        let part = format!("{}{}", dir, file);
        let rel_id = self.rels.add(REL_HEADER, &file, false);
        self.content_types.ensure_override(&part, CT_HEADER);
        self.package.set_part(&part, header_xml);

        let reference = format!(r#"<w:headerReference w:type="default" r:id="{}"/>"#, rel_id);
        self.sect_pr = Some(match self.sect_pr.take() {
            None => format!("<w:sectPr>{}</w:sectPr>", reference),
            Some(sect) => insert_first_child(&sect, &reference, "w:sectPr"),
        });
        debug!("Created header part {} ({})", part, rel_id);
        Ok(())
    }

    fn default_header_ref(&self) -> Result<Option<String>, CvError> {
        let Some(sect) = &self.sect_pr else {
            return Ok(None);
        };
        let mut found = None;
        // Prefixes are declared on the root element, not on the fragment.
        let wrapped = format!(
            r#"<root xmlns:w="{}" xmlns:r="{}">{}</root>"#,
            NS_W, NS_R, sect
        );
        for_each_element(&wrapped, |e, _| {
            if found.is_none()
                && e.local_name().as_ref() == b"headerReference"
                && attr(e, b"w:type").as_deref() == Some("default")
            {
                found = attr(e, b"r:id");
            }
        })
        .map_err(|detail| CvError::InvalidTemplate { detail })?;
        Ok(found)
    }

    // ── Output ───────────────────────────────────────────────────────────

    /// The rebuilt main document part.
    pub fn document_xml(&self) -> String {
        let mut xml = String::with_capacity(
            self.prefix.len() + self.suffix.len() + self.paragraphs.len() * 256,
        );
        xml.push_str(&self.prefix);
        for kept in &self.kept {
            xml.push_str(kept);
        }
        for p in &self.paragraphs {
            xml.push_str(&p.to_xml());
        }
        if let Some(sect) = &self.sect_pr {
            xml.push_str(sect);
        }
        xml.push_str(&self.suffix);
        xml
    }

    pub fn into_package(mut self) -> Package {
        let xml = self.document_xml();
        self.package.set_part(&self.main_part, xml);
        self.package.set_part(&self.rels_part, self.rels.to_xml());
        self.package
            .set_part(CONTENT_TYPES_PART, self.content_types.to_xml());
        self.package
    }

    pub fn save(self, path: &Path) -> Result<(), CvError> {
        self.into_package().save(path)
    }
}

/// `word/document.xml` → `word/_rels/document.xml.rels`.
fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target relative to the directory of `source`.
fn resolve_target(source: &str, target: &str) -> String {
    if let Some(abs) = target.strip_prefix('/') {
        return abs.to_string();
    }
    let mut segments: Vec<&str> = match source.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for seg in target.split('/') {
        match seg {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Insert `child` right after the start tag of `element`, expanding a
/// self-closing element.
fn insert_first_child(element: &str, child: &str, qname: &str) -> String {
    let Some(tag_end) = element.find('>') else {
        return format!("<{0}>{1}</{0}>", qname, child);
    };
    if element[..tag_end].ends_with('/') {
        let open = element[..tag_end - 1].trim_end();
        format!("{}>{}</{}>", open, child, qname)
    } else {
        format!(
            "{}{}{}",
            &element[..=tag_end],
            child,
            &element[tag_end + 1..]
        )
    }
}

/// Offset of the `<` that opens the markup read from `pos`.
fn markup_start(xml: &str, pos: usize) -> usize {
    let bytes = xml.as_bytes();
    let upto = pos.min(bytes.len().saturating_sub(1));
    bytes[..=upto]
        .iter()
        .rposition(|&b| b == b'<')
        .unwrap_or(pos)
}

/// Add `xmlns:prefix` to a start tag when it is not declared.
fn ensure_namespace(tag: &str, prefix: &str, uri: &str) -> String {
    if tag.contains(&format!("xmlns:{}=", prefix)) {
        return tag.to_string();
    }
    let close = tag.trim_end_matches('>');
    format!(r#"{} xmlns:{}="{}">"#, close, prefix, uri)
}

fn split_body(xml: &str) -> Result<BodySplit, CvError> {
    let invalid = |detail: String| CvError::InvalidTemplate { detail };
    let mut reader = Reader::from_str(xml);

    let mut depth = 0usize;
    let mut root: Option<(usize, usize)> = None;
    let mut body_open_end: Option<usize> = None;
    let mut body_close_start: Option<usize> = None;
    let mut child: Option<(usize, Vec<u8>)> = None;
    let mut children: Vec<(Vec<u8>, usize, usize)> = Vec::new();
    let mut max_doc_pr = 0u32;

    loop {
        let pos = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| invalid(format!("document XML error near byte {}: {}", pos, e)))?;
        let end = reader.buffer_position() as usize;
        let in_body = body_open_end.is_some() && body_close_start.is_none();

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"docPr" {
                    max_doc_pr = max_doc_pr.max(doc_pr_id(&e));
                }
                if depth == 0 {
                    if name != b"document" {
                        return Err(invalid("main part is not a w:document".into()));
                    }
                    root = Some((markup_start(xml, pos), end));
                } else if depth == 1 && name == b"body" && body_open_end.is_none() {
                    body_open_end = Some(end);
                } else if depth == 2 && in_body {
                    child = Some((markup_start(xml, pos), name));
                }
                depth += 1;
            }
            Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                if depth == 1 && name == b"body" {
                    return Err(invalid("document body is empty".into()));
                }
                if depth == 2 && in_body {
                    children.push((name.clone(), markup_start(xml, pos), end));
                }
                if name == b"docPr" {
                    max_doc_pr = max_doc_pr.max(doc_pr_id(&e));
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth == 2 && in_body {
                    if let Some((start, name)) = child.take() {
                        children.push((name, start, end));
                    }
                } else if depth == 1 && in_body && e.local_name().as_ref() == b"body" {
                    body_close_start = Some(markup_start(xml, pos));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let (root_start, root_end) = root.ok_or_else(|| invalid("main part has no root".into()))?;
    let (Some(open_end), Some(close_start)) = (body_open_end, body_close_start) else {
        return Err(invalid("document has no w:body".into()));
    };

    let root_tag = ensure_namespace(&xml[root_start..root_end], "r", NS_R);
    let root_tag = ensure_namespace(&root_tag, "wp", NS_WP);
    let prefix = format!(
        "{}{}{}",
        &xml[..root_start],
        root_tag,
        &xml[root_end..open_end]
    );

    let last_sect = children.iter().rposition(|(n, _, _)| n == b"sectPr");
    let mut kept = Vec::new();
    let mut sect_pr = None;
    let mut dropped = 0usize;
    for (i, (name, start, end)) in children.iter().enumerate() {
        let text = xml[*start..*end].to_string();
        if Some(i) == last_sect {
            sect_pr = Some(text);
        } else if name == b"p" || name == b"tbl" {
            dropped += 1;
        } else {
            kept.push(text);
        }
    }
    debug!("Template body: dropped {} paragraphs/tables", dropped);

    Ok(BodySplit {
        prefix,
        kept,
        sect_pr,
        suffix: xml[close_start..].to_string(),
        max_doc_pr,
    })
}

fn doc_pr_id(e: &quick_xml::events::BytesStart<'_>) -> u32 {
    attr(e, b"id").and_then(|v| v.parse().ok()).unwrap_or(0)
}
