//! Small XML parts: relationships, content types and the style table.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// Unescaped value of attribute `key` (qualified name, e.g. `w:val`).
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Visit every start/empty element of `xml` in document order.
pub(crate) fn for_each_element(
    xml: &str,
    mut f: impl FnMut(&BytesStart<'_>, bool),
) -> Result<(), String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => f(&e, false),
            Ok(Event::Empty(e)) => f(&e, true),
            Ok(Event::Eof) => return Ok(()),
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }
}

// ── Relationships ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// A `.rels` part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut items = Vec::new();
        for_each_element(xml, |e, _| {
            if e.local_name().as_ref() != b"Relationship" {
                return;
            }
            if let (Some(id), Some(rel_type), Some(target)) =
                (attr(e, b"Id"), attr(e, b"Type"), attr(e, b"Target"))
            {
                let external = attr(e, b"TargetMode").as_deref() == Some("External");
                items.push(Relationship {
                    id,
                    rel_type,
                    target,
                    external,
                });
            }
        })?;
        Ok(Self { items })
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn find_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// Add a relationship and return its new id (`rIdN`, N past the
    /// highest numeric id in use).
    pub fn add(&mut self, rel_type: &str, target: &str, external: bool) -> String {
        let next = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{}", next);
        self.items.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from(super::XML_DECL);
        out.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for r in &self.items {
            out.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape(r.id.as_str()),
                escape(r.rel_type.as_str()),
                escape(r.target.as_str())
            ));
            if r.external {
                out.push_str(r#" TargetMode="External""#);
            }
            out.push_str("/>");
        }
        out.push_str("</Relationships>");
        out
    }
}

// ── Content types ────────────────────────────────────────────────────────

/// `[Content_Types].xml`.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut ct = Self::default();
        for_each_element(xml, |e, _| match e.local_name().as_ref() {
            b"Default" => {
                if let (Some(ext), Some(t)) = (attr(e, b"Extension"), attr(e, b"ContentType")) {
                    ct.defaults.push((ext, t));
                }
            }
            b"Override" => {
                if let (Some(part), Some(t)) = (attr(e, b"PartName"), attr(e, b"ContentType")) {
                    ct.overrides.push((part, t));
                }
            }
            _ => {}
        })?;
        Ok(ct)
    }

    pub fn has_default(&self, ext: &str) -> bool {
        self.defaults.iter().any(|(e, _)| e.eq_ignore_ascii_case(ext))
    }

    pub fn ensure_default(&mut self, ext: &str, content_type: &str) {
        if !self.has_default(ext) {
            self.defaults
                .push((ext.to_string(), content_type.to_string()));
        }
    }

    /// `part_name` is the package path without the leading `/`.
    pub fn ensure_override(&mut self, part_name: &str, content_type: &str) {
        let part = format!("/{}", part_name.trim_start_matches('/'));
        match self.overrides.iter_mut().find(|(p, _)| *p == part) {
            Some((_, t)) => *t = content_type.to_string(),
            None => self.overrides.push((part, content_type.to_string())),
        }
    }

    pub fn override_for(&self, part_name: &str) -> Option<&str> {
        let part = format!("/{}", part_name.trim_start_matches('/'));
        self.overrides
            .iter()
            .find(|(p, _)| *p == part)
            .map(|(_, t)| t.as_str())
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from(super::XML_DECL);
        out.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        for (ext, t) in &self.defaults {
            out.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(ext.as_str()),
                escape(t.as_str())
            ));
        }
        for (part, t) in &self.overrides {
            out.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape(part.as_str()),
                escape(t.as_str())
            ));
        }
        out.push_str("</Types>");
        out
    }
}

// ── Styles ───────────────────────────────────────────────────────────────

/// Style display name → style id, from `word/styles.xml`.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    by_name: HashMap<String, String>,
}

impl StyleMap {
    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut by_name = HashMap::new();
        let mut current: Option<String> = None;
        for_each_element(xml, |e, empty| match e.local_name().as_ref() {
            b"style" => current = if empty { None } else { attr(e, b"w:styleId") },
            b"name" => {
                if let (Some(id), Some(name)) = (current.as_ref(), attr(e, b"w:val")) {
                    by_name.insert(name.to_lowercase(), id.clone());
                }
            }
            _ => {}
        })?;
        Ok(Self { by_name })
    }

    /// Style id for a display name such as `"heading 2"` or `"List Bullet"`.
    /// Matching is case-insensitive.
    pub fn id_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>
  <Relationship Id="link" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://a.example/?x=1&amp;y=2" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn relationships_parse_and_number_new_ids() {
        let mut rels = Relationships::parse(RELS).unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels.get("rId7").unwrap().target, "header1.xml");
        let link = rels.get("link").unwrap();
        assert!(link.external);
        assert_eq!(link.target, "https://a.example/?x=1&y=2");

        let id = rels.add(super::super::REL_IMAGE, "media/a.png", false);
        assert_eq!(id, "rId8");
        let xml = rels.to_xml();
        assert!(xml.contains(r#"Target="https://a.example/?x=1&amp;y=2" TargetMode="External""#));
        assert_eq!(Relationships::parse(&xml).unwrap().len(), 4);
    }

    #[test]
    fn content_types_ensure_is_idempotent() {
        let mut ct = ContentTypes::parse(
            r#"<Types xmlns="x"><Default Extension="xml" ContentType="application/xml"/><Default Extension="PNG" ContentType="image/png"/></Types>"#,
        )
        .unwrap();
        ct.ensure_default("png", "image/png");
        ct.ensure_default("jpeg", "image/jpeg");
        ct.ensure_override("word/header1.xml", "h");
        ct.ensure_override("/word/header1.xml", "h2");
        let xml = ct.to_xml();
        assert_eq!(xml.matches("Extension=").count(), 3);
        assert_eq!(ct.override_for("word/header1.xml"), Some("h2"));
    }

    #[test]
    fn style_names_map_to_ids() {
        let styles = StyleMap::parse(
            r#"<w:styles xmlns:w="x">
                <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
                <w:style w:type="paragraph" w:styleId="Listaviadetecken"><w:name w:val="List Bullet"/></w:style>
                <w:docDefaults><w:rPrDefault/></w:docDefaults>
            </w:styles>"#,
        )
        .unwrap();
        assert_eq!(styles.id_for("Heading 2"), Some("Heading2"));
        assert_eq!(styles.id_for("list bullet"), Some("Listaviadetecken"));
        assert_eq!(styles.id_for("Title"), None);
    }
}
