//! A small OOXML word-processing package editor.
//!
//! Only what résumé assembly needs: open a template, drop its body
//! paragraphs and tables, append new paragraphs, embed images, add
//! hyperlink relationships and put page-number fields in the default
//! header. Everything else in the template (styles, numbering, theme,
//! section properties) passes through untouched.
//!
//! ```text
//! Package (zip parts)
//!   └─ Document
//!        ├─ word/document.xml       body rebuilt, sectPr kept
//!        ├─ word/_rels/…rels        Relationships
//!        ├─ [Content_Types].xml     ContentTypes
//!        ├─ word/styles.xml         StyleMap (read only)
//!        └─ word/header*.xml        page-number header
//! ```

pub mod document;
pub mod markup;
pub mod package;
pub mod parts;

pub use document::{Document, EMU_PER_INCH};
pub use markup::{AnchorPosition, Inline, Paragraph, Run};
pub use package::Package;

// ── Namespaces and relationship types ────────────────────────────────────

pub(crate) const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const NS_R: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_WP: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub(crate) const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
pub(crate) const REL_HEADER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
pub(crate) const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

pub(crate) const CT_HEADER: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";

pub(crate) const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
