//! WordprocessingML fragments: paragraphs, runs, hyperlinks, drawings and
//! fields.
//!
//! Builders render straight to strings. Text is escaped here; `\n` in run
//! text becomes a line break and `\t` a tab.

use super::{NS_A, NS_PIC};
use quick_xml::escape::escape;

/// Twips per point (paragraph spacing).
const TWIPS_PER_PT: u32 = 20;

// ── Runs ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum RunContent {
    Text(String),
    /// Pre-rendered `<w:drawing>`.
    Drawing(String),
    PageBreak,
    /// A complete field (`begin` … `end`) with the given instruction.
    Field(&'static str),
}

/// A run of uniformly formatted content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    content: RunContent,
    bold: bool,
    italic: bool,
    caps: bool,
    underline: bool,
    /// Font size in points.
    size_pt: Option<u32>,
    style: Option<String>,
    color: Option<String>,
}

impl Run {
    fn with(content: RunContent) -> Self {
        Self {
            content,
            bold: false,
            italic: false,
            caps: false,
            underline: false,
            size_pt: None,
            style: None,
            color: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with(RunContent::Text(text.into()))
    }

    pub fn drawing(xml: String) -> Self {
        Self::with(RunContent::Drawing(xml))
    }

    pub fn page_break() -> Self {
        Self::with(RunContent::PageBreak)
    }

    /// A `PAGE`, `NUMPAGES`, … field.
    pub fn field(instruction: &'static str) -> Self {
        Self::with(RunContent::Field(instruction))
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn caps(mut self) -> Self {
        self.caps = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn size(mut self, pt: u32) -> Self {
        self.size_pt = Some(pt);
        self
    }

    /// Character style id.
    pub fn style(mut self, id: impl Into<String>) -> Self {
        self.style = Some(id.into());
        self
    }

    /// Hex RGB colour, e.g. `"0563C1"`.
    pub fn color(mut self, rgb: impl Into<String>) -> Self {
        self.color = Some(rgb.into());
        self
    }

    /// Plain text of this run (drawings and fields contribute nothing).
    pub fn plain_text(&self) -> &str {
        match &self.content {
            RunContent::Text(t) => t,
            _ => "",
        }
    }

    fn properties(&self) -> String {
        let mut p = String::new();
        if let Some(style) = &self.style {
            p.push_str(&format!(r#"<w:rStyle w:val="{}"/>"#, escape(style.as_str())));
        }
        if self.bold {
            p.push_str("<w:b/><w:bCs/>");
        }
        if self.italic {
            p.push_str("<w:i/><w:iCs/>");
        }
        if self.caps {
            p.push_str("<w:caps/>");
        }
        if let Some(color) = &self.color {
            p.push_str(&format!(r#"<w:color w:val="{}"/>"#, escape(color.as_str())));
        }
        if let Some(pt) = self.size_pt {
            let half_points = pt * 2;
            p.push_str(&format!(
                r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
                half_points
            ));
        }
        if self.underline {
            p.push_str(r#"<w:u w:val="single"/>"#);
        }
        if p.is_empty() {
            p
        } else {
            format!("<w:rPr>{}</w:rPr>", p)
        }
    }

    pub fn write_xml(&self, out: &mut String) {
        let rpr = self.properties();
        match &self.content {
            RunContent::Text(text) => {
                out.push_str("<w:r>");
                out.push_str(&rpr);
                push_text(out, text);
                out.push_str("</w:r>");
            }
            RunContent::Drawing(xml) => {
                out.push_str("<w:r>");
                out.push_str(&rpr);
                out.push_str(xml);
                out.push_str("</w:r>");
            }
            RunContent::PageBreak => {
                out.push_str(r#"<w:r><w:br w:type="page"/></w:r>"#);
            }
            RunContent::Field(instr) => {
                let r = |inner: &str| format!("<w:r>{}{}</w:r>", rpr, inner);
                out.push_str(&r(r#"<w:fldChar w:fldCharType="begin"/>"#));
                out.push_str(&r(&format!(
                    r#"<w:instrText xml:space="preserve"> {} </w:instrText>"#,
                    instr
                )));
                out.push_str(&r(r#"<w:fldChar w:fldCharType="separate"/>"#));
                out.push_str(&r("<w:t>1</w:t>"));
                out.push_str(&r(r#"<w:fldChar w:fldCharType="end"/>"#));
            }
        }
    }
}

/// Text with `\n` → `<w:br/>` and `\t` → `<w:tab/>`.
fn push_text(out: &mut String, text: &str) {
    let mut segment = String::new();
    let flush = |out: &mut String, segment: &mut String| {
        if !segment.is_empty() {
            out.push_str(&format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape(segment.as_str())
            ));
            segment.clear();
        }
    };
    for c in text.chars() {
        match c {
            '\n' => {
                flush(out, &mut segment);
                out.push_str("<w:br/>");
            }
            '\t' => {
                flush(out, &mut segment);
                out.push_str("<w:tab/>");
            }
            '\r' => {}
            _ => segment.push(c),
        }
    }
    flush(out, &mut segment);
}

// ── Paragraphs ───────────────────────────────────────────────────────────

/// Paragraph content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Run(Run),
    /// A run wrapped in `<w:hyperlink r:id=…>`.
    Hyperlink { rel_id: String, run: Run },
}

/// A `<w:p>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    style: Option<String>,
    align_right: bool,
    space_before_pt: Option<u32>,
    space_after_pt: Option<u32>,
    content: Vec<Inline>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paragraph style id.
    pub fn style(mut self, id: Option<&str>) -> Self {
        self.style = id.map(str::to_string);
        self
    }

    pub fn align_right(mut self) -> Self {
        self.align_right = true;
        self
    }

    pub fn space_before(mut self, pt: u32) -> Self {
        self.space_before_pt = Some(pt);
        self
    }

    pub fn space_after(mut self, pt: u32) -> Self {
        self.space_after_pt = Some(pt);
        self
    }

    pub fn run(mut self, run: Run) -> Self {
        self.content.push(Inline::Run(run));
        self
    }

    pub fn hyperlink(mut self, rel_id: impl Into<String>, run: Run) -> Self {
        self.content.push(Inline::Hyperlink {
            rel_id: rel_id.into(),
            run,
        });
        self
    }

    pub fn content(&self) -> &[Inline] {
        &self.content
    }

    /// Concatenated text of all runs, hyperlinks included.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|i| match i {
                Inline::Run(r) | Inline::Hyperlink { run: r, .. } => r.plain_text(),
            })
            .collect()
    }

    fn properties(&self) -> String {
        let mut p = String::new();
        if let Some(style) = &self.style {
            p.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape(style.as_str())));
        }
        if self.space_before_pt.is_some() || self.space_after_pt.is_some() {
            p.push_str("<w:spacing");
            if let Some(pt) = self.space_before_pt {
                p.push_str(&format!(r#" w:before="{}""#, pt * TWIPS_PER_PT));
            }
            if let Some(pt) = self.space_after_pt {
                p.push_str(&format!(r#" w:after="{}""#, pt * TWIPS_PER_PT));
            }
            p.push_str("/>");
        }
        if self.align_right {
            p.push_str(r#"<w:jc w:val="right"/>"#);
        }
        if p.is_empty() {
            p
        } else {
            format!("<w:pPr>{}</w:pPr>", p)
        }
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from("<w:p>");
        out.push_str(&self.properties());
        for inline in &self.content {
            match inline {
                Inline::Run(run) => run.write_xml(&mut out),
                Inline::Hyperlink { rel_id, run } => {
                    out.push_str(&format!(
                        r#"<w:hyperlink r:id="{}" w:history="1">"#,
                        escape(rel_id.as_str())
                    ));
                    run.write_xml(&mut out);
                    out.push_str("</w:hyperlink>");
                }
            }
        }
        out.push_str("</w:p>");
        out
    }
}

// ── Drawings ─────────────────────────────────────────────────────────────

/// An embedded picture, sized in EMU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub rel_id: String,
    /// Unique `wp:docPr` id within the document.
    pub doc_pr_id: u32,
    pub name: String,
    pub cx: u64,
    pub cy: u64,
}

/// Page-relative offset of a floating picture, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPosition {
    pub x: u64,
    pub y: u64,
}

fn graphic(pic: &Picture) -> String {
    format!(
        concat!(
            r#"<a:graphic xmlns:a="{ns_a}"><a:graphicData uri="{ns_pic}">"#,
            r#"<pic:pic xmlns:pic="{ns_pic}">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="0" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic>"#
        ),
        ns_a = NS_A,
        ns_pic = NS_PIC,
        name = escape(pic.name.as_str()),
        rid = escape(pic.rel_id.as_str()),
        cx = pic.cx,
        cy = pic.cy,
    )
}

/// `<w:drawing>` with an inline (in-text) picture.
pub fn inline_drawing(pic: &Picture) -> String {
    format!(
        concat!(
            r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
            r#"<wp:docPr id="{id}" name="Picture {id}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="{ns_a}" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            "{graphic}</wp:inline></w:drawing>"
        ),
        cx = pic.cx,
        cy = pic.cy,
        id = pic.doc_pr_id,
        ns_a = NS_A,
        graphic = graphic(pic),
    )
}

/// `<w:drawing>` with a picture floating at a fixed page position, text
/// wrapping square on its left.
pub fn anchored_drawing(pic: &Picture, pos: AnchorPosition) -> String {
    format!(
        concat!(
            r#"<w:drawing><wp:anchor distT="0" distB="0" distL="114300" distR="114300" simplePos="0" "#,
            r#"relativeHeight="251658240" behindDoc="0" locked="0" layoutInCell="1" allowOverlap="1">"#,
            r#"<wp:simplePos x="0" y="0"/>"#,
            r#"<wp:positionH relativeFrom="page"><wp:posOffset>{x}</wp:posOffset></wp:positionH>"#,
            r#"<wp:positionV relativeFrom="page"><wp:posOffset>{y}</wp:posOffset></wp:positionV>"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
            r#"<wp:wrapSquare wrapText="left"/>"#,
            r#"<wp:docPr id="{id}" name="Picture {id}"/><wp:cNvGraphicFramePr/>"#,
            "{graphic}</wp:anchor></w:drawing>"
        ),
        x = pos.x,
        y = pos.y,
        cx = pic.cx,
        cy = pic.cy,
        id = pic.doc_pr_id,
        graphic = graphic(pic),
    )
}
