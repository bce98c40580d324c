//! Minimal WordprocessingML package writer.
//!
//! Emits `[Content_Types].xml`, the package relationships and a single
//! `word/document.xml`. Styling is inline (run and paragraph properties) so no
//! styles part is needed.
use super::{DocumentRenderer, RenderError};
use crate::render::{
    Block, DetailBlock, Document, StatusIcon, LOCATION_LABEL, STATUS_LABEL,
};
use crate::theme::{
    Color, DETAIL_TITLE_FILL, ON_THEME_TEXT, ORGANIZATION_FILL, ORGANIZATION_TEXT,
};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

const HEADING_FONT: &str = "Gilroy ExtraBold";
const ACTION_FONT: &str = "Gilroy Light";
const BODY_FONT: &str = "Neutro";
const LABEL_FONT: &str = "Neutro Thin";

const CALENDAR_ICON: &str = "\u{1F4C5}";
const LOCATION_ICON: &str = "\u{1F4CD}";
const COMPLETED_ICON: &str = "\u{2705}";
const IN_PROGRESS_ICON: &str = "\u{23F3}";

/// Five equal grid columns; detail rows merge them with `gridSpan`.
const GRID_COLUMNS: usize = 5;
const GRID_COLUMN_TWIPS: u32 = 1800;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

/// `.docx` serializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl DocumentRenderer for DocxRenderer {
    fn extension(&self) -> &'static str {
        "docx"
    }

    fn render(&self, document: &Document) -> Result<Vec<u8>, RenderError> {
        let body = document_xml(document);
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES.as_bytes())?;
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(PACKAGE_RELS.as_bytes())?;
        zip.start_file("word/document.xml", options)?;
        zip.write_all(body.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

fn document_xml(document: &Document) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push_str(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for block in &document.blocks {
        match block {
            Block::ThemeTitle { text, color } => append_theme_title(&mut out, text, *color),
            Block::OrganizationHeader { text } => append_organization(&mut out, text),
            Block::ProgramHeader { text, color } => append_program(&mut out, text, *color),
            Block::ActionHeader { text, color } => append_action(&mut out, text, *color),
            Block::Detail(detail) => append_detail(&mut out, detail),
            Block::PageBreak => out.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#),
        }
    }
    out.push_str(
        r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="709" w:footer="709" w:gutter="0"/></w:sectPr>"#,
    );
    out.push_str("</w:body></w:document>");
    out
}

/// Inline run formatting.
struct RunStyle<'a> {
    font: &'a str,
    half_points: u32,
    bold: bool,
    color: Option<Color>,
}

impl RunStyle<'_> {
    const fn body(half_points: u32) -> RunStyle<'static> {
        RunStyle {
            font: BODY_FONT,
            half_points,
            bold: false,
            color: None,
        }
    }
}

fn run(out: &mut String, text: &str, style: &RunStyle<'_>) {
    out.push_str("<w:r><w:rPr>");
    out.push_str(&format!(
        r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#,
        font = escape(style.font)
    ));
    if style.bold {
        out.push_str("<w:b/>");
    }
    if let Some(color) = style.color {
        out.push_str(&format!(r#"<w:color w:val="{}"/>"#, color.hex()));
    }
    out.push_str(&format!(r#"<w:sz w:val="{}"/>"#, style.half_points));
    out.push_str("</w:rPr>");
    append_text(out, text);
    out.push_str("</w:r>");
}

/// Characters XML 1.0 cannot carry are dropped; `\r` is folded into the
/// following line break.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn append_text(out: &mut String, text: &str) {
    let text: String = text.chars().filter(|ch| is_xml_char(*ch)).collect();
    // tabs and line breaks are run content, not text
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push_str("<w:br/>");
        }
        for (tab_idx, piece) in line.split('\t').enumerate() {
            if tab_idx > 0 {
                out.push_str("<w:tab/>");
            }
            if !piece.is_empty() {
                out.push_str(&format!(
                    r#"<w:t xml:space="preserve">{}</w:t>"#,
                    escape(piece)
                ));
            }
        }
    }
}

fn paragraph_props(out: &mut String, fill: Option<Color>, before: u32, after: u32, centered: bool) {
    out.push_str("<w:pPr>");
    if let Some(fill) = fill {
        out.push_str(&format!(
            r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
            fill.hex()
        ));
    }
    out.push_str(&format!(
        r#"<w:spacing w:before="{before}" w:after="{after}"/>"#
    ));
    if centered {
        out.push_str(r#"<w:jc w:val="center"/>"#);
    }
    out.push_str("</w:pPr>");
}

fn append_theme_title(out: &mut String, text: &str, color: Color) {
    out.push_str("<w:p>");
    paragraph_props(out, Some(color), 0, 240, true);
    run(
        out,
        text,
        &RunStyle {
            font: HEADING_FONT,
            half_points: 32,
            bold: true,
            color: Some(ON_THEME_TEXT),
        },
    );
    out.push_str("</w:p>");
}

fn append_organization(out: &mut String, text: &str) {
    out.push_str("<w:p>");
    paragraph_props(out, Some(ORGANIZATION_FILL), 0, 0, true);
    run(
        out,
        text,
        &RunStyle {
            font: HEADING_FONT,
            half_points: 24,
            bold: true,
            color: Some(ORGANIZATION_TEXT),
        },
    );
    out.push_str("</w:p>");
}

fn append_program(out: &mut String, text: &str, color: Color) {
    out.push_str("<w:p>");
    paragraph_props(out, Some(color), 0, 0, true);
    run(
        out,
        text,
        &RunStyle {
            font: HEADING_FONT,
            half_points: 24,
            bold: true,
            color: Some(ON_THEME_TEXT),
        },
    );
    out.push_str("</w:p>");
}

fn append_action(out: &mut String, text: &str, color: Color) {
    out.push_str("<w:p>");
    paragraph_props(out, Some(color), 0, 160, true);
    run(
        out,
        text,
        &RunStyle {
            font: ACTION_FONT,
            half_points: 24,
            bold: false,
            color: Some(ON_THEME_TEXT),
        },
    );
    out.push_str("</w:p>");
}

fn append_detail(out: &mut String, detail: &DetailBlock) {
    out.push_str(r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/><w:jc w:val="center"/>"#);
    out.push_str(r#"<w:tblLayout w:type="fixed"/></w:tblPr><w:tblGrid>"#);
    for _ in 0..GRID_COLUMNS {
        out.push_str(&format!(r#"<w:gridCol w:w="{GRID_COLUMN_TWIPS}"/>"#));
    }
    out.push_str("</w:tblGrid>");

    // title
    out.push_str("<w:tr>");
    cell(out, 5, Some(DETAIL_TITLE_FILL), true, |out| {
        run(
            out,
            &detail.title,
            &RunStyle {
                font: HEADING_FONT,
                half_points: 20,
                bold: true,
                color: None,
            },
        );
    });
    out.push_str("</w:tr>");

    // status + date
    let icon = match detail.status.icon {
        StatusIcon::Completed => COMPLETED_ICON,
        StatusIcon::InProgress => IN_PROGRESS_ICON,
    };
    out.push_str("<w:tr>");
    cell(out, 2, None, false, |out| {
        run(out, &format!("{icon}  {STATUS_LABEL}  "), &RunStyle::body(20));
        run(out, &detail.status.value, &RunStyle::body(20));
    });
    cell(out, 3, None, false, |out| {
        let label = format!("{CALENDAR_ICON}  {} ", detail.date.label.text());
        run(
            out,
            &label,
            &RunStyle {
                font: LABEL_FONT,
                ..RunStyle::body(18)
            },
        );
        run(out, &format!("\t\t {}", detail.date.value), &RunStyle::body(20));
    });
    out.push_str("</w:tr>");

    // location
    out.push_str("<w:tr>");
    cell(out, 2, None, false, |out| {
        run(
            out,
            &format!("{LOCATION_ICON}  {LOCATION_LABEL} "),
            &RunStyle {
                font: LABEL_FONT,
                ..RunStyle::body(18)
            },
        );
    });
    cell(out, 3, None, false, |out| {
        run(out, &detail.location, &RunStyle::body(20));
    });
    out.push_str("</w:tr>");

    // result code
    out.push_str("<w:tr>");
    cell(out, 5, None, false, |out| {
        run(out, &detail.result_code, &RunStyle::body(18));
    });
    out.push_str("</w:tr>");

    out.push_str("</w:tbl>");
    // keeps consecutive tables from merging
    out.push_str(r#"<w:p><w:pPr><w:spacing w:before="0" w:after="120"/></w:pPr></w:p>"#);
}

fn cell(
    out: &mut String,
    span: usize,
    fill: Option<Color>,
    centered: bool,
    content: impl FnOnce(&mut String),
) {
    out.push_str("<w:tc><w:tcPr>");
    out.push_str(&format!(
        r#"<w:tcW w:w="{}" w:type="dxa"/>"#,
        GRID_COLUMN_TWIPS as usize * span
    ));
    if span > 1 {
        out.push_str(&format!(r#"<w:gridSpan w:val="{span}"/>"#));
    }
    if let Some(fill) = fill {
        out.push_str(&format!(
            r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
            fill.hex()
        ));
    }
    out.push_str(r#"<w:vAlign w:val="center"/></w:tcPr><w:p>"#);
    if centered {
        out.push_str(r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#);
    }
    content(out);
    out.push_str("</w:p></w:tc>");
}
