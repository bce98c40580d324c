use super::{DocumentRenderer, RenderError};
use crate::render::{Block, DetailBlock, Document, StatusIcon, LOCATION_LABEL, STATUS_LABEL};

/// Plain-text rendering, used for previews and `--format text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn render_string(&self, document: &Document) -> String {
        let mut out = String::new();
        for block in &document.blocks {
            append_block(&mut out, block);
        }
        out
    }
}

impl DocumentRenderer for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, document: &Document) -> Result<Vec<u8>, RenderError> {
        Ok(self.render_string(document).into_bytes())
    }
}

fn append_block(out: &mut String, block: &Block) {
    match block {
        Block::ThemeTitle { text, .. } => {
            out.push_str(&format!("#### {text} ####\n\n"));
        }
        Block::OrganizationHeader { text } => {
            out.push_str(&format!("== {text} ==\n"));
        }
        Block::ProgramHeader { text, .. } => {
            out.push_str(&format!("{text}\n"));
        }
        Block::ActionHeader { text, .. } => {
            out.push_str(&format!("  {text}\n\n"));
        }
        Block::Detail(detail) => append_detail(out, detail),
        Block::PageBreak => out.push_str("\x0c\n"),
    }
}

fn append_detail(out: &mut String, detail: &DetailBlock) {
    let icon = match detail.status.icon {
        StatusIcon::Completed => "[x]",
        StatusIcon::InProgress => "[>]",
    };
    out.push_str(&format!("  * {}\n", detail.title));
    out.push_str(&format!(
        "    {icon} {STATUS_LABEL} {}\n",
        detail.status.value
    ));
    out.push_str(&format!(
        "    {} {}\n",
        detail.date.label.text(),
        detail.date.value
    ));
    out.push_str(&format!("    {LOCATION_LABEL} {}\n", detail.location));
    out.push_str(&format!("    {}\n\n", detail.result_code));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{InitiativeRecord, Status};
    use crate::render::render_theme;
    use chrono::NaiveDate;

    #[test]
    fn renders_headers_and_fixed_detail_lines() {
        let record = InitiativeRecord {
            row: 2,
            organization: "Seduc".to_string(),
            initiative_name: "Escola Nova".to_string(),
            status: Status::Completed,
            program: "Educação".to_string(),
            action: "reforma de escolas".to_string(),
            start_date: None,
            end_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            result_code: "R-1".to_string(),
            location: String::new(),
            theme: Some("T".to_string()),
        };
        let text = TextRenderer.render_string(&render_theme("T", &[record]));
        assert!(text.contains("== SEDUC ==\n"));
        assert!(text.contains("EDUCAÇÃO\n"));
        assert!(text.contains("  Reforma De Escolas\n"));
        assert!(text.contains("[x] Status: CONCLUÍDO"));
        assert!(text.contains("Data de Entrega: 02/05/2024"));
        assert!(text.contains("Municípios Atendidos: \n"));
        assert!(!text.contains('\x0c'));
    }
}
