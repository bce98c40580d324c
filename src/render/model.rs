use crate::theme::Color;

/// One unit of report content, in render order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Opens a theme inside a combined document.
    ThemeTitle { text: String, color: Color },
    OrganizationHeader { text: String },
    ProgramHeader { text: String, color: Color },
    ActionHeader { text: String, color: Color },
    Detail(DetailBlock),
    PageBreak,
}

/// Ordered block sequence for one output artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn detail_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::Detail(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Fixed five-line block describing one initiative.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailBlock {
    pub title: String,
    pub status: StatusLine,
    pub date: DateLine,
    pub location: String,
    pub result_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub icon: StatusIcon,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Completed,
    InProgress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateLine {
    pub label: DateLabel,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLabel {
    Delivery,
    Start,
}

impl DateLabel {
    pub fn text(self) -> &'static str {
        match self {
            DateLabel::Delivery => "Data de Entrega:",
            DateLabel::Start => "Data de Início:",
        }
    }
}

pub const STATUS_LABEL: &str = "Status:";
pub const LOCATION_LABEL: &str = "Municípios Atendidos:";
