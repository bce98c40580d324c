//! Hierarchical section renderer.
//!
//! Rendering is a pure fold of [`GroupingState::advance`] over a theme's
//! sorted records. Headers are emitted only when their key changes within
//! the parent scope, so the output depends on record order and nothing else.

use crate::normalize::InitiativeRecord;
use crate::partition::ThemePartition;
use crate::theme::{theme_color, Color};

mod detail;
mod format;
mod model;

use detail::format_detail;
use format::{title_case, upper};
pub use model::{Block, DetailBlock, Document, StatusIcon, LOCATION_LABEL, STATUS_LABEL};

/// Last-seen group keys for one theme's render pass.
///
/// A change at one level clears every level below it, so an equal program or
/// action under a new parent still gets its header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingState<'a> {
    pub organization: Option<&'a str>,
    pub program: Option<&'a str>,
    pub action: Option<&'a str>,
}

impl<'a> GroupingState<'a> {
    /// Consume one record, returning the next state and the blocks it emits.
    pub fn advance(self, record: &'a InitiativeRecord, color: Color) -> (Self, Vec<Block>) {
        let mut next = self;
        let mut blocks = Vec::with_capacity(5);

        if next.organization != Some(record.organization.as_str()) {
            if next.organization.is_some() {
                blocks.push(Block::PageBreak);
            }
            blocks.push(Block::OrganizationHeader {
                text: upper(&record.organization),
            });
            next = GroupingState {
                organization: Some(record.organization.as_str()),
                program: None,
                action: None,
            };
        }

        if next.program != Some(record.program.as_str()) {
            blocks.push(Block::ProgramHeader {
                text: upper(&record.program),
                color,
            });
            next.program = Some(record.program.as_str());
            next.action = None;
        }

        if next.action != Some(record.action.as_str()) {
            blocks.push(Block::ActionHeader {
                text: title_case(&record.action),
                color,
            });
            next.action = Some(record.action.as_str());
        }

        blocks.push(Block::Detail(format_detail(record)));
        (next, blocks)
    }
}

/// Render one theme's sorted records into a document.
pub fn render_theme(theme: &str, records: &[InitiativeRecord]) -> Document {
    Document {
        title: theme.to_string(),
        blocks: render_blocks(records, theme_color(theme)),
    }
}

fn render_blocks(records: &[InitiativeRecord], color: Color) -> Vec<Block> {
    let (_, blocks) = records.iter().fold(
        (GroupingState::default(), Vec::new()),
        |(state, mut blocks), record| {
            let (next, emitted) = state.advance(record, color);
            blocks.extend(emitted);
            (next, blocks)
        },
    );
    blocks
}

/// Render every theme into a single document, one titled section per theme.
pub fn render_combined(title: &str, partition: &ThemePartition) -> Document {
    let mut blocks = Vec::new();
    for (theme, records) in partition {
        if records.is_empty() {
            continue;
        }
        if !blocks.is_empty() {
            blocks.push(Block::PageBreak);
        }
        let color = theme_color(theme);
        blocks.push(Block::ThemeTitle {
            text: theme.clone(),
            color,
        });
        blocks.extend(render_blocks(records, color));
    }
    Document {
        title: title.to_string(),
        blocks,
    }
}
