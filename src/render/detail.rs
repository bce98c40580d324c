//! Per-record detail blocks.
use super::model::{DateLabel, DateLine, DetailBlock, StatusIcon, StatusLine};
use crate::normalize::{InitiativeRecord, Status};
use chrono::NaiveDate;

/// Which record date a status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateField {
    Start,
    End,
}

impl DateField {
    fn select(self, record: &InitiativeRecord) -> Option<NaiveDate> {
        match self {
            DateField::Start => record.start_date,
            DateField::End => record.end_date,
        }
    }
}

/// Status bucket → (date shown, its label, status icon).
const STATUS_PRESENTATION: &[(Status, DateField, DateLabel, StatusIcon)] = &[
    (
        Status::Completed,
        DateField::End,
        DateLabel::Delivery,
        StatusIcon::Completed,
    ),
    (
        Status::InExecution,
        DateField::Start,
        DateLabel::Start,
        StatusIcon::InProgress,
    ),
];

pub(crate) fn presentation(status: Status) -> (DateField, DateLabel, StatusIcon) {
    STATUS_PRESENTATION
        .iter()
        .find(|(bucket, ..)| *bucket == status)
        .map(|(_, field, label, icon)| (*field, *label, *icon))
        .unwrap_or((DateField::Start, DateLabel::Start, StatusIcon::InProgress))
}

/// Build the detail block for one record; absent values render empty.
pub fn format_detail(record: &InitiativeRecord) -> DetailBlock {
    let (field, label, icon) = presentation(record.status);
    let date = field
        .select(record)
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_default();

    DetailBlock {
        title: record.initiative_name.clone(),
        status: StatusLine {
            icon,
            value: record.status.label().to_string(),
        },
        date: DateLine { label, value: date },
        location: record.location.clone(),
        result_code: record.result_code.clone(),
    }
}
