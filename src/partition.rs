//! Theme partitioning: one sorted record list per theme.
use crate::normalize::InitiativeRecord;
use std::collections::BTreeMap;

/// Records grouped by theme, each list sorted for rendering.
pub type ThemePartition = BTreeMap<String, Vec<InitiativeRecord>>;

/// Group records by theme and sort each group by (organization, program, action).
///
/// Records without a theme are skipped. The sort is stable and compares raw
/// strings byte-wise, so ties keep source order.
pub fn partition_by_theme(records: Vec<InitiativeRecord>) -> ThemePartition {
    let mut partition: ThemePartition = BTreeMap::new();
    let mut skipped = 0usize;
    for record in records {
        let Some(theme) = record.theme.clone() else {
            tracing::trace!(row = record.row, "record without theme skipped");
            skipped += 1;
            continue;
        };
        partition.entry(theme).or_default().push(record);
    }

    for records in partition.values_mut() {
        records.sort_by(|a, b| grouping_key(a).cmp(&grouping_key(b)));
    }
    partition.retain(|_, records| !records.is_empty());

    tracing::debug!(
        themes = partition.len(),
        skipped_without_theme = skipped,
        "partitioned records"
    );
    partition
}

fn grouping_key(record: &InitiativeRecord) -> (&str, &str, &str) {
    (
        record.organization.as_str(),
        record.program.as_str(),
        record.action.as_str(),
    )
}
