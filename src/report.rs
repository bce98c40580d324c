//! Document assembly: one artifact per theme.
//!
//! Themes share nothing but the read-only palette, so they render in
//! parallel. The batch is all-or-nothing: any serializer failure fails it.
use crate::partition::ThemePartition;
use crate::render::{render_combined, render_theme, Document};
use crate::serialize::DocumentRenderer;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Serialized output for one document.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub records: usize,
    pub blocks: usize,
}

/// Theme name → artifact, iterated in theme order.
pub type ReportSet = BTreeMap<String, Artifact>;

/// Render and serialize every theme of `partition`.
///
/// `jobs` bounds the worker pool; `None` uses rayon's default size.
pub fn assemble(
    partition: &ThemePartition,
    renderer: &dyn DocumentRenderer,
    jobs: Option<usize>,
) -> Result<ReportSet> {
    let work = || -> Result<Vec<(String, Artifact)>> {
        partition
            .par_iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(theme, records)| {
                let document = render_theme(theme, records);
                let artifact = serialize(&document, records.len(), renderer)
                    .with_context(|| format!("render theme {theme:?}"))?;
                tracing::debug!(
                    theme = %theme,
                    records = artifact.records,
                    details = document.detail_count(),
                    blocks = artifact.blocks,
                    bytes = artifact.bytes.len(),
                    "theme rendered"
                );
                Ok((theme.clone(), artifact))
            })
            .collect()
    };

    let rendered = match jobs {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("build render worker pool")?
            .install(work)?,
        None => work()?,
    };

    Ok(rendered
        .into_iter()
        .filter(|(_, artifact)| artifact.blocks > 0)
        .collect())
}

/// Render every theme into one combined artifact; `None` when there is nothing to render.
pub fn assemble_combined(
    title: &str,
    partition: &ThemePartition,
    renderer: &dyn DocumentRenderer,
) -> Result<Option<Artifact>> {
    let document = render_combined(title, partition);
    if document.is_empty() {
        return Ok(None);
    }
    let records = partition.values().map(Vec::len).sum();
    serialize(&document, records, renderer)
        .context("render combined report")
        .map(Some)
}

fn serialize(
    document: &Document,
    records: usize,
    renderer: &dyn DocumentRenderer,
) -> Result<Artifact> {
    let bytes = renderer.render(document)?;
    Ok(Artifact {
        bytes,
        records,
        blocks: document.blocks.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{InitiativeRecord, Status};
    use crate::partition::partition_by_theme;
    use crate::serialize::{RenderError, TextRenderer};

    fn record(theme: &str, org: &str) -> InitiativeRecord {
        InitiativeRecord {
            row: 2,
            organization: org.to_string(),
            initiative_name: "Iniciativa".to_string(),
            status: Status::Completed,
            program: "P".to_string(),
            action: "A".to_string(),
            start_date: None,
            end_date: None,
            result_code: String::new(),
            location: String::new(),
            theme: Some(theme.to_string()),
        }
    }

    struct FailingRenderer;

    impl DocumentRenderer for FailingRenderer {
        fn extension(&self) -> &'static str {
            "bin"
        }

        fn render(&self, document: &Document) -> Result<Vec<u8>, RenderError> {
            if document.title == "T2" {
                return Err(RenderError::Io(std::io::Error::other("disk full")));
            }
            Ok(Vec::new())
        }
    }

    #[test]
    fn produces_one_artifact_per_theme() {
        let partition = partition_by_theme(vec![
            record("T1", "A"),
            record("T2", "A"),
            record("T2", "B"),
        ]);
        let reports = assemble(&partition, &TextRenderer, Some(2)).expect("assemble");
        assert_eq!(reports.keys().collect::<Vec<_>>(), vec!["T1", "T2"]);
        assert_eq!(reports["T2"].records, 2);
        // org, program, action, detail, break, org, program, action, detail
        assert_eq!(reports["T2"].blocks, 9);
        let text = String::from_utf8(reports["T1"].bytes.clone()).expect("utf8");
        assert!(text.contains("== A =="));
    }

    #[test]
    fn empty_partition_yields_empty_set() {
        let reports = assemble(&ThemePartition::new(), &TextRenderer, None).expect("assemble");
        assert!(reports.is_empty());
        let combined =
            assemble_combined("all", &ThemePartition::new(), &TextRenderer).expect("combined");
        assert!(combined.is_none());
    }

    #[test]
    fn one_failing_theme_fails_the_batch() {
        let partition = partition_by_theme(vec![record("T1", "A"), record("T2", "A")]);
        let err = assemble(&partition, &FailingRenderer, None).expect_err("batch fails");
        assert!(format!("{err:#}").contains("T2"));
    }

    #[test]
    fn combined_artifact_counts_every_record() {
        let partition = partition_by_theme(vec![record("T1", "A"), record("T2", "A")]);
        let artifact = assemble_combined("all", &partition, &TextRenderer)
            .expect("combined")
            .expect("artifact");
        assert_eq!(artifact.records, 2);
        let text = String::from_utf8(artifact.bytes).expect("utf8");
        assert!(text.contains("#### T1 ####"));
        assert!(text.contains("#### T2 ####"));
    }
}
