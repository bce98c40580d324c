//! Artifact naming and batch output.
//!
//! Artifacts and `manifest.json` are staged next to the output directory's
//! contents and published together, so a failed batch leaves it untouched.
use crate::normalize::NormalizeStats;
use crate::report::{Artifact, ReportSet};
use crate::serialize::RenderFormat;
use crate::staging::StagedBatch;
use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const MANIFEST_FILE: &str = "manifest.json";
const FILE_PREFIX: &str = "relatorio";
const EMPTY_STEM: &str = "tema";

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid regex"))
}

fn separator_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-\s]+").expect("valid regex"))
}

/// File-name stem for a theme: accents stripped, punctuation dropped,
/// separators collapsed to `_`, lower-cased.
pub fn sanitize_stem(theme: &str) -> String {
    let stripped: String = theme.nfd().filter(|ch| !is_combining_mark(*ch)).collect();
    let cleaned = disallowed_chars().replace_all(&stripped, "");
    let joined = separator_runs().replace_all(cleaned.trim(), "_");
    joined.to_lowercase()
}

/// `relatorio_<stem>_<YYYYMMDD>.<ext>` for every theme, unique within the batch.
pub fn artifact_file_names<'a>(
    themes: impl IntoIterator<Item = &'a str>,
    date: NaiveDate,
    extension: &str,
) -> Vec<(String, String)> {
    let stamp = date.format("%Y%m%d");
    let mut taken: BTreeSet<String> = BTreeSet::new();
    let mut names = Vec::new();
    for theme in themes {
        let mut stem = sanitize_stem(theme);
        if stem.is_empty() {
            stem = EMPTY_STEM.to_string();
        }
        let mut candidate = stem.clone();
        let mut suffix = 2;
        while !taken.insert(candidate.clone()) {
            candidate = format!("{stem}_{suffix}");
            suffix += 1;
        }
        names.push((
            theme.to_string(),
            format!("{FILE_PREFIX}_{candidate}_{stamp}.{extension}"),
        ));
    }
    names
}

/// File name for the single combined artifact.
pub fn combined_file_name(date: NaiveDate, extension: &str) -> String {
    format!("{FILE_PREFIX}_{}.{extension}", date.format("%Y%m%d"))
}

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub generated_on: NaiveDate,
    pub input: String,
    pub format: RenderFormat,
    pub combined: bool,
    pub normalize: NormalizeStats,
    pub artifacts: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub file: String,
    pub records: usize,
    pub blocks: usize,
    pub bytes: usize,
}

impl ManifestEntry {
    fn new(theme: Option<String>, file: String, artifact: &Artifact) -> Self {
        Self {
            theme,
            file,
            records: artifact.records,
            blocks: artifact.blocks,
            bytes: artifact.bytes.len(),
        }
    }
}

/// Artifacts ready to write, paired with their file names.
pub struct OutputBatch<'a> {
    pub files: Vec<(String, &'a Artifact)>,
    pub manifest: Manifest,
}

impl<'a> OutputBatch<'a> {
    /// One file per theme.
    pub fn per_theme(reports: &'a ReportSet, extension: &str, mut manifest: Manifest) -> Self {
        let names = artifact_file_names(
            reports.keys().map(String::as_str),
            manifest.generated_on,
            extension,
        );
        let mut files = Vec::with_capacity(names.len());
        for (theme, file) in names {
            if let Some(artifact) = reports.get(&theme) {
                manifest
                    .artifacts
                    .push(ManifestEntry::new(Some(theme), file.clone(), artifact));
                files.push((file, artifact));
            }
        }
        Self { files, manifest }
    }

    /// The single combined file.
    pub fn combined(artifact: &'a Artifact, extension: &str, mut manifest: Manifest) -> Self {
        let file = combined_file_name(manifest.generated_on, extension);
        manifest
            .artifacts
            .push(ManifestEntry::new(None, file.clone(), artifact));
        Self {
            files: vec![(file, artifact)],
            manifest,
        }
    }
}

/// Stage every artifact plus the manifest, then publish into `out_dir`.
pub fn write_batch(out_dir: &Path, batch: &OutputBatch<'_>) -> Result<Vec<PathBuf>> {
    let mut staged = StagedBatch::begin(out_dir)?;
    for (file, artifact) in &batch.files {
        staged.stage_bytes(file, &artifact.bytes)?;
    }
    staged.stage_json(MANIFEST_FILE, &batch.manifest)?;

    let published = staged.publish()?;
    tracing::info!(
        out_dir = %out_dir.display(),
        files = published.len(),
        "batch published"
    );
    Ok(published)
}
