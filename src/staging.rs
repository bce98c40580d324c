//! One report batch staged beside the output directory and published as a unit.
//!
//! Artifacts are written into a temporary directory created inside the output
//! directory, so publishing is a same-filesystem rename per file. Files that a
//! publish would replace are moved aside first and moved back if any later
//! file fails.
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TXN_PREFIX: &str = ".ireport-";

/// Named artifacts waiting to be published into `out_dir`, in staging order.
pub struct StagedBatch {
    out_dir: PathBuf,
    txn: TempDir,
    entries: Vec<String>,
}

/// What publishing one entry changed, so it can be undone.
enum Published {
    Created(PathBuf),
    Replaced { dest: PathBuf, previous: PathBuf },
}

impl StagedBatch {
    /// Open a batch whose staging area lives inside `out_dir`.
    pub fn begin(out_dir: &Path) -> Result<Self> {
        fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
        let txn = tempfile::Builder::new()
            .prefix(TXN_PREFIX)
            .tempdir_in(out_dir)
            .with_context(|| format!("create staging dir in {}", out_dir.display()))?;
        for area in ["staged", "previous"] {
            let dir = txn.path().join(area);
            fs::create_dir(&dir).with_context(|| format!("create {}", dir.display()))?;
        }
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            txn,
            entries: Vec::new(),
        })
    }

    fn staged_path(&self, name: &str) -> PathBuf {
        self.txn.path().join("staged").join(name)
    }

    fn previous_path(&self, name: &str) -> PathBuf {
        self.txn.path().join("previous").join(name)
    }

    pub fn stage_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.staged_path(name);
        fs::write(&path, bytes).with_context(|| format!("stage {name}"))?;
        if !self.entries.iter().any(|entry| entry == name) {
            self.entries.push(name.to_string());
        }
        Ok(())
    }

    pub fn stage_json<T: Serialize>(&mut self, name: &str, value: &T) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(value).with_context(|| format!("serialize {name}"))?;
        self.stage_bytes(name, &bytes)
    }

    /// Move every staged entry into the output directory.
    ///
    /// On the first failure every entry already published is undone and the
    /// output directory is left as it was before the call.
    pub fn publish(self) -> Result<Vec<PathBuf>> {
        let mut done: Vec<Published> = Vec::with_capacity(self.entries.len());
        for name in &self.entries {
            match self.publish_entry(name) {
                Ok(step) => done.push(step),
                Err(err) => {
                    let unrestored = undo(&done);
                    if unrestored > 0 {
                        tracing::error!(
                            out_dir = %self.out_dir.display(),
                            unrestored,
                            "rollback incomplete"
                        );
                    }
                    let target = self.out_dir.display();
                    return Err(err.context(format!("publish batch into {target}")));
                }
            }
        }
        Ok(done
            .into_iter()
            .map(|step| match step {
                Published::Created(dest) | Published::Replaced { dest, .. } => dest,
            })
            .collect())
    }

    fn publish_entry(&self, name: &str) -> Result<Published> {
        let dest = self.out_dir.join(name);
        let staged = self.staged_path(name);
        if dest.exists() {
            let previous = self.previous_path(name);
            fs::rename(&dest, &previous)
                .with_context(|| format!("set aside {}", dest.display()))?;
            if let Err(err) = fs::rename(&staged, &dest) {
                // put the original back before reporting
                if let Err(restore) = fs::rename(&previous, &dest) {
                    tracing::error!(dest = %dest.display(), error = %restore, "restore failed");
                }
                return Err(err).with_context(|| format!("publish {}", dest.display()));
            }
            Ok(Published::Replaced { dest, previous })
        } else {
            fs::rename(&staged, &dest).with_context(|| format!("publish {}", dest.display()))?;
            Ok(Published::Created(dest))
        }
    }
}

/// Undo published entries newest first; keeps going past failures and
/// returns how many could not be undone.
fn undo(done: &[Published]) -> usize {
    let mut failures = 0;
    for step in done.iter().rev() {
        let result = match step {
            Published::Created(dest) => fs::remove_file(dest),
            Published::Replaced { dest, previous } => fs::rename(previous, dest),
        };
        if let Err(err) = result {
            let dest = match step {
                Published::Created(dest) | Published::Replaced { dest, .. } => dest,
            };
            tracing::warn!(dest = %dest.display(), error = %err, "rollback step failed");
            failures += 1;
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn listing(dir: &Path) -> Vec<(String, Vec<u8>)> {
        let mut files: Vec<(String, Vec<u8>)> = fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("entry").path())
            .filter(|path| path.is_file())
            .map(|path| {
                let name = path
                    .file_name()
                    .expect("file name")
                    .to_string_lossy()
                    .into_owned();
                let bytes = fs::read(&path).expect("read");
                (name, bytes)
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn publish_writes_new_and_replaces_existing() {
        let out = tempfile::tempdir().expect("out dir");
        fs::write(out.path().join("a.docx"), b"old").expect("seed");

        let mut batch = StagedBatch::begin(out.path()).expect("begin");
        batch.stage_bytes("a.docx", b"new").expect("stage");
        batch
            .stage_json("manifest.json", &serde_json::json!({"ok": true}))
            .expect("stage json");
        let published = batch.publish().expect("publish");

        assert_eq!(published.len(), 2);
        assert_eq!(fs::read(out.path().join("a.docx")).expect("read"), b"new");
        let manifest = fs::read_to_string(out.path().join("manifest.json")).expect("read");
        assert!(manifest.contains("\"ok\": true"));
        let leftovers = fs::read_dir(out.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(TXN_PREFIX))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn failed_publish_leaves_output_untouched() {
        let out = tempfile::tempdir().expect("out dir");
        fs::write(out.path().join("a.docx"), b"old a").expect("seed");
        fs::write(out.path().join("c.docx"), b"old c").expect("seed");
        let before = listing(out.path());

        let mut batch = StagedBatch::begin(out.path()).expect("begin");
        batch.stage_bytes("a.docx", b"new a").expect("stage");
        batch.stage_bytes("b.docx", b"new b").expect("stage");
        batch.stage_bytes("c.docx", b"new c").expect("stage");
        // losing a staged file makes its publish step fail after a and b went out
        fs::remove_file(batch.staged_path("c.docx")).expect("drop staged file");

        let err = batch.publish().expect_err("publish fails");
        assert!(format!("{err:#}").contains("c.docx"));
        assert_eq!(listing(out.path()), before);
        let remaining = fs::read_dir(out.path()).expect("read dir").count();
        assert_eq!(remaining, 2);
    }

    #[test]
    fn undo_continues_past_failed_steps() {
        let out = tempfile::tempdir().expect("out dir");
        let kept = out.path().join("kept.docx");
        let created = out.path().join("created.docx");
        let previous = out.path().join("previous.docx");
        fs::write(&created, b"new").expect("seed");
        fs::write(&previous, b"old").expect("seed");

        let done = vec![
            Published::Replaced {
                dest: kept.clone(),
                previous: previous.clone(),
            },
            // already gone, so removing it fails
            Published::Created(out.path().join("missing.docx")),
            Published::Created(created.clone()),
        ];
        assert_eq!(undo(&done), 1);
        assert!(!created.exists());
        assert_eq!(fs::read(&kept).expect("read"), b"old");
    }

    #[test]
    fn restaging_a_name_keeps_one_entry() {
        let out = tempfile::tempdir().expect("out dir");
        let mut batch = StagedBatch::begin(out.path()).expect("begin");
        batch.stage_bytes("a.txt", b"one").expect("stage");
        batch.stage_bytes("a.txt", b"two").expect("stage");
        let published = batch.publish().expect("publish");
        assert_eq!(published.len(), 1);
        assert_eq!(fs::read(out.path().join("a.txt")).expect("read"), b"two");
    }
}
