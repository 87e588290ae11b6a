//! Removal of the folders behind discarded records.
//!
//! Deleting is irreversible, so it is a separate step: a [`DeletionPlan`] is
//! built from the discarded records and only touches the filesystem when
//! executed with [`DeletionMode::Commit`].

use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{MicorecaError, Result};
use crate::record::Record;

use super::export::{create_output, resolve_path};

/// Whether a plan is only reported or actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionMode {
    #[default]
    DryRun,
    Commit,
}

/// A folder that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub message: String,
}

/// What executing a plan did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub mode: DeletionMode,
    pub planned: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub failures: Vec<DeletionFailure>,
}

/// Folders to remove, all strictly inside `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPlan {
    root: PathBuf,
    folders: Vec<PathBuf>,
}

impl DeletionPlan {
    /// Plan the removal of the storage folders of `discarded`.
    ///
    /// Records without storage, and folders outside `root`, are left out.
    pub fn new(root: impl AsRef<Path>, discarded: &[Record]) -> Self {
        let root = root.as_ref().to_path_buf();
        let mut folders = Vec::new();
        for folder in discarded.iter().filter_map(Record::storage) {
            if folder != root && folder.starts_with(&root) {
                folders.push(folder.to_path_buf());
            } else {
                warn!(
                    "Not planning deletion of '{}': outside '{}'",
                    folder.display(),
                    root.display()
                );
            }
        }
        folders.sort();
        folders.dedup();
        Self { root, folders }
    }

    /// Drop every planned folder that contains one of `paths`.
    ///
    /// Run outputs, the status table and the rules file may live under the
    /// scanned root; the folders holding them are never deleted.
    pub fn protect<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let protected: Vec<PathBuf> = paths
            .into_iter()
            .map(|p| resolve_path(p.as_ref()))
            .collect();
        self.folders.retain(|folder| {
            let resolved = resolve_path(folder);
            match protected.iter().find(|p| p.starts_with(&resolved)) {
                Some(kept) => {
                    warn!(
                        "Not planning deletion of '{}': it holds '{}'",
                        folder.display(),
                        kept.display()
                    );
                    false
                }
                None => true,
            }
        });
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Human-readable listing of the plan.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} folder(s) under {} would be deleted:",
            self.folders.len(),
            self.root.display()
        );
        for folder in &self.folders {
            let _ = writeln!(out, "  {}", folder.display());
        }
        out
    }

    /// Write the rendered plan to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = create_output(path)?;
        writer
            .write_all(self.render().as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| MicorecaError::Persistence(format!("Failed to write '{}': {}", path.display(), e)))
    }

    /// Apply the plan. Failures are collected, not fatal.
    pub fn execute(&self, mode: DeletionMode) -> DeletionReport {
        let mut report = DeletionReport {
            mode,
            planned: self.folders.clone(),
            ..Default::default()
        };
        if mode == DeletionMode::DryRun {
            info!("Dry run: {} folder(s) would be deleted", self.folders.len());
            return report;
        }

        for folder in &self.folders {
            match fs::remove_dir_all(folder) {
                Ok(()) => report.deleted.push(folder.clone()),
                Err(e) => {
                    warn!("Could not delete {}: {}", folder.display(), e);
                    report.failures.push(DeletionFailure {
                        path: folder.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
        info!(
            "Deleted {} folder(s), {} failure(s)",
            report.deleted.len(),
            report.failures.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Tool;
    use tempfile::TempDir;

    fn tool_in(root: &Path, name: &str) -> Record {
        let folder = root.join(name);
        fs::create_dir_all(&folder).unwrap();
        Tool::new(name).with_folder(folder).into()
    }

    #[test]
    fn test_dry_run_deletes_nothing() {
        let root = TempDir::new().unwrap();
        let discarded = vec![tool_in(root.path(), "a"), tool_in(root.path(), "b")];
        let plan = DeletionPlan::new(root.path(), &discarded);

        let report = plan.execute(DeletionMode::DryRun);
        assert_eq!(report.planned.len(), 2);
        assert!(report.deleted.is_empty());
        assert!(root.path().join("a").exists());
    }

    #[test]
    fn test_commit_removes_folders() {
        let root = TempDir::new().unwrap();
        let discarded = vec![tool_in(root.path(), "a")];
        let plan = DeletionPlan::new(root.path(), &discarded);

        let report = plan.execute(DeletionMode::Commit);
        assert_eq!(report.deleted, vec![root.path().join("a")]);
        assert!(!root.path().join("a").exists());
    }

    #[test]
    fn test_outside_root_excluded() {
        let root = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let discarded = vec![
            tool_in(elsewhere.path(), "x"),
            Tool::new("root").with_folder(root.path()).into(),
        ];

        let plan = DeletionPlan::new(root.path(), &discarded);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_protected_output_folder_not_planned() {
        let root = TempDir::new().unwrap();
        let discarded = vec![tool_in(root.path(), "results"), tool_in(root.path(), "a")];
        let status = root.path().join("results/tools_status.tsv");
        fs::write(&status, "Tool\tTo keep\n").unwrap();

        let plan = DeletionPlan::new(root.path(), &discarded).protect([&status]);
        assert_eq!(plan.folders(), &[root.path().join("a")]);

        plan.execute(DeletionMode::Commit);
        assert!(status.exists());
    }

    #[test]
    fn test_protect_not_yet_written_file() {
        let root = TempDir::new().unwrap();
        let discarded = vec![tool_in(root.path(), "out")];
        let plan = DeletionPlan::new(root.path(), &discarded)
            .protect([root.path().join("out/nested/report.txt")]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_write_renders_listing() {
        let root = TempDir::new().unwrap();
        let discarded = vec![tool_in(root.path(), "a")];
        let plan = DeletionPlan::new(root.path(), &discarded);
        let path = root.path().join("infos/deletion_plan.txt");

        plan.write(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, plan.render());
        assert!(content.starts_with("1 folder(s) under"));
    }

    #[test]
    fn test_missing_folder_is_failure() {
        let root = TempDir::new().unwrap();
        let record: Record = Tool::new("gone").with_folder(root.path().join("gone")).into();
        let plan = DeletionPlan::new(root.path(), &[record]);

        let report = plan.execute(DeletionMode::Commit);
        assert_eq!(report.failures.len(), 1);
    }
}
