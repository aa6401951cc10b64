use crate::planner::RenamePlan;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileRole {
    Primary,
    Sidecar,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    Unchanged,
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub role: FileRole,
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub outcome: RenameOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplyResult {
    pub applied: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub reports: Vec<FileReport>,
}

impl ApplyResult {
    fn record(&mut self, role: FileRole, from: &Path, to: &Path, outcome: RenameOutcome) {
        match outcome {
            RenameOutcome::Renamed => self.applied += 1,
            RenameOutcome::Unchanged => self.unchanged += 1,
            RenameOutcome::Failed(_) => self.failed += 1,
        }
        self.reports.push(FileReport {
            role,
            original_path: from.to_path_buf(),
            target_path: to.to_path_buf(),
            outcome,
        });
    }
}

/// リネームを1件ずつ実行する。個々の失敗は記録して続行し、走査全体は止めない。
/// 主ファイルが失敗した場合、そのサイドカーには触れない。
pub fn apply_plan(plan: &RenamePlan) -> ApplyResult {
    let mut result = ApplyResult::default();

    for candidate in &plan.candidates {
        let primary_outcome = if candidate.changed {
            match execute_rename(&candidate.original_path, &candidate.target_path) {
                Ok(()) => RenameOutcome::Renamed,
                Err(err) => RenameOutcome::Failed(format!("{err:#}")),
            }
        } else {
            RenameOutcome::Unchanged
        };

        let primary_failed = matches!(primary_outcome, RenameOutcome::Failed(_));
        result.record(
            FileRole::Primary,
            &candidate.original_path,
            &candidate.target_path,
            primary_outcome,
        );

        for sidecar in &candidate.sidecars {
            let outcome = if primary_failed {
                RenameOutcome::Failed(
                    "主ファイルのリネームに失敗したため見送りました".to_string(),
                )
            } else {
                match execute_rename(&sidecar.original_path, &sidecar.target_path) {
                    Ok(()) => RenameOutcome::Renamed,
                    Err(err) => RenameOutcome::Failed(format!("{err:#}")),
                }
            };
            result.record(
                FileRole::Sidecar,
                &sidecar.original_path,
                &sidecar.target_path,
                outcome,
            );
        }
    }

    result
}

fn execute_rename(from: &Path, to: &Path) -> Result<()> {
    if to.exists() && from != to {
        bail!("リネーム先に別のファイルが存在します: {}", to.display());
    }
    fs::rename(from, to).with_context(|| {
        format!(
            "リネームに失敗しました: {} -> {}",
            from.display(),
            to.display()
        )
    })?;
    log::debug!("リネーム: {} -> {}", from.display(), to.display());
    Ok(())
}
