use crate::config::AppConfig;
use crate::exif_reader::TimestampSource;
use crate::matcher::{find_sidecars, sidecar_target};
use crate::naming::{canonical_basename, resolve_collision};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub root: PathBuf,
    pub image_extensions: Vec<String>,
    pub sidecar_extensions: Vec<String>,
    pub case_insensitive_stems: bool,
}

impl PlanOptions {
    pub fn from_config(root: PathBuf, config: &AppConfig) -> Self {
        Self {
            root,
            image_extensions: config.image_extensions.clone(),
            sidecar_extensions: config.sidecar_extensions.clone(),
            case_insensitive_stems: config.case_insensitive_stems,
        }
    }
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self::from_config(PathBuf::new(), &AppConfig::default())
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("指定されたルートが存在しないかディレクトリではありません: {}", .0.display())]
    InvalidRoot(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkipReason {
    TimestampMissing,
    MetadataUnreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TimestampMissing => write!(f, "撮影日時タグが見つかりませんでした"),
            SkipReason::MetadataUnreadable(detail) => {
                write!(f, "EXIFを読めませんでした: {detail}")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarRename {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameCandidate {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub timestamp: NaiveDateTime,
    pub changed: bool,
    pub sidecars: Vec<SidecarRename>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenameStats {
    pub scanned_files: usize,
    pub primary_files: usize,
    pub skipped_non_primary: usize,
    pub skipped_no_metadata: usize,
    pub planned: usize,
    pub unchanged: usize,
    pub sidecars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub root: PathBuf,
    pub candidates: Vec<RenameCandidate>,
    pub skipped: Vec<SkippedFile>,
    pub stats: RenameStats,
}

/// 読み取り専用のスキャン。ファイルシステムへの変更は apply が行う。
pub fn generate_plan(
    options: &PlanOptions,
    source: &dyn TimestampSource,
) -> Result<RenamePlan, ScanError> {
    if !options.root.is_dir() {
        return Err(ScanError::InvalidRoot(options.root.clone()));
    }

    let mut stats = RenameStats::default();
    let primary_files = collect_primary_files(&options.root, &options.image_extensions, &mut stats);

    let mut candidates = Vec::with_capacity(primary_files.len());
    let mut skipped = Vec::new();
    let mut claimed_targets = HashSet::<PathBuf>::new();
    let mut assigned_sidecars = HashSet::<PathBuf>::new();

    for path in primary_files {
        let timestamp = match source.capture_timestamp(&path) {
            Ok(Some(timestamp)) => timestamp,
            Ok(None) => {
                stats.skipped_no_metadata += 1;
                skipped.push(SkippedFile {
                    path,
                    reason: SkipReason::TimestampMissing,
                });
                continue;
            }
            Err(err) => {
                log::debug!("EXIF読み取りに失敗しました: {err:#}");
                stats.skipped_no_metadata += 1;
                skipped.push(SkippedFile {
                    path,
                    reason: SkipReason::MetadataUnreadable(err.root_cause().to_string()),
                });
                continue;
            }
        };

        let base = canonical_basename(&timestamp);
        let extension = path
            .extension()
            .map(|v| format!(".{}", v.to_string_lossy().to_ascii_lowercase()))
            .unwrap_or_default();
        let target = resolve_collision(&path, &base, &extension, &mut claimed_targets);

        let changed = target != path;
        if !changed {
            stats.unchanged += 1;
        }

        let mut sidecars = Vec::new();
        if let Some(new_base) = target.file_stem().and_then(|v| v.to_str()) {
            for sidecar in find_sidecars(
                &path,
                &options.sidecar_extensions,
                options.case_insensitive_stems,
            ) {
                if !assigned_sidecars.insert(sidecar.clone()) {
                    continue;
                }
                let Some(sidecar_dest) = sidecar_target(&sidecar, new_base) else {
                    continue;
                };
                if sidecar_dest == sidecar {
                    continue;
                }
                claimed_targets.insert(sidecar_dest.clone());
                sidecars.push(SidecarRename {
                    original_path: sidecar,
                    target_path: sidecar_dest,
                });
            }
        }

        stats.planned += 1;
        stats.sidecars += sidecars.len();
        candidates.push(RenameCandidate {
            original_path: path,
            target_path: target,
            timestamp,
            changed,
            sidecars,
        });
    }

    Ok(RenamePlan {
        root: options.root.clone(),
        candidates,
        skipped,
        stats,
    })
}

fn collect_primary_files(
    root: &Path,
    image_extensions: &[String],
    stats: &mut RenameStats,
) -> Vec<PathBuf> {
    let mut out = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("走査できないエントリをスキップします: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        stats.scanned_files += 1;

        let path = entry.path();
        if has_extension_in(path, image_extensions) {
            stats.primary_files += 1;
            out.push(path.to_path_buf());
        } else {
            stats.skipped_non_primary += 1;
        }
    }

    out
}

fn has_extension_in(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}
