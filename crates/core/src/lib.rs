mod apply;
mod config;
mod exif_reader;
mod matcher;
mod naming;
mod planner;

pub use apply::{apply_plan, ApplyResult, FileReport, FileRole, RenameOutcome};
pub use config::{app_paths, load_config, AppConfig, AppPaths};
pub use exif_reader::{ExifTimestampSource, TimestampSource};
pub use planner::{
    generate_plan, PlanOptions, RenameCandidate, RenamePlan, RenameStats, ScanError, SidecarRename,
    SkipReason, SkippedFile,
};
