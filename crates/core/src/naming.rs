use chrono::{Datelike, NaiveDateTime, Timelike};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 撮影日時から `YYYYMMDD_HHMMSS` 形式のベース名を作る。
pub fn canonical_basename(timestamp: &NaiveDateTime) -> String {
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        timestamp.year(),
        timestamp.month(),
        timestamp.day(),
        timestamp.hour(),
        timestamp.minute(),
        timestamp.second()
    )
}

/// 同一秒の衝突は遭遇順に `_001`, `_002`, ... を付けて解決する。
/// この実行で予約済みの名前と、ディスク上の既存ファイル名は再利用しない。
/// 自分自身の現在名だけは常に使用可能 (リネーム不要と判定される)。
pub fn resolve_collision(
    original_path: &Path,
    base: &str,
    extension: &str,
    claimed: &mut HashSet<PathBuf>,
) -> PathBuf {
    let parent = original_path.parent().unwrap_or_else(|| Path::new("."));

    let candidate = parent.join(format!("{}{}", base, extension));
    if is_available(&candidate, original_path, claimed) {
        claimed.insert(candidate.clone());
        return candidate;
    }

    let mut n = 1usize;
    loop {
        let candidate = parent.join(format!("{}_{:03}{}", base, n, extension));
        if is_available(&candidate, original_path, claimed) {
            claimed.insert(candidate.clone());
            return candidate;
        }
        n += 1;
    }
}

fn is_available(candidate: &Path, original_path: &Path, claimed: &HashSet<PathBuf>) -> bool {
    if claimed.contains(candidate) {
        return false;
    }
    if candidate == original_path {
        return true;
    }
    !candidate.exists()
}

#[cfg(test)]
mod tests {
    use super::{canonical_basename, resolve_collision};
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn basename_is_zero_padded() {
        let ts = NaiveDate::from_ymd_opt(2001, 2, 3)
            .expect("valid date")
            .and_hms_opt(4, 5, 6)
            .expect("valid time");
        assert_eq!(canonical_basename(&ts), "20010203_040506");
    }

    #[test]
    fn example_timestamp_matches_expected_name() {
        let ts = NaiveDate::from_ymd_opt(2020, 2, 16)
            .expect("valid date")
            .and_hms_opt(12, 39, 7)
            .expect("valid time");
        assert_eq!(canonical_basename(&ts), "20200216_123907");
    }

    #[test]
    fn collision_within_run_appends_suffixes_in_order() {
        let temp = tempdir().expect("tempdir");
        let a = temp.path().join("A.jpg");
        let b = temp.path().join("B.jpg");
        let c = temp.path().join("C.jpg");

        let mut claimed = HashSet::<PathBuf>::new();
        let first = resolve_collision(&a, "20200216_123907", ".jpg", &mut claimed);
        let second = resolve_collision(&b, "20200216_123907", ".jpg", &mut claimed);
        let third = resolve_collision(&c, "20200216_123907", ".jpg", &mut claimed);

        assert_eq!(first, temp.path().join("20200216_123907.jpg"));
        assert_eq!(second, temp.path().join("20200216_123907_001.jpg"));
        assert_eq!(third, temp.path().join("20200216_123907_002.jpg"));
    }

    #[test]
    fn existing_file_on_disk_is_never_reused() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("20200216_123907.jpg"), b"x").expect("existing file");
        let original = temp.path().join("P2161162.jpg");

        let mut claimed = HashSet::<PathBuf>::new();
        let target = resolve_collision(&original, "20200216_123907", ".jpg", &mut claimed);
        assert_eq!(target, temp.path().join("20200216_123907_001.jpg"));
    }

    #[test]
    fn own_current_name_stays_usable() {
        let temp = tempdir().expect("tempdir");
        let original = temp.path().join("20200216_123907.jpg");
        fs::write(&original, b"x").expect("existing file");

        let mut claimed = HashSet::<PathBuf>::new();
        let target = resolve_collision(&original, "20200216_123907", ".jpg", &mut claimed);
        assert_eq!(target, original);
    }
}
