use std::fs;
use std::path::{Path, PathBuf};

/// 主ファイルと同じフォルダから、元のベース名を共有するサイドカーを探す。
/// 拡張子の照合は常に大文字小文字を無視する。ベース名側は設定で切り替え可能。
pub fn find_sidecars(
    primary_path: &Path,
    sidecar_extensions: &[String],
    case_insensitive_stems: bool,
) -> Vec<PathBuf> {
    let Some(parent) = primary_path.parent() else {
        return Vec::new();
    };
    let Some(stem) = primary_path.file_stem().and_then(|v| v.to_str()) else {
        return Vec::new();
    };
    let Ok(entries) = fs::read_dir(parent) else {
        log::warn!("サイドカー探索のためのフォルダを読めませんでした: {}", parent.display());
        return Vec::new();
    };

    let mut matches = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || path == primary_path {
            continue;
        }
        let Some(candidate_stem) = path.file_stem().and_then(|v| v.to_str()) else {
            continue;
        };
        if !stem_matches(stem, candidate_stem, case_insensitive_stems) {
            continue;
        }
        let Some(ext) = path.extension().and_then(|v| v.to_str()) else {
            continue;
        };
        if sidecar_extensions
            .iter()
            .any(|sidecar_ext| sidecar_ext.eq_ignore_ascii_case(ext))
        {
            matches.push(path);
        }
    }

    matches.sort();
    matches
}

/// サイドカーの新しいパス。拡張子は元の大文字小文字をそのまま保つ。
pub fn sidecar_target(sidecar_path: &Path, new_base: &str) -> Option<PathBuf> {
    let parent = sidecar_path.parent()?;
    let ext = sidecar_path.extension().and_then(|v| v.to_str())?;
    Some(parent.join(format!("{}.{}", new_base, ext)))
}

fn stem_matches(primary: &str, candidate: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        primary.eq_ignore_ascii_case(candidate)
    } else {
        primary == candidate
    }
}

#[cfg(test)]
mod tests {
    use super::{find_sidecars, sidecar_target};
    use std::fs::{self, File};
    use std::path::Path;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dirs must be creatable");
        }
        File::create(path).expect("file must be creatable");
    }

    fn sidecar_exts() -> Vec<String> {
        vec!["orf".to_string(), "raw".to_string()]
    }

    #[test]
    fn finds_raw_sibling_regardless_of_extension_case() {
        let temp = tempdir().expect("tempdir");
        let jpg = temp.path().join("P2161162.JPG");
        let orf = temp.path().join("P2161162.ORF");
        touch(&jpg);
        touch(&orf);

        let found = find_sidecars(&jpg, &sidecar_exts(), true);
        assert_eq!(found, vec![orf]);
    }

    #[test]
    fn ignores_other_stems_and_non_sidecar_extensions() {
        let temp = tempdir().expect("tempdir");
        let jpg = temp.path().join("P2161162.JPG");
        touch(&jpg);
        touch(&temp.path().join("P2161163.ORF"));
        touch(&temp.path().join("P2161162.txt"));

        let found = find_sidecars(&jpg, &sidecar_exts(), true);
        assert!(found.is_empty());
    }

    #[test]
    fn stem_case_match_is_configurable() {
        let temp = tempdir().expect("tempdir");
        let jpg = temp.path().join("p2161162.jpg");
        let orf = temp.path().join("P2161162.ORF");
        touch(&jpg);
        touch(&orf);

        let insensitive = find_sidecars(&jpg, &sidecar_exts(), true);
        assert_eq!(insensitive, vec![orf]);

        let sensitive = find_sidecars(&jpg, &sidecar_exts(), false);
        assert!(sensitive.is_empty());
    }

    #[test]
    fn multiple_sidecars_follow_the_same_primary() {
        let temp = tempdir().expect("tempdir");
        let jpg = temp.path().join("P2161162.JPG");
        let orf = temp.path().join("P2161162.ORF");
        let raw = temp.path().join("P2161162.RAW");
        touch(&jpg);
        touch(&orf);
        touch(&raw);

        let found = find_sidecars(&jpg, &sidecar_exts(), true);
        assert_eq!(found, vec![orf, raw]);
    }

    #[test]
    fn target_keeps_extension_case_verbatim() {
        let target = sidecar_target(Path::new("/photos/P2161162.ORF"), "20200216_123907");
        assert_eq!(
            target.as_deref(),
            Some(Path::new("/photos/20200216_123907.ORF"))
        );

        let lower = sidecar_target(Path::new("/photos/P2161162.orf"), "20200216_123907");
        assert_eq!(
            lower.as_deref(),
            Some(Path::new("/photos/20200216_123907.orf"))
        );
    }
}
