use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub image_extensions: Vec<String>,
    pub sidecar_extensions: Vec<String>,
    pub case_insensitive_stems: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            image_extensions: to_strings(&["jpg", "jpeg", "png", "gif"]),
            sidecar_extensions: to_strings(&["orf", "raw"]),
            case_insensitive_stems: true,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "srp", "exifdate-renamer")
        .context("OS標準設定ディレクトリを取得できませんでした")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    if !paths.config_path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(&paths.config_path).with_context(|| {
        format!(
            "設定ファイルを読めませんでした: {}",
            paths.config_path.display()
        )
    })?;

    let config = toml::from_str::<AppConfig>(&raw).context("設定ファイルのパースに失敗しました")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn default_extension_sets_are_lowercase() {
        let config = AppConfig::default();
        assert!(config.image_extensions.contains(&"jpg".to_string()));
        assert!(config.sidecar_extensions.contains(&"orf".to_string()));
        assert!(config.case_insensitive_stems);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = AppConfig {
            image_extensions: vec!["jpg".to_string()],
            sidecar_extensions: vec!["raf".to_string(), "dng".to_string()],
            case_insensitive_stems: false,
        };

        let body = toml::to_string_pretty(&config).expect("serialize");
        let restored = toml::from_str::<AppConfig>(&body).expect("parse");
        assert_eq!(restored, config);
    }
}
