use crate::error::{Result, SeaVigilError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// 接続先を上書きする環境変数
pub const BASE_URL_ENV: &str = "SEAVIGIL_API_URL";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: Option<String>,
    pub step_interval_ms: u64,
    pub passthrough: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            step_interval_ms: 1500,
            passthrough: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 読み込めなければ警告して既定値を使う
    pub fn load_or_default() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_or_default_from(&path),
            Err(err) => {
                warn!(error = %err, "config path unavailable, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_or_default_from(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SeaVigilError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("seavigil").join("config.json"))
    }

    /// 接続先URL（環境変数 > 設定ファイル > 既定値）
    pub fn base_url(&self) -> String {
        let env = std::env::var(BASE_URL_ENV).ok();
        resolve_base_url(env.as_deref(), self.base_url.as_deref())
    }

    pub fn set_base_url(&mut self, url: String) -> Result<()> {
        validate_base_url(&url)?;
        self.base_url = Some(url);
        self.save()
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

fn resolve_base_url(env: Option<&str>, file: Option<&str>) -> String {
    env.or(file)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

pub fn validate_base_url(url: &str) -> Result<()> {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(SeaVigilError::Config(format!(
            "URLは http:// または https:// で始まる必要があります: {}",
            url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_base_url_default() {
        assert_eq!(resolve_base_url(None, None), "http://127.0.0.1:5000");
        assert_eq!(resolve_base_url(Some("  "), None), "http://127.0.0.1:5000");
    }

    #[test]
    fn test_resolve_base_url_env_wins() {
        let url = resolve_base_url(Some("http://10.0.0.5:8000/"), Some("http://file:5000"));
        assert_eq!(url, "http://10.0.0.5:8000");
    }

    #[test]
    fn test_resolve_base_url_from_file() {
        assert_eq!(resolve_base_url(None, Some("https://enhance.local//")), "https://enhance.local");
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("http://127.0.0.1:5000").is_ok());
        assert!(validate_base_url("https://example.com").is_ok());
        assert!(matches!(
            validate_base_url("127.0.0.1:5000"),
            Err(SeaVigilError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.base_url.is_none());
        assert_eq!(config.step_interval(), Duration::from_millis(1500));
        assert!(!config.passthrough);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            base_url: Some("http://10.1.1.1:5000".into()),
            step_interval_ms: 10,
            passthrough: true,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url.as_deref(), Some("http://10.1.1.1:5000"));
        assert_eq!(loaded.step_interval_ms, 10);
        assert!(loaded.passthrough);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"passthrough": true}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.passthrough);
        assert_eq!(loaded.step_interval_ms, 1500);
    }

    #[test]
    fn test_malformed_file_can_be_repaired() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ base_url: ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(SeaVigilError::JsonParse(_))));

        let mut config = Config::load_or_default_from(&path);
        assert!(config.base_url.is_none());
        assert_eq!(config.step_interval_ms, 1500);

        config.base_url = Some("http://10.0.0.9:5000".into());
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url.as_deref(), Some("http://10.0.0.9:5000"));
    }
}
