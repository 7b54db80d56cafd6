use std::path::PathBuf;

use mythmail_api::ApiConfig;
use mythmail_avatar::AvatarConfig;
use serde::Deserialize;

pub(crate) const API_URL_ENV: &str = "MYTHMAIL_API_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) api: ApiConfig,
    pub(crate) avatar: AvatarConfig,
    #[serde(skip)]
    pub(crate) load_error: Option<String>,
}

fn xdg_config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

fn config_path_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("mythmail.toml"),
        xdg_config_dir().join("mythmail").join("mythmail.toml"),
    ]
}

fn load_config_text() -> Option<String> {
    for path in config_path_candidates() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            return Some(content);
        }
    }
    None
}

pub(crate) fn load_app_config() -> AppConfig {
    let mut config = match load_config_text() {
        Some(content) => parse_app_config(&content),
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Unreadable files fall back to defaults; the error is kept for reporting.
pub(crate) fn parse_app_config(content: &str) -> AppConfig {
    match toml::from_str::<AppConfig>(content) {
        Ok(config) => config,
        Err(err) => AppConfig {
            load_error: Some(err.to_string()),
            ..AppConfig::default()
        },
    }
}

pub(crate) fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.api.base_url = url.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, apply_env_overrides, parse_app_config};

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_app_config("");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert!(config.api.mock_fallback);
        assert!(config.avatar.brand_lookup);
        assert_eq!(config.avatar.display_size, 200);
        assert_eq!(config.avatar.probe_size, 80);
    }

    #[test]
    fn sections_override_defaults_field_by_field() {
        let config = parse_app_config(
            r#"
[api]
base_url = "https://mail.example.com"
mock_fallback = false

[avatar]
brand_lookup = false
display_size = 96
"#,
        );
        assert_eq!(config.load_error, None);
        assert_eq!(config.api.base_url, "https://mail.example.com");
        assert_eq!(config.api.timeout_secs, 10);
        assert!(!config.api.mock_fallback);
        assert!(!config.avatar.brand_lookup);
        assert_eq!(config.avatar.display_size, 96);
        assert_eq!(config.avatar.image_base_url, "https://www.gravatar.com");
    }

    #[test]
    fn invalid_file_reports_error_and_uses_defaults() {
        let config = parse_app_config("[api]\ntimeout_secs = \"soon\"\n");
        assert!(config.load_error.is_some());
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn env_overrides_api_url() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == "MYTHMAIL_API_URL").then(|| " http://10.0.0.2:8080 ".to_string())
        });
        assert_eq!(config.api.base_url, "http://10.0.0.2:8080");

        apply_env_overrides(&mut config, |_| Some("  ".to_string()));
        assert_eq!(config.api.base_url, "http://10.0.0.2:8080");
    }
}
