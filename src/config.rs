//! Persisted application settings.
//!
//! Settings live in `settings.json` in the OS config directory. A missing or
//! unreadable file falls back to defaults. `OLLAMA_URL` and `OLLAMA_MODEL`
//! override the suggestion endpoint for the running process only; they are
//! never written back to disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{LayoutConfig, ViewMode};

const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Explicit generate endpoint; resolved from the environment when unset.
    pub endpoint: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    /// How many existing tasks are sent along with the prompt.
    pub sample_size: usize,
    #[serde(skip)]
    env_endpoint: Option<String>,
    #[serde(skip)]
    env_model: Option<String>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "llama2".into(),
            timeout_secs: 10,
            sample_size: 10,
            env_endpoint: None,
            env_model: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Length of the visible window in calendar months.
    pub window_months: u32,
    pub view_mode: ViewMode,
    pub layout: LayoutConfig,
    pub suggestion: SuggestionConfig,
    /// Default tracing filter when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_months: 3,
            view_mode: ViewMode::Months,
            layout: LayoutConfig::default(),
            suggestion: SuggestionConfig::default(),
            log_filter: "info".into(),
        }
    }
}

impl AppConfig {
    /// Load settings from the config directory and apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::settings_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        self.suggestion.env_endpoint = env("OLLAMA_URL").filter(|s| !s.trim().is_empty());
        self.suggestion.env_model = env("OLLAMA_MODEL").filter(|s| !s.trim().is_empty());
        self.window_months = self.window_months.max(1);
    }

    pub fn save(&self) {
        let Some(path) = Self::settings_path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            tracing::error!(path = %path.display(), error = %e, "failed to save settings");
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    fn settings_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "LanePlanner")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }
}

impl SuggestionConfig {
    /// The generate endpoint to call, resolved against the host environment.
    pub fn resolved_endpoint(&self) -> String {
        resolve_endpoint(
            self.env_endpoint.as_deref().or(self.endpoint.as_deref()),
            |key| std::env::var(key).ok(),
            |path| std::fs::read_to_string(path).ok(),
        )
    }

    pub fn effective_model(&self) -> &str {
        self.env_model.as_deref().unwrap_or(&self.model)
    }
}

/// Pick the generate endpoint.
///
/// An explicit endpoint wins. Under WSL the Windows host is reached through the
/// first nameserver in `/etc/resolv.conf`. Otherwise localhost.
pub fn resolve_endpoint(
    explicit: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    read_file: impl Fn(&str) -> Option<String>,
) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }

    if !cfg!(target_os = "linux") {
        return DEFAULT_ENDPOINT.to_string();
    }

    let is_wsl = env("WSL_DISTRO_NAME").is_some()
        || env("WSLENV").is_some()
        || read_file("/proc/version")
            .map(|v| {
                let v = v.to_lowercase();
                v.contains("microsoft") || v.contains("wsl")
            })
            .unwrap_or(false);

    if is_wsl {
        let host = read_file("/etc/resolv.conf").and_then(|conf| {
            conf.lines()
                .filter_map(|line| line.trim().strip_prefix("nameserver"))
                .map(str::trim)
                .find(|ip| ip.parse::<std::net::Ipv4Addr>().is_ok())
                .map(str::to_string)
        });
        if let Some(host) = host {
            tracing::info!(%host, "WSL detected, using Windows host for suggestions");
            return format!("http://{host}:11434/api/generate");
        }
        tracing::warn!("WSL detected but no nameserver found, falling back to localhost");
    }

    DEFAULT_ENDPOINT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_three_month_plan() {
        let config = AppConfig::default();
        assert_eq!(config.window_months, 3);
        assert_eq!(config.suggestion.timeout_secs, 10);
        assert_eq!(config.suggestion.sample_size, 10);
        assert_eq!(config.layout.min_height_percent, 5.0);
    }

    #[test]
    fn partial_settings_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "view_mode": "weeks", "suggestion": { "model": "mistral" } }"#)
            .unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.view_mode, ViewMode::Weeks);
        assert_eq!(config.suggestion.model, "mistral");
        assert_eq!(config.suggestion.timeout_secs, 10);
        assert_eq!(config.window_months, 3);
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut config = AppConfig::default();
        config.view_mode = ViewMode::Days;

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path), config);
    }

    #[test]
    fn env_overrides_endpoint_and_model() {
        let mut config = AppConfig::default();
        config.apply_env(lookup(&[("OLLAMA_URL", "http://gpu:11434/api/generate"), ("OLLAMA_MODEL", "phi3")]));
        assert_eq!(config.suggestion.resolved_endpoint(), "http://gpu:11434/api/generate");
        assert_eq!(config.suggestion.effective_model(), "phi3");
    }

    #[test]
    fn env_overrides_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut config = AppConfig::default();
        config.apply_env(lookup(&[("OLLAMA_URL", "http://tmp-host:1/api/generate"), ("OLLAMA_MODEL", "phi3")]));
        config.view_mode = ViewMode::Weeks;

        config.save_to(&path).unwrap();
        let reloaded = AppConfig::load_from(&path);
        assert_eq!(reloaded.view_mode, ViewMode::Weeks);
        assert_eq!(reloaded.suggestion.endpoint, None);
        assert_eq!(reloaded.suggestion.model, "llama2");
        assert_eq!(reloaded.suggestion.effective_model(), "llama2");

        // The running process keeps honouring the override.
        assert_eq!(config.suggestion.resolved_endpoint(), "http://tmp-host:1/api/generate");
    }

    #[test]
    fn env_override_beats_configured_endpoint() {
        let mut config = AppConfig::default();
        config.suggestion.endpoint = Some("http://saved/api/generate".into());
        config.apply_env(lookup(&[("OLLAMA_URL", "http://gpu:11434/api/generate")]));
        assert_eq!(config.suggestion.resolved_endpoint(), "http://gpu:11434/api/generate");
        assert_eq!(config.suggestion.endpoint.as_deref(), Some("http://saved/api/generate"));
    }

    #[test]
    fn explicit_endpoint_wins() {
        let url = resolve_endpoint(Some("http://x/api/generate"), lookup(&[("WSLENV", "1")]), lookup(&[]));
        assert_eq!(url, "http://x/api/generate");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn wsl_uses_resolv_conf_nameserver() {
        let files = lookup(&[
            ("/proc/version", "Linux version 5.15.90.1-microsoft-standard-WSL2"),
            ("/etc/resolv.conf", "# generated\nnameserver 172.28.96.1\n"),
        ]);
        let url = resolve_endpoint(None, lookup(&[]), files);
        assert_eq!(url, "http://172.28.96.1:11434/api/generate");
    }

    #[test]
    fn plain_linux_uses_localhost() {
        let files = lookup(&[("/proc/version", "Linux version 6.8.0-generic")]);
        assert_eq!(resolve_endpoint(None, lookup(&[]), files), DEFAULT_ENDPOINT);
    }
}
