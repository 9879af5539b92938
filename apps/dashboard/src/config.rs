use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use client_core::ListControllerOptions;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub search_debounce_ms: u64,
    pub cache_capacity: usize,
    pub request_timeout_secs: Option<u64>,
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".into(),
            search_debounce_ms: 500,
            cache_capacity: 20,
            request_timeout_secs: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn controller_options(&self) -> ListControllerOptions {
        ListControllerOptions {
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            cache_capacity: self.cache_capacity,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    search_debounce_ms: Option<u64>,
    cache_capacity: Option<usize>,
    request_timeout_secs: Option<u64>,
    export_dir: Option<PathBuf>,
}

/// Defaults, then `dashboard.toml` (or `$DASHBOARD_CONFIG`), then environment.
pub fn load_settings() -> Settings {
    let path = std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(&path));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let file_cfg = match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => file_cfg,
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring unreadable settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.search_debounce_ms {
        settings.search_debounce_ms = v;
    }
    if let Some(v) = file_cfg.cache_capacity {
        settings.cache_capacity = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
    if let Some(v) = file_cfg.export_dir {
        settings.export_dir = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("DASHBOARD_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("APP__SEARCH_DEBOUNCE_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.search_debounce_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__SEARCH_DEBOUNCE_MS"),
        }
    }

    if let Some(v) = lookup("APP__CACHE_CAPACITY") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.cache_capacity = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__CACHE_CAPACITY"),
        }
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }

    if let Some(v) = lookup("APP__EXPORT_DIR") {
        settings.export_dir = PathBuf::from(v);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
