use std::{fs, path::Path, time::Duration};

use client_core::{http::DEFAULT_API_BASE_URL, speech::DEFAULT_SPEECH_LOCALE};
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "assistant.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub analysis_url: Option<String>,
    pub speech_locale: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            analysis_url: None,
            speech_locale: DEFAULT_SPEECH_LOCALE.into(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    analysis_url: Option<String>,
    speech_locale: Option<String>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => merge_file(settings, file_cfg),
        Err(err) => tracing::warn!(path = %path.display(), "ignoring malformed settings file: {err}"),
    }
}

fn merge_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.analysis_url {
        settings.analysis_url = Some(v);
    }
    if let Some(v) = file_cfg.speech_locale {
        settings.speech_locale = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("HEALTH_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("IMAGE_ANALYSIS_URL") {
        settings.analysis_url = Some(v);
    }
    if let Some(v) = lookup("APP__ANALYSIS_URL") {
        settings.analysis_url = Some(v);
    }

    if let Some(v) = lookup("SPEECH_LOCALE") {
        settings.speech_locale = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn defaults_point_at_local_service() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(settings.speech_locale, "en-US");
        assert!(settings.analysis_url.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("assistant_settings_{suffix}.toml"));
        fs::write(
            &path,
            "api_base_url = \"http://10.0.0.5:5000\"\nrequest_timeout_secs = 5\n",
        )
        .expect("write settings");

        let mut settings = Settings::default();
        apply_file(&mut settings, &path);

        assert_eq!(settings.api_base_url, "http://10.0.0.5:5000");
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn env_overrides_win_and_bad_numbers_are_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("HEALTH_API_BASE_URL", "http://a:1"),
            ("APP__API_BASE_URL", "http://b:2"),
            ("IMAGE_ANALYSIS_URL", "http://models/analyze"),
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
        ]);
        let mut settings = Settings::default();
        apply_env(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.api_base_url, "http://b:2");
        assert_eq!(
            settings.analysis_url.as_deref(),
            Some("http://models/analyze")
        );
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let mut settings = Settings::default();
        apply_file(&mut settings, Path::new("/nonexistent/assistant.toml"));
        assert_eq!(settings, Settings::default());
    }
}
