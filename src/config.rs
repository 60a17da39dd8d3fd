//! Client settings
//!
//! Uses Figment to merge built-in defaults, `<config_dir>/alketab/config.toml`,
//! an optional explicit file and `ALKETAB_*` environment variables.

use crate::error::AlKetabError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://alketab-api.web.app/api/search";
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const ENV_PREFIX: &str = "ALKETAB_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub base_url: String,
    /// Pre-shared key sent with every request. Never logged.
    pub api_key: String,
    pub api_key_header: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Default location of the user config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("alketab").join("config.toml"))
}

impl Settings {
    /// Load settings from every source, highest precedence last.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let figment = Self::figment(explicit).merge(Env::prefixed(ENV_PREFIX));
        Self::from_figment(figment)
    }

    /// Defaults plus config files, without the environment layer.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = default_config_path() {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AlKetabError> {
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| AlKetabError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        reqwest::header::HeaderName::from_bytes(self.api_key_header.as_bytes())
            .map_err(|_| {
                AlKetabError::Configuration(format!(
                    "api_key_header '{}' is not a valid header name",
                    self.api_key_header
                ))
            })?;
        if self.timeout_secs == 0 {
            return Err(AlKetabError::Configuration(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn without_user_file() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_figment(without_user_file()).unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.api_key_header, "X-API-Key");
        assert_eq!(settings.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"ak_test\"\ntimeout_secs = 15").unwrap();

        let settings =
            Settings::from_figment(without_user_file().merge(Toml::file(file.path()))).unwrap();
        assert_eq!(settings.api_key, "ak_test");
        assert_eq!(settings.timeout_secs, 15);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_url = Settings { base_url: "not a url".into(), ..Settings::default() };
        assert!(matches!(bad_url.validate(), Err(AlKetabError::InvalidUrl(_))));

        let zero_timeout = Settings { timeout_secs: 0, ..Settings::default() };
        assert_eq!(
            zero_timeout.validate(),
            Err(AlKetabError::Configuration("timeout_secs must be at least 1".into()))
        );

        let bad_header = Settings { api_key_header: "X API Key".into(), ..Settings::default() };
        match bad_header.validate() {
            Err(AlKetabError::Configuration(message)) => assert!(message.contains("X API Key")),
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_reports_which_setting_is_wrong() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = 0").unwrap();

        let err = Settings::from_figment(without_user_file().merge(Toml::file(file.path())))
            .unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
        assert!(!err.to_string().contains("URL"));
    }
}
