//! Configuration loading and settings resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default playback volume (fraction of full scale)
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Default catalog host
pub const DEFAULT_CATALOG_URL: &str = "https://www.myinstants.com";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "MIST_CONFIG";

pub const VOLUME_ENV: &str = "MIST_VOLUME";
pub const WAIT_ENV: &str = "MIST_WAIT";
pub const DETAILS_ENV: &str = "MIST_DETAILS";
pub const CATALOG_URL_ENV: &str = "MIST_CATALOG_URL";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub volume: Option<f32>,
    pub wait: Option<bool>,
    pub extended_details: Option<bool>,
    pub catalog_url: Option<String>,
    pub port: Option<u16>,
}

/// Values supplied on the command line, if any
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub volume: Option<f32>,
    pub wait: Option<bool>,
    pub extended_details: Option<bool>,
    pub catalog_url: Option<String>,
}

/// Fully resolved player settings
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    /// Global volume, always within 0.0-1.0
    pub volume: f32,
    /// Whether `play` waits for the sound to finish unless told otherwise
    pub wait: bool,
    /// Enables duration estimates and the sound details operation
    pub extended_details: bool,
    /// Catalog base URL without trailing slash
    pub catalog_url: String,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            wait: true,
            extended_details: false,
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
        }
    }
}

impl PlayerSettings {
    /// Resolve settings against the process environment
    pub fn resolve(cli: &SettingsOverrides, file: &TomlConfig) -> Self {
        Self::resolve_with(cli, file, |name| std::env::var(name).ok())
    }

    /// Resolve settings using `env` as the environment lookup
    pub fn resolve_with<F>(cli: &SettingsOverrides, file: &TomlConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let volume = cli
            .volume
            .map(clamp_volume)
            .or_else(|| env(VOLUME_ENV).map(|v| parse_volume(&v)))
            .or_else(|| file.volume.map(clamp_volume))
            .unwrap_or(defaults.volume);

        let wait = cli
            .wait
            .or_else(|| env(WAIT_ENV).map(|v| parse_wait(&v)))
            .or(file.wait)
            .unwrap_or(defaults.wait);

        let extended_details = cli
            .extended_details
            .or_else(|| env(DETAILS_ENV).map(|v| parse_flag(&v)))
            .or(file.extended_details)
            .unwrap_or(defaults.extended_details);

        let catalog_url = cli
            .catalog_url
            .clone()
            .or_else(|| env(CATALOG_URL_ENV).filter(|v| !v.trim().is_empty()))
            .or_else(|| file.catalog_url.clone())
            .unwrap_or(defaults.catalog_url);

        Self {
            volume,
            wait,
            extended_details,
            catalog_url: catalog_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Clamp a volume into 0.0-1.0; NaN falls back to the default
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        DEFAULT_VOLUME
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Parse a volume string. Unparsable and zero-valued input yields the default.
pub fn parse_volume(raw: &str) -> f32 {
    match raw.trim().parse::<f32>() {
        Ok(v) if v != 0.0 && !v.is_nan() => clamp_volume(v),
        _ => DEFAULT_VOLUME,
    }
}

/// Any value other than `false` enables waiting
pub fn parse_wait(raw: &str) -> bool {
    raw.trim() != "false"
}

/// Parse an opt-in boolean flag (`1`, `true`, `yes`, `on`)
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Locate the config file: `MIST_CONFIG` if set, otherwise `<config dir>/mist/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|d| d.join("mist").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config_from(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    if let Some(volume) = config.volume {
        if volume.is_nan() {
            return Err(Error::Config(format!(
                "volume in {} is not a number",
                path.display()
            )));
        }
    }
    Ok(config)
}

/// Load the config file, degrading to defaults when it is missing or invalid
pub fn load_toml_config() -> TomlConfig {
    let Some(path) = config_file_path() else {
        debug!("No config directory on this platform, using defaults");
        return TomlConfig::default();
    };

    if !path.exists() {
        debug!("Config file {} not found, using defaults", path.display());
        return TomlConfig::default();
    }

    match load_toml_config_from(&path) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let settings = PlayerSettings::resolve_with(
            &SettingsOverrides::default(),
            &TomlConfig::default(),
            env_of(&[]),
        );
        assert_eq!(settings, PlayerSettings::default());
        assert_eq!(settings.volume, 0.5);
        assert!(settings.wait);
        assert!(!settings.extended_details);
    }

    #[test]
    fn test_volume_parsing() {
        assert_eq!(parse_volume("0.8"), 0.8);
        assert_eq!(parse_volume("2"), 1.0);
        assert_eq!(parse_volume("-1"), 0.0);
        assert_eq!(parse_volume("loud"), DEFAULT_VOLUME);
        assert_eq!(parse_volume(""), DEFAULT_VOLUME);
        assert_eq!(parse_volume("0"), DEFAULT_VOLUME);
    }

    #[test]
    fn test_wait_parsing() {
        assert!(!parse_wait("false"));
        assert!(parse_wait("true"));
        assert!(parse_wait("0"));
        assert!(parse_wait(""));
    }

    #[test]
    fn test_flag_parsing() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_priority_cli_over_env_over_file() {
        let file = TomlConfig {
            volume: Some(0.2),
            wait: Some(true),
            extended_details: Some(true),
            catalog_url: Some("http://file.example".to_string()),
            ..Default::default()
        };
        let env = env_of(&[(VOLUME_ENV, "0.3"), (WAIT_ENV, "false")]);

        let from_env = PlayerSettings::resolve_with(&SettingsOverrides::default(), &file, &env);
        assert_eq!(from_env.volume, 0.3);
        assert!(!from_env.wait);
        assert!(from_env.extended_details);
        assert_eq!(from_env.catalog_url, "http://file.example");

        let cli = SettingsOverrides {
            volume: Some(0.9),
            catalog_url: Some("http://cli.example/".to_string()),
            ..Default::default()
        };
        let from_cli = PlayerSettings::resolve_with(&cli, &file, &env);
        assert_eq!(from_cli.volume, 0.9);
        assert_eq!(from_cli.catalog_url, "http://cli.example");
    }

    #[test]
    fn test_file_volume_is_clamped() {
        let file = TomlConfig {
            volume: Some(3.0),
            ..Default::default()
        };
        let settings =
            PlayerSettings::resolve_with(&SettingsOverrides::default(), &file, env_of(&[]));
        assert_eq!(settings.volume, 1.0);
    }
}
