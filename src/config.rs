// User configuration, stored as YAML next to the other app files

// =============== Imports ================
use crate::models::{Preferences, TrackType};
use crate::scraping::ResolverSettings;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use url::Url;

pub const APP_DIR: &str = "kai-resolver";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub site_url: String,
    pub oracle_url: String,
    pub encode_path: String,
    pub decode_path: String,
    pub decode_media_path: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub concurrency: usize,
    // * Ranking preferences
    pub quality: String,
    pub server: String,
    pub track_type: String,
    // * Parse-time filters, empty hosters means all of them
    pub enabled_types: Vec<TrackType>,
    pub enabled_hosters: Vec<String>,
    pub player: String,
    pub player_args: String,
}

impl Default for Config {
    fn default() -> Self {
        let settings = ResolverSettings::default();
        Self {
            site_url: settings.site_url,
            oracle_url: settings.oracle_url,
            encode_path: settings.encode_path,
            decode_path: settings.decode_path,
            decode_media_path: settings.decode_media_path,
            user_agent: settings.user_agent,
            timeout_secs: 30,
            concurrency: settings.concurrency,
            quality: "1080p".to_string(),
            server: "Server 1".to_string(),
            track_type: TrackType::Sub.as_str().to_string(),
            enabled_types: settings.enabled_types,
            enabled_hosters: Vec::new(),
            player: "mpv".to_string(),
            player_args: String::new(),
        }
    }
}

impl Config {
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            site_url: self.site_url.clone(),
            oracle_url: self.oracle_url.clone(),
            encode_path: self.encode_path.clone(),
            decode_path: self.decode_path.clone(),
            decode_media_path: self.decode_media_path.clone(),
            user_agent: self.user_agent.clone(),
            concurrency: self.concurrency,
            enabled_types: self.enabled_types.clone(),
            enabled_hosters: self.enabled_hosters.clone(),
        }
    }

    /// Site tokens like `softsub` are turned into the names used in labels.
    pub fn preferences(&self) -> Preferences {
        let track_type = match self.track_type.parse::<TrackType>() {
            Ok(track_type) => track_type.display_name().to_string(),
            Err(_) => self.track_type.clone(),
        };
        Preferences {
            quality: self.quality.clone(),
            server: self.server.clone(),
            track_type,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Failed to get config directory"))?
        .join(APP_DIR)
        .join("config.yaml"))
}

pub fn parse_config(contents: &str) -> Result<Config> {
    serde_yaml::from_str(contents).with_context(|| "Failed to parse config file as YAML")
}

/// Loads the config file, writing the defaults first if there is none.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;

    if !path.exists() {
        log::info!("No config at {:?}, creating default", path);
        let config = Config::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
        let yaml = serde_yaml::to_string(&config).with_context(|| "Failed to serialize default config")?;
        fs::write(&path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;
        return Ok(config);
    }

    let contents =
        fs::read_to_string(&path).with_context(|| format!("Failed to read config file: {:?}", path))?;
    parse_config(&contents)
}

// Checks the values serde can't
pub fn test(config: &Config) -> Result<()> {
    for (name, value) in [("site_url", &config.site_url), ("oracle_url", &config.oracle_url)] {
        Url::parse(value).with_context(|| format!("Invalid {} in config: {}", name, value))?;
    }
    if !(1..=16).contains(&config.concurrency) {
        anyhow::bail!("concurrency must be between 1 and 16, got {}", config.concurrency);
    }
    if config.timeout_secs == 0 {
        anyhow::bail!("timeout_secs must be greater than 0");
    }
    if config.enabled_types.is_empty() {
        anyhow::bail!("enabled_types can't be empty, remove it to enable every type");
    }
    if config.user_agent.trim().is_empty() {
        anyhow::bail!("user_agent can't be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = parse_config("quality: 720p\nenabled_types: [dub]\n").unwrap();

        assert_eq!(config.quality, "720p");
        assert_eq!(config.enabled_types, vec![TrackType::Dub]);
        assert_eq!(config.site_url, "https://animekai.to");
        assert_eq!(config.concurrency, 3);
        assert!(test(&config).is_ok());
    }

    #[test]
    fn unknown_track_type_is_rejected() {
        assert!(parse_config("enabled_types: [raw]\n").is_err());
    }

    #[test]
    fn bad_values_fail_the_check() {
        let config = Config {
            concurrency: 0,
            ..Config::default()
        };
        assert!(test(&config).is_err());

        let config = Config {
            site_url: "animekai".into(),
            ..Config::default()
        };
        assert!(test(&config).is_err());

        let config = Config {
            enabled_types: Vec::new(),
            ..Config::default()
        };
        assert!(test(&config).is_err());
    }

    #[test]
    fn preferences_use_label_names() {
        let config = Config {
            track_type: "softsub".into(),
            ..Config::default()
        };
        assert_eq!(config.preferences().track_type, "Soft Sub");

        let config = Config {
            track_type: "Whatever".into(),
            ..Config::default()
        };
        assert_eq!(config.preferences().track_type, "Whatever");
    }

    #[test]
    fn settings_carry_the_filters() {
        let config = Config {
            enabled_hosters: vec!["Server 2".into()],
            concurrency: 5,
            ..Config::default()
        };
        let settings = config.resolver_settings();

        assert_eq!(settings.enabled_hosters, vec!["Server 2".to_string()]);
        assert_eq!(settings.concurrency, 5);
    }
}
