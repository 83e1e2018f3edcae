//! `fireems.toml` settings and their resolution against env vars and flags.
//!
//! Precedence, lowest first: config file, environment, command line flags.
//! The config file is the one passed with `--config`, otherwise the file in the
//! platform config directory:
//! - Linux: ~/.config/fireems/fireems.toml
//! - macOS: ~/Library/Application Support/org.fireems.fireems/fireems.toml
//! - Windows: %APPDATA%/fireems/fireems/config/fireems.toml

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use fireems_map::DEFAULT_MIN_CONFIDENCE;
use fireems_schemas::SCHEMAS_ENV_VAR;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "fireems";
const APP_NAME: &str = "fireems";
pub const CONFIG_FILENAME: &str = "fireems.toml";
pub const TEMPLATES_ENV_VAR: &str = "FIREEMS_TEMPLATES_DIR";

/// Contents of `fireems.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub min_confidence: Option<u8>,
    pub templates_dir: Option<PathBuf>,
    pub schemas_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if let Some(value) = config.min_confidence {
            check_confidence(value)?;
        }
        Ok(config)
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub min_confidence: Option<u8>,
    pub templates_dir: Option<PathBuf>,
    pub schemas_dir: Option<PathBuf>,
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub min_confidence: u8,
    /// `None` when no directory was configured and the platform has no data dir.
    pub templates_dir: Option<PathBuf>,
    /// Extra schema files layered over the built-in tools.
    pub schemas_dir: Option<PathBuf>,
}

impl Settings {
    /// Layers environment values and flags over the config file.
    ///
    /// `env` looks up an environment variable; blank values count as unset.
    pub fn resolve(
        config: &Config,
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let env_dir = |key: &str| {
            env(key)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };

        let min_confidence = overrides
            .min_confidence
            .or(config.min_confidence)
            .unwrap_or(DEFAULT_MIN_CONFIDENCE);
        check_confidence(min_confidence)?;

        let templates_dir = overrides
            .templates_dir
            .clone()
            .or_else(|| env_dir(TEMPLATES_ENV_VAR))
            .or_else(|| config.templates_dir.clone())
            .or_else(default_templates_dir);
        let schemas_dir = overrides
            .schemas_dir
            .clone()
            .or_else(|| env_dir(SCHEMAS_ENV_VAR))
            .or_else(|| config.schemas_dir.clone());

        Ok(Self {
            min_confidence,
            templates_dir,
            schemas_dir,
        })
    }

    pub fn require_templates_dir(&self) -> Result<&Path> {
        self.templates_dir.as_deref().with_context(|| {
            format!("no templates directory; pass --templates-dir or set {TEMPLATES_ENV_VAR}")
        })
    }
}

fn check_confidence(value: u8) -> Result<()> {
    if value > 100 {
        bail!("min_confidence must be between 0 and 100, got {value}");
    }
    Ok(())
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

/// Platform location of `fireems.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

fn default_templates_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("templates"))
}

/// Loads the config file.
///
/// An explicit path must exist. A missing file at the default location yields
/// the default config.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let Some(path) = default_config_path() else {
        debug!("no platform config directory, using defaults");
        return Ok(Config::default());
    };
    if !path.is_file() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    read_config(&path)
}

fn read_config(path: &Path) -> Result<Config> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let config =
        Config::from_toml_str(&text).with_context(|| format!("parse config: {}", path.display()))?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_any_source() {
        let settings = Settings::resolve(&Config::default(), &Overrides::default(), no_env).unwrap();
        assert_eq!(settings.min_confidence, DEFAULT_MIN_CONFIDENCE);
        assert_eq!(settings.schemas_dir, None);
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let config = Config {
            min_confidence: Some(50),
            templates_dir: Some(PathBuf::from("/file/templates")),
            schemas_dir: Some(PathBuf::from("/file/schemas")),
        };
        let env = |key: &str| match key {
            TEMPLATES_ENV_VAR => Some("/env/templates".to_string()),
            SCHEMAS_ENV_VAR => Some("  ".to_string()),
            _ => None,
        };

        let settings = Settings::resolve(&config, &Overrides::default(), env).unwrap();
        assert_eq!(settings.min_confidence, 50);
        assert_eq!(settings.templates_dir, Some(PathBuf::from("/env/templates")));
        assert_eq!(settings.schemas_dir, Some(PathBuf::from("/file/schemas")));

        let overrides = Overrides {
            min_confidence: Some(60),
            templates_dir: Some(PathBuf::from("/flag/templates")),
            schemas_dir: None,
        };
        let settings = Settings::resolve(&config, &overrides, env).unwrap();
        assert_eq!(settings.min_confidence, 60);
        assert_eq!(settings.templates_dir, Some(PathBuf::from("/flag/templates")));
    }

    #[test]
    fn confidence_above_100_is_rejected() {
        let overrides = Overrides {
            min_confidence: Some(101),
            ..Overrides::default()
        };
        assert!(Settings::resolve(&Config::default(), &overrides, no_env).is_err());
        assert!(Config::from_toml_str("min_confidence = 150").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("min_confidnce = 40").unwrap_err();
        assert!(err.to_string().contains("min_confidnce"));
    }
}
