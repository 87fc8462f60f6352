//! TOML settings loading and validation.
//!
//! Every section is optional. Command-line flags override whatever the
//! settings file provides.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Settings file looked up when `--settings` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "allocheck.toml";

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub inputs: InputSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub source: SourceSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputSettings {
    #[serde(default = "default_policy")]
    pub policy: PathBuf,
    #[serde(default)]
    pub thesis: Option<PathBuf>,
}

fn default_policy() -> PathBuf {
    "targets.json".into()
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            thesis: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_out_file")]
    pub file: String,
}

fn default_out_dir() -> PathBuf {
    ".".into()
}
fn default_out_file() -> String {
    "report.md".into()
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_out_dir(),
            file: default_out_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "fidelity".into()
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::SettingsRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse from a TOML string (useful for testing).
    pub fn from_toml(toml: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(toml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Resolve the settings for a run.
    ///
    /// An explicitly requested file must exist. Without one, the default
    /// file is used when present and built-in defaults otherwise.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    debug!("no {DEFAULT_SETTINGS_FILE}, using built-in defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.output.file.trim().is_empty() {
            return Err(Error::Settings("output file name must not be empty".into()));
        }
        if self.source.format.trim().is_empty() {
            return Err(Error::Settings("source format must not be empty".into()));
        }
        Ok(())
    }

    /// Full path of the report when `--out` is not given.
    pub fn report_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.file)
    }
}
