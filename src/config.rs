use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::variance::DEFAULT_FALLBACK_HOURS;

pub const DEFAULT_MINUTE_STEP: u32 = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Hours assumed for each empty day when projecting the outcome
    pub fallback_hours_per_day: f64,
    /// Up/Down increment for the minutes field
    pub minute_step: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_hours_per_day: DEFAULT_FALLBACK_HOURS,
            minute_step: DEFAULT_MINUTE_STEP,
        }
    }
}

impl Config {
    /// Apply command-line overrides on top of the stored values. A fallback
    /// that is negative or not finite is ignored.
    pub fn with_overrides(mut self, fallback_hours: Option<f64>, minute_step: Option<u32>) -> Self {
        if let Some(hours) = fallback_hours {
            if is_valid_fallback(hours) {
                self.fallback_hours_per_day = hours;
            } else {
                warn!("event=config_override field=fallback_hours_per_day status=ignored value={hours}");
            }
        }
        if let Some(step) = minute_step {
            self.minute_step = step;
        }
        self
    }

    /// Replace an unusable fallback with the default
    fn sanitized(mut self) -> Self {
        if !is_valid_fallback(self.fallback_hours_per_day) {
            warn!(
                "event=config_load field=fallback_hours_per_day status=reset value={}",
                self.fallback_hours_per_day
            );
            self.fallback_hours_per_day = DEFAULT_FALLBACK_HOURS;
        }
        self
    }
}

fn is_valid_fallback(hours: f64) -> bool {
    hours.is_finite() && hours >= 0.0
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("paceline_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg.sanitized();
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
