use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::pacing::PaceThresholds;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "walkdeck";

const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing: Option<PacingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walkthrough: Option<WalkthroughConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Seconds ahead of schedule before the verdict reads "ahead".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ahead_secs: Option<u64>,

    /// Seconds behind schedule before the verdict reads "behind".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behind_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkthroughConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory holding session state files. Defaults to the user cache dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<PathBuf>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `walkdeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# Walkdeck configuration\n{yaml}");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "pacing.ahead_secs" => {
                let secs = parse_secs(key, value)?;
                self.pacing.get_or_insert_with(PacingConfig::default).ahead_secs = Some(secs);
            }
            "pacing.behind_secs" => {
                let secs = parse_secs(key, value)?;
                self.pacing.get_or_insert_with(PacingConfig::default).behind_secs = Some(secs);
            }
            "walkthrough.tick_interval_ms" => {
                let ms: u64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid {key}: {value}. Must be milliseconds."))?;
                if !(100..=10_000).contains(&ms) {
                    anyhow::bail!("Invalid {key}: {value}. Must be between 100 and 10000.");
                }
                self.walkthrough
                    .get_or_insert_with(WalkthroughConfig::default)
                    .tick_interval_ms = Some(ms);
            }
            "sync.session_dir" => {
                self.sync.get_or_insert_with(SyncConfig::default).session_dir =
                    Some(PathBuf::from(value));
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: pacing.ahead_secs, pacing.behind_secs, walkthrough.tick_interval_ms, sync.session_dir"
            ),
        }
        Ok(())
    }

    /// Pacing cutoffs with file overrides applied on top of the defaults.
    pub fn pace_thresholds(&self) -> PaceThresholds {
        let defaults = PaceThresholds::default();
        let pacing = self.pacing.clone().unwrap_or_default();
        PaceThresholds {
            ahead: pacing
                .ahead_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.ahead),
            behind: pacing
                .behind_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.behind),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        let ms = self
            .walkthrough
            .as_ref()
            .and_then(|w| w.tick_interval_ms)
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS);
        Duration::from_millis(ms)
    }

    pub fn session_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = self.sync.as_ref().and_then(|s| s.session_dir.clone()) {
            return Ok(dir);
        }
        dirs::cache_dir()
            .map(|d| d.join(APP_DIR).join("sessions"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid {key}: {value}. Must be a number of seconds."))
}
