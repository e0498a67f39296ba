//! Configuration management for respnav.
//!
//! Timings, scroll geometry, marker class names and the host markup contract.
//! Every field has a default so a partial (or missing) config file works.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::conversation::MarkupContract;
use crate::error::{Error, Result};

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub scroll: ScrollConfig,

    #[serde(default)]
    pub markers: MarkerConfig,

    /// Maximum snippet length in characters (before the ellipsis)
    #[serde(default = "default_snippet_max_chars")]
    pub snippet_max_chars: usize,

    #[serde(default)]
    pub contract: MarkupContract,
}

fn default_snippet_max_chars() -> usize {
    90
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            scroll: ScrollConfig::default(),
            markers: MarkerConfig::default(),
            snippet_max_chars: default_snippet_max_chars(),
            contract: MarkupContract::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the user config directory, or return the
    /// default if the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, or return the default if it does not
    /// exist. The result is validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: EngineConfig =
            serde_json::from_str(&contents).map_err(|source| Error::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate();

        Ok(config)
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(Error::NoConfigDir)?;
        Ok(config_dir.join("respnav").join("config.json"))
    }

    /// Clamp numeric settings to sane ranges.
    pub fn validate(&mut self) {
        self.timing.validate();
        self.scroll.validate();
        self.snippet_max_chars = self.snippet_max_chars.clamp(10, 500);
    }
}

/// Timer settings, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Quiet period before a burst of relevant mutations triggers a rebuild
    pub debounce_ms: u64,
    /// Period of the location/reconciliation poll
    pub poll_ms: u64,
    /// Delay after start before the one-shot settle rebuild
    pub settle_ms: u64,
    /// How long the jump flash stays on a turn
    pub flash_ms: u64,
    /// How long finished code blocks keep the ready marker
    pub code_ready_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            poll_ms: 600,
            settle_ms: 900,
            flash_ms: 1200,
            code_ready_ms: 5500,
        }
    }
}

impl TimingConfig {
    pub fn validate(&mut self) {
        self.debounce_ms = self.debounce_ms.clamp(10, 5_000);
        self.poll_ms = self.poll_ms.clamp(100, 60_000);
        self.settle_ms = self.settle_ms.min(60_000);
        self.flash_ms = self.flash_ms.clamp(100, 10_000);
        self.code_ready_ms = self.code_ready_ms.clamp(100, 60_000);
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn flash(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }

    pub fn code_ready(&self) -> Duration {
        Duration::from_millis(self.code_ready_ms)
    }
}

/// Scroll target geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Vertical space kept free above the target for the panel header (px)
    pub header_offset: f64,
    /// How many ancestors to inspect when looking for a scroll container
    pub max_depth: usize,
    /// Minimum overflow (px) before an ancestor counts as scrolling
    pub overflow_margin: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            header_offset: 90.0,
            max_depth: 20,
            overflow_margin: 10.0,
        }
    }
}

impl ScrollConfig {
    pub fn validate(&mut self) {
        if !self.header_offset.is_finite() {
            self.header_offset = Self::default().header_offset;
        }
        if !self.overflow_margin.is_finite() {
            self.overflow_margin = Self::default().overflow_margin;
        }
        self.header_offset = self.header_offset.clamp(0.0, 1_000.0);
        self.overflow_margin = self.overflow_margin.clamp(0.0, 1_000.0);
        self.max_depth = self.max_depth.clamp(1, 100);
    }
}

/// Class names the engine puts on host elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub flash: String,
    pub code_pending: String,
    pub code_ready: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            flash: "respnav-flash".to_string(),
            code_pending: "respnav-code-pending".to_string(),
            code_ready: "respnav-code-ready".to_string(),
        }
    }
}
