//! Editor settings: snap thresholds, chain spacing, and fade-out timing.
//!
//! Stored as JSON in the platform config directory. Every field has a
//! default, so a partial or missing file is fine.

use crate::constants::FADE_OUT_MS;
use crate::layout::LayoutConfig;
use crate::paths::AppPaths;
use crate::snap::SnapConfig;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub layout: LayoutConfig,
    pub fade_out_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            layout: LayoutConfig::default(),
            fade_out_ms: FADE_OUT_MS,
        }
    }
}

impl EditorConfig {
    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    /// Rejects values the snap and layout code cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.layout.block_spacing > 0.0) {
            bail!("block_spacing must be positive, got {}", self.layout.block_spacing);
        }
        if !(self.snap.horizontal_tolerance > 0.0) {
            bail!(
                "horizontal_tolerance must be positive, got {}",
                self.snap.horizontal_tolerance
            );
        }
        if !(self.snap.min_vertical_gap >= 0.0)
            || !(self.snap.min_vertical_gap <= self.snap.max_vertical_gap)
        {
            bail!(
                "vertical gap band [{}, {}] is empty",
                self.snap.min_vertical_gap,
                self.snap.max_vertical_gap
            );
        }
        Ok(())
    }

    /// Reads the config at `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Loads the user's config, falling back to the defaults on any problem.
    pub fn load_or_default(paths: Option<&AppPaths>) -> Self {
        let Some(paths) = paths else {
            log::warn!("no config directory available, using default settings");
            return Self::default();
        };
        match Self::load_from(&paths.config_file()) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("{err:#}; using default settings");
                Self::default()
            }
        }
    }
}
