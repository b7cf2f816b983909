//! Client rendering settings
//!
//! Serializable feature toggles consulted by the pipeline each frame.
//! Loaded from RON so hosts can ship them alongside other config files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading render settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File could not be read
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// File contents were not valid RON
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Rendering feature toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Render window objects at all
    pub render_windows: bool,
    /// Render mirrored interior window panes
    pub inner_windows: bool,
    /// Render lit textures at full brightness, ignoring world light
    pub bright_lights: bool,
    /// Use additive brightness blending for beams and emissive overlays
    pub blended_lights: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            render_windows: true,
            inner_windows: true,
            bright_lights: true,
            blended_lights: true,
        }
    }
}

impl RenderSettings {
    /// Load settings from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded render settings from {:?}", path.as_ref());
        Ok(ron::from_str(&contents)?)
    }
}
