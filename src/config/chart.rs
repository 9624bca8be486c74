//! Chart rendering configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Chart rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Image width in pixels (both panels together)
    #[serde(default = "default_width")]
    pub width: u32,
    /// Image height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// TrueType font used for titles and labels.
    /// When unset, a few common system locations are probed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
    /// Maximum bars drawn per panel (0 = no limit)
    #[serde(default = "default_max_categories")]
    pub max_categories: usize,
    /// Upper bound for a single render
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,
}

fn default_width() -> u32 {
    1400
}

fn default_height() -> u32 {
    600
}

fn default_max_categories() -> usize {
    30
}

fn default_render_timeout() -> u64 {
    30
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            font_path: None,
            max_categories: default_max_categories(),
            render_timeout_secs: default_render_timeout(),
        }
    }
}
