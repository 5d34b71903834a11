//! Renderer configuration.

use serde::{Deserialize, Serialize};

/// Chart appearance.
///
/// `width` and `height` size a single panel; multi-panel charts grow the
/// document to fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Panel width in pixels
    pub width: u32,

    /// Panel height in pixels
    pub height: u32,

    /// Tick label font size in pixels; titles are drawn slightly larger
    pub tick_font_size: u32,

    /// CSS font family for all text
    pub font_family: String,

    /// Stroke for the main series
    pub primary_color: String,

    /// Stroke for alternating fundamental panels
    pub secondary_color: String,

    /// Stroke for horizontal guide lines
    pub guide_color: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            tick_font_size: 14,
            font_family: "YouYuan, Microsoft YaHei, sans-serif".to_string(),
            primary_color: "#d62728".to_string(),
            secondary_color: "#1f77b4".to_string(),
            guide_color: "#1f77b4".to_string(),
        }
    }
}

impl RendererConfig {
    /// Defaults for valuation charts, with larger tick labels.
    #[must_use]
    pub fn for_valuation() -> Self {
        Self {
            tick_font_size: 16,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.tick_font_size, 14);
        assert_eq!(RendererConfig::for_valuation().tick_font_size, 16);
        assert_eq!(RendererConfig::for_valuation().width, config.width);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: RendererConfig =
            serde_json::from_str(r#"{"width": 640, "primary_color": "black"}"#).unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.primary_color, "black");
        assert_eq!(config.height, 600);
    }
}
