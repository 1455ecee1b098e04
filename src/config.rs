//! Session configuration.
//!
//! Every field has a default so a partial JSON document (or `{}`) is a valid
//! config. The browser host persists overrides in `localStorage`; the CLI reads
//! them from a file.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_LOGGER: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiConfig {
    /// Enables the `dev_*` logger entry points.
    #[serde(default)]
    pub dev_mode: bool,
    #[serde(default = "default_logger_name")]
    pub default_logger: String,
    #[serde(default)]
    pub logger: LoggerConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,
    #[serde(default = "default_log_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// Device pixels per CSS pixel; every panel dimension is scaled by it.
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
    /// Panel width in CSS pixels.
    #[serde(default = "default_panel_width")]
    pub width: u32,
    #[serde(default = "default_panel_height")]
    pub height: u32,
    /// Window over which the fps and memory panels aggregate.
    #[serde(default = "default_sample_window_ms")]
    pub sample_window_ms: f64,
    #[serde(default)]
    pub render_mode: RenderMode,
}

/// How a stats panel advances its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Copy the existing bitmap one column left and paint the new column.
    #[default]
    ScrollBlit,
    /// Repaint every column from the sample history.
    Redraw,
}

fn default_logger_name() -> String {
    DEFAULT_LOGGER.to_string()
}

fn default_log_capacity() -> usize {
    1000
}

fn default_log_page_size() -> usize {
    200
}

fn default_history_len() -> usize {
    500
}

fn default_pixel_ratio() -> f64 {
    1.0
}

fn default_panel_width() -> u32 {
    90
}

fn default_panel_height() -> u32 {
    48
}

fn default_sample_window_ms() -> f64 {
    1000.0
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            default_logger: default_logger_name(),
            logger: LoggerConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
            page_size: default_log_page_size(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            history_len: default_history_len(),
            pixel_ratio: default_pixel_ratio(),
            width: default_panel_width(),
            height: default_panel_height(),
            sample_window_ms: default_sample_window_ms(),
            render_mode: RenderMode::default(),
        }
    }
}

impl GuiConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut cfg: GuiConfig = serde_json::from_str(raw)?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace values that would break buffer or geometry invariants.
    fn sanitize(&mut self) {
        let d = GuiConfig::default();
        if self.logger.capacity == 0 {
            self.logger.capacity = d.logger.capacity;
        }
        if self.logger.page_size == 0 {
            self.logger.page_size = d.logger.page_size;
        }
        if self.stats.history_len == 0 {
            self.stats.history_len = d.stats.history_len;
        }
        if !(self.stats.pixel_ratio.is_finite() && self.stats.pixel_ratio > 0.0) {
            self.stats.pixel_ratio = d.stats.pixel_ratio;
        }
        if !(self.stats.sample_window_ms.is_finite() && self.stats.sample_window_ms > 0.0) {
            self.stats.sample_window_ms = d.stats.sample_window_ms;
        }
        if self.default_logger.trim().is_empty() {
            self.default_logger = d.default_logger;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = GuiConfig::from_json("{}").unwrap();
        assert_eq!(cfg, GuiConfig::default());
        assert_eq!(cfg.logger.capacity, 1000);
        assert_eq!(cfg.logger.page_size, 200);
        assert_eq!(cfg.stats.history_len, 500);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = GuiConfig::from_json(r#"{"dev_mode":true,"stats":{"render_mode":"redraw"}}"#)
            .unwrap();
        assert!(cfg.dev_mode);
        assert_eq!(cfg.stats.render_mode, RenderMode::Redraw);
        assert_eq!(cfg.stats.width, 90);
    }

    #[test]
    fn degenerate_values_are_replaced() {
        let cfg =
            GuiConfig::from_json(r#"{"logger":{"capacity":0},"stats":{"pixel_ratio":-2}}"#)
                .unwrap();
        assert_eq!(cfg.logger.capacity, 1000);
        assert_eq!(cfg.stats.pixel_ratio, 1.0);
    }

    #[test]
    fn round_trips_through_json() {
        let mut cfg = GuiConfig::default();
        cfg.default_logger = "physics".into();
        let raw = cfg.to_json().unwrap();
        assert_eq!(GuiConfig::from_json(&raw).unwrap(), cfg);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(GuiConfig::from_json("{dev_mode:").is_err());
    }
}
