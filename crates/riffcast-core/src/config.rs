//! Overlay configuration
//!
//! One [`OverlayConfig`] describes the global font, the ordered list of
//! output lines and the runtime knobs. Keys are snake_case; the PascalCase
//! names used by existing producer-side config files are accepted as aliases.

use crate::colour::{Rgba, DEFAULT_LINE_COLOUR};
use crate::error::ConfigError;
use crate::exchange::SEGMENT_NAME;
use crate::logging::LogConfig;
use crate::template::unknown_tokens;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Default exchange poll interval
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
/// Default presentation tick interval
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 20;

fn default_font_face() -> String {
    "Segoe UI".to_string()
}

fn default_font_size() -> f32 {
    24.0
}

fn default_hex_colour() -> String {
    DEFAULT_LINE_COLOUR.to_string()
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_tick_interval() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_segment_name() -> String {
    SEGMENT_NAME.to_string()
}

/// Resolved font for one output line
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Font family
    pub face: String,
    /// Size in points
    pub size: f32,
    /// Bold weight
    pub bold: bool,
}

/// One output line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputLineConfig {
    /// Template with `%token%` placeholders
    #[serde(alias = "Formatting")]
    pub formatting: String,

    /// Line colour as `#RRGGBB`
    #[serde(default = "default_hex_colour", alias = "HexColour")]
    pub hex_colour: String,

    /// File overwritten with the rendered text on every change
    #[serde(default, alias = "FileTarget", skip_serializing_if = "Option::is_none")]
    pub file_target: Option<PathBuf>,

    /// Font family override
    #[serde(default, alias = "FontFace", skip_serializing_if = "Option::is_none")]
    pub font_face: Option<String>,

    /// Font size override, ignored unless positive
    #[serde(default, alias = "FontSize", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,

    /// Bold override
    #[serde(default, alias = "FontBold", skip_serializing_if = "Option::is_none")]
    pub font_bold: Option<bool>,

    /// Gap above this line
    #[serde(default, alias = "PaddingTop")]
    pub padding_top: u32,
}

impl OutputLineConfig {
    /// Line with the default colour and no overrides
    pub fn new(formatting: impl Into<String>) -> Self {
        Self {
            formatting: formatting.into(),
            hex_colour: default_hex_colour(),
            file_target: None,
            font_face: None,
            font_size: None,
            font_bold: None,
            padding_top: 0,
        }
    }

    /// Parsed colour; a blank value means the default colour
    pub fn colour(&self) -> Option<Rgba> {
        if self.hex_colour.trim().is_empty() {
            return Some(Rgba::default());
        }
        Rgba::from_hex(&self.hex_colour)
    }

    /// Sink path, if one is set and not blank
    pub fn target_path(&self) -> Option<&Path> {
        self.file_target
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

/// Whole overlay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Global font family
    #[serde(default = "default_font_face", alias = "FontFace")]
    pub font_face: String,

    /// Global font size in points
    #[serde(default = "default_font_size", alias = "FontSize")]
    pub font_size: f32,

    /// Global bold weight
    #[serde(default, alias = "FontBold")]
    pub font_bold: bool,

    /// Output lines in display order
    #[serde(default, alias = "Configs")]
    pub configs: Vec<OutputLineConfig>,

    /// Logging settings
    #[serde(default, alias = "Log")]
    pub log: LogConfig,

    /// How often the exchange segment is read
    #[serde(default = "default_poll_interval", alias = "PollIntervalMs")]
    pub poll_interval_ms: u64,

    /// How often presentation lines advance
    #[serde(default = "default_tick_interval", alias = "TickIntervalMs")]
    pub tick_interval_ms: u64,

    /// Shared segment to bind
    #[serde(default = "default_segment_name", alias = "SegmentName")]
    pub segment_name: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_face: default_font_face(),
            font_size: default_font_size(),
            font_bold: false,
            configs: Vec::new(),
            log: LogConfig::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            segment_name: default_segment_name(),
        }
    }
}

impl OverlayConfig {
    /// Check the configuration before it is used.
    ///
    /// Unknown placeholders are not errors; they are logged so typos show up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.configs.is_empty() {
            return Err(ConfigError::NoOutputLines);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval("poll_interval_ms"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval("tick_interval_ms"));
        }
        if self.segment_name.trim().is_empty() {
            return Err(ConfigError::EmptySegmentName);
        }

        for (index, line) in self.configs.iter().enumerate() {
            if line.colour().is_none() {
                return Err(ConfigError::InvalidColour {
                    line: index,
                    value: line.hex_colour.clone(),
                });
            }
            for token in unknown_tokens(&line.formatting) {
                warn!("Output line {}: unknown token %{}%", index, token);
            }
        }

        Ok(())
    }

    /// Font for line `index`, falling back to the global font
    pub fn line_font(&self, index: usize) -> FontSpec {
        let line = self.configs.get(index);

        let face = line
            .and_then(|l| l.font_face.as_deref())
            .filter(|face| !face.trim().is_empty())
            .unwrap_or(&self.font_face)
            .to_string();
        let size = line
            .and_then(|l| l.font_size)
            .filter(|size| *size > 0.0)
            .unwrap_or(self.font_size);
        let bold = line.and_then(|l| l.font_bold).unwrap_or(self.font_bold);

        FontSpec { face, size, bold }
    }

    /// Colours per line in display order, invalid entries replaced by the default
    pub fn line_colours(&self) -> Vec<Rgba> {
        self.configs
            .iter()
            .map(|line| line.colour().unwrap_or_default())
            .collect()
    }

    /// Exchange poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Presentation tick interval
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lines() -> OverlayConfig {
        OverlayConfig {
            configs: vec![
                OutputLineConfig::new("%jamName%"),
                OutputLineConfig {
                    hex_colour: "#FF0000".to_string(),
                    font_face: Some("Consolas".to_string()),
                    font_size: Some(0.0),
                    font_bold: Some(true),
                    ..OutputLineConfig::new("%riffBPM%")
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = OverlayConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
        assert_eq!(config.segment_name, "Ouroveon_EXCH");
        assert_eq!(OutputLineConfig::new("x").hex_colour, "#EEEEEE");
    }

    #[test]
    fn test_validate_ok() {
        assert!(two_lines().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_configs() {
        assert_eq!(
            OverlayConfig::default().validate(),
            Err(ConfigError::NoOutputLines)
        );
    }

    #[test]
    fn test_validate_rejects_bad_colour() {
        let mut config = two_lines();
        config.configs[1].hex_colour = "red".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidColour {
                line: 1,
                value: "red".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = two_lines();
        config.tick_interval_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidInterval("tick_interval_ms"))
        );
    }

    #[test]
    fn test_blank_colour_means_default() {
        let mut line = OutputLineConfig::new("x");
        line.hex_colour = String::new();
        assert_eq!(line.colour(), Some(Rgba::default()));
    }

    #[test]
    fn test_line_font_fallback() {
        let config = two_lines();

        let first = config.line_font(0);
        assert_eq!(first.face, "Segoe UI");
        assert_eq!(first.size, 24.0);
        assert!(!first.bold);

        // zero size is not an override
        let second = config.line_font(1);
        assert_eq!(second.face, "Consolas");
        assert_eq!(second.size, 24.0);
        assert!(second.bold);
    }

    #[test]
    fn test_blank_file_target_is_none() {
        let mut line = OutputLineConfig::new("x");
        line.file_target = Some(PathBuf::new());
        assert!(line.target_path().is_none());
        line.file_target = Some(PathBuf::from("now_playing.txt"));
        assert_eq!(line.target_path(), Some(Path::new("now_playing.txt")));
    }

    #[test]
    fn test_pascal_case_keys() {
        let json = r##"{
            "FontFace": "Bahnschrift",
            "FontSize": 32.0,
            "FontBold": true,
            "Configs": [
                { "Formatting": "%jamName%", "HexColour": "#00FF00", "FileTarget": "jam.txt", "PaddingTop": 6 },
                { "Formatting": "%riffBPM% bpm", "FontSize": 18.0 }
            ]
        }"##;
        let config: OverlayConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.font_face, "Bahnschrift");
        assert!(config.font_bold);
        assert_eq!(config.configs.len(), 2);
        assert_eq!(config.configs[0].padding_top, 6);
        assert_eq!(config.configs[0].target_path(), Some(Path::new("jam.txt")));
        assert_eq!(config.configs[1].hex_colour, "#EEEEEE");
        assert_eq!(config.line_font(1).size, 18.0);
        assert_eq!(config.poll_interval_ms, 250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_formatting_is_rejected() {
        let json = r##"{ "configs": [ { "hex_colour": "#FFFFFF" } ] }"##;
        assert!(serde_json::from_str::<OverlayConfig>(json).is_err());
    }
}
