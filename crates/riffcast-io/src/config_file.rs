//! Loading and saving the overlay configuration.
//!
//! The format follows the file extension: `.json` (also the fallback for
//! files without one) or `.ron`. Loaded configs are validated before use.

use crate::error::{IoError, Result};
use riffcast_core::OverlayConfig;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Maximum accepted config file size (1 MB)
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

fn extension(path: &Path) -> &str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("json")
}

/// Load and validate a config file
pub fn load_config(path: &Path) -> Result<OverlayConfig> {
    load_config_with_limit(path, MAX_CONFIG_FILE_SIZE)
}

fn load_config_with_limit(path: &Path, limit: u64) -> Result<OverlayConfig> {
    let size = std::fs::metadata(path)?.len();
    if size > limit {
        return Err(IoError::FileTooLarge { size, limit });
    }

    let mut content = String::new();
    let config: OverlayConfig = match extension(path) {
        "json" => {
            File::open(path)?.read_to_string(&mut content)?;
            serde_json::from_str(&content)?
        }
        "ron" => {
            File::open(path)?.read_to_string(&mut content)?;
            ron::from_str(&content)?
        }
        other => return Err(IoError::UnsupportedFormat(other.to_string())),
    };

    config.validate()?;
    info!(
        "Loaded config {} ({} output lines)",
        path.display(),
        config.configs.len()
    );
    Ok(config)
}

/// Write `config` in the format implied by `path`
pub fn save_config(config: &OverlayConfig, path: &Path) -> Result<()> {
    match extension(path) {
        "json" => {
            let file = File::create(path)?;
            serde_json::to_writer_pretty(file, config)?;
        }
        "ron" => {
            let s = ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::default())?;
            File::create(path)?.write_all(s.as_bytes())?;
        }
        other => return Err(IoError::UnsupportedFormat(other.to_string())),
    }
    Ok(())
}
