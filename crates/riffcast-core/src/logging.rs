//! Logging configuration
//!
//! Settings only; the subscriber itself is installed by the binary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level: trace, debug, info, warn, error or off
    pub level: String,
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Log file name prefix
    pub file_prefix: String,
    /// Write to stderr
    pub console_output: bool,
    /// Write to a file in `log_dir`
    pub file_output: bool,
    /// Number of log files kept in `log_dir`, 0 keeps everything
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            file_prefix: "riffcast".to_string(),
            console_output: true,
            file_output: false,
            max_files: 10,
        }
    }
}

impl LogConfig {
    /// Parse `level`, falling back to INFO
    pub fn parse_level(&self) -> LevelFilter {
        self.level.trim().parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create `log_dir` if needed
    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.log_dir)
    }

    /// Log file for today's session
    pub fn current_log_path(&self) -> PathBuf {
        let date = chrono::Local::now().format("%Y-%m-%d");
        self.log_dir
            .join(format!("{}-{}.log", self.file_prefix, date))
    }

    /// Delete the oldest log files so at most `max_files` remain.
    ///
    /// Returns the number of files removed.
    pub fn cleanup_old_logs(&self) -> std::io::Result<usize> {
        if self.max_files == 0 || !self.log_dir.exists() {
            return Ok(0);
        }

        let prefix = format!("{}-", self.file_prefix);
        let mut logs: Vec<PathBuf> = std::fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".log"))
            })
            .collect();

        if logs.len() <= self.max_files {
            return Ok(0);
        }

        // date-stamped names sort chronologically
        logs.sort();
        let excess = logs.len() - self.max_files;
        for path in &logs[..excess] {
            std::fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.parse_level(), LevelFilter::INFO);

        config.level = "debug".to_string();
        assert_eq!(config.parse_level(), LevelFilter::DEBUG);

        config.level = "loud".to_string();
        assert_eq!(config.parse_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_current_log_path_uses_prefix() {
        let config = LogConfig::default();
        let path = config.current_log_path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("riffcast-"));
        assert!(name.ends_with(".log"));
        assert!(path.starts_with("logs"));
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            log_dir: dir.path().to_path_buf(),
            max_files: 2,
            ..Default::default()
        };
        for day in ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"] {
            std::fs::write(dir.path().join(format!("riffcast-{}.log", day)), "x").unwrap();
        }
        std::fs::write(dir.path().join("unrelated.txt"), "x").unwrap();

        assert_eq!(config.cleanup_old_logs().unwrap(), 2);
        assert!(!dir.path().join("riffcast-2024-01-01.log").exists());
        assert!(!dir.path().join("riffcast-2024-01-02.log").exists());
        assert!(dir.path().join("riffcast-2024-01-04.log").exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let config = LogConfig {
            log_dir: PathBuf::from("/definitely/not/here"),
            ..Default::default()
        };
        assert_eq!(config.cleanup_old_logs().unwrap(), 0);
    }
}
