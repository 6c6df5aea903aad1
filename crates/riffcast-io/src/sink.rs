//! Text file sinks.
//!
//! Each output line may name a file that receives its rendered text on every
//! change event, so other tools (streaming software, bots) can pick it up.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Overwrites one file with the latest text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Sink writing to `path`; nothing is touched until the first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Replace the file contents with `text`
    pub fn write(&self, text: &str) -> Result<()> {
        std::fs::write(&self.path, text)?;
        trace!("Wrote {} bytes to {}", text.len(), self.path.display());
        Ok(())
    }

    /// Target path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path().join("jam.txt"));

        sink.write("Nightglow @ 120.5bpm").unwrap();
        sink.write("Dawn").unwrap();
        assert_eq!(std::fs::read_to_string(sink.path()).unwrap(), "Dawn");
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path().join("nope").join("jam.txt"));
        assert!(sink.write("x").is_err());
    }
}
