//! Riffcast I/O - Shared Memory, Polling and Files
//!
//! Operating-system facing side of riffcast:
//! - Read-only mapping of the producer's exchange segment
//! - The poll loop that turns record changes into rendered text
//! - Text file sinks
//! - Config file loading (JSON or RON)

#![warn(missing_docs)]

pub mod channel;
pub mod config_file;
pub mod error;
pub mod poller;
pub mod shm;
pub mod sink;

pub use channel::{ExchangeChannel, ExchangeSource, Snapshot};
#[cfg(any(test, feature = "test-util"))]
pub use channel::MemoryExchange;
pub use config_file::{load_config, save_config, DEFAULT_CONFIG_FILE, MAX_CONFIG_FILE_SIZE};
pub use error::{IoError, Result};
pub use poller::{ChangeBatch, Poller, SETTLE_ATTEMPTS};
pub use shm::SharedMemory;
pub use sink::FileSink;
