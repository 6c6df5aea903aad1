//! Exchange channel
//!
//! Binds the producer's shared segment and copies snapshots out of it. No
//! lock is shared with the producer, so a copy may be torn;
//! [`ExchangeSource::read_settled`] re-reads until two copies agree.

use crate::error::Result;
use crate::shm::SharedMemory;
use riffcast_core::RECORD_SIZE;
use tracing::{debug, info};

#[cfg(any(test, feature = "test-util"))]
use parking_lot::Mutex;
#[cfg(any(test, feature = "test-util"))]
use riffcast_core::RawExchange;
#[cfg(any(test, feature = "test-util"))]
use std::sync::Arc;

/// One raw copy of the exchange record
pub type Snapshot = [u8; RECORD_SIZE];

/// Where the poller gets exchange snapshots from
pub trait ExchangeSource: Send {
    /// True while a segment is mapped
    fn is_bound(&self) -> bool;

    /// Copy the current record; `None` when unbound. Never blocks.
    fn read(&mut self) -> Option<Snapshot>;

    /// Copy until two consecutive snapshots are identical.
    ///
    /// Gives up after `attempts` copies and returns the last one.
    fn read_settled(&mut self, attempts: usize) -> Option<Snapshot> {
        let mut last = self.read()?;
        if attempts <= 1 {
            return Some(last);
        }
        for _ in 1..attempts {
            let next = self.read()?;
            if next == last {
                return Some(next);
            }
            last = next;
        }
        debug!("Exchange snapshot still changing after {} copies", attempts);
        Some(last)
    }
}

/// Read-only handle on the producer's exchange segment
#[derive(Debug)]
pub struct ExchangeChannel {
    name: String,
    memory: Option<SharedMemory>,
}

impl ExchangeChannel {
    /// Map segment `name`.
    ///
    /// `NotFound` means the producer is not running.
    pub fn bind(name: &str) -> Result<Self> {
        let memory = SharedMemory::open_read_only(name, RECORD_SIZE)?;
        info!("Bound exchange segment {} ({} bytes)", name, memory.len());
        Ok(Self {
            name: name.to_string(),
            memory: Some(memory),
        })
    }

    /// Handle that never maps anything; reads return `None`
    pub fn unbound(name: &str) -> Self {
        Self {
            name: name.to_string(),
            memory: None,
        }
    }

    /// Release the mapping. Safe to call more than once.
    pub fn unbind(&mut self) {
        if let Some(memory) = self.memory.take() {
            drop(memory);
            info!("Unbound exchange segment {}", self.name);
        }
    }

    /// Segment name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ExchangeSource for ExchangeChannel {
    fn is_bound(&self) -> bool {
        self.memory.is_some()
    }

    fn read(&mut self) -> Option<Snapshot> {
        let memory = self.memory.as_ref()?;
        let mut snapshot = [0u8; RECORD_SIZE];
        memory.copy_into(&mut snapshot);
        Some(snapshot)
    }
}

impl Drop for ExchangeChannel {
    fn drop(&mut self) {
        self.unbind();
    }
}

/// In-process exchange used to drive the poller without a producer.
///
/// Clones share the same record, so a test can keep one clone and publish
/// while the poller owns another.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Default)]
pub struct MemoryExchange {
    record: Arc<Mutex<Option<Snapshot>>>,
}

#[cfg(any(test, feature = "test-util"))]
impl MemoryExchange {
    /// Unbound until something is published
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current record
    pub fn publish(&self, raw: &RawExchange) {
        let mut snapshot = [0u8; RECORD_SIZE];
        snapshot.copy_from_slice(raw.as_bytes());
        *self.record.lock() = Some(snapshot);
    }

    /// Drop the record so the source reads as unbound
    pub fn clear(&self) {
        *self.record.lock() = None;
    }
}

#[cfg(any(test, feature = "test-util"))]
impl ExchangeSource for MemoryExchange {
    fn is_bound(&self) -> bool {
        self.record.lock().is_some()
    }

    fn read(&mut self) -> Option<Snapshot> {
        *self.record.lock()
    }
}
