//! Exchange poll loop.
//!
//! Runs on its own thread: read, decode, detect a change, derive tokens and
//! render every template. Only finished text leaves the thread, as a
//! [`ChangeBatch`] on a crossbeam channel. The loop never touches files or
//! presentation state.

use crate::channel::ExchangeSource;
use crossbeam_channel::Sender;
use riffcast_core::{decode, render_lines, ChangeDetector, DecodeError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, trace};

/// Snapshot copies per tick when checking for a torn read
pub const SETTLE_ATTEMPTS: usize = 3;

/// Name of the poll thread
pub const POLL_THREAD_NAME: &str = "riffcast-poll";

/// Rendered text for every line after one change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch {
    /// Producer counter that triggered the batch
    pub write_counter: u32,
    /// One rendered string per configured line, in configuration order
    pub lines: Vec<String>,
}

/// Polls an [`ExchangeSource`] and turns changes into [`ChangeBatch`]es
pub struct Poller<S: ExchangeSource> {
    source: S,
    templates: Vec<String>,
    detector: ChangeDetector,
    interval: Duration,
}

impl<S: ExchangeSource + 'static> Poller<S> {
    /// Create a poller for the given templates, in line order
    pub fn new(source: S, templates: Vec<String>, interval: Duration) -> Self {
        Self {
            source,
            templates,
            detector: ChangeDetector::new(),
            interval,
        }
    }

    /// One tick.
    ///
    /// `Ok(None)` when unbound or nothing changed. A decode error leaves the
    /// detector untouched.
    pub fn poll_once(&mut self) -> Result<Option<ChangeBatch>, DecodeError> {
        let Some(snapshot) = self.source.read_settled(SETTLE_ATTEMPTS) else {
            trace!("Exchange unbound, nothing to read");
            return Ok(None);
        };

        let record = decode(&snapshot)?;
        if !self.detector.should_emit(&record) {
            return Ok(None);
        }

        let lines = render_lines(&record, self.templates.iter().map(String::as_str));
        self.detector.commit(&record);

        debug!(
            "Exchange change: counter {} ({})",
            record.write_counter, record.jam_name
        );
        Ok(Some(ChangeBatch {
            write_counter: record.write_counter,
            lines,
        }))
    }

    /// Run until `stop` is set, the receiver goes away or decoding fails.
    ///
    /// The source, and with it any mapping, is dropped when the loop ends.
    pub fn run(mut self, tx: Sender<ChangeBatch>, stop: Arc<AtomicBool>) -> Result<(), DecodeError> {
        info!(
            "Exchange poller started ({} lines, every {:?})",
            self.templates.len(),
            self.interval
        );

        while !stop.load(Ordering::Relaxed) {
            match self.poll_once() {
                Ok(Some(batch)) => {
                    if tx.send(batch).is_err() {
                        debug!("Change receiver dropped, stopping poller");
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Exchange record rejected, stopping poller: {}", e);
                    return Err(e);
                }
            }
            thread::sleep(self.interval);
        }

        info!("Exchange poller stopped");
        Ok(())
    }

    /// Run the loop on a named thread
    pub fn spawn(
        self,
        tx: Sender<ChangeBatch>,
        stop: Arc<AtomicBool>,
    ) -> std::io::Result<JoinHandle<Result<(), DecodeError>>> {
        thread::Builder::new()
            .name(POLL_THREAD_NAME.to_string())
            .spawn(move || self.run(tx, stop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MemoryExchange;
    use bytemuck::Zeroable;
    use riffcast_core::RawExchange;

    fn raw(counter: u32, jam: &str) -> RawExchange {
        let mut raw = RawExchange::zeroed();
        raw.data_flags = 1;
        raw.data_write_counter = counter;
        raw.set_jam_name(jam);
        raw.riff_bpm = 120.5;
        raw
    }

    fn poller(source: MemoryExchange) -> Poller<MemoryExchange> {
        Poller::new(
            source,
            vec!["%jamName%".to_string(), "%riffBPM%".to_string()],
            Duration::from_millis(1),
        )
    }

    #[test]
    fn test_unbound_source_emits_nothing() {
        let mut poller = poller(MemoryExchange::new());
        assert_eq!(poller.poll_once(), Ok(None));
    }

    #[test]
    fn test_first_read_always_emits() {
        let exchange = MemoryExchange::new();
        exchange.publish(&raw(0, "Nightglow"));
        let mut poller = poller(exchange);

        let batch = poller.poll_once().unwrap().unwrap();
        assert_eq!(batch.write_counter, 0);
        assert_eq!(batch.lines, vec!["Nightglow", "120.5"]);
        assert_eq!(poller.poll_once(), Ok(None));
    }

    #[test]
    fn test_counter_sequence() {
        let exchange = MemoryExchange::new();
        let mut poller = poller(exchange.clone());

        let emitted: Vec<bool> = [5, 5, 6, 6, 7]
            .into_iter()
            .map(|counter| {
                exchange.publish(&raw(counter, "Nightglow"));
                poller.poll_once().unwrap().is_some()
            })
            .collect();
        assert_eq!(emitted, vec![true, false, true, false, true]);
    }

    #[test]
    fn test_decode_error_is_not_committed() {
        let exchange = MemoryExchange::new();
        let mut bad = raw(4, "Nightglow");
        bad.riff_root = 40;
        exchange.publish(&bad);
        let mut poller = poller(exchange.clone());

        assert_eq!(poller.poll_once(), Err(DecodeError::RootOutOfRange(40)));

        exchange.publish(&raw(4, "Nightglow"));
        assert!(poller.poll_once().unwrap().is_some());
    }

    #[test]
    fn test_thread_stops_on_flag() {
        let exchange = MemoryExchange::new();
        exchange.publish(&raw(1, "Nightglow"));
        let (tx, rx) = crossbeam_channel::unbounded();
        let stop = Arc::new(AtomicBool::new(false));

        let handle = poller(exchange.clone()).spawn(tx, stop.clone()).unwrap();
        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.lines[0], "Nightglow");

        exchange.publish(&raw(2, "Dawnline"));
        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(second.write_counter, 2);

        stop.store(true, Ordering::Relaxed);
        assert_eq!(handle.join().unwrap(), Ok(()));
    }

    #[test]
    fn test_thread_returns_decode_error() {
        let exchange = MemoryExchange::new();
        let mut bad = raw(1, "Nightglow");
        bad.riff_scale = 18;
        exchange.publish(&bad);
        let (tx, rx) = crossbeam_channel::unbounded();

        let handle = poller(exchange)
            .spawn(tx, Arc::new(AtomicBool::new(false)))
            .unwrap();
        assert_eq!(handle.join().unwrap(), Err(DecodeError::ScaleOutOfRange(18)));
        assert!(rx.try_recv().is_err());
    }
}
