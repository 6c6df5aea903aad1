//! Presentation side of the overlay.
//!
//! [`Overlay`] owns every [`PresentationLine`] and file sink. It is driven
//! from the main thread only: change batches come in over the channel, ticks
//! advance the fades, and the front-end reads [`Overlay::views`].

use crossbeam_channel::Receiver;
use riffcast_core::{LineView, OverlayConfig, PresentationLine};
use riffcast_io::{ChangeBatch, FileSink};
use tracing::{debug, warn};

/// Shown while no producer segment is bound
pub const WAITING_TEXT: &str = "waiting for producer...";

/// Lines, sinks and the receiving end of the change channel
pub struct Overlay {
    lines: Vec<PresentationLine>,
    sinks: Vec<Option<FileSink>>,
    changes: Receiver<ChangeBatch>,
    bound: bool,
    last_counter: Option<u32>,
}

impl Overlay {
    /// One line per configured output, in configuration order
    pub fn new(config: &OverlayConfig, changes: Receiver<ChangeBatch>, bound: bool) -> Self {
        let lines = config
            .line_colours()
            .into_iter()
            .map(PresentationLine::new)
            .collect();
        let sinks = config
            .configs
            .iter()
            .map(|line| line.target_path().map(FileSink::new))
            .collect();

        Self {
            lines,
            sinks,
            changes,
            bound,
            last_counter: None,
        }
    }

    /// Apply every batch waiting on the channel; returns how many were applied
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(batch) = self.changes.try_recv() {
            self.apply(batch);
            applied += 1;
        }
        applied
    }

    /// Write sinks and queue text for one change event.
    ///
    /// Sinks are rewritten on every event, even when their text is unchanged.
    pub fn apply(&mut self, batch: ChangeBatch) {
        debug!("Applying change batch {}", batch.write_counter);
        self.last_counter = Some(batch.write_counter);

        for (index, text) in batch.lines.into_iter().enumerate() {
            if let Some(Some(sink)) = self.sinks.get(index) {
                if let Err(e) = sink.write(&text) {
                    warn!("Failed to write {}: {}", sink.path().display(), e);
                }
            }
            if let Some(line) = self.lines.get_mut(index) {
                line.enqueue(text);
            }
        }
    }

    /// Advance every line by `delta_seconds`
    pub fn tick(&mut self, delta_seconds: f32) {
        for line in &mut self.lines {
            line.advance(delta_seconds);
        }
    }

    /// What to draw, in line order
    pub fn views(&self) -> Vec<LineView<'_>> {
        self.lines.iter().map(PresentationLine::view).collect()
    }

    /// True when no segment was bound, so nothing will ever arrive
    pub fn is_waiting(&self) -> bool {
        !self.bound
    }

    /// Counter of the last applied batch
    pub fn last_counter(&self) -> Option<u32> {
        self.last_counter
    }

    /// Lines in configuration order
    pub fn lines(&self) -> &[PresentationLine] {
        &self.lines
    }
}
