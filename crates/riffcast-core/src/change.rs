//! Write-counter change detection.

use crate::exchange::ExchangeRecord;

/// Decides whether a freshly read record carries new data.
///
/// The producer bumps its write counter on every publish. Starting from
/// `None` rather than a counter value means the first record read after
/// binding always counts as a change, even when the producer's counter is
/// still at 0.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last_counter: Option<u32>,
}

impl ChangeDetector {
    /// Create a detector that has not seen any record yet
    pub fn new() -> Self {
        Self { last_counter: None }
    }

    /// True iff the record's counter differs from the last committed one.
    ///
    /// Does not update state; call [`commit`](Self::commit) once the change
    /// has been processed.
    pub fn should_emit(&self, record: &ExchangeRecord) -> bool {
        self.last_counter != Some(record.write_counter)
    }

    /// Record `record` as processed
    pub fn commit(&mut self, record: &ExchangeRecord) {
        self.last_counter = Some(record.write_counter);
    }

    /// Check and commit in one step
    pub fn observe(&mut self, record: &ExchangeRecord) -> bool {
        let changed = self.should_emit(record);
        if changed {
            self.commit(record);
        }
        changed
    }

    /// Last committed counter, `None` before the first change
    pub fn last_counter(&self) -> Option<u32> {
        self.last_counter
    }

    /// Forget the committed counter so the next read emits again
    pub fn reset(&mut self) {
        self.last_counter = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(counter: u32) -> ExchangeRecord {
        ExchangeRecord {
            write_counter: counter,
            ..Default::default()
        }
    }

    #[test]
    fn test_counter_sequence_emits_on_changes() {
        let mut detector = ChangeDetector::new();
        let emitted: Vec<usize> = [5, 5, 6, 6, 7]
            .iter()
            .enumerate()
            .filter(|(_, c)| detector.observe(&record(**c)))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(emitted, vec![0, 2, 4]);
        assert_eq!(detector.last_counter(), Some(7));
    }

    #[test]
    fn test_first_zero_counter_is_not_dropped() {
        let mut detector = ChangeDetector::new();
        assert!(detector.observe(&record(0)));
        assert!(!detector.observe(&record(0)));
    }

    #[test]
    fn test_should_emit_does_not_commit() {
        let mut detector = ChangeDetector::new();
        let r = record(3);
        assert!(detector.should_emit(&r));
        assert!(detector.should_emit(&r));
        assert_eq!(detector.last_counter(), None);

        detector.commit(&r);
        assert!(!detector.should_emit(&r));
    }

    #[test]
    fn test_counter_wraparound_is_a_change() {
        let mut detector = ChangeDetector::new();
        detector.commit(&record(u32::MAX));
        assert!(detector.should_emit(&record(0)));
    }

    #[test]
    fn test_reset() {
        let mut detector = ChangeDetector::new();
        detector.commit(&record(9));
        detector.reset();
        assert!(detector.should_emit(&record(9)));
    }
}
