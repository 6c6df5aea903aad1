//! Musical key tables shared with the producer.
//!
//! The producer publishes root and scale as plain indices; these tables are
//! the only place they turn into names.

use crate::error::DecodeError;
use std::fmt;

/// Display names for every scale index the producer can publish
pub const SCALE_NAMES: [&str; 18] = [
    "Major (Ionian)",
    "Dorian",
    "Phrygian",
    "Lydian",
    "Mixolydian",
    "Minor (Aeolian)",
    "Locrian",
    "Minor Pentatonic",
    "Major Pentatonic",
    "Suspended Pent.",
    "Blues Minor Pent.",
    "Blues Major Pent.",
    "Harmonic Minor",
    "Melodic Minor",
    "Double Harmonic",
    "Blues",
    "Whole Tone",
    "Chromatic",
];

/// Display names for every root note index, flats preferred
pub const ROOT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

/// Root note of a riff, guaranteed to index [`ROOT_NAMES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Root(u8);

impl Root {
    /// Validate a raw root index
    pub fn from_index(index: u32) -> Result<Self, DecodeError> {
        if (index as usize) < ROOT_NAMES.len() {
            Ok(Self(index as u8))
        } else {
            Err(DecodeError::RootOutOfRange(index))
        }
    }

    /// Raw index as published by the producer
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// Note name, e.g. `"F#"`
    pub fn name(self) -> &'static str {
        ROOT_NAMES[self.0 as usize]
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scale of a riff, guaranteed to index [`SCALE_NAMES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Scale(u8);

impl Scale {
    /// Validate a raw scale index
    pub fn from_index(index: u32) -> Result<Self, DecodeError> {
        if (index as usize) < SCALE_NAMES.len() {
            Ok(Self(index as u8))
        } else {
            Err(DecodeError::ScaleOutOfRange(index))
        }
    }

    /// Raw index as published by the producer
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// Scale name, e.g. `"Dorian"`
    pub fn name(self) -> &'static str {
        SCALE_NAMES[self.0 as usize]
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
