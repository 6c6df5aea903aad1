//! Exchange record - the fixed binary block published by the jam producer
//!
//! The producer memcpy's a `#[repr(C)]` struct into a named shared memory
//! segment every time its state changes. [`RawExchange`] mirrors that struct
//! byte for byte; [`ExchangeRecord`] is the validated, owned view the rest of
//! the client works with.
//!
//! The layout is an unversioned contract: reordering or resizing a field on
//! either side breaks compatibility without any runtime signal other than
//! [`DecodeError`].

use crate::error::DecodeError;
use crate::music::{Root, Scale};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

/// Name of the shared memory segment the producer publishes into
pub const SEGMENT_NAME: &str = "Ouroveon_EXCH";

/// Name of the producer's write mutex.
///
/// Reserved by the wire contract. The read path never takes it.
pub const MUTEX_NAME: &str = "Global\\Mutex_Ouroveon_EXCH";

/// Size of one jam-name text buffer
pub const MAX_JAM_NAME: usize = 32;
/// Size of one jammer-name text buffer
pub const MAX_JAMMER_NAME: usize = 32;
/// Number of stems (and jammer slots) per riff
pub const STEM_COUNT: usize = 8;

/// Total size of the exchange record in bytes
pub const RECORD_SIZE: usize = 472;

bitflags! {
    /// Which groups of fields the producer considers valid
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DataFlags: u32 {
        /// Riff metadata (jam name, key, tempo, jammers)
        const RIFF = 1 << 0;
        /// Live playback values (beat segment, stem pulses)
        const PLAYBACK = 1 << 1;
        /// Output scope data
        const SCOPE = 1 << 2;
    }
}

/// Byte-exact mirror of the producer's exchange struct
#[repr(C)]
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct RawExchange {
    pub data_flags: u32,
    pub data_write_counter: u32,
    pub jam_name: [u8; MAX_JAM_NAME],
    pub riff_hash: u64,
    pub riff_timestamp: u64,
    pub riff_root: u32,
    pub riff_scale: u32,
    pub riff_bpm: f32,
    pub riff_beat_segment_count: u32,
    pub riff_beat_segment_active: u32,
    pub stem_pulse: [f32; STEM_COUNT],
    pub stem_energy: [f32; STEM_COUNT],
    pub stem_gain: [f32; STEM_COUNT],
    pub stem_colour: [u32; STEM_COUNT],
    pub consensus_beat: f32,
    pub riff_transition: f32,
    pub jammer_name_valid_bits: u32,
    pub jammer_names: [[u8; MAX_JAMMER_NAME]; STEM_COUNT],
}

const _: () = assert!(std::mem::size_of::<RawExchange>() == RECORD_SIZE);

impl RawExchange {
    /// View the struct as the bytes that travel through the segment
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Copy a jam name in, truncated so a terminator always fits
    pub fn set_jam_name(&mut self, name: &str) {
        write_text(&mut self.jam_name, name);
    }

    /// Fill a jammer slot and mark it valid. Empty names and slots past
    /// [`STEM_COUNT`] are ignored, as the producer does.
    pub fn set_jammer_name(&mut self, index: usize, name: &str) {
        if name.is_empty() || index >= STEM_COUNT {
            return;
        }
        write_text(&mut self.jammer_names[index], name);
        self.jammer_name_valid_bits |= 1 << index;
    }
}

fn write_text(dst: &mut [u8], text: &str) {
    dst.fill(0);
    let len = text.len().min(dst.len() - 1);
    dst[..len].copy_from_slice(&text.as_bytes()[..len]);
}

/// Fixed text buffers end at the first NUL and may be space padded
fn read_text(src: &[u8]) -> String {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8_lossy(&src[..end])
        .trim_end_matches(' ')
        .to_string()
}

/// Decoded exchange record.
///
/// Decode a fresh one per poll and drop it after deriving output from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExchangeRecord {
    /// Valid field groups
    pub flags: DataFlags,
    /// Incremented by the producer on every publish
    pub write_counter: u32,
    /// Name of the jam being played
    pub jam_name: String,
    /// Stable hash of the riff identifier
    pub riff_hash: u64,
    /// Riff submission time, unix seconds
    pub riff_timestamp: u64,
    /// Root note
    pub riff_root: Root,
    /// Scale
    pub riff_scale: Scale,
    /// Tempo in beats per minute
    pub riff_bpm: f32,
    /// Number of bar segments the riff divides into
    pub beat_segment_count: u32,
    /// Segment currently playing
    pub beat_segment_active: u32,
    /// Per-stem beat pulse
    pub stem_pulse: [f32; STEM_COUNT],
    /// Per-stem signal energy
    pub stem_energy: [f32; STEM_COUNT],
    /// Per-stem linear gain
    pub stem_gain: [f32; STEM_COUNT],
    /// Per-stem packed instrument colour
    pub stem_colour: [u32; STEM_COUNT],
    /// Pulse emitted when several stems beat together
    pub consensus_beat: f32,
    /// Progress of a transition to the next riff, 0..1
    pub riff_transition: f32,
    /// Bit `i` set when jammer slot `i` holds a name
    pub jammer_name_valid_bits: u32,
    /// Raw jammer slot contents, valid or not
    pub jammer_names: [String; STEM_COUNT],
}

impl ExchangeRecord {
    /// Decode a buffer of exactly [`RECORD_SIZE`] bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != RECORD_SIZE {
            return Err(DecodeError::MalformedRecord {
                expected: RECORD_SIZE,
                actual: bytes.len(),
            });
        }
        let raw: RawExchange = bytemuck::pod_read_unaligned(bytes);
        Self::from_raw(&raw)
    }

    /// Validate and copy out of a raw struct
    pub fn from_raw(raw: &RawExchange) -> Result<Self, DecodeError> {
        Ok(Self {
            flags: DataFlags::from_bits_retain(raw.data_flags),
            write_counter: raw.data_write_counter,
            jam_name: read_text(&raw.jam_name),
            riff_hash: raw.riff_hash,
            riff_timestamp: raw.riff_timestamp,
            riff_root: Root::from_index(raw.riff_root)?,
            riff_scale: Scale::from_index(raw.riff_scale)?,
            riff_bpm: raw.riff_bpm,
            beat_segment_count: raw.riff_beat_segment_count,
            beat_segment_active: raw.riff_beat_segment_active,
            stem_pulse: raw.stem_pulse,
            stem_energy: raw.stem_energy,
            stem_gain: raw.stem_gain,
            stem_colour: raw.stem_colour,
            consensus_beat: raw.consensus_beat,
            riff_transition: raw.riff_transition,
            jammer_name_valid_bits: raw.jammer_name_valid_bits,
            jammer_names: std::array::from_fn(|i| read_text(&raw.jammer_names[i])),
        })
    }

    /// True when the producer has no riff loaded
    pub fn has_no_data(&self) -> bool {
        self.flags.is_empty()
    }

    /// Whether slot `index` holds a jammer name
    pub fn is_jammer_name_valid(&self, index: usize) -> bool {
        index < STEM_COUNT && self.jammer_name_valid_bits & (1 << index) != 0
    }

    /// Jammer name in slot `index`, only if its validity bit is set
    pub fn jammer_name(&self, index: usize) -> Option<&str> {
        self.is_jammer_name_valid(index)
            .then(|| self.jammer_names[index].as_str())
    }

    /// All valid jammer names in slot order, duplicates included
    pub fn valid_jammers(&self) -> impl Iterator<Item = &str> + '_ {
        (0..STEM_COUNT).filter_map(move |i| self.jammer_name(i))
    }
}

/// Decode a snapshot taken from the exchange segment
pub fn decode(bytes: &[u8]) -> Result<ExchangeRecord, DecodeError> {
    ExchangeRecord::decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
        buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
    }

    fn put_u64(buf: &mut [u8], offset: usize, value: u64) {
        buf[offset..offset + 8].copy_from_slice(&value.to_ne_bytes());
    }

    fn put_f32(buf: &mut [u8], offset: usize, value: f32) {
        buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
    }

    fn put_text(buf: &mut [u8], offset: usize, text: &str) {
        buf[offset..offset + text.len()].copy_from_slice(text.as_bytes());
    }

    /// Buffer assembled by offset, independent of the Rust struct
    fn crafted() -> Vec<u8> {
        let mut buf = vec![0u8; RECORD_SIZE];
        put_u32(&mut buf, 0, 0b011);
        put_u32(&mut buf, 4, 41);
        put_text(&mut buf, 8, "Nightglow");
        put_u64(&mut buf, 40, 0xDEAD_BEEF_CAFE_F00D);
        put_u64(&mut buf, 48, 1_678_025_229);
        put_u32(&mut buf, 56, 6);
        put_u32(&mut buf, 60, 5);
        put_f32(&mut buf, 64, 120.5);
        put_u32(&mut buf, 68, 16);
        put_u32(&mut buf, 72, 3);
        for i in 0..STEM_COUNT {
            put_f32(&mut buf, 76 + i * 4, i as f32 * 0.1);
            put_f32(&mut buf, 108 + i * 4, i as f32 * 0.2);
            put_f32(&mut buf, 140 + i * 4, 1.0 - i as f32 * 0.125);
            put_u32(&mut buf, 172 + i * 4, 0xFF00_0000 | i as u32);
        }
        put_f32(&mut buf, 204, 0.75);
        put_f32(&mut buf, 208, 0.25);
        put_u32(&mut buf, 212, 0b0000_0101);
        put_text(&mut buf, 216, "alice");
        put_text(&mut buf, 216 + 32, "ghost");
        put_text(&mut buf, 216 + 64, "bob");
        buf
    }

    #[test]
    fn test_raw_layout_matches_record_size() {
        assert_eq!(std::mem::size_of::<RawExchange>(), RECORD_SIZE);
        assert_eq!(std::mem::align_of::<RawExchange>(), 8);
    }

    #[test]
    fn test_decode_header_fields() {
        let record = decode(&crafted()).unwrap();
        assert_eq!(record.flags, DataFlags::RIFF | DataFlags::PLAYBACK);
        assert_eq!(record.write_counter, 41);
        assert_eq!(record.jam_name, "Nightglow");
        assert_eq!(record.riff_hash, 0xDEAD_BEEF_CAFE_F00D);
        assert_eq!(record.riff_timestamp, 1_678_025_229);
    }

    #[test]
    fn test_decode_riff_fields() {
        let record = decode(&crafted()).unwrap();
        assert_eq!(record.riff_root.name(), "F#");
        assert_eq!(record.riff_scale.name(), "Minor (Aeolian)");
        assert_eq!(record.riff_bpm, 120.5);
        assert_eq!(record.beat_segment_count, 16);
        assert_eq!(record.beat_segment_active, 3);
    }

    #[test]
    fn test_decode_stem_arrays() {
        let record = decode(&crafted()).unwrap();
        for i in 0..STEM_COUNT {
            assert_eq!(record.stem_pulse[i], i as f32 * 0.1);
            assert_eq!(record.stem_energy[i], i as f32 * 0.2);
            assert_eq!(record.stem_gain[i], 1.0 - i as f32 * 0.125);
            assert_eq!(record.stem_colour[i], 0xFF00_0000 | i as u32);
        }
        assert_eq!(record.consensus_beat, 0.75);
        assert_eq!(record.riff_transition, 0.25);
    }

    #[test]
    fn test_decode_jammer_slots() {
        let record = decode(&crafted()).unwrap();
        assert_eq!(record.jammer_name_valid_bits, 0b101);
        assert_eq!(record.jammer_name(0), Some("alice"));
        // slot 1 has text but no validity bit
        assert_eq!(record.jammer_names[1], "ghost");
        assert_eq!(record.jammer_name(1), None);
        assert_eq!(record.jammer_name(2), Some("bob"));
        assert_eq!(record.jammer_name(8), None);
        assert_eq!(record.valid_jammers().collect::<Vec<_>>(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let mut buf = crafted();
        buf.push(0);
        assert_eq!(
            decode(&buf),
            Err(DecodeError::MalformedRecord {
                expected: RECORD_SIZE,
                actual: RECORD_SIZE + 1
            })
        );
        assert!(matches!(
            decode(&[]),
            Err(DecodeError::MalformedRecord { actual: 0, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_bad_indices() {
        let mut buf = crafted();
        put_u32(&mut buf, 56, 12);
        assert_eq!(decode(&buf), Err(DecodeError::RootOutOfRange(12)));

        let mut buf = crafted();
        put_u32(&mut buf, 60, 99);
        assert_eq!(decode(&buf), Err(DecodeError::ScaleOutOfRange(99)));
    }

    #[test]
    fn test_text_padding_is_trimmed() {
        let mut buf = crafted();
        put_text(&mut buf, 8, "Nightglow      ");
        assert_eq!(decode(&buf).unwrap().jam_name, "Nightglow");

        // completely full buffer without terminator
        let mut buf = crafted();
        put_text(&mut buf, 8, &"x".repeat(MAX_JAM_NAME));
        assert_eq!(decode(&buf).unwrap().jam_name.len(), MAX_JAM_NAME);
    }

    #[test]
    fn test_raw_builder_matches_crafted_offsets() {
        let mut raw = RawExchange::zeroed();
        raw.data_flags = 0b011;
        raw.data_write_counter = 41;
        raw.set_jam_name("Nightglow");
        raw.riff_hash = 0xDEAD_BEEF_CAFE_F00D;
        raw.riff_timestamp = 1_678_025_229;
        raw.riff_root = 6;
        raw.riff_scale = 5;
        raw.riff_bpm = 120.5;
        raw.riff_beat_segment_count = 16;
        raw.riff_beat_segment_active = 3;
        for i in 0..STEM_COUNT {
            raw.stem_pulse[i] = i as f32 * 0.1;
            raw.stem_energy[i] = i as f32 * 0.2;
            raw.stem_gain[i] = 1.0 - i as f32 * 0.125;
            raw.stem_colour[i] = 0xFF00_0000 | i as u32;
        }
        raw.consensus_beat = 0.75;
        raw.riff_transition = 0.25;
        raw.set_jammer_name(0, "alice");
        raw.jammer_names[1][..5].copy_from_slice(b"ghost");
        raw.set_jammer_name(2, "bob");

        assert_eq!(raw.as_bytes(), crafted().as_slice());
    }

    #[test]
    fn test_set_jammer_name_ignores_empty_and_overflow() {
        let mut raw = RawExchange::zeroed();
        raw.set_jammer_name(0, "");
        raw.set_jammer_name(STEM_COUNT, "nobody");
        assert_eq!(raw.jammer_name_valid_bits, 0);
    }

    #[test]
    fn test_set_jam_name_truncates() {
        let mut raw = RawExchange::zeroed();
        raw.set_jam_name(&"y".repeat(64));
        assert_eq!(raw.jam_name[MAX_JAM_NAME - 1], 0);
        let record = ExchangeRecord::from_raw(&raw).unwrap();
        assert_eq!(record.jam_name.len(), MAX_JAM_NAME - 1);
        assert!(record.has_no_data());
    }
}
