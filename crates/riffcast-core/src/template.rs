//! `%token%` template substitution
//!
//! A template is plain text with `%name%` placeholders. Substitution runs in
//! two ordered passes:
//!
//! 1. every record field in [`FIELD_TOKENS`] order,
//! 2. every derived token in [`DerivedTokens::NAMES`] order.
//!
//! Each token is replaced with a single linear scan, so text produced by a
//! replacement is never scanned for the same token again. Placeholders that
//! match no known token are left untouched. There is no escape for a literal
//! `%`.

use crate::exchange::ExchangeRecord;
use crate::tokens::DerivedTokens;

/// Reads one record field as display text
pub type FieldAccessor = fn(&ExchangeRecord) -> String;

/// Record fields that can be referenced from a template, in substitution order
pub const FIELD_TOKENS: [(&str, FieldAccessor); 10] = [
    ("dataflags", field_dataflags),
    ("dataWriteCounter", field_write_counter),
    ("jamName", field_jam_name),
    ("riffHash", field_riff_hash),
    ("riffTimestamp", field_riff_timestamp),
    ("riffRoot", field_riff_root),
    ("riffScale", field_riff_scale),
    ("riffBPM", field_riff_bpm),
    ("riffBeatSegmentCount", field_beat_segment_count),
    ("riffBeatSegmentActive", field_beat_segment_active),
];

fn field_dataflags(r: &ExchangeRecord) -> String {
    r.flags.bits().to_string()
}

fn field_write_counter(r: &ExchangeRecord) -> String {
    r.write_counter.to_string()
}

fn field_jam_name(r: &ExchangeRecord) -> String {
    r.jam_name.clone()
}

fn field_riff_hash(r: &ExchangeRecord) -> String {
    r.riff_hash.to_string()
}

fn field_riff_timestamp(r: &ExchangeRecord) -> String {
    r.riff_timestamp.to_string()
}

fn field_riff_root(r: &ExchangeRecord) -> String {
    r.riff_root.index().to_string()
}

fn field_riff_scale(r: &ExchangeRecord) -> String {
    r.riff_scale.index().to_string()
}

fn field_riff_bpm(r: &ExchangeRecord) -> String {
    format_bpm(r.riff_bpm)
}

fn field_beat_segment_count(r: &ExchangeRecord) -> String {
    r.beat_segment_count.to_string()
}

fn field_beat_segment_active(r: &ExchangeRecord) -> String {
    r.beat_segment_active.to_string()
}

/// Tempo rounded to two decimals, trailing zeros dropped (`120.5`, `96`).
///
/// Midpoints round to the even neighbour, so `120.125` shows as `120.12`.
pub fn format_bpm(bpm: f32) -> String {
    let rounded = round_half_even(bpm as f64 * 100.0) / 100.0;
    rounded.to_string()
}

fn round_half_even(value: f64) -> f64 {
    let floor = value.floor();
    let fraction = value - floor;
    if fraction > 0.5 || (fraction == 0.5 && floor % 2.0 != 0.0) {
        floor + 1.0
    } else {
        floor
    }
}

/// True if `name` is a record field or derived token
pub fn is_known_token(name: &str) -> bool {
    FIELD_TOKENS.iter().any(|(field, _)| *field == name)
        || DerivedTokens::NAMES.iter().any(|derived| *derived == name)
}

/// Substitute every known token in `template`
pub fn apply(template: &str, record: &ExchangeRecord, derived: &DerivedTokens) -> String {
    let mut result = template.to_string();

    for (name, accessor) in FIELD_TOKENS.iter() {
        result = replace_token(&result, name, || accessor(record));
    }
    for (name, value) in derived.iter() {
        result = replace_token(&result, name, || value.to_string());
    }

    result
}

/// Replace every `%name%` in `text`; `value` is evaluated at most once
fn replace_token(text: &str, name: &str, value: impl FnOnce() -> String) -> String {
    let placeholder = format!("%{}%", name);
    if !text.contains(&placeholder) {
        return text.to_string();
    }
    text.replace(&placeholder, &value())
}

/// Placeholder names in `template` that no token will ever fill.
///
/// Used to flag typos in configured templates. Only `%word%` spans made of
/// ASCII alphanumerics and underscores count as placeholders.
pub fn unknown_tokens(template: &str) -> Vec<String> {
    let mut unknown = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('%') {
        let after = &rest[start + 1..];
        let Some(len) = after.find('%') else {
            break;
        };
        let candidate = &after[..len];
        let is_word = !candidate.is_empty()
            && candidate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');

        if is_word {
            if !is_known_token(candidate) && !unknown.iter().any(|u| u == candidate) {
                unknown.push(candidate.to_string());
            }
            rest = &after[len + 1..];
        } else {
            // the closing '%' may open the next placeholder
            rest = &after[len..];
        }
    }

    unknown
}
