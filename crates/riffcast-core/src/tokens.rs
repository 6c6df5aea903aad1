//! Derived tokens
//!
//! Human-readable values computed from an exchange record rather than read
//! straight out of it: formatted riff timestamps, key names and the jammer
//! roster.

use crate::exchange::ExchangeRecord;
use chrono::{DateTime, Local, TimeZone};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Calendar date format for `%time_short%`
pub const TIME_SHORT_FORMAT: &str = "%Y-%m-%d";
/// Full date and time format for `%time_long%`
pub const TIME_LONG_FORMAT: &str = "%A, %B %-d, %Y %-I:%M:%S %p";
/// Separator placed between roster names
pub const JAMMER_SEPARATOR: &str = " x ";

/// Token values derived from one record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivedTokens {
    /// Riff date, e.g. `2023-03-05`
    pub time_short: String,
    /// Riff date and time, e.g. `Sunday, March 5, 2023 2:07:09 PM`
    pub time_long: String,
    /// Scale name
    pub scale: String,
    /// Root note name
    pub root: String,
    /// Distinct jammer names, ordinal order, joined with [`JAMMER_SEPARATOR`]
    pub unique_jammers: String,
    /// As `unique_jammers`, with names uppercased before deduplication
    pub unique_jammers_upper: String,
}

impl DerivedTokens {
    /// Token names in substitution order
    pub const NAMES: [&'static str; 6] = [
        "time_short",
        "time_long",
        "scale",
        "root",
        "unique_jammers",
        "unique_jammers_upper",
    ];

    /// Compute with timestamps rendered in the local time zone
    pub fn compute(record: &ExchangeRecord) -> Self {
        Self::compute_in(record, &Local)
    }

    /// Compute with timestamps rendered in `tz`
    pub fn compute_in<Tz>(record: &ExchangeRecord, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let when = riff_time(record.riff_timestamp, tz);
        Self {
            time_short: when.format(TIME_SHORT_FORMAT).to_string(),
            time_long: when.format(TIME_LONG_FORMAT).to_string(),
            scale: record.riff_scale.name().to_string(),
            root: record.riff_root.name().to_string(),
            unique_jammers: unique_jammers(record.valid_jammers(), false),
            unique_jammers_upper: unique_jammers(record.valid_jammers(), true),
        }
    }

    /// Value of a derived token by bare name
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "time_short" => Some(&self.time_short),
            "time_long" => Some(&self.time_long),
            "scale" => Some(&self.scale),
            "root" => Some(&self.root),
            "unique_jammers" => Some(&self.unique_jammers),
            "unique_jammers_upper" => Some(&self.unique_jammers_upper),
            _ => None,
        }
    }

    /// `(name, value)` pairs in substitution order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Self::NAMES
            .iter()
            .filter_map(move |name| self.get(name).map(|value| (*name, value)))
    }
}

/// Convert producer unix seconds into `tz`.
///
/// Values chrono cannot represent fall back to the epoch.
pub fn riff_time<Tz: TimeZone>(unix_seconds: u64, tz: &Tz) -> DateTime<Tz> {
    i64::try_from(unix_seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default()
        .with_timezone(tz)
}

/// Deduplicate, sort ordinally and join jammer names.
///
/// With `uppercase` set, names are uppercased first, so names that differ
/// only in case collapse into one.
pub fn unique_jammers<'a>(names: impl IntoIterator<Item = &'a str>, uppercase: bool) -> String {
    let roster: BTreeSet<String> = names
        .into_iter()
        .map(|name| {
            if uppercase {
                name.to_uppercase()
            } else {
                name.to_string()
            }
        })
        .collect();

    roster
        .into_iter()
        .collect::<Vec<_>>()
        .join(JAMMER_SEPARATOR)
}
