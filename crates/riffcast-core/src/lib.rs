//! Riffcast Core - Exchange Model and Overlay Logic
//!
//! This crate contains everything that does not touch the operating system:
//! - Binary layout and decoding of the jam exchange record
//! - Change detection on the producer's write counter
//! - Derived tokens and `%token%` template substitution
//! - The per-line fade state machine
//! - Overlay and logging configuration

#![warn(missing_docs)]

pub mod change;
pub mod colour;
pub mod config;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod music;
pub mod presentation;
pub mod template;
pub mod tokens;

// --- Re-exports grouped by category ---

// Exchange record
pub use exchange::{
    decode, DataFlags, ExchangeRecord, RawExchange, MUTEX_NAME, RECORD_SIZE, SEGMENT_NAME,
    STEM_COUNT,
};
pub use music::{Root, Scale};

// Change detection and text
pub use change::ChangeDetector;
pub use template::{apply, unknown_tokens, FIELD_TOKENS};
pub use tokens::DerivedTokens;

// Presentation
pub use colour::Rgba;
pub use presentation::{LineState, LineView, PresentationLine};

// Configuration
pub use config::{FontSpec, OutputLineConfig, OverlayConfig};
pub use logging::LogConfig;

// Errors
pub use error::{ConfigError, CoreError, DecodeError, Result};

/// Render every template against one record.
///
/// Derived tokens are computed once and shared by all lines. The result is
/// in template order.
pub fn render_lines<'a, I>(record: &ExchangeRecord, templates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let derived = DerivedTokens::compute(record);
    templates
        .into_iter()
        .map(|template| apply(template, record, &derived))
        .collect()
}
