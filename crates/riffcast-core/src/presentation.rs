//! Presentation lines - per-line fade state machine
//!
//! Each configured output line owns one [`PresentationLine`]. New text is
//! queued with [`PresentationLine::enqueue`]; [`PresentationLine::advance`]
//! walks the line through fade-out of the old text, swap, fade-in of the new
//! text and a minimum hold, so rapid updates never flicker.
//!
//! The machine is driven purely by the delta time passed in. It knows nothing
//! about windows or timers; a front-end only reads [`PresentationLine::view`].

use crate::colour::Rgba;
use std::collections::VecDeque;
use tracing::trace;

/// Multiplier from seconds to internal timer units
pub const TIME_SCALE: f32 = 3.0;
/// Length of a fade in timer units
pub const FADE_DURATION: f32 = 1.0;
/// Minimum time text stays fully visible before it may be replaced
pub const MIN_DISPLAY: f32 = 2.0;

/// State of a presentation line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// Alpha ramping 0 → 1
    FadeIn,
    /// Fully visible
    Display,
    /// Alpha ramping 1 → 0
    FadeOut,
    /// Invisible, waiting for pending text
    SwapContent,
}

/// What a front-end draws for one line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineView<'a> {
    /// Current text
    pub text: &'a str,
    /// Configured colour carrying the current alpha
    pub colour: Rgba,
}

/// One on-screen output slot
#[derive(Debug, Clone)]
pub struct PresentationLine {
    colour: Rgba,
    state: LineState,
    alpha: f32,
    timer: f32,
    current_text: String,
    last_enqueued: Option<String>,
    pending: VecDeque<String>,
}

impl PresentationLine {
    /// Create an empty, invisible line
    pub fn new(colour: Rgba) -> Self {
        Self {
            colour,
            state: LineState::SwapContent,
            alpha: 0.0,
            timer: 0.0,
            current_text: String::new(),
            last_enqueued: None,
            pending: VecDeque::new(),
        }
    }

    /// Queue text for display.
    ///
    /// Ignored when it equals the last queued text or the text on screen.
    /// Returns whether the text was queued.
    pub fn enqueue(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.last_enqueued.as_deref() == Some(text.as_str()) || self.current_text == text {
            return false;
        }
        self.last_enqueued = Some(text.clone());
        self.pending.push_back(text);
        true
    }

    /// Advance the machine by `delta_seconds`.
    ///
    /// Returns the new state if a transition happened.
    pub fn advance(&mut self, delta_seconds: f32) -> Option<LineState> {
        self.timer += delta_seconds * TIME_SCALE;
        let previous = self.state;

        match self.state {
            LineState::FadeIn => {
                self.alpha = (self.timer / FADE_DURATION).clamp(0.0, 1.0);
                if self.timer >= FADE_DURATION {
                    self.enter(LineState::Display);
                }
            }
            LineState::Display => {
                self.alpha = 1.0;
                if !self.pending.is_empty() && self.timer >= MIN_DISPLAY {
                    self.enter(LineState::FadeOut);
                }
            }
            LineState::FadeOut => {
                self.alpha = (1.0 - self.timer / FADE_DURATION).clamp(0.0, 1.0);
                if self.timer >= FADE_DURATION {
                    self.enter(LineState::SwapContent);
                }
            }
            LineState::SwapContent => {
                self.alpha = 0.0;
                if let Some(next) = self.pending.pop_front() {
                    self.current_text = next;
                    self.enter(LineState::FadeIn);
                }
            }
        }

        (self.state != previous).then(|| {
            trace!("Line {:?} -> {:?}", previous, self.state);
            self.state
        })
    }

    fn enter(&mut self, state: LineState) {
        self.timer = 0.0;
        self.state = state;
    }

    /// Current text and colour for rendering
    pub fn view(&self) -> LineView<'_> {
        LineView {
            text: &self.current_text,
            colour: self.colour.with_alpha(self.alpha),
        }
    }

    /// Current state
    pub fn state(&self) -> LineState {
        self.state
    }

    /// Current alpha, 0..1
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Text currently on screen (possibly fading)
    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    /// Number of texts waiting to be shown
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Configured base colour
    pub fn colour(&self) -> Rgba {
        self.colour
    }
}
