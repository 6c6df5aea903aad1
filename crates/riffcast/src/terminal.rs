//! ANSI terminal front-end.
//!
//! Draws each line in its configured 24-bit colour. Terminals have no text
//! alpha, so the colour is faded towards black instead. The screen is only
//! redrawn when something visible changed.

use crate::overlay::{Overlay, WAITING_TEXT};
use riffcast_core::OverlayConfig;
use std::io::Write;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const HIDE_CURSOR: &str = "\x1b[?25l";
pub(crate) const SHOW_CURSOR: &str = "\x1b[?25h";
const WAITING_RGB: [u8; 3] = [0x80, 0x80, 0x80];

/// Static per-line layout taken from the config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineLayout {
    bold: bool,
    blank_rows: usize,
}

/// One drawn line, compared between frames
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrameLine {
    text: String,
    rgb: [u8; 3],
}

/// Writes frames to a terminal
pub struct TerminalView<W: Write> {
    out: W,
    layout: Vec<LineLayout>,
    last_frame: Option<Vec<FrameLine>>,
}

impl<W: Write> TerminalView<W> {
    /// Layout from the config; padding is converted from points to rows
    pub fn new(out: W, config: &OverlayConfig) -> Self {
        let layout = config
            .configs
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let font = config.line_font(index);
                let row_height = font.size.max(1.0);
                LineLayout {
                    bold: font.bold,
                    blank_rows: (line.padding_top as f32 / row_height).ceil() as usize,
                }
            })
            .collect();

        Self {
            out,
            layout,
            last_frame: None,
        }
    }

    fn frame(overlay: &Overlay) -> Vec<FrameLine> {
        if overlay.is_waiting() {
            return vec![FrameLine {
                text: WAITING_TEXT.to_string(),
                rgb: WAITING_RGB,
            }];
        }
        overlay
            .views()
            .into_iter()
            .map(|view| FrameLine {
                text: view.text.to_string(),
                rgb: view.colour.premultiplied_rgb8(),
            })
            .collect()
    }

    /// Redraw if the frame differs from the last one; returns whether it drew
    pub fn render(&mut self, overlay: &Overlay) -> std::io::Result<bool> {
        let frame = Self::frame(overlay);
        if self.last_frame.as_ref() == Some(&frame) {
            return Ok(false);
        }

        let mut buf = String::from(HIDE_CURSOR);
        buf.push_str(CLEAR_SCREEN);
        for (index, line) in frame.iter().enumerate() {
            let layout = self.layout.get(index).copied().unwrap_or(LineLayout {
                bold: false,
                blank_rows: 0,
            });
            for _ in 0..layout.blank_rows {
                buf.push_str("\r\n");
            }
            if layout.bold {
                buf.push_str(BOLD);
            }
            let [r, g, b] = line.rgb;
            buf.push_str(&format!("\x1b[38;2;{};{};{}m{}{}\r\n", r, g, b, line.text, RESET));
        }

        self.out.write_all(buf.as_bytes())?;
        self.out.flush()?;
        self.last_frame = Some(frame);
        Ok(true)
    }

    /// Restore the cursor
    pub fn finish(&mut self) -> std::io::Result<()> {
        write!(self.out, "{}{}", RESET, SHOW_CURSOR)?;
        self.out.flush()
    }

    /// Underlying writer
    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
