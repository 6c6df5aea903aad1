//! Riffcast - jam exchange overlay
//!
//! Reads the live jam state a music host publishes to shared memory and
//! shows it as configurable, fading lines of text.
//!
//! Usage: `riffcast [config-path]` (default `config.json`), or
//! `riffcast --init [config-path]` to write a starter config.

#![warn(missing_docs)]

mod logging_setup;
mod overlay;
mod terminal;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::unbounded;
use overlay::Overlay;
use riffcast_core::{DecodeError, OutputLineConfig, OverlayConfig};
use riffcast_io::{
    load_config, save_config, ExchangeChannel, ExchangeSource, Poller, DEFAULT_CONFIG_FILE,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use terminal::TerminalView;
use tracing::{info, warn};

/// Set by SIGTERM/SIGINT, checked once per presentation tick
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn signal_handler(_sig: i32) {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as *const () as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as *const () as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
fn install_signal_handlers() {}

fn starter_config() -> OverlayConfig {
    OverlayConfig {
        configs: vec![
            OutputLineConfig::new("%jamName%"),
            OutputLineConfig {
                hex_colour: "#9AD1FF".to_string(),
                ..OutputLineConfig::new("%riffBPM% bpm | %root% %scale%")
            },
            OutputLineConfig {
                hex_colour: "#A0A0A0".to_string(),
                padding_top: 8,
                ..OutputLineConfig::new("%unique_jammers_upper%")
            },
        ],
        ..Default::default()
    }
}

/// Tick and draw until `shutdown` is set or the poll thread ends.
///
/// The poll thread is stopped and joined and the terminal restored on every
/// exit path. A draw error is reported ahead of the poll thread's outcome.
fn present<W: Write>(
    overlay: &mut Overlay,
    screen: &mut TerminalView<W>,
    poller: JoinHandle<Result<(), DecodeError>>,
    stop: &AtomicBool,
    shutdown: &AtomicBool,
    tick: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();
    let mut drawn = Ok(());

    while !shutdown.load(Ordering::Relaxed) && !poller.is_finished() {
        overlay.pump();

        let now = Instant::now();
        overlay.tick(now.duration_since(last_tick).as_secs_f32());
        last_tick = now;

        if let Err(e) = screen.render(overlay) {
            drawn = Err(e);
            break;
        }
        thread::sleep(tick);
    }

    stop.store(true, Ordering::Relaxed);
    let joined = poller.join();
    let restored = screen.finish();

    drawn.context("Failed to draw overlay")?;
    let outcome = joined.map_err(|_| anyhow!("Poll thread panicked"))?;
    restored.context("Failed to restore terminal")?;
    outcome.context("Exchange record rejected")
}

fn run(config: OverlayConfig) -> Result<()> {
    let channel = match ExchangeChannel::bind(&config.segment_name) {
        Ok(channel) => channel,
        Err(e) => {
            warn!("Exchange not available ({}), waiting for producer", e);
            ExchangeChannel::unbound(&config.segment_name)
        }
    };
    let bound = channel.is_bound();

    let (tx, rx) = unbounded();
    let stop = Arc::new(AtomicBool::new(false));
    let templates = config
        .configs
        .iter()
        .map(|line| line.formatting.clone())
        .collect();
    let poller = Poller::new(channel, templates, config.poll_interval())
        .spawn(tx, stop.clone())
        .context("Failed to spawn poll thread")?;

    let mut overlay = Overlay::new(&config, rx, bound);
    info!("Presenting {} output lines", overlay.lines().len());
    let mut screen = TerminalView::new(std::io::stdout().lock(), &config);

    let result = present(
        &mut overlay,
        &mut screen,
        poller,
        &stop,
        &SHUTDOWN,
        config.tick_interval(),
    );
    if let Some(counter) = overlay.last_counter() {
        info!("Last applied change: counter {}", counter);
    }
    result
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let init = args.iter().any(|a| a == "--init");
    let config_path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if init {
        save_config(&starter_config(), &config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let _log_guard = logging_setup::init(&config.log)?;
    install_signal_handlers();

    info!("==========================================");
    info!("===      Riffcast Session Started      ===");
    info!("==========================================");

    let result = run(config);
    info!("Riffcast session ended");
    result
}
