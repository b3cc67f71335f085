//! headline-gate — top news headlines in the terminal, behind a biometric gate.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌─────────────┐ outcomes ┌──────────┐  draw()  ┌──────────┐
//! │ biometric/  │ ───────► │  app.rs  │ ───────► │  ui.rs   │
//! │ fetch.rs    │ ◄─────── │ (state)  │          │ (render) │
//! └─────────────┘ commands └──────────┘          └──────────┘
//!                               ▲
//!                               │ handle_key_event()
//!                          ┌──────────┐
//!                          │ input.rs │
//!                          └──────────┘
//! ```
//!
//! * **`config`** — command-line / environment options.
//! * **`logging`** — tracing to a file, since the terminal belongs to the UI.
//! * **`app`** — owns the gate, the fetch coordinator and all view state.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`main`** — wires everything together: parse args, set up the terminal,
//!   and run the event loop.
//!
//! The gate, the coordinator and the headline source live in the
//! `headline_gate` library.

mod app;
mod config;
mod input;
mod logging;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::App;
use config::{Args, BiometricsMode};
use headline_gate::biometric::{BiometricPlatform, TerminalPrompt, Unsupported};
use headline_gate::source::{HeadlineSource, NewsApiSource};

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Pick the biometric platform.  The terminal dialog is also returned on its
/// own so the UI can answer it.
fn biometric_platform(args: &Args) -> (Arc<dyn BiometricPlatform>, Option<Arc<TerminalPrompt>>) {
    match args.biometrics {
        BiometricsMode::Terminal => {
            let prompt = Arc::new(TerminalPrompt::new(args.capability.into()));
            (prompt.clone(), Some(prompt))
        }
        BiometricsMode::None => (Arc::new(Unsupported), None),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // -- configuration and logging -------------------------------------------
    let args = Args::load();
    logging::init(args.log_file.as_deref())?;

    let initial_source = args.initial_source()?;
    let source: Arc<dyn HeadlineSource> =
        Arc::new(NewsApiSource::from_config(args.news_api()).context("building HTTP client")?);
    let (platform, terminal_prompt) = biometric_platform(&args);
    info!(source = %initial_source, biometrics = ?args.biometrics, "starting");

    install_panic_hook();

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(platform, terminal_prompt, source, initial_source);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Pick up gate outcomes and published headlines.
    //   2. Render the UI.
    //   3. Poll for keyboard input (up to tick_rate).
    // Fetches run on the runtime's worker threads meanwhile.
    let tick_rate = Duration::from_millis(100);

    loop {
        app.tick();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    info!("exiting");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
