//! Raw-mode terminal ownership for the editor.

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};

pub type EditorTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Puts the terminal into raw mode on the alternate screen and restores it on
/// drop, including early returns through `?`.
pub struct TerminalGuard {
    active: AtomicBool,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen, returning the guard and a
    /// ratatui terminal drawing to stdout.
    pub fn enter() -> Result<(Self, EditorTerminal)> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = Self {
            active: AtomicBool::new(true),
        };
        execute!(io::stdout(), EnterAlternateScreen)
            .context("Failed to enter alternate screen")?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .context("Failed to create terminal")?;
        Ok((guard, terminal))
    }

    /// Best-effort restore; errors are ignored since this also runs from the panic hook
    pub fn restore() {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = io::stdout().flush();
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active.swap(false, Ordering::SeqCst) {
            Self::restore();
        }
    }
}

/// Restore the terminal before the default panic output is printed
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        TerminalGuard::restore();
        original_hook(panic_info);
    }));
}
