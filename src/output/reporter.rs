//! `TerminalReporter` — Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly. On a TTY, steps render as a live spinner;
//! otherwise they print as plain lines.

use std::sync::Mutex;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    active: Mutex<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            active: Mutex::new(None),
        }
    }

    fn clear_active(&self) {
        if let Ok(mut guard) = self.active.lock() {
            if let Some(pb) = guard.take() {
                progress::finish_clear(&pb);
            }
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if self.ctx.show_progress() {
            self.clear_active();
            if let Ok(mut guard) = self.active.lock() {
                *guard = Some(progress::spinner(message));
            }
        } else {
            println!("  {} {message}", "→".cyan());
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if self.ctx.show_progress() {
            let finished = self.active.lock().ok().and_then(|mut guard| guard.take());
            if let Some(pb) = finished {
                progress::finish_ok(&pb, message);
                return;
            }
        }
        println!("  {} {message}", "✓".green());
    }

    fn warn(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        self.clear_active();
        println!("  {} {message}", "!".yellow());
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        self.clear_active();
    }
}
