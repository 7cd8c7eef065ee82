//! Quit and reset handling for a running evolution.
//!
//! Requests coming from Ctrl-C or from the terminal are forwarded to the
//! evaluator's [`GenerationSignals`], which the generation loop reads at tick
//! boundaries.

use crate::model::GenerationSignals;
use anyhow::{Context, Result};
use std::io::BufRead;

/// Commands accepted on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reset,
}

impl Command {
    /// `q`/`quit` and `r`/`reset`, case-insensitive.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => Some(Command::Quit),
            "r" | "reset" => Some(Command::Reset),
            _ => None,
        }
    }
}

/// Routes outside requests to a run's generation signals.
#[derive(Debug, Clone)]
pub struct ShutdownManager {
    signals: GenerationSignals,
}

impl ShutdownManager {
    #[must_use]
    pub fn new(signals: GenerationSignals) -> Self {
        Self { signals }
    }

    #[must_use]
    pub fn signals(&self) -> &GenerationSignals {
        &self.signals
    }

    /// Stops the run after the current generation returns its fitness.
    pub fn request_shutdown(&self) {
        self.signals.request_quit();
    }

    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.signals.is_quit_requested()
    }

    pub fn apply(&self, command: Command) {
        match command {
            Command::Quit => self.request_shutdown(),
            Command::Reset => self.signals.request_reset(),
        }
    }

    /// Requests quit on Ctrl-C. Must be called inside a tokio runtime.
    pub fn spawn_ctrl_c(&self) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received, finishing current generation...");
                manager.request_shutdown();
            }
        })
    }

    /// Reads commands from stdin on a dedicated thread.
    ///
    /// The thread is detached: a blocking stdin read must not keep the
    /// runtime from shutting down.
    pub fn spawn_stdin_watcher(&self) -> Result<()> {
        let manager = self.clone();
        std::thread::Builder::new()
            .name("stdin-watcher".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    match Command::parse(&line) {
                        Some(command) => manager.apply(command),
                        None if line.trim().is_empty() => {}
                        None => tracing::warn!(input = %line.trim(), "Unknown command (q = quit, r = reset)"),
                    }
                    if manager.is_shutdown_requested() {
                        break;
                    }
                }
            })
            .context("Failed to spawn stdin watcher")?;
        Ok(())
    }
}
