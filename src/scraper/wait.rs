//! Human-in-the-loop suspension points.
//!
//! Login and bot-verification steps need a person at the visible browser.
//! Each such step is a [`HumanLoop::pause`] that suspends the run according to
//! a [`WaitStrategy`]: block on ENTER, sleep a fixed delay, or return at once.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

const CONFIRMATION_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Never pause for a human
    Silent,
    /// Pause for login and for verification challenges
    #[default]
    Guided,
    /// Like guided, and also pause on every target before extraction
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitStrategy {
    /// Wait for ENTER on stdin, giving up after `ceiling` if one is set
    WaitForSignal { ceiling: Option<Duration> },
    /// Sleep for a fixed duration
    FixedDelay(Duration),
    /// Return immediately
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Signalled,
    CeilingReached,
    DelayElapsed,
    Skipped,
}

impl WaitStrategy {
    pub async fn wait(&self, prompt: &str, confirmations: &Confirmations) -> WaitOutcome {
        match self {
            WaitStrategy::Immediate => WaitOutcome::Skipped,
            WaitStrategy::FixedDelay(delay) => {
                println!("\n{}", prompt);
                println!("   Continuing automatically in {}s...\n", delay.as_secs());
                tokio::time::sleep(*delay).await;
                WaitOutcome::DelayElapsed
            }
            WaitStrategy::WaitForSignal { ceiling } => {
                // Lines typed before the prompt do not confirm it
                confirmations.discard_pending().await;

                println!("\n{}", prompt);
                println!("   Press ENTER in this terminal to continue...\n");

                let received = match ceiling {
                    Some(ceiling) => tokio::time::timeout(*ceiling, confirmations.recv())
                        .await
                        .ok(),
                    None => Some(confirmations.recv().await),
                };

                match received {
                    Some(Some(_)) => {
                        info!("Continuing");
                        WaitOutcome::Signalled
                    }
                    Some(None) => {
                        warn!("stdin is closed, not waiting for confirmation");
                        WaitOutcome::Signalled
                    }
                    None => {
                        warn!("No confirmation received, continuing after the wait ceiling");
                        WaitOutcome::CeilingReached
                    }
                }
            }
        }
    }
}

/// Lines typed by the operator, delivered over a channel.
///
/// The stdin source starts one reader thread on first use and keeps it for
/// the life of the process. A pause that gives up at its ceiling leaves the
/// thread running, so the next line still reaches the next pause and the
/// runtime never waits on a blocked read at shutdown.
#[derive(Debug, Clone)]
pub struct Confirmations {
    feed: Arc<Mutex<Feed>>,
}

#[derive(Debug)]
enum Feed {
    Stdin,
    Open(mpsc::Receiver<String>),
    Closed,
}

impl Confirmations {
    /// Read confirmations from the terminal
    pub fn stdin() -> Self {
        Self::with_feed(Feed::Stdin)
    }

    /// A source that never delivers a line
    pub fn closed() -> Self {
        Self::with_feed(Feed::Closed)
    }

    #[cfg(test)]
    pub(crate) fn from_receiver(rx: mpsc::Receiver<String>) -> Self {
        Self::with_feed(Feed::Open(rx))
    }

    fn with_feed(feed: Feed) -> Self {
        Self {
            feed: Arc::new(Mutex::new(feed)),
        }
    }

    /// Next line, or `None` once the source is closed
    async fn recv(&self) -> Option<String> {
        let mut feed = self.feed.lock().await;
        feed.receiver()?.recv().await
    }

    async fn discard_pending(&self) {
        let mut feed = self.feed.lock().await;
        if let Some(rx) = feed.receiver() {
            while rx.try_recv().is_ok() {}
        }
    }
}

impl Feed {
    fn receiver(&mut self) -> Option<&mut mpsc::Receiver<String>> {
        if matches!(self, Feed::Stdin) {
            *self = spawn_stdin_reader();
        }
        match self {
            Feed::Open(rx) => Some(rx),
            _ => None,
        }
    }
}

fn spawn_stdin_reader() -> Feed {
    let (tx, rx) = mpsc::channel(CONFIRMATION_BUFFER);

    let spawned = std::thread::Builder::new()
        .name("stdin-confirmations".to_string())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read confirmation from stdin: {}", e);
                        break;
                    }
                }
            }
        });

    match spawned {
        Ok(_) => Feed::Open(rx),
        Err(e) => {
            warn!("Could not start the stdin reader: {}", e);
            Feed::Closed
        }
    }
}

/// Interaction mode paired with the strategy used at each pause
#[derive(Debug, Clone)]
pub struct HumanLoop {
    mode: InteractionMode,
    strategy: WaitStrategy,
    confirmations: Confirmations,
}

impl HumanLoop {
    /// Signal waits read ENTER from the terminal
    pub fn new(mode: InteractionMode, strategy: WaitStrategy) -> Self {
        let confirmations = match strategy {
            WaitStrategy::WaitForSignal { .. } => Confirmations::stdin(),
            _ => Confirmations::closed(),
        };
        Self::with_confirmations(mode, strategy, confirmations)
    }

    pub fn with_confirmations(
        mode: InteractionMode,
        strategy: WaitStrategy,
        confirmations: Confirmations,
    ) -> Self {
        Self {
            mode,
            strategy,
            confirmations,
        }
    }

    pub fn silent() -> Self {
        Self::new(InteractionMode::Silent, WaitStrategy::Immediate)
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_interactive(&self) -> bool {
        self.mode != InteractionMode::Silent
    }

    pub fn pauses_per_target(&self) -> bool {
        self.mode == InteractionMode::Manual
    }

    /// Suspend for a human. Returns `None` when the mode is silent.
    pub async fn pause(&self, prompt: &str) -> Option<WaitOutcome> {
        if !self.is_interactive() {
            return None;
        }
        Some(self.strategy.wait(prompt, &self.confirmations).await)
    }
}
