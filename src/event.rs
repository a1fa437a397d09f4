use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

use crate::error::{AppError, Result};
use crate::fs::node::DirEntry;
use crate::fs::tree::{FetchRequest, MutationOutcome, MutationPlan};
use crate::preview_content::PreviewContent;

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Resize(u16, u16),
    /// Listing of a folder being opened as the new root.
    RootOpened {
        path: String,
        result: Result<Vec<DirEntry>>,
    },
    /// Listing for a directory the user expanded.
    Fetched {
        request: FetchRequest,
        result: Result<Vec<DirEntry>>,
    },
    /// A create/rename/delete and its refresh listing finished.
    Mutated {
        plan: MutationPlan,
        result: Result<MutationOutcome>,
    },
    PreviewLoaded {
        path: String,
        result: Result<PreviewContent>,
    },
}

/// Polls crossterm on a background task and merges its events with the
/// completions sent by gateway tasks.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        // Windows reports key releases too.
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            Event::Key(key)
                        }
                        Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                        _ => continue,
                    }
                } else {
                    Event::Tick
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, tx }
    }

    /// Sender for spawned tasks to report completions.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| AppError::Terminal("Event channel closed".into()))
    }
}
