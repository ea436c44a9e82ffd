use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::catalog::{DataSource, Product};
use crate::worker::{ControlReply, WorkerNotice};

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh
  Tick,
  /// Catalog loading progress
  Catalog(CatalogEvent),
  /// One-way notice from the cache router
  Worker(WorkerNotice),
  /// Reply to a control command
  Control(ControlReply),
  /// Background task failure, shown in the status bar
  Error(String),
}

/// Catalog load lifecycle
#[derive(Debug)]
pub enum CatalogEvent {
  Loading,
  Loaded {
    products: Vec<Product>,
    source: DataSource,
  },
}

/// Event handler that produces events from terminal input, a tick
/// timer, and async background tasks
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn terminal event reader
    let input_tx = tx.clone();
    tokio::spawn(async move {
      loop {
        if event::poll(tick_rate).unwrap_or(false) {
          if let Ok(evt) = event::read() {
            if let CrosstermEvent::Key(key) = evt {
              if input_tx.send(Event::Key(key)).is_err() {
                break;
              }
            }
          }
        } else {
          // Tick
          if input_tx.send(Event::Tick).is_err() {
            break;
          }
        }
      }
    });

    Self { tx, rx }
  }

  /// Sender for background tasks to push events through
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
