use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::Event;
use crossterm::event::{poll, read};
use futures::stream::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_stream::wrappers::{IntervalStream, ReceiverStream};
use tracing::error;

use crate::sync::{CacheEntry, MutationKind, MutationOutcome};

pub const UI_TICK_MS: u64 = 250;
pub const CHANNEL_SIZE: usize = 100;

pub enum Message {
    Key(Event),
    /// New snapshot of a subscribed query
    Entry(Arc<CacheEntry>),
    /// A mutation started from the ui finished
    Mutation(MutationKind, MutationOutcome),
    /// Redraw pulse for notifications and ages
    Tick,
}

pub fn async_key_events(should_stop: Arc<AtomicBool>) -> impl Stream<Item = Message> {
    let (tx, rx) = mpsc::channel(CHANNEL_SIZE);

    tokio::spawn(async move {
        while !should_stop.load(Ordering::Relaxed) {
            match poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(event) = read() {
                        if tx.send(Message::Key(event)).await.is_err() {
                            break;
                        }
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    error!("Error polling for events: {e}");
                    break;
                }
            }
        }
    });

    ReceiverStream::new(rx)
}

pub fn tick_events() -> impl Stream<Item = Message> {
    IntervalStream::new(interval(Duration::from_millis(UI_TICK_MS))).map(|_| Message::Tick)
}

/// Channel shared by subscription forwarders and mutation tasks
#[must_use]
pub fn message_channel() -> (mpsc::Sender<Message>, impl Stream<Item = Message>) {
    let (tx, rx) = mpsc::channel(CHANNEL_SIZE);
    (tx, ReceiverStream::new(rx))
}
