use std::time::Duration;

use cheerleader_models::Track;
use tokio::sync::broadcast::{self, Receiver, Sender};

/// Player transitions, as seen by in-process listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Playing { track: Box<Track>, index: usize },
    Paused,
    SeekTo(Duration),
    BufferingStarted,
    BufferingEnded,
    Progress(Duration),
    TrackAdded(Box<Track>),
    TrackRemoved { track: Box<Track>, index: usize },
    Stopped,
}

#[derive(Debug)]
pub struct EventBroadcast {
    tx: Sender<PlayerEvent>,
    rx: Receiver<PlayerEvent>,
}

impl EventBroadcast {
    pub fn new() -> Self {
        let (tx, rx) = broadcast::channel(64);
        Self { tx, rx }
    }

    pub fn send(&self, event: PlayerEvent) {
        self.tx.send(event).expect("infallible");
    }

    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.rx.resubscribe()
    }
}

impl Default for EventBroadcast {
    fn default() -> Self {
        Self::new()
    }
}
