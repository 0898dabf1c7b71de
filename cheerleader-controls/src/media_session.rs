use std::time::Duration;

use cheerleader_models::Track;
use tokio::select;
use tracing::debug;

use crate::{
    ExitReceiver, PlaylistReceiver, PositionReceiver, Status, StatusReceiver, controls::Controls,
};

/// Snapshot handed to remote control surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub track: Option<Track>,
    pub index: Option<usize>,
    pub total: usize,
    pub status: Status,
    pub position: Duration,
}

/// Something displaying the player state outside of the application window:
/// a system notification, lock screen controls, a status line.
pub trait MediaSurface: Send {
    fn update(&mut self, now_playing: &NowPlaying);

    /// Called once when the player stops; the surface should disappear.
    fn release(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteAction {
    Play,
    Pause,
    PlayPause,
    Next,
    Previous,
    Stop,
    SeekTo(Duration),
}

/// Keeps every registered surface in sync with the player and routes the
/// buttons pressed on them back to the player.
pub struct MediaSession {
    controls: Controls,
    status: StatusReceiver,
    playlist: PlaylistReceiver,
    position: PositionReceiver,
    surfaces: Vec<Box<dyn MediaSurface>>,
    released: bool,
}

impl MediaSession {
    pub fn new(
        controls: Controls,
        status: StatusReceiver,
        playlist: PlaylistReceiver,
        position: PositionReceiver,
    ) -> Self {
        Self {
            controls,
            status,
            playlist,
            position,
            surfaces: Vec::new(),
            released: false,
        }
    }

    pub fn add_surface(&mut self, surface: impl MediaSurface + 'static) {
        self.surfaces.push(Box::new(surface));
    }

    pub fn handle_action(&self, action: RemoteAction) {
        debug!(?action, "remote action");

        match action {
            RemoteAction::Play => self.controls.play(),
            RemoteAction::Pause => self.controls.pause(),
            RemoteAction::PlayPause => self.controls.play_pause(),
            RemoteAction::Next => self.controls.next(),
            RemoteAction::Previous => self.controls.previous(),
            RemoteAction::Stop => self.controls.stop(),
            RemoteAction::SeekTo(time) => self.controls.seek(time),
        }
    }

    pub fn now_playing(&mut self) -> NowPlaying {
        let status = *self.status.borrow_and_update();
        let position = *self.position.borrow_and_update();
        let playlist = self.playlist.borrow_and_update();

        NowPlaying {
            track: playlist.current_track().cloned(),
            index: playlist.current_index(),
            total: playlist.len(),
            status,
            position,
        }
    }

    fn publish(&mut self) {
        let now_playing = self.now_playing();

        if now_playing.status == Status::Stopped {
            if !self.released {
                self.surfaces.iter_mut().for_each(|s| s.release());
                self.released = true;
            }
            return;
        }

        self.released = false;
        for surface in self.surfaces.iter_mut() {
            surface.update(&now_playing);
        }
    }

    pub async fn run(&mut self, mut exit_receiver: ExitReceiver) {
        self.publish();

        loop {
            select! {
                Ok(_) = self.status.changed() => self.publish(),
                Ok(_) = self.playlist.changed() => self.publish(),
                Ok(_) = self.position.changed() => self.publish(),
                Ok(exit) = exit_receiver.recv() => {
                    if exit {
                        break;
                    }
                }
                else => break,
            }
        }
    }
}
