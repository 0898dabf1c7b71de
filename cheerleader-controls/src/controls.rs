use std::time::Duration;

use cheerleader_models::Track;

#[derive(Debug)]
pub enum ControlCommand {
    Artist {
        user_id: u64,
        index: usize,
        shuffle: bool,
    },
    Tracks {
        tracks: Vec<Track>,
        index: usize,
    },
    AddTrack {
        track: Box<Track>,
        play_now: bool,
    },
    AddTracks {
        tracks: Vec<Track>,
    },
    RemoveIndex {
        index: usize,
    },
    SkipTo {
        index: usize,
    },
    ClearPlaylist,
    Next,
    Previous,
    PlayPause,
    Play,
    Pause,
    Stop,
    JumpForward,
    JumpBackward,
    Seek {
        time: Duration,
    },
    SetVolume {
        volume: f32,
    },
}

/// Handle posting commands on the player work queue.
#[derive(Debug, Clone)]
pub struct Controls {
    tx: tokio::sync::mpsc::UnboundedSender<ControlCommand>,
}

impl Controls {
    pub fn new(tx: tokio::sync::mpsc::UnboundedSender<ControlCommand>) -> Self {
        Self { tx }
    }

    fn send(&self, command: ControlCommand) {
        self.tx.send(command).expect("infallible");
    }

    pub fn next(&self) {
        self.send(ControlCommand::Next);
    }

    pub fn previous(&self) {
        self.send(ControlCommand::Previous);
    }

    pub fn play_pause(&self) {
        self.send(ControlCommand::PlayPause);
    }

    pub fn play(&self) {
        self.send(ControlCommand::Play);
    }

    pub fn pause(&self) {
        self.send(ControlCommand::Pause);
    }

    pub fn stop(&self) {
        self.send(ControlCommand::Stop);
    }

    pub fn play_artist(&self, user_id: u64, index: usize, shuffle: bool) {
        self.send(ControlCommand::Artist {
            user_id,
            index,
            shuffle,
        });
    }

    pub fn play_tracks(&self, tracks: Vec<Track>, index: usize) {
        self.send(ControlCommand::Tracks { tracks, index });
    }

    pub fn add_track(&self, track: Track, play_now: bool) {
        self.send(ControlCommand::AddTrack {
            track: Box::new(track),
            play_now,
        });
    }

    pub fn add_tracks(&self, tracks: Vec<Track>) {
        self.send(ControlCommand::AddTracks { tracks });
    }

    pub fn remove_index(&self, index: usize) {
        self.send(ControlCommand::RemoveIndex { index });
    }

    pub fn skip_to(&self, index: usize) {
        self.send(ControlCommand::SkipTo { index });
    }

    pub fn clear_playlist(&self) {
        self.send(ControlCommand::ClearPlaylist);
    }

    pub fn set_volume(&self, volume: f32) {
        self.send(ControlCommand::SetVolume { volume });
    }

    pub fn seek(&self, time: Duration) {
        self.send(ControlCommand::Seek { time });
    }

    pub fn jump_forward(&self) {
        self.send(ControlCommand::JumpForward);
    }

    pub fn jump_backward(&self) {
        self.send(ControlCommand::JumpBackward);
    }
}
