use crate::{error::Error, playlist::Playlist};

use std::time::Duration;
use tokio::sync::{broadcast, watch};

pub use cheerleader_client::client::Client;
pub use cheerleader_models as models;

pub mod controls;
pub mod database;
pub mod error;
pub mod events;
pub mod media_session;
pub mod notification;
pub mod player;
pub mod playlist;
pub mod sink;
pub mod timer;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type PositionReceiver = watch::Receiver<Duration>;
pub type VolumeReceiver = watch::Receiver<f32>;
pub type StatusReceiver = watch::Receiver<Status>;
pub type PlaylistReceiver = watch::Receiver<Playlist>;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Status {
    Playing,
    Buffering,
    #[default]
    Paused,
    /// Output released, nothing is loaded.
    Stopped,
}

pub type ExitReceiver = broadcast::Receiver<bool>;
pub type ExitSender = broadcast::Sender<bool>;
