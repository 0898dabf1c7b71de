use cheerleader_models::Track;
use tokio::{
    select,
    sync::{
        broadcast, mpsc,
        watch::{self, Receiver, Sender},
    },
    time::Instant,
};
use tracing::{debug, info};

use crate::{
    ExitReceiver, PlaylistReceiver, PositionReceiver, Result, Status, StatusReceiver,
    VolumeReceiver,
    controls::{ControlCommand, Controls},
    database::Database,
    error::Error,
    events::{EventBroadcast, PlayerEvent},
    notification::NotificationBroadcast,
    playlist::Playlist,
    sink::Output,
    timer::Timer,
};
use cheerleader_client::Client;
use std::{sync::Arc, time::Duration};

const INTERVAL_MS: u64 = 500;
const JUMP: Duration = Duration::from_secs(10);
/// A player paused for this long releases its output.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Player<O> {
    broadcast: Arc<NotificationBroadcast>,
    events: EventBroadcast,
    playlist: Sender<Playlist>,
    target_status: Sender<Status>,
    client: Arc<Client>,
    output: O,
    volume: Sender<f32>,
    position_timer: Timer,
    position: Sender<Duration>,
    done_buffering: Receiver<()>,
    load_failed: Receiver<()>,
    controls_rx: mpsc::UnboundedReceiver<ControlCommand>,
    controls: Controls,
    database: Arc<Database>,
    loaded_track: Option<u64>,
    paused_since: Option<Instant>,
}

impl<O: Output> Player<O> {
    pub fn new(
        mut output: O,
        playlist: Playlist,
        client: Arc<Client>,
        volume: f32,
        broadcast: Arc<NotificationBroadcast>,
        database: Arc<Database>,
    ) -> Self {
        output.set_volume(volume);
        let done_buffering = output.done_buffering();
        let load_failed = output.load_failed();

        let (volume, _) = watch::channel(volume);
        let (position, _) = watch::channel(Default::default());
        let (target_status, _) = watch::channel(Default::default());
        let (playlist, _) = watch::channel(playlist);

        let (controls_tx, controls_rx) = tokio::sync::mpsc::unbounded_channel();
        let controls = Controls::new(controls_tx);

        Self {
            broadcast,
            events: EventBroadcast::new(),
            playlist,
            controls_rx,
            controls,
            target_status,
            client,
            output,
            volume,
            position_timer: Default::default(),
            position,
            done_buffering,
            load_failed,
            database,
            loaded_track: None,
            paused_since: None,
        }
    }

    pub fn controls(&self) -> Controls {
        self.controls.clone()
    }

    pub fn status(&self) -> StatusReceiver {
        self.target_status.subscribe()
    }

    pub fn volume(&self) -> VolumeReceiver {
        self.volume.subscribe()
    }

    pub fn position(&self) -> PositionReceiver {
        self.position.subscribe()
    }

    pub fn playlist(&self) -> PlaylistReceiver {
        self.playlist.subscribe()
    }

    /// Registers a listener for player transitions.
    pub fn events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    fn current(&self) -> Option<(usize, Track)> {
        let playlist = self.playlist.borrow();
        Some((playlist.current_index()?, playlist.current_track()?.clone()))
    }

    fn set_target_status(&self, status: Status) {
        self.target_status.send_replace(status);
    }

    fn publish_position(&self) {
        self.position.send_replace(self.position_timer.elapsed());
    }

    async fn broadcast_playlist(&self, playlist: Playlist) -> Result<()> {
        self.database.set_playlist(&playlist).await?;
        self.playlist.send_replace(playlist);
        Ok(())
    }

    fn load(&mut self, track: &Track) -> Result<()> {
        let url = self
            .client
            .stream_url(track)
            .ok_or(Error::NotStreamable { id: track.id })?;

        debug!(track = track.id, "loading");

        self.position_timer.stop();
        self.publish_position();
        self.paused_since = None;
        self.loaded_track = None;

        self.set_target_status(Status::Buffering);
        self.events.send(PlayerEvent::BufferingStarted);

        if let Err(err) = self.output.load(url) {
            self.stop();
            return Err(err);
        }

        self.loaded_track = Some(track.id);
        Ok(())
    }

    fn start(&mut self) {
        self.set_target_status(Status::Playing);
        self.output.play();
        self.position_timer.start();
        self.publish_position();
        self.paused_since = None;

        if let Some((index, track)) = self.current() {
            info!(track = track.id, title = %track.title, "playing");
            self.events.send(PlayerEvent::Playing {
                track: Box::new(track),
                index,
            });
        }
    }

    fn play(&mut self) -> Result<()> {
        let Some((_, track)) = self.current() else {
            self.broadcast
                .send_warning("Nothing to play, the playlist is empty".to_string());
            return Ok(());
        };

        if self.loaded_track == Some(track.id) {
            self.start();
        } else {
            self.load(&track)?;
        }

        Ok(())
    }

    fn pause(&mut self) {
        self.set_target_status(Status::Paused);
        self.output.pause();
        self.position_timer.pause();
        self.publish_position();
        self.paused_since = Some(Instant::now());
        self.events.send(PlayerEvent::Paused);
    }

    fn play_pause(&mut self) -> Result<()> {
        let target_status = *self.target_status.borrow();

        match target_status {
            Status::Playing | Status::Buffering => self.pause(),
            Status::Paused | Status::Stopped => self.play()?,
        }

        Ok(())
    }

    fn stop(&mut self) {
        self.output.clear();
        self.loaded_track = None;
        self.position_timer.stop();
        self.publish_position();
        self.paused_since = None;
        self.set_target_status(Status::Stopped);
        self.events.send(PlayerEvent::Stopped);
    }

    /// Starts the track under the playlist cursor from the beginning.
    fn play_current(&mut self) -> Result<()> {
        match self.current() {
            Some((_, track)) => self.load(&track),
            None => {
                self.stop();
                Ok(())
            }
        }
    }

    fn seek(&mut self, time: Duration) -> Result<()> {
        let duration = self.current().map(|(_, track)| track.duration());
        let time = match duration {
            Some(duration) if !duration.is_zero() => time.min(duration),
            _ => time,
        };

        self.output.seek(time)?;
        self.position_timer.set_time(time);
        self.publish_position();
        self.events.send(PlayerEvent::SeekTo(time));
        Ok(())
    }

    fn jump_forward(&mut self) -> Result<()> {
        let next_position = self.position_timer.elapsed() + JUMP;
        self.seek(next_position)
    }

    fn jump_backward(&mut self) -> Result<()> {
        let position = self.position_timer.elapsed().saturating_sub(JUMP);
        self.seek(position)
    }

    async fn set_volume(&mut self, volume: f32) -> Result<()> {
        let volume = volume.clamp(0.0, 1.0);
        self.volume.send_replace(volume);
        self.output.set_volume(volume);
        self.database.set_volume(volume).await?;
        Ok(())
    }

    async fn next(&mut self) -> Result<()> {
        let mut playlist = self.playlist.borrow().clone();
        if playlist.next().is_none() {
            return Ok(());
        }

        self.broadcast_playlist(playlist).await?;
        self.play_current()
    }

    async fn previous(&mut self) -> Result<()> {
        let mut playlist = self.playlist.borrow().clone();
        if playlist.previous().is_none() {
            return Ok(());
        }

        self.broadcast_playlist(playlist).await?;
        self.play_current()
    }

    async fn skip_to(&mut self, index: usize) -> Result<()> {
        let mut playlist = self.playlist.borrow().clone();
        if playlist.skip_to(index).is_none() {
            return Err(Error::InvalidIndex { index });
        }

        self.broadcast_playlist(playlist).await?;
        self.play_current()
    }

    async fn play_tracks(&mut self, tracks: Vec<Track>, index: usize) -> Result<()> {
        let mut playlist = Playlist::from_tracks(tracks);
        if playlist.skip_to(index).is_none() {
            return Err(Error::InvalidIndex { index });
        }

        self.broadcast_playlist(playlist).await?;
        self.play_current()
    }

    async fn play_artist(&mut self, user_id: u64, index: usize, shuffle: bool) -> Result<()> {
        let tracks = self.client.user_tracks(user_id).await?;

        let unstreamable_tracks_to_index = tracks
            .iter()
            .take(index)
            .filter(|t| !t.streamable)
            .count();

        let mut playlist =
            Playlist::from_tracks(tracks.into_iter().filter(|t| t.streamable).collect());
        if playlist
            .skip_to(index - unstreamable_tracks_to_index)
            .is_none()
        {
            return Err(Error::InvalidIndex { index });
        }

        if shuffle {
            playlist.shuffle();
        }

        self.broadcast_playlist(playlist).await?;
        self.play_current()
    }

    async fn add_track(&mut self, track: Track, play_now: bool) -> Result<()> {
        let mut playlist = self.playlist.borrow().clone();

        let position = match playlist.position_of(track.id) {
            Some(position) if play_now => position,
            _ => {
                playlist.add(track.clone());
                self.events.send(PlayerEvent::TrackAdded(Box::new(track)));
                playlist.len() - 1
            }
        };

        if !play_now {
            return self.broadcast_playlist(playlist).await;
        }

        playlist.skip_to(position);
        self.broadcast_playlist(playlist).await?;
        self.play_current()
    }

    async fn add_tracks(&mut self, tracks: Vec<Track>) -> Result<()> {
        let mut playlist = self.playlist.borrow().clone();

        for track in tracks {
            playlist.add(track.clone());
            self.events.send(PlayerEvent::TrackAdded(Box::new(track)));
        }

        self.broadcast_playlist(playlist).await
    }

    async fn remove_index(&mut self, index: usize) -> Result<()> {
        let mut playlist = self.playlist.borrow().clone();
        let was_current = playlist.current_index() == Some(index);

        let track = playlist
            .remove(index)
            .ok_or(Error::InvalidIndex { index })?;
        self.events.send(PlayerEvent::TrackRemoved {
            track: Box::new(track),
            index,
        });

        let emptied = playlist.is_empty();
        self.broadcast_playlist(playlist).await?;

        if emptied {
            self.stop();
        } else if was_current {
            let status = *self.target_status.borrow();
            match status {
                Status::Playing | Status::Buffering => self.play_current()?,
                Status::Paused | Status::Stopped => {
                    self.output.clear();
                    self.loaded_track = None;
                    self.position_timer.stop();
                    self.publish_position();
                }
            }
        }

        Ok(())
    }

    async fn clear_playlist(&mut self) -> Result<()> {
        self.broadcast_playlist(Playlist::new()).await?;
        self.stop();
        Ok(())
    }

    async fn tick(&mut self) -> Result<()> {
        let status = *self.target_status.borrow();

        if status == Status::Paused
            && self.loaded_track.is_some()
            && self
                .paused_since
                .is_some_and(|since| since.elapsed() >= IDLE_TIMEOUT)
        {
            info!("paused for too long, releasing output");
            self.stop();
            self.broadcast
                .send_info("Paused for too long, audio output released".to_string());
            return Ok(());
        }

        if status != Status::Playing {
            return Ok(());
        }

        let position = self.position_timer.elapsed();
        self.position.send_replace(position);
        self.events.send(PlayerEvent::Progress(position));

        let duration = self.current().map(|(_, track)| track.duration());

        if let Some(duration) = duration
            && !duration.is_zero()
            && position >= duration
        {
            self.track_finished().await?;
        }

        Ok(())
    }

    async fn track_finished(&mut self) -> Result<()> {
        debug!("track finished");
        self.next().await
    }

    fn done_buffering(&mut self) {
        self.events.send(PlayerEvent::BufferingEnded);

        let status = *self.target_status.borrow();
        match status {
            Status::Buffering => self.start(),
            Status::Paused => self.output.pause(),
            Status::Playing | Status::Stopped => {}
        }
    }

    /// The output gave up on the stream it was buffering.
    fn load_failed(&mut self) {
        let status = *self.target_status.borrow();
        if status == Status::Buffering {
            info!("stream unavailable, stopping");
            self.stop();
        }
    }

    async fn handle_message(&mut self, command: ControlCommand) -> Result<()> {
        match command {
            ControlCommand::Artist {
                user_id,
                index,
                shuffle,
            } => {
                self.play_artist(user_id, index, shuffle).await?;
            }
            ControlCommand::Tracks { tracks, index } => {
                self.play_tracks(tracks, index).await?;
            }
            ControlCommand::AddTrack { track, play_now } => {
                self.add_track(*track, play_now).await?;
            }
            ControlCommand::AddTracks { tracks } => {
                self.add_tracks(tracks).await?;
            }
            ControlCommand::RemoveIndex { index } => {
                self.remove_index(index).await?;
            }
            ControlCommand::SkipTo { index } => {
                self.skip_to(index).await?;
            }
            ControlCommand::ClearPlaylist => {
                self.clear_playlist().await?;
            }
            ControlCommand::Next => {
                self.next().await?;
            }
            ControlCommand::Previous => {
                self.previous().await?;
            }
            ControlCommand::PlayPause => {
                self.play_pause()?;
            }
            ControlCommand::Play => {
                self.play()?;
            }
            ControlCommand::Pause => {
                self.pause();
            }
            ControlCommand::Stop => {
                self.stop();
            }
            ControlCommand::JumpForward => {
                self.jump_forward()?;
            }
            ControlCommand::JumpBackward => {
                self.jump_backward()?;
            }
            ControlCommand::Seek { time } => {
                self.seek(time)?;
            }
            ControlCommand::SetVolume { volume } => {
                self.set_volume(volume).await?;
            }
        }
        Ok(())
    }

    pub async fn player_loop(&mut self, mut exit_receiver: ExitReceiver) -> Result<()> {
        let mut interval = tokio::time::interval(Duration::from_millis(INTERVAL_MS));

        loop {
            select! {
                _ = interval.tick() => {
                    if let Err(err) = self.tick().await {
                        self.broadcast.send_error(format!("{err}"));
                    };
                }

                Some(command) = self.controls_rx.recv() => {
                    if let Err(err) = self.handle_message(command).await {
                        self.broadcast.send_error(format!("{err}"));
                    };
                }

                Ok(_) = self.done_buffering.changed() => {
                    self.done_buffering.borrow_and_update();
                    self.done_buffering();
                }

                Ok(_) = self.load_failed.changed() => {
                    self.load_failed.borrow_and_update();
                    self.load_failed();
                }

                Ok(exit) = exit_receiver.recv() => {
                    if exit {
                        self.stop();
                        break Ok(());
                    }
                }
            }
        }
    }
}
