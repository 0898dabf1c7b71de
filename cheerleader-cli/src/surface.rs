use cheerleader_controls::{
    Status,
    media_session::{MediaSurface, NowPlaying},
};
use tracing::info;

use crate::format_duration;

/// Logs a line whenever the playing track or the status changes.
#[derive(Debug, Default)]
pub(crate) struct StatusLine {
    last: Option<(Option<u64>, Status)>,
}

impl MediaSurface for StatusLine {
    fn update(&mut self, now_playing: &NowPlaying) {
        let key = (
            now_playing.track.as_ref().map(|track| track.id),
            now_playing.status,
        );
        if self.last == Some(key) {
            return;
        }
        self.last = Some(key);

        let Some(track) = &now_playing.track else {
            info!(status = ?now_playing.status, "nothing selected");
            return;
        };

        info!(
            status = ?now_playing.status,
            position = %format_duration(now_playing.position),
            track = now_playing.index.map(|index| index + 1).unwrap_or_default(),
            of = now_playing.total,
            "{} - {} [{}]",
            track.artist_name().unwrap_or("unknown"),
            track.title,
            format_duration(track.duration()),
        );
    }

    fn release(&mut self) {
        self.last = None;
        info!("stopped");
    }
}
