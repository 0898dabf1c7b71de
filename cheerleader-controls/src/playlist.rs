use cheerleader_models::Track;
use rand::seq::SliceRandom;

/// Ordered tracks with a cursor on the current one.
///
/// The cursor is `None` exactly when the playlist is empty. Navigation wraps
/// around at both ends.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let current = (!tracks.is_empty()).then_some(0);
        Self { tracks, current }
    }

    /// Rebuilds a persisted playlist, repairing a cursor that does not fit.
    pub fn restore(tracks: Vec<Track>, current: Option<usize>) -> Self {
        let current = match current {
            _ if tracks.is_empty() => None,
            Some(index) if index < tracks.len() => Some(index),
            _ => Some(0),
        };
        Self { tracks, current }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|index| self.tracks.get(index))
    }

    pub fn position_of(&self, track_id: u64) -> Option<usize> {
        self.tracks.iter().position(|track| track.id == track_id)
    }

    pub fn add(&mut self, track: Track) {
        self.tracks.push(track);
        if self.current.is_none() {
            self.current = Some(0);
        }
    }

    pub fn add_all(&mut self, tracks: impl IntoIterator<Item = Track>) {
        for track in tracks {
            self.add(track);
        }
    }

    /// Inserts `track` at `position`, clamped to the end of the playlist.
    /// The current track stays current.
    pub fn insert(&mut self, position: usize, track: Track) -> usize {
        let position = position.min(self.tracks.len());
        self.tracks.insert(position, track);

        self.current = match self.current {
            Some(current) if position <= current => Some(current + 1),
            Some(current) => Some(current),
            None => Some(0),
        };

        position
    }

    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }

        let removed = self.tracks.remove(index);

        self.current = match self.current {
            _ if self.tracks.is_empty() => None,
            Some(current) if index < current => Some(current - 1),
            Some(current) if index == current && current >= self.tracks.len() => Some(0),
            current => current,
        };

        Some(removed)
    }

    pub fn next(&mut self) -> Option<&Track> {
        let current = self.current?;
        let next = (current + 1) % self.tracks.len();
        self.current = Some(next);
        self.tracks.get(next)
    }

    pub fn previous(&mut self) -> Option<&Track> {
        let current = self.current?;
        let len = self.tracks.len();
        let previous = (current + len - 1) % len;
        self.current = Some(previous);
        self.tracks.get(previous)
    }

    pub fn skip_to(&mut self, index: usize) -> Option<&Track> {
        if index >= self.tracks.len() {
            return None;
        }

        self.current = Some(index);
        self.tracks.get(index)
    }

    /// Shuffles the playlist, the current track moves to the front.
    pub fn shuffle(&mut self) {
        let Some(current) = self.current else {
            return;
        };

        let current_track = self.tracks.remove(current);
        self.tracks.shuffle(&mut rand::rng());
        self.tracks.insert(0, current_track);
        self.current = Some(0);
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: u64) -> Track {
        Track {
            id,
            title: format!("track {id}"),
            ..Default::default()
        }
    }

    fn playlist(ids: &[u64]) -> Playlist {
        Playlist::from_tracks(ids.iter().copied().map(track).collect())
    }

    fn ids(playlist: &Playlist) -> Vec<u64> {
        playlist.tracks().iter().map(|t| t.id).collect()
    }

    #[test]
    fn empty_playlist_has_no_cursor() {
        let mut playlist = Playlist::new();

        assert_eq!(playlist.current_index(), None);
        assert!(playlist.next().is_none());
        assert!(playlist.previous().is_none());
        assert!(playlist.remove(0).is_none());
    }

    #[test]
    fn first_added_track_becomes_current() {
        let mut playlist = Playlist::new();
        playlist.add(track(1));
        playlist.add(track(2));

        assert_eq!(playlist.current_index(), Some(0));
        assert_eq!(playlist.current_track().map(|t| t.id), Some(1));
    }

    #[test]
    fn next_and_previous_wrap_around() {
        let mut playlist = playlist(&[1, 2, 3]);

        assert_eq!(playlist.previous().map(|t| t.id), Some(3));
        assert_eq!(playlist.next().map(|t| t.id), Some(1));
        assert_eq!(playlist.next().map(|t| t.id), Some(2));
        assert_eq!(playlist.next().map(|t| t.id), Some(3));
        assert_eq!(playlist.next().map(|t| t.id), Some(1));
    }

    #[test]
    fn insert_before_cursor_keeps_current_track() {
        let mut playlist = playlist(&[1, 2, 3]);
        playlist.skip_to(1);

        playlist.insert(0, track(9));

        assert_eq!(ids(&playlist), vec![9, 1, 2, 3]);
        assert_eq!(playlist.current_track().map(|t| t.id), Some(2));

        assert_eq!(playlist.insert(42, track(10)), 4);
        assert_eq!(playlist.current_track().map(|t| t.id), Some(2));
    }

    #[test]
    fn remove_before_cursor_shifts_it() {
        let mut playlist = playlist(&[1, 2, 3]);
        playlist.skip_to(2);

        assert_eq!(playlist.remove(0).map(|t| t.id), Some(1));
        assert_eq!(playlist.current_index(), Some(1));
        assert_eq!(playlist.current_track().map(|t| t.id), Some(3));
    }

    #[test]
    fn remove_current_selects_following_track() {
        let mut playlist = playlist(&[1, 2, 3]);
        playlist.skip_to(1);

        playlist.remove(1);
        assert_eq!(playlist.current_track().map(|t| t.id), Some(3));

        playlist.remove(1);
        assert_eq!(playlist.current_track().map(|t| t.id), Some(1));

        playlist.remove(0);
        assert!(playlist.is_empty());
        assert_eq!(playlist.current_index(), None);
    }

    #[test]
    fn remove_after_cursor_keeps_it() {
        let mut playlist = playlist(&[1, 2, 3]);

        assert!(playlist.remove(5).is_none());
        playlist.remove(2);

        assert_eq!(playlist.current_index(), Some(0));
        assert_eq!(ids(&playlist), vec![1, 2]);
    }

    #[test]
    fn skip_to_out_of_range_is_ignored() {
        let mut playlist = playlist(&[1, 2]);

        assert!(playlist.skip_to(2).is_none());
        assert_eq!(playlist.current_index(), Some(0));
    }

    #[test]
    fn shuffle_keeps_current_track_first() {
        let mut playlist = playlist(&[1, 2, 3, 4, 5, 6]);
        playlist.skip_to(3);

        playlist.shuffle();

        assert_eq!(playlist.current_index(), Some(0));
        assert_eq!(playlist.current_track().map(|t| t.id), Some(4));

        let mut sorted = ids(&playlist);
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn restore_repairs_cursor() {
        assert_eq!(
            Playlist::restore(vec![track(1), track(2)], Some(5)).current_index(),
            Some(0)
        );
        assert_eq!(
            Playlist::restore(vec![track(1), track(2)], Some(1)).current_index(),
            Some(1)
        );
        assert_eq!(Playlist::restore(vec![], Some(1)).current_index(), None);
    }
}
