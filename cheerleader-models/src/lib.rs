use std::time::Duration;

#[derive(Default, Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub permalink: Option<String>,
    pub permalink_url: Option<String>,
    pub avatar_url: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub track_count: u32,
    pub followers_count: u32,
    pub followings_count: u32,
    pub public_favorites_count: u32,
}

impl User {
    pub fn avatar(&self, size: ArtworkSize) -> Option<String> {
        self.avatar_url.as_deref().map(|url| size.apply(url))
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub created_at: Option<String>,
    pub duration_ms: u64,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub permalink_url: Option<String>,
    pub artwork_url: Option<String>,
    pub waveform_url: Option<String>,
    pub stream_url: Option<String>,
    pub streamable: bool,
    pub playback_count: u64,
    pub favoritings_count: u64,
    pub comment_count: u64,
    pub user: Option<User>,
}

impl Track {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn artist_name(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.username.as_str())
    }

    /// Artwork of the track in the requested size.
    ///
    /// Tracks uploaded without artwork fall back to the uploader's avatar.
    pub fn artwork(&self, size: ArtworkSize) -> Option<String> {
        match &self.artwork_url {
            Some(url) => Some(size.apply(url)),
            None => self.user.as_ref().and_then(|user| user.avatar(size)),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: u64,
    pub body: String,
    pub created_at: Option<String>,
    pub timestamp_ms: Option<u64>,
    pub track_id: u64,
    pub user: Option<User>,
}

impl Comment {
    /// Position in the track the comment was posted at.
    pub fn position(&self) -> Option<Duration> {
        self.timestamp_ms.map(Duration::from_millis)
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ArtistProfile {
    pub user: User,
    pub tracks: Vec<Track>,
}

/// Image sizes served by the SoundCloud CDN.
///
/// API responses always reference the `large` variant, other sizes are
/// obtained by swapping the size token in the url.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum ArtworkSize {
    Mini,
    Tiny,
    Small,
    Badge,
    T67,
    #[default]
    Large,
    T300,
    Crop,
    T500,
}

const LARGE_TOKEN: &str = "large";

impl ArtworkSize {
    pub fn token(&self) -> &'static str {
        match self {
            ArtworkSize::Mini => "mini",
            ArtworkSize::Tiny => "tiny",
            ArtworkSize::Small => "small",
            ArtworkSize::Badge => "badge",
            ArtworkSize::T67 => "t67x67",
            ArtworkSize::Large => LARGE_TOKEN,
            ArtworkSize::T300 => "t300x300",
            ArtworkSize::Crop => "crop",
            ArtworkSize::T500 => "t500x500",
        }
    }

    pub fn pixels(&self) -> u32 {
        match self {
            ArtworkSize::Mini => 16,
            ArtworkSize::Tiny => 20,
            ArtworkSize::Small => 32,
            ArtworkSize::Badge => 47,
            ArtworkSize::T67 => 67,
            ArtworkSize::Large => 100,
            ArtworkSize::T300 => 300,
            ArtworkSize::Crop => 400,
            ArtworkSize::T500 => 500,
        }
    }

    fn apply(&self, url: &str) -> String {
        let needle = format!("-{LARGE_TOKEN}.");

        match url.rfind(&needle) {
            Some(start) => format!(
                "{}-{}.{}",
                &url[..start],
                self.token(),
                &url[start + needle.len()..]
            ),
            None => url.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_avatar() -> User {
        User {
            id: 3,
            username: "artist".to_string(),
            avatar_url: Some("https://i1.sndcdn.com/avatars-000-abc-large.jpg".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn artwork_swaps_size_token() {
        let track = Track {
            artwork_url: Some("https://i1.sndcdn.com/artworks-000-large.jpg?e76cf77".to_string()),
            ..Default::default()
        };

        assert_eq!(
            track.artwork(ArtworkSize::T500).as_deref(),
            Some("https://i1.sndcdn.com/artworks-000-t500x500.jpg?e76cf77")
        );
        assert_eq!(
            track.artwork(ArtworkSize::Large),
            track.artwork_url.clone()
        );
    }

    #[test]
    fn artwork_falls_back_to_avatar() {
        let track = Track {
            user: Some(user_with_avatar()),
            ..Default::default()
        };

        assert_eq!(
            track.artwork(ArtworkSize::Badge).as_deref(),
            Some("https://i1.sndcdn.com/avatars-000-abc-badge.jpg")
        );
        assert_eq!(Track::default().artwork(ArtworkSize::Badge), None);
    }

    #[test]
    fn unknown_artwork_layout_is_kept() {
        let user = User {
            avatar_url: Some("https://a1.sndcdn.com/images/default_avatar.png".to_string()),
            ..Default::default()
        };

        assert_eq!(
            user.avatar(ArtworkSize::T300).as_deref(),
            Some("https://a1.sndcdn.com/images/default_avatar.png")
        );
    }

    #[test]
    fn comment_position() {
        let comment = Comment {
            timestamp_ms: Some(61_500),
            ..Default::default()
        };
        assert_eq!(comment.position(), Some(Duration::from_millis(61_500)));
    }
}
