use cheerleader_models::{Comment, Track, User};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct UserResponse {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    pub permalink: Option<String>,
    pub permalink_url: Option<String>,
    pub avatar_url: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub track_count: Option<u32>,
    pub followers_count: Option<u32>,
    pub followings_count: Option<u32>,
    pub public_favorites_count: Option<u32>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrackResponse {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub created_at: Option<String>,
    pub duration: Option<u64>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub permalink_url: Option<String>,
    pub artwork_url: Option<String>,
    pub waveform_url: Option<String>,
    pub stream_url: Option<String>,
    pub streamable: Option<bool>,
    pub playback_count: Option<u64>,
    pub favoritings_count: Option<u64>,
    pub likes_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub user: Option<UserResponse>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CommentResponse {
    pub id: u64,
    #[serde(default)]
    pub body: String,
    pub created_at: Option<String>,
    pub timestamp: Option<u64>,
    pub track_id: u64,
    pub user: Option<UserResponse>,
}

impl From<UserResponse> for User {
    fn from(s: UserResponse) -> Self {
        Self {
            id: s.id,
            username: s.username,
            permalink: s.permalink,
            permalink_url: s.permalink_url,
            avatar_url: s.avatar_url,
            full_name: s.full_name.filter(|name| !name.is_empty()),
            description: s.description,
            city: s.city,
            country: s.country,
            track_count: s.track_count.unwrap_or_default(),
            followers_count: s.followers_count.unwrap_or_default(),
            followings_count: s.followings_count.unwrap_or_default(),
            public_favorites_count: s.public_favorites_count.unwrap_or_default(),
        }
    }
}

impl From<TrackResponse> for Track {
    fn from(s: TrackResponse) -> Self {
        Self {
            id: s.id,
            title: s.title,
            created_at: s.created_at,
            duration_ms: s.duration.unwrap_or_default(),
            genre: s.genre.filter(|genre| !genre.is_empty()),
            description: s.description,
            permalink_url: s.permalink_url,
            artwork_url: s.artwork_url,
            waveform_url: s.waveform_url,
            streamable: s.streamable.unwrap_or(s.stream_url.is_some()),
            stream_url: s.stream_url,
            playback_count: s.playback_count.unwrap_or_default(),
            favoritings_count: s.favoritings_count.or(s.likes_count).unwrap_or_default(),
            comment_count: s.comment_count.unwrap_or_default(),
            user: s.user.map(Into::into),
        }
    }
}

impl From<CommentResponse> for Comment {
    fn from(s: CommentResponse) -> Self {
        Self {
            id: s.id,
            body: s.body,
            created_at: s.created_at,
            timestamp_ms: s.timestamp,
            track_id: s.track_id,
            user: s.user.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_from_api_payload() {
        let payload = r#"{
            "kind": "track",
            "id": 13158665,
            "created_at": "2011/04/06 15:37:43 +0000",
            "duration": 18109,
            "title": "Munching at Tiannas house",
            "genre": "",
            "streamable": true,
            "stream_url": "https://api.soundcloud.com/tracks/13158665/stream",
            "artwork_url": null,
            "playback_count": 1202,
            "favoritings_count": null,
            "likes_count": 14,
            "comment_count": 3,
            "user": {
                "id": 3699101,
                "username": "alex.stevenson",
                "avatar_url": "https://i1.sndcdn.com/avatars-000004193858-jnf2pd-large.jpg",
                "full_name": ""
            }
        }"#;

        let track: Track = serde_json::from_str::<TrackResponse>(payload)
            .unwrap()
            .into();

        assert_eq!(track.id, 13158665);
        assert_eq!(track.duration_ms, 18109);
        assert_eq!(track.genre, None);
        assert_eq!(track.favoritings_count, 14);
        assert!(track.streamable);

        let user = track.user.unwrap();
        assert_eq!(user.username, "alex.stevenson");
        assert_eq!(user.full_name, None);
        assert_eq!(user.track_count, 0);
    }

    #[test]
    fn track_without_stream_is_not_streamable() {
        let track: Track = serde_json::from_str::<TrackResponse>(r#"{"id": 1, "title": "demo"}"#)
            .unwrap()
            .into();

        assert!(!track.streamable);
        assert_eq!(track.user, None);
    }

    #[test]
    fn comment_from_api_payload() {
        let payload = r#"{
            "id": 207,
            "body": "nice",
            "timestamp": 1200,
            "track_id": 13158665,
            "user": { "id": 5, "username": "listener" }
        }"#;

        let comment: Comment = serde_json::from_str::<CommentResponse>(payload)
            .unwrap()
            .into();

        assert_eq!(comment.timestamp_ms, Some(1200));
        assert_eq!(comment.user.map(|u| u.username).as_deref(), Some("listener"));
    }
}
