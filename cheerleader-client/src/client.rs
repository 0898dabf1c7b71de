use std::time::Duration;

use cheerleader_models::{ArtistProfile, Comment, Track, User};
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    Result,
    error::{DeserializeSnafu, HttpClientSnafu, InvalidUrlSnafu, RequestSnafu, StatusSnafu},
    offline::OfflineCache,
    simple_cache::SimpleCache,
    soundcloud_models::{CommentResponse, TrackResponse, UserResponse},
};

pub const DEFAULT_BASE_URL: &str = "https://api.soundcloud.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MEMO_TTL: Duration = Duration::from_secs(10 * 60);

const CLIENT_ID_PARAM: &str = "client_id";

pub struct ClientBuilder {
    client_id: String,
    base_url: String,
    timeout: Duration,
    memo_ttl: Duration,
    offline_cache: Option<OfflineCache>,
}

impl ClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn memo_ttl(mut self, ttl: Duration) -> Self {
        self.memo_ttl = ttl;
        self
    }

    pub fn offline_cache(mut self, offline_cache: OfflineCache) -> Self {
        self.offline_cache = Some(offline_cache);
        self
    }

    pub fn build(self) -> Result<Client> {
        let mut base_url = self.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url).context(InvalidUrlSnafu { url: &base_url })?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context(HttpClientSnafu)?;

        Ok(Client {
            http,
            base_url,
            client_id: self.client_id,
            offline_cache: self.offline_cache,
            user_memo: SimpleCache::new(self.memo_ttl),
            tracks_memo: SimpleCache::new(self.memo_ttl),
            comments_memo: SimpleCache::new(self.memo_ttl),
        })
    }
}

/// SoundCloud REST client.
///
/// Every request is signed with the application client id. Successful
/// responses are written to the offline cache when one is configured, and
/// read back from it when the network fails.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
    offline_cache: Option<OfflineCache>,
    user_memo: SimpleCache<u64, User>,
    tracks_memo: SimpleCache<u64, Vec<Track>>,
    comments_memo: SimpleCache<u64, Vec<Comment>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("offline_cache", &self.offline_cache.is_some())
            .finish()
    }
}

impl Client {
    pub fn builder(client_id: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            client_id: client_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            memo_ttl: DEFAULT_MEMO_TTL,
            offline_cache: None,
        }
    }

    pub fn offline_cache(&self) -> Option<&OfflineCache> {
        self.offline_cache.as_ref()
    }

    #[instrument(skip(self))]
    pub async fn user(&self, user_id: u64) -> Result<User> {
        if let Some(user) = self.user_memo.get(&user_id).await {
            return Ok(user);
        }

        let user: User = self
            .get_json::<UserResponse>(&format!("users/{user_id}"))
            .await?
            .into();

        self.user_memo.set(user_id, user.clone()).await;
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn user_tracks(&self, user_id: u64) -> Result<Vec<Track>> {
        if let Some(tracks) = self.tracks_memo.get(&user_id).await {
            return Ok(tracks);
        }

        let tracks: Vec<Track> = self
            .get_json::<Vec<TrackResponse>>(&format!("users/{user_id}/tracks"))
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        self.tracks_memo.set(user_id, tracks.clone()).await;
        Ok(tracks)
    }

    #[instrument(skip(self))]
    pub async fn track(&self, track_id: u64) -> Result<Track> {
        Ok(self
            .get_json::<TrackResponse>(&format!("tracks/{track_id}"))
            .await?
            .into())
    }

    #[instrument(skip(self))]
    pub async fn track_comments(&self, track_id: u64) -> Result<Vec<Comment>> {
        if let Some(comments) = self.comments_memo.get(&track_id).await {
            return Ok(comments);
        }

        let comments: Vec<Comment> = self
            .get_json::<Vec<CommentResponse>>(&format!("tracks/{track_id}/comments"))
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        self.comments_memo.set(track_id, comments.clone()).await;
        Ok(comments)
    }

    pub async fn artist_profile(&self, user_id: u64) -> Result<ArtistProfile> {
        let (user, tracks) = futures::try_join!(self.user(user_id), self.user_tracks(user_id))?;
        Ok(ArtistProfile { user, tracks })
    }

    /// Signed url the audio of `track` can be streamed from.
    pub fn stream_url(&self, track: &Track) -> Option<String> {
        if !track.streamable {
            return None;
        }

        let url = Url::parse(track.stream_url.as_deref()?).ok()?;
        Some(self.sign(url).into())
    }

    pub async fn clear_memo(&self) {
        self.user_memo.clear().await;
        self.tracks_memo.clear().await;
        self.comments_memo.clear().await;
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .context(InvalidUrlSnafu { url: path })
    }

    fn sign(&self, mut url: Url) -> Url {
        url.query_pairs_mut()
            .append_pair(CLIENT_ID_PARAM, &self.client_id);
        url
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let key = url.to_string();

        match self.fetch(self.sign(url), &key).await {
            Ok(body) => {
                let value = serde_json::from_str(&body).context(DeserializeSnafu { url: &key })?;

                if let Some(offline_cache) = &self.offline_cache
                    && let Err(err) = offline_cache.save(&key, &body).await
                {
                    warn!(url = %key, %err, "unable to save response for offline use");
                }

                Ok(value)
            }
            Err(err) => {
                let Some(offline_cache) = &self.offline_cache else {
                    return Err(err);
                };

                match offline_cache.get(&key).await {
                    Ok(Some(cached)) => {
                        warn!(
                            url = %key,
                            %err,
                            updated_at = cached.updated_at,
                            "request failed, using offline copy"
                        );
                        serde_json::from_str(&cached.body).context(DeserializeSnafu { url: &key })
                    }
                    Ok(None) => Err(err),
                    Err(cache_err) => {
                        warn!(url = %key, err = %cache_err, "unable to read offline cache");
                        Err(err)
                    }
                }
            }
        }
    }

    async fn fetch(&self, url: Url, key: &str) -> Result<String> {
        debug!(url = %key, "GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context(RequestSnafu { url: key })?;

        let status = response.status();
        if !status.is_success() {
            return StatusSnafu {
                url: key,
                status: status.as_u16(),
            }
            .fail();
        }

        response.text().await.context(RequestSnafu { url: key })
    }
}
