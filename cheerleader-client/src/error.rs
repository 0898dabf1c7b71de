use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to build http client: {source}"))]
    HttpClient { source: reqwest::Error },

    #[snafu(display("Invalid url {url}: {source}"))]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[snafu(display("Request to {url} failed: {source}"))]
    Request { url: String, source: reqwest::Error },

    #[snafu(display("Request to {url} failed with status {status}"))]
    Status { url: String, status: u16 },

    #[snafu(display("Unable to parse response from {url}: {source}"))]
    Deserialize {
        url: String,
        source: serde_json::Error,
    },

    #[snafu(display("Offline cache failure: {source}"))]
    OfflineCache { source: sqlx::Error },

    #[snafu(display("Unable to migrate offline cache: {source}"))]
    Migration {
        source: sqlx::migrate::MigrateError,
    },
}

impl Error {
    /// Failures caused by the network or the remote end, as opposed to
    /// malformed data or local misconfiguration.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Request { .. } | Error::Status { .. })
    }
}
