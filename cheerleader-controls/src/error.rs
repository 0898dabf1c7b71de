use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{source}"))]
    Client { source: cheerleader_client::Error },

    #[snafu(display("Unable to open audio output: {source}"))]
    StreamOpen { source: rodio::StreamError },

    #[snafu(display("Unable to list audio devices: {source}"))]
    Devices { source: rodio::cpal::DevicesError },

    #[snafu(display("Unable to seek: {source}"))]
    Seek { source: rodio::source::SeekError },

    #[snafu(display("Database error: {source}"))]
    Database { source: sqlx::Error },

    #[snafu(display("Unable to migrate database: {source}"))]
    Migration {
        source: sqlx::migrate::MigrateError,
    },

    #[snafu(display("Unable to create directory {}: {source}", path.display()))]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to (de)serialize playlist: {source}"))]
    PlaylistFormat { source: serde_json::Error },

    #[snafu(display("Track {id} can not be streamed"))]
    NotStreamable { id: u64 },

    #[snafu(display("No track at position {index}"))]
    InvalidIndex { index: usize },
}

impl From<cheerleader_client::Error> for Error {
    fn from(source: cheerleader_client::Error) -> Self {
        Error::Client { source }
    }
}

impl From<rodio::StreamError> for Error {
    fn from(source: rodio::StreamError) -> Self {
        Error::StreamOpen { source }
    }
}

impl From<rodio::cpal::DevicesError> for Error {
    fn from(source: rodio::cpal::DevicesError) -> Self {
        Error::Devices { source }
    }
}

impl From<rodio::source::SeekError> for Error {
    fn from(source: rodio::source::SeekError) -> Self {
        Error::Seek { source }
    }
}
