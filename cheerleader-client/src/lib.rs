pub mod client;
pub mod error;
pub mod offline;
pub(crate) mod simple_cache;
pub mod soundcloud_models;

pub use client::Client;
pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
