//! HTTP collaborators: Spotify for playlists, API Ninjas for facts.
//!
//! The core only sees the traits below; failures are returned as
//! [`ProviderError`] and logged by the caller, never retried.

pub mod facts;
pub mod spotify;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::music::Playlist;

pub use facts::FactsClient;
pub use spotify::SpotifyClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("token exchange rejected with status {0}")]
    Auth(StatusCode),
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with status {status}")]
    Status { endpoint: String, status: StatusCode },
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Opaque bearer token from the client-credentials exchange.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn authorize(&self) -> Result<AccessToken, ProviderError>;

    async fn fetch_playlist(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> Result<Playlist, ProviderError>;
}

#[async_trait]
pub trait FactSource: Send + Sync {
    /// `Ok(None)` when the provider had nothing to say.
    async fn random_fact(&self) -> Result<Option<String>, ProviderError>;
}
