use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{AccessToken, PlaylistSource, ProviderError};
use crate::music::{Playlist, Track};
use crate::settings::SpotifyCredentials;

pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const API_BASE: &str = "https://api.spotify.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct SpotifyClient {
    http_client: reqwest::Client,
    credentials: SpotifyCredentials,
    token_url: String,
    api_base: String,
}

impl SpotifyClient {
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self::with_endpoints(credentials, TOKEN_URL, API_BASE)
    }

    pub fn with_endpoints(
        credentials: SpotifyCredentials,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            credentials,
            token_url: token_url.into(),
            api_base: api_base.into(),
        }
    }

    fn playlist_url(&self, playlist_id: &str) -> String {
        format!("{}/playlists/{}", self.api_base.trim_end_matches('/'), playlist_id)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    /// Null for removed or local tracks.
    track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

impl From<PlaylistResponse> for Playlist {
    fn from(response: PlaylistResponse) -> Self {
        let tracks = response
            .tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.track)
            .map(|track| Track {
                name: track.name,
                artist_name: track.artists.into_iter().next().map(|a| a.name),
                preview_url: track.preview_url,
            })
            .collect();

        Playlist {
            id: response.id,
            name: response.name,
            tracks,
        }
    }
}

#[async_trait]
impl PlaylistSource for SpotifyClient {
    async fn authorize(&self) -> Result<AccessToken, ProviderError> {
        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                endpoint: self.token_url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Auth(response.status()));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|source| ProviderError::Decode {
                endpoint: self.token_url.clone(),
                source,
            })?;
        Ok(AccessToken::new(body.access_token))
    }

    async fn fetch_playlist(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> Result<Playlist, ProviderError> {
        let url = self.playlist_url(playlist_id);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token.as_str())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                endpoint: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                endpoint: url,
                status: response.status(),
            });
        }

        let body: PlaylistResponse = response
            .json()
            .await
            .map_err(|source| ProviderError::Decode {
                endpoint: url.clone(),
                source,
            })?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "37i9dQZF1DWZeKCadgRdKQ",
        "name": "Deep Focus",
        "tracks": {
            "items": [
                {"track": {"name": "Intro", "artists": [{"name": "Ayla"}, {"name": "Other"}], "preview_url": "https://p.scdn.co/mp3-preview/a"}},
                {"track": null},
                {"track": {"name": "Drift", "artists": [], "preview_url": null}},
                {"track": {"name": "Still", "artists": [{"name": "Mori"}]}}
            ]
        }
    }"#;

    #[test]
    fn converts_playlist_items_into_tracks() {
        let response: PlaylistResponse = serde_json::from_str(SAMPLE).unwrap();
        let playlist = Playlist::from(response);

        assert_eq!(playlist.name, "Deep Focus");
        assert_eq!(playlist.tracks.len(), 3);
        assert_eq!(playlist.tracks[0].artist_name.as_deref(), Some("Ayla"));
        assert!(playlist.tracks[0].is_playable());
        assert_eq!(playlist.tracks[1].artist_name, None);
        assert!(!playlist.tracks[1].is_playable());
        assert!(!playlist.tracks[2].is_playable());
    }

    #[test]
    fn playlist_without_tracks_is_empty() {
        let response: PlaylistResponse =
            serde_json::from_str(r#"{"error": {"status": 401}}"#).unwrap();
        assert!(Playlist::from(response).tracks.is_empty());
    }

    #[test]
    fn playlist_url_joins_base() {
        let client = SpotifyClient::with_endpoints(
            SpotifyCredentials {
                client_id: "id".into(),
                client_secret: "secret".into(),
            },
            TOKEN_URL,
            "https://api.example.test/v1/",
        );
        assert_eq!(
            client.playlist_url("abc"),
            "https://api.example.test/v1/playlists/abc"
        );
    }
}
