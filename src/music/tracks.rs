use serde::{Deserialize, Serialize};

use crate::timer::Mode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub name: String,
    pub artist_name: Option<String>,
    pub preview_url: Option<String>,
}

impl Track {
    /// The preview clip, if the track has a usable one.
    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn is_playable(&self) -> bool {
        self.preview_url().is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub tracks: Vec<Track>,
}

/// The latest playlist received for each mode. `None` until its fetch
/// lands; replaced wholesale on every response.
#[derive(Debug, Clone, Default)]
pub struct Playlists {
    focus: Option<Playlist>,
    break_time: Option<Playlist>,
}

impl Playlists {
    pub fn get(&self, mode: Mode) -> Option<&Playlist> {
        match mode {
            Mode::Focus => self.focus.as_ref(),
            Mode::Break => self.break_time.as_ref(),
        }
    }

    pub fn replace(&mut self, mode: Mode, playlist: Playlist) {
        let slot = match mode {
            Mode::Focus => &mut self.focus,
            Mode::Break => &mut self.break_time,
        };
        *slot = Some(playlist);
    }
}

/// Tracks of `mode`'s playlist that have a preview clip, in playlist order.
pub fn playable_tracks(mode: Mode, playlists: &Playlists) -> Vec<&Track> {
    playlists
        .get(mode)
        .map(|playlist| playlist.tracks.iter().filter(|t| t.is_playable()).collect())
        .unwrap_or_default()
}

/// Next index in a ring of `count` tracks. `None` when there is nothing to
/// advance over.
pub fn advance(current: usize, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some((current + 1) % count)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub name: String,
    pub artist: String,
}

pub const NO_PREVIEW: &str = "No preview available";

pub fn current_track_info(tracks: &[&Track], index: usize) -> TrackInfo {
    if tracks.is_empty() {
        return TrackInfo {
            name: NO_PREVIEW.to_string(),
            artist: String::new(),
        };
    }

    let track = tracks.get(index);
    TrackInfo {
        name: track
            .map(|t| t.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown")
            .to_string(),
        artist: track
            .and_then(|t| t.artist_name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown Artist")
            .to_string(),
    }
}
