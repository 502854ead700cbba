pub mod output;
pub mod player;
pub mod tracks;

#[cfg(test)]
pub(crate) mod testing;

pub use output::{AudioEvent, AudioOutput, PlaybackError, PlaybackId};
pub use player::{PlaybackController, SkipPolicy};
pub use tracks::{
    advance, current_track_info, playable_tracks, Playlist, Playlists, Track, TrackInfo,
};
