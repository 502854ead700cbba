use thiserror::Error;

/// Id handed to every clip load; audio events carry it back so the player
/// can tell current clips from replaced ones.
pub type PlaybackId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    Started(PlaybackId),
    Ended(PlaybackId),
    Failed { id: PlaybackId, reason: String },
}

impl AudioEvent {
    pub fn id(&self) -> PlaybackId {
        match self {
            AudioEvent::Started(id) | AudioEvent::Ended(id) => *id,
            AudioEvent::Failed { id, .. } => *id,
        }
    }
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("audio engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("failed to download preview: {0}")]
    Download(String),
    #[error("failed to decode preview: {0}")]
    Decode(String),
}

/// The single audio channel. Only the playback controller drives it.
///
/// `load` may finish asynchronously; the outcome arrives later as an
/// [`AudioEvent`] tagged with the same id.
pub trait AudioOutput: Send {
    fn load(&mut self, id: PlaybackId, url: &str) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn stop(&mut self);
}
