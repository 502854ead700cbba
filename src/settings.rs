use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::music::SkipPolicy;
use crate::timer::{Mode, TimerDurations, BREAK_TIME, FOCUS_TIME};

pub const SETTINGS_PATH_VAR: &str = "FOCUSBEATS_SETTINGS";
pub const SPOTIFY_CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const SPOTIFY_CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
pub const FACT_API_KEY_VAR: &str = "FACT_API_KEY";

/// Deep Focus.
pub const DEFAULT_FOCUS_PLAYLIST: &str = "37i9dQZF1DWZeKCadgRdKQ";
/// Cheerful Uplifting Mix.
pub const DEFAULT_BREAK_PLAYLIST: &str = "37i9dQZF1EIcqv6dNT3Dgk";

/// User-tunable knobs, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub focus_secs: u32,
    pub break_secs: u32,
    pub focus_playlist_id: String,
    pub break_playlist_id: String,
    pub volume: f32,
    /// Consecutive playback failures before giving up; one pass over the
    /// playlist when unset.
    pub max_skip_attempts: Option<usize>,
    pub tick_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_secs: FOCUS_TIME,
            break_secs: BREAK_TIME,
            focus_playlist_id: DEFAULT_FOCUS_PLAYLIST.into(),
            break_playlist_id: DEFAULT_BREAK_PLAYLIST.into(),
            volume: 0.8,
            max_skip_attempts: None,
            tick_interval_ms: 1000,
        }
    }
}

impl Settings {
    /// Reads `path` if it exists. A file that fails to parse is reported and
    /// replaced by the defaults; the result is validated either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read settings from {}", path.display()))?;
                serde_json::from_str(&contents).unwrap_or_else(|err| {
                    warn!(
                        "Ignoring unreadable settings file {}: {}",
                        path.display(),
                        err
                    );
                    Settings::default()
                })
            }
            Some(path) => {
                info!("No settings at {}, using defaults", path.display());
                Settings::default()
            }
            None => Settings::default(),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Resolves the settings file from `FOCUSBEATS_SETTINGS`.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(SETTINGS_PATH_VAR).map(std::path::PathBuf::from);
        Self::load(path.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.focus_secs == 0 || self.break_secs == 0 {
            bail!("focusSecs and breakSecs must be greater than zero");
        }
        if self.tick_interval_ms == 0 {
            bail!("tickIntervalMs must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.volume) {
            bail!("volume must be between 0.0 and 1.0, got {}", self.volume);
        }
        if self.max_skip_attempts == Some(0) {
            bail!("maxSkipAttempts must be at least 1 when set");
        }
        Ok(())
    }

    pub fn durations(&self) -> TimerDurations {
        TimerDurations {
            focus_secs: self.focus_secs,
            break_secs: self.break_secs,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn skip_policy(&self) -> SkipPolicy {
        SkipPolicy::from_setting(self.max_skip_attempts)
    }

    pub fn playlist_id(&self, mode: Mode) -> &str {
        match mode {
            Mode::Focus => &self.focus_playlist_id,
            Mode::Break => &self.break_playlist_id,
        }
    }
}

#[derive(Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Provider secrets from the environment. A missing value disables the
/// provider that needs it.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub spotify: Option<SpotifyCredentials>,
    pub fact_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let spotify = match (
            non_empty(SPOTIFY_CLIENT_ID_VAR),
            non_empty(SPOTIFY_CLIENT_SECRET_VAR),
        ) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        Self {
            spotify,
            fact_api_key: non_empty(FACT_API_KEY_VAR),
        }
    }
}
