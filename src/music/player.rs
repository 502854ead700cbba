use log::{debug, warn};

use super::output::{AudioEvent, AudioOutput, PlaybackId};
use super::tracks::{advance, Track};

/// How many consecutive playback failures are tolerated before the player
/// gives up instead of skipping again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipPolicy {
    /// Try every playable track once.
    OnePass,
    Limit(usize),
}

impl Default for SkipPolicy {
    fn default() -> Self {
        SkipPolicy::OnePass
    }
}

impl SkipPolicy {
    pub fn from_setting(max_skip_attempts: Option<usize>) -> Self {
        max_skip_attempts.map_or(SkipPolicy::OnePass, SkipPolicy::Limit)
    }

    fn limit(self, playable_count: usize) -> usize {
        match self {
            SkipPolicy::OnePass => playable_count.max(1),
            SkipPolicy::Limit(n) => n.max(1),
        }
    }
}

/// Sequences the playable set of the current mode through one output.
///
/// The playable set is handed in on every call and never kept, so a
/// playlist refresh or a mode switch is picked up on the next operation.
pub struct PlaybackController<O> {
    output: O,
    current_index: usize,
    is_playing: bool,
    loaded: Option<PlaybackId>,
    next_id: PlaybackId,
    consecutive_failures: usize,
    policy: SkipPolicy,
}

impl<O: AudioOutput> PlaybackController<O> {
    pub fn new(output: O, policy: SkipPolicy) -> Self {
        Self {
            output,
            current_index: 0,
            is_playing: false,
            loaded: None,
            next_id: 1,
            consecutive_failures: 0,
            policy,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn consecutive_failures(&self) -> usize {
        self.consecutive_failures
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Loads and starts `tracks[index]`. A missing entry falls through to
    /// the next track; a load error counts as a failure and skips.
    pub fn play(&mut self, index: usize, tracks: &[&Track]) {
        let mut index = index;
        let mut misses = 0;

        loop {
            if tracks.is_empty() {
                return;
            }

            let Some(url) = tracks.get(index).and_then(|t| t.preview_url()) else {
                misses += 1;
                if misses > tracks.len() {
                    return;
                }
                index = self.step(tracks.len());
                continue;
            };

            let id = self.allocate_id();
            match self.output.load(id, url) {
                Ok(()) => {
                    debug!("loading clip {} (track {})", id, index);
                    self.loaded = Some(id);
                    self.is_playing = true;
                    return;
                }
                Err(err) => {
                    warn!("playback of track {} failed: {}", index, err);
                    if !self.record_failure(tracks.len()) {
                        return;
                    }
                    index = self.step(tracks.len());
                }
            }
        }
    }

    /// Moves to the next playable track and starts it. No-op on an empty
    /// set.
    pub fn skip_to_next(&mut self, tracks: &[&Track]) {
        if tracks.is_empty() {
            return;
        }
        let next = self.step(tracks.len());
        self.play(next, tracks);
    }

    /// User skip. Starts a fresh failure budget.
    pub fn skip(&mut self, tracks: &[&Track]) {
        self.consecutive_failures = 0;
        self.skip_to_next(tracks);
    }

    /// Play/pause. Resuming reloads the current track from the start.
    pub fn toggle(&mut self, tracks: &[&Track]) {
        let was_playing = self.is_playing;
        if was_playing {
            self.output.pause();
            // A paused clip no longer owns the channel; its late events are stale.
            self.loaded = None;
        } else {
            self.consecutive_failures = 0;
            self.play(self.current_index, tracks);
        }
        self.is_playing = !was_playing;
    }

    /// Called after the mode has changed, with the new mode's playable set.
    pub fn on_mode_changed(&mut self, tracks: &[&Track]) {
        self.current_index = 0;
        if self.is_playing {
            self.consecutive_failures = 0;
            self.play(0, tracks);
        }
    }

    pub fn on_audio_event(&mut self, event: AudioEvent, tracks: &[&Track]) {
        if self.loaded != Some(event.id()) {
            debug!("ignoring stale audio event {:?}", event);
            return;
        }

        match event {
            AudioEvent::Started(_) => {
                self.consecutive_failures = 0;
            }
            AudioEvent::Ended(_) => {
                self.loaded = None;
                if self.is_playing {
                    self.skip_to_next(tracks);
                }
            }
            AudioEvent::Failed { reason, .. } => {
                warn!("track {} could not be played: {}", self.current_index, reason);
                self.loaded = None;
                if self.is_playing && self.record_failure(tracks.len()) {
                    self.skip_to_next(tracks);
                }
            }
        }
    }

    /// Tears the channel down for shutdown.
    pub fn stop(&mut self) {
        self.output.stop();
        self.loaded = None;
        self.is_playing = false;
    }

    fn step(&mut self, count: usize) -> usize {
        self.current_index = advance(self.current_index, count).unwrap_or(0);
        self.current_index
    }

    fn allocate_id(&mut self) -> PlaybackId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Counts a failure. Returns `false` once the budget is spent, after
    /// halting playback.
    fn record_failure(&mut self, playable_count: usize) -> bool {
        self.consecutive_failures += 1;
        let limit = self.policy.limit(playable_count);
        if self.consecutive_failures >= limit {
            warn!(
                "giving up after {} consecutive playback failures",
                self.consecutive_failures
            );
            self.stop();
            return false;
        }
        true
    }
}
