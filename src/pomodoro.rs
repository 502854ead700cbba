use log::info;
use serde::Serialize;

use crate::effects::{FactTicket, SideEffectDispatcher};
use crate::music::{
    current_track_info, playable_tracks, AudioEvent, AudioOutput, PlaybackController, Playlist,
    Playlists, SkipPolicy, Track, TrackInfo,
};
use crate::timer::{Mode, SessionState, TimerDurations, Transition};
use crate::utils::format_time;

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSnapshot {
    pub mode: Mode,
    pub title: String,
    pub time_left: u32,
    pub formatted_time: String,
    pub is_active: bool,
    pub cycles: u32,
    /// Only populated during a break.
    pub fact: Option<String>,
    pub background: String,
    pub track: TrackInfo,
    pub is_playing: bool,
    pub playable_count: usize,
}

impl PomodoroSnapshot {
    /// One terminal line, plus the fact on its own line during a break.
    pub fn status_line(&self) -> String {
        let timer = if self.is_active { "running" } else { "paused" };
        let music = if self.is_playing { "playing" } else { "stopped" };
        let mut line = format!(
            "[{}] {} {} ({}) | Cycles: {} | {}: {}",
            self.background, self.title, self.formatted_time, timer, self.cycles, music, self.track.name
        );
        if !self.track.artist.is_empty() {
            line.push_str(&format!(" - {}", self.track.artist));
        }
        if let Some(fact) = &self.fact {
            line.push_str(&format!("\n  \"{}\"", fact));
        }
        line
    }
}

/// Timer, music and break-time side effects behind one owner.
///
/// Every method is one serialized event. Methods that enter a break hand
/// back a [`FactTicket`]; the caller fetches the fact and reports it with
/// [`Pomodoro::fact_received`].
pub struct Pomodoro<O> {
    session: SessionState,
    playlists: Playlists,
    player: PlaybackController<O>,
    effects: SideEffectDispatcher,
}

impl<O: AudioOutput> Pomodoro<O> {
    pub fn new(durations: TimerDurations, output: O, policy: SkipPolicy) -> Self {
        Self {
            session: SessionState::new(durations),
            playlists: Playlists::default(),
            player: PlaybackController::new(output, policy),
            effects: SideEffectDispatcher::default(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn player(&self) -> &PlaybackController<O> {
        &self.player
    }

    pub fn effects(&self) -> &SideEffectDispatcher {
        &self.effects
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active
    }

    pub fn playable_tracks(&self) -> Vec<&Track> {
        playable_tracks(self.session.mode, &self.playlists)
    }

    /// One clock tick: count down, then roll over if the interval is done.
    pub fn tick(&mut self) -> Option<FactTicket> {
        self.session.tick();
        let transition = self.session.expire()?;
        info!(
            "{:?} interval finished, entering {:?} (cycles: {})",
            transition.from, transition.to, self.session.cycles
        );
        self.apply_transition(transition)
    }

    pub fn toggle_timer(&mut self) {
        self.session.toggle_active();
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn switch_mode(&mut self) -> Option<FactTicket> {
        let transition = self.session.switch_mode();
        self.apply_transition(transition)
    }

    pub fn toggle_playback(&mut self) {
        let tracks = playable_tracks(self.session.mode, &self.playlists);
        self.player.toggle(&tracks);
    }

    pub fn skip_track(&mut self) {
        let tracks = playable_tracks(self.session.mode, &self.playlists);
        self.player.skip(&tracks);
    }

    pub fn playlist_loaded(&mut self, mode: Mode, playlist: Playlist) {
        info!(
            "{:?} playlist '{}' loaded with {} tracks",
            mode,
            playlist.name,
            playlist.tracks.len()
        );
        self.playlists.replace(mode, playlist);
    }

    pub fn fact_received(&mut self, ticket: FactTicket, fact: Option<String>) {
        self.effects.fact_arrived(ticket, fact);
    }

    pub fn audio_event(&mut self, event: AudioEvent) {
        let tracks = playable_tracks(self.session.mode, &self.playlists);
        self.player.on_audio_event(event, &tracks);
    }

    pub fn shutdown(&mut self) {
        self.player.stop();
    }

    pub fn snapshot(&self) -> PomodoroSnapshot {
        let tracks = self.playable_tracks();
        let fact = match self.session.mode {
            Mode::Break => self.effects.fact().map(str::to_string),
            Mode::Focus => None,
        };

        PomodoroSnapshot {
            mode: self.session.mode,
            title: self.session.mode.title().to_string(),
            time_left: self.session.time_left,
            formatted_time: format_time(self.session.time_left),
            is_active: self.session.is_active,
            cycles: self.session.cycles,
            fact,
            background: self.effects.background().as_str().to_string(),
            track: current_track_info(&tracks, self.player.current_index()),
            is_playing: self.player.is_playing(),
            playable_count: tracks.len(),
        }
    }

    /// The mode has already changed here, so the player is handed the new
    /// mode's tracks.
    fn apply_transition(&mut self, transition: Transition) -> Option<FactTicket> {
        let ticket = self.effects.on_transition(&transition);
        let tracks = playable_tracks(self.session.mode, &self.playlists);
        self.player.on_mode_changed(&tracks);
        ticket
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::music::testing::{FakeOutput, OutputCall};
    use crate::timer::{BREAK_TIME, FOCUS_TIME};

    fn playlist(prefix: &str, previews: &[bool]) -> Playlist {
        Playlist {
            id: prefix.to_string(),
            name: format!("{prefix} mix"),
            tracks: previews
                .iter()
                .enumerate()
                .map(|(i, has_preview)| Track {
                    name: format!("{prefix}-{i}"),
                    artist_name: Some(format!("{prefix} artist")),
                    preview_url: has_preview.then(|| format!("https://p/{prefix}/{i}.mp3")),
                })
                .collect(),
        }
    }

    fn pomodoro() -> (Pomodoro<FakeOutput>, FakeOutput) {
        let output = FakeOutput::default();
        let core = Pomodoro::new(
            TimerDurations::default(),
            output.clone(),
            SkipPolicy::OnePass,
        );
        (core, output)
    }

    #[test]
    fn initial_snapshot() {
        let (core, _) = pomodoro();
        assert_eq!(
            core.snapshot(),
            PomodoroSnapshot {
                mode: Mode::Focus,
                title: "Focus Time".into(),
                time_left: FOCUS_TIME,
                formatted_time: "25:00".into(),
                is_active: false,
                cycles: 0,
                fact: None,
                background: "particleNetwork".into(),
                track: TrackInfo {
                    name: "No preview available".into(),
                    artist: String::new(),
                },
                is_playing: false,
                playable_count: 0,
            }
        );
    }

    #[test]
    fn two_ticks_from_two_seconds_enter_break() {
        let (mut core, _) = pomodoro();
        core.toggle_timer();
        core.session.time_left = 2;

        assert!(core.tick().is_none());
        let ticket = core.tick().expect("fact requested on break entry");

        let snapshot = core.snapshot();
        assert_eq!(snapshot.mode, Mode::Break);
        assert_eq!(snapshot.cycles, 1);
        assert_eq!(snapshot.time_left, BREAK_TIME);
        assert_eq!(snapshot.background, "floatingBubbles");
        assert!(snapshot.is_active);

        core.fact_received(ticket, Some("Bananas are berries".into()));
        assert_eq!(core.snapshot().fact.as_deref(), Some("Bananas are berries"));
    }

    #[test]
    fn break_expiry_clears_fact_without_counting() {
        let (mut core, _) = pomodoro();
        let ticket = core.switch_mode().unwrap();
        core.fact_received(ticket, Some("fact".into()));
        core.toggle_timer();
        core.session.time_left = 1;

        assert!(core.tick().is_none());
        let snapshot = core.snapshot();
        assert_eq!(snapshot.mode, Mode::Focus);
        assert_eq!(snapshot.cycles, 0);
        assert_eq!(snapshot.time_left, FOCUS_TIME);
        assert_eq!(snapshot.fact, None);
        assert_eq!(snapshot.background, "particleNetwork");
    }

    #[test]
    fn reset_keeps_mode_cycles_and_fact() {
        let (mut core, _) = pomodoro();
        core.toggle_timer();
        core.session.time_left = 1;
        let ticket = core.tick().unwrap();
        core.fact_received(ticket, Some("fact".into()));
        core.tick();

        core.reset();
        let snapshot = core.snapshot();
        assert!(!snapshot.is_active);
        assert_eq!(snapshot.time_left, BREAK_TIME);
        assert_eq!(snapshot.mode, Mode::Break);
        assert_eq!(snapshot.cycles, 1);
        assert_eq!(snapshot.fact.as_deref(), Some("fact"));
        assert_eq!(snapshot.background, "floatingBubbles");
    }

    #[test]
    fn manual_switch_reloads_new_mode_playlist_when_playing() {
        let (mut core, output) = pomodoro();
        core.playlist_loaded(Mode::Focus, playlist("focus", &[true, true]));
        core.playlist_loaded(Mode::Break, playlist("break", &[false, true, true]));

        core.toggle_playback();
        core.skip_track();
        assert_eq!(core.player().current_index(), 1);

        let ticket = core.switch_mode();
        assert!(ticket.is_some());
        assert_eq!(core.snapshot().cycles, 0);
        assert_eq!(core.player().current_index(), 0);
        assert_eq!(
            output.calls().last(),
            Some(&OutputCall::Load(3, "https://p/break/1.mp3".into()))
        );
        assert_eq!(core.snapshot().track.name, "break-1");
        assert_eq!(core.snapshot().playable_count, 2);
    }

    #[test]
    fn expiry_while_paused_music_only_resets_index() {
        let (mut core, output) = pomodoro();
        core.playlist_loaded(Mode::Focus, playlist("focus", &[true, true]));
        core.playlist_loaded(Mode::Break, playlist("break", &[true]));
        core.skip_track();
        core.toggle_playback();
        let calls = output.calls().len();

        core.toggle_timer();
        core.session.time_left = 1;
        core.tick();
        assert_eq!(core.player().current_index(), 0);
        assert_eq!(output.calls().len(), calls);
    }

    #[test]
    fn empty_playable_set_toggle_does_not_play() {
        let (mut core, output) = pomodoro();
        core.playlist_loaded(Mode::Focus, playlist("focus", &[false, false]));

        core.toggle_playback();
        let snapshot = core.snapshot();
        assert!(snapshot.is_playing);
        assert_eq!(snapshot.track.name, "No preview available");
        assert!(output.calls().is_empty());
    }

    #[test]
    fn track_end_on_last_track_wraps() {
        let (mut core, output) = pomodoro();
        core.playlist_loaded(Mode::Focus, playlist("focus", &[true, false, true]));

        core.toggle_playback();
        core.skip_track();
        assert_eq!(core.player().current_index(), 1);

        core.audio_event(AudioEvent::Ended(2));
        assert_eq!(core.player().current_index(), 0);
        assert_eq!(
            output.loads().last(),
            Some(&(3, "https://p/focus/0.mp3".to_string()))
        );
    }

    #[test]
    fn status_line_shows_fact_only_in_break() {
        let (mut core, _) = pomodoro();
        assert_eq!(
            core.snapshot().status_line(),
            "[particleNetwork] Focus Time 25:00 (paused) | Cycles: 0 | stopped: No preview available"
        );

        let ticket = core.switch_mode().unwrap();
        core.fact_received(ticket, Some("Koalas sleep 20 hours".into()));
        assert_eq!(
            core.snapshot().status_line(),
            "[floatingBubbles] Break Time 5:00 (paused) | Cycles: 0 | stopped: No preview available\n  \"Koalas sleep 20 hours\""
        );
    }

    #[test]
    fn music_outage_never_blocks_the_timer() {
        let output = FakeOutput::rejecting();
        let mut core = Pomodoro::new(
            TimerDurations {
                focus_secs: 2,
                break_secs: 1,
            },
            output,
            SkipPolicy::OnePass,
        );
        core.playlist_loaded(Mode::Focus, playlist("focus", &[true, true]));
        core.toggle_playback();
        core.toggle_timer();

        core.tick();
        core.tick();
        assert_eq!(core.snapshot().mode, Mode::Break);
        core.tick();
        assert_eq!(core.snapshot().mode, Mode::Focus);
        assert_eq!(core.snapshot().cycles, 1);
    }
}
