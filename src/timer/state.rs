use serde::{Deserialize, Serialize};

/// 25 minutes.
pub const FOCUS_TIME: u32 = 25 * 60;
/// 5 minutes.
pub const BREAK_TIME: u32 = 5 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Focus,
    Break,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Focus
    }
}

impl Mode {
    pub fn other(self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Mode::Focus => "Focus Time",
            Mode::Break => "Break Time",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerDurations {
    pub focus_secs: u32,
    pub break_secs: u32,
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            focus_secs: FOCUS_TIME,
            break_secs: BREAK_TIME,
        }
    }
}

impl TimerDurations {
    pub fn for_mode(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus_secs,
            Mode::Break => self.break_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TransitionCause {
    /// The countdown reached zero.
    Expired,
    /// The user switched modes.
    Manual,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    pub cause: TransitionCause,
}

/// Mode, countdown and cycle bookkeeping for one running UI.
///
/// Mutated only by clock ticks and by the user intents below; lives for the
/// whole process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub mode: Mode,
    pub time_left: u32,
    pub is_active: bool,
    /// Completed Focus intervals. Only the automatic Focus→Break transition
    /// counts one.
    pub cycles: u32,
    #[serde(skip)]
    durations: TimerDurations,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(TimerDurations::default())
    }
}

impl SessionState {
    pub fn new(durations: TimerDurations) -> Self {
        Self {
            mode: Mode::Focus,
            time_left: durations.focus_secs,
            is_active: false,
            cycles: 0,
            durations,
        }
    }

    pub fn durations(&self) -> TimerDurations {
        self.durations
    }

    /// One clock tick. Decrements only while active and above zero; never
    /// changes mode or cycles. Returns whether the countdown moved.
    pub fn tick(&mut self) -> bool {
        if self.is_active && self.time_left > 0 {
            self.time_left -= 1;
            true
        } else {
            false
        }
    }

    /// Runs the automatic transition once the countdown sits at zero.
    ///
    /// The new interval's duration is loaded immediately, so a zero count is
    /// observed at most once per transition. `is_active` is left alone and
    /// the countdown carries on into the next interval.
    pub fn expire(&mut self) -> Option<Transition> {
        if self.time_left != 0 {
            return None;
        }

        let from = self.mode;
        if from == Mode::Focus {
            self.cycles += 1;
        }
        self.enter(from.other());

        Some(Transition {
            from,
            to: self.mode,
            cause: TransitionCause::Expired,
        })
    }

    /// Start/pause. The remaining time is kept as is.
    pub fn toggle_active(&mut self) {
        self.is_active = !self.is_active;
    }

    /// Stops the countdown and refills the current mode's duration.
    pub fn reset(&mut self) {
        self.is_active = false;
        self.time_left = self.durations.for_mode(self.mode);
    }

    /// Manual Focus/Break switch. Stops the countdown and never counts a
    /// cycle.
    pub fn switch_mode(&mut self) -> Transition {
        let from = self.mode;
        self.is_active = false;
        self.enter(from.other());

        Transition {
            from,
            to: self.mode,
            cause: TransitionCause::Manual,
        }
    }

    fn enter(&mut self, mode: Mode) {
        self.mode = mode;
        self.time_left = self.durations.for_mode(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short() -> TimerDurations {
        TimerDurations {
            focus_secs: 4,
            break_secs: 3,
        }
    }

    #[test]
    fn starts_inactive_in_focus() {
        let state = SessionState::default();
        assert_eq!(state.mode, Mode::Focus);
        assert_eq!(state.time_left, FOCUS_TIME);
        assert!(!state.is_active);
        assert_eq!(state.cycles, 0);
    }

    #[test]
    fn tick_decrements_by_one_without_touching_mode_or_cycles() {
        let durations = TimerDurations::default();
        for start in [1, 2, 299, BREAK_TIME, FOCUS_TIME] {
            let mut state = SessionState::new(durations);
            state.is_active = true;
            state.time_left = start;

            assert!(state.tick());
            assert_eq!(state.time_left, start - 1);
            assert_eq!(state.mode, Mode::Focus);
            assert_eq!(state.cycles, 0);
        }
    }

    #[test]
    fn tick_is_ignored_while_inactive_or_at_zero() {
        let mut state = SessionState::new(short());
        assert!(!state.tick());
        assert_eq!(state.time_left, 4);

        state.is_active = true;
        state.time_left = 0;
        assert!(!state.tick());
        assert_eq!(state.time_left, 0);
    }

    #[test]
    fn focus_expiry_counts_a_cycle_and_loads_break() {
        let mut state = SessionState::new(short());
        state.is_active = true;
        state.time_left = 0;

        let transition = state.expire().expect("transition at zero");
        assert_eq!(transition.from, Mode::Focus);
        assert_eq!(transition.to, Mode::Break);
        assert_eq!(transition.cause, TransitionCause::Expired);
        assert_eq!(state.cycles, 1);
        assert_eq!(state.time_left, 3);
        assert!(state.is_active);

        // Refilled, so a second check does nothing.
        assert!(state.expire().is_none());
    }

    #[test]
    fn break_expiry_returns_to_focus_without_counting() {
        let mut state = SessionState::new(short());
        state.mode = Mode::Break;
        state.cycles = 2;
        state.time_left = 0;

        let transition = state.expire().expect("transition at zero");
        assert_eq!(transition.to, Mode::Focus);
        assert_eq!(state.cycles, 2);
        assert_eq!(state.time_left, 4);
    }

    #[test]
    fn toggle_keeps_remaining_time() {
        let mut state = SessionState::new(short());
        state.toggle_active();
        state.tick();
        state.toggle_active();
        assert!(!state.is_active);
        assert_eq!(state.time_left, 3);
    }

    #[test]
    fn reset_refills_current_mode_only() {
        let mut state = SessionState::new(short());
        state.mode = Mode::Break;
        state.cycles = 5;
        state.is_active = true;
        state.time_left = 1;

        state.reset();
        assert!(!state.is_active);
        assert_eq!(state.time_left, 3);
        assert_eq!(state.mode, Mode::Break);
        assert_eq!(state.cycles, 5);
    }

    #[test]
    fn manual_switch_never_counts_cycles() {
        let mut state = SessionState::new(short());
        state.is_active = true;

        let to_break = state.switch_mode();
        assert_eq!(to_break.to, Mode::Break);
        assert_eq!(to_break.cause, TransitionCause::Manual);
        assert!(!state.is_active);
        assert_eq!(state.time_left, 3);
        assert_eq!(state.cycles, 0);

        let to_focus = state.switch_mode();
        assert_eq!(to_focus.to, Mode::Focus);
        assert_eq!(state.time_left, 4);
        assert_eq!(state.cycles, 0);
    }
}
