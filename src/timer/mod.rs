pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{Intent, PomodoroController, Providers};
pub use state::{
    Mode, SessionState, TimerDurations, Transition, TransitionCause, BREAK_TIME, FOCUS_TIME,
};
