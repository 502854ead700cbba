//! Module-gated logging macros.
//!
//! A module opts in by declaring its own switch before using them:
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_error, log_info, log_warn};
//!
//! log_info!("clip {} started", id);
//! ```
//! Flipping the const to `false` silences the chatty paths (engine thread,
//! controller loop) without touching `RUST_LOG` for the rest of the crate.

/// `log::info!` guarded by the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::warn!` guarded by the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// `log::error!` guarded by the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    const ENABLE_LOGS: bool = false;

    #[test]
    fn disabled_switch_skips_formatting() {
        fn side_effect(hits: &std::cell::Cell<u32>) -> u32 {
            hits.set(hits.get() + 1);
            hits.get()
        }

        let hits = std::cell::Cell::new(0);
        crate::log_info!("{}", side_effect(&hits));
        crate::log_warn!("{}", side_effect(&hits));
        crate::log_error!("{}", side_effect(&hits));
        assert_eq!(hits.get(), 0);
    }
}
