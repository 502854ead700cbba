use std::sync::{Arc, Mutex};

use super::output::{AudioOutput, PlaybackError, PlaybackId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputCall {
    Load(PlaybackId, String),
    Pause,
    Stop,
}

/// Records every call; optionally refuses all loads.
#[derive(Clone, Default)]
pub struct FakeOutput {
    calls: Arc<Mutex<Vec<OutputCall>>>,
    reject_loads: bool,
}

impl FakeOutput {
    pub fn rejecting() -> Self {
        Self {
            reject_loads: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<OutputCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn loads(&self) -> Vec<(PlaybackId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                OutputCall::Load(id, url) => Some((id, url)),
                _ => None,
            })
            .collect()
    }
}

impl AudioOutput for FakeOutput {
    fn load(&mut self, id: PlaybackId, url: &str) -> Result<(), PlaybackError> {
        self.calls
            .lock()
            .unwrap()
            .push(OutputCall::Load(id, url.to_string()));
        if self.reject_loads {
            return Err(PlaybackError::EngineUnavailable("fake output".into()));
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.lock().unwrap().push(OutputCall::Pause);
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().push(OutputCall::Stop);
    }
}
