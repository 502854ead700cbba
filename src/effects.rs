use serde::{Deserialize, Serialize};

use crate::timer::{Mode, Transition};

/// Animated background shown behind the timer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Background {
    ParticleNetwork,
    FloatingBubbles,
}

impl Background {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Focus => Background::ParticleNetwork,
            Mode::Break => Background::FloatingBubbles,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Background::ParticleNetwork => "particleNetwork",
            Background::FloatingBubbles => "floatingBubbles",
        }
    }
}

/// Identifies one outstanding fact request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactTicket(u64);

/// Reacts to mode transitions: asks for a fact when a break starts, drops
/// it when focus resumes, and keeps the background in step with the mode.
#[derive(Debug)]
pub struct SideEffectDispatcher {
    fact: Option<String>,
    background: Background,
    pending: Option<FactTicket>,
    next_ticket: u64,
}

impl Default for SideEffectDispatcher {
    fn default() -> Self {
        Self {
            fact: None,
            background: Background::for_mode(Mode::Focus),
            pending: None,
            next_ticket: 1,
        }
    }
}

impl SideEffectDispatcher {
    pub fn fact(&self) -> Option<&str> {
        self.fact.as_deref()
    }

    pub fn background(&self) -> Background {
        self.background
    }

    /// Returns a ticket when the caller should fetch a fact.
    pub fn on_transition(&mut self, transition: &Transition) -> Option<FactTicket> {
        self.background = Background::for_mode(transition.to);
        match transition.to {
            Mode::Break => {
                let ticket = FactTicket(self.next_ticket);
                self.next_ticket += 1;
                self.pending = Some(ticket);
                Some(ticket)
            }
            Mode::Focus => {
                self.fact = None;
                self.pending = None;
                None
            }
        }
    }

    /// Records a fetched fact. Answers to anything but the outstanding
    /// request are dropped, as are failed fetches (`None`).
    pub fn fact_arrived(&mut self, ticket: FactTicket, fact: Option<String>) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        match fact {
            Some(fact) => {
                self.fact = Some(fact);
                true
            }
            None => false,
        }
    }
}
