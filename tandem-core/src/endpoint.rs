//! Link endpoints and their recovery state machine
//!
//! Each endpoint recovers from overflows on its own. The state machine is
//! deliberately small: an overflow moves a ready endpoint into recovery, and
//! the reset completing brings it back.

/// Role an SPI instance plays on the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Initiates every frame and drives the command cycle
    Controller,
    /// Answers the command byte within the same frame
    Responder,
}

impl Role {
    /// Both roles, in table order
    pub const ALL: [Role; 2] = [Role::Controller, Role::Responder];

    /// Slot used for per-role bookkeeping arrays
    pub(crate) fn slot(self) -> usize {
        match self {
            Role::Controller => 0,
            Role::Responder => 1,
        }
    }
}

/// Endpoint recovery states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndpointState {
    /// Channel enabled, frames may run
    #[default]
    Ready,
    /// Channel being cycled through reset; no frames in flight
    Recovering,
}

/// Events driving [`EndpointState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndpointEvent {
    /// Transport reported a buffer overflow
    Overflow,
    /// Channel came back out of reset
    Recovered,
}

impl EndpointState {
    /// Check if frames may run on this endpoint
    pub fn is_ready(&self) -> bool {
        matches!(self, EndpointState::Ready)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: EndpointEvent) -> Self {
        use EndpointEvent::*;
        use EndpointState::*;

        match (self, event) {
            (Ready, Overflow) => Recovering,
            (Recovering, Recovered) => Ready,

            // A second overflow while recovering is absorbed by the same reset
            _ => self,
        }
    }
}
