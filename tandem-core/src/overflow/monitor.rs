//! Overflow monitor implementation
//!
//! Invoked by the transport when an SPI instance overruns its buffers. The
//! monitor maps the instance to its role, cycles that channel through reset
//! and returns. It never touches the response table, the command index or
//! the other endpoint; bytes lost during the overflow stay lost.

use tandem_hal::{ChannelReset, OverflowEvents, SpiInstance};

use crate::config::LinkConfig;
use crate::endpoint::{EndpointEvent, EndpointState, Role};
use crate::fmt::{debug, warn};

/// Per-endpoint overflow recovery
#[derive(Debug, Clone)]
pub struct OverflowMonitor {
    config: LinkConfig,
    states: [EndpointState; 2],
    recoveries: [u32; 2],
    ignored: u32,
}

impl OverflowMonitor {
    /// Create a monitor for the endpoints described by `config`
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            states: [EndpointState::Ready; 2],
            recoveries: [0; 2],
            ignored: 0,
        }
    }

    /// Current recovery state of `role`
    pub fn state(&self, role: Role) -> EndpointState {
        self.states[role.slot()]
    }

    /// Completed recoveries for `role`
    pub fn recoveries(&self, role: Role) -> u32 {
        self.recoveries[role.slot()]
    }

    /// Overflows reported for instances outside the link
    pub fn ignored(&self) -> u32 {
        self.ignored
    }

    fn apply(&mut self, role: Role, event: EndpointEvent) {
        let slot = role.slot();
        self.states[slot] = self.states[slot].transition(event);
    }
}

impl OverflowEvents for OverflowMonitor {
    fn on_overflow(&mut self, instance: SpiInstance, channels: &mut dyn ChannelReset) {
        let Some(role) = self.config.role_of(instance) else {
            self.ignored = self.ignored.wrapping_add(1);
            warn!("overflow on {:?}, which is not part of the link", instance);
            return;
        };

        self.apply(role, EndpointEvent::Overflow);
        debug!("{:?} overflow on {:?}, resetting channel", role, instance);

        channels.reset(instance);

        self.apply(role, EndpointEvent::Recovered);
        let slot = role.slot();
        self.recoveries[slot] = self.recoveries[slot].wrapping_add(1);
    }
}
