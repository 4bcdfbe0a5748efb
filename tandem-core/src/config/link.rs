//! Link configuration
//!
//! Peripheral settings for both ends of the link and the mapping from SPI
//! instance to endpoint role. Configuration can be persisted as a
//! postcard-serialized blob.

use serde::{Deserialize, Serialize};
use tandem_hal::{Mode, SlaveSelect, SpiInstance};

use crate::endpoint::Role;

/// Default SPI clock divider (peripheral clock / 256)
pub const DEFAULT_CLOCK_DIVIDER: u16 = 256;

/// Smallest supported clock divider
pub const MIN_CLOCK_DIVIDER: u16 = 2;

/// Largest supported clock divider
pub const MAX_CLOCK_DIVIDER: u16 = 512;

/// Bits per transfer frame for block transfers
pub const BLOCK_FRAME_BITS: u8 = 8;

/// Upper bound on the encoded size of a [`LinkConfig`]
pub const MAX_ENCODED_LEN: usize = 16;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Controller and responder configured on the same SPI instance
    SharedInstance,
    /// Clock divider odd or outside `MIN_CLOCK_DIVIDER..=MAX_CLOCK_DIVIDER`
    InvalidClockDivider,
    /// Frame size outside 4..=32 bits
    InvalidFrameSize,
    /// Output buffer too small for the encoded config
    Encode,
    /// Stored blob could not be decoded
    Decode,
}

/// Link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Clock polarity/phase, shared by both ends
    pub mode: Mode,
    /// Controller clock divider
    pub clock_divider: u16,
    /// Bits per transfer frame
    pub frame_bits: u8,
    /// Chip select the responder answers on
    pub slave: SlaveSelect,
    /// Instance running the controller role
    pub controller: SpiInstance,
    /// Instance running the responder role
    pub responder: SpiInstance,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Mode1,
            clock_divider: DEFAULT_CLOCK_DIVIDER,
            frame_bits: BLOCK_FRAME_BITS,
            slave: SlaveSelect(1),
            controller: SpiInstance::Spi0,
            responder: SpiInstance::Spi1,
        }
    }
}

impl LinkConfig {
    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controller == self.responder {
            return Err(ConfigError::SharedInstance);
        }
        if !(MIN_CLOCK_DIVIDER..=MAX_CLOCK_DIVIDER).contains(&self.clock_divider)
            || self.clock_divider % 2 != 0
        {
            return Err(ConfigError::InvalidClockDivider);
        }
        if !(4..=32).contains(&self.frame_bits) {
            return Err(ConfigError::InvalidFrameSize);
        }
        Ok(())
    }

    /// Role played by `instance`, if it is part of the link
    pub fn role_of(&self, instance: SpiInstance) -> Option<Role> {
        if instance == self.controller {
            Some(Role::Controller)
        } else if instance == self.responder {
            Some(Role::Responder)
        } else {
            None
        }
    }

    /// Instance assigned to `role`
    pub fn instance_of(&self, role: Role) -> SpiInstance {
        match role {
            Role::Controller => self.controller,
            Role::Responder => self.responder,
        }
    }

    /// Serial clock for a given peripheral clock
    pub fn bit_rate(&self, peripheral_clock_hz: u32) -> u32 {
        peripheral_clock_hz / u32::from(self.clock_divider.max(1))
    }

    /// Serialize into `buffer`, returning the used part
    pub fn to_slice<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Encode)
    }

    /// Deserialize and validate a stored configuration
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }
}
