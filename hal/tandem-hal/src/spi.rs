//! SPI controller abstractions
//!
//! Provides the controller-side block transfer trait and the small value
//! types shared by both ends of the link.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// SPI peripheral instance
///
/// The link runs with one instance per role. The mapping from instance to
/// role lives in the link configuration, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpiInstance {
    Spi0,
    Spi1,
}

impl SpiInstance {
    /// Peripheral number as reported by overflow interrupts
    pub fn index(self) -> u8 {
        match self {
            SpiInstance::Spi0 => 0,
            SpiInstance::Spi1 => 1,
        }
    }
}

/// Chip-select line driven by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlaveSelect(pub u8);

/// SPI controller
///
/// Blocking block transfers framed by chip select. A transfer clocks
/// `tx.len() + rx.len()` bytes: the `tx` bytes go out first, and the bytes
/// clocked in after them land in `rx`. Dummy bytes are sent while `rx` is
/// being filled.
pub trait SpiController {
    /// Error type for transfer operations
    type Error;

    /// Assert the chip select for `slave`
    fn select(&mut self, slave: SlaveSelect);

    /// De-assert the chip select for `slave`
    fn deselect(&mut self, slave: SlaveSelect);

    /// Perform one block transfer
    ///
    /// Blocks until the whole frame has been exchanged.
    fn transfer_block(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), Self::Error>;
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    #[default]
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}
