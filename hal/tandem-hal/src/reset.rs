//! Overflow recovery abstractions
//!
//! Drivers report buffer overflows through [`OverflowEvents`] and pass in
//! whatever can cycle their peripherals, as a [`ChannelReset`].

use crate::spi::SpiInstance;

/// Peripheral reset control
///
/// Cycles an SPI instance through reset and back to ready. Synchronous:
/// the channel is usable again when the call returns.
pub trait ChannelReset {
    fn reset(&mut self, instance: SpiInstance);
}

/// Overflow callback
///
/// Invoked by a driver when `instance` could not keep up with the byte
/// stream. Runs in interrupt context and must not block.
pub trait OverflowEvents {
    fn on_overflow(&mut self, instance: SpiInstance, channels: &mut dyn ChannelReset);
}
