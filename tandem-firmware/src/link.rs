//! RP2040 glue for the link transport traits
//!
//! - [`BlockingController`]: controller-side block transfers over any
//!   embedded-hal SPI bus with a GPIO chip select
//! - [`PeripheralResets`]: overrun detection and channel re-enable on the
//!   PL022 SPI blocks

use embassy_rp::pac;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use tandem_hal::{ChannelReset, SlaveSelect, SpiController, SpiInstance};

/// Controller transfer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum LinkError {
    /// SPI bus reported an error
    Bus,
}

/// Block transfers framed by a GPIO chip select
pub struct BlockingController<SPI, CS> {
    spi: SPI,
    cs: CS,
    slave: SlaveSelect,
}

impl<SPI, CS> BlockingController<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    /// `cs` drives the chip select of `slave` (active low)
    pub fn new(spi: SPI, mut cs: CS, slave: SlaveSelect) -> Self {
        // Idle deselected
        let _ = cs.set_high();
        Self { spi, cs, slave }
    }
}

impl<SPI, CS> SpiController for BlockingController<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    type Error = LinkError;

    fn select(&mut self, slave: SlaveSelect) {
        if slave == self.slave {
            let _ = self.cs.set_low();
        }
    }

    fn deselect(&mut self, slave: SlaveSelect) {
        if slave == self.slave {
            let _ = self.cs.set_high();
        }
    }

    fn transfer_block(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), LinkError> {
        // Command and turnaround go out first; the reply is clocked in with dummy bytes
        self.spi.write(tx).map_err(|_| LinkError::Bus)?;
        self.spi.read(rx).map_err(|_| LinkError::Bus)?;
        self.spi.flush().map_err(|_| LinkError::Bus)
    }
}

fn regs(instance: SpiInstance) -> pac::spi::Spi {
    match instance {
        SpiInstance::Spi0 => pac::SPI0,
        SpiInstance::Spi1 => pac::SPI1,
    }
}

/// PL022 channel control
pub struct PeripheralResets;

impl PeripheralResets {
    /// Receive overrun flagged since the last check
    pub fn overrun_pending(&self, instance: SpiInstance) -> bool {
        regs(instance).sspris().read().rorris()
    }
}

impl ChannelReset for PeripheralResets {
    fn reset(&mut self, instance: SpiInstance) {
        let spi = regs(instance);

        // Disable, drop the stale FIFO contents, clear the overrun, enable
        spi.sspcr1().modify(|w| w.set_sse(false));
        while spi.sspsr().read().rne() {
            let _ = spi.sspdr().read();
        }
        spi.sspicr().write(|w| w.set_roric(true));
        spi.sspcr1().modify(|w| w.set_sse(true));
    }
}
