//! Controller sequencer
//!
//! Issues one framed transfer per cycle, walking the command index through
//! the response table:
//!
//! ```text
//! select → transfer {cmd, filler} / capture reply → deselect → cmd += 1
//! ```
//!
//! A failed transfer is logged and the cycle still advances; there is no
//! retry. Overflow recovery happens out of band, through the transport's
//! overflow callback.

use tandem_hal::{SlaveSelect, SpiController};
use tandem_protocol::{CommandFrame, CommandIndex, ResponseTable, REPLY_LEN, TX_LEN};

use crate::fmt::{trace, warn};

/// Result of one successful cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Exchange<const L: usize = REPLY_LEN> {
    /// Command byte that was sent
    pub command: u8,
    /// Reply clocked back in the same frame
    pub reply: [u8; L],
}

/// Drives the command cycle over an [`SpiController`]
pub struct ControllerSequencer<C, const L: usize = REPLY_LEN> {
    spi: C,
    slave: SlaveSelect,
    index: CommandIndex,
    tx: [u8; TX_LEN],
    rx: [u8; L],
    cycles: u32,
    failures: u32,
}

impl<C: SpiController, const L: usize> ControllerSequencer<C, L> {
    /// Create a sequencer cycling through `command_count` commands
    pub fn new(spi: C, slave: SlaveSelect, command_count: usize) -> Self {
        Self {
            spi,
            slave,
            index: CommandIndex::new(command_count),
            tx: CommandFrame::new(0).to_bytes(),
            rx: [0u8; L],
            cycles: 0,
            failures: 0,
        }
    }

    /// Create a sequencer cycling through every row of `table`
    pub fn for_table<const N: usize>(spi: C, slave: SlaveSelect, _table: &ResponseTable<N, L>) -> Self {
        Self::new(spi, slave, N)
    }

    /// Command the next cycle will issue
    pub fn command_index(&self) -> u8 {
        self.index.get()
    }

    /// Cycles run so far, including failed ones
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Cycles whose transfer failed
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Bytes sent in the most recent cycle
    pub fn last_tx(&self) -> &[u8; TX_LEN] {
        &self.tx
    }

    pub fn transport(&self) -> &C {
        &self.spi
    }

    pub fn transport_mut(&mut self) -> &mut C {
        &mut self.spi
    }

    /// Give back the transport
    pub fn release(self) -> C {
        self.spi
    }

    /// Run one cycle
    ///
    /// The command index advances whether or not the transfer succeeded.
    pub fn run_cycle(&mut self) -> Result<Exchange<L>, C::Error> {
        let command = self.index.get();
        self.tx = CommandFrame::new(command).to_bytes();

        self.spi.select(self.slave);
        let result = self.spi.transfer_block(&self.tx, &mut self.rx);
        self.spi.deselect(self.slave);

        self.index.advance();
        self.cycles = self.cycles.wrapping_add(1);

        match result {
            Ok(()) => {
                trace!("command {} answered", command);
                Ok(Exchange {
                    command,
                    reply: self.rx,
                })
            }
            Err(e) => {
                self.failures = self.failures.wrapping_add(1);
                // Next cycle starts a fresh frame with the next command
                warn!("transfer failed, command {} skipped", command);
                Err(e)
            }
        }
    }

    /// Run the command cycle forever
    pub fn run(&mut self) -> ! {
        loop {
            let _ = self.run_cycle();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Transport that echoes the command byte across the reply
    #[derive(Default)]
    struct EchoSpi {
        selected: bool,
        selections: u32,
        fail_next: bool,
        last_tx: [u8; TX_LEN],
    }

    impl SpiController for EchoSpi {
        type Error = ();

        fn select(&mut self, _slave: SlaveSelect) {
            self.selected = true;
            self.selections += 1;
        }

        fn deselect(&mut self, _slave: SlaveSelect) {
            self.selected = false;
        }

        fn transfer_block(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), ()> {
            assert!(self.selected, "transfer outside chip select");
            self.last_tx.copy_from_slice(tx);
            if core::mem::take(&mut self.fail_next) {
                return Err(());
            }
            rx.fill(tx[0]);
            Ok(())
        }
    }

    #[test]
    fn test_sends_command_and_filler() {
        let mut seq: ControllerSequencer<_> = ControllerSequencer::new(EchoSpi::default(), SlaveSelect(1), 4);
        seq.run_cycle().unwrap();
        seq.run_cycle().unwrap();
        assert_eq!(seq.transport().last_tx, [0x01, 0x01, 0x02, 0x03, 0xAA]);
    }

    #[test]
    fn test_commands_cycle() {
        let mut seq: ControllerSequencer<_> = ControllerSequencer::new(EchoSpi::default(), SlaveSelect(1), 4);
        let mut issued = [0u8; 9];
        for slot in issued.iter_mut() {
            *slot = seq.run_cycle().unwrap().command;
        }
        assert_eq!(issued, [0, 1, 2, 3, 0, 1, 2, 3, 0]);
        assert_eq!(seq.cycles(), 9);
    }

    #[test]
    fn test_reply_captured() {
        let mut seq: ControllerSequencer<_> = ControllerSequencer::new(EchoSpi::default(), SlaveSelect(1), 4);
        seq.run_cycle().unwrap();
        let exchange = seq.run_cycle().unwrap();
        assert_eq!(exchange.command, 1);
        assert_eq!(exchange.reply, [1u8; REPLY_LEN]);
    }

    #[test]
    fn test_failure_still_advances_and_deselects() {
        let mut seq: ControllerSequencer<_> = ControllerSequencer::new(EchoSpi::default(), SlaveSelect(1), 4);
        seq.transport_mut().fail_next = true;

        assert!(seq.run_cycle().is_err());
        assert!(!seq.transport().selected);
        assert_eq!(seq.last_tx()[0], 0);
        assert_eq!(seq.command_index(), 1);
        assert_eq!(seq.failures(), 1);

        let exchange = seq.run_cycle().unwrap();
        assert_eq!(exchange.command, 1);
        assert_eq!(seq.transport().selections, 2);
    }
}
