//! End-to-end tests: controller sequencer → loopback → responder dispatch

use proptest::prelude::*;

use tandem_core::config::LinkConfig;
use tandem_core::controller::ControllerSequencer;
use tandem_core::endpoint::{EndpointState, Role};
use tandem_core::loopback::{Loopback, LoopbackError};
use tandem_core::overflow::OverflowMonitor;
use tandem_core::responder::ResponderDispatch;
use tandem_hal::{FrameStatus, SpiController, SpiInstance};
use tandem_protocol::{
    CommandFrame, FrameLayout, ResponseTable, COMMAND_BYTE_SIZE, REFERENCE_TABLE, REPLY_LEN,
};

type Link<'t> = Loopback<'t, ResponderDispatch<'t, 4>, OverflowMonitor>;

fn link(table: &ResponseTable<4>) -> Link<'_> {
    let config = LinkConfig::default();
    Loopback::new(
        config,
        FrameLayout::REFERENCE,
        ResponderDispatch::new(table),
        OverflowMonitor::new(config),
        table.lookup(0),
    )
}

/// Issue one frame with an arbitrary command byte
fn send(link: &mut Link<'_>, command: u8) -> Result<[u8; REPLY_LEN], LoopbackError> {
    let slave = LinkConfig::default().slave;
    let mut rx = [0u8; REPLY_LEN];
    link.select(slave);
    let result = link.transfer_block(&CommandFrame::new(command).to_bytes(), &mut rx);
    link.deselect(slave);
    result.map(|()| rx)
}

#[test]
fn reference_scenario() {
    let table = REFERENCE_TABLE;
    let mut link = link(&table);

    let expected: [(u8, [u8; 8]); 5] = [
        (0, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]),
        (1, [0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18]),
        (2, [0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28]),
        (3, [0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38]),
        (9, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]),
    ];

    for (command, reply) in expected {
        assert_eq!(send(&mut link, command).unwrap(), reply, "command {command}");
    }
    assert_eq!(link.responder().stats().fallbacks, 1);
}

#[test]
fn sequencer_cycles_through_table() {
    let table = REFERENCE_TABLE;
    let mut seq = ControllerSequencer::for_table(link(&table), LinkConfig::default().slave, &table);

    for cycle in 0..12u8 {
        let exchange = seq.run_cycle().unwrap();
        assert_eq!(exchange.command, cycle % 4);
        assert_eq!(exchange.reply, *table.lookup(exchange.command));
    }
    assert_eq!(seq.transport().stats().frames, 12);
    assert_eq!(seq.transport().stats().deadline_misses, 0);
}

#[test]
fn controller_overflow_keeps_protocol_state() {
    let table = REFERENCE_TABLE;
    let mut seq = ControllerSequencer::for_table(link(&table), LinkConfig::default().slave, &table);

    // Commands 0 and 1 go through
    seq.run_cycle().unwrap();
    seq.run_cycle().unwrap();
    let staged_before = seq.transport().staged_reply();
    let responder_before = seq.transport().responder().stats();

    // Command 2 is lost to the overflow
    seq.transport_mut().inject_overflow(SpiInstance::Spi0);
    assert_eq!(
        seq.run_cycle(),
        Err(LoopbackError::Overflow(SpiInstance::Spi0))
    );

    let link = seq.transport();
    assert_eq!(link.overflow_handler().recoveries(Role::Controller), 1);
    assert_eq!(link.overflow_handler().recoveries(Role::Responder), 0);
    assert_eq!(link.overflow_handler().state(Role::Controller), EndpointState::Ready);
    assert!(link.channel_enabled(SpiInstance::Spi0));
    assert_eq!(link.channel_resets(SpiInstance::Spi1), 0);
    // Responder side untouched
    assert_eq!(link.responder().stats(), responder_before);
    assert_eq!(link.staged_reply(), staged_before);
    assert_eq!(*link.responder().table(), REFERENCE_TABLE);

    // Cycle resumes with command 3 and wraps normally
    for expected in [3u8, 0, 1, 2] {
        let exchange = seq.run_cycle().unwrap();
        assert_eq!(exchange.command, expected);
        assert_eq!(exchange.reply, *table.lookup(expected));
    }
}

#[test]
fn controller_overflow_mid_frame_keeps_staged_reply() {
    let table = REFERENCE_TABLE;
    let mut seq = ControllerSequencer::for_table(link(&table), LinkConfig::default().slave, &table);

    seq.run_cycle().unwrap();
    seq.run_cycle().unwrap();

    // Command 2 reaches the responder, then the controller overruns during the turnaround
    seq.transport_mut()
        .inject_overflow_at(SpiInstance::Spi0, COMMAND_BYTE_SIZE + 1);
    assert_eq!(
        seq.run_cycle(),
        Err(LoopbackError::Overflow(SpiInstance::Spi0))
    );

    let link = seq.transport();
    assert_eq!(link.responder().stats().commands, 3);
    assert_eq!(link.staged_reply(), &table.lookup(2)[..]);
    assert_eq!(link.overflow_handler().recoveries(Role::Controller), 1);
    assert_eq!(link.overflow_handler().state(Role::Responder), EndpointState::Ready);
    assert_eq!(link.channel_resets(SpiInstance::Spi1), 0);

    // A late dispatch clocks out the reply that survived the overflow
    seq.transport_mut()
        .set_dispatch_latency(FrameLayout::REFERENCE.turnaround_len + 1);
    let exchange = seq.run_cycle().unwrap();
    assert_eq!(exchange.command, 3);
    assert_eq!(exchange.reply, *table.lookup(2));

    seq.transport_mut().set_dispatch_latency(0);
    let exchange = seq.run_cycle().unwrap();
    assert_eq!(exchange.command, 0);
    assert_eq!(exchange.reply, *table.lookup(0));
}

#[test]
fn responder_overflow_recovers() {
    let table = REFERENCE_TABLE;
    let mut link = link(&table);

    assert_eq!(send(&mut link, 1).unwrap(), *table.lookup(1));
    link.inject_overflow(SpiInstance::Spi1);
    assert!(send(&mut link, 2).is_err());
    assert_eq!(link.overflow_handler().recoveries(Role::Responder), 1);
    assert_eq!(send(&mut link, 1).unwrap(), *table.lookup(1));
}

#[test]
fn missed_deadline_is_reported_to_frame_callback() {
    struct StatusLog(Option<FrameStatus>);

    impl tandem_core::responder::FrameHook for StatusLog {
        fn on_frame(&mut self, _frame: &[u8], status: FrameStatus) {
            self.0 = Some(status);
        }
    }

    let table = REFERENCE_TABLE;
    let config = LinkConfig::default();
    let mut link = Loopback::new(
        config,
        FrameLayout::REFERENCE,
        ResponderDispatch::with_hook(&table, StatusLog(None)),
        OverflowMonitor::new(config),
        table.lookup(0),
    );

    let slave = config.slave;
    let mut rx = [0u8; REPLY_LEN];
    link.set_dispatch_latency(10);
    link.select(slave);
    link.transfer_block(&CommandFrame::new(3).to_bytes(), &mut rx)
        .unwrap();
    link.deselect(slave);

    // Nothing staged yet, so the idle reply (row 0) went out
    assert_eq!(rx, *table.lookup(0));
    assert_eq!(link.responder().hook().0, Some(FrameStatus::DeadlineMissed));
}

proptest! {
    #[test]
    fn in_range_commands_get_their_row(command in 0u8..4) {
        let table = REFERENCE_TABLE;
        let mut link = link(&table);
        prop_assert_eq!(send(&mut link, command).unwrap(), *table.lookup(command));
    }

    #[test]
    fn out_of_range_commands_get_row_zero(command in 4u8..=255) {
        let table = REFERENCE_TABLE;
        let mut link = link(&table);
        prop_assert_eq!(send(&mut link, command).unwrap(), *table.lookup(0));
    }

    #[test]
    fn replay_is_identical(first in any::<u8>(), gap in proptest::collection::vec(any::<u8>(), 0..8)) {
        let table = REFERENCE_TABLE;
        let mut link = link(&table);

        let before = send(&mut link, first).unwrap();
        for command in gap {
            send(&mut link, command).unwrap();
        }
        prop_assert_eq!(send(&mut link, first).unwrap(), before);
    }

    #[test]
    fn index_never_skips(cycles in 1usize..64) {
        let table = REFERENCE_TABLE;
        let mut seq = ControllerSequencer::for_table(link(&table), LinkConfig::default().slave, &table);

        let mut previous = None;
        for _ in 0..cycles {
            let command = seq.run_cycle().unwrap().command;
            if let Some(prev) = previous {
                prop_assert_eq!(command, (prev + 1) % 4);
            }
            previous = Some(command);
        }
    }
}
