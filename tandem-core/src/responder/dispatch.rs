//! Responder dispatch
//!
//! Runs from the transport's command callback, as soon as the first byte of
//! a frame has arrived. It has until the turnaround bytes run out to stage a
//! reply, so it does one table lookup and nothing else.

use tandem_hal::{FrameStatus, ReplySlot, ResponderEvents, StageError};
use tandem_protocol::{CommandFrame, ResponseTable, REPLY_LEN};

use crate::fmt::{trace, warn};

/// Full-frame extension point
///
/// Called once chip select is released, with every byte the responder
/// received. Runs in interrupt context.
pub trait FrameHook {
    fn on_frame(&mut self, frame: &[u8], status: FrameStatus);
}

/// Hook that ignores completed frames
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl FrameHook for NoHook {
    fn on_frame(&mut self, _frame: &[u8], _status: FrameStatus) {}
}

/// Dispatch counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchStats {
    /// Command callbacks handled
    pub commands: u32,
    /// Commands outside the table, answered with row 0
    pub fallbacks: u32,
    /// Replies that could not be staged before the turnaround elapsed
    pub late: u32,
    /// Replies too long for the reply section
    pub oversized: u32,
    /// Completed frames
    pub frames: u32,
}

/// Command byte → response table row
pub struct ResponderDispatch<'t, const N: usize, const L: usize = REPLY_LEN, H = NoHook> {
    table: &'t ResponseTable<N, L>,
    hook: H,
    stats: DispatchStats,
}

impl<'t, const N: usize, const L: usize> ResponderDispatch<'t, N, L, NoHook> {
    /// Create a dispatch serving `table`
    pub fn new(table: &'t ResponseTable<N, L>) -> Self {
        Self::with_hook(table, NoHook)
    }
}

impl<'t, const N: usize, const L: usize, H: FrameHook> ResponderDispatch<'t, N, L, H> {
    /// Create a dispatch that also forwards completed frames to `hook`
    pub fn with_hook(table: &'t ResponseTable<N, L>, hook: H) -> Self {
        Self {
            table,
            hook,
            stats: DispatchStats::default(),
        }
    }

    /// Reply for `command`; row 0 when out of range
    pub fn select(&self, command: u8) -> &'t [u8; L] {
        self.table.lookup(command)
    }

    /// Table being served
    pub fn table(&self) -> &'t ResponseTable<N, L> {
        self.table
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }
}

impl<'t, const N: usize, const L: usize, H: FrameHook> ResponderEvents<'t>
    for ResponderDispatch<'t, N, L, H>
{
    fn on_command(&mut self, prefix: &[u8], slot: &mut ReplySlot<'t>) {
        self.stats.commands = self.stats.commands.wrapping_add(1);

        // An empty prefix cannot carry a command; answer as for command 0
        let command = CommandFrame::parse(prefix).map_or(0, |frame| frame.command);
        if !self.table.contains(command) {
            self.stats.fallbacks = self.stats.fallbacks.wrapping_add(1);
            trace!("command {} out of range, replying with row 0", command);
        }

        match slot.stage(self.select(command)) {
            Ok(()) => {}
            Err(StageError::WindowClosed) => {
                self.stats.late = self.stats.late.wrapping_add(1);
                warn!("turnaround elapsed before reply to command {} was staged", command);
            }
            Err(StageError::Oversized) => {
                self.stats.oversized = self.stats.oversized.wrapping_add(1);
                warn!("reply of {} bytes exceeds slot of {}", L, slot.capacity());
            }
        }
    }

    fn on_frame(&mut self, frame: &[u8], status: FrameStatus) {
        self.stats.frames = self.stats.frames.wrapping_add(1);
        self.hook.on_frame(frame, status);
    }
}
