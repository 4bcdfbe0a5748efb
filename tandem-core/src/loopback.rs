//! Software loopback transport
//!
//! Wires a controller-side [`SpiController`] straight into a responder
//! handler, the way the two SPI instances of one chip are joined by an
//! internal loopback. Frames are clocked one byte at a time:
//!
//! - after `command_len` bytes the responder's command callback fires
//! - reply bytes come from whatever the callback staged
//! - the frame callback fires once the last byte has gone through
//!
//! Dispatch latency can be simulated in byte times. Staging finishes that
//! many bytes after the command prefix, and has to be done by the time the
//! last turnaround byte is through. A latency beyond the turnaround budget
//! hands the responder a closed [`ReplySlot`], and the frame goes out with
//! the previous reply.
//!
//! Overflows can be injected per instance, before the first byte or at any
//! byte of the next frame. The transfer is then aborted, the channel is held
//! disabled and the overflow handler is given the chance to reset it.

use heapless::Vec;
use tandem_hal::{
    ChannelReset, FrameStatus, OverflowEvents, ReplySlot, ResponderEvents, SlaveSelect,
    SpiController, SpiInstance,
};
use tandem_protocol::FrameLayout;

use crate::config::LinkConfig;
use crate::endpoint::Role;
use crate::fmt::{debug, trace, warn};

/// Largest frame the loopback can clock
pub const MAX_FRAME_LEN: usize = 64;

/// Byte clocked out by an endpoint with nothing to say
pub const DUMMY_BYTE: u8 = 0x00;

/// Loopback transfer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopbackError {
    /// Transfer started without the responder's chip select asserted
    NotSelected,
    /// Frame aborted by a buffer overflow on this instance
    Overflow(SpiInstance),
    /// Channel still held in reset
    ChannelDisabled(Role),
    /// Frame longer than [`MAX_FRAME_LEN`]
    FrameTooLong,
    /// Frame or layout leaves no command prefix to dispatch on
    FrameTooShort,
}

/// Loopback counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Frames clocked to completion
    pub frames: u32,
    /// Frames whose reply was not staged in time
    pub deadline_misses: u32,
    /// Frames whose reply was staged in time but not accepted
    pub unstaged: u32,
    /// Frames aborted by an overflow
    pub overflows: u32,
}

/// Enable state of both SPI instances
#[derive(Debug, Clone, Copy)]
struct Channels {
    enabled: [bool; 2],
    resets: [u32; 2],
}

impl Channels {
    fn new() -> Self {
        Self {
            enabled: [true; 2],
            resets: [0; 2],
        }
    }

    fn is_enabled(&self, instance: SpiInstance) -> bool {
        self.enabled[instance.index() as usize]
    }

    fn disable(&mut self, instance: SpiInstance) {
        self.enabled[instance.index() as usize] = false;
    }
}

impl ChannelReset for Channels {
    fn reset(&mut self, instance: SpiInstance) {
        let slot = instance.index() as usize;
        // Out of reset, ready for the next frame
        self.enabled[slot] = true;
        self.resets[slot] = self.resets[slot].wrapping_add(1);
    }
}

/// Controller and responder joined in software
pub struct Loopback<'t, R, O> {
    config: LinkConfig,
    layout: FrameLayout,
    responder: R,
    overflow: O,
    channels: Channels,
    selected: Option<SlaveSelect>,
    last_reply: &'t [u8],
    frame: Vec<u8, MAX_FRAME_LEN>,
    pending_overflow: Option<(SpiInstance, usize)>,
    dispatch_latency: usize,
    stats: LinkStats,
}

impl<'t, R, O> Loopback<'t, R, O>
where
    R: ResponderEvents<'t>,
    O: OverflowEvents,
{
    /// Create a loopback link
    ///
    /// `idle_reply` is what the responder clocks out before anything has
    /// been staged.
    pub fn new(
        config: LinkConfig,
        layout: FrameLayout,
        responder: R,
        overflow: O,
        idle_reply: &'t [u8],
    ) -> Self {
        Self {
            config,
            layout,
            responder,
            overflow,
            channels: Channels::new(),
            selected: None,
            last_reply: idle_reply,
            frame: Vec::new(),
            pending_overflow: None,
            dispatch_latency: 0,
            stats: LinkStats::default(),
        }
    }

    /// Delay, in byte times, between the command prefix and the command callback
    pub fn set_dispatch_latency(&mut self, bytes: usize) {
        self.dispatch_latency = bytes;
    }

    /// Abort the next transfer with an overflow on `instance`
    pub fn inject_overflow(&mut self, instance: SpiInstance) {
        self.inject_overflow_at(instance, 0);
    }

    /// Abort the next transfer with an overflow on `instance` while byte
    /// `pos` is clocked
    ///
    /// Bytes before `pos` go through as usual, so the command callback has
    /// already run when `pos` is past the command prefix. Positions past the
    /// end of the frame hit its last byte.
    pub fn inject_overflow_at(&mut self, instance: SpiInstance, pos: usize) {
        self.pending_overflow = Some((instance, pos));
    }

    /// Hold `instance` in reset without notifying the overflow handler
    pub fn disable_channel(&mut self, instance: SpiInstance) {
        self.channels.disable(instance);
    }

    pub fn channel_enabled(&self, instance: SpiInstance) -> bool {
        self.channels.is_enabled(instance)
    }

    /// Times `instance` has been taken out of reset
    pub fn channel_resets(&self, instance: SpiInstance) -> u32 {
        self.channels.resets[instance.index() as usize]
    }

    pub fn responder(&self) -> &R {
        &self.responder
    }

    pub fn overflow_handler(&self) -> &O {
        &self.overflow
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Bytes the responder received during the last frame, up to the point
    /// an overflow cut it short
    pub fn last_frame(&self) -> &[u8] {
        &self.frame
    }

    /// Reply the responder will clock out if the next staging is late
    pub fn staged_reply(&self) -> &'t [u8] {
        self.last_reply
    }

    fn raise_overflow(&mut self, instance: SpiInstance) {
        self.channels.disable(instance);
        self.stats.overflows = self.stats.overflows.wrapping_add(1);
        debug!("overflow injected on {:?}", instance);
        self.overflow.on_overflow(instance, &mut self.channels);
    }

    fn check_channels(&self) -> Result<(), LoopbackError> {
        for role in Role::ALL {
            if !self.channels.is_enabled(self.config.instance_of(role)) {
                return Err(LoopbackError::ChannelDisabled(role));
            }
        }
        Ok(())
    }

    /// Fire the command callback and collect the staged reply
    fn dispatch(&mut self) -> Result<&'t [u8], FrameStatus> {
        let capacity = self.layout.reply_len;
        let mut slot = if self.dispatch_latency <= self.layout.turnaround_len {
            ReplySlot::open(capacity)
        } else {
            ReplySlot::closed(capacity)
        };
        self.responder.on_command(&self.frame, &mut slot);

        let in_time = slot.is_open();
        match slot.into_staged() {
            Some(staged) => Ok(staged),
            None if in_time => Err(FrameStatus::Unstaged),
            None => Err(FrameStatus::DeadlineMissed),
        }
    }
}

impl<'t, R, O> SpiController for Loopback<'t, R, O>
where
    R: ResponderEvents<'t>,
    O: OverflowEvents,
{
    type Error = LoopbackError;

    fn select(&mut self, slave: SlaveSelect) {
        if slave == self.config.slave {
            self.selected = Some(slave);
        }
    }

    fn deselect(&mut self, slave: SlaveSelect) {
        if self.selected == Some(slave) {
            self.selected = None;
        }
    }

    fn transfer_block(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), LoopbackError> {
        if self.selected.is_none() {
            return Err(LoopbackError::NotSelected);
        }
        let frame_len = tx.len() + rx.len();
        let command_len = self.layout.command_len;
        if frame_len > MAX_FRAME_LEN {
            return Err(LoopbackError::FrameTooLong);
        }
        if command_len == 0 || frame_len < command_len {
            return Err(LoopbackError::FrameTooShort);
        }
        self.check_channels()?;
        let overflow = self
            .pending_overflow
            .take()
            .map(|(instance, pos)| (instance, pos.min(frame_len - 1)));

        let reply_offset = self.layout.reply_offset();
        let mut reply = self.last_reply;
        let mut status = FrameStatus::Complete;

        self.frame.clear();
        for pos in 0..frame_len {
            if let Some((instance, at)) = overflow {
                if at == pos {
                    // Whatever the responder staged stays staged
                    self.last_reply = reply;
                    self.raise_overflow(instance);
                    return Err(LoopbackError::Overflow(instance));
                }
            }

            let mosi = tx.get(pos).copied().unwrap_or(DUMMY_BYTE);
            // Capacity checked against MAX_FRAME_LEN above
            let _ = self.frame.push(mosi);

            if pos + 1 == command_len {
                match self.dispatch() {
                    Ok(staged) => reply = staged,
                    Err(missed) => {
                        status = missed;
                        if missed == FrameStatus::DeadlineMissed {
                            self.stats.deadline_misses = self.stats.deadline_misses.wrapping_add(1);
                        } else {
                            self.stats.unstaged = self.stats.unstaged.wrapping_add(1);
                        }
                        warn!("no reply staged for frame {}: {:?}", self.stats.frames, missed);
                    }
                }
            }

            let miso = pos
                .checked_sub(reply_offset)
                .and_then(|i| reply.get(i).copied())
                .unwrap_or(DUMMY_BYTE);
            if let Some(i) = pos.checked_sub(tx.len()) {
                rx[i] = miso;
            }
        }

        self.last_reply = reply;
        self.responder.on_frame(&self.frame, status);
        self.stats.frames = self.stats.frames.wrapping_add(1);
        trace!("frame of {} bytes complete", frame_len);

        Ok(())
    }
}
