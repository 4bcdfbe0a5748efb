//! Responder-side callback abstractions
//!
//! A responder driver owns one [`ResponderEvents`] handler. It calls
//! [`ResponderEvents::on_command`] as soon as the command prefix of a frame
//! has arrived, and [`ResponderEvents::on_frame`] once chip select is
//! released. Both callbacks run in interrupt context: they must not block.

/// Errors returned when staging a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StageError {
    /// The turnaround bytes were already exhausted
    WindowClosed,
    /// Payload longer than the reply section of the frame
    Oversized,
}

/// How a frame ended, as seen by the responder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameStatus {
    /// Reply staged in time and clocked out
    Complete,
    /// Nothing was staged before the reply section started; the previous
    /// reply went out instead
    DeadlineMissed,
    /// The window was open but nothing was accepted into it (for example an
    /// oversized reply); the previous reply went out instead
    Unstaged,
}

/// Per-frame reply staging slot
///
/// Holds a borrowed reply for the in-flight frame. The slot is only open
/// while turnaround bytes remain; staging after that fails with
/// [`StageError::WindowClosed`].
#[derive(Debug)]
pub struct ReplySlot<'t> {
    payload: Option<&'t [u8]>,
    capacity: usize,
    open: bool,
}

impl<'t> ReplySlot<'t> {
    /// Slot for a frame whose turnaround window is still running
    pub fn open(capacity: usize) -> Self {
        Self {
            payload: None,
            capacity,
            open: true,
        }
    }

    /// Slot handed out after the turnaround window elapsed
    pub fn closed(capacity: usize) -> Self {
        Self {
            payload: None,
            capacity,
            open: false,
        }
    }

    /// Stage `payload` as the reply for this frame
    ///
    /// A later call replaces an earlier one.
    pub fn stage(&mut self, payload: &'t [u8]) -> Result<(), StageError> {
        if !self.open {
            return Err(StageError::WindowClosed);
        }
        if payload.len() > self.capacity {
            return Err(StageError::Oversized);
        }
        self.payload = Some(payload);
        Ok(())
    }

    /// Whether the turnaround window is still running
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Maximum reply length
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Currently staged reply, if any
    pub fn staged(&self) -> Option<&'t [u8]> {
        self.payload
    }

    /// Consume the slot, yielding the staged reply
    pub fn into_staged(self) -> Option<&'t [u8]> {
        self.payload
    }
}

/// Responder callbacks
///
/// `'t` is the lifetime of the reply storage. Staged replies are borrowed,
/// never copied, so the driver clocks out exactly the bytes it was given.
pub trait ResponderEvents<'t> {
    /// Command prefix received
    ///
    /// Must stage a reply through `slot` before returning.
    fn on_command(&mut self, prefix: &[u8], slot: &mut ReplySlot<'t>);

    /// Whole frame received, chip select released
    fn on_frame(&mut self, _frame: &[u8], _status: FrameStatus) {}
}
