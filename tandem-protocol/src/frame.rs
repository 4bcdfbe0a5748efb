//! Frame layout and command frame encoding.
//!
//! Frame format:
//! - COMMAND (1 byte): response table index
//! - TURNAROUND (4 bytes): filler, ignored by the responder
//! - REPLY (8 bytes): response table row, clocked back by the responder

/// Command prefix length; the responder is notified after this many bytes
pub const COMMAND_BYTE_SIZE: usize = 1;

/// Bytes reserved for the responder to stage its reply
pub const TURNAROUND_LEN: usize = 4;

/// Reply payload length
pub const REPLY_LEN: usize = 8;

/// Bytes sent by the controller (COMMAND + TURNAROUND)
pub const TX_LEN: usize = COMMAND_BYTE_SIZE + TURNAROUND_LEN;

/// Complete frame length
pub const FRAME_LEN: usize = TX_LEN + REPLY_LEN;

/// Static turnaround filler sent after the command byte
pub const TURNAROUND_FILLER: [u8; TURNAROUND_LEN] = [0x01, 0x02, 0x03, 0xAA];

/// Errors that can occur while parsing frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Prefix is shorter than the command byte
    Incomplete,
}

/// Section sizes of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameLayout {
    /// Command prefix length
    pub command_len: usize,
    /// Turnaround filler length
    pub turnaround_len: usize,
    /// Reply payload length
    pub reply_len: usize,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl FrameLayout {
    /// 1 command byte, 4 turnaround bytes, 8 reply bytes
    pub const REFERENCE: Self = Self {
        command_len: COMMAND_BYTE_SIZE,
        turnaround_len: TURNAROUND_LEN,
        reply_len: REPLY_LEN,
    };

    /// Bytes the controller transmits
    pub const fn tx_len(&self) -> usize {
        self.command_len + self.turnaround_len
    }

    /// Offset of the first reply byte
    pub const fn reply_offset(&self) -> usize {
        self.tx_len()
    }

    /// Total bytes clocked per frame
    pub const fn frame_len(&self) -> usize {
        self.tx_len() + self.reply_len
    }
}

/// Controller-side command frame
///
/// Only the command byte varies between cycles; the turnaround filler is
/// static.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame {
    /// Response table index requested
    pub command: u8,
}

impl CommandFrame {
    pub fn new(command: u8) -> Self {
        Self { command }
    }

    /// Encoded transmit bytes
    pub fn to_bytes(&self) -> [u8; TX_LEN] {
        let mut buffer = [0u8; TX_LEN];
        buffer[0] = self.command;
        buffer[COMMAND_BYTE_SIZE..].copy_from_slice(&TURNAROUND_FILLER);
        buffer
    }

    /// Read the command from a received prefix
    pub fn parse(prefix: &[u8]) -> Result<Self, FrameError> {
        prefix
            .first()
            .map(|&command| Self { command })
            .ok_or(FrameError::Incomplete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_layout() {
        let layout = FrameLayout::REFERENCE;
        assert_eq!(layout.tx_len(), 5);
        assert_eq!(layout.reply_offset(), 5);
        assert_eq!(layout.frame_len(), 13);
        assert_eq!(layout.frame_len(), FRAME_LEN);
    }

    #[test]
    fn test_command_frame_bytes() {
        let frame = CommandFrame::new(2);
        assert_eq!(frame.to_bytes(), [0x02, 0x01, 0x02, 0x03, 0xAA]);
    }

    #[test]
    fn test_parse_prefix() {
        assert_eq!(CommandFrame::parse(&[7]), Ok(CommandFrame::new(7)));
        assert_eq!(CommandFrame::parse(&[]), Err(FrameError::Incomplete));
    }
}
