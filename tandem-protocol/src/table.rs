//! Response table
//!
//! Fixed mapping from command index to reply payload. The table is built
//! once and only ever read afterwards.

use crate::frame::REPLY_LEN;

/// Fixed command → reply mapping
///
/// `N` rows of `L` bytes each. Row 0 doubles as the fallback for commands
/// outside the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTable<const N: usize, const L: usize = REPLY_LEN> {
    rows: [[u8; L]; N],
}

/// Replies served by the reference responder
pub const REFERENCE_TABLE: ResponseTable<4> = ResponseTable::new([
    [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08],
    [0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18],
    [0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28],
    [0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38],
]);

impl<const N: usize, const L: usize> ResponseTable<N, L> {
    // Every command byte must be able to address a row, and row 0 must exist.
    const SHAPE_OK: () = assert!(N > 0 && N <= 256, "response table needs 1..=256 rows");

    /// Create a table from its rows
    pub const fn new(rows: [[u8; L]; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SHAPE_OK;
        Self { rows }
    }

    /// Number of rows
    pub const fn len(&self) -> usize {
        N
    }

    /// Always false; tables have at least one row
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Reply length in bytes
    pub const fn reply_len(&self) -> usize {
        L
    }

    /// Whether `command` addresses a row directly
    pub fn contains(&self, command: u8) -> bool {
        (command as usize) < N
    }

    /// Row at `index`, if present
    pub fn row(&self, index: usize) -> Option<&[u8; L]> {
        self.rows.get(index)
    }

    /// Reply for `command`, falling back to row 0 when out of range
    pub fn lookup(&self, command: u8) -> &[u8; L] {
        self.rows.get(command as usize).unwrap_or(&self.rows[0])
    }

    /// Iterate rows in command order
    pub fn iter(&self) -> impl Iterator<Item = &[u8; L]> {
        self.rows.iter()
    }
}
