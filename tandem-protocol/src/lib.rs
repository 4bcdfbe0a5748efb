//! Tandem link protocol
//!
//! This crate defines the wire layout of one controller/responder exchange
//! over a chip-select framed SPI link. The protocol is deliberately tiny:
//! the controller sends a command byte, the responder replies with a fixed
//! row from its response table inside the same frame.
//!
//! # Frame Layout
//!
//! ```text
//! ┌─────────┬──────────────────┬──────────────────┐
//! │ COMMAND │ TURNAROUND       │ REPLY            │
//! │ 1B      │ 4B (filler)      │ 8B               │
//! └─────────┴──────────────────┴──────────────────┘
//!  controller → responder        responder → controller
//! ```
//!
//! The responder learns the command after the first byte and must stage its
//! reply before the turnaround bytes run out.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod frame;
pub mod table;

pub use command::CommandIndex;
pub use frame::{
    CommandFrame, FrameError, FrameLayout, COMMAND_BYTE_SIZE, FRAME_LEN, REPLY_LEN, TURNAROUND_FILLER,
    TURNAROUND_LEN, TX_LEN,
};
pub use table::{ResponseTable, REFERENCE_TABLE};
