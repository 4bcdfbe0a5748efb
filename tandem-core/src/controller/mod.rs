//! Controller side of the link
//!
//! Drives the command cycle, one framed transfer per command.

pub mod sequencer;

pub use sequencer::{ControllerSequencer, Exchange};
