//! Tandem Hardware Abstraction Layer
//!
//! This crate defines the transport collaborator interface that the link
//! core talks to. Chip-specific drivers (or the software loopback in
//! `tandem-core`) implement these traits; the core never touches registers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tandem-core (sequencer, dispatch, ...) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tandem-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   firmware    │       │   software    │
//! │  SPI driver   │       │   loopback    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`spi::SpiController`] - Blocking block transfers on the controller side
//! - [`responder::ResponderEvents`] - Command and frame callbacks on the responder side
//! - [`reset::ChannelReset`], [`reset::OverflowEvents`] - Overflow recovery

#![no_std]
#![deny(unsafe_code)]

pub mod reset;
pub mod responder;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use reset::{ChannelReset, OverflowEvents};
pub use responder::{FrameStatus, ReplySlot, ResponderEvents, StageError};
pub use spi::{Mode, SlaveSelect, SpiController, SpiInstance};
