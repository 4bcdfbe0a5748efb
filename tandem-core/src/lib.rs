//! Board-agnostic core logic for the Tandem SPI link
//!
//! This crate contains everything that does not depend on a specific SPI
//! peripheral:
//!
//! - Controller sequencer (command cycling, one frame per cycle)
//! - Responder dispatch (command byte → staged table row)
//! - Overflow monitor (per-endpoint recovery state machine)
//! - Link configuration
//! - Software loopback transport for host-side testing

#![no_std]
#![deny(unsafe_code)]

mod fmt;

pub mod config;
pub mod controller;
pub mod endpoint;
pub mod loopback;
pub mod overflow;
pub mod responder;
