//! Overflow recovery
//!
//! Re-enables an endpoint whose transport buffers overflowed.

pub mod monitor;

pub use monitor::OverflowMonitor;
