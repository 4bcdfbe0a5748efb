//! Configuration types
//!
//! Board-agnostic link configuration, storable as postcard binary data.

pub mod link;

pub use link::*;
