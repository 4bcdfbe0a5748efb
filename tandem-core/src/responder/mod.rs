//! Responder side of the link
//!
//! Picks the reply for each command byte and stages it for the in-flight
//! frame.

pub mod dispatch;

pub use dispatch::{DispatchStats, FrameHook, NoHook, ResponderDispatch};
