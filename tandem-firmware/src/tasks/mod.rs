//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod controller;
pub mod report;

pub use controller::{controller_task, Controller};
pub use report::report_task;
