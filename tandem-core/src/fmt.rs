//! Logging macros
//!
//! Based on features we either export defmt macros or the `log` facade.
//! Format strings stick to `{}` for integers and `{:?}` for everything else
//! so they read the same under both backends.

#![allow(unused_imports)]

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, error, info, trace, warn};

#[cfg(not(feature = "defmt"))]
pub(crate) use log::{debug, error, info, trace, warn};
