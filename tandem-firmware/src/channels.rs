//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::AtomicU32;

use tandem_core::controller::Exchange;

/// Channel capacity for completed exchanges
const EXCHANGE_CHANNEL_SIZE: usize = 8;

/// Exchanges completed by the controller task, for checking and logging
pub static EXCHANGES: Channel<CriticalSectionRawMutex, Exchange, EXCHANGE_CHANNEL_SIZE> =
    Channel::new();

/// Replies that did not match the expected table row
pub static MISMATCHES: AtomicU32 = AtomicU32::new(0);

/// Controller overruns recovered by the overflow monitor
pub static OVERRUNS: AtomicU32 = AtomicU32::new(0);
