//! Exchange report task
//!
//! Checks every reply against the expected table row and logs a summary
//! periodically.

use defmt::*;
use portable_atomic::Ordering;
use tandem_protocol::ResponseTable;

use crate::channels::{EXCHANGES, MISMATCHES, OVERRUNS};

/// Exchanges between summary lines
const SUMMARY_INTERVAL: u32 = 1000;

/// Report task - verifies replies from the responder
#[embassy_executor::task]
pub async fn report_task(table: &'static ResponseTable<4>) {
    info!("Report task started");

    let mut seen: u32 = 0;

    loop {
        let exchange = EXCHANGES.receive().await;
        let expected = table.lookup(exchange.command);

        if exchange.reply != *expected {
            let total = MISMATCHES.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                "Command {}: got {:02x}, expected {:02x} ({} mismatches)",
                exchange.command,
                exchange.reply,
                expected,
                total
            );
        } else {
            trace!("Command {} ok", exchange.command);
        }

        seen = seen.wrapping_add(1);
        if seen % SUMMARY_INTERVAL == 0 {
            info!(
                "{} exchanges, {} mismatches, {} overruns",
                seen,
                MISMATCHES.load(Ordering::Relaxed),
                OVERRUNS.load(Ordering::Relaxed)
            );
        }
    }
}
