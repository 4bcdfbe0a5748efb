//! Link controller task
//!
//! Runs the command cycle against the external responder. Each cycle is one
//! blocking block transfer; the task yields to the executor in between so
//! the report task gets to run.

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use portable_atomic::Ordering;
use tandem_core::config::LinkConfig;
use tandem_core::controller::ControllerSequencer;
use tandem_core::overflow::OverflowMonitor;
use tandem_hal::OverflowEvents;

use crate::channels::{EXCHANGES, OVERRUNS};
use crate::link::{BlockingController, PeripheralResets};

/// Controller transport on SPI0 with a GPIO chip select
pub type Controller = BlockingController<Spi<'static, SPI0, Blocking>, Output<'static>>;

/// Controller task - one frame per loop iteration, forever
#[embassy_executor::task]
pub async fn controller_task(
    mut sequencer: ControllerSequencer<Controller>,
    mut monitor: OverflowMonitor,
    config: LinkConfig,
) {
    info!("Controller task started");

    let mut resets = PeripheralResets;
    let instance = config.controller;

    loop {
        match sequencer.run_cycle() {
            Ok(exchange) => {
                if EXCHANGES.try_send(exchange).is_err() {
                    trace!("Exchange channel full, dropping command {}", exchange.command);
                }
            }
            Err(e) => {
                warn!("Transfer failed: {:?}", e);
            }
        }

        if resets.overrun_pending(instance) {
            monitor.on_overflow(instance, &mut resets);
            OVERRUNS.fetch_add(1, Ordering::Relaxed);
        }

        yield_now().await;
    }
}
