//! Tandem - SPI command/response link controller
//!
//! Main firmware binary for RP2040 boards. Drives the controller side of the
//! link on SPI0 against an external responder and checks every reply
//! against the reference response table.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::spi::{self, Spi};
use tandem_core::config::LinkConfig;
use tandem_core::controller::ControllerSequencer;
use tandem_core::overflow::OverflowMonitor;
use tandem_hal::spi::{Phase, Polarity};
use tandem_protocol::{ResponseTable, REFERENCE_TABLE};
use {defmt_rtt as _, panic_probe as _};

use crate::link::BlockingController;

mod channels;
mod link;
mod tasks;

/// Replies the responder is expected to serve
static TABLE: ResponseTable<4> = REFERENCE_TABLE;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tandem firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = LinkConfig::default();
    if let Err(e) = config.validate() {
        error!("Invalid link config: {:?}", e);
    }

    // Pin assignments are board-specific (SPI0: SCK=GPIO18, MOSI=GPIO19, MISO=GPIO16, CS=GPIO17)
    let spi_config = spi_config(&config);
    info!("SPI0 at {} Hz, {:?}", spi_config.frequency, config.mode);
    let bus = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);

    let controller = BlockingController::new(bus, cs, config.slave);
    let sequencer = ControllerSequencer::for_table(controller, config.slave, &TABLE);
    let monitor = OverflowMonitor::new(config);

    info!("Link initialized, {} commands", TABLE.len());

    // Spawn tasks
    spawner.spawn(tasks::report_task(&TABLE)).unwrap();
    spawner
        .spawn(tasks::controller_task(sequencer, monitor, config))
        .unwrap();

    info!("All tasks spawned, link running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Translate the link configuration into embassy-rp SPI settings
fn spi_config(config: &LinkConfig) -> spi::Config {
    let (polarity, phase): (Polarity, Phase) = config.mode.into();

    let mut cfg = spi::Config::default();
    cfg.frequency = config.bit_rate(embassy_rp::clocks::clk_peri_freq());
    cfg.polarity = match polarity {
        Polarity::IdleLow => spi::Polarity::IdleLow,
        Polarity::IdleHigh => spi::Polarity::IdleHigh,
    };
    cfg.phase = match phase {
        Phase::CaptureOnFirstTransition => spi::Phase::CaptureOnFirstTransition,
        Phase::CaptureOnSecondTransition => spi::Phase::CaptureOnSecondTransition,
    };
    cfg
}
