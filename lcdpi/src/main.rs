mod config;
mod demo;

use std::time::Duration;
use dotenv::dotenv;
use lcdpi_gpio::delay::{Delay, StdDelay};
use lcdpi_gpio::gpiod::GpiodDriver;
use lcdpi_gpio::lcd::hd44780::LiquidCrystal;
use lcdpi_gpio::mock::BusRecorder;
use lcdpi_gpio::raw::RawGpioDriver;
use lcdpi_gpio::GpioDriver;
use log::{debug, info};
use sysinfo::System;
use crate::config::{Backend, Config};

fn open_gpio(config: &Config, recorder: &BusRecorder) -> eyre::Result<Box<dyn GpioDriver>> {
    Ok(match config.backend {
        Backend::Raw => Box::new(RawGpioDriver::new_mem()?),
        Backend::Gpiomem => Box::new(RawGpioDriver::new_gpiomem()?),
        Backend::Gpiod => Box::new(GpiodDriver::open(&config.chip)?),
        Backend::DryRun => Box::new(recorder.gpio()),
    })
}

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    info!("lcdpi starting...");
    info!(
        "System ver {} kernel ver {}",
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
    );
    info!("Architecture {}", System::cpu_arch());

    debug!("Trying to load config...");
    let mut config = if let Some(config) = Config::try_load()? {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };
    config.apply_env()?;

    let pins = config.pins.assignment()?;
    info!(
        "LCD @ RS: {}, E: {}, Data: {:?}, {:?}",
        pins.register_select,
        pins.enable,
        pins.wired_data_lines(),
        config.geometry
    );

    let recorder = BusRecorder::new();
    let dry_run = config.backend == Backend::DryRun;

    debug!("Initializing GPIO driver...");
    let gpio = open_gpio(&config, &recorder)?;
    debug!("{:?} initialized.", gpio);

    let mut std_delay = StdDelay;
    let mut recorded_delay = recorder.delay();
    let delay: &mut dyn Delay = if dry_run {
        &mut recorded_delay
    } else {
        &mut std_delay
    };

    debug!("Initializing LCD driver...");
    let mut lcd = LiquidCrystal::new(pins, config.geometry.into(), gpio, delay);
    lcd.init(config.char_size())?;

    let pause = if dry_run {
        Duration::ZERO
    } else {
        Duration::from_secs(2)
    };
    demo::run(&mut lcd, pause)?;

    if dry_run {
        let transfers = recorder.transfers(
            pins.register_select,
            pins.enable,
            &pins.wired_data_lines(),
        );
        for transfer in &transfers {
            debug!(
                "{} {:08b}",
                if transfer.rs { "DATA" } else { "CMD " },
                transfer.value
            );
        }
        info!(
            "Dry run: {} bytes transferred, {} µs of bus delays.",
            transfers.len(),
            recorder.total_delay_us()
        );
    }

    info!("Demo finished.");
    Ok(())
}
