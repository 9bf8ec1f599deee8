//! `vttouchw`: drive a VTTOUCHW-panel ERV from a Linux/macOS machine.
//!
//! ```text
//! vttouchw /dev/ttyUSB0 standby      # set a mode
//! vttouchw /dev/ttyUSB0              # list modes
//! vttouchw /dev/ttyUSB0 --watch      # dump non-background frames as hex
//! ```
//!
//! Requires a USB-to-RS485 adapter on the panel's D+, D- and GND wires.
//! Log level comes from `VTTOUCHW_LOG` (default `info`).

use std::process::ExitCode;

use anyhow::{Result, anyhow};
use clap::Parser;
use log::LevelFilter;

use ervctl::adapters::serial_host::HostSerialLink;
use ervctl::adapters::time::SleepDelay;
use ervctl::app::ports::SerialLink;
use ervctl::config::DriverConfig;
use ervctl::erv::driver::RX_BUFFER_LEN;
use ervctl::erv::frames::{FRAME_END, Hex, is_background, is_frame};
use ervctl::erv::{ErvDriver, Mode};

#[derive(Parser, Debug)]
#[command(version, about = "Impersonate the VTTOUCHW wall panel on an RS-485 bus")]
struct Args {
    /// Serial device of the USB-to-RS485 adapter
    device: String,

    /// Mode to command; omit to list the available modes
    mode: Option<String>,

    /// Transmissions before giving up (at least 2)
    #[arg(long, default_value_t = DriverConfig::default().attempts)]
    attempts: u8,

    /// Print every frame seen on the bus instead of sending
    #[arg(long)]
    watch: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_env("VTTOUCHW_LOG")
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    let config = DriverConfig {
        attempts: args.attempts,
        ..DriverConfig::default()
    };
    config.validate()?;

    let mut link = HostSerialLink::new(&args.device, &config);

    if args.watch {
        return watch(&mut link);
    }

    let Some(name) = args.mode else {
        print_modes();
        return Ok(ExitCode::SUCCESS);
    };

    let mode: Mode = match name.parse() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::from(2));
        }
    };

    let mut erv = ErvDriver::new(link, SleepDelay, config);
    let status = erv.set_mode(mode);
    println!("{} {}", mode, status);

    // The bus outcome is reported, not turned into an exit code.
    Ok(ExitCode::SUCCESS)
}

fn print_modes() {
    let names: Vec<&str> = Mode::ALL.iter().map(|m| m.name()).collect();
    println!("ERV Control Options: {}", names.join(" | "));
    for mode in Mode::ALL {
        println!("  {:<10} {}", mode.name(), mode.describe());
    }
}

/// Dump frames forever, hiding the known background chatter so control
/// frames stand out. Nothing is decoded.
fn watch(link: &mut HostSerialLink) -> Result<ExitCode> {
    link.open()
        .map_err(|e| anyhow!("{}: {}", link.path(), e))?;
    println!("Watching {} (Ctrl+C to stop)", link.path());

    let mut buf = [0u8; RX_BUFFER_LEN];
    loop {
        let n = link
            .read_until(FRAME_END, &mut buf, 1_000)
            .map_err(|e| anyhow!("{}: {}", link.path(), e))?;
        let frame = &buf[..n];
        if is_frame(frame) && !is_background(frame) {
            println!("{}", Hex(frame));
        }
    }
}
