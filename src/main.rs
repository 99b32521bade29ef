use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context};
use clap::Parser;
use crossbeam_channel::bounded;
use dotenv::dotenv;
use log::{error, info};

use posture_capture::config::AppConfig;
use posture_capture::logger;
use posture_capture::serial::{self, run_serial_reader};
use posture_capture::storage::{run_csv_sink, CsvSink};

#[derive(Parser)]
#[command(name = "posture-capture")]
#[command(about = "Log labeled posture readings from a serial IMU into a CSV file")]
struct Cli {
    /// TOML config file; defaults to posture.toml when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port to read from
    #[arg(long)]
    port: Option<String>,

    /// Baud rate for the serial port
    #[arg(long)]
    baud: Option<u32>,

    /// CSV file the rows are appended to
    #[arg(long)]
    output: Option<String>,

    /// List the serial ports visible on this machine and exit
    #[arg(long)]
    list_ports: bool,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::init_logger();

    let cli = Cli::parse();

    if cli.list_ports {
        serial::list_ports().context("failed to enumerate serial ports")?;
        return Ok(());
    }

    let mut config =
        AppConfig::load_or_default(cli.config.as_deref()).context("failed to load configuration")?;
    config.apply_env_overrides()?;

    if let Some(port) = cli.port {
        config.serial.port = port;
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }
    if let Some(output) = cli.output {
        config.capture.output = output;
    }
    config.validate()?;

    info!("Application starting");

    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let ctrlc_signal = Arc::clone(&shutdown_signal);
    ctrlc::set_handler(move || {
        if ctrlc_signal.swap(true, Ordering::Relaxed) {
            // Second Ctrl-C skips the drain and leaves immediately.
            std::process::exit(130);
        }
        info!("Shutdown requested, finishing pending writes");
    })
    .context("failed to install Ctrl-C handler")?;

    let (frame_sender, frame_receiver) = bounded(config.capture.channel_capacity);

    // Open the output before touching the port so a bad path fails before
    // the settle delay.
    let sink = CsvSink::open(config.get_capture_path(), config.capture.flush_each_row)?;

    let reader_config = config.serial.clone();
    let reader_shutdown = Arc::clone(&shutdown_signal);
    let reader_handle =
        thread::spawn(move || run_serial_reader(&reader_config, frame_sender, reader_shutdown));

    let summary = run_csv_sink(
        frame_receiver,
        sink,
        Arc::clone(&shutdown_signal),
        config.capture.echo_rows,
    )?;

    match reader_handle.join() {
        Ok(Ok(())) => info!("Serial reader shut down gracefully"),
        Ok(Err(e)) => {
            error!("Serial reader failed: {}", e);
            return Err(e.into());
        }
        Err(_) => return Err(anyhow!("serial reader thread panicked")),
    }

    info!(
        "Capture finished: {} rows appended to {} ({} malformed)",
        summary.rows_appended, config.capture.output, summary.rows_malformed
    );
    Ok(())
}
