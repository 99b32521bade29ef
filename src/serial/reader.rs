use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use serialport::SerialPortType;

use crate::config::SerialConfig;
use crate::types::SensorFrame;

use super::framer::LineFramer;

#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial read failed: {0}")]
    Read(#[from] std::io::Error),
}

/// Read lines from the serial port and push them onto the frame channel
/// until the shutdown flag is set or the channel closes.
pub fn run_serial_reader(
    config: &SerialConfig,
    frame_sender: Sender<SensorFrame>,
    shutdown_signal: Arc<AtomicBool>,
) -> Result<(), SerialError> {
    info!(
        "Opening serial port {} at {} baud",
        config.port, config.baud_rate
    );

    let mut port = serialport::new(&config.port, config.baud_rate)
        .timeout(Duration::from_millis(config.read_timeout_ms))
        .open()
        .map_err(|e| SerialError::Open {
            port: config.port.clone(),
            source: e,
        })?;

    // Opening the port resets most dev boards; wait for the firmware to
    // come back before trusting the stream.
    thread::sleep(Duration::from_millis(config.settle_ms));
    info!("Serial reader thread started");

    let mut framer = LineFramer::new();
    let mut buf = [0u8; 512];

    loop {
        if shutdown_signal.load(Ordering::Relaxed) {
            info!("Serial reader received shutdown signal, exiting gracefully");
            break;
        }

        match port.read(&mut buf) {
            Ok(0) => {
                warn!("Serial port returned end of stream");
                break;
            }
            Ok(n) => {
                // Every completed line becomes exactly one frame, blank or not.
                for line in framer.push(&buf[..n]) {
                    if frame_sender.send(SensorFrame::parse_line(&line)).is_err() {
                        // Receiver gone means the writer shut down first.
                        info!("Frame channel disconnected, serial reader exiting");
                        return Ok(());
                    }
                }
            }
            Err(e) => match e.kind() {
                // The read timeout doubles as the shutdown polling interval.
                ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted => continue,
                _ => return Err(SerialError::Read(e)),
            },
        }
    }

    if framer.pending_len() > 0 {
        debug!(
            "Dropping {} buffered bytes with no line ending",
            framer.pending_len()
        );
    }

    Ok(())
}

/// Print every serial port the OS reports, for picking `--port`.
pub fn list_ports() -> Result<(), serialport::Error> {
    let mut ports = serialport::available_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }

    ports.sort_by(|a, b| a.port_name.cmp(&b.port_name));
    println!("Available serial ports:");
    for port in ports {
        match port.port_type {
            SerialPortType::UsbPort(usb) => {
                let product = usb.product.unwrap_or_else(|| "unknown".to_string());
                println!(
                    "  {} - USB {:04x}:{:04x} ({})",
                    port.port_name, usb.vid, usb.pid, product
                );
            }
            _ => println!("  {}", port.port_name),
        }
    }

    Ok(())
}
