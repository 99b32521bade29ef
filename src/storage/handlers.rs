use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{info, warn};

use crate::types::{PostureSample, SensorFrame};

use super::csv_sink::{CsvSink, SinkError};

/// How often the writer reports its append rate while capturing.
const THROUGHPUT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// How long the writer keeps draining queued frames after shutdown is signalled.
const DRAIN_DEADLINE: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub struct SinkSummary {
    pub rows_appended: u64,
    pub rows_malformed: u64,
}

/// Pull frames off the channel and append them to the capture file until the
/// shutdown flag is set or the reader side hangs up.
pub fn run_csv_sink(
    frame_receiver: Receiver<SensorFrame>,
    mut sink: CsvSink,
    shutdown_signal: Arc<AtomicBool>,
    echo_rows: bool,
) -> Result<SinkSummary, SinkError> {
    info!("CSV writer started on {}", sink.path().display());

    let mut rows_malformed = 0u64;
    let mut interval_rows = 0u64;
    let mut interval_start = Instant::now();
    let mut disconnected = false;

    while !shutdown_signal.load(Ordering::Relaxed) {
        match frame_receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(frame) => {
                append_frame(&mut sink, &frame, echo_rows, &mut rows_malformed)?;
                interval_rows += 1;
            }
            Err(RecvTimeoutError::Timeout) => {
                // Timed out, loop around and check the shutdown flag.
            }
            Err(RecvTimeoutError::Disconnected) => {
                info!("Frame channel disconnected, CSV writer exiting");
                disconnected = true;
                break;
            }
        }

        let elapsed = interval_start.elapsed();
        if elapsed >= THROUGHPUT_LOG_INTERVAL {
            if interval_rows > 0 {
                info!(
                    "Appended {} rows in the last {:.0}s ({:.1} rows/s)",
                    interval_rows,
                    elapsed.as_secs_f64(),
                    interval_rows as f64 / elapsed.as_secs_f64()
                );
            }
            interval_rows = 0;
            interval_start = Instant::now();
        }
    }

    if !disconnected {
        // The reader may still be handing over rows it read before it saw
        // the flag; keep draining briefly instead of cutting the file short.
        let drain_start = Instant::now();
        while drain_start.elapsed() < DRAIN_DEADLINE {
            match frame_receiver.recv_timeout(Duration::from_millis(200)) {
                Ok(frame) => append_frame(&mut sink, &frame, echo_rows, &mut rows_malformed)?,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    sink.flush()?;

    let summary = SinkSummary {
        rows_appended: sink.rows_appended(),
        rows_malformed,
    };
    info!(
        "CSV writer exiting gracefully: {} rows appended ({} malformed)",
        summary.rows_appended, summary.rows_malformed
    );
    Ok(summary)
}

/// Every frame lands in the file unchanged; parsing only drives the console
/// echo and the malformed counter.
fn append_frame(
    sink: &mut CsvSink,
    frame: &SensorFrame,
    echo_rows: bool,
    rows_malformed: &mut u64,
) -> Result<(), SinkError> {
    match PostureSample::from_frame(frame) {
        Ok(sample) => {
            if echo_rows {
                info!("{}", sample);
            }
        }
        Err(e) => {
            *rows_malformed += 1;
            warn!("Keeping malformed row ({}): {}", e, frame.to_line());
        }
    }

    sink.append(frame)
}
