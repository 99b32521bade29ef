//! Capture and preparation tools for a wearable posture dataset.
//!
//! `posture-capture` logs labeled IMU readings from a serial port into a
//! per-posture CSV file, and `posture-combine` merges those files into one
//! shuffled training set.

pub mod config;
pub mod dataset;
pub mod logger;
pub mod serial;
pub mod storage;
pub mod types;
