use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{info, warn};

use crate::config::CombineConfig;

use super::shuffle::seeded_shuffle;

#[derive(Debug, thiserror::Error)]
pub enum CombineError {
    #[error("no input files configured")]
    NoInputs,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("header of {path} does not match the first input (expected {expected:?}, found {found:?})")]
    HeaderMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug)]
pub struct CombineSummary {
    pub files_read: usize,
    pub rows_in: usize,
    pub rows_out: usize,
    pub output: PathBuf,
}

/// Concatenate every configured capture file, shuffle the rows with the
/// configured seed and write the result as one labeled dataset.
pub fn combine_files(config: &CombineConfig) -> Result<CombineSummary, CombineError> {
    let (first, rest) = config.inputs.split_first().ok_or(CombineError::NoInputs)?;

    let started = Instant::now();

    // The first file fixes the header every other input must match.
    let first_path = PathBuf::from(first);
    let (header, mut rows) = read_labeled_file(&first_path)?;
    log_input(&first_path, rows.len());

    for input in rest {
        let path = PathBuf::from(input);
        let (file_header, file_rows) = read_labeled_file(&path)?;

        if file_header != header {
            return Err(CombineError::HeaderMismatch {
                path,
                expected: header.iter().map(String::from).collect(),
                found: file_header.iter().map(String::from).collect(),
            });
        }

        log_input(&path, file_rows.len());
        rows.extend(file_rows);
    }

    let rows_in = rows.len();
    seeded_shuffle(&mut rows, config.seed);
    info!("Shuffled {} rows with seed {}", rows_in, config.seed);

    let output = PathBuf::from(&config.output);
    write_combined(&output, &header, &rows)?;

    let summary = CombineSummary {
        files_read: config.inputs.len(),
        rows_in,
        rows_out: rows.len(),
        output,
    };
    info!(
        "Combined {} files into {} ({} rows, {:.2}s)",
        summary.files_read,
        summary.output.display(),
        summary.rows_out,
        started.elapsed().as_secs_f64()
    );
    Ok(summary)
}

fn read_labeled_file(path: &Path) -> Result<(StringRecord, Vec<StringRecord>), CombineError> {
    let read_err = |e: csv::Error| CombineError::Read {
        path: path.to_path_buf(),
        source: e,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(read_err)?;

    let header = reader.headers().map_err(read_err)?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(read_err)?);
    }

    Ok((header, rows))
}

fn write_combined(
    path: &Path,
    header: &StringRecord,
    rows: &[StringRecord],
) -> Result<(), CombineError> {
    let write_err = |e: csv::Error| CombineError::Write {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = WriterBuilder::new().from_path(path).map_err(write_err)?;

    writer.write_record(header).map_err(write_err)?;
    for row in rows {
        writer.write_record(row).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| CombineError::Write {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

    Ok(())
}

fn log_input(path: &Path, rows: usize) {
    if rows == 0 {
        warn!("{} contributed no data rows", path.display());
    } else {
        info!("Read {} rows from {}", rows, path.display());
    }
}
