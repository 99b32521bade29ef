use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use log::info;

use crate::types::SensorFrame;

use super::schema::header_record;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV write failed: {0}")]
    Write(#[from] csv::Error),
    #[error("failed to flush {path}: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only CSV writer for one capture file.
/// The header row is written exactly once, when the file is first created;
/// a rerun appends below whatever is already there.
pub struct CsvSink {
    writer: Writer<File>,
    path: PathBuf,
    flush_each_row: bool,
    rows_appended: u64,
}

impl CsvSink {
    pub fn open<P: AsRef<Path>>(path: P, flush_each_row: bool) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SinkError::Open {
                    path: path.clone(),
                    source: e,
                })?;
            }
        }

        // Must be checked before the open below creates the file.
        let is_new = !path.is_file();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SinkError::Open {
                path: path.clone(),
                source: e,
            })?;

        // Rows mirror the wire bytes verbatim, so short rows must stay legal.
        let mut writer = WriterBuilder::new().flexible(true).from_writer(file);

        if is_new {
            writer.write_record(&header_record())?;
            writer.flush().map_err(|e| SinkError::Flush {
                path: path.clone(),
                source: e,
            })?;
            info!("Created {} and wrote the header row", path.display());
        } else {
            info!("Appending to existing file {}", path.display());
        }

        Ok(Self {
            writer,
            path,
            flush_each_row,
            rows_appended: 0,
        })
    }

    pub fn append(&mut self, frame: &SensorFrame) -> Result<(), SinkError> {
        self.writer.write_record(&frame.fields)?;
        if self.flush_each_row {
            self.writer.flush().map_err(|e| SinkError::Flush {
                path: self.path.clone(),
                source: e,
            })?;
        }
        self.rows_appended += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(|e| SinkError::Flush {
            path: self.path.clone(),
            source: e,
        })
    }

    pub fn rows_appended(&self) -> u64 {
        self.rows_appended
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn scratch_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        env::temp_dir().join(format!(
            "posture_sink_{}_{}_{}.csv",
            tag,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn new_file_gets_header_exactly_once() {
        let path = scratch_path("header_once");

        let mut sink = CsvSink::open(&path, false).unwrap();
        sink.append(&SensorFrame::parse_line("supine,1,2,3,4,5,6,7,8,9"))
            .unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.rows_appended(), 1);
        drop(sink);

        // Reopen and append: no second header.
        let mut sink = CsvSink::open(&path, false).unwrap();
        sink.append(&SensorFrame::parse_line("prone,9,8,7,6,5,4,3,2,1"))
            .unwrap();
        sink.flush().unwrap();
        drop(sink);

        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Posture,Accel_X,Accel_Y,Accel_Z,Gyro_X,Gyro_Y,Gyro_Z,Mag_X,Mag_Y,Mag_Z"
        );
        assert_eq!(lines[1], "supine,1,2,3,4,5,6,7,8,9");
        assert_eq!(lines[2], "prone,9,8,7,6,5,4,3,2,1");
        assert_eq!(content.matches("Posture").count(), 1);
    }

    #[test]
    fn short_rows_are_kept_verbatim() {
        let path = scratch_path("short_rows");

        let mut sink = CsvSink::open(&path, true).unwrap();
        sink.append(&SensorFrame::parse_line("supine,0.1")).unwrap();
        sink.append(&SensorFrame::parse_line("garbage")).unwrap();
        drop(sink);

        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "supine,0.1");
        assert_eq!(lines[2], "garbage");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = scratch_path("nested_dir");
        let path = dir.join("capture").join("supine.csv");

        let mut sink = CsvSink::open(&path, false).unwrap();
        sink.append(&SensorFrame::parse_line("supine,1,2,3,4,5,6,7,8,9"))
            .unwrap();
        sink.flush().unwrap();
        drop(sink);

        let content = fs::read_to_string(&path).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(content.lines().count(), 2);
    }
}
