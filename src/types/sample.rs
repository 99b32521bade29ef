use std::fmt;

use super::frame::SensorFrame;

/// A fully parsed reading: posture label plus the nine IMU axes.
/// Only used for console echo and diagnostics; the CSV file stores the raw
/// fields untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct PostureSample {
    pub posture: String,
    pub accel: [f64; 3],
    pub gyro: [f64; 3],
    pub mag: [f64; 3],
}

#[derive(Debug, thiserror::Error)]
pub enum SampleParseError {
    #[error("expected {expected} fields, got {got}")]
    FieldCount { expected: usize, got: usize },
    #[error("{name} is not a number: {value:?}")]
    BadNumber { name: &'static str, value: String },
}

impl PostureSample {
    /// Posture label plus three axes each of accelerometer, gyroscope and
    /// magnetometer.
    pub const FIELD_COUNT: usize = 10;

    pub fn from_frame(frame: &SensorFrame) -> Result<Self, SampleParseError> {
        if frame.fields.len() != Self::FIELD_COUNT {
            return Err(SampleParseError::FieldCount {
                expected: Self::FIELD_COUNT,
                got: frame.fields.len(),
            });
        }

        Ok(Self {
            posture: frame.fields[0].trim().to_string(),
            accel: [
                parse_axis("Accel_X", &frame.fields[1])?,
                parse_axis("Accel_Y", &frame.fields[2])?,
                parse_axis("Accel_Z", &frame.fields[3])?,
            ],
            gyro: [
                parse_axis("Gyro_X", &frame.fields[4])?,
                parse_axis("Gyro_Y", &frame.fields[5])?,
                parse_axis("Gyro_Z", &frame.fields[6])?,
            ],
            mag: [
                parse_axis("Mag_X", &frame.fields[7])?,
                parse_axis("Mag_Y", &frame.fields[8])?,
                parse_axis("Mag_Z", &frame.fields[9])?,
            ],
        })
    }
}

fn parse_axis(name: &'static str, value: &str) -> Result<f64, SampleParseError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| SampleParseError::BadNumber {
            name,
            value: value.to_string(),
        })
}

impl fmt::Display for PostureSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} acc: ({:.3}, {:.3}, {:.3}) gyro: ({:.3}, {:.3}, {:.3}) mag: ({:.3}, {:.3}, {:.3})",
            self.posture,
            self.accel[0],
            self.accel[1],
            self.accel[2],
            self.gyro[0],
            self.gyro[1],
            self.gyro[2],
            self.mag[0],
            self.mag[1],
            self.mag[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_reading() {
        let frame =
            SensorFrame::parse_line("supine,0.01,-0.02,0.98,1.5,-2.5,3.5,12.0,-8.0,40.0");
        let sample = PostureSample::from_frame(&frame).unwrap();
        assert_eq!(sample.posture, "supine");
        assert_eq!(sample.accel, [0.01, -0.02, 0.98]);
        assert_eq!(sample.gyro, [1.5, -2.5, 3.5]);
        assert_eq!(sample.mag, [12.0, -8.0, 40.0]);
    }

    #[test]
    fn trims_whitespace_around_fields() {
        let frame = SensorFrame::parse_line("prone, 0.1 , 0.2 , 0.3 ,1,2,3,4,5,6");
        let sample = PostureSample::from_frame(&frame).unwrap();
        assert_eq!(sample.posture, "prone");
        assert_eq!(sample.accel, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn rejects_short_frame() {
        let frame = SensorFrame::parse_line("supine,0.1,0.2");
        let err = PostureSample::from_frame(&frame).unwrap_err();
        assert!(matches!(
            err,
            SampleParseError::FieldCount {
                expected: 10,
                got: 3
            }
        ));
    }

    #[test]
    fn rejects_non_numeric_axis() {
        let frame = SensorFrame::parse_line("supine,abc,0.2,0.3,1,2,3,4,5,6");
        let err = PostureSample::from_frame(&frame).unwrap_err();
        assert!(matches!(
            err,
            SampleParseError::BadNumber {
                name: "Accel_X",
                ..
            }
        ));
    }
}
