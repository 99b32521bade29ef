/// Column order of every capture file. The combiner checks input headers
/// against this exact sequence before merging.
pub const POSTURE_COLUMNS: [&str; 10] = [
    "Posture", "Accel_X", "Accel_Y", "Accel_Z", "Gyro_X", "Gyro_Y", "Gyro_Z", "Mag_X", "Mag_Y",
    "Mag_Z",
];

pub fn header_record() -> Vec<String> {
    POSTURE_COLUMNS.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostureSample;

    #[test]
    fn header_matches_sample_width() {
        assert_eq!(POSTURE_COLUMNS.len(), PostureSample::FIELD_COUNT);
        assert_eq!(header_record().len(), PostureSample::FIELD_COUNT);
    }

    #[test]
    fn label_column_comes_first() {
        assert_eq!(POSTURE_COLUMNS[0], "Posture");
        assert_eq!(POSTURE_COLUMNS[9], "Mag_Z");
    }
}
