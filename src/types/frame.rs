/// One newline-delimited line from the sensor stream, split on commas.
/// Fields are kept verbatim so the CSV row matches the wire bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorFrame {
    pub fields: Vec<String>,
}

impl SensorFrame {
    /// Trim the line ends and split on commas. Splitting always yields at
    /// least one field, so an all-whitespace line becomes a single empty field.
    pub fn parse_line(line: &str) -> Self {
        let trimmed = line.trim();
        Self {
            fields: trimmed.split(',').map(|field| field.to_string()).collect(),
        }
    }

    pub fn to_line(&self) -> String {
        self.fields.join(",")
    }
}
