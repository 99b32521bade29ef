use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Application configuration.
/// Collects every tunable in one place, with defaults and validation.

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "posture.toml";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub serial: SerialConfig,
    pub capture: CaptureConfig,
    pub combine: CombineConfig,
}

/// Serial port configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    /// Delay after opening the port, lets the board finish resetting.
    pub settle_ms: u64,
    /// Read timeout; doubles as the shutdown-flag polling interval.
    pub read_timeout_ms: u64,
}

/// Capture/recording configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub output: String,
    pub flush_each_row: bool,
    pub channel_capacity: usize,
    pub echo_rows: bool,
}

/// Dataset combine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineConfig {
    pub inputs: Vec<String>,
    pub output: String,
    pub seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            capture: CaptureConfig::default(),
            combine: CombineConfig::default(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port().to_string(),
            baud_rate: 9600,
            settle_ms: 2000,
            read_timeout_ms: 100,
        }
    }
}

fn default_port() -> &'static str {
    if cfg!(windows) {
        "COM3"
    } else {
        "/dev/ttyUSB0"
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output: "rightSide.csv".to_string(),
            flush_each_row: true,
            channel_capacity: 5000,
            echo_rows: true,
        }
    }
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            inputs: vec![
                "supine.csv".to_string(),
                "supine2.csv".to_string(),
                "prone.csv".to_string(),
                "leftSide.csv".to_string(),
                "leftSide2.csv".to_string(),
                "rightSide.csv".to_string(),
                "rightSide2.csv".to_string(),
                "sitting.csv".to_string(),
                "sitting2.csv".to_string(),
                "unknown.csv".to_string(),
            ],
            output: "Shuffled_Combined_Data.csv".to_string(),
            seed: 36,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e))?;

        let config: AppConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e))?;

        Ok(())
    }

    /// Resolve the effective config: an explicit path must load, otherwise
    /// `posture.toml` is used when present and defaults apply when it is not.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load_from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply environment variable overrides on top of the loaded values
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(port) = env::var("POSTURE_SERIAL_PORT") {
            self.serial.port = port;
        }

        if let Ok(baud) = env::var("POSTURE_SERIAL_BAUD") {
            self.serial.baud_rate = baud.parse::<u32>().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "POSTURE_SERIAL_BAUD is not a valid baud rate: {baud}"
                ))
            })?;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial.port.is_empty() {
            return Err(ConfigError::ValidationError(
                "Serial port name must not be empty".to_string(),
            ));
        }

        if self.serial.baud_rate == 0 {
            return Err(ConfigError::ValidationError(
                "Baud rate must be positive".to_string(),
            ));
        }

        if self.serial.read_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "Read timeout must be positive".to_string(),
            ));
        }

        if self.capture.output.is_empty() {
            return Err(ConfigError::ValidationError(
                "Capture output path must not be empty".to_string(),
            ));
        }

        if self.capture.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "Channel capacity must be positive".to_string(),
            ));
        }

        if self.combine.inputs.is_empty() {
            return Err(ConfigError::ValidationError(
                "Combine input list must not be empty".to_string(),
            ));
        }

        if self.combine.output.is_empty() {
            return Err(ConfigError::ValidationError(
                "Combine output path must not be empty".to_string(),
            ));
        }

        if self
            .combine
            .inputs
            .iter()
            .any(|input| input == &self.combine.output)
        {
            return Err(ConfigError::ValidationError(
                "Combine output must not appear in the input list".to_string(),
            ));
        }

        Ok(())
    }

    /// Path the capture loop appends to
    pub fn get_capture_path(&self) -> PathBuf {
        PathBuf::from(&self.capture.output)
    }
}

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        env::temp_dir().join(format!(
            "posture_config_{}_{}_{}.toml",
            tag,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.combine.inputs.len(), 10);
        assert_eq!(config.combine.seed, 36);
        assert_eq!(config.combine.output, "Shuffled_Combined_Data.csv");
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = scratch_path("round_trip");

        let mut config = AppConfig::default();
        config.serial.port = "/dev/ttyACM0".to_string();
        config.serial.baud_rate = 115_200;
        config.capture.output = "prone.csv".to_string();
        config.combine.seed = 7;

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.serial.port, "/dev/ttyACM0");
        assert_eq!(loaded.serial.baud_rate, 115_200);
        assert_eq!(loaded.capture.output, "prone.csv");
        assert_eq!(loaded.combine.seed, 7);
        assert_eq!(loaded.combine.inputs, config.combine.inputs);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let path = scratch_path("missing");
        let err = AppConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let path = scratch_path("invalid");
        fs::write(&path, "serial = \"not a table\"").unwrap();
        let err = AppConfig::load_from_file(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn validate_rejects_zero_baud() {
        let mut config = AppConfig::default();
        config.serial.baud_rate = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_inputs() {
        let mut config = AppConfig::default();
        config.combine.inputs.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn validate_rejects_output_listed_as_input() {
        let mut config = AppConfig::default();
        config.combine.inputs.push(config.combine.output.clone());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
