pub mod frame;
pub mod sample;

pub use frame::SensorFrame;
pub use sample::{PostureSample, SampleParseError};
