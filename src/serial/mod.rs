pub mod framer;
pub mod reader;

pub use framer::LineFramer;
pub use reader::{list_ports, run_serial_reader, SerialError};
