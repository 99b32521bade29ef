pub mod csv_sink;
pub mod handlers;
pub mod schema;

pub use csv_sink::{CsvSink, SinkError};
pub use handlers::{run_csv_sink, SinkSummary};
pub use schema::{header_record, POSTURE_COLUMNS};
