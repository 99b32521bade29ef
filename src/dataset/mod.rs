pub mod combine;
pub mod shuffle;

pub use combine::{combine_files, CombineError, CombineSummary};
pub use shuffle::seeded_shuffle;
