pub mod analysis;
pub mod constants;
pub mod hedgehog_errors;
pub mod math;
pub mod signal;
pub mod spines;

pub use analysis::{params::AnalysisParams, track::Track, HedgehogAnalysis};
pub use hedgehog_errors::HedgehogError;
pub use spines::{csv_reader::SpineCsvFormat, Spine};
