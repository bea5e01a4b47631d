pub mod encoding;
pub mod pipeline;
pub mod reader;
pub mod rows;
pub mod text;

pub use pipeline::{submit_in_batches, CsvImportPipeline};
