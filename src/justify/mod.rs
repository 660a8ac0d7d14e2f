//! Excipient justification: record validation, prompt rendering, the
//! per-record processor and the CSV batch driver.

pub mod batch;
pub mod processor;
mod prompt;
pub mod record;

pub use batch::{BatchError, BatchResult, read_records, run_batch, write_results};
pub use processor::{Justification, ProcessError, RecordProcessor};
pub use record::JustificationRecord;
