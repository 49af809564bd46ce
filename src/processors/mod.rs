pub mod batch_processor;
pub mod batch_summary;

pub use batch_processor::{BatchOutput, BatchProcessor};
pub use batch_summary::{BatchSummary, EntryFailure, FailureKind};
