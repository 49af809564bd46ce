pub mod cancel;
pub mod constants;
pub mod encoding;
pub mod filename;
pub mod progress;

pub use cancel::CancelFlag;
pub use constants::*;
pub use encoding::decode_text;
pub use filename::{default_duplicates_log_path, generate_default_output_filename};
pub use progress::ProgressReporter;
