//! Convert Alberta Township System (ATS) land positions to latitude/longitude.
//!
//! An ATS string is validated and encoded into a ten digit numeral, which is
//! looked up in a parcel database (an in-memory CSV table or an indexed
//! SQLite store). [`processors::BatchProcessor`] drives a whole target list
//! through that pipeline and [`writers::ResultWriter`] exports the result.

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod lookup;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use error::{ProcessingError, Result};
