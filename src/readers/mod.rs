pub mod parcel_reader;
pub mod target_reader;

pub use parcel_reader::ParcelReader;
pub use target_reader::TargetReader;
