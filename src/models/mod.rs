pub mod parcel;
pub mod position;
pub mod result;
pub mod target;

pub use parcel::{LatLon, ParcelRecord};
pub use position::{AtsField, AtsPosition, Numeral};
pub use result::{OutputSchema, ResultRow};
pub use target::{TargetEntry, TargetList};
