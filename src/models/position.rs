use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ProcessingError;
use crate::utils::constants::{
    LSD_BOUNDS, MERIDIAN_BOUNDS, RANGE_BOUNDS, SECTION_BOUNDS, TOWNSHIP_BOUNDS,
};

/// One of the five fields of an ATS land position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtsField {
    Lsd,
    Section,
    Township,
    Range,
    Meridian,
}

impl AtsField {
    /// Order in which the fields appear in `LSD-SEC-TWP-RGE WM`.
    pub const PARSE_ORDER: [AtsField; 5] = [
        AtsField::Lsd,
        AtsField::Section,
        AtsField::Township,
        AtsField::Range,
        AtsField::Meridian,
    ];

    /// Order of the fields inside a PID, also the order bounds are checked in.
    pub const PID_ORDER: [AtsField; 5] = [
        AtsField::Meridian,
        AtsField::Range,
        AtsField::Township,
        AtsField::Section,
        AtsField::Lsd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AtsField::Lsd => "lsd",
            AtsField::Section => "section",
            AtsField::Township => "township",
            AtsField::Range => "range",
            AtsField::Meridian => "meridian",
        }
    }

    /// Zero-padded width of the field inside a PID numeral.
    pub fn width(self) -> usize {
        match self {
            AtsField::Lsd => 2,
            AtsField::Section => 2,
            AtsField::Township => 3,
            AtsField::Range => 2,
            AtsField::Meridian => 1,
        }
    }

    pub fn bounds(self) -> RangeInclusive<u32> {
        match self {
            AtsField::Lsd => LSD_BOUNDS,
            AtsField::Section => SECTION_BOUNDS,
            AtsField::Township => TOWNSHIP_BOUNDS,
            AtsField::Range => RANGE_BOUNDS,
            AtsField::Meridian => MERIDIAN_BOUNDS,
        }
    }

    /// Index of the field in [`AtsField::PARSE_ORDER`].
    pub fn parse_index(self) -> usize {
        match self {
            AtsField::Lsd => 0,
            AtsField::Section => 1,
            AtsField::Township => 2,
            AtsField::Range => 3,
            AtsField::Meridian => 4,
        }
    }
}

impl fmt::Display for AtsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A land position inside Alberta, checked against the survey ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtsPosition {
    pub lsd: u32,
    pub section: u32,
    pub township: u32,
    pub range: u32,
    pub meridian: u32,
}

impl AtsPosition {
    /// Build a position from fields in parse order, checking every bound.
    pub fn from_fields(fields: [u32; 5]) -> crate::error::Result<Self> {
        for field in AtsField::PID_ORDER {
            let value = fields[field.parse_index()];
            let bounds = field.bounds();
            if !bounds.contains(&value) {
                return Err(ProcessingError::OutOfRange {
                    field,
                    value,
                    min: *bounds.start(),
                    max: *bounds.end(),
                });
            }
        }

        Ok(Self {
            lsd: fields[0],
            section: fields[1],
            township: fields[2],
            range: fields[3],
            meridian: fields[4],
        })
    }

    /// Fields in parse order: `[lsd, section, township, range, meridian]`.
    pub fn fields(&self) -> [u32; 5] {
        [
            self.lsd,
            self.section,
            self.township,
            self.range,
            self.meridian,
        ]
    }

    pub fn numeral(&self) -> Numeral {
        Numeral::from_fields(self.fields())
    }
}

impl fmt::Display for AtsPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:03}-{:02} W{}",
            self.lsd, self.section, self.township, self.range, self.meridian
        )
    }
}

impl FromStr for AtsPosition {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::codec::validate(s)
    }
}

/// PID prefix without the road allowance digit: M RR TTT SS LL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Numeral(String);

impl Numeral {
    /// Concatenate fields (given in parse order) in PID order, zero-padded.
    pub fn from_fields(fields: [u32; 5]) -> Self {
        let mut numeral = String::with_capacity(10);
        for field in AtsField::PID_ORDER {
            let value = fields[field.parse_index()];
            numeral.push_str(&format!("{:0width$}", value, width = field.width()));
        }
        Self(numeral)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// PID of the variant without a road allowance.
    pub fn without_road_allowance(&self) -> String {
        format!("{}{}", self.0, crate::utils::constants::NO_ROAD_ALLOWANCE)
    }
}

impl fmt::Display for Numeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wrap a numeral that is already encoded, e.g. one read back from a database.
impl From<&str> for Numeral {
    fn from(numeral: &str) -> Self {
        Self(numeral.to_string())
    }
}

impl AsRef<str> for Numeral {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
