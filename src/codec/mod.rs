//! Alberta Township System codec.
//!
//! An ATS position is written `LSD-SECTION-TOWNSHIP-RANGE WMERIDIAN`, for
//! example `07-27-072-03 W4`. Reading right to left: west of the 4th meridian,
//! range 3, township 72, section 27, legal subdivision 7.
//!
//! [`validate`] checks the position against the survey ranges; [`encode`]
//! turns it into the 10 digit PID numeral used as the database key. Both share
//! one tokenizer, but `encode` never checks ranges.

use crate::error::{ProcessingError, Result};
use crate::models::{AtsPosition, Numeral};

/// Parse and range-check an ATS string.
///
/// # Examples
/// ```
/// use ats_locator::codec::validate;
///
/// let position = validate("7-27-72-3 W4").unwrap();
/// assert_eq!(position.fields(), [7, 27, 72, 3, 4]);
/// ```
pub fn validate(ats: &str) -> Result<AtsPosition> {
    AtsPosition::from_fields(tokenize(ats)?)
}

/// Encode an ATS string into its PID numeral without checking ranges.
///
/// # Examples
/// ```
/// use ats_locator::codec::encode;
///
/// assert_eq!(encode("7-27-72-3 W4").unwrap().as_str(), "4030722707");
/// ```
pub fn encode(ats: &str) -> Result<Numeral> {
    Ok(Numeral::from_fields(tokenize(ats)?))
}

/// Replace the ` W` meridian marker (any case) with a dash.
pub fn normalize(ats: &str) -> String {
    let mut normalized = String::with_capacity(ats.len());
    let mut chars = ats.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ' ' && matches!(chars.peek(), Some('W') | Some('w')) {
            chars.next();
            normalized.push('-');
        } else {
            normalized.push(c);
        }
    }

    normalized
}

/// Split an ATS string into its five integer fields, in parse order.
pub fn tokenize(ats: &str) -> Result<[u32; 5]> {
    let normalized = normalize(ats);
    let tokens: Vec<&str> = normalized.split('-').map(|t| t.trim()).collect();

    if tokens.len() != 5 {
        return Err(ProcessingError::InvalidFormat(format!(
            "'{}' has {} fields. Expected format: 'LSD-SEC-TWP-RGE WM'",
            ats,
            tokens.len()
        )));
    }

    let mut fields = [0u32; 5];
    for (slot, token) in fields.iter_mut().zip(&tokens) {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProcessingError::InvalidFormat(format!(
                "'{}' contains a non-numeric field: '{}'",
                ats, token
            )));
        }
        *slot = token.parse::<u32>().map_err(|_| {
            ProcessingError::InvalidFormat(format!("'{}' has an oversized field: '{}'", ats, token))
        })?;
    }

    Ok(fields)
}
