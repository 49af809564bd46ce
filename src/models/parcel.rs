use serde::{Deserialize, Serialize};
use validator::Validate;

/// Centroid of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One row of the parcel database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ParcelRecord {
    #[serde(rename = "PID")]
    #[validate(length(min = 10))]
    pub pid: String,

    #[serde(rename = "Latitude")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[serde(rename = "Longitude")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[serde(rename = "PID_trunc", default, skip_serializing_if = "Option::is_none")]
    pub pid_trunc: Option<String>,
}

impl ParcelRecord {
    pub fn new(pid: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            pid: pid.into(),
            latitude,
            longitude,
            pid_trunc: None,
        }
    }

    pub fn location(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }

    /// Line written to the duplicate audit log.
    pub fn audit_line(&self) -> String {
        format!("{} {} {}", self.pid, self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parcel_validation() {
        let record = ParcelRecord::new("40100101100", 49.00875466, -110.013391);
        assert!(record.validate().is_ok());
        assert_eq!(record.location(), LatLon::new(49.00875466, -110.013391));
    }

    #[test]
    fn test_invalid_parcel() {
        let record = ParcelRecord::new("40100101100", 91.0, -110.0);
        assert!(record.validate().is_err());

        let short_pid = ParcelRecord::new("401001", 49.0, -110.0);
        assert!(short_pid.validate().is_err());
    }

    #[test]
    fn test_audit_line() {
        let record = ParcelRecord::new("40100101101", 49.5, -110.25);
        assert_eq!(record.audit_line(), "40100101101 49.5 -110.25");
    }
}
