use serde::{Deserialize, Serialize};

use super::{LatLon, TargetEntry};
use crate::utils::constants::{LATITUDE_COLUMN, LONGITUDE_COLUMN, NAME_COLUMN, PID_COLUMN};

/// Column layout of the exported table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub input_columns: Vec<String>,
    pub trees_column: Option<usize>,
}

impl OutputSchema {
    pub fn new(input_columns: Vec<String>, trees_column: Option<usize>) -> Self {
        Self {
            input_columns,
            trees_column,
        }
    }

    pub fn with_name(&self) -> bool {
        self.trees_column.is_some()
    }

    /// Input columns, then PID, Latitude, Longitude and Name when trees are present.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.input_columns.clone();
        columns.push(PID_COLUMN.to_string());
        columns.push(LATITUDE_COLUMN.to_string());
        columns.push(LONGITUDE_COLUMN.to_string());
        if self.with_name() {
            columns.push(NAME_COLUMN.to_string());
        }
        columns
    }

    pub fn is_trees_column(&self, index: usize) -> bool {
        self.trees_column == Some(index)
    }
}

/// Target entry annotated with its PID numeral and coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub line: usize,
    pub lsd: String,
    pub trees: Option<i64>,
    pub values: Vec<String>,
    pub pid: Option<String>,
    pub location: Option<LatLon>,
    pub name: Option<String>,
}

impl ResultRow {
    pub fn new(entry: &TargetEntry, with_name: bool) -> Self {
        let name = if with_name {
            let trees = entry.trees.map(|t| t.to_string()).unwrap_or_default();
            Some(format!("{} | {}", entry.lsd, trees))
        } else {
            None
        };

        Self {
            line: entry.line,
            lsd: entry.lsd.clone(),
            trees: entry.trees,
            values: entry.values.clone(),
            pid: None,
            location: None,
            name,
        }
    }

    pub fn with_pid(mut self, pid: Option<String>) -> Self {
        self.pid = pid;
        self
    }

    pub fn with_location(mut self, location: Option<LatLon>) -> Self {
        self.location = location;
        self
    }

    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|l| l.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|l| l.longitude)
    }

    pub fn is_located(&self) -> bool {
        self.location.is_some()
    }

    /// Cells in [`OutputSchema::columns`] order; missing values are empty.
    pub fn to_record(&self, schema: &OutputSchema) -> Vec<String> {
        let mut record = self.values.clone();
        record.resize(schema.input_columns.len(), String::new());
        record.push(self.pid.clone().unwrap_or_default());
        record.push(self.latitude().map(format_coordinate).unwrap_or_default());
        record.push(self.longitude().map(format_coordinate).unwrap_or_default());
        if schema.with_name() {
            record.push(self.name.clone().unwrap_or_default());
        }
        record
    }
}

/// Shortest round-trip text that always keeps a decimal point (`49.0`, not `49`).
fn format_coordinate(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_name_composition() {
        let entry = TargetEntry::new(
            2,
            "7-27-72-3 W4",
            Some(12),
            vec!["7-27-72-3 W4".to_string(), "12".to_string()],
        );
        let row = ResultRow::new(&entry, true);
        assert_eq!(row.name.as_deref(), Some("7-27-72-3 W4 | 12"));

        let without = ResultRow::new(&entry, false);
        assert_eq!(without.name, None);
    }

    #[test]
    fn test_record_layout() {
        let schema = OutputSchema::new(vec!["LSD".to_string(), "Trees".to_string()], Some(1));
        assert_eq!(
            schema.columns(),
            vec!["LSD", "Trees", "PID", "Latitude", "Longitude", "Name"]
        );

        let entry = TargetEntry::new(
            2,
            "7-27-72-3 W4",
            Some(40),
            vec!["7-27-72-3 W4".to_string(), "40".to_string()],
        );
        let row = ResultRow::new(&entry, true)
            .with_pid(Some("4030722707".to_string()))
            .with_location(Some(LatLon::new(55.2, -113.4)));

        assert_eq!(
            row.to_record(&schema),
            vec![
                "7-27-72-3 W4",
                "40",
                "4030722707",
                "55.2",
                "-113.4",
                "7-27-72-3 W4 | 40"
            ]
        );
    }

    #[test]
    fn test_missing_location_is_empty() {
        let schema = OutputSchema::new(vec!["LSD".to_string()], None);
        let entry = TargetEntry::new(2, "1-1-1-1 W4", None, vec!["1-1-1-1 W4".to_string()]);
        let row = ResultRow::new(&entry, false).with_pid(Some("4010010101".to_string()));

        assert!(!row.is_located());
        assert_eq!(row.to_record(&schema), vec!["1-1-1-1 W4", "4010010101", "", ""]);
    }

    #[test]
    fn test_whole_coordinates_keep_decimal_point() {
        let schema = OutputSchema::new(vec!["LSD".to_string()], None);
        let entry = TargetEntry::new(2, "x", None, vec!["x".to_string()]);
        let row = ResultRow::new(&entry, false).with_location(Some(LatLon::new(49.0, -110.0)));

        assert_eq!(row.to_record(&schema), vec!["x", "", "49.0", "-110.0"]);
    }
}
