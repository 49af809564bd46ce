use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use tracing::info;

use super::ParcelLookup;
use crate::error::{ProcessingError, Result};
use crate::models::ParcelRecord;

/// Read-only SQLite parcel store keyed on the 10 digit `PID_trunc` column.
///
/// Candidates come back in ascending PID order, which puts the variant
/// without road allowance (`...0`) first.
pub struct IndexedStore {
    conn: Connection,
    table: String,
    query: String,
}

impl IndexedStore {
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        if !path.exists() {
            return Err(ProcessingError::Config(format!(
                "Parcel database not found: {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let store = Self::from_connection(conn, table)?;

        info!(
            path = %path.display(),
            table = store.table(),
            parcels = store.parcel_count()?,
            "Opened parcel index"
        );
        Ok(store)
    }

    /// Wrap an already open connection, e.g. an in-memory database.
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self> {
        validate_table_name(table)?;

        let query = format!(
            "SELECT CAST(PID AS TEXT), Latitude, Longitude FROM \"{}\" \
             WHERE PID_trunc = ?1 ORDER BY PID ASC",
            table
        );

        // Fail early on a missing table or column instead of on the first entry.
        conn.prepare(&query)?;

        Ok(Self {
            conn,
            table: table.to_string(),
            query,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn parcel_count(&self) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\"", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl ParcelLookup for IndexedStore {
    fn backend_name(&self) -> &'static str {
        "indexed"
    }

    fn candidates(&self, numeral: &str) -> Result<Vec<ParcelRecord>> {
        let mut stmt = self.conn.prepare_cached(&self.query)?;
        let rows = stmt.query_map(params![numeral], |row| {
            Ok(ParcelRecord {
                pid: row.get(0)?,
                latitude: row.get(1)?,
                longitude: row.get(2)?,
                pid_trunc: Some(numeral.to_string()),
            })
        })?;

        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ProcessingError::Config(format!(
            "Invalid parcel table name: '{}'",
            table
        )))
    }
}


#[cfg(test)]
mod tests {
    use super::test_store::write_store;
    use super::*;
    use crate::lookup::{fixtures, ParcelTable};
    use crate::models::LatLon;
    use crate::utils::constants::DEFAULT_TABLE_NAME;

    fn store_with(records: &[ParcelRecord]) -> (tempfile::TempDir, IndexedStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcels.db");
        write_store(&path, DEFAULT_TABLE_NAME, records).unwrap();
        let store = IndexedStore::open(&path, DEFAULT_TABLE_NAME).unwrap();
        (dir, store)
    }

    #[test]
    fn test_lookup() {
        let (_dir, store) = store_with(&fixtures::parcels());
        assert_eq!(store.parcel_count().unwrap(), 3);
        assert_eq!(
            store.lookup("4010010110").unwrap(),
            LatLon::new(49.00875466, -110.013391)
        );
    }

    #[test]
    fn test_candidates_in_ascending_pid_order() {
        let (_dir, store) = store_with(&fixtures::parcels_with_road_allowance());
        let pids: Vec<String> = store
            .candidates("4010010110")
            .unwrap()
            .into_iter()
            .map(|r| r.pid)
            .collect();
        assert_eq!(pids, vec!["40100101100", "40100101101", "40100101103"]);
    }

    #[test]
    fn test_not_found() {
        let (_dir, store) = store_with(&fixtures::parcels());
        assert!(store.lookup("6301263616").unwrap_err().is_not_found());
    }

    #[test]
    fn test_agrees_with_table_backend() {
        let records = fixtures::parcels_with_road_allowance();
        let (_dir, store) = store_with(&records);
        let table = ParcelTable::from_records(records);

        for numeral in ["4010010110", "4010010109", "4010010115"] {
            let from_store = store.lookup(numeral).unwrap();
            let from_table = table.lookup(numeral).unwrap();
            assert_eq!(
                from_store.latitude.to_bits(),
                from_table.latitude.to_bits(),
                "latitude mismatch for {}",
                numeral
            );
            assert_eq!(
                from_store.longitude.to_bits(),
                from_table.longitude.to_bits(),
                "longitude mismatch for {}",
                numeral
            );
        }
    }

    #[test]
    fn test_duplicates_without_zero_row_are_ambiguous() {
        // The first row in PID order is not taken when no `...0` row exists
        let (_dir, store) = store_with(&[
            ParcelRecord::new("40100101103", 49.00901234, -110.01412),
            ParcelRecord::new("40100101101", 49.00912345, -110.01298),
        ]);

        match store.lookup("4010010110") {
            Err(ProcessingError::AmbiguousOrMissing {
                candidates,
                exact_matches,
                ..
            }) => {
                assert_eq!(candidates, 2);
                assert_eq!(exact_matches, 0);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let result = IndexedStore::open(&dir.path().join("missing.db"), DEFAULT_TABLE_NAME);
        assert!(matches!(result, Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_table_name_validation() {
        assert!(validate_table_name("ATS_V4_wLatLon").is_ok());
        assert!(validate_table_name("_parcels").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("4parcels").is_err());
        assert!(validate_table_name("parcels; DROP TABLE x").is_err());
    }

    #[test]
    fn test_missing_table_fails_on_open() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(IndexedStore::from_connection(conn, "ATS_V4_wLatLon").is_err());
    }
}
