use serde::{Deserialize, Serialize};

use super::OutputSchema;

/// One row of the user's target list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// 1-based line in the input file, header included.
    pub line: usize,
    pub lsd: String,
    pub trees: Option<i64>,
    /// Every input cell, aligned with [`TargetList::columns`].
    pub values: Vec<String>,
}

impl TargetEntry {
    pub fn new(
        line: usize,
        lsd: impl Into<String>,
        trees: Option<i64>,
        values: Vec<String>,
    ) -> Self {
        Self {
            line,
            lsd: lsd.into(),
            trees,
            values,
        }
    }
}

/// Ordered target list plus the column layout it was read with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetList {
    pub columns: Vec<String>,
    pub lsd_column: usize,
    pub trees_column: Option<usize>,
    pub entries: Vec<TargetEntry>,
}

impl TargetList {
    /// Build a list from bare ATS strings, e.g. from the command line.
    pub fn from_lsds<I, S>(lsds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = lsds
            .into_iter()
            .enumerate()
            .map(|(i, lsd)| {
                let lsd = lsd.into();
                TargetEntry::new(i + 2, lsd.clone(), None, vec![lsd])
            })
            .collect();

        Self {
            columns: vec![crate::utils::constants::LSD_COLUMN.to_string()],
            lsd_column: 0,
            trees_column: None,
            entries,
        }
    }

    pub fn has_trees(&self) -> bool {
        self.trees_column.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output layout, fixed once per batch.
    pub fn output_schema(&self) -> OutputSchema {
        OutputSchema::new(self.columns.clone(), self.trees_column)
    }
}
