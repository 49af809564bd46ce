/// Why a target entry ended up without coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFailure {
    pub line: usize,
    pub lsd: String,
    pub kind: FailureKind,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Skipped,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total_entries: usize,
    pub located: usize,
    pub not_found: usize,
    pub skipped: usize,
    pub duplicates_resolved: usize,
    pub failures: Vec<EntryFailure>,
}

impl BatchSummary {
    pub fn new(total_entries: usize) -> Self {
        Self {
            total_entries,
            ..Self::default()
        }
    }

    pub fn record_not_found(&mut self, line: usize, lsd: &str, details: String) {
        self.not_found += 1;
        self.failures.push(EntryFailure {
            line,
            lsd: lsd.to_string(),
            kind: FailureKind::NotFound,
            details,
        });
    }

    pub fn record_skipped(&mut self, line: usize, lsd: &str, details: String) {
        self.skipped += 1;
        self.failures.push(EntryFailure {
            line,
            lsd: lsd.to_string(),
            kind: FailureKind::Skipped,
            details,
        });
    }

    pub fn is_complete(&self) -> bool {
        self.located == self.total_entries
    }

    /// Generate a human-readable report of the run
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        let percent = |count: usize| {
            if self.total_entries == 0 {
                0.0
            } else {
                100.0 * count as f64 / self.total_entries as f64
            }
        };

        summary.push_str("=== ATS Conversion Report ===\n");
        summary.push_str(&format!("Total Entries: {}\n", self.total_entries));
        summary.push_str(&format!(
            "Located: {} ({:.1}%)\n",
            self.located,
            percent(self.located)
        ));
        summary.push_str(&format!(
            "Not Found: {} ({:.1}%)\n",
            self.not_found,
            percent(self.not_found)
        ));
        summary.push_str(&format!(
            "Skipped: {} ({:.1}%)\n",
            self.skipped,
            percent(self.skipped)
        ));
        summary.push_str(&format!(
            "Road Allowance Duplicates Resolved: {}\n",
            self.duplicates_resolved
        ));

        if !self.failures.is_empty() {
            summary.push_str("\nFirst 10 Problems:\n");
            for (i, failure) in self.failures.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. Line {} '{}' [{}]: {}\n",
                    i + 1,
                    failure.line,
                    failure.lsd,
                    failure.kind,
                    failure.details
                ));
            }
        }

        summary
    }
}
