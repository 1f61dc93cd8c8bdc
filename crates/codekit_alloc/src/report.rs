//! Allocation report model.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one batch allocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportAllocation {
    /// Number of request rows seen.
    pub cnt_requested: u64,
    /// Number of codes minted.
    pub cnt_allocated: u64,
    /// Number of rows answered with an absence marker.
    pub cnt_skipped: u64,
    /// Number of minted codes whose suffix exceeds the digit width.
    pub cnt_overflowed: u64,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl ReportAllocation {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_requested".to_string(), self.cnt_requested);
        dict_counts.insert("cnt_allocated".to_string(), self.cnt_allocated);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_overflowed".to_string(), self.cnt_overflowed);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} requested={} allocated={} skipped={} overflowed={} warnings={}",
            self.cnt_requested,
            self.cnt_allocated,
            self.cnt_skipped,
            self.cnt_overflowed,
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[ALLOC]"))
    }
}
