//! Dataset rows and load statistics

use serde::{Deserialize, Serialize};

/// One row of the sales dataset. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Sales rank, `None` when missing or unparseable
    pub rank: Option<u32>,
    pub name: String,
    pub platform: String,
    /// Release year, `None` for `N/A` and other non-numeric cells
    pub year: Option<i32>,
    pub genre: String,
    /// Publisher name, may be empty
    pub publisher: String,
    pub na_sales: String,
    pub eu_sales: String,
    pub jp_sales: String,
    pub other_sales: String,
    /// Global sales in millions, NaN when unparseable
    pub global_sales: f64,
}

impl SalesRecord {
    /// Global sales with NaN replaced by zero
    pub fn finite_sales(&self) -> f64 {
        if self.global_sales.is_nan() {
            0.0
        } else {
            self.global_sales
        }
    }
}

/// Counters collected while coercing rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub rows: usize,
    pub invalid_years: usize,
    pub invalid_sales: usize,
    /// Text cells that were not valid UTF-8 and were decoded lossily
    pub lossy_text: usize,
}

/// The ordered record sequence of one CSV resource
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<SalesRecord>,
    pub stats: LoadStats,
}

impl Dataset {
    pub fn new(records: Vec<SalesRecord>, stats: LoadStats) -> Self {
        Self { records, stats }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
