use serde::Serialize;

use crate::watched::WatchedRecord;

/// Aggregate figures shown above the watched list
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}

impl WatchedSummary {
    /// Averages only count records where the value is present.
    pub fn from_records(records: &[WatchedRecord]) -> Self {
        Self {
            count: records.len(),
            avg_imdb_rating: average(records.iter().filter_map(|r| r.imdb_rating.map(f64::from))),
            avg_user_rating: average(
                records
                    .iter()
                    .filter_map(|r| r.user_rating.map(|u| f64::from(u.value()))),
            ),
            avg_runtime: average(records.iter().filter_map(|r| r.runtime.map(f64::from))),
        }
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
