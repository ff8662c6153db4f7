use std::collections::HashSet;

use arrow::{
    array::BooleanArray,
    compute::{filter_record_batch, max},
    datatypes::Date32Type,
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::analysis::{date_col, int_col, text_col};
use crate::error::{Result, TrackerError};
use crate::process::{DATE, LOCATION};

/// Rows of the table at its globally latest date.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub rows: RecordBatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedLocation {
    pub location: String,
    /// Ranking column value at the snapshot date.
    pub value: i64,
    /// Snapshot row the value was taken from.
    pub row: usize,
}

/// Filter `table` down to the rows carrying its maximum date.
pub fn latest_snapshot(table: &RecordBatch) -> Result<Snapshot> {
    let dates = date_col(table, DATE)?;
    let latest = max(dates).ok_or(TrackerError::EmptyTable)?;

    let mask: BooleanArray = dates.iter().map(|d| Some(d == Some(latest))).collect();
    let rows = filter_record_batch(table, &mask)?;
    let date = Date32Type::to_naive_date(latest);
    debug!(%date, rows = rows.num_rows(), "snapshot");

    Ok(Snapshot { date, rows })
}

/// Order the snapshot's locations by `ranking_column`, largest first, and
/// keep at most `n` of them.
///
/// Rows with a missing location or ranking value are skipped. Equal values
/// fall back to ascending location name; a repeated location keeps only its
/// best row, whose index is recorded on the result.
pub fn rank_locations(
    snapshot: &Snapshot,
    ranking_column: &str,
    n: usize,
) -> Result<Vec<RankedLocation>> {
    let locations = text_col(&snapshot.rows, LOCATION)?;
    let values = int_col(&snapshot.rows, ranking_column)?;

    let mut candidates: Vec<(&str, i64, usize)> = locations
        .iter()
        .zip(values.iter())
        .enumerate()
        .filter_map(|(row, (loc, v))| Some((loc?.trim(), v?, row)))
        .filter(|(loc, _, _)| !loc.is_empty())
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut seen = HashSet::new();
    let ranked: Vec<RankedLocation> = candidates
        .into_iter()
        .filter(|(loc, _, _)| seen.insert(*loc))
        .take(n)
        .map(|(loc, value, row)| RankedLocation {
            location: loc.to_string(),
            value,
            row,
        })
        .collect();
    Ok(ranked)
}

/// Latest-date snapshot plus its top `n` locations by `ranking_column`.
pub fn select_top_n(
    table: &RecordBatch,
    ranking_column: &str,
    n: usize,
) -> Result<(Snapshot, Vec<RankedLocation>)> {
    let snapshot = latest_snapshot(table)?;
    let ranked = rank_locations(&snapshot, ranking_column, n)?;
    info!(
        latest = %snapshot.date,
        ranked = ranked.len(),
        column = ranking_column,
        "selected top locations"
    );
    Ok((snapshot, ranked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{day, table};

    fn names(ranked: &[RankedLocation]) -> Vec<&str> {
        ranked.iter().map(|r| r.location.as_str()).collect()
    }

    #[test]
    fn ranks_descending_at_latest_date() {
        let t = table(&[
            ("A", "2021-06-01", Some(100), Some(1), None),
            ("B", "2021-06-01", Some(200), Some(2), None),
            ("C", "2021-06-01", Some(150), Some(3), None),
            ("D", "2021-06-01", Some(50), Some(4), None),
            ("E", "2021-06-01", Some(300), Some(5), None),
        ]);
        let (snapshot, ranked) = select_top_n(&t, "total_cases", 5).unwrap();
        assert_eq!(snapshot.date, day("2021-06-01"));
        assert_eq!(names(&ranked), vec!["E", "B", "C", "A", "D"]);
        assert!(ranked.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn fewer_locations_than_n() {
        let t = table(&[
            ("A", "2021-06-02", Some(10), None, None),
            ("B", "2021-06-02", Some(30), None, None),
            ("C", "2021-06-02", Some(20), None, None),
        ]);
        let (_, ranked) = select_top_n(&t, "total_cases", 5).unwrap();
        assert_eq!(names(&ranked), vec!["B", "C", "A"]);
    }

    #[test]
    fn snapshot_uses_global_max_date() {
        // X has a huge total but stopped reporting before the latest date
        let t = table(&[
            ("X", "2021-05-30", Some(9_000), None, None),
            ("Y", "2021-06-01", Some(10), None, None),
            ("Z", "2021-05-31", Some(8_000), None, None),
            ("W", "2021-06-01", Some(20), None, None),
        ]);
        let (snapshot, ranked) = select_top_n(&t, "total_cases", 5).unwrap();
        assert_eq!(snapshot.date, day("2021-06-01"));
        assert_eq!(snapshot.rows.num_rows(), 2);
        assert_eq!(names(&ranked), vec!["W", "Y"]);
    }

    #[test]
    fn truncates_to_n_and_breaks_ties_by_name() {
        let t = table(&[
            ("Peru", "2021-06-01", Some(50), None, None),
            ("Chile", "2021-06-01", Some(50), None, None),
            ("Brazil", "2021-06-01", Some(70), None, None),
            ("Bolivia", "2021-06-01", Some(50), None, None),
        ]);
        let (_, ranked) = select_top_n(&t, "total_cases", 3).unwrap();
        assert_eq!(names(&ranked), vec!["Brazil", "Bolivia", "Chile"]);
    }

    #[test]
    fn skips_missing_values_and_duplicates() {
        let t = table(&[
            ("A", "2021-06-01", None, None, None),
            ("B", "2021-06-01", Some(5), None, None),
            ("B", "2021-06-01", Some(7), None, None),
            ("", "2021-06-01", Some(100), None, None),
        ]);
        let (snapshot, ranked) = select_top_n(&t, "total_cases", 5).unwrap();
        assert_eq!(
            ranked,
            vec![RankedLocation {
                location: "B".into(),
                value: 7,
                row: 2,
            }]
        );
        let snap_locs = text_col(&snapshot.rows, LOCATION).unwrap();
        assert!(ranked
            .iter()
            .all(|r| snap_locs.iter().any(|l| l == Some(r.location.as_str()))));
    }

    #[test]
    fn ranks_by_other_column() {
        let t = table(&[
            ("A", "2021-06-01", Some(100), Some(9), None),
            ("B", "2021-06-01", Some(200), Some(1), None),
        ]);
        let (_, ranked) = select_top_n(&t, "total_deaths", 5).unwrap();
        assert_eq!(names(&ranked), vec!["A", "B"]);
    }

    #[test]
    fn empty_table_errors() {
        let t = table(&[]);
        let err = select_top_n(&t, "total_cases", 5).unwrap_err();
        assert!(matches!(err, TrackerError::EmptyTable));
    }
}
