use std::{collections::HashMap, fmt};

use arrow::{array::Array, record_batch::RecordBatch};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::analysis::{date_col, int_col, text_col, RankedLocation, Snapshot};
use crate::error::Result;
use crate::process::{DATE, LOCATION};

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub total_cases: Option<i64>,
    pub new_cases: Option<i64>,
}

/// Full history of one location, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSeries {
    pub location: String,
    pub points: Vec<SeriesPoint>,
}

/// Why a death rate could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedRate {
    ZeroCases,
    MissingCases,
    MissingDeaths,
}

impl fmt::Display for UndefinedRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UndefinedRate::ZeroCases => "total_cases is zero",
            UndefinedRate::MissingCases => "total_cases is missing",
            UndefinedRate::MissingDeaths => "total_deaths is missing",
        })
    }
}

/// Non-fatal: a snapshot row whose death rate is undefined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputationWarning {
    pub location: String,
    pub reason: UndefinedRate,
}

impl fmt::Display for ComputationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "death rate undefined for {}: {}", self.location, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeathRate {
    pub location: String,
    /// Percentage; `None` when undefined.
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeathRates {
    /// One entry per ranked location, in ranking order.
    pub rates: Vec<DeathRate>,
    pub warnings: Vec<ComputationWarning>,
}

/// `total_deaths / total_cases * 100`.
pub fn death_rate(
    total_deaths: Option<i64>,
    total_cases: Option<i64>,
) -> std::result::Result<f64, UndefinedRate> {
    let cases = total_cases.ok_or(UndefinedRate::MissingCases)?;
    if cases == 0 {
        return Err(UndefinedRate::ZeroCases);
    }
    let deaths = total_deaths.ok_or(UndefinedRate::MissingDeaths)?;
    Ok(deaths as f64 * 100.0 / cases as f64)
}

/// Date-ordered history of every ranked location, taken from the full table.
pub fn location_series(
    table: &RecordBatch,
    ranked: &[RankedLocation],
) -> Result<Vec<LocationSeries>> {
    let locations = text_col(table, LOCATION)?;
    let dates = date_col(table, DATE)?;
    let total_cases = int_col(table, "total_cases")?;
    let new_cases = int_col(table, "new_cases")?;

    let slot: HashMap<&str, usize> = ranked
        .iter()
        .enumerate()
        .map(|(i, r)| (r.location.as_str(), i))
        .collect();
    let mut series: Vec<LocationSeries> = ranked
        .iter()
        .map(|r| LocationSeries {
            location: r.location.clone(),
            points: Vec::new(),
        })
        .collect();

    for row in 0..table.num_rows() {
        let Some(loc) = locations.is_valid(row).then(|| locations.value(row).trim()) else {
            continue;
        };
        let Some(&i) = slot.get(loc) else {
            continue;
        };
        let Some(date) = dates.value_as_date(row) else {
            continue;
        };
        series[i].points.push(SeriesPoint {
            date,
            total_cases: total_cases.is_valid(row).then(|| total_cases.value(row)),
            new_cases: new_cases.is_valid(row).then(|| new_cases.value(row)),
        });
    }

    for s in &mut series {
        // stable, so same-day rows keep file order
        s.points.sort_by_key(|p| p.date);
        debug!(location = %s.location, points = s.points.len(), "series");
    }
    Ok(series)
}

/// Death rate of each ranked location at the snapshot date. Undefined
/// rates are returned as `None` and recorded as warnings.
pub fn death_rates(snapshot: &Snapshot, ranked: &[RankedLocation]) -> Result<DeathRates> {
    let locations = text_col(&snapshot.rows, LOCATION)?;
    let total_cases = int_col(&snapshot.rows, "total_cases")?;
    let total_deaths = int_col(&snapshot.rows, "total_deaths")?;

    let mut out = DeathRates::default();
    for r in ranked {
        // the row the ranking value came from
        let row = r.row;
        if row >= snapshot.rows.num_rows()
            || !locations.is_valid(row)
            || locations.value(row).trim() != r.location
        {
            continue;
        }
        let cases = total_cases.is_valid(row).then(|| total_cases.value(row));
        let deaths = total_deaths.is_valid(row).then(|| total_deaths.value(row));
        let rate = match death_rate(deaths, cases) {
            Ok(rate) => Some(rate),
            Err(reason) => {
                let warning = ComputationWarning {
                    location: r.location.clone(),
                    reason,
                };
                warn!(%warning, "computation warning");
                out.warnings.push(warning);
                None
            }
        };
        out.rates.push(DeathRate {
            location: r.location.clone(),
            rate,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{day, table};
    use crate::analysis::select_top_n;

    #[test]
    fn rate_is_a_percentage() {
        assert_eq!(death_rate(Some(5), Some(200)), Ok(2.5));
        assert_eq!(death_rate(Some(0), Some(10)), Ok(0.0));
        for (deaths, cases) in [(0, 1), (1, 2), (99, 100), (12_345, 987_654)] {
            let r = death_rate(Some(deaths), Some(cases)).unwrap();
            assert!((0.0..=100.0).contains(&r), "{deaths}/{cases} -> {r}");
        }
    }

    #[test]
    fn rate_undefined_cases() {
        assert_eq!(death_rate(Some(0), Some(0)), Err(UndefinedRate::ZeroCases));
        assert_eq!(death_rate(Some(3), None), Err(UndefinedRate::MissingCases));
        assert_eq!(death_rate(None, Some(3)), Err(UndefinedRate::MissingDeaths));
    }

    #[test]
    fn series_cover_full_history_in_date_order() {
        let t = table(&[
            ("A", "2021-06-03", Some(30), None, Some(5)),
            ("B", "2021-06-03", Some(99), None, Some(1)),
            ("A", "2021-06-01", Some(20), None, Some(-2)),
            ("Z", "2021-06-01", Some(1), None, Some(1)),
            ("A", "2021-06-02", None, None, None),
        ]);
        let (_, ranked) = select_top_n(&t, "total_cases", 5).unwrap();
        let series = location_series(&t, &ranked).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].location, "B");
        let a = &series[1];
        assert_eq!(a.location, "A");
        let dates: Vec<NaiveDate> = a.points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![day("2021-06-01"), day("2021-06-02"), day("2021-06-03")]
        );
        assert_eq!(a.points[0].new_cases, Some(-2));
        assert_eq!(a.points[1].total_cases, None);
    }

    #[test]
    fn death_rates_follow_ranking_and_flag_zero_cases() {
        let t = table(&[
            ("A", "2021-06-01", Some(0), Some(0), None),
            ("B", "2021-06-01", Some(200), Some(4), None),
            ("C", "2021-06-01", Some(100), None, None),
            ("B", "2021-05-31", Some(150), Some(3), None),
        ]);
        let (snapshot, ranked) = select_top_n(&t, "total_cases", 5).unwrap();
        let out = death_rates(&snapshot, &ranked).unwrap();

        let locs: Vec<&str> = out.rates.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locs, vec!["B", "C", "A"]);
        assert_eq!(out.rates[0].rate, Some(2.0));
        assert_eq!(out.rates[1].rate, None);
        assert_eq!(out.rates[2].rate, None);
        assert_eq!(
            out.warnings,
            vec![
                ComputationWarning {
                    location: "C".into(),
                    reason: UndefinedRate::MissingDeaths
                },
                ComputationWarning {
                    location: "A".into(),
                    reason: UndefinedRate::ZeroCases
                },
            ]
        );
    }

    #[test]
    fn repeated_location_rate_comes_from_ranked_row() {
        let t = table(&[
            ("A", "2021-06-01", Some(100), Some(50), None),
            ("A", "2021-06-01", Some(200), Some(2), None),
        ]);
        let (snapshot, ranked) = select_top_n(&t, "total_cases", 5).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].value, 200);
        assert_eq!(ranked[0].row, 1);

        let out = death_rates(&snapshot, &ranked).unwrap();
        assert_eq!(out.rates[0].rate, Some(1.0));
        assert!(out.warnings.is_empty());
    }
}
