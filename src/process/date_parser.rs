use chrono::{NaiveDate, NaiveDateTime};

/// Layouts tried after the ISO fast path, in order. Month-first comes before
/// day-first, so an ambiguous `04/03/2021` reads as April 3rd.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Fast parse of `"YYYY-MM-DD"` without going through the format machinery.
fn parse_iso_fast(s: &str) -> Option<NaiveDate> {
    let b = s.as_bytes();
    if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[5..7].parse().ok()?;
    let day: u32 = s[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Permissive calendar-date parse.
///
/// Accepts ISO dates (padded or not), slash, compact, month-first and
/// day-first layouts, and timestamps in any of those followed by a time
/// part (the time is discarded).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(d) = parse_iso_fast(s) {
        return Some(d);
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Some(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt.date());
    }
    // "<date> <time>" where the date part is any supported layout
    let (date_part, _) = s.split_once([' ', 'T'])?;
    parse_iso_fast(date_part).or_else(|| {
        DATE_FORMATS
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(date_part, f).ok())
    })
}
