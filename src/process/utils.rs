use arrow::datatypes::DataType;

use crate::process::date_parser;

/// 1) Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// A raw cell that carries a value; `None` for nulls and blank strings.
pub fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(clean_str).filter(|s| !s.is_empty())
}

/// 2) Infer the narrowest Arrow dtype for a single cleaned value
pub fn infer_dtype_from_str(s: &str) -> DataType {
    if s.parse::<i64>().is_ok() {
        DataType::Int64
    } else if s.parse::<f64>().is_ok() {
        DataType::Float64
    } else if date_parser::parse_date(s).is_some() {
        DataType::Date32
    } else {
        DataType::Utf8
    }
}

/// Widen two inferred dtypes so that both values fit.
pub fn widen(a: &DataType, b: &DataType) -> DataType {
    match (a, b) {
        (x, y) if x == y => x.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }
        _ => DataType::Utf8,
    }
}

/// 3) Parse an integer count. Integral floats such as `"1234.0"` are
/// accepted since exports often write counts that way.
pub fn parse_count(s: &str) -> Option<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
