use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tilib_core::{Bar, DataError};
use tracing::debug;

/// Load OHLCV bars from a CSV file.
///
/// Expected columns (case-insensitive, flexible ordering):
/// `timestamp` (or `date`, `datetime`), `open`, `high`, `low`, `close`, `volume`
///
/// `open` and `volume` are optional: a missing open copies the close, a
/// missing volume is zero. Bars are returned sorted by timestamp.
pub fn load_bars_from_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound(format!(
            "CSV file not found: {}",
            path.display()
        )));
    }

    let instrument = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::ParseError(format!("Failed to open CSV: {}", e)))?;

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(format!("Failed to read headers: {}", e)))?
        .clone();

    let col_map = resolve_bar_columns(&headers)?;

    let mut bars = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataError::ParseError(format!("CSV record error: {}", e)))?;

        let timestamp = parse_timestamp(field(&record, col_map.timestamp, row)?)?;
        let high = parse_decimal(field(&record, col_map.high, row)?, "high")?;
        let low = parse_decimal(field(&record, col_map.low, row)?, "low")?;
        let close = parse_decimal(field(&record, col_map.close, row)?, "close")?;
        let open = match col_map.open {
            Some(idx) => parse_decimal(field(&record, idx, row)?, "open")?,
            None => close,
        };
        let volume = match col_map.volume {
            Some(idx) => parse_decimal(field(&record, idx, row)?, "volume")?,
            None => Decimal::ZERO,
        };

        bars.push(Bar {
            instrument: instrument.clone(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    debug!(path = %path.display(), bars = bars.len(), "Loaded bars from CSV");
    Ok(bars)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct BarColumnMap {
    timestamp: usize,
    open: Option<usize>,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

fn resolve_bar_columns(headers: &csv::StringRecord) -> Result<BarColumnMap, DataError> {
    let ts = find_column(headers, &["timestamp", "date", "datetime", "time"])
        .ok_or_else(|| DataError::ParseError("No timestamp column found".into()))?;
    let high = find_column(headers, &["high", "h"])
        .ok_or_else(|| DataError::ParseError("No high column found".into()))?;
    let low = find_column(headers, &["low", "l"])
        .ok_or_else(|| DataError::ParseError("No low column found".into()))?;
    let close = find_column(headers, &["close", "c", "price"])
        .ok_or_else(|| DataError::ParseError("No close column found".into()))?;

    Ok(BarColumnMap {
        timestamp: ts,
        open: find_column(headers, &["open", "o"]),
        high,
        low,
        close,
        volume: find_column(headers, &["volume", "vol", "v"]),
    })
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let h = header.trim().to_lowercase();
        names.iter().any(|name| h == *name)
    })
}

fn field(record: &csv::StringRecord, idx: usize, row: usize) -> Result<&str, DataError> {
    record
        .get(idx)
        .ok_or_else(|| DataError::ParseError(format!("Row {} is missing column {}", row + 1, idx)))
}

fn parse_decimal(s: &str, field: &str) -> Result<Decimal, DataError> {
    Decimal::from_str(s.trim())
        .map_err(|e| DataError::ParseError(format!("Failed to parse {} '{}': {}", field, s, e)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DataError> {
    let s = s.trim();

    // RFC 3339 / ISO 8601 with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Common formats (without timezone, assume UTC)
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%Y%m%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
    ];

    for fmt in &formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }

    // Date-only
    if let Some(naive_dt) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive_dt, Utc));
    }

    // Unix timestamp (seconds)
    if let Some(dt) = s.parse::<i64>().ok().and_then(|ts| DateTime::from_timestamp(ts, 0)) {
        return Ok(dt);
    }

    Err(DataError::ParseError(format!(
        "Unable to parse timestamp: '{}'",
        s
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tilib-data-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_bars_sorted() {
        let path = write_temp(
            "ES.csv",
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-03,101,103,100,102,1500\n\
             2024-01-02,100,102,99,101,1200\n",
        );
        let bars = load_bars_from_csv(&path).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].instrument, "ES");
        assert_eq!(bars[0].timestamp, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(bars[0].close, dec!(101));
        assert_eq!(bars[1].volume, dec!(1500));
    }

    #[test]
    fn test_optional_open_and_volume() {
        let path = write_temp(
            "NQ.csv",
            "timestamp,high,low,close\n1704186000,10,8,9\n",
        );
        let bars = load_bars_from_csv(&path).unwrap();
        assert_eq!(bars[0].open, dec!(9));
        assert_eq!(bars[0].volume, Decimal::ZERO);
        assert_eq!(bars[0].timestamp, DateTime::from_timestamp(1704186000, 0).unwrap());
    }

    #[test]
    fn test_missing_column() {
        let path = write_temp("bad.csv", "timestamp,high,close\n2024-01-02,10,9\n");
        let err = load_bars_from_csv(&path).unwrap_err();
        assert!(matches!(err, DataError::ParseError(msg) if msg.contains("low")));
    }

    #[test]
    fn test_bad_number() {
        let path = write_temp(
            "bad_num.csv",
            "timestamp,high,low,close\n2024-01-02 09:30:00,ten,8,9\n",
        );
        assert!(matches!(load_bars_from_csv(&path), Err(DataError::ParseError(_))));
    }

    #[test]
    fn test_not_found() {
        let path = std::env::temp_dir().join("tilib-definitely-missing.csv");
        assert!(matches!(load_bars_from_csv(&path), Err(DataError::NotFound(_))));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T14:30:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01 14:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("03/01/2024 14:30").unwrap(), expected);
        assert!(parse_timestamp("yesterday").is_err());
    }
}
