//! Raw price canonicalisation.
//!
//! Provider bars arrive with short field names (`t,o,h,l,c,v`, `t` in epoch
//! milliseconds). Canonical bars carry a calendar date (time of day stripped),
//! `close` renamed to `value`, zero for any missing field, ascending dates and
//! no duplicate dates (last occurrence wins).

use super::provider::DataError;
use crate::domain::PriceBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Provider-shaped bar as received on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBar {
    /// Milliseconds since the Unix epoch.
    pub t: i64,
    #[serde(default)]
    pub o: Option<f64>,
    #[serde(default)]
    pub h: Option<f64>,
    #[serde(default)]
    pub l: Option<f64>,
    #[serde(default)]
    pub c: Option<f64>,
    #[serde(default)]
    pub v: Option<f64>,
}

impl WireBar {
    pub fn date(&self) -> Result<NaiveDate, DataError> {
        chrono::DateTime::from_timestamp_millis(self.t)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| DataError::ValidationError(format!("invalid timestamp: {}", self.t)))
    }

    pub fn to_price_bar(&self) -> Result<PriceBar, DataError> {
        Ok(PriceBar {
            date: self.date()?,
            open: self.o.unwrap_or(0.0),
            high: self.h.unwrap_or(0.0),
            low: self.l.unwrap_or(0.0),
            value: self.c.unwrap_or(0.0),
            volume: self.v.unwrap_or(0.0),
        })
    }
}

/// Midnight UTC of the bar's date.
impl From<&PriceBar> for WireBar {
    fn from(bar: &PriceBar) -> Self {
        WireBar {
            t: bar.date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis(),
            o: Some(bar.open),
            h: Some(bar.high),
            l: Some(bar.low),
            c: Some(bar.value),
            v: Some(bar.volume),
        }
    }
}

/// Convert wire bars into canonical, date-ordered price bars.
pub fn canonicalize_bars(raw: &[WireBar]) -> Result<Vec<PriceBar>, DataError> {
    let bars = raw
        .iter()
        .map(WireBar::to_price_bar)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sort_dedupe(bars))
}

/// Sort ascending by date; on duplicate dates the later input row wins.
pub fn sort_dedupe(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    date: String,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(alias = "value")]
    close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

/// Read bars from CSV with a `date,open,high,low,close,volume` header.
///
/// `date` may be `YYYY-MM-DD` or an RFC 3339 timestamp (time of day is dropped).
pub fn read_bars_csv<R: Read>(reader: R) -> Result<Vec<PriceBar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for (line, row) in rdr.deserialize::<CsvBar>().enumerate() {
        let row = row.map_err(|e| DataError::ValidationError(format!("csv row {}: {e}", line + 1)))?;
        let date = parse_date(&row.date)
            .ok_or_else(|| DataError::ValidationError(format!("csv row {}: bad date '{}'", line + 1, row.date)))?;
        bars.push(PriceBar {
            date,
            open: row.open.unwrap_or(0.0),
            high: row.high.unwrap_or(0.0),
            low: row.low.unwrap_or(0.0),
            value: row.close.unwrap_or(0.0),
            volume: row.volume.unwrap_or(0.0),
        });
    }
    Ok(sort_dedupe(bars))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.naive_utc().date())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(t: i64, c: f64) -> WireBar {
        WireBar {
            t,
            o: None,
            h: None,
            l: None,
            c: Some(c),
            v: None,
        }
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let bar: WireBar = serde_json::from_str(r#"{"t":1704844800000,"c":185.5,"v":null}"#).unwrap();
        let bar = bar.to_price_bar().unwrap();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(bar.value, 185.5);
        assert_eq!(bar.open, 0.0);
        assert_eq!(bar.volume, 0.0);
    }

    #[test]
    fn intraday_timestamps_normalize_to_date() {
        // 2024-01-10T21:00:00Z
        let bar = wire(1704920400000, 1.0).to_price_bar().unwrap();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn canonicalize_sorts_and_keeps_last_duplicate() {
        let day = 86_400_000;
        let base = 1704844800000;
        let bars = canonicalize_bars(&[
            wire(base + 2 * day, 3.0),
            wire(base, 1.0),
            wire(base + day, 2.0),
            wire(base + day + 3_600_000, 2.5),
        ])
        .unwrap();

        let values: Vec<f64> = bars.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![1.0, 2.5, 3.0]);
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn csv_bars_convert_back_to_wire() {
        let bars = read_bars_csv("date,close\n2024-01-10,185.5\n".as_bytes()).unwrap();
        let wire = WireBar::from(&bars[0]);
        assert_eq!(wire.t, 1704844800000);
        assert_eq!(wire.to_price_bar().unwrap(), bars[0]);
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let parsed: Result<WireBar, _> = serde_json::from_str(r#"{"c":1.0}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn csv_reader_accepts_partial_columns() {
        let csv = "date,close,volume\n2024-01-03,11.0,\n2024-01-02,10.0,500\n";
        let bars = read_bars_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].volume, 500.0);
        assert_eq!(bars[1].volume, 0.0);
        assert_eq!(bars[1].open, 0.0);
    }

    #[test]
    fn csv_reader_reports_bad_dates() {
        let err = read_bars_csv("date,close\nnot-a-date,1.0\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("bad date"));
    }
}
