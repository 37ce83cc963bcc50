//! Polars export of feature frames.
//!
//! Columns: date (Date), value, feature columns in frame order, month (String
//! category), year, group, time_idx.

use super::frame::FeatureFrame;
use crate::data::DataError;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::path::Path;

pub fn to_dataframe(frame: &FeatureFrame) -> Result<DataFrame, DataError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| DataError::ExportError("epoch date".into()))?;
    let days: Vec<i32> = frame
        .dates()
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();
    let n = frame.len();

    let mut columns = vec![
        Column::new("date".into(), days)
            .cast(&DataType::Date)
            .map_err(|e| DataError::ExportError(format!("date cast: {e}")))?,
        Column::new("value".into(), frame.values().to_vec()),
    ];
    for feature in frame.columns() {
        columns.push(Column::new(feature.name.as_str().into(), feature.values.clone()));
    }
    let months: Vec<String> = (0..n).map(|i| frame.month(i).to_string()).collect();
    let years: Vec<i32> = (0..n).map(|i| frame.year(i)).collect();
    let groups: Vec<&str> = vec![frame.group(); n];
    columns.push(Column::new("month".into(), months));
    columns.push(Column::new("year".into(), years));
    columns.push(Column::new("group".into(), groups));
    columns.push(Column::new("time_idx".into(), frame.time_idx().to_vec()));

    DataFrame::new(columns).map_err(|e| DataError::ExportError(format!("dataframe creation: {e}")))
}

/// Write the frame as a Parquet file, creating parent directories.
pub fn write_parquet(frame: &FeatureFrame, path: &Path) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| DataError::ExportError(format!("create {}: {e}", parent.display())))?;
    }
    let mut df = to_dataframe(frame)?;
    let file = fs::File::create(path)
        .map_err(|e| DataError::ExportError(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| DataError::ExportError(format!("write parquet: {e}")))?;
    Ok(())
}
