//! Delimited-text export of a weather series.

use crate::export::error::ExportError;
use crate::types::metric::{FIVE_YEAR_AVG_LABEL, FIVE_YEAR_AVG_SUFFIX};
use crate::types::time_series::WeatherSeries;
use log::{info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs, task};

/// Rewrites the `_5yr_avg` suffix of a field name into its display form.
pub fn display_header(field: &str) -> String {
    field.replace(FIVE_YEAR_AVG_SUFFIX, FIVE_YEAR_AVG_LABEL)
}

/// Serializes `series` as a UTF-8 CSV document with a byte-order mark.
///
/// The header row holds the record field names with average columns renamed
/// by [`display_header`]. Every cell, header included, is quoted. Values keep
/// polars' float form (`70.0`) and rows end with `\n`.
/// Returns `Ok(None)` for an empty series.
pub fn render_csv(series: &WeatherSeries) -> Result<Option<Vec<u8>>, ExportError> {
    if series.is_empty() {
        warn!("No data available to export.");
        return Ok(None);
    }

    let mut df = series.to_frame()?;
    let headers: Vec<String> = series
        .field_names()
        .iter()
        .map(|field| display_header(field))
        .collect();
    df.set_column_names(headers.iter().map(String::as_str))?;

    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_bom(true)
        .include_header(true)
        .with_quote_style(QuoteStyle::Always)
        .finish(&mut df)?;
    Ok(Some(buffer))
}

/// Writes the CSV rendition of `series` to `path`.
///
/// Takes a shared snapshot of the series so a concurrent re-fetch cannot
/// change what is exported. Returns the written path, or `None` when the
/// series is empty and nothing was written.
pub async fn export_csv(
    series: Arc<WeatherSeries>,
    path: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(bytes) = task::spawn_blocking(move || render_csv(&series)).await?? else {
        return Ok(None);
    };
    fs::write(path, &bytes)
        .await
        .map_err(|e| ExportError::Write(path.to_path_buf(), e))?;
    info!("Wrote {} bytes of CSV to {:?}", bytes.len(), path);
    Ok(Some(path.to_path_buf()))
}
