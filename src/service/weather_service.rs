//! The single network-facing operation: fetch one weather series.

use crate::query::builder::{build_query, StructuredQuery};
use crate::series::normalizer::normalize;
use crate::service::error::DataFetchError;
use crate::service::generator::ContentGenerator;
use crate::types::metric::Metric;
use crate::types::period::DateRange;
use crate::types::region::Region;
use crate::types::time_series::{MetricReading, TimeSeriesRecord, WeatherSeries};
use crate::types::widget_config::validate_metrics;
use chrono::NaiveDate;
use log::{info, warn};
use serde_json::{Map, Value};

/// Fetches weather series from a [`ContentGenerator`].
///
/// Every call is a fresh round trip; nothing is cached or retried. A call
/// either yields a complete, validated and date-sorted [`WeatherSeries`] or a
/// [`DataFetchError`].
///
/// # Examples
///
/// ```no_run
/// use weather_dash::{DateRange, GeminiClient, Metric, Region, WeatherService};
/// use chrono::NaiveDate;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = WeatherService::new(GeminiClient::from_env()?);
/// let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
/// let series = service
///     .fetch(Region::JejuCity, &[Metric::AverageTemperature], DateRange::single(day))
///     .await?;
/// println!("{} record(s), latest {:?}", series.len(), series.latest());
/// # Ok(())
/// # }
/// ```
pub struct WeatherService<G> {
    generator: G,
}

impl<G: ContentGenerator> WeatherService<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn fetch(
        &self,
        region: Region,
        metrics: &[Metric],
        range: DateRange,
    ) -> Result<WeatherSeries, DataFetchError> {
        validate_metrics(metrics)?;
        let query = build_query(region, metrics, range);
        let text = self.generator.generate(&query).await?;
        let records = parse_records(&query, &text)?;
        info!(
            "Received {} record(s) for {} ({})",
            records.len(),
            region,
            range
        );
        Ok(normalize(metrics.to_vec(), records))
    }
}

/// Parses a raw response payload and checks every object against the
/// query's required fields and date range.
pub(crate) fn parse_records(
    query: &StructuredQuery,
    text: &str,
) -> Result<Vec<TimeSeriesRecord>, DataFetchError> {
    let objects: Vec<Map<String, Value>> = serde_json::from_str(text.trim())?;
    if objects.is_empty() {
        return Err(DataFetchError::EmptyResponse);
    }

    let expected = query.expected_fields();
    let mut extra_fields = 0usize;
    let mut records = Vec::with_capacity(objects.len());

    for (index, object) in objects.iter().enumerate() {
        let date = parse_date(object, index, query.range)?;
        let readings = query
            .metrics
            .iter()
            .map(|metric| {
                Ok(MetricReading {
                    metric: *metric,
                    value: number_field(object, metric.name(), index)?,
                    five_year_avg: number_field(object, &metric.avg_key(), index)?,
                })
            })
            .collect::<Result<Vec<_>, DataFetchError>>()?;

        extra_fields += object
            .keys()
            .filter(|key| !expected.iter().any(|field| field == *key))
            .count();
        records.push(TimeSeriesRecord::new(date, readings));
    }

    if extra_fields > 0 {
        warn!(
            "Ignored {} field(s) outside the requested schema for {}",
            extra_fields, query.region
        );
    }
    Ok(records)
}

fn parse_date(
    object: &Map<String, Value>,
    index: usize,
    range: DateRange,
) -> Result<NaiveDate, DataFetchError> {
    let raw = object
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| violation(index, "missing string field 'date'"))?;
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| violation(index, format!("date '{raw}' is not in YYYY-MM-DD format")))?;
    if !range.contains(date) {
        return Err(violation(
            index,
            format!("date {date} is outside the requested range {range}"),
        ));
    }
    Ok(date)
}

fn number_field(
    object: &Map<String, Value>,
    key: &str,
    index: usize,
) -> Result<f64, DataFetchError> {
    object
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| violation(index, format!("missing numeric field '{key}'")))
}

fn violation(index: usize, reason: impl Into<String>) -> DataFetchError {
    DataFetchError::SchemaViolation {
        index,
        reason: reason.into(),
    }
}
