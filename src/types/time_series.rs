//! Data structures for a fetched weather series.

use crate::types::metric::Metric;
use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, PolarsResult};

/// Current value and 5-year average of one metric on one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricReading {
    pub metric: Metric,
    pub value: f64,
    pub five_year_avg: f64,
}

/// One date of a series: a reading for every requested metric.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRecord {
    pub date: NaiveDate,
    pub readings: Vec<MetricReading>,
}

impl TimeSeriesRecord {
    pub fn new(date: NaiveDate, readings: Vec<MetricReading>) -> Self {
        Self { date, readings }
    }

    pub fn reading(&self, metric: Metric) -> Option<&MetricReading> {
        self.readings.iter().find(|r| r.metric == metric)
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.reading(metric).map(|r| r.value)
    }

    pub fn five_year_avg(&self, metric: Metric) -> Option<f64> {
        self.reading(metric).map(|r| r.five_year_avg)
    }
}

/// The latest value of one metric, as shown above a widget's chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub metric: Metric,
    pub value: Option<f64>,
    pub unit: &'static str,
}

impl Headline {
    /// `"12.5°C"`, or `"N/A"` when the latest record has no value.
    pub fn display(&self) -> String {
        match self.value {
            Some(value) => format!("{}{}", value, self.unit),
            None => "N/A".to_string(),
        }
    }
}

/// An ordered sequence of records, the result of one fetch.
///
/// A series is never mutated after normalization; a re-fetch replaces it
/// wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSeries {
    metrics: Vec<Metric>,
    records: Vec<TimeSeriesRecord>,
}

impl WeatherSeries {
    pub(crate) fn from_sorted(metrics: Vec<Metric>, records: Vec<TimeSeriesRecord>) -> Self {
        Self { metrics, records }
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The chronologically last record.
    pub fn latest(&self) -> Option<&TimeSeriesRecord> {
        self.records.last()
    }

    /// Latest value per requested metric.
    pub fn headline(&self) -> Vec<Headline> {
        let latest = self.latest();
        self.metrics
            .iter()
            .map(|metric| Headline {
                metric: *metric,
                value: latest.and_then(|record| record.value(*metric)),
                unit: metric.unit(),
            })
            .collect()
    }

    /// Field names in record order: `date`, then value and 5-year average per metric.
    pub fn field_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(1 + self.metrics.len() * 2);
        names.push("date".to_string());
        for metric in &self.metrics {
            names.push(metric.name().to_string());
            names.push(metric.avg_key());
        }
        names
    }

    /// Materialises the series as a polars `DataFrame` with one column per field.
    ///
    /// Dates are stored as `YYYY-MM-DD` strings, metric columns as nullable `f64`.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(1 + self.metrics.len() * 2);
        let dates: Vec<String> = self
            .records
            .iter()
            .map(|r| r.date.format("%Y-%m-%d").to_string())
            .collect();
        columns.push(Column::new("date".into(), dates));

        for metric in &self.metrics {
            let values: Vec<Option<f64>> = self.records.iter().map(|r| r.value(*metric)).collect();
            let averages: Vec<Option<f64>> = self
                .records
                .iter()
                .map(|r| r.five_year_avg(*metric))
                .collect();
            columns.push(Column::new(metric.name().into(), values));
            columns.push(Column::new(metric.avg_key().into(), averages));
        }

        DataFrame::new(columns)
    }
}
