//! Builds the task description and the response schema for one series request.

use crate::query::schema::{Schema, SchemaType};
use crate::types::metric::Metric;
use crate::types::period::DateRange;
use crate::types::region::Region;

/// A complete request for the generative data service.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredQuery {
    pub region: Region,
    pub metrics: Vec<Metric>,
    pub range: DateRange,
    /// Natural-language task description.
    pub prompt: String,
    /// Array-of-objects schema the response must conform to.
    pub response_schema: Schema,
}

impl StructuredQuery {
    /// Required fields of every record, in declaration order.
    pub fn expected_fields(&self) -> Vec<String> {
        self.response_schema
            .items
            .as_ref()
            .map(|items| items.required.clone())
            .unwrap_or_default()
    }
}

/// Builds the query for `region`, `metrics` and `range`.
///
/// `metrics` must be non-empty and distinct, as checked by
/// [`crate::validate_metrics`]; [`crate::WeatherService::fetch`] checks it
/// before building the query.
pub fn build_query(region: Region, metrics: &[Metric], range: DateRange) -> StructuredQuery {
    let start = range.start().format("%Y-%m-%d").to_string();
    let end = range.end().format("%Y-%m-%d").to_string();

    let mut record = Schema::object().with_required(
        "date",
        Schema::scalar(
            SchemaType::String,
            "The date for the data point in 'YYYY-MM-DD' format.",
        ),
    );
    for metric in metrics {
        let english = metric.english_name();
        record = record
            .with_required(
                metric.name(),
                Schema::scalar(
                    SchemaType::Number,
                    format!("The current value for {english}. Should be a realistic number."),
                ),
            )
            .with_required(
                metric.avg_key(),
                Schema::scalar(
                    SchemaType::Number,
                    format!(
                        "The 5-year historical average value for {english} on this specific date. \
                         This value should vary day-by-day, reflecting the historical seasonal trend, \
                         not be a single constant for the whole period."
                    ),
                ),
            );
    }

    let response_schema = Schema::array_of(
        record,
        format!(
            "An array of daily weather data points for the period from {start} to {end}. \
             Each point includes current values and 5-year averages."
        ),
    );

    StructuredQuery {
        region,
        metrics: metrics.to_vec(),
        range,
        prompt: build_prompt(region, metrics, &start, &end),
        response_schema,
    }
}

fn build_prompt(region: Region, metrics: &[Metric], start: &str, end: &str) -> String {
    let english: Vec<&str> = metrics.iter().map(Metric::english_name).collect();
    let example = metrics.first().copied().unwrap_or(Metric::AverageTemperature);
    let example_avg = example.avg_key();
    let example = example.name();

    format!(
        "You are an expert meteorological data analyst for Jeju Island, South Korea. \
Your task is to provide realistic weather data in a specific JSON format.

Generate a JSON object containing an array of weather data points based on these parameters:
- Region: \"{region}\"
- Metrics: \"{metrics}\"
- Period: from \"{start}\" to \"{end}\"

The JSON response must be an array of objects, and it must strictly adhere to the provided schema.
- For the given period from {start} to {end}, provide one data point for each day. \
If the period is a single day (start and end dates are the same), provide a single data point in the array.
- For each requested metric (e.g., \"{example}\"), you must provide two values for each data point:
  1. The current/recent value, using the metric name as the key (e.g., \"{example}\").
  2. The 5-year historical average for that same day, using the key format \"{example_avg}\".
- The date for each data point must be formatted as 'YYYY-MM-DD' and fall within the requested date range.
- The values for each metric should be realistic for the given region, metric, and date, showing natural daily variation.
- The 5-year average values should be plausible and generally smoother than the daily current values.
- CRUCIAL: The 5-year average values must NOT be a single constant value for the entire period. \
They must reflect the specific historical average for EACH INDIVIDUAL DATE in the series, \
showing slight, realistic variations from day to day as expected for that time of year.
- Do not include any text, explanations, or markdown formatting outside of the JSON array.
",
        region = region,
        metrics = english.join(", "),
    )
}
