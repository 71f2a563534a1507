use crate::types::metric::Metric;
use crate::types::time_series::{TimeSeriesRecord, WeatherSeries};
use log::warn;

/// Sorts records chronologically into a [`WeatherSeries`].
///
/// The sort is stable: records sharing a date keep their relative order and
/// are not deduplicated.
pub fn normalize(metrics: Vec<Metric>, mut records: Vec<TimeSeriesRecord>) -> WeatherSeries {
    records.sort_by_key(|record| record.date);

    let duplicates = records
        .windows(2)
        .filter(|pair| pair[0].date == pair[1].date)
        .count();
    if duplicates > 0 {
        warn!("Series contains {} duplicated date(s)", duplicates);
    }

    WeatherSeries::from_sorted(metrics, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::time_series::MetricReading;
    use chrono::NaiveDate;

    fn record(date: &str, value: f64) -> TimeSeriesRecord {
        TimeSeriesRecord::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            vec![MetricReading {
                metric: Metric::Humidity,
                value,
                five_year_avg: 60.0,
            }],
        )
    }

    #[test]
    fn test_two_records_reordered() {
        let series = normalize(
            vec![Metric::Humidity],
            vec![record("2024-01-02", 1.0), record("2024-01-01", 2.0)],
        );
        let dates: Vec<String> = series
            .records()
            .iter()
            .map(|r| r.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(series.latest().unwrap().value(Metric::Humidity), Some(1.0));
    }

    #[test]
    fn test_dates_non_decreasing_and_ties_stable() {
        let input = vec![
            record("2024-03-05", 1.0),
            record("2024-03-01", 2.0),
            record("2024-03-05", 3.0),
            record("2023-12-31", 4.0),
            record("2024-03-01", 5.0),
        ];
        let series = normalize(vec![Metric::Humidity], input);

        assert!(series
            .records()
            .windows(2)
            .all(|pair| pair[0].date <= pair[1].date));
        let values: Vec<f64> = series
            .records()
            .iter()
            .filter_map(|r| r.value(Metric::Humidity))
            .collect();
        assert_eq!(values, vec![4.0, 2.0, 5.0, 1.0, 3.0]);
        assert_eq!(series.len(), 5);
    }
}
