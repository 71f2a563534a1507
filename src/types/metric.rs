//! Defines the measurable quantities a widget can display, together with the
//! lookup tables (unit, English prompt name, chart colour) attached to each.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Suffix appended to a metric key to form its 5-year historical average key.
pub const FIVE_YEAR_AVG_SUFFIX: &str = "_5yr_avg";

/// Human readable replacement for [`FIVE_YEAR_AVG_SUFFIX`] in headers and legends.
pub const FIVE_YEAR_AVG_LABEL: &str = " (5년 평균)";

/// A weather metric that can be requested for a region.
///
/// Every metric is reported twice per date: the observed value, keyed by
/// [`Metric::name`], and a 5-year historical average, keyed by
/// [`Metric::avg_key`].
///
/// # Examples
///
/// ```
/// use weather_dash::Metric;
///
/// let metric: Metric = "습도".parse().unwrap();
/// assert_eq!(metric, Metric::Humidity);
/// assert_eq!(metric.unit(), "%");
/// assert_eq!(metric.avg_key(), "습도_5yr_avg");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// 평균 기온, in °C.
    AverageTemperature,
    /// 습도, relative humidity in %.
    Humidity,
    /// 풍속, in m/s.
    WindSpeed,
    /// 강수량, in mm.
    Precipitation,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown metric '{0}'")]
pub struct UnknownMetric(pub String);

impl Metric {
    /// All metrics in the order they are offered to the user.
    pub const ALL: [Metric; 4] = [
        Metric::AverageTemperature,
        Metric::Humidity,
        Metric::WindSpeed,
        Metric::Precipitation,
    ];

    /// The display name, which doubles as the response field key.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::AverageTemperature => "평균 기온",
            Metric::Humidity => "습도",
            Metric::WindSpeed => "풍속",
            Metric::Precipitation => "강수량",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::AverageTemperature => "°C",
            Metric::Humidity => "%",
            Metric::WindSpeed => "m/s",
            Metric::Precipitation => "mm",
        }
    }

    /// The name used in prompt text sent to the data service.
    pub fn english_name(&self) -> &'static str {
        match self {
            Metric::AverageTemperature => "Average Temperature",
            Metric::Humidity => "Humidity",
            Metric::WindSpeed => "Wind Speed",
            Metric::Precipitation => "Precipitation",
        }
    }

    /// Line colour handed to the chart renderer.
    pub fn color(&self) -> &'static str {
        match self {
            Metric::AverageTemperature => "#38bdf8",
            Metric::Humidity => "#34d399",
            Metric::WindSpeed => "#facc15",
            Metric::Precipitation => "#a78bfa",
        }
    }

    /// Response key of the 5-year average for this metric.
    pub fn avg_key(&self) -> String {
        format!("{}{}", self.name(), FIVE_YEAR_AVG_SUFFIX)
    }

    /// Legend label of the 5-year average series.
    pub fn avg_label(&self) -> String {
        format!("{}{}", self.name(), FIVE_YEAR_AVG_LABEL)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.name() == s.trim())
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}
