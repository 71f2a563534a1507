//! Widget configuration: the validated draft coming from the configuration
//! form and the immutable [`WidgetConfig`] a widget is bound to.

use crate::types::metric::Metric;
use crate::types::period::{DatePeriod, DateRange, InvalidRangeError, PeriodSelection};
use crate::types::region::Region;
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

const EXPORT_PREFIX: &str = "제주날씨";
const REPORT_PREFIX: &str = "제주날씨_리포트";

/// Opaque widget identity, stable for the widget's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) u64);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget-{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("At least one metric must be selected")]
    NoMetrics,

    #[error("Metric '{0}' was selected more than once")]
    DuplicateMetric(Metric),

    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
}

/// The kind of artifact a widget can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Pdf,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Csv => "csv",
            ExportKind::Pdf => "pdf",
        }
    }
}

/// Checks that `metrics` is non-empty and holds no metric twice.
pub fn validate_metrics(metrics: &[Metric]) -> Result<(), ConfigError> {
    if metrics.is_empty() {
        return Err(ConfigError::NoMetrics);
    }
    for (i, metric) in metrics.iter().enumerate() {
        if metrics[..i].contains(metric) {
            return Err(ConfigError::DuplicateMetric(*metric));
        }
    }
    Ok(())
}

/// A validated selection from the configuration form, not yet bound to a widget.
///
/// Construction rejects an empty or repeated metric list and an explicit
/// range whose start is after its end, so an invalid selection never reaches
/// a [`WidgetConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDraft {
    region: Region,
    metrics: Vec<Metric>,
    period: PeriodSelection,
}

impl WidgetDraft {
    pub fn new(
        region: Region,
        metrics: Vec<Metric>,
        period: PeriodSelection,
    ) -> Result<Self, ConfigError> {
        validate_metrics(&metrics)?;
        if let PeriodSelection::Explicit { start, end } = period {
            DateRange::new(start, end)?;
        }
        Ok(Self {
            region,
            metrics,
            period,
        })
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn period(&self) -> PeriodSelection {
        self.period
    }

    /// Resolves the period against `today` and binds the draft to `id`.
    pub(crate) fn into_config(
        self,
        id: WidgetId,
        today: NaiveDate,
    ) -> Result<WidgetConfig, InvalidRangeError> {
        let resolved = self.period.resolve(today)?;
        Ok(WidgetConfig {
            id,
            region: self.region,
            metrics: self.metrics,
            range: resolved.range,
            period_label: resolved.label,
        })
    }
}

/// The immutable configuration a widget fetches for.
///
/// A changed selection produces a new `WidgetConfig` (keeping the widget's id)
/// rather than mutating the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub id: WidgetId,
    pub region: Region,
    pub metrics: Vec<Metric>,
    pub range: DateRange,
    pub period_label: String,
}

impl WidgetConfig {
    pub fn start_date(&self) -> NaiveDate {
        self.range.start()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.range.end()
    }

    /// Short metric list for the widget header: at most two names, then `...`.
    pub fn metrics_summary(&self) -> String {
        let names: Vec<&str> = self.metrics.iter().map(Metric::name).collect();
        if names.len() > 2 {
            format!("{}...", names[..2].join(", "))
        } else {
            names.join(", ")
        }
    }

    /// File name (without directory) used when exporting this widget.
    pub fn export_file_name(&self, kind: ExportKind) -> String {
        let prefix = match kind {
            ExportKind::Csv => EXPORT_PREFIX,
            ExportKind::Pdf => REPORT_PREFIX,
        };
        let label = self.period_label.replace(' ', "_").replace('~', "to");
        format!("{}_{}_{}.{}", prefix, self.region, label, kind.extension())
    }
}
