mod error;
mod export;
mod query;
mod series;
mod service;
mod types;
mod utils;
mod widget;

pub use error::DashboardError;
pub use utils::{default_export_dir, ensure_dir_exists};

pub use types::metric::{Metric, UnknownMetric, FIVE_YEAR_AVG_LABEL, FIVE_YEAR_AVG_SUFFIX};
pub use types::period::{
    local_today, DatePeriod, DateRange, InvalidRangeError, NamedPeriod, PeriodSelection,
    ResolvedPeriod, UnknownPeriod,
};
pub use types::region::{Region, UnknownRegion};
pub use types::time_series::{Headline, MetricReading, TimeSeriesRecord, WeatherSeries};
pub use types::widget_config::{
    validate_metrics, ConfigError, ExportKind, WidgetConfig, WidgetDraft, WidgetId,
};

pub use query::builder::{build_query, StructuredQuery};
pub use query::schema::{Schema, SchemaType};

pub use service::config::{ServiceConfig, API_KEY_VARS, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use service::error::{DataFetchError, FETCH_FAILED_MESSAGE};
pub use service::gemini::GeminiClient;
pub use service::generator::ContentGenerator;
pub use service::weather_service::WeatherService;

pub use series::normalizer::normalize;

pub use export::csv::{display_header, export_csv, render_csv};
pub use export::error::{ExportError, PDF_FAILED_MESSAGE};
pub use export::pdf::{
    export_pdf, fit_image, render_pdf, render_report, PageSpec, Placement, A4_PORTRAIT,
    CAPTURE_SCALE,
};
pub use export::region::{BitmapRegion, RenderedRegion, Rgb, SvgRegion, REPORT_BACKGROUND};

pub use widget::controller::{FetchTicket, WidgetController};
pub use widget::dashboard::{Dashboard, FetchCompletion};
pub use widget::fetch_state::{FetchEvent, FetchState};
