use crate::export::error::ExportError;
use crate::service::error::DataFetchError;
use crate::types::period::InvalidRangeError;
use crate::types::widget_config::{ConfigError, WidgetId};
use thiserror::Error;
use tokio::runtime::TryCurrentError;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),

    #[error(transparent)]
    DataFetch(#[from] DataFetchError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("No widget with id {0}")]
    WidgetNotFound(WidgetId),

    #[error("Dashboard must be created inside a tokio runtime")]
    NoRuntime(#[from] TryCurrentError),
}
