use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Message attached to a widget when its PDF report could not be produced.
pub const PDF_FAILED_MESSAGE: &str = "PDF 생성에 실패했습니다.";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to build CSV document")]
    Csv(#[from] PolarsError),

    #[error("Failed to create export directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write export file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to rasterize region: {0}")]
    Rasterize(String),

    #[error("Rendered region is empty ({width}x{height})")]
    EmptyRegion { width: u32, height: u32 },

    #[error("Failed to assemble PDF document: {0}")]
    Document(String),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
