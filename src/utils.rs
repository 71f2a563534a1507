use crate::export::error::ExportError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

/// The directory exports are written to when the caller has no preference:
/// the user's download directory, or the working directory if there is none.
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

pub async fn ensure_dir_exists(path: &Path) -> Result<(), ExportError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(ExportError::DirCreation(
                    path.to_path_buf(),
                    io::Error::new(io::ErrorKind::AlreadyExists, "path exists but is not a directory"),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating export directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| ExportError::DirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(ExportError::DirCreation(path.to_path_buf(), e)),
    }
}
