use async_trait::async_trait;
use std::io;
use std::path::PathBuf;

/// Where an import document comes from. Selection is user-driven and may be cancelled.
#[async_trait]
pub trait ImportSource {
    /// Returns `Ok(None)` when the user cancelled the selection.
    async fn select_and_read(&self) -> io::Result<Option<String>>;
}

/// Reads the document from a chosen file; no path means the choice was cancelled.
pub struct FileImportSource {
    path: Option<PathBuf>,
}

impl FileImportSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ImportSource for FileImportSource {
    async fn select_and_read(&self) -> io::Result<Option<String>> {
        match &self.path {
            Some(path) => {
                tracing::info!("Importing from {}", path.display());
                tokio::fs::read_to_string(path).await.map(Some)
            }
            None => Ok(None),
        }
    }
}
