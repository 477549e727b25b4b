use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a download attempt. None of these end the process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Empty, placeholder or unrecognised URL, or no download folder
    #[error("{0}")]
    InputValidation(String),

    #[error("Cannot create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// yt-dlp reported a failure (unsupported site, network, extraction)
    #[error("Download failed: {0}")]
    DownloadLibrary(String),

    #[error("An error occurred: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Heading for the modal notification
    pub fn title(&self) -> &'static str {
        match self {
            AppError::DownloadLibrary(_) => "Download Error",
            _ => "Error",
        }
    }
}
