use thiserror::Error;

/// Everything that can go wrong while driving the dashboard.
///
/// None of these are fatal: the triggering action is abandoned and the
/// message is shown in the status line.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("Please select a file to upload.")]
    NoFileSelected,

    #[error("Invalid number for '{column}': {raw}")]
    InvalidNumber { column: String, raw: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Network response was not ok (HTTP {0})")]
    HttpStatus(u16),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Error: {0}")]
    Application(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl DashError {
    /// Validation errors are caught before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DashError::NoFileSelected | DashError::InvalidNumber { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DashError>;
