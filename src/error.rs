use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Malformed or missing field in customer data or query parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Campaign rejected by the registry before anything was stored.
    #[error("campaign validation failed: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for DashboardError {
    fn from(e: std::io::Error) -> Self {
        DashboardError::Storage(e.to_string())
    }
}

impl From<csv::Error> for DashboardError {
    fn from(e: csv::Error) -> Self {
        DashboardError::Storage(e.to_string())
    }
}

impl From<rusqlite::Error> for DashboardError {
    fn from(e: rusqlite::Error) -> Self {
        DashboardError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
