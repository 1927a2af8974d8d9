use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Data load failed: {0}")]
    DataLoad(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
