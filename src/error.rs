use thiserror::Error;

/// Errors raised while loading snapshots, exporting reports or configuring the server.
///
/// The aggregation functions themselves never fail: an empty input yields an
/// empty output and a zero denominator yields an undefined rate.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Reading or writing a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not valid JSON or does not match the expected layout.
    #[error("snapshot parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid runtime configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A report could not be rendered.
    #[error("export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
