use std::path::PathBuf;

/// Errors raised by the data source and the dashboard controller.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The fixture file could not be read
    #[error("failed to read fixture {path}: {source}")]
    FixtureIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fixture is not a JSON array of project records
    #[error("failed to parse project fixture: {0}")]
    FixtureParse(#[from] serde_json::Error),

    /// A view tried to select a project the store does not hold
    #[error("project {0} is not in the loaded data set")]
    UnknownProject(String),

    /// Configuration values that deserialize but make no sense
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
