use thiserror::Error;

/// Main error type for the simulator
#[derive(Error, Debug)]
pub enum GavelError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    // Mechanism construction errors
    #[error("Invalid mechanism parameter: {param} = {value}")]
    InvalidMechanismParam { param: &'static str, value: f64 },

    // Decision service errors (surfaced only by `probe`; bidders recover locally)
    #[error("Decision query failed: {0}")]
    Query(#[from] QueryError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for GavelError
pub type Result<T> = std::result::Result<T, GavelError>;

/// Failure modes of the external decision service.
///
/// These never abort an auction: the owning bidder applies its documented
/// deterministic fallback and the mechanism proceeds.
#[derive(Error, Debug, Clone)]
pub enum QueryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("decision service returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed response body: {0}")]
    Malformed(String),

    #[error("unparseable decision payload: {payload:?}")]
    Unparseable { payload: String },
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        QueryError::Transport(err.to_string())
    }
}
