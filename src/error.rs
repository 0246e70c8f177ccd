/// All errors that can occur while loading statistics.
#[derive(thiserror::Error, Debug)]
pub enum PlStatsError {
    /// HTTP request failed before a response arrived (connection refused, DNS, TLS, etc.).
    #[error("network error while fetching {url}: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("HTTP {status} @ {url} - {body}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Failed to read the response body.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    /// A requested identity could not be resolved to any record.
    #[error("not found: {context}")]
    NotFound { context: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The load was cancelled before it completed.
    #[error("cancelled")]
    Cancelled,
}

impl PlStatsError {
    pub(crate) fn not_found(context: impl Into<String>) -> Self {
        PlStatsError::NotFound {
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlStatsError>;
