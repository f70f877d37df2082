use thiserror::Error;

/// Failure of a single contract read.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status code: {status}, response: {body}")]
    Status { status: u16, body: String },

    #[error("rpc error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("abi decode failed: {0}")]
    Decode(#[from] alloy_sol_types::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("value out of range: {0}")]
    Overflow(String),
}

impl ReadError {
    /// Transport failures, rate limits and server errors may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReadError::Http(_) => true,
            ReadError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// A synchronization pass that could not complete.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read task count: {0}")]
    Count(#[source] ReadError),

    #[error("failed to read task {index}: {source}")]
    Task {
        index: u64,
        #[source]
        source: ReadError,
    },
}

impl SyncError {
    /// Index of the task read that failed, `None` for the count read.
    pub fn index(&self) -> Option<u64> {
        match self {
            SyncError::Count(_) => None,
            SyncError::Task { index, .. } => Some(*index),
        }
    }

    pub fn read_error(&self) -> &ReadError {
        match self {
            SyncError::Count(source) | SyncError::Task { source, .. } => source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path} config file not found")]
    NotFound { path: String },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Project ID is not defined")]
    MissingProjectId,

    #[error("no network configured")]
    NoNetwork,

    #[error("invalid rpc url {url}: {source}")]
    InvalidRpcUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(ReadError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(ReadError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!ReadError::Status { status: 400, body: String::new() }.is_retryable());
        assert!(!ReadError::Rpc { code: 3, message: "execution reverted".into() }.is_retryable());
    }

    #[test]
    fn sync_error_names_the_failed_read() {
        let err = SyncError::Task {
            index: 7,
            source: ReadError::InvalidResponse("empty".into()),
        };
        assert_eq!(err.index(), Some(7));
        assert_eq!(err.to_string(), "failed to read task 7: invalid response: empty");

        let err = SyncError::Count(ReadError::InvalidResponse("empty".into()));
        assert_eq!(err.index(), None);
        assert_eq!(err.to_string(), "failed to read task count: invalid response: empty");
    }
}
