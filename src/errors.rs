// Error types shared across the crate
//
// Fetch failures are split by kind so callers can log them precisely, but the
// monitor treats every kind the same way: one "fetch failed" event, then the
// next tick retries.

/// Failure of a single node-list round trip.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered, but not with a success status.
    #[error("{url} responded with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The body was not a JSON array of node records.
    #[error("could not decode node list from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport { source, .. } if source.is_timeout())
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode { .. })
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    EmptyAddress { field: &'static str },

    #[error("{field} must be a host:port address, got {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },

    #[error("{field} must be at most {max}")]
    IntervalTooLarge { field: &'static str, max: u64 },
}
