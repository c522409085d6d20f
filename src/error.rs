// src/error.rs
// =============================================================================
// Typed failures for the two places where the tool talks to the outside
// world: fetching pages and asking a subdomain source for names.
//
// Neither error ever ends the run. A FetchError means "page unavailable" and
// is swallowed by the page analyzer; a ResolveError means "this source found
// nothing" and the resolver moves on to the next source.
// =============================================================================

use thiserror::Error;

/// Why a page could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered, but not with a 2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request never completed
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Connection refused, DNS failure, TLS failure, body decode error...
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    // Sorts a reqwest error into our taxonomy
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout { url: url.to_string() }
        } else if let Some(status) = error.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: error,
            }
        }
    }

    // Whether a retry could plausibly succeed
    pub fn is_retryable(&self, retryable_status_codes: &[u16]) -> bool {
        match self {
            FetchError::Status { status, .. } => retryable_status_codes.contains(status),
            FetchError::Timeout { .. } => true,
            FetchError::Transport { .. } => false,
        }
    }
}

/// Why a subdomain source produced nothing
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{source_name}: request failed: {message}")]
    Request { source_name: String, message: String },

    #[error("{source_name}: response could not be parsed even after repair: {source}")]
    Malformed {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{source_name}: could not run '{program}': {source}")]
    Spawn {
        source_name: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}: could not read {path}: {source}")]
    Io {
        source_name: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid root domain '{0}'")]
    InvalidRoot(String),
}
