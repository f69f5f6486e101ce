use thiserror::Error;

/// Errors from the TMDB API client.
#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no TMDB API key configured")]
    MissingApiKey,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl TmdbError {
    /// Whether repeating the same request may succeed: connection problems,
    /// timeouts, rate limiting and server-side failures.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Parse(_) | Self::MissingApiKey | Self::InvalidBaseUrl(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        let api = |status| TmdbError::Api {
            status,
            message: String::new(),
        };
        assert!(api(429).is_transient());
        assert!(api(503).is_transient());
        assert!(!api(401).is_transient());
        assert!(!api(404).is_transient());
        assert!(!TmdbError::Parse("bad".into()).is_transient());
        assert!(!TmdbError::MissingApiKey.is_transient());
    }
}
