//! Error types for the stream catalog library.

/// Errors that can occur in the stream catalog library.
///
/// Variants map to specific failure modes across the stack:
///
/// - **Input**: [`Validation`](Self::Validation), rejected before any
///   network call is made.
/// - **Backend**: [`Transport`](Self::Transport),
///   [`Format`](Self::Format), [`Conflict`](Self::Conflict).
/// - **Selection**: [`OutOfRange`](Self::OutOfRange).
/// - **Configuration**: [`InvalidUrl`](Self::InvalidUrl).
///
/// None of these are fatal. Every failure leaves the catalog as it was.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// User input was empty or malformed.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Network failure or a non-2xx answer from the backend.
    ///
    /// `status` is `None` when no HTTP response was received at all.
    #[error("{}", transport_message(.status, .message))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// A backend response matched none of the known shapes.
    #[error("unexpected backend response: {0}")]
    Format(String),

    /// The backend reported the source as already active (HTTP 409).
    #[error("stream already active: {0}")]
    Conflict(String),

    /// Selection index outside `0..len`.
    #[error("selection {index} out of range (catalog has {len} streams)")]
    OutOfRange { index: usize, len: usize },

    /// The configured base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("backend returned {code}: {message}"),
        None => format!("backend unreachable: {message}"),
    }
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn transport(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: msg.into(),
        }
    }

    /// Whether the user should see this as "the backend failed".
    ///
    /// Format errors read like transport errors to the user even though
    /// they are logged under their own kind.
    pub fn is_transport_like(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Format(_))
    }

    /// Short machine-friendly label, used as the `kind` field in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Transport { .. } => "transport",
            Self::Format(_) => "format",
            Self::Conflict(_) => "conflict",
            Self::OutOfRange { .. } => "out_of_range",
            Self::InvalidUrl(_) => "config",
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Format(err.to_string());
        }
        let status = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        Self::Transport { status, message }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

/// Convenience alias for `Result<T, CatalogError>`.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_counts_as_transport_for_users() {
        assert!(CatalogError::format("bad").is_transport_like());
        assert!(CatalogError::transport(Some(500), "boom").is_transport_like());
        assert!(!CatalogError::validation("empty").is_transport_like());
        assert!(!CatalogError::Conflict("x".into()).is_transport_like());
    }

    #[test]
    fn kinds_are_distinct_for_format_and_transport() {
        assert_eq!(CatalogError::format("bad").kind(), "format");
        assert_eq!(CatalogError::transport(None, "down").kind(), "transport");
    }

    #[test]
    fn transport_display_includes_status() {
        let err = CatalogError::transport(Some(429), "rtsp://cam cannot be started");
        assert_eq!(
            err.to_string(),
            "backend returned 429: rtsp://cam cannot be started"
        );

        let err = CatalogError::transport(None, "connection refused");
        assert_eq!(err.to_string(), "backend unreachable: connection refused");
    }

    #[test]
    fn out_of_range_display() {
        let err = CatalogError::OutOfRange { index: 4, len: 2 };
        assert_eq!(
            err.to_string(),
            "selection 4 out of range (catalog has 2 streams)"
        );
    }
}
