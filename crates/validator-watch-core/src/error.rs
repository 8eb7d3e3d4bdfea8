//! Error types for the monitoring core.

use thiserror::Error;

/// Failures fetching a commit from the local node API.
#[derive(Error, Debug)]
pub enum NodeError {
    /// Connection refused, DNS failure, timeout, etc.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Node API answered with something other than 200 OK.
    #[error("Local API is down! Code: {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Body was not a commit record.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Failures opening an incident with PagerDuty.
#[derive(Error, Debug)]
pub enum PagerError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("PagerDuty rejected incident ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Anything that aborts a health-check cycle. Counted as a flake.
///
/// The `Display` text doubles as the alert key, so it must be stable for
/// repeated occurrences of the same fault.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("Invalid signature timestamp {value:?}: {message}")]
    InvalidTimestamp { value: String, message: String },
}

/// Cap a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str, max_len: usize) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= max_len {
        trimmed.to_string()
    } else {
        let mut result: String = trimmed.chars().take(max_len).collect();
        result.push('…');
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("  short \n", 10), "short");
        assert_eq!(truncate_body("longer text here", 10), "longer tex…");
    }

    #[test]
    fn test_status_message() {
        let err = NodeError::Status { status: 500, body: "boom".to_string() };
        assert_eq!(err.to_string(), "Local API is down! Code: 500: boom");

        let eval: EvalError = err.into();
        assert_eq!(eval.to_string(), "Local API is down! Code: 500: boom");
    }
}
