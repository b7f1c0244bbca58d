//! Error taxonomy for remote Graph API calls

use super::constants::{AUTH_ERROR_CODES, RATE_LIMIT_ERROR_CODES};
use serde_json::Value;
use std::fmt;

/// Classified failure of a single remote call.
///
/// Only `RateLimited` is transient; the retry policy re-attempts those and
/// surfaces `MaxRetriesExceeded` once attempts are exhausted. Everything else
/// propagates to the caller immediately.
#[derive(Debug, Clone)]
pub enum RemoteError {
    /// Platform throttled the request (error code in the rate-limit set, or HTTP 429)
    RateLimited { code: i64, message: String },
    /// Invalid or expired access token; fatal for the whole account attempt
    Auth { code: i64, message: String },
    /// The platform rejected a read/create (bad field, permission, invalid reference)
    Object {
        code: i64,
        status: Option<u16>,
        message: String,
    },
    /// Transport-level failure (connection, DNS, timeout)
    Network(String),
    /// A rate-limited call did not succeed within the attempt budget
    MaxRetriesExceeded { attempts: u32, last: String },
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::RateLimited { code, message } => {
                write!(f, "rate limited (code {}): {}", code, message)
            }
            RemoteError::Auth { code, message } => {
                write!(f, "authentication failed (code {}): {}", code, message)
            }
            RemoteError::Object {
                code,
                status,
                message,
            } => match status {
                Some(s) => write!(f, "remote object error (code {}, http {}): {}", code, s, message),
                None => write!(f, "remote object error (code {}): {}", code, message),
            },
            RemoteError::Network(message) => write!(f, "network error: {}", message),
            RemoteError::MaxRetriesExceeded { attempts, last } => {
                write!(f, "exhausted {} attempts, last error: {}", attempts, last)
            }
        }
    }
}

impl std::error::Error for RemoteError {}

impl RemoteError {
    /// Whether the retry policy should re-attempt this error
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RemoteError::RateLimited { .. })
    }

    /// Whether this error is fatal for the whole destination-account attempt
    pub fn is_auth(&self) -> bool {
        matches!(self, RemoteError::Auth { .. })
    }

    /// Classify a Graph `{error: {code, message}}` payload returned with a
    /// non-success HTTP status.
    pub fn from_graph_payload(status: u16, body: &Value) -> Self {
        let error = &body["error"];
        let code = error["code"].as_i64().unwrap_or(0);
        let message = error["message"]
            .as_str()
            .unwrap_or("unknown platform error")
            .to_string();

        if status == 429 || RATE_LIMIT_ERROR_CODES.contains(&code) {
            RemoteError::RateLimited { code, message }
        } else if AUTH_ERROR_CODES.contains(&code) {
            RemoteError::Auth { code, message }
        } else {
            RemoteError::Object {
                code,
                status: Some(status),
                message,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rate_limit_codes_classify_as_transient() {
        for code in [4, 17, 32, 613, 80004] {
            let body = json!({"error": {"code": code, "message": "too many calls"}});
            let err = RemoteError::from_graph_payload(400, &body);
            assert!(err.is_rate_limited(), "code {} should be rate-limited", code);
        }
    }

    #[test]
    fn test_http_429_is_rate_limited_regardless_of_code() {
        let body = json!({"error": {"code": 1, "message": "slow down"}});
        assert!(RemoteError::from_graph_payload(429, &body).is_rate_limited());
    }

    #[test]
    fn test_auth_codes_are_not_retried() {
        let body = json!({"error": {"code": 190, "message": "token expired"}});
        let err = RemoteError::from_graph_payload(401, &body);
        assert!(err.is_auth());
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_other_codes_are_object_errors() {
        let body = json!({"error": {"code": 100, "message": "invalid parameter"}});
        let err = RemoteError::from_graph_payload(400, &body);
        assert!(matches!(err, RemoteError::Object { code: 100, .. }));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_missing_error_body_defaults() {
        let err = RemoteError::from_graph_payload(500, &json!({}));
        match err {
            RemoteError::Object { code, status, .. } => {
                assert_eq!(code, 0);
                assert_eq!(status, Some(500));
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }
}
