//! Wire types for both proxy boundaries.

use serde::{Deserialize, Serialize};

/// Maximum inbound body size (16 MB)
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Inbound request body: where to forward, and what.
///
/// All three fields are required and strictly typed; unknown extra fields
/// are accepted and ignored. Only `message` travels upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardRequest {
    /// Target host to forward to
    pub server_ip: String,
    /// Target port to forward to
    pub server_port: u16,
    /// Opaque payload to relay
    pub message: String,
}

/// Outbound request body sent to the forwarding target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub message: String,
}

/// Error reply body for every failure path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forward_request() {
        let body = r#"{"server_ip":"127.0.0.1","server_port":9001,"message":"hi"}"#;
        let req: ForwardRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.server_ip, "127.0.0.1");
        assert_eq!(req.server_port, 9001);
        assert_eq!(req.message, "hi");
    }

    #[test]
    fn test_missing_fields_rejected() {
        for body in [
            r#"{"server_port":9001,"message":"hi"}"#,
            r#"{"server_ip":"127.0.0.1","message":"hi"}"#,
            r#"{"server_ip":"127.0.0.1","server_port":9001}"#,
        ] {
            assert!(serde_json::from_str::<ForwardRequest>(body).is_err());
        }
    }

    #[test]
    fn test_bad_port_rejected() {
        // String instead of integer
        let body = r#"{"server_ip":"127.0.0.1","server_port":"9001","message":"hi"}"#;
        assert!(serde_json::from_str::<ForwardRequest>(body).is_err());
        // Fractional
        let body = r#"{"server_ip":"127.0.0.1","server_port":9001.5,"message":"hi"}"#;
        assert!(serde_json::from_str::<ForwardRequest>(body).is_err());
        // Out of range for a port
        let body = r#"{"server_ip":"127.0.0.1","server_port":70000,"message":"hi"}"#;
        assert!(serde_json::from_str::<ForwardRequest>(body).is_err());
    }

    #[test]
    fn test_extra_fields_ignored() {
        let body = r#"{"server_ip":"h","server_port":1,"message":"m","ttl":5}"#;
        let req: ForwardRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.message, "m");
    }

    #[test]
    fn test_envelope_shape() {
        let env = Envelope { message: "hi".into() };
        assert_eq!(serde_json::to_string(&env).unwrap(), r#"{"message":"hi"}"#);
    }

    #[test]
    fn test_error_response_shape() {
        let body = serde_json::to_string(&ErrorResponse::new("boom")).unwrap();
        assert_eq!(body, r#"{"error":"boom"}"#);
    }
}
