use serde_json::Value;

/// Coarse classification of a failed gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401/403: bad credentials or a rejected token.
    Unauthorized,
    /// 404.
    NotFound,
    /// 400/422: the backend refused the input.
    BadRequest,
    /// Any other non-success status.
    Server,
    /// Transport failure or an undecodable response body.
    Network,
}

/// Normalized gateway failure. The message is always fit for display.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Build an error from a non-success response. The display message is
    /// taken from the payload when it carries one.
    pub fn from_response(status: u16, body: &[u8], default_message: &str) -> Self {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| extract_message(&v))
            .unwrap_or_else(|| default_message.to_string());

        Self {
            kind: kind_for_status(status),
            message,
            status: Some(status),
        }
    }

    pub fn network(default_message: &str) -> Self {
        Self::new(ErrorKind::Network, default_message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}

fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::Unauthorized,
        404 => ErrorKind::NotFound,
        400 | 422 => ErrorKind::BadRequest,
        _ => ErrorKind::Server,
    }
}

/// Pull a display message out of an error payload.
///
/// Understands `{"detail": "..."}`, validation lists of the form
/// `{"detail": [{"msg": "..."}]}` and `{"message": "..."}`.
pub fn extract_message(payload: &Value) -> Option<String> {
    match payload.get("detail") {
        Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !msgs.is_empty() {
                return Some(msgs.join("; "));
            }
        }
        _ => {}
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}
