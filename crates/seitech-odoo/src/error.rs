use thiserror::Error;

/// Failures talking to the ERP.
///
/// Messages are kept as strings so a single failure can be handed to every
/// caller waiting on a batch flush.
#[derive(Debug, Clone, Error)]
pub enum OdooError {
    #[error("Odoo is unreachable: {0}")]
    Transport(String),

    #[error("Odoo request timed out")]
    Timeout,

    #[error("HTTP error: {status}")]
    Http { status: u16, body: String },

    /// Error object returned in a JSON-RPC response.
    #[error("{message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Odoo session expired")]
    SessionExpired,

    #[error("Unexpected Odoo response: {0}")]
    Decode(String),
}

impl OdooError {
    /// True when the ERP could not be reached at all; these trigger demo fallbacks.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            OdooError::Transport(_) | OdooError::Timeout | OdooError::Http { status: 502..=504, .. }
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            OdooError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OdooError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OdooError::Timeout
        } else if err.is_decode() {
            OdooError::Decode(err.to_string())
        } else {
            OdooError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for OdooError {
    fn from(err: serde_json::Error) -> Self {
        OdooError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unavailable() {
        assert!(OdooError::Transport("refused".into()).is_unavailable());
        assert!(OdooError::Timeout.is_unavailable());
        assert!(OdooError::Http { status: 502, body: String::new() }.is_unavailable());
        assert!(!OdooError::Http { status: 404, body: String::new() }.is_unavailable());
        assert!(!OdooError::InvalidCredentials.is_unavailable());
    }

    #[test]
    fn test_rpc_message_is_displayed_verbatim() {
        let err = OdooError::Rpc { code: 200, message: "Record does not exist".into() };
        assert_eq!(err.to_string(), "Record does not exist");
    }
}
