//! Error types for denom tracing and LCD queries

use thiserror::Error;

/// Failure of a single denom resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// No registered channel matches the hop. Stops a backward walk; never fatal.
    #[error("no counterparty registered for {port}/{channel} on chain {chain_id}")]
    MissingChainConfig {
        chain_id: String,
        port: String,
        channel: String,
    },

    #[error("malformed denom path {path:?} on chain {chain_id}: {reason}")]
    MalformedPath {
        path: String,
        chain_id: String,
        reason: String,
    },
}

impl TraceError {
    /// Chain the failing lookup was made on
    pub fn chain_id(&self) -> &str {
        match self {
            TraceError::MissingChainConfig { chain_id, .. }
            | TraceError::MalformedPath { chain_id, .. } => chain_id,
        }
    }

    /// Denom path, or the hop, that could not be traced
    pub fn path(&self) -> String {
        match self {
            TraceError::MissingChainConfig { port, channel, .. } => format!("{}/{}", port, channel),
            TraceError::MalformedPath { path, .. } => path.clone(),
        }
    }
}

/// Failure of an LCD query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LcdError {
    /// Connection refused, I/O timeout or bad scheme. The caller may retry.
    #[error("transient network fault: {0}")]
    TransientNetworkFault(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("lcd returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode lcd response: {0}")]
    Decode(String),
}

impl LcdError {
    /// Classify a raw error message
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if crate::lcd::is_connection_error(&message) {
            LcdError::TransientNetworkFault(message)
        } else {
            LcdError::Request(message)
        }
    }

    /// Classify a reqwest error. The full source chain is inspected since the
    /// connection cause is usually nested.
    pub fn from_request(err: &reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        if err.is_timeout() && !crate::lcd::is_connection_error(&message) {
            message.push_str(": i/o timeout");
        }
        Self::from_message(message)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, LcdError::TransientNetworkFault(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_message_classification() {
        assert!(LcdError::from_message("dial tcp 10.0.0.1:1317: connect: connection refused")
            .is_transient());
        assert!(LcdError::from_message("read tcp: i/o timeout").is_transient());
        assert!(LcdError::from_message("unsupported protocol scheme \"\"").is_transient());
        assert_eq!(
            LcdError::from_message("builder error"),
            LcdError::Request("builder error".to_string())
        );
    }

    #[test]
    fn test_status_error_is_not_transient() {
        let err = LcdError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "lcd returned 502: bad gateway");
    }

    #[test]
    fn test_trace_error_display() {
        let err = TraceError::MalformedPath {
            path: "transfer//uatom".to_string(),
            chain_id: "cosmoshub_4".to_string(),
            reason: "empty segment".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed denom path \"transfer//uatom\" on chain cosmoshub_4: empty segment"
        );
    }

    #[test]
    fn test_trace_error_names_failing_side() {
        let err = TraceError::MissingChainConfig {
            chain_id: "osmosis_1".to_string(),
            port: "transfer".to_string(),
            channel: "channel-0".to_string(),
        };
        assert_eq!(err.chain_id(), "osmosis_1");
        assert_eq!(err.path(), "transfer/channel-0");
    }
}
