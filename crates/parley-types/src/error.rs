use std::time::Duration;

use thiserror::Error;

/// Errors from publishing or talking to the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection or bus is gone.
    #[error("transport closed")]
    Closed,

    #[error("connect failed: {0}")]
    Connect(String),

    /// No server answered within the discovery window.
    #[error("no chat server discovered at {url} within {timeout:?}")]
    Discovery { url: String, timeout: Duration },

    #[error("frame encoding failed: {0}")]
    Encode(String),

    #[error("send failed: {0}")]
    Send(String),
}

/// Errors raised by a channel side-effect handler.
#[derive(Debug, Error)]
pub enum EffectError {
    /// The downstream collaborator could not be reached or built.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered with an error.
    #[error("backend error: {0}")]
    Backend(String),

    /// The body could not be interpreted for this channel.
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("handler timed out after {0:?}")]
    TimedOut(Duration),
}

/// Errors surfaced by the message router to its caller.
#[derive(Debug, Error)]
pub enum RouteError {
    /// One or more recipients could not be published to. Every recipient was
    /// still attempted.
    #[error("delivery failed for {} recipient(s): {}", failed.len(), failed.join(", "))]
    Delivery { failed: Vec<String>, published: usize },
}

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(String),

    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_error_display_lists_recipients() {
        let err = RouteError::Delivery {
            failed: vec!["general".to_string(), "@bob".to_string()],
            published: 1,
        };
        assert_eq!(
            err.to_string(),
            "delivery failed for 2 recipient(s): general, @bob"
        );
    }

    #[test]
    fn test_discovery_error_display() {
        let err = TransportError::Discovery {
            url: "ws://127.0.0.1:7878/ws".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("ws://127.0.0.1:7878/ws"));
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_effect_error_display() {
        let err = EffectError::Unavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "collaborator unavailable: connection refused");
    }
}
