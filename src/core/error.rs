use std::fmt::Write as _;
use std::time::Duration;

use thiserror::Error;

use crate::core::capability::BackendId;

/// Failure of a single backend attempt. Recovered by the dispatcher, which
/// advances to the next candidate; never surfaced to the caller directly.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend {backend} request failed: {source}")]
    Remote {
        backend: BackendId,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend {backend} returned status {status}")]
    RemoteStatus {
        backend: BackendId,
        status: reqwest::StatusCode,
    },

    #[error("backend {backend} timed out after {timeout:?}")]
    Timeout { backend: BackendId, timeout: Duration },

    #[error("encoding failed: {0}")]
    Encode(String),

    /// Invariant violation: a backend received a request the capability
    /// matrix should never have routed to it.
    #[error("backend {backend} cannot render a caption")]
    UnsupportedCapability { backend: BackendId },
}

/// Failure of a render call as a whole, mapped to an HTTP status at the
/// route boundary.
#[derive(Debug, Error)]
pub enum RenderError {
    /// 400
    #[error("missing required parameter: {field}")]
    InvalidRequest { field: &'static str },

    /// 500, raised before any backend is attempted.
    #[error("no backend supports format {format:?}")]
    UnsupportedFormat { format: String },

    /// 500, every eligible backend (including the captionless retry) failed.
    #[error("all backends failed: {}", summarize(.attempts))]
    RenderFailed { attempts: Vec<(BackendId, BackendError)> },
}

fn summarize(attempts: &[(BackendId, BackendError)]) -> String {
    let mut out = String::new();
    for (i, (backend, err)) in attempts.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = write!(out, "{backend}: {err}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failed_lists_every_attempt() {
        let err = RenderError::RenderFailed {
            attempts: vec![
                (
                    BackendId::QuickChart,
                    BackendError::Timeout {
                        backend: BackendId::QuickChart,
                        timeout: Duration::from_secs(10),
                    },
                ),
                (
                    BackendId::LocalEncoder,
                    BackendError::Encode("bad input".to_string()),
                ),
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("quickchart"), "{msg}");
        assert!(msg.contains("local-encoder"), "{msg}");
        assert!(msg.contains("bad input"), "{msg}");
    }
}
