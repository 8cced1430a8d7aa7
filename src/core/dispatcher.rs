use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::core::backend::{Backend, RenderResult};
use crate::core::capability::{BackendId, CapabilityMatrix};
use crate::core::error::{BackendError, RenderError};
use crate::core::request::RenderRequest;

/// A completed render plus whether it honored every requested feature.
#[derive(Debug)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// True when the caption was dropped to get a successful render.
    pub degraded: bool,
}

impl Rendered {
    fn from_result(result: RenderResult, degraded: bool) -> Self {
        Self {
            bytes: result.bytes,
            content_type: result.content_type,
            degraded,
        }
    }
}

/// Tries the capability matrix's candidates in order, one attempt per
/// backend, first success wins. Attempts are strictly sequential: a later
/// candidate is only reached once the earlier one has failed.
pub struct RenderDispatcher {
    backends: Vec<Arc<dyn Backend>>,
    matrix: CapabilityMatrix,
    attempt_timeout: Duration,
}

impl RenderDispatcher {
    /// Registration order is preference order; the matrix is derived from
    /// the backends' own descriptors.
    pub fn new(backends: Vec<Arc<dyn Backend>>, attempt_timeout: Duration) -> Self {
        let matrix =
            CapabilityMatrix::new(backends.iter().map(|b| b.descriptor().clone()).collect());
        Self {
            backends,
            matrix,
            attempt_timeout,
        }
    }

    pub fn matrix(&self) -> &CapabilityMatrix {
        &self.matrix
    }

    pub async fn render(&self, req: &RenderRequest) -> Result<Rendered, RenderError> {
        let candidates = self.matrix.candidates(req)?;
        let mut attempts = Vec::new();

        if let Some(result) = self.try_candidates(req, &candidates, &mut attempts).await {
            return Ok(Rendered::from_result(result, false));
        }

        // Every caption-capable backend failed. Dropping the caption is a
        // documented degradation: retry the format-eligible backends with a
        // captionless request rather than failing outright.
        if req.caption.is_some() {
            let stripped = req.without_caption();
            if let Ok(retry) = self.matrix.candidates(&stripped) {
                tracing::warn!(
                    "all caption-capable backends failed, retrying without caption: {:?}",
                    retry
                );
                if let Some(result) = self.try_candidates(&stripped, &retry, &mut attempts).await {
                    tracing::warn!("degraded render: caption dropped");
                    return Ok(Rendered::from_result(result, true));
                }
            }
        }

        tracing::error!("all backends exhausted after {} attempts", attempts.len());
        Err(RenderError::RenderFailed { attempts })
    }

    async fn try_candidates(
        &self,
        req: &RenderRequest,
        candidates: &[BackendId],
        attempts: &mut Vec<(BackendId, BackendError)>,
    ) -> Option<RenderResult> {
        for &id in candidates {
            let Some(backend) = self.backends.iter().find(|b| b.descriptor().id == id) else {
                continue;
            };

            match timeout(self.attempt_timeout, backend.attempt(req)).await {
                Ok(Ok(result)) => {
                    tracing::debug!("backend {} succeeded, {} bytes", id, result.bytes.len());
                    return Some(result);
                }
                Ok(Err(err)) => {
                    tracing::warn!("backend {} failed: {}", id, err);
                    attempts.push((id, err));
                }
                Err(_) => {
                    tracing::warn!("backend {} timed out", id);
                    attempts.push((
                        id,
                        BackendError::Timeout {
                            backend: id,
                            timeout: self.attempt_timeout,
                        },
                    ));
                }
            }
        }
        None
    }
}
