use async_trait::async_trait;

use crate::core::capability::BackendDescriptor;
use crate::core::error::BackendError;
use crate::core::request::RenderRequest;

/// One fully rendered image. Ownership passes to the response writer.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// One concrete way to turn a [`RenderRequest`] into image bytes.
///
/// Adapters receive the request by shared reference and either return a
/// fresh [`RenderResult`] or a typed failure; they never hold state across
/// requests. Adding a provider means adding one implementation and letting
/// its descriptor feed the capability matrix — the dispatcher is untouched.
#[async_trait]
pub trait Backend: Send + Sync {
    fn descriptor(&self) -> &BackendDescriptor;

    async fn attempt(&self, req: &RenderRequest) -> Result<RenderResult, BackendError>;
}
