use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{OpenApi, Tags, param::Query, payload::Json};

use crate::{
    AppState,
    core::request::{RawParams, normalize},
    schemas::qrcode::QrcodeResponse,
};

#[derive(Tags)]
enum ApiQrcodeTags {
    Qrcode,
}

pub struct ApiQrcode;

#[OpenApi()]
impl ApiQrcode {
    /// Generate QR code
    ///
    /// Renders the given content as a QR code image. The content is taken
    /// from `data` or `url`, whichever is non-empty first. Unusable numeric
    /// parameters fall back to their defaults instead of failing.
    #[oai(path = "/qrcode", method = "get", tag = "ApiQrcodeTags::Qrcode")]
    #[allow(clippy::too_many_arguments)]
    async fn qrcode(
        &self,
        state: Data<&Arc<AppState>>,
        /// Content to encode
        data: Query<Option<String>>,
        /// Alias for `data`
        url: Query<Option<String>>,
        /// Image size in pixels (default 300)
        size: Query<Option<String>>,
        /// Error correction level: L, M, Q or H (default M)
        ecc: Query<Option<String>>,
        /// Foreground color, 6 hex digits (default 000000)
        color: Query<Option<String>>,
        /// Background color, 6 hex digits (default ffffff)
        bgcolor: Query<Option<String>>,
        /// Quiet-zone margin in modules (default 1)
        margin: Query<Option<String>>,
        /// Output format: png, jpg, jpeg, gif or svg (default png)
        format: Query<Option<String>>,
        /// Optional caption rendered below the code
        label: Query<Option<String>>,
    ) -> QrcodeResponse {
        let raw = RawParams {
            data: data.0,
            url: url.0,
            size: size.0,
            ecc: ecc.0,
            color: color.0,
            bgcolor: bgcolor.0,
            margin: margin.0,
            format: format.0,
            label: label.0,
        };

        let req = match normalize(&raw, &state.defaults) {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!("rejected request: {}", e);
                return QrcodeResponse::error(e);
            }
        };

        tracing::info!(
            "rendering: size={} format={} caption={}",
            req.size_px,
            req.format,
            req.caption.is_some()
        );

        match state.dispatcher.render(&req).await {
            Ok(rendered) => {
                if rendered.degraded {
                    tracing::warn!("served degraded render (caption dropped)");
                }
                QrcodeResponse::image(rendered)
            }
            Err(e) => {
                tracing::error!("render error: {}", e);
                QrcodeResponse::error(e)
            }
        }
    }

    /// Health and registered backend capabilities
    #[oai(path = "/health", method = "get")]
    async fn health(&self, state: Data<&Arc<AppState>>) -> Json<serde_json::Value> {
        let backends: Vec<serde_json::Value> = state
            .dispatcher
            .matrix()
            .descriptors()
            .iter()
            .map(|d| {
                serde_json::json!({
                    "id": d.id.to_string(),
                    "supports_caption": d.supports_caption,
                    "formats": d.supported_formats,
                })
            })
            .collect();

        Json(serde_json::json!({
            "status": "healthy",
            "backends": backends,
        }))
    }
}
