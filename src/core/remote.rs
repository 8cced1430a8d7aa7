use async_trait::async_trait;
use url::Url;

use crate::core::backend::{Backend, RenderResult};
use crate::core::capability::{BackendDescriptor, BackendId};
use crate::core::error::BackendError;
use crate::core::request::{RenderRequest, content_type_for};

pub const QRSERVER_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const QUICKCHART_URL: &str = "https://quickchart.io/qr";

/// Primary remote provider (api.qrserver.com). Covers every output format,
/// including the raster formats the local encoder cannot produce. No caption
/// support.
pub struct QrServerBackend {
    client: reqwest::Client,
    base_url: String,
    descriptor: BackendDescriptor,
}

impl QrServerBackend {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url,
            descriptor: BackendDescriptor {
                id: BackendId::QrServer,
                supports_caption: false,
                supported_formats: &["png", "jpg", "jpeg", "gif", "svg"],
            },
        }
    }
}

#[async_trait]
impl Backend for QrServerBackend {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, req: &RenderRequest) -> Result<RenderResult, BackendError> {
        let mut url = parse_base(BackendId::QrServer, &self.base_url)?;
        url.query_pairs_mut()
            .append_pair("size", &format!("{0}x{0}", req.size_px))
            .append_pair("data", &req.content)
            .append_pair("color", &req.foreground_color)
            .append_pair("bgcolor", &req.background_color)
            .append_pair("margin", &req.margin_modules.to_string())
            .append_pair("ecc", &req.error_correction)
            .append_pair("format", &req.format);

        fetch(&self.client, BackendId::QrServer, url, &req.format).await
    }
}

/// Secondary remote provider (quickchart.io). The only backend that renders
/// a caption below the code.
pub struct QuickChartBackend {
    client: reqwest::Client,
    base_url: String,
    descriptor: BackendDescriptor,
}

impl QuickChartBackend {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url,
            descriptor: BackendDescriptor {
                id: BackendId::QuickChart,
                supports_caption: true,
                supported_formats: &["png", "svg"],
            },
        }
    }
}

#[async_trait]
impl Backend for QuickChartBackend {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, req: &RenderRequest) -> Result<RenderResult, BackendError> {
        let mut url = parse_base(BackendId::QuickChart, &self.base_url)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("text", &req.content)
                .append_pair("size", &req.size_px.to_string())
                .append_pair("dark", &req.foreground_color)
                .append_pair("light", &req.background_color)
                .append_pair("margin", &req.margin_modules.to_string())
                .append_pair("ecLevel", &req.error_correction)
                .append_pair("format", &req.format);
            if let Some(caption) = &req.caption {
                pairs.append_pair("caption", caption);
            }
        }

        fetch(&self.client, BackendId::QuickChart, url, &req.format).await
    }
}

fn parse_base(backend: BackendId, base_url: &str) -> Result<Url, BackendError> {
    Url::parse(base_url)
        .map_err(|e| BackendError::Encode(format!("bad base url for {backend}: {e}")))
}

/// Issues the provider GET and returns the body verbatim. The content type
/// comes from the requested format, never from the provider's response
/// headers, so behavior stays deterministic across providers.
async fn fetch(
    client: &reqwest::Client,
    backend: BackendId,
    url: Url,
    format: &str,
) -> Result<RenderResult, BackendError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| BackendError::Remote { backend, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::RemoteStatus { backend, status });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| BackendError::Remote { backend, source })?;

    Ok(RenderResult {
        bytes: bytes.to_vec(),
        content_type: content_type_for(format).to_string(),
    })
}
