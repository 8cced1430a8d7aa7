use poem_openapi::ApiResponse;
use poem_openapi::payload::{Binary, PlainText};

use crate::core::dispatcher::Rendered;
use crate::core::error::RenderError;

pub const CACHE_CONTROL: &str = "public, max-age=3600";

const USAGE: &str =
    "Provide the content to encode via ?data= or ?url=, e.g. /qrcode?data=https://example.com";

#[derive(ApiResponse)]
pub enum QrcodeResponse {
    /// PNG image
    #[oai(status = 200, content_type = "image/png")]
    Png(Binary<Vec<u8>>, #[oai(header = "Cache-Control")] String),

    /// JPEG image
    #[oai(status = 200, content_type = "image/jpeg")]
    Jpeg(Binary<Vec<u8>>, #[oai(header = "Cache-Control")] String),

    /// GIF image
    #[oai(status = 200, content_type = "image/gif")]
    Gif(Binary<Vec<u8>>, #[oai(header = "Cache-Control")] String),

    /// SVG image
    #[oai(status = 200, content_type = "image/svg+xml")]
    Svg(Binary<Vec<u8>>, #[oai(header = "Cache-Control")] String),

    /// Missing or unusable required parameter
    #[oai(status = 400)]
    BadRequest(PlainText<String>),

    /// No capable backend, or every backend failed
    #[oai(status = 500)]
    InternalServerError(PlainText<String>),
}

impl QrcodeResponse {
    pub fn image(rendered: Rendered) -> Self {
        let cache = CACHE_CONTROL.to_string();
        match rendered.content_type.as_str() {
            "image/jpeg" => QrcodeResponse::Jpeg(Binary(rendered.bytes), cache),
            "image/gif" => QrcodeResponse::Gif(Binary(rendered.bytes), cache),
            "image/svg+xml" => QrcodeResponse::Svg(Binary(rendered.bytes), cache),
            _ => QrcodeResponse::Png(Binary(rendered.bytes), cache),
        }
    }

    pub fn error(err: RenderError) -> Self {
        match err {
            RenderError::InvalidRequest { .. } => QrcodeResponse::BadRequest(PlainText(
                format!("{err}. {USAGE}"),
            )),
            RenderError::UnsupportedFormat { .. } | RenderError::RenderFailed { .. } => {
                QrcodeResponse::InternalServerError(PlainText(format!("QR code generation failed: {err}")))
            }
        }
    }
}
