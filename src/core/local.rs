use std::fmt::Write as _;

use async_trait::async_trait;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgb, RgbImage};
use qrcode::{Color, EcLevel, QrCode};

use crate::core::backend::{Backend, RenderResult};
use crate::core::capability::{BackendDescriptor, BackendId};
use crate::core::error::BackendError;
use crate::core::request::{RenderRequest, content_type_for};

/// In-process encoder backend. No network, no hidden randomness: identical
/// requests produce byte-identical output.
pub struct LocalEncoder {
    descriptor: BackendDescriptor,
}

impl LocalEncoder {
    pub fn new() -> Self {
        Self {
            descriptor: BackendDescriptor {
                id: BackendId::LocalEncoder,
                supports_caption: false,
                supported_formats: &["png", "svg"],
            },
        }
    }
}

impl Default for LocalEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for LocalEncoder {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    async fn attempt(&self, req: &RenderRequest) -> Result<RenderResult, BackendError> {
        // Unreachable past the capability matrix; checked anyway so a matrix
        // bug cannot silently drop a caption.
        if req.caption.is_some() {
            return Err(BackendError::UnsupportedCapability {
                backend: BackendId::LocalEncoder,
            });
        }

        let code = QrCode::with_error_correction_level(req.content.as_bytes(), ec_level(req))
            .map_err(|e| BackendError::Encode(e.to_string()))?;
        let total = total_modules(&code, req)?;

        let bytes = match req.format.as_str() {
            "svg" => render_svg(&code, req, total).into_bytes(),
            _ => render_png(&code, req, total)?,
        };

        Ok(RenderResult {
            bytes,
            content_type: content_type_for(&req.format).to_string(),
        })
    }
}

fn ec_level(req: &RenderRequest) -> EcLevel {
    match req.error_correction.as_str() {
        "L" => EcLevel::L,
        "Q" => EcLevel::Q,
        "H" => EcLevel::H,
        _ => EcLevel::M,
    }
}

fn parse_hex(color: &str) -> Result<[u8; 3], BackendError> {
    let parse = |range| {
        color
            .get(range)
            .and_then(|pair: &str| u8::from_str_radix(pair, 16).ok())
    };
    match (color.len(), parse(0..2), parse(2..4), parse(4..6)) {
        (6, Some(r), Some(g), Some(b)) => Ok([r, g, b]),
        _ => Err(BackendError::Encode(format!("invalid hex color {color:?}"))),
    }
}

/// Output dimension ceiling in pixels (and modules). Keeps the raster
/// allocation bounded whatever the request asks for.
const MAX_DIM: u32 = 10_000;

fn total_modules(code: &QrCode, req: &RenderRequest) -> Result<u32, BackendError> {
    let total = code.width() as u64 + 2 * req.margin_modules as u64;
    if total > MAX_DIM as u64 {
        return Err(BackendError::Encode(format!(
            "margin {} is too large",
            req.margin_modules
        )));
    }
    Ok(total as u32)
}

fn render_png(code: &QrCode, req: &RenderRequest, total: u32) -> Result<Vec<u8>, BackendError> {
    let fg = Rgb(parse_hex(&req.foreground_color)?);
    let bg = Rgb(parse_hex(&req.background_color)?);

    let modules = code.width() as u32;
    // Whole-module scaling: the nearest size at or below the request.
    let scale = (req.size_px / total).clamp(1, MAX_DIM / total);
    let dim = total * scale;

    let mut img = RgbImage::from_pixel(dim, dim, bg);
    for y in 0..modules {
        for x in 0..modules {
            if code[(x as usize, y as usize)] != Color::Dark {
                continue;
            }
            let px0 = (req.margin_modules + x) * scale;
            let py0 = (req.margin_modules + y) * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(px0 + dx, py0 + dy, fg);
                }
            }
        }
    }

    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), dim, dim, image::ExtendedColorType::Rgb8)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(out)
}

fn render_svg(code: &QrCode, req: &RenderRequest, total: u32) -> String {
    let modules = code.width() as u32;

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {1} {1}\" stroke=\"none\">\n",
        req.size_px, total
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"#{}\"/>\n",
        req.background_color
    );
    svg.push_str("<path d=\"");
    let mut first = true;
    for y in 0..modules {
        for x in 0..modules {
            if code[(x as usize, y as usize)] == Color::Dark {
                if !first {
                    svg.push(' ');
                }
                first = false;
                let _ = write!(
                    svg,
                    "M{},{}h1v1h-1z",
                    x + req.margin_modules,
                    y + req.margin_modules
                );
            }
        }
    }
    let _ = write!(svg, "\" fill=\"#{}\"/>\n</svg>\n", req.foreground_color);
    svg
}
