use crate::core::error::RenderError;

/// Process-wide default rendering parameters, constructed once at startup.
/// Kept in one place so defaults are testable independently of parsing.
#[derive(Debug, Clone)]
pub struct RenderDefaults {
    pub size_px: u32,
    pub error_correction: &'static str,
    pub foreground_color: &'static str,
    pub background_color: &'static str,
    pub margin_modules: u32,
    pub format: &'static str,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            size_px: 300,
            error_correction: "M",
            foreground_color: "000000",
            background_color: "ffffff",
            margin_modules: 1,
            format: "png",
        }
    }
}

/// Raw query parameters as they arrived, all optional. Leniency and defaults
/// are owned by [`normalize`], not by the HTTP layer.
#[derive(Debug, Default, Clone)]
pub struct RawParams {
    pub data: Option<String>,
    pub url: Option<String>,
    pub size: Option<String>,
    pub ecc: Option<String>,
    pub color: Option<String>,
    pub bgcolor: Option<String>,
    pub margin: Option<String>,
    pub format: Option<String>,
    pub label: Option<String>,
}

/// Canonical rendering request. Immutable once constructed; backends receive
/// it by shared reference and never mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub content: String,
    pub size_px: u32,
    /// Canonical upper-case. Unrecognized values pass through; the local
    /// encoder falls back to M and remotes forward them to the provider.
    pub error_correction: String,
    /// 6 hex digits expected, leading `#` already stripped. Not validated
    /// here; backends accept or reject.
    pub foreground_color: String,
    pub background_color: String,
    pub margin_modules: u32,
    /// Canonical lower-case. Unrecognized values are rejected by the
    /// capability matrix, not here.
    pub format: String,
    /// `None` means no caption requested.
    pub caption: Option<String>,
}

impl RenderRequest {
    /// Copy of this request with the caption cleared, for the dispatcher's
    /// degrade-caption-before-failing retry.
    pub fn without_caption(&self) -> Self {
        let mut req = self.clone();
        req.caption = None;
        req
    }
}

/// Validates raw parameters into a [`RenderRequest`].
///
/// Content is accepted under `data` or `url`, first non-empty wins. Numeric
/// fields parse leniently: unusable input falls back to the default rather
/// than failing the request.
pub fn normalize(raw: &RawParams, defaults: &RenderDefaults) -> Result<RenderRequest, RenderError> {
    let content = [&raw.data, &raw.url]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .ok_or(RenderError::InvalidRequest { field: "content" })?
        .to_string();

    let size_px = parse_lenient(&raw.size, defaults.size_px);
    let size_px = if size_px > 0 { size_px } else { defaults.size_px };
    let margin_modules = parse_lenient(&raw.margin, defaults.margin_modules);

    let error_correction = raw
        .ecc
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| defaults.error_correction.to_string());

    let format = raw
        .format
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| defaults.format.to_string());

    let caption = raw
        .label
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(RenderRequest {
        content,
        size_px,
        error_correction,
        foreground_color: strip_hash(raw.color.as_deref(), defaults.foreground_color),
        background_color: strip_hash(raw.bgcolor.as_deref(), defaults.background_color),
        margin_modules,
        format,
        caption,
    })
}

fn parse_lenient(value: &Option<String>, default: u32) -> u32 {
    value
        .as_deref()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

fn strip_hash(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(v) => v.strip_prefix('#').unwrap_or(v).to_string(),
        None => default.to_string(),
    }
}

/// Content type for a canonical format string. The response type is derived
/// from the request, never trusted from a remote provider's response.
pub fn content_type_for(format: &str) -> &'static str {
    match format {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "image/png",
    }
}
