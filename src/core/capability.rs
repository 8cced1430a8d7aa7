use std::fmt;

use crate::core::error::RenderError;
use crate::core::request::RenderRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendId {
    LocalEncoder,
    QrServer,
    QuickChart,
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendId::LocalEncoder => "local-encoder",
            BackendId::QrServer => "qrserver",
            BackendId::QuickChart => "quickchart",
        };
        f.write_str(name)
    }
}

/// What one backend can do. Defined once at startup, read-only afterwards.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    pub id: BackendId,
    pub supports_caption: bool,
    pub supported_formats: &'static [&'static str],
}

impl BackendDescriptor {
    pub fn supports_format(&self, format: &str) -> bool {
        self.supported_formats.contains(&format)
    }
}

/// Ordered capability table. Entry order is preference order: the local
/// encoder is registered first so that, when eligible, it wins over the
/// remotes; caption requests filter down to the caption-capable remotes.
#[derive(Debug, Clone)]
pub struct CapabilityMatrix {
    entries: Vec<BackendDescriptor>,
}

impl CapabilityMatrix {
    pub fn new(entries: Vec<BackendDescriptor>) -> Self {
        Self { entries }
    }

    pub fn descriptors(&self) -> &[BackendDescriptor] {
        &self.entries
    }

    /// Ordered candidate list for a request, most-preferred first.
    ///
    /// Eligibility is two-axis: a caption restricts to caption-capable
    /// backends, and the format must be in the backend's supported set.
    /// An empty result fails fast with `UnsupportedFormat` so no backend
    /// is ever attempted for a request it has no chance of satisfying.
    pub fn candidates(&self, req: &RenderRequest) -> Result<Vec<BackendId>, RenderError> {
        let want_caption = req.caption.is_some();
        let eligible: Vec<BackendId> = self
            .entries
            .iter()
            .filter(|d| d.supports_format(&req.format))
            .filter(|d| !want_caption || d.supports_caption)
            .map(|d| d.id)
            .collect();

        if eligible.is_empty() {
            return Err(RenderError::UnsupportedFormat {
                format: req.format.clone(),
            });
        }
        Ok(eligible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::request::{RawParams, RenderDefaults, normalize};

    fn matrix() -> CapabilityMatrix {
        CapabilityMatrix::new(vec![
            BackendDescriptor {
                id: BackendId::LocalEncoder,
                supports_caption: false,
                supported_formats: &["png", "svg"],
            },
            BackendDescriptor {
                id: BackendId::QrServer,
                supports_caption: false,
                supported_formats: &["png", "jpg", "jpeg", "gif", "svg"],
            },
            BackendDescriptor {
                id: BackendId::QuickChart,
                supports_caption: true,
                supported_formats: &["png", "svg"],
            },
        ])
    }

    fn request(format: &str, label: Option<&str>) -> RenderRequest {
        let raw = RawParams {
            data: Some("hello".to_string()),
            format: Some(format.to_string()),
            label: label.map(str::to_string),
            ..RawParams::default()
        };
        normalize(&raw, &RenderDefaults::default()).unwrap()
    }

    #[test]
    fn local_encoder_is_preferred_for_png_without_caption() {
        let order = matrix().candidates(&request("png", None)).unwrap();
        assert_eq!(
            order,
            vec![BackendId::LocalEncoder, BackendId::QrServer, BackendId::QuickChart]
        );
    }

    #[test]
    fn jpg_is_remote_only() {
        let order = matrix().candidates(&request("jpg", None)).unwrap();
        assert_eq!(order, vec![BackendId::QrServer]);
    }

    #[test]
    fn gif_is_remote_only() {
        let order = matrix().candidates(&request("gif", None)).unwrap();
        assert_eq!(order, vec![BackendId::QrServer]);
    }

    #[test]
    fn caption_restricts_to_caption_capable_backends() {
        let order = matrix().candidates(&request("png", Some("Scan Me"))).unwrap();
        assert_eq!(order, vec![BackendId::QuickChart]);
    }

    #[test]
    fn caption_with_remote_only_format_has_no_candidates() {
        let err = matrix().candidates(&request("gif", Some("Scan Me"))).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat { .. }));
    }

    #[test]
    fn unknown_format_fails_fast() {
        let err = matrix().candidates(&request("bmp", None)).unwrap_err();
        match err {
            RenderError::UnsupportedFormat { format } => assert_eq!(format, "bmp"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
