use crate::error::CollaboratorError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use qrcode::{render::svg, EcLevel, QrCode};

/// Turns a URL into a scannable image, returned as a `data:` URL.
pub trait QrRenderer: Send + Sync {
    fn render(&self, url: &str) -> Result<String, CollaboratorError>;
}

/// Renders SVG, 300px minimum, black on white with a quiet zone.
#[derive(Clone, Copy, Debug)]
pub struct SvgQrRenderer {
    pub size: u32,
}

impl Default for SvgQrRenderer {
    fn default() -> Self {
        Self { size: 300 }
    }
}

impl QrRenderer for SvgQrRenderer {
    fn render(&self, url: &str) -> Result<String, CollaboratorError> {
        let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M)
            .map_err(|e| CollaboratorError::Render(e.to_string()))?;
        let image = code
            .render::<svg::Color<'_>>()
            .min_dimensions(self.size, self.size)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#FFFFFF"))
            .quiet_zone(true)
            .build();
        Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
    }
}
