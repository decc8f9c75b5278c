mod code;
mod error;
mod render;

pub mod code128;

pub use code::{BarcodeCode, CODE_LEN};
pub use error::CodeError;
pub use render::{RenderOptions, render_png, scan_png};

/// Generates candidate product codes and renders them into scannable images.
///
/// Stateless apart from the raster layout; safe to share between tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec {
    options: RenderOptions,
}

impl IdentityCodec {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Draw a candidate code. Uniqueness is the caller's concern.
    pub fn generate_code(&self) -> BarcodeCode {
        BarcodeCode::generate()
    }

    /// Render a code as PNG bytes. Pure and byte-stable.
    pub fn render_image(&self, code: &BarcodeCode) -> Result<Vec<u8>, CodeError> {
        render_png(code, self.options)
    }
}
