use super::code::BarcodeCode;
use super::code128;
use super::error::CodeError;

/// Raster layout for rendered barcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pixel width of one module.
    pub module_px: u32,
    /// Bar height in pixels.
    pub height_px: u32,
    /// Quiet zone on each side, in modules.
    pub quiet_modules: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_px: 2,
            height_px: 80,
            quiet_modules: 10,
        }
    }
}

const BAR: u8 = 0x00;
const SPACE: u8 = 0xFF;

/// Render a code as an 8-bit grayscale PNG.
///
/// Output is byte-stable: the encoder writes no time or text chunks, so the
/// same code and options always produce the same bytes.
pub fn render_png(code: &BarcodeCode, options: RenderOptions) -> Result<Vec<u8>, CodeError> {
    let modules = code128::encode_numeric(code.as_str())?;

    let quiet = options.quiet_modules as usize;
    let mut row = Vec::with_capacity((modules.len() + 2 * quiet) * options.module_px as usize);
    let quiet_run = std::iter::repeat_n(SPACE, quiet * options.module_px as usize);
    row.extend(quiet_run.clone());
    for bar in &modules {
        let px = if *bar { BAR } else { SPACE };
        row.extend(std::iter::repeat_n(px, options.module_px as usize));
    }
    row.extend(quiet_run);

    let width = u32::try_from(row.len())
        .map_err(|_| CodeError::Image("barcode too wide".into()))?;
    let pixels = row.repeat(options.height_px as usize);

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, options.height_px);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pixels)?;
        writer.finish()?;
    }
    Ok(out)
}

/// Read a PNG produced by [`render_png`] and decode the code it carries.
///
/// Scans the middle pixel row, thresholds it, and infers the module width
/// from the narrowest element.
pub fn scan_png(bytes: &[u8]) -> Result<BarcodeCode, CodeError> {
    let decoder = png::Decoder::new(bytes);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    if info.color_type != png::ColorType::Grayscale || info.bit_depth != png::BitDepth::Eight {
        return Err(CodeError::Image(format!(
            "expected 8-bit grayscale, got {:?}/{:?}",
            info.color_type, info.bit_depth
        )));
    }

    let middle = (info.height / 2) as usize;
    let row = &buf[middle * info.line_size..middle * info.line_size + info.width as usize];
    let dark: Vec<bool> = row.iter().map(|px| *px < 0x80).collect();

    let module_px = narrowest_run(&dark)
        .ok_or_else(|| CodeError::Symbol("no bars found".into()))?;

    let mut modules = Vec::with_capacity(dark.len() / module_px);
    let mut i = 0;
    while i < dark.len() {
        let value = dark[i];
        let mut run = 0;
        while i < dark.len() && dark[i] == value {
            run += 1;
            i += 1;
        }
        let count = (run + module_px / 2) / module_px;
        modules.extend(std::iter::repeat_n(value, count));
    }

    let digits = code128::decode_numeric(&modules)?;
    BarcodeCode::parse(&digits)
}

/// Width of the narrowest element between the first and last bar.
fn narrowest_run(dark: &[bool]) -> Option<usize> {
    let start = dark.iter().position(|d| *d)?;
    let end = dark.iter().rposition(|d| *d)?;
    let mut narrowest = usize::MAX;
    let mut run = 0;
    let mut current = dark[start];
    for d in &dark[start..=end] {
        if *d == current {
            run += 1;
        } else {
            narrowest = narrowest.min(run);
            current = *d;
            run = 1;
        }
    }
    Some(narrowest.min(run))
}
