use crate::core::{
    color_map::Palette,
    file_io::{write_image, FilePrefix},
    image_utils::PixelBuffer,
};
use crate::fractals::mandelbrot::MandelbrotParams;

/// Height, in pixels, of a swatch image.
pub const SWATCH_HEIGHT: u32 = 64;

/**
 * One column per palette entry, `SWATCH_HEIGHT` rows tall. `None` for an empty palette.
 */
pub fn palette_swatch(palette: &Palette) -> Option<PixelBuffer> {
    if palette.is_empty() {
        return None;
    }
    let colors = palette.colors();
    Some(PixelBuffer::from_fn(
        colors.len() as u32,
        SWATCH_HEIGHT,
        |x, _| colors[x as usize],
    ))
}

/**
 * Writes `<prefix>_swatch.png`, a preview of the palette used by a render with
 * these parameters.
 */
pub fn generate_color_swatch(
    params: &MandelbrotParams,
    file_prefix: FilePrefix,
) -> Result<(), Box<dyn std::error::Error>> {
    let palette = params.palette();
    let swatch = match palette_swatch(&palette) {
        Some(swatch) => swatch,
        None => {
            log::warn!("The color stops produce an empty palette; no swatch written");
            return Ok(());
        }
    };
    log::info!("Color swatch with {} palette entries", palette.len());
    file_prefix.create_directory()?;
    write_image(&file_prefix.with_suffix("_swatch.png"), &swatch)?;
    Ok(())
}
