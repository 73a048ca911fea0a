use serde::{Deserialize, Serialize};

use crate::core::{
    color_map::{default_color_stops, ColorStop, Palette},
    image_utils::{
        create_buffer, generate_image_in_place, generate_image_in_place_with_threads,
        PixelBuffer, RenderError, RowProgressFn, ViewportSpec,
    },
};

/// Squared magnitude past which a sequence is considered to have escaped.
pub const ESCAPE_NORM_SQUARED: f64 = 4.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ColorMapParams {
    /// Requested palette density. The palette never has fewer entries than
    /// the iteration bound.
    pub color_step: f64,
    pub stops: Vec<ColorStop>,
}

impl Default for ColorMapParams {
    fn default() -> Self {
        ColorMapParams {
            color_step: 6000.0,
            stops: default_color_stops(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MandelbrotParams {
    pub image_specification: ViewportSpec,
    pub color_map: ColorMapParams,
    pub file_name: String,
    /// Worker threads for the render; `None` uses the global rayon pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_count: Option<usize>,
}

impl Default for MandelbrotParams {
    fn default() -> Self {
        MandelbrotParams {
            image_specification: ViewportSpec::default(),
            color_map: ColorMapParams::default(),
            file_name: "mandelbrot.png".to_owned(),
            thread_count: None,
        }
    }
}

impl MandelbrotParams {
    pub fn palette_target_count(&self) -> f64 {
        self.color_map
            .color_step
            .max(self.image_specification.max_iteration as f64)
    }

    pub fn palette(&self) -> Palette {
        Palette::new(&self.color_map.stops, self.palette_target_count())
    }
}

/// Result of iterating a single point of the Mandelbrot sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleResult {
    pub exit_norm_squared: f64,
    pub iteration_count: u32,
}

impl SampleResult {
    /**
     * Continuous escape value, `(max_iteration - iteration_count) + ln(norm)`,
     * which removes the banding of the raw integer count. Not guarded against
     * `ln(0)`; such values simply fall outside of the palette.
     */
    pub fn smoothed(&self, max_iteration: u32) -> f64 {
        (max_iteration as f64 - self.iteration_count as f64) + self.exit_norm_squared.ln()
    }
}

/**
 * Iterates `Z := Z*Z + C` from `Z = 0`, where `C = cx + i*cy`.
 *
 * @return: if the sequence escapes, the squared magnitude of the first escaped value
 * and the number of steps completed before it. Otherwise half of the final squared
 * magnitude and `max_iteration`.
 */
pub fn sample_escape_time(cx: f64, cy: f64, max_iteration: u32) -> SampleResult {
    let mut x = 0.0;
    let mut y = 0.0;
    for iteration_count in 0..max_iteration {
        let xy = x * y;
        x = x * x - y * y + cx;
        y = 2.0 * xy + cy;
        let norm_squared = x * x + y * y;
        if norm_squared > ESCAPE_NORM_SQUARED {
            return SampleResult {
                exit_norm_squared: norm_squared,
                iteration_count,
            };
        }
    }
    SampleResult {
        exit_norm_squared: (x * x + y * y) / 2.0,
        iteration_count: max_iteration,
    }
}

pub fn smoothed_escape_value(cx: f64, cy: f64, max_iteration: u32) -> f64 {
    sample_escape_time(cx, cy, max_iteration).smoothed(max_iteration)
}

/**
 * Renders the Mandelbrot set into a new buffer, one row task per scanline.
 * An empty palette skips the render entirely: the zero-initialized buffer is
 * returned unchanged.
 */
pub fn render_mandelbrot(
    spec: &ViewportSpec,
    palette: &Palette,
    progress: Option<&RowProgressFn>,
) -> PixelBuffer {
    let mut buffer = create_buffer(spec);
    if palette.is_empty() {
        log::debug!("empty palette; skipping render");
        return buffer;
    }
    let max_iteration = spec.max_iteration;
    generate_image_in_place(
        spec,
        |cx, cy| palette.smoothed_color(smoothed_escape_value(cx, cy, max_iteration)),
        &mut buffer,
        progress,
    );
    buffer
}

/**
 * Same as `render_mandelbrot`, but on a dedicated pool of `thread_count` threads.
 */
pub fn render_mandelbrot_with_threads(
    spec: &ViewportSpec,
    palette: &Palette,
    progress: Option<&RowProgressFn>,
    thread_count: usize,
) -> Result<PixelBuffer, RenderError> {
    let mut buffer = create_buffer(spec);
    if palette.is_empty() {
        log::debug!("empty palette; skipping render");
        return Ok(buffer);
    }
    let max_iteration = spec.max_iteration;
    generate_image_in_place_with_threads(
        spec,
        |cx, cy| palette.smoothed_color(smoothed_escape_value(cx, cy, max_iteration)),
        &mut buffer,
        progress,
        thread_count,
    )?;
    Ok(buffer)
}

/// Renders with the thread configuration stored in the parameters.
pub fn render_from_params(
    params: &MandelbrotParams,
    palette: &Palette,
    progress: Option<&RowProgressFn>,
) -> Result<PixelBuffer, RenderError> {
    match params.thread_count {
        Some(thread_count) => render_mandelbrot_with_threads(
            &params.image_specification,
            palette,
            progress,
            thread_count,
        ),
        None => Ok(render_mandelbrot(
            &params.image_specification,
            palette,
            progress,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgba;

    #[test]
    fn test_origin_is_bounded() {
        for max_iteration in [1, 2, 10, 800] {
            let result = sample_escape_time(0.0, 0.0, max_iteration);
            assert_eq!(result.iteration_count, max_iteration);
            assert_eq!(result.exit_norm_squared, 0.0);
        }
    }

    #[test]
    fn test_immediate_escape() {
        let result = sample_escape_time(2.0, 2.0, 100);
        assert_eq!(result.iteration_count, 0);
        assert_eq!(result.exit_norm_squared, 8.0);
    }

    #[test]
    fn test_escape_after_a_few_steps() {
        // c = 1: 1, 2, 5 --> escapes on the third step
        let result = sample_escape_time(1.0, 0.0, 100);
        assert_eq!(result.iteration_count, 2);
        assert_eq!(result.exit_norm_squared, 25.0);
    }

    #[test]
    fn test_bounded_point_reports_half_norm() {
        // c = -1: 0 -> -1 -> 0 -> -1 ... never escapes
        let result = sample_escape_time(-1.0, 0.0, 3);
        assert_eq!(result.iteration_count, 3);
        assert_eq!(result.exit_norm_squared, 0.5);

        let result = sample_escape_time(-1.0, 0.0, 4);
        assert_eq!(result.exit_norm_squared, 0.0);
    }

    #[test]
    fn test_smoothed_value() {
        let result = SampleResult {
            exit_norm_squared: std::f64::consts::E,
            iteration_count: 7,
        };
        assert_relative_eq!(result.smoothed(10), 4.0, epsilon = 1e-12);
        assert_relative_eq!(smoothed_escape_value(2.0, 2.0, 5), 5.0 + 8f64.ln(), epsilon = 1e-12);
        assert_eq!(smoothed_escape_value(0.0, 0.0, 5), f64::NEG_INFINITY);
    }

    #[test]
    fn test_palette_target_count() {
        let mut params = MandelbrotParams::default();
        assert_eq!(params.palette_target_count(), 6000.0);
        params.color_map.color_step = 10.0;
        assert_eq!(params.palette_target_count(), 800.0);
        assert_eq!(params.palette().len(), 801);
    }

    #[test]
    fn test_empty_palette_skips_render() {
        let spec = ViewportSpec {
            width: 6,
            height: 5,
            max_iteration: 20,
            ..ViewportSpec::default()
        };
        let buffer = render_mandelbrot(&spec, &Palette::default(), None);
        assert_eq!(buffer, create_buffer(&spec));

        let buffer = render_mandelbrot_with_threads(&spec, &Palette::default(), None, 2).unwrap();
        assert_eq!(buffer, create_buffer(&spec));
    }

    #[test]
    fn test_render_single_pixel_by_hand() {
        // A 1x1 image samples the lower-left corner of the window.
        let spec = ViewportSpec {
            center_x: 3.0,
            center_y: 3.0,
            escape_radius: 2.0,
            width: 1,
            height: 1,
            max_iteration: 10,
        };
        let palette = Palette::new(&[ColorStop::auto([0x10, 0x20, 0x30, 0xff])], 40.0);

        // c = 2 + 2i --> smoothed = 10 + ln(8) = 12.08 --> entries 12 and 13, blend factor 12
        // Both entries are the same color, so the wrapped blend cancels out.
        let buffer = render_mandelbrot(&spec, &palette, None);
        assert_eq!(buffer.get_pixel(0, 0), &Rgba([0x10, 0x20, 0x30, 0xff]));
    }
}
