use std::sync::atomic::{AtomicU32, Ordering};

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The raster produced by a render: `width x height` RGBA pixels, row major.
pub type PixelBuffer = RgbaImage;

/// Called after every completed row with `(rows_completed, total_rows)`.
pub type RowProgressFn<'a> = dyn Fn(u32, u32) + Sync + 'a;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unable to build a render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/**
 * Used to fully-specify both an image resolution and how it is anchored into the
 * complex plane. The height of the window is derived from the aspect ratio of the
 * image and the `escape_radius`, which spans the width of the window.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewportSpec {
    pub center_x: f64,
    pub center_y: f64,
    pub escape_radius: f64,
    pub width: u32,
    pub height: u32,
    pub max_iteration: u32,
}

impl Default for ViewportSpec {
    fn default() -> Self {
        ViewportSpec {
            center_x: -0.00275,
            center_y: 0.78912,
            escape_radius: 0.125689,
            width: 2048,
            height: 2048,
            max_iteration: 800,
        }
    }
}

/**
 * Rectangular region of the complex plane covered by an image.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ViewportSpec {
    pub fn aspect_ratio(&self) -> f64 {
        (self.height as f64) / (self.width as f64)
    }

    /**
     * Note: the upper bounds are the absolute value of `center + span / 2`, so the
     * window is not symmetric about the center whenever that sum is negative.
     * Existing parameter files depend on this, so it is left as is.
     */
    pub fn view_window(&self) -> ViewWindow {
        let ratio = self.aspect_ratio();
        let half_width = self.escape_radius / 2.0;
        let half_height = self.escape_radius * ratio / 2.0;
        ViewWindow {
            x_min: self.center_x - half_width,
            x_max: (self.center_x + half_width).abs(),
            y_min: self.center_y - half_height,
            y_max: (self.center_y + half_height).abs(),
        }
    }
}

pub fn create_buffer(spec: &ViewportSpec) -> PixelBuffer {
    RgbaImage::new(spec.width, spec.height)
}

#[derive(Clone, Debug)]
/**
 * Used to map from image space into the complex plane.
 */
pub struct LinearPixelMap {
    n: u32,
    x0: f64,
    x1: f64,
}

impl LinearPixelMap {
    /**
     * @param n: number of pixels spanned by [x0,x1]
     * @param x0: output of the map at 0
     * @param x1: output of the map at n-1
     */
    pub fn new(n: u32, x0: f64, x1: f64) -> LinearPixelMap {
        assert!(n > 0);
        LinearPixelMap { n, x0, x1 }
    }

    // Map from pixel (integer) to point (float). Exact at both end points.
    pub fn map(&self, index: u32) -> f64 {
        if self.n == 1 {
            return self.x0;
        }
        let alpha = (index as f64) / ((self.n - 1) as f64);
        self.x0 * (1.0 - alpha) + self.x1 * alpha
    }
}

#[derive(Clone, Debug)]
pub struct PixelMapper {
    pub width: LinearPixelMap,
    pub height: LinearPixelMap,
}

impl PixelMapper {
    /// Row zero of the image maps to `y_min`; the image is not flipped vertically.
    pub fn new(spec: &ViewportSpec) -> PixelMapper {
        let window = spec.view_window();
        PixelMapper {
            width: LinearPixelMap::new(spec.width, window.x_min, window.x_max),
            height: LinearPixelMap::new(spec.height, window.y_min, window.y_max),
        }
    }

    pub fn map(&self, pixel: &(u32, u32)) -> (f64, f64) {
        let (x, y) = pixel;
        (self.width.map(*x), self.height.map(*y))
    }
}

/**
 * Given image size parameters and a mapping into the complex plane, iterate over
 * each pixel, using a lambda function to compute the color of the image at each
 * pixel location. Rows are processed in parallel, each row by exactly one task
 * that owns the row's slice of the buffer. Returns once every row is finished.
 *
 * @param pixel_renderer: maps a point in the complex plane to a color, or to
 * `None` to leave the pixel untouched.
 * @param progress: optional observer, called as each row completes.
 */
pub fn generate_image_in_place<F>(
    spec: &ViewportSpec,
    pixel_renderer: F,
    buffer: &mut PixelBuffer,
    progress: Option<&RowProgressFn>,
) where
    F: Fn(f64, f64) -> Option<Rgba<u8>> + Sync,
{
    assert_eq!(buffer.dimensions(), (spec.width, spec.height), "Buffer dimension mismatch");

    let pixel_mapper = PixelMapper::new(spec);
    let rows_completed = AtomicU32::new(0);
    let row_length = 4 * spec.width as usize;

    buffer
        .par_chunks_mut(row_length)
        .enumerate()
        .for_each(|(y, row)| {
            let im = pixel_mapper.height.map(y as u32);
            for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                let re = pixel_mapper.width.map(x as u32);
                if let Some(color) = pixel_renderer(re, im) {
                    pixel.copy_from_slice(&color.0);
                }
            }
            let completed = rows_completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(progress) = progress {
                progress(completed, spec.height);
            }
        });
}

/**
 * Same as `generate_image_in_place`, but executed on a dedicated pool with
 * exactly `thread_count` worker threads instead of the global rayon pool.
 */
pub fn generate_image_in_place_with_threads<F>(
    spec: &ViewportSpec,
    pixel_renderer: F,
    buffer: &mut PixelBuffer,
    progress: Option<&RowProgressFn>,
    thread_count: usize,
) -> Result<(), RenderError>
where
    F: Fn(f64, f64) -> Option<Rgba<u8>> + Sync + Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()?;
    pool.install(|| generate_image_in_place(spec, pixel_renderer, buffer, progress));
    Ok(())
}
