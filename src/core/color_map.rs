use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::core::interpolation::{
    wrapping_linear_interpolation, CosineInterpolator, Interpolator,
};

/**
 * Represents a single "stop" of the color gradient: a color anchored at a
 * normalized position along the gradient. A missing `step` means that the
 * position is derived from the index of the stop within the list.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>, // location of this color within the gradient; on [0,1]
    pub rgba: [u8; 4], // [R, G, B, A]
}

impl ColorStop {
    pub const fn auto(rgba: [u8; 4]) -> ColorStop {
        ColorStop { step: None, rgba }
    }

    pub const fn at(step: f64, rgba: [u8; 4]) -> ColorStop {
        ColorStop {
            step: Some(step),
            rgba,
        }
    }
}

/// Built-in dark-to-light gradient, all positions derived automatically.
pub const DEFAULT_COLOR_STOPS: [ColorStop; 16] = [
    ColorStop::auto([0x00, 0x04, 0x0f, 0xff]),
    ColorStop::auto([0x03, 0x26, 0x28, 0xff]),
    ColorStop::auto([0x07, 0x3e, 0x1e, 0xff]),
    ColorStop::auto([0x18, 0x55, 0x08, 0xff]),
    ColorStop::auto([0x5f, 0x6e, 0x0f, 0xff]),
    ColorStop::auto([0x84, 0x50, 0x19, 0xff]),
    ColorStop::auto([0x9b, 0x30, 0x22, 0xff]),
    ColorStop::auto([0xb4, 0x92, 0x2f, 0xff]),
    ColorStop::auto([0x94, 0xca, 0x3d, 0xff]),
    ColorStop::auto([0x4f, 0xd5, 0x51, 0xff]),
    ColorStop::auto([0x66, 0xff, 0xb3, 0xff]),
    ColorStop::auto([0x82, 0xc9, 0xe5, 0xff]),
    ColorStop::auto([0x9d, 0xa3, 0xeb, 0xff]),
    ColorStop::auto([0xd7, 0xb5, 0xf3, 0xff]),
    ColorStop::auto([0xfd, 0xd6, 0xf6, 0xff]),
    ColorStop::auto([0xff, 0xf0, 0xf2, 0xff]),
];

pub fn default_color_stops() -> Vec<ColorStop> {
    DEFAULT_COLOR_STOPS.to_vec()
}

/// Packs a color into a single scalar: `R << 24 | G << 16 | B << 8 | A`.
pub fn pack_rgba(color: &Rgba<u8>) -> u32 {
    u32::from_be_bytes(color.0)
}

/// Inverse of `pack_rgba`, except that the alpha channel is always opaque.
pub fn unpack_opaque_rgba(packed: u32) -> Rgba<u8> {
    let [r, g, b, _] = packed.to_be_bytes();
    Rgba([r, g, b, 0xff])
}

// truncate (not round) to two decimal digits
fn truncate_to_hundredths(value: f64) -> f64 {
    (value * 100.0).trunc() / 100.0
}

/// Position of the stop at `index` within a list of `stop_count` stops.
pub fn resolve_step(index: usize, stop_count: usize, stop: &ColorStop) -> f64 {
    if index == 0 {
        return 0.0;
    }
    match stop.step {
        Some(step) => step,
        None => truncate_to_hundredths((index + 1) as f64 / stop_count as f64),
    }
}

/**
 * Intermediate representation used while building the palette: the position
 * and the packed color of every stop, stored as parallel lists.
 */
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedStops {
    pub steps: Vec<f64>,
    pub packed_colors: Vec<u32>,
}

impl ResolvedStops {
    pub fn new(stops: &[ColorStop]) -> ResolvedStops {
        ResolvedStops {
            steps: stops
                .iter()
                .enumerate()
                .map(|(index, stop)| resolve_step(index, stops.len(), stop))
                .collect(),
            packed_colors: stops
                .iter()
                .map(|stop| pack_rgba(&Rgba(stop.rgba)))
                .collect(),
        }
    }

    /// Index `j` of the first pair of stops with `steps[j] <= query < steps[j+1]`.
    fn bracket(&self, query: f64) -> Option<usize> {
        self.steps
            .windows(2)
            .position(|pair| query >= pair[0] && query < pair[1])
    }
}

/**
 * Dense, evenly spaced table of colors derived from a short list of color stops.
 *
 * Interpolation happens on the packed 32-bit value of each color rather than per
 * channel, so colors bleed between channels near the transitions. Within each
 * bracket the upper stop is weighted by `1 - w` and the lower stop by `w`, where
 * `w` is the cosine weight of the position within the bracket. Both behaviors
 * are kept so that renders stay pixel-compatible with existing images.
 */
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    colors: Vec<Rgba<u8>>,
}

impl Palette {
    /// Builds a palette with `floor(target_count) + 1` entries.
    pub fn new(stops: &[ColorStop], target_count: f64) -> Palette {
        Palette::from_resolved(stops.len(), &ResolvedStops::new(stops), target_count)
    }

    /**
     * Builds the palette from already resolved stops. Produces an empty palette
     * (rather than an error) if the internal lists disagree on the stop count or
     * `target_count` is not finite.
     */
    pub fn from_resolved(stop_count: usize, resolved: &ResolvedStops, target_count: f64) -> Palette {
        if stop_count == 0
            || resolved.steps.len() != stop_count
            || resolved.packed_colors.len() != stop_count
        {
            log::debug!(
                "inconsistent color stops (stops: {}, steps: {}, colors: {}); palette is empty",
                stop_count,
                resolved.steps.len(),
                resolved.packed_colors.len()
            );
            return Palette::default();
        }

        if !target_count.is_finite() {
            log::debug!("non-finite palette size {}; palette is empty", target_count);
            return Palette::default();
        }

        let interpolator = CosineInterpolator;
        let entry_count = target_count.floor().max(0.0) as usize + 1;
        let last_color = resolved.packed_colors[stop_count - 1];

        // accumulated rather than `k / target_count`: the drift keeps queries on a
        // step boundary inside the lower bracket
        let factor = 1.0 / target_count;
        let mut query = 0.0;
        let colors = (0..entry_count)
            .map(|_| {
                let packed = match resolved.bracket(query) {
                    Some(j) => {
                        let low = resolved.steps[j];
                        let upp = resolved.steps[j + 1];
                        let alpha = (query - low) / (upp - low);
                        let value: f64 = interpolator.interpolate(
                            alpha,
                            &(resolved.packed_colors[j + 1] as f64),
                            &(resolved.packed_colors[j] as f64),
                        );
                        value as u32
                    }
                    // at (or past) the final stop
                    None => last_color,
                };
                query += factor;
                unpack_opaque_rgba(packed)
            })
            .collect();

        Palette { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgba<u8>] {
        &self.colors
    }

    /**
     * Maps a smoothed escape value onto the palette. The entries at
     * `trunc(|value|)` and the one after it are blended on their packed values,
     * with a blend factor of `value` truncated to an integer, so in practice no
     * sub-integer blending takes place.
     *
     * @return: `None` if `|value|` lies past the second to last entry.
     */
    pub fn smoothed_color(&self, value: f64) -> Option<Rgba<u8>> {
        // NaN --> 0, +inf --> usize::MAX
        let index = value.abs() as usize;
        if self.colors.len() < 2 || index >= self.colors.len() - 1 {
            return None;
        }
        // Truncate through i64 so that negative values wrap rather than saturate.
        let alpha = value as i64 as u32;
        let packed = wrapping_linear_interpolation(
            pack_rgba(&self.colors[index]),
            pack_rgba(&self.colors[index + 1]),
            alpha,
        );
        Some(unpack_opaque_rgba(packed))
    }
}
