use crate::core::{
    file_io::{serialize_to_json, write_image, FilePrefix},
    stopwatch::Stopwatch,
};
use crate::fractals::mandelbrot::{render_from_params, MandelbrotParams};

/**
 * Renders the Mandelbrot set described by `params`, then writes the image to
 * `<prefix>.png` and the parameters that produced it to `<prefix>.json`.
 */
pub fn render_fractal(
    params: &MandelbrotParams,
    file_prefix: FilePrefix,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stopwatch = Stopwatch::new("Mandelbrot render");
    file_prefix.create_directory()?;

    let palette = params.palette();
    log::info!(
        "Built palette with {} entries from {} color stops",
        palette.len(),
        params.color_map.stops.len()
    );
    stopwatch.record_split("build palette");

    let spec = &params.image_specification;
    log::info!(
        "Rendering {}x{} pixels, max iteration {}",
        spec.width,
        spec.height,
        spec.max_iteration
    );
    let report_progress = |completed: u32, total: u32| {
        log::debug!("Rendered row {} of {}", completed, total);
    };
    let buffer = render_from_params(params, &palette, Some(&report_progress))?;
    stopwatch.record_split("render image");

    write_image(&file_prefix.with_suffix(".png"), &buffer)?;
    serialize_to_json(&file_prefix.with_suffix(".json"), params)?;
    stopwatch.record_split("write files");

    stopwatch.log();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::image_utils::ViewportSpec;

    #[test]
    fn test_render_writes_image_and_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let params = MandelbrotParams {
            image_specification: ViewportSpec {
                width: 12,
                height: 9,
                max_iteration: 32,
                ..ViewportSpec::default()
            },
            thread_count: Some(2),
            ..MandelbrotParams::default()
        };
        let file_prefix = FilePrefix {
            directory_path: dir.path().join("render"),
            file_base: "tiny".to_owned(),
        };

        render_fractal(&params, file_prefix.clone()).unwrap();

        let image = image::open(file_prefix.with_suffix(".png")).unwrap();
        assert_eq!((image.width(), image.height()), (12, 9));
        let written: MandelbrotParams = serde_json::from_str(
            &std::fs::read_to_string(file_prefix.with_suffix(".json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written, params);
    }
}
