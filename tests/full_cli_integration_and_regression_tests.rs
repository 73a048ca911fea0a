use std::process::Command;

use image::Rgba;
use mandelbrot_renderer::core::{
    color_map::{default_color_stops, Palette},
    image_utils::{PixelBuffer, ViewportSpec},
};
use mandelbrot_renderer::fractals::mandelbrot::{render_mandelbrot, MandelbrotParams};
use sha2::{Digest, Sha256};

fn compute_buffer_hash(buffer: &PixelBuffer) -> String {
    let mut hasher = Sha256::new();
    hasher.update(buffer.as_raw());
    format!("{:x}", hasher.finalize())
}

fn check_buffer_hash(buffer: &PixelBuffer, expected_hash: &str) -> bool {
    let computed_hash = compute_buffer_hash(buffer);
    if computed_hash == expected_hash {
        println!("Hash matches the expected value.");
        true
    } else {
        println!(
            "Hash mismatch! Expected: {}, but got: {}",
            expected_hash, computed_hash
        );
        false
    }
}

fn default_view(width: u32, height: u32, max_iteration: u32) -> ViewportSpec {
    ViewportSpec {
        width,
        height,
        max_iteration,
        ..ViewportSpec::default()
    }
}

#[test]
fn test_tiny_golden_render() {
    let spec = default_view(4, 4, 10);
    let palette = Palette::new(&default_color_stops(), 10.0);
    assert_eq!(palette.len(), 11);

    let buffer = render_mandelbrot(&spec, &palette, None);

    let a = Rgba([235, 86, 37, 255]);
    let b = Rgba([3, 38, 40, 255]);
    let c = Rgba([62, 152, 22, 255]);
    let expected = [
        [a, a, b, Rgba([163, 232, 154, 255])],
        [a, a, b, c],
        [a, a, b, c],
        [b, b, Rgba([5, 39, 195, 255]), Rgba([95, 150, 164, 255])],
    ];
    for (y, row) in expected.iter().enumerate() {
        for (x, pixel) in row.iter().enumerate() {
            assert_eq!(
                buffer.get_pixel(x as u32, y as u32),
                pixel,
                "pixel ({}, {})",
                x,
                y
            );
        }
    }
}

#[test]
fn test_mandelbrot_regression_hash() {
    let mut params = MandelbrotParams::default();
    params.image_specification = default_view(48, 32, 64);
    params.color_map.color_step = 200.0;

    let buffer = render_mandelbrot(&params.image_specification, &params.palette(), None);

    assert!(buffer.pixels().all(|pixel| pixel.0 != [0, 0, 0, 0]));
    assert!(check_buffer_hash(
        &buffer,
        "713d8123e8ae190658f6f3cc6a42cbd0a72eb6b42cc42af35688b84b707ef75a"
    ));
}

#[test]
fn test_cli_render_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cli").join("render.png");

    let status = Command::new(env!("CARGO_BIN_EXE_mandelbrot-renderer"))
        .arg("render")
        .env("WIDTH", "24")
        .env("HEIGHT", "16")
        .env("MAXITERATION", "50")
        .env("COLORSTEP", "100")
        .env("FILENAME", &output)
        .env_remove("AWS_LAMBDA_FUNCTION_NAME")
        .env_remove("AWS_LAMBDA_FUNCTION_MEMORY_SIZE")
        .env_remove("XPOS")
        .env_remove("YPOS")
        .env_remove("ESCAPERADIUS")
        .status()
        .expect("failed to execute process");
    assert!(status.success());

    let image = image::open(&output).unwrap();
    assert_eq!((image.width(), image.height()), (24, 16));

    let params: MandelbrotParams = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("cli").join("render.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(params.image_specification.max_iteration, 50);
    assert_eq!(params.color_map.color_step, 100.0);
}

#[test]
fn test_cli_color_swatch_with_params_file() {
    let dir = tempfile::tempdir().unwrap();
    let params_path = dir.path().join("params.json");
    let output = dir.path().join("palette.png");
    let params = MandelbrotParams {
        file_name: output.display().to_string(),
        ..MandelbrotParams::default()
    };
    std::fs::write(&params_path, serde_json::to_string(&params).unwrap()).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_mandelbrot-renderer"))
        .arg("color-swatch")
        .arg(&params_path)
        .env_remove("FILENAME")
        .env_remove("COLORSTEP")
        .env_remove("MAXITERATION")
        .env_remove("AWS_LAMBDA_FUNCTION_NAME")
        .status()
        .expect("failed to execute process");
    assert!(status.success());

    let swatch = image::open(dir.path().join("palette_swatch.png")).unwrap();
    assert_eq!(swatch.width(), 6001);
}

#[test]
fn test_cli_rejects_malformed_environment() {
    let status = Command::new(env!("CARGO_BIN_EXE_mandelbrot-renderer"))
        .arg("render")
        .env("WIDTH", "not-a-number")
        .status()
        .expect("failed to execute process");
    assert!(!status.success());
}
