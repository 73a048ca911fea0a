use std::path::Path;

use clap::Parser;
use mandelbrot_renderer::cli::{
    args::{CommandsEnum, MandelbrotRendererArgs, ParameterFilePath},
    color_swatch::generate_color_swatch,
    environment::ExecutionEnvironment,
    render::render_fractal,
};
use mandelbrot_renderer::core::{
    config::process_env,
    file_io::{maybe_date_time_string, FilePrefix},
};
use mandelbrot_renderer::fractals::mandelbrot::MandelbrotParams;

fn load_params(
    args: &ParameterFilePath,
    environment: &ExecutionEnvironment,
) -> Result<(MandelbrotParams, FilePrefix), Box<dyn std::error::Error>> {
    let params = MandelbrotParams::load(args.params_path.as_deref().map(Path::new), process_env)?;
    let mut file_prefix = FilePrefix::from_output_file(&environment.output_path(&params.file_name));
    if let Some(date_time) = maybe_date_time_string(args.date_time_out) {
        file_prefix = file_prefix.with_sub_directory(&date_time);
    }
    Ok((params, file_prefix))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = MandelbrotRendererArgs::parse();
    let environment = ExecutionEnvironment::detect();

    match args.command {
        Some(CommandsEnum::Render(params)) => {
            let (params, file_prefix) = load_params(&params, &environment)?;
            render_fractal(&params, file_prefix)
        }
        Some(CommandsEnum::ColorSwatch(params)) => {
            let (params, file_prefix) = load_params(&params, &environment)?;
            generate_color_swatch(&params, file_prefix)
        }
        None => {
            let (params, file_prefix) = load_params(&ParameterFilePath::default(), &environment)?;
            render_fractal(&params, file_prefix)
        }
    }
}
