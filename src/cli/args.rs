use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct MandelbrotRendererArgs {
    #[command(subcommand)]
    pub command: Option<CommandsEnum>,
}

#[derive(Debug, Subcommand)]
pub enum CommandsEnum {
    Render(ParameterFilePath),
    ColorSwatch(ParameterFilePath),
}

#[derive(Debug, Args, Default)]
pub struct ParameterFilePath {
    /// Optional JSON parameter file; environment variables override its values.
    pub params_path: Option<String>,

    #[clap(long, short)]
    pub date_time_out: bool,
}
