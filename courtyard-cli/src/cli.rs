use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "courtyard",
    about = "First-person viewer for the courtyard scene",
    version
)]
pub struct Cli {
    /// Scene config file (defaults to the nearest courtyard.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory asset paths are resolved against
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 1280, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 720, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,
}
