//! Courtyard native viewer
//!
//! Opens a window onto the courtyard scene with first-person controls.
//!
//! Usage:
//!   courtyard [--config <file>] [--assets <dir>] [--width N] [--height N]

mod assets;
mod cli;
mod config;
mod viewer;

use anyhow::Result;
use clap::Parser;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::cli::Cli;
use crate::viewer::Viewer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = config::resolve(cli.config.as_deref(), cli.assets.as_deref())?;
    match &config.source {
        Some(path) => log::info!("Scene config: {}", path.display()),
        None => log::info!("No {} found, using defaults", config::CONFIG_FILE),
    }
    log::info!("Assets from {}", config.asset_root.display());

    println!("Controls:");
    println!("  WASD     - Move");
    println!("  Mouse    - Look (click to capture)");
    println!("  Escape   - Release cursor / Exit");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut viewer = Viewer::new(config, cli.width, cli.height);
    event_loop.run_app(&mut viewer)?;

    match viewer.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
