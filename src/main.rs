mod capture;
mod config;
mod controller;
mod detector;
mod gesture;
mod landmarks;
mod mapping;
mod overlay;
mod pointer;
mod telemetry;

use anyhow::Result;
use clap::Parser;

use config::{Cli, ControllerConfig};
use controller::HandGestureController;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let config = ControllerConfig::try_from(cli)?;
    let mut controller = HandGestureController::new(&config)?;
    controller.run()
}
