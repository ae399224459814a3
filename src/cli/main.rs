use structopt::*;
use std::path::PathBuf;
use sbidemo::DemoConfig;
use sbidemo::plot;

/// Plots the joint, likelihood, posterior and ratio densities targeted by
/// simulation-based inference objectives for the model x = theta^2 + eps.
/// Without arguments, writes the default figure to SBIdemo.png.
#[derive(StructOpt, Debug)]
pub struct SbiDemo {

    /// JSON file with a (possibly partial) run configuration.
    #[structopt(short, long)]
    config : Option<PathBuf>,

    /// Image path, overriding the configured one.
    #[structopt(short, long)]
    output : Option<PathBuf>,

    #[structopt(long, default_value = "info")]
    log_level : tracing::Level

}

fn main() -> anyhow::Result<()> {
    let args = SbiDemo::from_args();
    tracing_subscriber::fmt().with_max_level(args.log_level).with_target(false).init();

    let mut config = match &args.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default()
    };
    if let Some(output) = args.output {
        config.output = output;
    }

    let (grid, grids) = sbidemo::compute(&config)?;
    plot::render(&grid, &grids, &config)?;
    Ok(())
}
