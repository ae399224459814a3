/// Numerical helpers over sampled curves and fields: evenly-spaced sequences,
/// trapezoidal integration and location of field maxima.
pub mod calc;

/// Univariate normal distribution and the parameter validation shared by
/// every density evaluation.
pub mod prob;

/// Mesh over the (theta, x) plane and the prior, likelihood, joint, marginal,
/// posterior and ratio fields evaluated over it, for the parabolic model
/// x = theta^2 + eps.
pub mod grid;

// Run configuration, with defaults for the demo figure.
pub mod config;

/// Filled-contour rendering of the density fields into a raster image.
pub mod plot;

pub use config::DemoConfig;

pub use grid::{Grid, DensityGrids, DensityParams, Field};

pub use prob::DensityError;

/// Computes the fields for a configuration and logs a short summary of the result.
pub fn compute(config : &DemoConfig) -> Result<(Grid, DensityGrids), DensityError> {
    let grid = config.grid()?;
    let grids = DensityGrids::compute(&grid, &config.params, config.include_ratio)?;
    let (m, n) = grid.shape();
    tracing::info!(rows = m, cols = n, evidence = grids.evidence(&grid), "density fields computed");
    if let Some(peak) = grid.peak(&grids.joint) {
        tracing::info!(theta = peak.theta, x = peak.x, value = peak.value, "joint peak");
    }
    Ok((grid, grids))
}
