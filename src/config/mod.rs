use serde::{Serialize, Deserialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use std::fs::File;
use std::io::BufReader;
use thiserror::Error;
use crate::grid::{Grid, DensityParams};
use crate::prob::DensityError;
use crate::calc;
use crate::plot::font;

#[derive(Debug, Error)]
pub enum ConfigError {

    #[error("Could not read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error)

}

/// Closed interval sampled at n evenly-spaced points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub start : f64,
    pub stop : f64,
    pub n : usize
}

impl AxisRange {

    pub fn points(&self) -> Vec<f64> {
        calc::linspace(self.start, self.stop, self.n)
    }

}

/// Everything a single run of the demo depends on. The defaults reproduce
/// the parabolic demo figure:
///
/// | field           | default                      |
/// |-----------------|------------------------------|
/// | `theta`         | 300 points over [-5, 5]      |
/// | `x`             | 300 points over [-2, 15]     |
/// | `params`        | mu = 0, sigma_theta = 1.5, sigma_x = 2 |
/// | `include_ratio` | true (four panels)           |
/// | `levels`        | 50 contour levels per panel  |
/// | `output`        | `SBIdemo.png`                |
/// | `dpi`           | 300                          |
/// | `panel_inches`  | 6 x 5 inches per panel       |
/// | `fonts`         | common DejaVu / Liberation / Arial paths |
///
/// Fields missing from a configuration file keep their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {

    pub theta : AxisRange,

    pub x : AxisRange,

    pub params : DensityParams,

    /// Adds the density ratio as a fourth panel.
    pub include_ratio : bool,

    pub levels : usize,

    pub output : PathBuf,

    pub dpi : u32,

    /// Width and height of a single panel.
    pub panel_inches : (f64, f64),

    /// TrueType files tried in order for all text.
    pub fonts : Vec<PathBuf>

}

impl Default for DemoConfig {

    fn default() -> Self {
        Self {
            theta : AxisRange { start : -5.0, stop : 5.0, n : 300 },
            x : AxisRange { start : -2.0, stop : 15.0, n : 300 },
            params : DensityParams::default(),
            include_ratio : true,
            levels : 50,
            output : PathBuf::from("SBIdemo.png"),
            dpi : 300,
            panel_inches : (6.0, 5.0),
            fonts : font::default_fonts()
        }
    }

}

impl DemoConfig {

    pub fn load<P : AsRef<Path>>(path : P) -> Result<Self, ConfigError> {
        let f = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(f))?)
    }

    pub fn from_json(src : &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn grid(&self) -> Result<Grid, DensityError> {
        Grid::mesh(&self.theta.points(), &self.x.points())
    }

    /// Pixel dimensions of the whole figure (all panels side by side).
    pub fn figure_pixels(&self) -> (u32, u32) {
        let n_panels = if self.include_ratio { 4. } else { 3. };
        let dpi = self.dpi as f64;
        let w = (self.panel_inches.0 * n_panels * dpi).round().max(1.) as u32;
        let h = (self.panel_inches.1 * dpi).round().max(1.) as u32;
        (w, h)
    }

}
