use thiserror::Error;

mod normal;

pub use normal::*;

/// Failures detected before any density is evaluated. Scale parameters must be
/// strictly positive and finite; integration and meshing need at least two
/// nodes per axis, and the integration axis must be strictly increasing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DensityError {

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String)

}

impl DensityError {

    pub(crate) fn invalid(msg : impl Into<String>) -> Self {
        DensityError::InvalidParameter(msg.into())
    }

}

/// Verifies a scale parameter is strictly positive (NaN and infinity are rejected).
pub(crate) fn check_scale(name : &str, scale : f64) -> Result<f64, DensityError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(DensityError::invalid(format!("{} must be a finite value > 0 (got {})", name, scale)))
    }
}
