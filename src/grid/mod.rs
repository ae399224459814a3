use nalgebra::*;
use serde::{Serialize, Deserialize};
use std::default::Default;
use crate::calc;
use crate::prob::*;

/// Additive guard applied to every denominator, so rows where the marginal
/// vanishes numerically produce small finite values instead of NaN or inf.
pub const EPSILON : f64 = 1e-12;

/// Mesh over the parameter (theta) and observation (x) axes. Both mesh matrices
/// have one row per observation and one column per parameter value: theta varies
/// along columns and x varies along rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {

    theta_range : Vec<f64>,

    x_range : Vec<f64>,

    theta : DMatrix<f64>,

    x : DMatrix<f64>

}

impl Grid {

    /// Builds the mesh from the two axis sequences. Each axis needs at least two
    /// points, and theta must be strictly increasing since its nodes are
    /// used for integration.
    pub fn mesh(theta_range : &[f64], x_range : &[f64]) -> Result<Self, DensityError> {
        if theta_range.len() < 2 {
            return Err(DensityError::invalid(format!("theta_range needs at least 2 points (got {})", theta_range.len())));
        }
        if x_range.len() < 2 {
            return Err(DensityError::invalid(format!("x_range needs at least 2 points (got {})", x_range.len())));
        }
        if !calc::strictly_increasing(theta_range) {
            return Err(DensityError::invalid("theta_range must be strictly increasing"));
        }
        let (m, n) = (x_range.len(), theta_range.len());
        let theta = DMatrix::from_fn(m, n, |_, j| theta_range[j] );
        let x = DMatrix::from_fn(m, n, |i, _| x_range[i] );
        Ok(Self { theta_range : theta_range.to_vec(), x_range : x_range.to_vec(), theta, x })
    }

    pub fn linspace(theta : (f64, f64, usize), x : (f64, f64, usize)) -> Result<Self, DensityError> {
        Self::mesh(&calc::linspace(theta.0, theta.1, theta.2), &calc::linspace(x.0, x.1, x.2))
    }

    pub fn theta_range(&self) -> &[f64] {
        &self.theta_range[..]
    }

    pub fn x_range(&self) -> &[f64] {
        &self.x_range[..]
    }

    pub fn theta(&self) -> &DMatrix<f64> {
        &self.theta
    }

    pub fn x(&self) -> &DMatrix<f64> {
        &self.x
    }

    /// (rows, columns) = (observations, parameter values)
    pub fn shape(&self) -> (usize, usize) {
        self.theta.shape()
    }

    /// Grid node holding the largest value of a field with the grid shape.
    pub fn peak(&self, field : &DMatrix<f64>) -> Option<Peak> {
        if field.shape() != self.shape() {
            return None;
        }
        calc::argmax(field).map(|(i, j)| Peak { theta : self.theta_range[j], x : self.x_range[i], value : field[(i, j)] })
    }

}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub theta : f64,
    pub x : f64,
    pub value : f64
}

/// Prior over theta and observation noise around the forward model mean theta^2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityParams {

    pub mu_theta : f64,

    pub sigma_theta : f64,

    pub sigma_x : f64

}

impl Default for DensityParams {

    fn default() -> Self {
        Self { mu_theta : 0.0, sigma_theta : 1.5, sigma_x : 2.0 }
    }

}

impl DensityParams {

    pub fn prior(&self) -> Result<Normal, DensityError> {
        check_scale("sigma_theta", self.sigma_theta)?;
        Normal::new(self.mu_theta, self.sigma_theta)
    }

    /// Observation model at a fixed parameter value: N(theta^2, sigma_x).
    pub fn likelihood(&self, theta : f64) -> Result<Normal, DensityError> {
        check_scale("sigma_x", self.sigma_x)?;
        Normal::new(theta.powi(2), self.sigma_x)
    }

    pub fn validate(&self) -> Result<(), DensityError> {
        check_scale("sigma_theta", self.sigma_theta)?;
        check_scale("sigma_x", self.sigma_x)?;
        if !self.mu_theta.is_finite() {
            return Err(DensityError::invalid(format!("mu_theta must be finite (got {})", self.mu_theta)));
        }
        Ok(())
    }

}

/// The density fields evaluated over one grid. All matrices share the grid
/// shape, except the marginal which holds one value per observation row.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrids {

    /// P(theta), constant along each column.
    pub prior : DMatrix<f64>,

    /// P(x | theta), normalized along x for each fixed theta.
    pub likelihood : DMatrix<f64>,

    /// P(x, theta) = P(x | theta) P(theta)
    pub joint : DMatrix<f64>,

    /// P(x), the joint integrated over theta (trapezoidal rule).
    pub marginal : DVector<f64>,

    /// P(theta | x), normalized along theta for each fixed x.
    pub posterior : DMatrix<f64>,

    /// P(x, theta) / (P(x) P(theta))
    pub ratio : Option<DMatrix<f64>>

}

impl DensityGrids {

    /// Evaluates every field over the grid. This is a pure function of its inputs:
    /// calling it twice with the same arguments yields bit-identical fields.
    pub fn compute(grid : &Grid, params : &DensityParams, with_ratio : bool) -> Result<Self, DensityError> {
        params.validate()?;
        let (m, n) = grid.shape();
        let theta_range = grid.theta_range();
        let x_range = grid.x_range();

        let prior_1d = prior_density(theta_range, params)?;
        let prior = DMatrix::from_fn(m, n, |_, j| prior_1d[j] );

        let mut likelihood = DMatrix::zeros(m, n);
        for (j, theta) in theta_range.iter().enumerate() {
            let lik = params.likelihood(*theta)?;
            for (i, x) in x_range.iter().enumerate() {
                likelihood[(i, j)] = lik.prob(*x);
            }
        }

        let joint = likelihood.component_mul(&prior);
        let marginal = calc::trapezoid_rows(&joint, theta_range);
        let posterior = DMatrix::from_fn(m, n, |i, j| joint[(i, j)] / (marginal[i] + EPSILON) );
        let ratio = if with_ratio {
            Some(DMatrix::from_fn(m, n, |i, j| {
                joint[(i, j)] / ((marginal[i] + EPSILON) * (prior[(i, j)] + EPSILON))
            }))
        } else {
            None
        };

        Ok(Self { prior, likelihood, joint, marginal, posterior, ratio })
    }

    /// Total joint mass captured by the grid: the marginal integrated over x.
    /// Close to one when both ranges cover the bulk of the distribution.
    pub fn evidence(&self, grid : &Grid) -> f64 {
        calc::trapezoid(self.marginal.as_slice(), grid.x_range())
    }

    pub fn field(&self, field : Field) -> Option<&DMatrix<f64>> {
        match field {
            Field::Prior => Some(&self.prior),
            Field::Likelihood => Some(&self.likelihood),
            Field::Joint => Some(&self.joint),
            Field::Posterior => Some(&self.posterior),
            Field::Ratio => self.ratio.as_ref()
        }
    }

}

/// Identifies one of the M x N density fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Prior,
    Likelihood,
    Joint,
    Posterior,
    Ratio
}

/// Prior density at each theta node, used both for the prior field and the
/// 1-D prior overlay.
pub fn prior_density(theta_range : &[f64], params : &DensityParams) -> Result<Vec<f64>, DensityError> {
    let prior = params.prior()?;
    Ok(theta_range.iter().map(|theta| prior.prob(*theta) ).collect())
}
