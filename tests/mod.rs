use nalgebra::DMatrix;
use sbidemo::calc::{linspace, trapezoid};
use sbidemo::grid::*;
use sbidemo::*;
use std::f64::consts::PI;

const EPS : f64 = 10E-8;

// mu = 0, sigma_theta = 1, sigma_x = 1 over theta in [-4, 4] and x in [-2, 10].
fn unit_scenario(with_ratio : bool) -> (Grid, DensityGrids) {
    let grid = Grid::linspace((-4.0, 4.0, 300), (-2.0, 10.0, 300)).unwrap();
    let params = DensityParams { mu_theta : 0.0, sigma_theta : 1.0, sigma_x : 1.0 };
    let grids = DensityGrids::compute(&grid, &params, with_ratio).unwrap();
    (grid, grids)
}

fn default_scenario() -> (Grid, DensityGrids) {
    sbidemo::compute(&DemoConfig::default()).unwrap()
}

fn row(m : &DMatrix<f64>, i : usize) -> Vec<f64> {
    m.row(i).iter().copied().collect()
}

fn column(m : &DMatrix<f64>, j : usize) -> Vec<f64> {
    m.column(j).iter().copied().collect()
}

#[test]
fn prior_integrates_to_one() {
    let (grid, grids) = unit_scenario(false);
    let area = trapezoid(&row(&grids.prior, 0), grid.theta_range());
    assert!((area - 1.0).abs() < 1E-3, "prior area {}", area);

    let (grid, grids) = default_scenario();
    let area = trapezoid(&row(&grids.prior, 17), grid.theta_range());
    assert!((area - 1.0).abs() < 1E-2, "prior area {}", area);
}

#[test]
fn prior_constant_along_columns() {
    let (_, grids) = unit_scenario(false);
    for j in [0, 150, 299].iter() {
        let col = column(&grids.prior, *j);
        assert!(col.iter().all(|p| *p == col[0] ));
    }
}

#[test]
fn likelihood_normalized_over_x_not_theta() {
    let (grid, grids) = unit_scenario(false);

    // Row near x = 4: the two arms of the parabola contribute roughly 1/(2|theta|) each.
    let i = grid.x_range().iter().position(|x| *x >= 4.0 ).unwrap();
    let over_theta = trapezoid(&row(&grids.likelihood, i), grid.theta_range());
    assert!((over_theta - 1.0).abs() > 0.1, "row integral {}", over_theta);

    // Column near theta = 2 has its mean at x = 4, well inside [-2, 10].
    let j = grid.theta_range().iter().position(|t| *t >= 2.0 ).unwrap();
    let over_x = trapezoid(&column(&grids.likelihood, j), grid.x_range());
    assert!((over_x - 1.0).abs() < 1E-3, "column integral {}", over_x);
}

#[test]
fn joint_is_exact_product() {
    let (_, grids) = default_scenario();
    for i in 0..grids.joint.nrows() {
        for j in 0..grids.joint.ncols() {
            assert_eq!(grids.joint[(i, j)], grids.likelihood[(i, j)] * grids.prior[(i, j)]);
        }
    }
}

#[test]
fn marginal_is_row_integral_of_joint() {
    let (grid, grids) = unit_scenario(false);
    assert_eq!(grids.marginal.nrows(), 300);
    for i in [0, 42, 299].iter() {
        let expected = trapezoid(&row(&grids.joint, *i), grid.theta_range());
        assert_eq!(grids.marginal[*i], expected);
    }
    assert!((grids.evidence(&grid) - 1.0).abs() < 0.05);
}

#[test]
fn posterior_rows_normalized() {
    let (grid, grids) = default_scenario();
    for i in 0..grids.posterior.nrows() {
        if grids.marginal[i] < 1E-4 {
            continue;
        }
        let area = trapezoid(&row(&grids.posterior, i), grid.theta_range());
        assert!((area - 1.0).abs() < 1E-6, "row {} posterior area {}", i, area);
    }
}

#[test]
fn posterior_uses_guarded_division() {
    let (_, grids) = unit_scenario(false);
    let (i, j) = (10, 200);
    assert_eq!(grids.posterior[(i, j)], grids.joint[(i, j)] / (grids.marginal[i] + EPSILON));
    assert!(grids.posterior.iter().all(|p| p.is_finite() && *p >= 0.0 ));
}

#[test]
fn ratio_formulations_agree() {
    let (_, grids) = unit_scenario(true);
    let ratio = grids.ratio.as_ref().unwrap();
    for i in (0..300).step_by(7) {
        for j in (0..300).step_by(5) {
            let r = ratio[(i, j)];
            let from_posterior = grids.posterior[(i, j)] / (grids.prior[(i, j)] + EPSILON);
            let from_likelihood = grids.likelihood[(i, j)] / (grids.marginal[i] + EPSILON);
            let tol = EPS * r.abs().max(1.0);
            assert!((r - from_posterior).abs() < tol, "({}, {}): {} vs {}", i, j, r, from_posterior);
            assert!((r - from_likelihood).abs() < tol, "({}, {}): {} vs {}", i, j, r, from_likelihood);
        }
    }
}

#[test]
fn joint_peak_near_origin() {
    let (grid, grids) = unit_scenario(false);
    let peak = grid.peak(&grids.joint).unwrap();
    assert!(peak.theta.abs() < 0.1, "peak theta {}", peak.theta);
    assert!(peak.x.abs() < 0.1, "peak x {}", peak.x);
    let expected = 1. / (2. * PI);
    assert!((peak.value - expected).abs() < 1E-3, "peak value {}", peak.value);
}

#[test]
fn prior_decays_at_range_ends() {
    let (grid, grids) = unit_scenario(false);
    let prior = row(&grids.prior, 0);
    let center = grid.theta_range().iter().position(|t| *t >= 0.0 ).unwrap();
    assert!(prior[0] < prior[center]);
    assert!(prior[299] < prior[center]);
    assert!(prior[..center].windows(2).all(|w| w[0] < w[1] ));
}

#[test]
fn computation_is_idempotent() {
    let (_, a) = unit_scenario(true);
    let (_, b) = unit_scenario(true);
    assert_eq!(a, b);
}

#[test]
fn three_and_four_panel_variants_share_fields() {
    let three = DemoConfig { include_ratio : false, ..DemoConfig::default() };
    let (_, without) = sbidemo::compute(&three).unwrap();
    let (_, with) = default_scenario();
    assert!(without.ratio.is_none());
    assert!(with.ratio.is_some());
    assert_eq!(without.posterior, with.posterior);
}

#[test]
fn invalid_parameters_fail() {
    let mut cfg = DemoConfig::default();
    cfg.params.sigma_x = 0.0;
    assert!(matches!(sbidemo::compute(&cfg), Err(DensityError::InvalidParameter(_))));

    let mut cfg = DemoConfig::default();
    cfg.params.sigma_theta = -1.5;
    assert!(matches!(sbidemo::compute(&cfg), Err(DensityError::InvalidParameter(_))));

    let mut cfg = DemoConfig::default();
    cfg.theta.n = 1;
    assert!(matches!(sbidemo::compute(&cfg), Err(DensityError::InvalidParameter(_))));

    let grid = Grid::mesh(&linspace(1.0, -1.0, 10), &linspace(0.0, 1.0, 10));
    assert!(matches!(grid, Err(DensityError::InvalidParameter(_))));
}

#[test]
fn render_rejects_missing_ratio() {
    let three = DemoConfig { include_ratio : false, ..DemoConfig::default() };
    let (grid, grids) = sbidemo::compute(&three).unwrap();
    let four = DemoConfig::default();
    match plot::render(&grid, &grids, &four) {
        Err(plot::RenderError::MissingField(Field::Ratio)) => { },
        other => panic!("Unexpected result: {:?}", other)
    }
}

// Needs one of the default TrueType fonts to be installed.
#[test]
#[ignore]
fn render_writes_image() {
    let mut cfg = DemoConfig::default();
    cfg.theta.n = 60;
    cfg.x.n = 60;
    cfg.dpi = 50;
    cfg.output = std::env::temp_dir().join("sbidemo_render_test.png");
    let (grid, grids) = sbidemo::compute(&cfg).unwrap();
    plot::render(&grid, &grids, &cfg).unwrap();
    let meta = std::fs::metadata(&cfg.output).unwrap();
    assert!(meta.len() > 0);
    std::fs::remove_file(&cfg.output).unwrap();
}
