use std::error::Error;
use plotters::prelude::*;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::cartesian::Cartesian2d;
use plotters::style::{FontStyle, FontTransform};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use crate::config::DemoConfig;
use crate::grid::{Grid, DensityGrids, Field, prior_density};
use crate::prob::DensityError;
use crate::calc;

/// Filled-contour colormap and level quantization.
pub mod color;

pub use color::*;

/// TrueType font lookup and registration for text elements.
pub mod font;

#[derive(Debug, Error)]
pub enum RenderError {

    #[error(transparent)]
    Density(#[from] DensityError),

    #[error("Missing {0:?} field (was the ratio computed?)")]
    MissingField(Field),

    #[error("Font unavailable: {0}")]
    Font(String),

    #[error("Drawing failed: {0}")]
    Backend(String)

}

/// A figure panel: the field it shows, its title and the inference objective
/// it represents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub field : Field,
    pub title : &'static str,
    pub target : &'static str
}

/// Panels in figure order, left to right. The ratio panel is appended only
/// for the four-panel layout.
pub fn panels(include_ratio : bool) -> Vec<Panel> {
    let mut panels = vec![
        Panel { field : Field::Joint, title : "Joint Distribution P(X, θ)", target : "(Target of Neural Ratio Estimation, NRE)" },
        Panel { field : Field::Likelihood, title : "Likelihood P(X | θ)", target : "(Target of Neural Likelihood Estimation, NLE)" },
        Panel { field : Field::Posterior, title : "Posterior P(θ | X)", target : "(Target of Neural Posterior Estimation, NPE)" }
    ];
    if include_ratio {
        panels.push(Panel { field : Field::Ratio, title : "Ratio P(X, θ) / P(X) P(θ)", target : "(Dependence between θ and X)" });
    }
    panels
}

pub fn figure_title(sigma_x : f64) -> String {
    format!("Visualizing SBI Objectives: Parabolic Case (x = θ² + ε, ε ~ N(0, {:.1}²))", sigma_x)
}

/// Converts a size in typographic points to pixels at the given resolution.
pub fn pt(points : f64, dpi : u32) -> u32 {
    (points * dpi as f64 / 72.0).round().max(1.0) as u32
}

/// Splits a polyline into dashes of length `dash` separated by gaps of length `gap`.
/// Lengths are measured after dividing each coordinate by the matching entry of
/// `spans`, so dashes look even on a chart whose axes have different units.
pub fn dashes(pts : &[(f64, f64)], spans : (f64, f64), dash : f64, gap : f64) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    if pts.len() < 2 || !(dash > 0.0) || !(gap >= 0.0) {
        return out;
    }
    let norm = |a : (f64, f64), b : (f64, f64)| ((b.0 - a.0) / spans.0).hypot((b.1 - a.1) / spans.1);
    let mut drawing = true;
    let mut left = dash;
    let mut current = vec![pts[0]];
    for w in pts.windows(2) {
        let (mut a, b) = (w[0], w[1]);
        let mut seg = norm(a, b);
        while seg > left {
            let t = left / seg;
            let cut = (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
            if drawing {
                current.push(cut);
                out.push(std::mem::take(&mut current));
            } else {
                current = vec![cut];
            }
            drawing = !drawing;
            seg -= left;
            left = if drawing { dash } else { gap };
            a = cut;
        }
        left -= seg;
        if drawing {
            current.push(b);
        }
    }
    if drawing && current.len() > 1 {
        out.push(current);
    }
    out
}

/// Three polylines (shaft and two heads) of a double-headed arrow from `from`
/// to `to`. Head size is a fraction of the axis spans.
pub fn double_arrow(from : (f64, f64), to : (f64, f64), spans : (f64, f64), head : f64) -> Vec<Vec<(f64, f64)>> {
    let (dx, dy) = ((to.0 - from.0) / spans.0, (to.1 - from.1) / spans.1);
    let len = dx.hypot(dy);
    if !(len > 0.0) {
        return Vec::new();
    }
    let (ux, uy) = (dx / len, dy / len);
    let tip = |p : (f64, f64), sign : f64| {
        // Barbs at +-30 degrees from the shaft, pointing back along it.
        let (bx, by) = (-sign * ux * head, -sign * uy * head);
        let (c, s) = (30f64.to_radians().cos(), 30f64.to_radians().sin());
        let left = (p.0 + (bx * c - by * s) * spans.0, p.1 + (bx * s + by * c) * spans.1);
        let right = (p.0 + (bx * c + by * s) * spans.0, p.1 + (-bx * s + by * c) * spans.1);
        vec![left, p, right]
    };
    vec![vec![from, to], tip(to, 1.0), tip(from, -1.0)]
}

// Runs of consecutive points of x = theta^2 that fall inside the observation range.
fn parabola_runs(theta_range : &[f64], x_lim : (f64, f64)) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut run = Vec::new();
    for theta in theta_range {
        let x = theta.powi(2);
        if x >= x_lim.0 && x <= x_lim.1 {
            run.push((*theta, x));
        } else if !run.is_empty() {
            runs.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}

type PanelChart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

struct Extent {
    theta : (f64, f64),
    x : (f64, f64)
}

impl Extent {

    fn spans(&self) -> (f64, f64) {
        (self.theta.1 - self.theta.0, self.x.1 - self.x.0)
    }

    fn contains(&self, p : (f64, f64)) -> bool {
        p.0 >= self.theta.0 && p.0 <= self.theta.1 && p.1 >= self.x.0 && p.1 <= self.x.1
    }

}

/// Renders the joint, likelihood, posterior and (when computed and requested)
/// ratio fields side by side into the PNG at `config.output`, overwriting any
/// existing file.
pub fn render(grid : &Grid, grids : &DensityGrids, config : &DemoConfig) -> Result<(), RenderError> {
    let panels = panels(config.include_ratio);
    for p in panels.iter() {
        if grids.field(p.field).map(|f| f.shape()) != Some(grid.shape()) {
            return Err(RenderError::MissingField(p.field));
        }
    }
    let prior_1d = prior_density(grid.theta_range(), &config.params)?;
    font::register_sans_serif(&config.fonts)?;
    draw_figure(grid, grids, &prior_1d, &panels[..], config)
        .map_err(|e| RenderError::Backend(e.to_string()) )?;
    tracing::info!(path = %config.output.display(), panels = panels.len(), "figure written");
    Ok(())
}

fn draw_figure(
    grid : &Grid,
    grids : &DensityGrids,
    prior_1d : &[f64],
    panels : &[Panel],
    config : &DemoConfig
) -> Result<(), Box<dyn Error>> {
    let dpi = config.dpi;
    let root = BitMapBackend::new(&config.output, config.figure_pixels()).into_drawing_area();
    root.fill(&WHITE)?;
    let title_style = (font::FAMILY, pt(18., dpi)).into_font().style(FontStyle::Bold);
    let root = root.titled(&figure_title(config.params.sigma_x), title_style)?;
    let areas = root.split_evenly((1, panels.len()));
    for (panel, area) in panels.iter().zip(areas.iter()) {
        draw_panel(area, grid, grids, prior_1d, panel, config)?;
    }
    root.present()?;
    Ok(())
}

fn draw_panel(
    area : &DrawingArea<BitMapBackend<'_>, Shift>,
    grid : &Grid,
    grids : &DensityGrids,
    prior_1d : &[f64],
    panel : &Panel,
    config : &DemoConfig
) -> Result<(), Box<dyn Error>> {
    let dpi = config.dpi;
    let theta_range = grid.theta_range();
    let x_range = grid.x_range();
    let extent = Extent {
        theta : (theta_range[0], theta_range[theta_range.len()-1]),
        x : (x_range.iter().cloned().fold(f64::INFINITY, f64::min), x_range.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
    };
    let field = grids.field(panel.field).ok_or_else(|| RenderError::MissingField(panel.field) )?;

    let area = area.titled(panel.title, (font::FAMILY, pt(14., dpi)))?;
    let area = area.titled(panel.target, (font::FAMILY, pt(11., dpi)))?;
    let mut chart = ChartBuilder::on(&area)
        .margin(pt(8., dpi))
        .x_label_area_size(pt(30., dpi))
        .y_label_area_size(pt(36., dpi))
        .build_cartesian_2d(extent.theta.0..extent.theta.1, extent.x.0..extent.x.1)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Parameter θ")
        .y_desc("Observation x")
        .label_style((font::FAMILY, pt(9., dpi)))
        .axis_desc_style((font::FAMILY, pt(11., dpi)))
        .draw()?;

    draw_contour(&mut chart, field, theta_range, x_range, config.levels)?;
    let line = pt(0.5, dpi);
    for run in parabola_runs(theta_range, extent.x) {
        for dash in dashes(&run, extent.spans(), 0.015, 0.01) {
            chart.draw_series(std::iter::once(PathElement::new(dash, BLACK.stroke_width(line))))?;
        }
    }

    match panel.field {
        Field::Joint => {
            label(&mut chart, &extent, "Globally Normalized", (0.0, 6.0), &WHITE, dpi)?;
        },
        Field::Likelihood => {
            arrow(&mut chart, &extent, (0.0, -1.5), (0.0, 4.0), pt(2., dpi))?;
            label(&mut chart, &extent, "Normalized Vertically", (0.0, 5.0), &WHITE, dpi)?;
            draw_prior(&mut chart, &extent, theta_range, prior_1d, config.params.mu_theta, dpi)?;
        },
        Field::Posterior => {
            arrow(&mut chart, &extent, (-1.5, 1.0), (1.5, 1.0), pt(1.5, dpi))?;
            label(&mut chart, &extent, "Normalized Horizontally", (0.0, 1.3), &WHITE, dpi)?;
        },
        Field::Ratio => {
            label(&mut chart, &extent, "Normalized by Both Marginals", (0.0, 6.0), &WHITE, dpi)?;
        },
        Field::Prior => { }
    }
    Ok(())
}

// Each cell between four neighbouring nodes takes the band of their mean value.
fn draw_contour(
    chart : &mut PanelChart<'_, '_>,
    field : &nalgebra::DMatrix<f64>,
    theta_range : &[f64],
    x_range : &[f64],
    n_levels : usize
) -> Result<(), Box<dyn Error>> {
    let (lo, hi) = calc::finite_range(field).unwrap_or((0.0, 0.0));
    let levels = Levels::new(lo, hi, n_levels);
    tracing::debug!(lo, hi, levels = levels.count(), "contour range");
    let cells = (0..x_range.len()-1).flat_map(|i| (0..theta_range.len()-1).map(move |j| (i, j) ));
    chart.draw_series(cells.map(|(i, j)| {
        let v = (field[(i, j)] + field[(i+1, j)] + field[(i, j+1)] + field[(i+1, j+1)]) / 4.0;
        Rectangle::new(
            [(theta_range[j], x_range[i]), (theta_range[j+1], x_range[i+1])],
            levels.color(v).filled()
        )
    }))?;
    Ok(())
}

fn label(
    chart : &mut PanelChart<'_, '_>,
    extent : &Extent,
    text : &str,
    at : (f64, f64),
    color : &RGBColor,
    dpi : u32
) -> Result<(), Box<dyn Error>> {
    if !extent.contains(at) {
        return Ok(());
    }
    let style = (font::FAMILY, pt(9., dpi))
        .into_font()
        .style(FontStyle::Bold)
        .color(color)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(std::iter::once(Text::new(text.to_string(), at, style)))?;
    Ok(())
}

fn arrow(
    chart : &mut PanelChart<'_, '_>,
    extent : &Extent,
    from : (f64, f64),
    to : (f64, f64),
    width : u32
) -> Result<(), Box<dyn Error>> {
    if !extent.contains(from) || !extent.contains(to) {
        return Ok(());
    }
    for part in double_arrow(from, to, extent.spans(), 0.03) {
        chart.draw_series(std::iter::once(PathElement::new(part, WHITE.stroke_width(width))))?;
    }
    Ok(())
}

/// Prior density values marked on the secondary axis: multiples of a 1-2-5
/// step chosen so that at most `n` ticks fit in [0, top].
pub fn prior_ticks(top : f64, n : usize) -> Vec<f64> {
    if !(top > 0.0) || n < 2 {
        return Vec::new();
    }
    let raw = top / (n - 1) as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let step = [1.0f64, 2.0, 5.0, 10.0].iter()
        .map(|m| m * mag)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * mag);
    (0u32..).map(|k| k as f64 * step ).take_while(|t| *t <= top ).collect()
}

// The prior is a density over theta, so it is drawn on its own vertical scale
// spanning the observation axis, with 20% headroom above its maximum. Its axis
// is marked in red along the right edge of the panel.
fn draw_prior(
    chart : &mut PanelChart<'_, '_>,
    extent : &Extent,
    theta_range : &[f64],
    prior_1d : &[f64],
    mu_theta : f64,
    dpi : u32
) -> Result<(), Box<dyn Error>> {
    let top = prior_1d.iter().cloned().fold(0.0, f64::max) * 1.2;
    if !(top > 0.0) {
        return Ok(());
    }
    let scale = |p : f64| extent.x.0 + p / top * (extent.x.1 - extent.x.0);
    let pts : Vec<(f64, f64)> = theta_range.iter().zip(prior_1d.iter()).map(|(t, p)| (*t, scale(*p)) ).collect();
    chart
        .draw_series(LineSeries::new(pts, RED.stroke_width(pt(2., dpi))))?;
    label(chart, extent, "Prior", (mu_theta, scale(top / 1.2 * 1.05)), &RED, dpi)?;

    let (spans, right) = (extent.spans(), extent.theta.1);
    let tick_style = (font::FAMILY, pt(8., dpi))
        .into_font()
        .color(&RED)
        .pos(Pos::new(HPos::Right, VPos::Center));
    for t in prior_ticks(top, 5) {
        let y = scale(t);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(right - 0.015 * spans.0, y), (right, y)],
            RED.stroke_width(pt(1., dpi))
        )))?;
        chart.draw_series(std::iter::once(Text::new(format!("{:.2}", t), (right - 0.02 * spans.0, y), tick_style.clone())))?;
    }
    let axis_style = (font::FAMILY, pt(10., dpi))
        .into_font()
        .transform(FontTransform::Rotate270)
        .color(&RED)
        .pos(Pos::new(HPos::Center, VPos::Center));
    let at = (right - 0.12 * spans.0, extent.x.0 + 0.5 * spans.1);
    chart.draw_series(std::iter::once(Text::new(String::from("Prior Density P(θ)"), at, axis_style)))?;
    Ok(())
}
