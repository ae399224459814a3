use num_traits::Float;
use nalgebra::*;

/// Evenly-spaced sequence of n points over the closed interval [start, stop].
/// Each point is computed as start + i * step, and the last point is set
/// to stop exactly so the range endpoints are always reproduced.
pub fn linspace(start : f64, stop : f64, n : usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut pts : Vec<f64> = (0..n).map(|i| i as f64 * step + start ).collect();
            pts[n-1] = stop;
            pts
        }
    }
}

/// Integrates the sampled curve y(x) with the trapezoidal rule, summing
/// (b - a) * (f(a) + f(b)) / 2 over each consecutive pair of nodes.
/// Slices of different lengths are integrated over their common prefix;
/// fewer than two nodes integrate to zero. Terms are accumulated left to
/// right, so on long rows the result can differ in the last few bits from
/// a pairwise summation of the same terms.
pub fn trapezoid<F>(y : &[F], x : &[F]) -> F
where
    F : Float
{
    let two = F::one() + F::one();
    y.windows(2).zip(x.windows(2)).fold(F::zero(), |area, (fy, fx)| {
        area + (fx[1] - fx[0]) * (fy[1] + fy[0]) / two
    })
}

/// Trapezoidal integral of each matrix row against the column nodes x,
/// yielding one value per row.
pub fn trapezoid_rows(m : &DMatrix<f64>, x : &[f64]) -> DVector<f64> {
    let mut row_buf = Vec::with_capacity(m.ncols());
    DVector::from_iterator(m.nrows(), m.row_iter().map(|row| {
        row_buf.clear();
        row_buf.extend(row.iter().copied());
        trapezoid(&row_buf[..], x)
    }))
}

// Verifies x[i] < x[i+1] for all consecutive pairs. NaN entries fail the test.
pub fn strictly_increasing(x : &[f64]) -> bool {
    x.windows(2).all(|w| w[0] < w[1] )
}

/// Row and column of the largest entry of m, scanning rows in order and
/// keeping the first occurrence of ties. NaN entries are skipped.
pub fn argmax(m : &DMatrix<f64>) -> Option<(usize, usize)> {
    let mut best : Option<(usize, usize, f64)> = None;
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            let v = m[(i, j)];
            if v.is_nan() {
                continue;
            }
            match best {
                Some((_, _, b)) if b >= v => { },
                _ => best = Some((i, j, v))
            }
        }
    }
    best.map(|(i, j, _)| (i, j) )
}

/// Smallest and largest finite entries of the matrix.
pub fn finite_range(m : &DMatrix<f64>) -> Option<(f64, f64)> {
    m.iter().filter(|v| v.is_finite() ).fold(None, |range, v| {
        match range {
            Some((lo, hi)) => Some((f64::min(lo, *v), f64::max(hi, *v))),
            None => Some((*v, *v))
        }
    })
}
