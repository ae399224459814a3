use plotters::style::RGBColor;

// Viridis sampled at 0.0, 0.1, ..., 1.0
const VIRIDIS : [(u8, u8, u8); 11] = [
    (0x44, 0x01, 0x54),
    (0x48, 0x24, 0x75),
    (0x41, 0x44, 0x87),
    (0x35, 0x5f, 0x8d),
    (0x2a, 0x78, 0x8e),
    (0x21, 0x91, 0x8c),
    (0x22, 0xa8, 0x84),
    (0x44, 0xbf, 0x70),
    (0x7a, 0xd1, 0x51),
    (0xbd, 0xdf, 0x26),
    (0xfd, 0xe7, 0x25)
];

fn lerp(a : (u8, u8, u8), b : (u8, u8, u8), t : f64) -> RGBColor {
    let mix = |a : u8, b : u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Viridis colormap on [0, 1]; values outside are clamped, NaN maps to the low end.
pub fn viridis(t : f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let pos = t * (VIRIDIS.len() - 1) as f64;
    let lo = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    lerp(VIRIDIS[lo], VIRIDIS[lo+1], pos - lo as f64)
}

/// Equally-spaced filled contour bands between the smallest and largest value
/// of one field. Each band is painted with a single colormap color, the lowest
/// band at the bottom of the colormap and the highest at its top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    lo : f64,
    hi : f64,
    n : usize
}

impl Levels {

    pub fn new(lo : f64, hi : f64, n : usize) -> Self {
        Self { lo, hi, n : n.max(1) }
    }

    pub fn count(&self) -> usize {
        self.n
    }

    /// Band holding v. A flat field (hi == lo) puts everything in the first band.
    pub fn band(&self, v : f64) -> usize {
        let span = self.hi - self.lo;
        if !(span > 0.0) || v.is_nan() {
            return 0;
        }
        let b = ((v - self.lo) / span * self.n as f64).floor();
        if b < 0.0 {
            0
        } else {
            (b as usize).min(self.n - 1)
        }
    }

    pub fn color(&self, v : f64) -> RGBColor {
        if self.n == 1 {
            return viridis(0.0);
        }
        viridis(self.band(v) as f64 / (self.n - 1) as f64)
    }

}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn viridis_endpoints() {
        assert_eq!(viridis(0.0), RGBColor(0x44, 0x01, 0x54));
        assert_eq!(viridis(1.0), RGBColor(0xfd, 0xe7, 0x25));
        assert_eq!(viridis(0.5), RGBColor(0x21, 0x91, 0x8c));
        assert_eq!(viridis(-3.0), viridis(0.0));
        assert_eq!(viridis(f64::NAN), viridis(0.0));
        assert_eq!(viridis(7.0), viridis(1.0));
    }

    #[test]
    fn bands_cover_range() {
        let levels = Levels::new(0.0, 1.0, 50);
        assert_eq!(levels.band(0.0), 0);
        assert_eq!(levels.band(1.0), 49);
        assert_eq!(levels.band(0.5), 25);
        assert_eq!(levels.band(-1.0), 0);
        assert_eq!(levels.color(1.0), viridis(1.0));
        assert_eq!(levels.color(0.0), viridis(0.0));
    }

    #[test]
    fn flat_field_single_band() {
        let levels = Levels::new(2.0, 2.0, 50);
        assert_eq!(levels.band(2.0), 0);
        assert_eq!(Levels::new(0.0, 1.0, 0).count(), 1);
    }

}
