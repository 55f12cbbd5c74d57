use image::Rgb;

/// Sequential color ramp, linearly interpolated between stops
#[derive(Debug, Clone, Copy)]
pub struct ColorRamp {
    stops: &'static [[u8; 3]],
}

impl ColorRamp {
    /// ColorBrewer Reds (9 classes), used by the poster
    pub const REDS: ColorRamp = ColorRamp {
        stops: &[
            [255, 245, 240],
            [254, 224, 210],
            [252, 187, 161],
            [252, 146, 114],
            [251, 106, 74],
            [239, 59, 44],
            [203, 24, 29],
            [165, 15, 21],
            [103, 0, 13],
        ],
    };

    /// ColorBrewer YlOrRd (6 classes), used by the interactive map
    pub const YL_OR_RD: ColorRamp = ColorRamp {
        stops: &[
            [255, 255, 178],
            [254, 217, 118],
            [254, 178, 76],
            [253, 141, 60],
            [240, 59, 32],
            [189, 0, 38],
        ],
    };

    /// Color at `t` in 0..=1 (clamped)
    pub fn sample(&self, t: f64) -> Rgb<u8> {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let last = self.stops.len() - 1;
        let pos = t * last as f64;
        let i = (pos.floor() as usize).min(last);
        if i == last {
            return Rgb(self.stops[last]);
        }
        let frac = pos - i as f64;
        let (a, b) = (self.stops[i], self.stops[i + 1]);
        Rgb([
            lerp(a[0], b[0], frac),
            lerp(a[1], b[1], frac),
            lerp(a[2], b[2], frac),
        ])
    }

    /// Stop color for class `i` of a classed map
    pub fn class_color(&self, i: usize) -> Rgb<u8> {
        Rgb(self.stops[i.min(self.stops.len() - 1)])
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

/// Position of `value` inside `lo..=hi`; a zero-width range maps to 0
pub fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `#rrggbb` for HTML output
pub fn to_hex(color: Rgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

/// Equal-width class breaks over a value range
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBreaks {
    /// `classes + 1` ascending edges
    pub edges: Vec<f64>,
}

impl ClassBreaks {
    pub fn equal_width(lo: f64, hi: f64, classes: usize) -> Self {
        let classes = classes.max(1);
        let step = (hi - lo) / classes as f64;
        let edges = (0..=classes)
            .map(|i| if i == classes { hi } else { lo + step * i as f64 })
            .collect();
        Self { edges }
    }

    pub fn classes(&self) -> usize {
        self.edges.len() - 1
    }

    /// Class index of `value`; the top edge belongs to the last class
    pub fn class_of(&self, value: f64) -> usize {
        let last = self.classes() - 1;
        self.edges[1..self.edges.len() - 1]
            .iter()
            .position(|&edge| value < edge)
            .unwrap_or(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(ColorRamp::REDS.sample(0.0), Rgb([255, 245, 240]));
        assert_eq!(ColorRamp::REDS.sample(1.0), Rgb([103, 0, 13]));
        assert_eq!(ColorRamp::REDS.sample(7.0), Rgb([103, 0, 13]));
        assert_eq!(ColorRamp::REDS.sample(f64::NAN), Rgb([255, 245, 240]));
    }

    #[test]
    fn test_ramp_midpoint_interpolates() {
        // halfway between the first two YlOrRd stops
        let c = ColorRamp::YL_OR_RD.sample(0.1);
        assert_eq!(c, Rgb([255, 236, 148]));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalize(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(normalize(3.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn test_hex() {
        assert_eq!(to_hex(Rgb([189, 0, 38])), "#bd0026");
    }

    #[test]
    fn test_class_breaks() {
        let breaks = ClassBreaks::equal_width(0.0, 12.0, 6);
        assert_eq!(breaks.classes(), 6);
        assert_eq!(breaks.edges, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
        assert_eq!(breaks.class_of(0.0), 0);
        assert_eq!(breaks.class_of(1.99), 0);
        assert_eq!(breaks.class_of(2.0), 1);
        assert_eq!(breaks.class_of(12.0), 5);
        assert_eq!(breaks.class_of(99.0), 5);
    }

    #[test]
    fn test_class_breaks_single_value() {
        let breaks = ClassBreaks::equal_width(4.0, 4.0, 6);
        assert_eq!(breaks.class_of(4.0), 5);
    }
}
