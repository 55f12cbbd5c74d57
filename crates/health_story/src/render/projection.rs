use std::f64::consts::PI;

/// Half the Web Mercator world width in meters
pub const MERCATOR_HALF_WORLD: f64 = 20_037_508.342_789_244;
const EARTH_RADIUS_M: f64 = 6_378_137.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// lon/lat (degrees) to Web Mercator meters (EPSG:3857)
pub fn lonlat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Web Mercator meters to global pixel coordinates at `zoom`
pub fn mercator_to_world_px(x: f64, y: f64, zoom: u8, tile_size: u32) -> (f64, f64) {
    let world = tile_size as f64 * 2f64.powi(zoom as i32);
    let px = (x + MERCATOR_HALF_WORLD) / (2.0 * MERCATOR_HALF_WORLD) * world;
    let py = (MERCATOR_HALF_WORLD - y) / (2.0 * MERCATOR_HALF_WORLD) * world;
    (px, py)
}

/// Axis-aligned bounds in projected units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn from_points<I: IntoIterator<Item = (f64, f64)>>(points: I) -> Option<Self> {
        points.into_iter().fold(None, |acc, (x, y)| {
            Some(match acc {
                None => Extent {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                Some(e) => Extent {
                    min_x: e.min_x.min(x),
                    min_y: e.min_y.min(y),
                    max_x: e.max_x.max(x),
                    max_y: e.max_y.max(y),
                },
            })
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grows each side by `ratio` of the larger dimension
    pub fn padded(&self, ratio: f64) -> Self {
        let pad = self.width().max(self.height()).max(1.0) * ratio;
        Extent {
            min_x: self.min_x - pad,
            min_y: self.min_y - pad,
            max_x: self.max_x + pad,
            max_y: self.max_y + pad,
        }
    }

    /// Expands the shorter side so the extent matches `aspect` (w / h)
    pub fn with_aspect(&self, aspect: f64) -> Self {
        let (cx, cy) = (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        );
        let (mut w, mut h) = (self.width().max(f64::EPSILON), self.height().max(f64::EPSILON));
        if w / h > aspect {
            h = w / aspect;
        } else {
            w = h * aspect;
        }
        Extent {
            min_x: cx - w / 2.0,
            min_y: cy - h / 2.0,
            max_x: cx + w / 2.0,
            max_y: cy + h / 2.0,
        }
    }
}

/// Maps an extent onto a pixel frame (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub extent: Extent,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Fits `extent` into the frame; the extent is widened to the frame's
    /// aspect so both axes share one scale
    pub fn fit(extent: Extent, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            extent: extent.with_aspect(width / height),
            left,
            top,
            width,
            height,
        }
    }

    pub fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        let e = &self.extent;
        let px = self.left + (x - e.min_x) / e.width() * self.width;
        let py = self.top + (e.max_y - y) / e.height() * self.height;
        (px, py)
    }
}
