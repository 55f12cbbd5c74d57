pub mod basemap;
pub mod canvas;
pub mod charts;
pub mod colors;
pub mod poster;
pub mod projection;
pub mod ticks;

pub use basemap::TileSource;
pub use canvas::{Colors, Renderer};
pub use charts::{Bar, render_bar_chart, render_histogram, top_bars};
pub use poster::{CentroidLabel, centroid_labels, render_poster};

use crate::constants::DPI;

/// Typographic points to px at the output resolution
pub fn pt(points: f64) -> f64 {
    points * DPI / 72.0
}
