use super::projection::{Extent, MERCATOR_HALF_WORLD, mercator_to_world_px};
use crate::config::BasemapConfig;
use crate::constants::{MAX_TILE_ZOOM, TILE_SIZE};
use crate::error::{Result, StoryError};

use image::{RgbImage, imageops};
use log::{debug, info};
use std::ops::RangeInclusive;

/// Upper bound on tiles fetched for one image
const MAX_TILES: usize = 100;

/// Slippy-map tile server
#[derive(Debug, Clone)]
pub struct TileSource {
    pub url_template: String,
    pub user_agent: String,
}

impl TileSource {
    pub fn from_config(config: &BasemapConfig) -> Option<Self> {
        config.enabled.then(|| Self {
            url_template: config.url_template.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// Zoom whose native resolution is closest to (not coarser than) what a
/// `width_px` wide image of `extent` needs, reduced until the tile count fits
pub fn choose_zoom(extent: &Extent, width_px: u32) -> u8 {
    let meters_per_px = extent.width() / width_px.max(1) as f64;
    let world_m = 2.0 * MERCATOR_HALF_WORLD;
    let ideal = (world_m / (TILE_SIZE as f64 * meters_per_px)).log2().ceil();
    let mut zoom = if ideal.is_finite() {
        ideal.clamp(0.0, MAX_TILE_ZOOM as f64) as u8
    } else {
        0
    };
    while zoom > 0 && tile_count(extent, zoom) > MAX_TILES {
        zoom -= 1;
    }
    zoom
}

/// Tile columns and rows covering `extent` at `zoom`
pub fn tile_range(extent: &Extent, zoom: u8) -> (RangeInclusive<u32>, RangeInclusive<u32>) {
    let max_index = (1u32 << zoom) - 1;
    let (x0, y0) = mercator_to_world_px(extent.min_x, extent.max_y, zoom, TILE_SIZE);
    let (x1, y1) = mercator_to_world_px(extent.max_x, extent.min_y, zoom, TILE_SIZE);
    let to_tile = |px: f64| ((px / TILE_SIZE as f64).floor().max(0.0) as u32).min(max_index);
    (to_tile(x0)..=to_tile(x1), to_tile(y0)..=to_tile(y1))
}

fn tile_count(extent: &Extent, zoom: u8) -> usize {
    let (xs, ys) = tile_range(extent, zoom);
    xs.count() * ys.count()
}

/// Downloads the tiles covering `extent` and returns them cropped to the
/// extent and resampled to `width` x `height`
///
/// # Errors
/// Any failed request or undecodable tile aborts the basemap
pub fn fetch_basemap(
    source: &TileSource,
    extent: &Extent,
    width: u32,
    height: u32,
) -> Result<RgbImage> {
    let zoom = choose_zoom(extent, width);
    let (xs, ys) = tile_range(extent, zoom);
    info!(
        "Fetching {} basemap tiles at zoom {}",
        xs.clone().count() * ys.clone().count(),
        zoom
    );

    let client = reqwest::blocking::Client::builder()
        .user_agent(source.user_agent.as_str())
        .build()?;

    let (x_first, y_first) = (*xs.start(), *ys.start());
    let mut mosaic = RgbImage::new(
        xs.clone().count() as u32 * TILE_SIZE,
        ys.clone().count() as u32 * TILE_SIZE,
    );

    for ty in ys.clone() {
        for tx in xs.clone() {
            let url = source.tile_url(zoom, tx, ty);
            debug!("GET {url}");
            let bytes = client.get(&url).send()?.error_for_status()?.bytes()?;
            let tile = image::load_from_memory(&bytes)
                .map_err(|e| StoryError::Basemap(format!("tile {url}: {e}")))?
                .to_rgb8();
            imageops::replace(
                &mut mosaic,
                &tile,
                ((tx - x_first) * TILE_SIZE) as i64,
                ((ty - y_first) * TILE_SIZE) as i64,
            );
        }
    }

    Ok(crop_to_extent(&mosaic, extent, zoom, (x_first, y_first), width, height))
}

/// Cuts the extent out of a tile mosaic whose top-left tile is `origin`
pub fn crop_to_extent(
    mosaic: &RgbImage,
    extent: &Extent,
    zoom: u8,
    origin: (u32, u32),
    width: u32,
    height: u32,
) -> RgbImage {
    let (wx0, wy0) = mercator_to_world_px(extent.min_x, extent.max_y, zoom, TILE_SIZE);
    let (wx1, wy1) = mercator_to_world_px(extent.max_x, extent.min_y, zoom, TILE_SIZE);
    let ox = (origin.0 * TILE_SIZE) as f64;
    let oy = (origin.1 * TILE_SIZE) as f64;

    let x = ((wx0 - ox).floor().max(0.0) as u32).min(mosaic.width().saturating_sub(1));
    let y = ((wy0 - oy).floor().max(0.0) as u32).min(mosaic.height().saturating_sub(1));
    let w = ((wx1 - wx0).ceil().max(1.0) as u32).min(mosaic.width() - x);
    let h = ((wy1 - wy0).ceil().max(1.0) as u32).min(mosaic.height() - y);

    let cropped = imageops::crop_imm(mosaic, x, y, w, h).to_image();
    imageops::resize(&cropped, width, height, imageops::FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::projection::lonlat_to_mercator;
    use image::Rgb;

    fn chicago() -> Extent {
        Extent::from_points([
            lonlat_to_mercator(-87.94, 41.64),
            lonlat_to_mercator(-87.52, 42.02),
        ])
        .unwrap()
    }

    #[test]
    fn test_tile_url() {
        let source = TileSource {
            url_template: "https://tiles.example.com/{z}/{x}/{y}.png".to_string(),
            user_agent: "test".to_string(),
        };
        assert_eq!(
            source.tile_url(11, 524, 761),
            "https://tiles.example.com/11/524/761.png"
        );
    }

    #[test]
    fn test_disabled_source() {
        let config = BasemapConfig {
            enabled: false,
            ..BasemapConfig::default()
        };
        assert!(TileSource::from_config(&config).is_none());
        assert!(TileSource::from_config(&BasemapConfig::default()).is_some());
    }

    #[test]
    fn test_choose_zoom_bounded_by_tile_count() {
        let extent = chicago();
        let zoom = choose_zoom(&extent, 2000);
        assert!(zoom >= 10 && zoom <= MAX_TILE_ZOOM);
        assert!(tile_count(&extent, zoom) <= MAX_TILES);
    }

    #[test]
    fn test_tile_range_covers_extent() {
        let (xs, ys) = tile_range(&chicago(), 10);
        assert!(xs.contains(&262));
        assert!(ys.contains(&380));
    }

    #[test]
    fn test_crop_to_extent_size() {
        let extent = chicago();
        let zoom = 10;
        let (xs, ys) = tile_range(&extent, zoom);
        let mosaic = RgbImage::from_pixel(
            xs.clone().count() as u32 * TILE_SIZE,
            ys.clone().count() as u32 * TILE_SIZE,
            Rgb([10, 20, 30]),
        );
        let out = crop_to_extent(&mosaic, &extent, zoom, (*xs.start(), *ys.start()), 300, 400);
        assert_eq!(out.dimensions(), (300, 400));
        assert_eq!(*out.get_pixel(150, 200), Rgb([10, 20, 30]));
    }
}
