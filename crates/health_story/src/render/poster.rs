use super::basemap::{TileSource, fetch_basemap};
use super::canvas::{Colors, Renderer};
use super::colors::{ColorRamp, normalize};
use super::projection::{Extent, Viewport, lonlat_to_mercator};
use super::ticks::{format_tick, nice_step, nice_ticks};
use super::pt;
use crate::constants::{DPI, POSTER_SIZE_IN};
use crate::error::{Result, StoryError};
use crate::join::JoinedAreas;
use crate::stats::value_range;

use geo::{MultiPolygon, Polygon};
use log::{debug, info};
use std::path::Path;

/// Value label anchored at an area's centroid
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidLabel {
    pub key: Option<String>,
    pub lon: f64,
    pub lat: f64,
    pub text: String,
}

/// One label per area with a value, formatted to one decimal.
/// Areas without a value (or without a centroid) get none.
pub fn centroid_labels(joined: &JoinedAreas) -> Vec<CentroidLabel> {
    joined
        .areas
        .iter()
        .filter_map(|area| {
            let value = area.value?;
            let centroid = area.boundary.centroid()?;
            Some(CentroidLabel {
                key: area.boundary.key.clone(),
                lon: centroid.x(),
                lat: centroid.y(),
                text: format!("{:.1}", value),
            })
        })
        .collect()
}

type Ring = Vec<(f64, f64)>;

const LEGEND_TICKS: usize = 5;

/// Exterior and interior rings of every polygon, in Web Mercator meters
fn project_shape(shape: &MultiPolygon<f64>) -> Vec<(Ring, Vec<Ring>)> {
    shape
        .0
        .iter()
        .map(|polygon: &Polygon<f64>| {
            let project = |ring: &geo::LineString<f64>| -> Ring {
                ring.0.iter().map(|c| lonlat_to_mercator(c.x, c.y)).collect()
            };
            (
                project(polygon.exterior()),
                polygon.interiors().iter().map(project).collect(),
            )
        })
        .collect()
}

/// Pixel layout of the poster
#[derive(Debug, Clone, Copy)]
struct PosterLayout {
    width: u32,
    height: u32,
    map_left: f64,
    map_top: f64,
    map_width: f64,
    map_height: f64,
}

impl PosterLayout {
    fn new() -> Self {
        let width = (POSTER_SIZE_IN.0 * DPI) as u32;
        let height = (POSTER_SIZE_IN.1 * DPI) as u32;
        let margin = pt(24.0);
        let title_band = pt(48.0);
        let legend_band = pt(72.0);
        Self {
            width,
            height,
            map_left: margin,
            map_top: title_band,
            map_width: width as f64 - margin - legend_band,
            map_height: height as f64 - title_band - margin,
        }
    }
}

/// Renders the static choropleth poster
///
/// # Errors
/// Fails when the boundaries carry no coordinates, when the basemap cannot be
/// fetched, or when the image cannot be written
pub fn render_poster(
    joined: &JoinedAreas,
    basemap: Option<&TileSource>,
    output_path: &Path,
) -> Result<()> {
    let layout = PosterLayout::new();
    let mut renderer = Renderer::new(layout.width, layout.height);

    let shapes: Vec<_> = joined
        .areas
        .iter()
        .map(|area| project_shape(&area.boundary.shape))
        .collect();

    let extent = Extent::from_points(
        shapes
            .iter()
            .flatten()
            .flat_map(|(exterior, _)| exterior.iter().copied()),
    )
    .ok_or_else(|| StoryError::Geometry {
        message: "boundaries contain no coordinates".to_string(),
    })?
    .padded(0.02);

    let viewport = Viewport::fit(
        extent,
        layout.map_left,
        layout.map_top,
        layout.map_width,
        layout.map_height,
    );

    // 1. basemap
    if let Some(source) = basemap {
        let tiles = fetch_basemap(
            source,
            &viewport.extent,
            layout.map_width.round() as u32,
            layout.map_height.round() as u32,
        )?;
        renderer.blit(
            &tiles,
            layout.map_left.round() as i64,
            layout.map_top.round() as i64,
        );
    }

    // 2. choropleth
    let range = value_range(joined.values());
    draw_choropleth(&mut renderer, joined, &shapes, &viewport, range);

    // 3. centroid labels
    let labels = centroid_labels(joined);
    for label in &labels {
        let (x, y) = lonlat_to_mercator(label.lon, label.lat);
        let (px, py) = viewport.to_px(x, y);
        renderer.draw_text_centered(px, py, &label.text, pt(6.0), Colors::BLACK, true);
    }
    debug!("Placed {} centroid labels", labels.len());

    // 4. title and legend
    renderer.draw_text_centered(
        layout.width as f64 / 2.0,
        layout.map_top / 2.0,
        &format!("Chicago Health Metric: {}", joined.metric),
        pt(16.0),
        Colors::BLACK,
        false,
    );
    if let Some((lo, hi)) = range {
        draw_colorbar(&mut renderer, &layout, lo, hi);
    }

    renderer.save(output_path)?;
    info!("Poster written to {}", output_path.display());
    Ok(())
}

/// Fills each area with its Reds class and outlines every ring. Interior
/// rings stay unpainted so enclaves drawn earlier keep their own fill.
fn draw_choropleth(
    renderer: &mut Renderer,
    joined: &JoinedAreas,
    shapes: &[Vec<(Ring, Vec<Ring>)>],
    viewport: &Viewport,
    range: Option<(f64, f64)>,
) {
    let border = pt(0.8);
    let to_px = |ring: &Ring| -> Ring { ring.iter().map(|&(x, y)| viewport.to_px(x, y)).collect() };
    for (area, polygons) in joined.areas.iter().zip(shapes) {
        let fill = match (area.value, range) {
            (Some(v), Some((lo, hi))) => Some(ColorRamp::REDS.sample(normalize(v, lo, hi))),
            _ => None,
        };
        for (exterior, interiors) in polygons {
            let exterior_px = to_px(exterior);
            let interiors_px: Vec<Ring> = interiors.iter().map(to_px).collect();
            if let Some(color) = fill {
                renderer.fill_polygon_with_holes(&exterior_px, &interiors_px, color);
            }
            renderer.draw_ring(&exterior_px, border, Colors::BLACK);
            for interior_px in &interiors_px {
                renderer.draw_ring(interior_px, border, Colors::BLACK);
            }
        }
    }
}

/// Vertical color bar with value ticks to the right of the map
fn draw_colorbar(renderer: &mut Renderer, layout: &PosterLayout, lo: f64, hi: f64) {
    let x = layout.map_left + layout.map_width + pt(10.0);
    let bar_width = pt(14.0);
    let top = layout.map_top + layout.map_height * 0.1;
    let height = layout.map_height * 0.8;
    let bottom = top + height;

    for row in 0..height.round() as u32 {
        let t = 1.0 - row as f64 / height;
        renderer.draw_rect(x, top + row as f64, bar_width, 1.0, ColorRamp::REDS.sample(t));
    }
    renderer.draw_rect_outline(x, top, bar_width, height, Colors::BLACK);

    let step = nice_step(lo, hi, LEGEND_TICKS);
    for tick in nice_ticks(lo, hi, LEGEND_TICKS) {
        let y = bottom - normalize(tick, lo, hi) * height;
        renderer.draw_line(
            (x + bar_width, y),
            (x + bar_width + pt(3.5), y),
            pt(0.8),
            Colors::BLACK,
        );
        let label = format_tick(tick, step);
        let (_, text_h) = renderer.text_size(&label, pt(10.0));
        renderer.draw_text(
            x + bar_width + pt(5.0),
            y - text_h / 2.0,
            &label,
            pt(10.0),
            Colors::BLACK,
        );
    }
}
