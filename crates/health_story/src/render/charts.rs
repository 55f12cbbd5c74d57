use super::canvas::{Colors, Renderer};
use super::pt;
use super::ticks::{format_tick, nice_step, nice_ticks};
use crate::constants::{CHART_SIZE_IN, DPI, HISTOGRAM_BINS, TOP_N};
use crate::error::{Result, StoryError};
use crate::indicators::IndicatorTable;
use crate::join::IndicatorColumns;
use crate::stats::{Histogram, value_range};

use log::{debug, info};
use std::path::Path;

const AXIS_TICKS: usize = 8;
const BAR_FILL: f64 = 0.8;
const DOMAIN_MARGIN: f64 = 0.05;

/// Plotting area inside a chart, in px
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotFrame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotFrame {
    fn for_chart(width: u32, height: u32) -> Self {
        let (left, right, top, bottom) = (pt(64.0), pt(18.0), pt(36.0), pt(48.0));
        Self {
            left,
            top,
            width: width as f64 - left - right,
            height: height as f64 - top - bottom,
        }
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// Linear map from a value domain onto a pixel span (which may run backwards)
#[derive(Debug, Clone, Copy, PartialEq)]
struct LinearScale {
    lo: f64,
    hi: f64,
    from_px: f64,
    to_px: f64,
}

impl LinearScale {
    fn map(&self, value: f64) -> f64 {
        self.from_px + (value - self.lo) / (self.hi - self.lo) * (self.to_px - self.from_px)
    }
}

fn chart_size() -> (u32, u32) {
    ((CHART_SIZE_IN.0 * DPI) as u32, (CHART_SIZE_IN.1 * DPI) as u32)
}

/// Horizontal bar in the top-N chart
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Bars for the given rows, in row order, labeled by the area identifier
pub fn top_bars(
    table: &IndicatorTable,
    columns: &IndicatorColumns,
    values: &[Option<f64>],
    rows: &[usize],
) -> Vec<Bar> {
    rows.iter()
        .filter_map(|&row| {
            let value = values.get(row).copied().flatten()?;
            Some(Bar {
                label: table.cell(row, columns.key).trim().to_string(),
                value,
            })
        })
        .collect()
}

/// Value axis of the bar chart: always includes zero, padded past the data
pub fn bar_domain(bars: &[Bar]) -> (f64, f64) {
    let (lo, hi) = value_range(bars.iter().map(|b| b.value)).unwrap_or((0.0, 1.0));
    let (lo, hi) = (lo.min(0.0), hi.max(0.0));
    let span = if hi > lo { hi - lo } else { 1.0 };
    let lo = if lo < 0.0 { lo - span * DOMAIN_MARGIN } else { lo };
    (lo, hi + span * DOMAIN_MARGIN)
}

/// Axes domains of the histogram: (x, y)
pub fn histogram_domain(hist: &Histogram) -> ((f64, f64), (f64, f64)) {
    let first = hist.edges.first().copied().unwrap_or(0.0);
    let last = hist.edges.last().copied().unwrap_or(1.0);
    let pad = (last - first) * DOMAIN_MARGIN;
    let top = (hist.max_count().max(1) as f64) * (1.0 + DOMAIN_MARGIN);
    ((first - pad, last + pad), (0.0, top))
}

/// Renders the top-N horizontal bar chart, largest value on top
pub fn render_bar_chart(bars: &[Bar], metric: &str, output_path: &Path) -> Result<()> {
    let (width, height) = chart_size();
    let mut renderer = Renderer::new(width, height);
    let frame = PlotFrame::for_chart(width, height);

    let (lo, hi) = bar_domain(bars);
    let x = LinearScale {
        lo,
        hi,
        from_px: frame.left,
        to_px: frame.right(),
    };

    let band = frame.height / bars.len().max(1) as f64;
    let thickness = band * BAR_FILL;
    let zero = x.map(0.0);
    for (i, bar) in bars.iter().enumerate() {
        let cy = frame.top + band * (i as f64 + 0.5);
        let end = x.map(bar.value);
        renderer.draw_rect(
            zero.min(end),
            cy - thickness / 2.0,
            (end - zero).abs(),
            thickness,
            Colors::BAR_BLUE,
        );
        draw_y_tick(&mut renderer, &frame, cy, &bar.label);
    }

    draw_x_axis(&mut renderer, &frame, &x);
    renderer.draw_rect_outline(frame.left, frame.top, frame.width, frame.height, Colors::BLACK);
    renderer.draw_text_centered(
        frame.center_x(),
        frame.bottom() + pt(32.0),
        metric,
        pt(10.0),
        Colors::BLACK,
        false,
    );
    renderer.draw_text_centered(
        frame.center_x(),
        frame.top / 2.0,
        &format!("Top {TOP_N} Areas – {metric}"),
        pt(12.0),
        Colors::BLACK,
        false,
    );

    renderer.save(output_path)?;
    info!("Bar chart written to {}", output_path.display());
    Ok(())
}

/// Renders the distribution of `values` as an equal-width histogram
///
/// # Errors
/// Returns [`StoryError::EmptyMetric`] when `values` is empty
pub fn render_histogram(values: &[f64], metric: &str, output_path: &Path) -> Result<()> {
    let hist = Histogram::from_values(values, HISTOGRAM_BINS).ok_or_else(|| {
        StoryError::EmptyMetric {
            column: metric.to_string(),
        }
    })?;
    debug!("Histogram edges: {:?}", hist.edges);

    let (width, height) = chart_size();
    let mut renderer = Renderer::new(width, height);
    let frame = PlotFrame::for_chart(width, height);

    let ((x_lo, x_hi), (y_lo, y_hi)) = histogram_domain(&hist);
    let x = LinearScale {
        lo: x_lo,
        hi: x_hi,
        from_px: frame.left,
        to_px: frame.right(),
    };
    let y = LinearScale {
        lo: y_lo,
        hi: y_hi,
        from_px: frame.bottom(),
        to_px: frame.top,
    };

    for (edge, &count) in hist.edges.windows(2).zip(&hist.counts) {
        if count == 0 {
            continue;
        }
        let (left, right) = (x.map(edge[0]), x.map(edge[1]));
        let top = y.map(count as f64);
        renderer.draw_rect(left, top, right - left, frame.bottom() - top, Colors::BAR_BLUE);
    }

    draw_x_axis(&mut renderer, &frame, &x);
    draw_y_axis(&mut renderer, &frame, &y);
    renderer.draw_rect_outline(frame.left, frame.top, frame.width, frame.height, Colors::BLACK);
    renderer.draw_text_centered(
        frame.center_x(),
        frame.bottom() + pt(32.0),
        metric,
        pt(10.0),
        Colors::BLACK,
        false,
    );
    renderer.draw_text_vertical(
        frame.left - pt(46.0),
        frame.top + frame.height / 2.0,
        "Frequency",
        pt(10.0),
        Colors::BLACK,
    );
    renderer.draw_text_centered(
        frame.center_x(),
        frame.top / 2.0,
        &format!("Distribution of {metric}"),
        pt(12.0),
        Colors::BLACK,
        false,
    );

    renderer.save(output_path)?;
    info!("Histogram written to {}", output_path.display());
    Ok(())
}

fn draw_x_axis(renderer: &mut Renderer, frame: &PlotFrame, scale: &LinearScale) {
    let step = nice_step(scale.lo, scale.hi, AXIS_TICKS);
    for tick in nice_ticks(scale.lo, scale.hi, AXIS_TICKS) {
        let px = scale.map(tick);
        renderer.draw_line(
            (px, frame.bottom()),
            (px, frame.bottom() + pt(3.5)),
            pt(0.8),
            Colors::BLACK,
        );
        renderer.draw_text_centered(
            px,
            frame.bottom() + pt(12.0),
            &format_tick(tick, step),
            pt(10.0),
            Colors::BLACK,
            false,
        );
    }
}

fn draw_y_axis(renderer: &mut Renderer, frame: &PlotFrame, scale: &LinearScale) {
    let step = nice_step(scale.lo, scale.hi, AXIS_TICKS);
    for tick in nice_ticks(scale.lo, scale.hi, AXIS_TICKS) {
        draw_y_tick(renderer, frame, scale.map(tick), &format_tick(tick, step));
    }
}

fn draw_y_tick(renderer: &mut Renderer, frame: &PlotFrame, py: f64, label: &str) {
    renderer.draw_line(
        (frame.left - pt(3.5), py),
        (frame.left, py),
        pt(0.8),
        Colors::BLACK,
    );
    renderer.draw_text_right(frame.left - pt(6.0), py, label, pt(10.0), Colors::DARK_GRAY);
}
