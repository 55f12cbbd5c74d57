use crate::config::{Config, OutputPaths};
use crate::constants::TOP_N;
use crate::error::{Result, StoryError};
use crate::join::{IndicatorColumns, left_join};
use crate::loader::load_inputs;
use crate::map_html::render_map;
use crate::narrative::write_story;
use crate::render::{TileSource, render_bar_chart, render_histogram, render_poster, top_bars};
use crate::stats::{summarize, top_n, value_range};
use crate::table::write_top_table;

use log::{info, warn};

/// Produces every report artifact for the configured metric.
///
/// Inputs, columns and the metric values are all checked before the output
/// directory is touched, so a failed guard leaves no files behind.
/// Artifacts are then written in order: poster, map, table, bar chart,
/// histogram, story.
pub fn run(config: &Config) -> Result<OutputPaths> {
    let metric = config.metric.name.as_str();
    info!("Generating health story for \"{metric}\"");

    let inputs = load_inputs(&config.input.boundaries, &config.input.indicators)?;
    let table = &inputs.indicators;

    let columns = IndicatorColumns::resolve(table, metric)?;
    let values = table.numeric_column(columns.metric)?;
    let summary = summarize(table, columns.name, metric, &values)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let range = value_range(present.iter().copied()).ok_or_else(|| StoryError::EmptyMetric {
        column: metric.to_string(),
    })?;
    info!(
        "{} of {} rows have a value; mean {:.2}, max {:.2}",
        summary.count,
        table.len(),
        summary.mean,
        summary.max
    );

    let joined = left_join(&inputs.boundaries, table, &columns, metric, &values);
    let unmatched = joined.len() - joined.matched();
    if unmatched > 0 {
        warn!("{unmatched} of {} boundaries have no indicator record", joined.len());
    }

    std::fs::create_dir_all(&config.output.dir).map_err(|source| StoryError::WriteFile {
        path: config.output.dir.clone(),
        source,
    })?;
    let paths = config.output_paths();

    let basemap = TileSource::from_config(&config.basemap);
    if basemap.is_none() {
        info!("Basemap disabled; poster drawn on a plain background");
    }
    render_poster(&joined, basemap.as_ref(), &paths.poster)?;
    render_map(&joined, range, &paths.map)?;

    let top = top_n(&values, TOP_N);
    write_top_table(table, &top, &paths.table)?;
    render_bar_chart(&top_bars(table, &columns, &values, &top), metric, &paths.bar)?;
    render_histogram(&present, metric, &paths.hist)?;

    write_story(metric, &summary, &paths.story)?;

    Ok(paths)
}
