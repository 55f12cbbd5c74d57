use crate::boundaries::{AreaBoundary, read_boundaries};
use crate::error::{Result, StoryError};
use crate::indicators::{IndicatorTable, read_indicators};

use log::{debug, info};
use std::path::Path;

/// Both inputs, loaded together or not at all
#[derive(Debug, Clone)]
pub struct Inputs {
    pub boundaries: Vec<AreaBoundary>,
    pub indicators: IndicatorTable,
}

/// Loads the boundary GeoJSON and the indicator CSV.
///
/// Both paths are checked before either file is read, so a missing input
/// never leaves a half-loaded state behind.
///
/// # Errors
/// Returns [`StoryError::MissingInput`] naming the first absent path, or the
/// parse error of whichever file is malformed
pub fn load_inputs(boundaries_path: &Path, indicators_path: &Path) -> Result<Inputs> {
    ensure_exists(boundaries_path, "GeoJSON")?;
    ensure_exists(indicators_path, "CSV")?;

    debug!("Reading boundaries from {}", boundaries_path.display());
    let boundaries = read_boundaries(boundaries_path)?;
    debug!("Reading indicators from {}", indicators_path.display());
    let indicators = read_indicators(indicators_path)?;

    info!(
        "Loaded {} boundaries and {} indicator rows",
        boundaries.len(),
        indicators.len()
    );

    Ok(Inputs {
        boundaries,
        indicators,
    })
}

fn ensure_exists(path: &Path, kind: &'static str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StoryError::MissingInput {
            kind,
            path: path.to_path_buf(),
        })
    }
}
