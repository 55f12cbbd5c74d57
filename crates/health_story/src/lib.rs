pub mod boundaries;
pub mod config;
pub mod constants;
pub mod error;
pub mod html;
pub mod indicators;
pub mod join;
pub mod loader;
pub mod map_html;
pub mod narrative;
pub mod pipeline;
pub mod render;
pub mod stats;
pub mod table;

pub use boundaries::{AreaBoundary, read_boundaries};
pub use config::{Config, OutputPaths};
pub use constants::{DEFAULT_METRIC, HISTOGRAM_BINS, TOP_N};
pub use error::{Result, StoryError};
pub use indicators::{IndicatorTable, read_indicators};
pub use join::{IndicatorColumns, JoinedAreas, left_join};
pub use loader::{Inputs, load_inputs};
pub use pipeline::run;
pub use stats::{Histogram, MetricSummary, summarize, top_n};
