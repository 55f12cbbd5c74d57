/// Default input files
pub const DEFAULT_BOUNDARIES_PATH: &str = "data/chicago-community-areas.geojson";
pub const DEFAULT_INDICATORS_PATH: &str =
    "data/public-health-statistics-selected-public-health-indicators-by-chicago-community-area-1.csv";

/// Default output directory and file names
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const POSTER_FILE: &str = "chicago_health_poster.png";
pub const MAP_FILE: &str = "chicago_health_map.html";
pub const BAR_FILE: &str = "bar_top10.png";
pub const HIST_FILE: &str = "hist_metric.png";
pub const TABLE_FILE: &str = "table_top10.csv";
pub const STORY_FILE: &str = "story.html";

/// Metric rendered when no configuration overrides it
pub const DEFAULT_METRIC: &str = "Low Birth Weight";

/// Join keys and the display name column
pub const BOUNDARY_KEY_PROPERTY: &str = "area_numbe";
pub const INDICATOR_KEY_COLUMN: &str = "Community Area";
pub const INDICATOR_NAME_COLUMN: &str = "Community Area Name";

/// Cells treated as missing in the indicator table
pub const NULL_MARKERS: [&str; 9] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "-", "."];

/// Summary settings
pub const TOP_N: usize = 10;
pub const HISTOGRAM_BINS: usize = 20;

/// Raster output (inches x dpi)
pub const DPI: f64 = 300.0;
pub const POSTER_SIZE_IN: (f64, f64) = (8.0, 10.0);
pub const CHART_SIZE_IN: (f64, f64) = (10.0, 6.0);

/// Interactive map view
pub const MAP_CENTER: (f64, f64) = (41.85, -87.65); // (lat, lon)
pub const MAP_ZOOM: u8 = 10;
pub const MAP_CLASSES: usize = 6;
pub const MAP_FILL_OPACITY: f64 = 0.8;
pub const MAP_LINE_OPACITY: f64 = 0.4;

/// Basemap tiles for the poster
pub const DEFAULT_TILE_URL: &str = "https://a.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_USER_AGENT: &str = concat!("health_story/", env!("CARGO_PKG_VERSION"));
pub const TILE_SIZE: u32 = 256;
pub const MAX_TILE_ZOOM: u8 = 18;
