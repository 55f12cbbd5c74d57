use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoryError>;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("Missing {kind}: {}", path.display())]
    MissingInput { kind: &'static str, path: PathBuf },

    #[error("Column \"{column}\" not found in CSV.")]
    MissingColumn { column: String },

    #[error("Invalid {column} value at row {row}: {value}")]
    MetricParse {
        column: String,
        row: usize,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("Column \"{column}\" has no numeric values")]
    EmptyMetric { column: String },

    #[error("Invalid geometry: {message}")]
    Geometry { message: String },

    #[error("Font error: {0}")]
    Font(String),

    #[error("Basemap error: {0}")]
    Basemap(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<toml::de::Error> for StoryError {
    fn from(err: toml::de::Error) -> Self {
        StoryError::Config(format!("TOML parse error: {}", err))
    }
}
