use crate::{
    constants::{
        BAR_FILE, DEFAULT_BOUNDARIES_PATH, DEFAULT_INDICATORS_PATH, DEFAULT_METRIC,
        DEFAULT_OUTPUT_DIR, DEFAULT_TILE_URL, DEFAULT_TILE_USER_AGENT, HIST_FILE, MAP_FILE,
        POSTER_FILE, STORY_FILE, TABLE_FILE,
    },
    error::{Result, StoryError},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Run configuration. Every field has a compiled-in default, so an absent
/// config file reproduces the fixed report.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub metric: MetricConfig,
    pub basemap: BasemapConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub boundaries: PathBuf,
    pub indicators: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BasemapConfig {
    /// Fetch tiles under the poster (disable for offline runs)
    pub enabled: bool,
    /// `{z}`, `{x}` and `{y}` are substituted per tile
    pub url_template: String,
    pub user_agent: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            boundaries: PathBuf::from(DEFAULT_BOUNDARIES_PATH),
            indicators: PathBuf::from(DEFAULT_INDICATORS_PATH),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_METRIC.to_string(),
        }
    }
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url_template: DEFAULT_TILE_URL.to_string(),
            user_agent: DEFAULT_TILE_USER_AGENT.to_string(),
        }
    }
}

/// Resolved output file locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub poster: PathBuf,
    pub map: PathBuf,
    pub bar: PathBuf,
    pub hist: PathBuf,
    pub table: PathBuf,
    pub story: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            poster: dir.join(POSTER_FILE),
            map: dir.join(MAP_FILE),
            bar: dir.join(BAR_FILE),
            hist: dir.join(HIST_FILE),
            table: dir.join(TABLE_FILE),
            story: dir.join(STORY_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 6] {
        [
            &self.poster,
            &self.map,
            &self.bar,
            &self.hist,
            &self.table,
            &self.story,
        ]
    }
}

impl Config {
    /// Load and validate a TOML config file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoryError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            StoryError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.metric.name.trim().is_empty() {
            return Err(StoryError::Config("metric.name must not be empty".to_string()));
        }

        if self.output.dir.as_os_str().is_empty() {
            return Err(StoryError::Config("output.dir must not be empty".to_string()));
        }

        if self.output.dir.exists() && !self.output.dir.is_dir() {
            return Err(StoryError::Config(format!(
                "Output path is not a directory: {}",
                self.output.dir.display()
            )));
        }

        if self.basemap.enabled {
            for placeholder in ["{z}", "{x}", "{y}"] {
                if !self.basemap.url_template.contains(placeholder) {
                    return Err(StoryError::Config(format!(
                        "basemap.url_template is missing {}",
                        placeholder
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::in_dir(&self.output.dir)
    }
}
