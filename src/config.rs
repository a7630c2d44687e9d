use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub render: RenderConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub boundaries: PathBuf,
    pub population_csv: PathBuf,
    #[serde(default = "default_description_property")]
    pub description_property: String,
    #[serde(default = "default_subzone_column")]
    pub subzone_column: String,
    #[serde(default = "default_population_column")]
    pub population_column: String,
    pub north_arrow: Option<PathBuf>, // probed at load time, not embedded
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub title: String,
    /// Longitude/latitude the projection is centred on.
    pub center: [f64; 2],
    /// Drawing rectangle `[[x0, y0], [x1, y1]]` the features are fitted into.
    pub fit_extent: [[f64; 2]; 2],
    pub neutral_fill: String,
    pub highlight_fill: String,
    pub stroke: String,
    pub north_arrow_href: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            title: "Singapore's Population (2024) by Subzone".to_string(),
            center: [103.851959, 1.290270],
            fit_extent: [[60.0, 50.0], [990.0, 580.0]],
            neutral_fill: "grey".to_string(),
            highlight_fill: "yellow".to_string(),
            stroke: "black".to_string(),
            north_arrow_href: "images/North arrow.png".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl OutputConfig {
    pub fn svg_path(&self) -> PathBuf {
        self.dir.join("map.svg")
    }

    pub fn page_path(&self) -> PathBuf {
        self.dir.join("index.html")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

fn default_description_property() -> String {
    "Description".to_string()
}

fn default_subzone_column() -> String {
    "Subzone".to_string()
}

fn default_population_column() -> String {
    "Population".to_string()
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
