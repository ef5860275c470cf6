//! Configuration for the solver binary.
//!
//! Loads settings from config.json at startup. The pipeline constants (glyph size,
//! mask intensities) are fixed; only the inputs around them are configurable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::classify::Alphabet;
use crate::segment::DEFAULT_COLOR_LIMIT;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<SolverConfig> = OnceLock::new();

/// Complete solver configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Number of colors kept by the region extractor (background + glyphs)
    #[serde(default = "default_color_limit")]
    pub color_limit: usize,
    /// Classifier output symbols, in output order; the template file must use the same alphabet
    #[serde(default)]
    pub alphabet: Alphabet,
    /// Template file for the template classifier, relative to the executable
    #[serde(default = "default_templates_path")]
    pub templates_path: String,
    /// Save every canonical glyph as PNG next to the log files
    #[serde(default)]
    pub dump_glyphs: bool,
}

fn default_color_limit() -> usize {
    DEFAULT_COLOR_LIMIT
}

fn default_templates_path() -> String {
    "glyph_templates.json".to_string()
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            color_limit: default_color_limit(),
            alphabet: Alphabet::default(),
            templates_path: default_templates_path(),
            dump_glyphs: false,
        }
    }
}

/// Reads and parses a config file.
pub fn load_config_from(path: &Path) -> Result<SolverConfig> {
    let contents = fs::read_to_string(path)
        .context(format!("Failed to read config: {}", path.display()))?;
    let config: SolverConfig = serde_json::from_str(&contents)
        .context(format!("Failed to parse config: {}", path.display()))?;
    Ok(config)
}

/// Loads configuration from `path` or returns defaults.
fn load_config(path: &Path) -> SolverConfig {
    crate::log(&format!("Looking for config at: {}", path.display()));

    if !path.exists() {
        crate::log("config.json not found. Using default config.");
        return SolverConfig::default();
    }

    match load_config_from(path) {
        Ok(config) => {
            crate::log("Config loaded from config.json");
            config
        }
        Err(e) => {
            crate::log(&format!("{:#}. Using defaults.", e));
            SolverConfig::default()
        }
    }
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config(path: &Path) {
    let _ = CONFIG.set(load_config(path));
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static SolverConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}
