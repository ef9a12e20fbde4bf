//! CLI configuration, read from `vitae.toml` in the user's config directory.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::raster::MIN_SCALE;
use crate::template::TemplateId;

const DEFAULT_CONFIG: &str = r#"# Where the builder session (resume, font, colors) is saved.
# storage_dir = "/home/me/.local/share/vitae/state"

# Directory of .ttf/.otf faces named like `Inter-Bold.ttf`. They replace
# the bundled faces for their family.
# font_dir = "/home/me/.local/share/vitae/fonts"

output_dir = "."
scale = 2
default_template = "classic"
"#;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct VitaeConfig {
    pub storage_dir: PathBuf,
    pub font_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub scale: u32,
    pub default_template: TemplateId,
}

impl Default for VitaeConfig {
    fn default() -> Self {
        Self {
            storage_dir: data_dir().join("state"),
            font_dir: None,
            output_dir: PathBuf::from("."),
            scale: MIN_SCALE,
            default_template: TemplateId::default(),
        }
    }
}

impl VitaeConfig {
    /// Load from the default location, writing a commented default file on
    /// first run.
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }
        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        Ok((Self::load_from(&config_path)?, config_path))
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: VitaeConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Toml).required(false))
            .build()?
            .try_deserialize()?;

        if config.scale < MIN_SCALE {
            return Err(ConfigError::Message(format!(
                "scale must be at least {MIN_SCALE}, got {}",
                config.scale
            )));
        }
        Ok(config)
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("vitae"))
        .unwrap_or_else(|| PathBuf::from(".vitae"))
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("vitae").join("vitae.toml")
    } else {
        PathBuf::from("vitae.toml")
    }
}
