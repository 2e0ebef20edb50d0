//! Runtime configuration.
//!
//! Values come from a TOML file when one is present, otherwise from
//! [`CropConfig::default`]. The file is looked up at the path named by
//! `CROP_SIDEBAR_CONFIG`, then at `crop_sidebar.toml` in the working
//! directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const CONFIG_ENV: &str = "CROP_SIDEBAR_CONFIG";
pub const CONFIG_FILE: &str = "crop_sidebar.toml";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Width divided by height in pixels. 0.75 is a 3:4 portrait crop.
    pub aspect_ratio: f64,
    /// Smallest crop width as a fraction of the image width.
    pub min_width: f64,
    /// Pointer distance in screen pixels that still grabs a handle.
    pub handle_tolerance: f32,
    pub jpeg_quality: u8,
    /// Largest side, in pixels, of an extraction surface.
    pub max_surface_side: u32,
    /// Thumbnail width in the sidebar grid.
    pub thumbnail_width: f32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 0.75,
            min_width: 0.06,
            handle_tolerance: 10.0,
            jpeg_quality: 92,
            max_surface_side: 16_384,
            thumbnail_width: 150.0,
        }
    }
}

impl CropConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: CropConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Loads the first config file found, or the defaults when there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => {
                log::info!("loading config from {}", path.display());
                Self::from_file(&path)
            }
            None => {
                log::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn locate() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(CONFIG_FILE);
        local.is_file().then_some(local)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "aspect_ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if !(self.min_width > 0.0 && self.min_width <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "min_width must be in (0, 1], got {}",
                self.min_width
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.max_surface_side == 0 {
            return Err(ConfigError::Invalid("max_surface_side must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = CropConfig::from_toml_str("").unwrap();
        assert_eq!(config, CropConfig::default());
        assert_eq!(config.aspect_ratio, 0.75);
        assert_eq!(config.min_width, 0.06);
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config = CropConfig::from_toml_str("aspect_ratio = 1.0\njpeg_quality = 80\n").unwrap();
        assert_eq!(config.aspect_ratio, 1.0);
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.min_width, 0.06);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            CropConfig::from_toml_str("aspect_ratio = 0.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CropConfig::from_toml_str("min_width = 1.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CropConfig::from_toml_str("jpeg_quality = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CropConfig::from_toml_str("aspect_ratio = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_width = 0.1").unwrap();
        let config = CropConfig::from_file(file.path()).unwrap();
        assert_eq!(config.min_width, 0.1);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            CropConfig::from_file(&missing),
            Err(ConfigError::Io { .. })
        ));
    }
}
