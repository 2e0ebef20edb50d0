use std::path::PathBuf;

/// Failure of a single crop extraction. Stored rectangles are never affected.
#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("cannot decode source image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("cannot create {width}x{height} crop surface: {reason}")]
    Surface {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// A file that could not be added to the gallery.
#[derive(Debug, thiserror::Error)]
#[error("{}: {message}", .path.display())]
pub struct UploadError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
