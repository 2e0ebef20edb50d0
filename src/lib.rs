//! Photo sidebar with a fixed aspect-ratio crop over every thumbnail.
//!
//! The geometry ([`geometry`], [`gesture`], [`transform`]) and the rectangle
//! store ([`store`]) are plain data and functions; [`app`] wires them into an
//! egui window.

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod gallery;
pub mod geometry;
pub mod gesture;
pub mod preview;
pub mod selection;
pub mod sidebar;
pub mod store;
pub mod transform;

pub use config::CropConfig;
pub use error::{ConfigError, CropError, UploadError};
pub use extract::{CropOutput, ImageSource, extract_crop};
pub use geometry::{AspectConstraint, NormalizedRect, clamp, default_rect, enforce_aspect};
pub use gesture::{CropGesture, GestureSnapshot, GestureState, ResizeHandle};
pub use store::CropRects;
pub use transform::{PixelRect, PixelRegion, to_pixel_rect, to_pixel_region};
