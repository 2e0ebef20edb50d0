//! Conversions between normalized rectangles and pixel space.

use crate::geometry::NormalizedRect;

/// A point in screen or image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Sub-pixel rectangle used for overlay rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Shifts the rectangle, e.g. from image-local to screen coordinates.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }
}

/// Integer source region used for pixel extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub fn to_pixel_rect(rect: &NormalizedRect, pixel_w: f64, pixel_h: f64) -> PixelRect {
    PixelRect {
        left: rect.x * pixel_w,
        top: rect.y * pixel_h,
        width: rect.w * pixel_w,
        height: rect.h * pixel_h,
    }
}

/// Each field is rounded on its own, so `x + width` may overshoot the image
/// by one pixel.
pub fn to_pixel_region(rect: &NormalizedRect, natural_w: u32, natural_h: u32) -> PixelRegion {
    let round = |v: f64| v.round().max(0.0) as u32;
    PixelRegion {
        x: round(rect.x * natural_w as f64),
        y: round(rect.y * natural_h as f64),
        width: round(rect.w * natural_w as f64),
        height: round(rect.h * natural_h as f64),
    }
}
