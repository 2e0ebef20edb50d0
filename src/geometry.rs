//! Normalized crop rectangles and the fixed aspect-ratio rules.
//!
//! A [`NormalizedRect`] is expressed in fractions of the image width and
//! height, so the same value applies to a thumbnail and to the full-size
//! source. The aspect ratio is defined in pixels; [`AspectConstraint`]
//! converts it to the normalized space of one particular image.

/// A rectangle in image-relative coordinates, `(0, 0)` top-left and
/// `(1, 1)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl NormalizedRect {
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Check that the rectangle lies inside the unit square.
    pub fn is_valid(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.w > 0.0
            && self.h > 0.0
            && self.right() <= 1.001 // float slack
            && self.bottom() <= 1.001
    }
}

/// Aspect ratio and size floor as seen in the normalized space of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectConstraint {
    /// Normalized width divided by normalized height.
    pub ratio: f64,
    pub min_width: f64,
}

impl AspectConstraint {
    /// `pixel_ratio` is width / height in pixels; for an image of
    /// `image_w x image_h` that is `pixel_ratio * image_h / image_w` once
    /// normalized.
    pub fn for_image(pixel_ratio: f64, min_width: f64, image_w: f64, image_h: f64) -> Self {
        let ratio = if image_w > 0.0 && image_h > 0.0 {
            pixel_ratio * image_h / image_w
        } else {
            pixel_ratio
        };
        Self { ratio, min_width }
    }

    pub fn min_height(&self) -> f64 {
        self.min_width / self.ratio
    }
}

/// Largest rectangle of `pixel_ratio` that fits in the image, centered.
/// No width floor applies here.
pub fn default_rect(image_w: f64, image_h: f64, pixel_ratio: f64) -> NormalizedRect {
    if !(image_w > 0.0 && image_h > 0.0) {
        return NormalizedRect::FULL;
    }

    let by_height = (image_h * pixel_ratio, image_h);
    let by_width = (image_w, image_w / pixel_ratio);
    let (w, h) = if by_height.0 <= image_w {
        by_height
    } else {
        by_width
    };

    NormalizedRect {
        x: (image_w - w) / 2.0 / image_w,
        y: (image_h - h) / 2.0 / image_h,
        w: w / image_w,
        h: h / image_h,
    }
}

/// Moves the rectangle back inside the unit square without resizing it.
pub fn clamp(rect: NormalizedRect) -> NormalizedRect {
    NormalizedRect {
        x: rect.x.min(1.0 - rect.w).max(0.0),
        y: rect.y.min(1.0 - rect.h).max(0.0),
        ..rect
    }
}

/// Re-derives the height from the width (unless `preserve_size`) and clamps
/// the position.
///
/// The ratio and the unit square take precedence over `min_width`. On an
/// image wider than `pixel_ratio / min_width` (12.5:1 with the defaults) the
/// tallest rectangle of the ratio is narrower than the floor, and the width
/// ends up below `min_width`.
pub fn enforce_aspect(
    rect: NormalizedRect,
    preserve_size: bool,
    constraint: &AspectConstraint,
) -> NormalizedRect {
    let NormalizedRect { x, y, mut w, mut h } = rect;

    if !preserve_size {
        w = w.max(constraint.min_width);
        h = w / constraint.ratio;

        if h > 1.0 {
            h = 1.0;
            w = h * constraint.ratio;
        }
        if w > 1.0 {
            w = 1.0;
            h = w / constraint.ratio;
        }
    }

    clamp(NormalizedRect { x, y, w, h })
}
