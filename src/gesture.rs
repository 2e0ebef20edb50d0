//! Pointer gestures on a crop rectangle: moving it and resizing it from one
//! of eight handles while keeping the aspect ratio.
//!
//! Every pointer move is computed from the [`GestureSnapshot`] taken on
//! pointer-down, never from the previous frame, so repeated events cannot
//! accumulate error.

use crate::geometry::{self, AspectConstraint, NormalizedRect};
use crate::store::CropRects;
use crate::transform::{PixelRect, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    Move,
}

/// Which part of the rectangle stays put along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Anchor {
    /// The left (or top) edge is fixed.
    Start,
    /// The right (or bottom) edge is fixed.
    End,
    /// The rectangle is re-centered on its old center.
    Center,
}

/// What the pointer displacement drives. Signs are `+1.0` when moving along
/// the positive axis grows the rectangle, `-1.0` otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Drive {
    Diagonal { out_x: f64, out_y: f64 },
    Width { out_x: f64 },
    Height { out_y: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct HandleSpec {
    anchor_x: Anchor,
    anchor_y: Anchor,
    drive: Drive,
}

impl ResizeHandle {
    pub const RESIZE: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
        ResizeHandle::Top,
        ResizeHandle::Bottom,
        ResizeHandle::Left,
        ResizeHandle::Right,
    ];

    fn spec(self) -> Option<HandleSpec> {
        use Anchor::*;
        let (anchor_x, anchor_y, drive) = match self {
            ResizeHandle::BottomRight => (Start, Start, Drive::Diagonal { out_x: 1.0, out_y: 1.0 }),
            ResizeHandle::BottomLeft => (End, Start, Drive::Diagonal { out_x: -1.0, out_y: 1.0 }),
            ResizeHandle::TopRight => (Start, End, Drive::Diagonal { out_x: 1.0, out_y: -1.0 }),
            ResizeHandle::TopLeft => (End, End, Drive::Diagonal { out_x: -1.0, out_y: -1.0 }),
            ResizeHandle::Top => (Center, End, Drive::Height { out_y: -1.0 }),
            ResizeHandle::Bottom => (Center, Start, Drive::Height { out_y: 1.0 }),
            ResizeHandle::Left => (End, Center, Drive::Width { out_x: -1.0 }),
            ResizeHandle::Right => (Start, Center, Drive::Width { out_x: 1.0 }),
            ResizeHandle::Move => return None,
        };
        Some(HandleSpec {
            anchor_x,
            anchor_y,
            drive,
        })
    }

    pub fn is_corner(self) -> bool {
        matches!(self.spec(), Some(HandleSpec { drive: Drive::Diagonal { .. }, .. }))
    }

    /// Where the handle is drawn for a rectangle in screen space.
    pub fn anchor_point(self, rect: &PixelRect) -> Point {
        let (cx, cy) = (rect.left + rect.width * 0.5, rect.top + rect.height * 0.5);
        match self {
            ResizeHandle::TopLeft => Point::new(rect.left, rect.top),
            ResizeHandle::TopRight => Point::new(rect.right(), rect.top),
            ResizeHandle::BottomLeft => Point::new(rect.left, rect.bottom()),
            ResizeHandle::BottomRight => Point::new(rect.right(), rect.bottom()),
            ResizeHandle::Top => Point::new(cx, rect.top),
            ResizeHandle::Bottom => Point::new(cx, rect.bottom()),
            ResizeHandle::Left => Point::new(rect.left, cy),
            ResizeHandle::Right => Point::new(rect.right(), cy),
            ResizeHandle::Move => Point::new(cx, cy),
        }
    }

    /// Finds the handle under `pos`. Corners win over edges, edges over the
    /// body; `None` means the pointer is outside the rectangle.
    pub fn hit_test(pos: Point, rect: &PixelRect, tolerance: f64) -> Option<ResizeHandle> {
        for corner in [
            ResizeHandle::TopLeft,
            ResizeHandle::TopRight,
            ResizeHandle::BottomLeft,
            ResizeHandle::BottomRight,
        ] {
            if pos.distance(corner.anchor_point(rect)) < tolerance {
                return Some(corner);
            }
        }

        let within_y = pos.y > rect.top && pos.y < rect.bottom();
        let within_x = pos.x > rect.left && pos.x < rect.right();
        if (pos.x - rect.left).abs() < tolerance && within_y {
            return Some(ResizeHandle::Left);
        }
        if (pos.x - rect.right()).abs() < tolerance && within_y {
            return Some(ResizeHandle::Right);
        }
        if (pos.y - rect.top).abs() < tolerance && within_x {
            return Some(ResizeHandle::Top);
        }
        if (pos.y - rect.bottom()).abs() < tolerance && within_x {
            return Some(ResizeHandle::Bottom);
        }

        rect.contains(pos).then_some(ResizeHandle::Move)
    }
}

fn place(start: f64, old_len: f64, new_len: f64, anchor: Anchor) -> f64 {
    match anchor {
        Anchor::Start => start,
        Anchor::End => start + (old_len - new_len),
        Anchor::Center => start + (old_len - new_len) / 2.0,
    }
}

/// Resizes `start` from `handle` by a normalized displacement, before the
/// aspect ratio is re-applied and the position clamped.
///
/// Corners grow by the larger of `|dx|` and `|dy|`, positive when either
/// component points outward. This does not track the pointer exactly along
/// the ratio diagonal.
pub fn resize(
    start: &NormalizedRect,
    handle: ResizeHandle,
    dx: f64,
    dy: f64,
    constraint: &AspectConstraint,
) -> NormalizedRect {
    let Some(spec) = handle.spec() else {
        return NormalizedRect {
            x: start.x + dx,
            y: start.y + dy,
            ..*start
        };
    };

    let (w, h) = match spec.drive {
        Drive::Diagonal { out_x, out_y } => {
            let movement = dx.abs().max(dy.abs());
            let grow = if dx * out_x > 0.0 || dy * out_y > 0.0 {
                movement
            } else {
                -movement
            };
            let w = (start.w + grow).max(constraint.min_width);
            (w, w / constraint.ratio)
        }
        Drive::Width { out_x } => {
            let w = (start.w + out_x * dx).max(constraint.min_width);
            (w, w / constraint.ratio)
        }
        Drive::Height { out_y } => {
            let h = (start.h + out_y * dy).max(constraint.min_height());
            (h * constraint.ratio, h)
        }
    };

    NormalizedRect {
        x: place(start.x, start.w, w, spec.anchor_x),
        y: place(start.y, start.h, h, spec.anchor_y),
        w,
        h,
    }
}

/// Moves `start` by a normalized displacement keeping its size.
pub fn translate(start: &NormalizedRect, dx: f64, dy: f64, constraint: &AspectConstraint) -> NormalizedRect {
    geometry::enforce_aspect(resize(start, ResizeHandle::Move, dx, dy, constraint), true, constraint)
}

/// State captured on pointer-down for one gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureSnapshot {
    pub key: String,
    pub handle: ResizeHandle,
    pub start_pointer: Point,
    pub start_rect: NormalizedRect,
    /// Pixel size of the rendered image the pointer moves over.
    pub render_w: f64,
    pub render_h: f64,
}

impl GestureSnapshot {
    /// The rectangle for the pointer at `pointer`.
    pub fn apply(&self, pointer: Point, pixel_ratio: f64, min_width: f64) -> NormalizedRect {
        let constraint = AspectConstraint::for_image(pixel_ratio, min_width, self.render_w, self.render_h);
        let dx = (pointer.x - self.start_pointer.x) / self.render_w;
        let dy = (pointer.y - self.start_pointer.y) / self.render_h;

        match self.handle {
            ResizeHandle::Move => translate(&self.start_rect, dx, dy, &constraint),
            handle => geometry::enforce_aspect(
                resize(&self.start_rect, handle, dx, dy, &constraint),
                false,
                &constraint,
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(GestureSnapshot),
    Resizing(GestureSnapshot),
}

/// Drag/resize state machine for the crop overlays of one gallery.
#[derive(Clone, Debug)]
pub struct CropGesture {
    state: GestureState,
    pixel_ratio: f64,
    min_width: f64,
}

impl CropGesture {
    pub fn new(pixel_ratio: f64, min_width: f64) -> Self {
        Self {
            state: GestureState::Idle,
            pixel_ratio,
            min_width,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&GestureSnapshot> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Dragging(snapshot) | GestureState::Resizing(snapshot) => Some(snapshot),
        }
    }

    pub fn is_active(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn active_key(&self) -> Option<&str> {
        self.snapshot().map(|snapshot| snapshot.key.as_str())
    }

    /// Pointer-down on `handle` of the rectangle for `key`. Returns `false`
    /// and stays idle when the rendered size is degenerate.
    pub fn begin(
        &mut self,
        key: &str,
        handle: ResizeHandle,
        pointer: Point,
        start_rect: NormalizedRect,
        render_w: f64,
        render_h: f64,
    ) -> bool {
        if !(render_w > 0.0 && render_h > 0.0) {
            log::warn!("ignoring gesture on {key}: rendered size {render_w}x{render_h}");
            return false;
        }

        let snapshot = GestureSnapshot {
            key: key.to_owned(),
            handle,
            start_pointer: pointer,
            start_rect,
            render_w,
            render_h,
        };
        log::debug!("gesture start on {key}: {handle:?}");
        self.state = match handle {
            ResizeHandle::Move => GestureState::Dragging(snapshot),
            _ => GestureState::Resizing(snapshot),
        };
        true
    }

    /// Pointer-move. Stores and returns the new rectangle, or `None` when
    /// idle. A gesture whose image has been removed is aborted.
    pub fn update(&mut self, pointer: Point, rects: &mut CropRects) -> Option<NormalizedRect> {
        let snapshot = self.snapshot()?;

        if !rects.contains(&snapshot.key) {
            log::debug!("aborting gesture: {} was removed", snapshot.key);
            self.state = GestureState::Idle;
            return None;
        }

        let rect = snapshot.apply(pointer, self.pixel_ratio, self.min_width);
        let key = snapshot.key.clone();
        rects.set(&key, rect);
        rects.get(&key)
    }

    /// Pointer-up or pointer-leave.
    pub fn end(&mut self) {
        if let Some(key) = self.active_key() {
            log::debug!("gesture end on {key}");
        }
        self.state = GestureState::Idle;
    }

    /// Drops the gesture if it belongs to `key`, e.g. when the image is deleted.
    pub fn cancel_for(&mut self, key: &str) {
        if self.active_key() == Some(key) {
            self.state = GestureState::Idle;
        }
    }
}
