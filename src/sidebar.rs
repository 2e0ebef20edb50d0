//! Ties the photo list, the crop rectangles and the pointer gesture together
//! the way the sidebar uses them.

use std::path::Path;

use crate::config::CropConfig;
use crate::error::UploadError;
use crate::gallery::{Gallery, Photo};
use crate::geometry::NormalizedRect;
use crate::gesture::{CropGesture, ResizeHandle};
use crate::selection::{Selection, SelectionSender};
use crate::store::CropRects;
use crate::transform::{self, PixelRect, Point};

pub struct Sidebar {
    gallery: Gallery,
    rects: CropRects,
    gesture: CropGesture,
    selection: SelectionSender,
    handle_tolerance: f64,
}

impl Sidebar {
    pub fn new(config: &CropConfig, selection: SelectionSender) -> Self {
        let rects = CropRects::new(config.aspect_ratio);
        Self {
            gallery: Gallery::new(),
            gesture: CropGesture::new(rects.pixel_ratio(), config.min_width),
            rects,
            selection,
            handle_tolerance: config.handle_tolerance as f64,
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn rects(&self) -> &CropRects {
        &self.rects
    }

    pub fn gesture(&self) -> &CropGesture {
        &self.gesture
    }

    pub fn upload<I, P>(&mut self, paths: I) -> Vec<UploadError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.gallery.upload(paths)
    }

    pub fn push_photo(&mut self, photo: Photo) {
        self.gallery.push(photo);
    }

    /// Crop of the photo with `key`, created on first use.
    pub fn rect_for(&mut self, key: &str) -> Option<NormalizedRect> {
        let photo = self.gallery.get(key)?;
        let (rect, created) = self.rects.get_or_insert(key, photo.width, photo.height);
        if created {
            log::debug!("initialized crop for {key}: {rect:?}");
        }
        Some(rect)
    }

    /// Pointer-down at `pointer` over the thumbnail of `key` drawn at
    /// `image_rect` (screen pixels). Returns the grabbed handle, or `None`
    /// when the pointer missed the crop.
    pub fn pointer_down(&mut self, key: &str, pointer: Point, image_rect: &PixelRect) -> Option<ResizeHandle> {
        let rect = self.rect_for(key)?;
        let crop = transform::to_pixel_rect(&rect, image_rect.width, image_rect.height)
            .translate(image_rect.left, image_rect.top);
        let handle = ResizeHandle::hit_test(pointer, &crop, self.handle_tolerance)?;
        self.gesture
            .begin(key, handle, pointer, rect, image_rect.width, image_rect.height)
            .then_some(handle)
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Option<NormalizedRect> {
        self.gesture.update(pointer, &mut self.rects)
    }

    /// Pointer-up and pointer-leave both end the gesture.
    pub fn pointer_up(&mut self) {
        self.gesture.end();
    }

    /// Publishes the current crop of `key` as the selection.
    pub fn select(&mut self, key: &str) -> bool {
        let Some(rect) = self.rect_for(key) else {
            return false;
        };
        let Some(photo) = self.gallery.get(key).cloned() else {
            return false;
        };
        self.selection.publish(Selection { photo, rect })
    }

    /// Removes the photo together with its crop, aborting a gesture on it.
    pub fn delete(&mut self, key: &str) -> Option<Photo> {
        let photo = self.gallery.remove(key)?;
        self.rects.remove(key);
        self.gesture.cancel_for(key);
        log::info!("deleted {key}");
        Some(photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{self, SelectionReceiver};
    use std::path::PathBuf;

    fn sidebar() -> (Sidebar, SelectionReceiver) {
        let (tx, rx) = selection::channel();
        let mut sidebar = Sidebar::new(&CropConfig::default(), tx);
        sidebar.push_photo(Photo {
            key: "p".into(),
            path: PathBuf::from("p.png"),
            alt: "p".into(),
            width: 400,
            height: 400,
        });
        (sidebar, rx)
    }

    fn thumb() -> PixelRect {
        PixelRect {
            left: 10.0,
            top: 20.0,
            width: 200.0,
            height: 200.0,
        }
    }

    #[test]
    fn rect_is_created_lazily_for_known_photos() {
        let (mut sidebar, _rx) = sidebar();
        assert!(sidebar.rects().is_empty());
        let rect = sidebar.rect_for("p").unwrap();
        assert!((rect.w - 0.75).abs() < 1e-12 && (rect.h - 1.0).abs() < 1e-12);
        assert_eq!(sidebar.rect_for("missing"), None);
        assert_eq!(sidebar.rects().len(), 1);
    }

    #[test]
    fn drag_moves_the_crop() {
        let (mut sidebar, _rx) = sidebar();
        // crop spans x 25..175 of the thumbnail, i.e. screen 35..185
        let handle = sidebar.pointer_down("p", Point::new(110.0, 120.0), &thumb());
        assert_eq!(handle, Some(ResizeHandle::Move));

        let rect = sidebar.pointer_move(Point::new(90.0, 120.0)).unwrap();
        assert!((rect.x - 0.025).abs() < 1e-12);
        sidebar.pointer_up();
        assert!(!sidebar.gesture().is_active());
        assert_eq!(sidebar.rects().get("p"), Some(rect));
    }

    #[test]
    fn corner_resize_from_screen_coordinates() {
        let (mut sidebar, _rx) = sidebar();
        let handle = sidebar.pointer_down("p", Point::new(184.0, 219.0), &thumb());
        assert_eq!(handle, Some(ResizeHandle::BottomRight));

        let rect = sidebar.pointer_move(Point::new(164.0, 199.0)).unwrap();
        assert!((rect.w - 0.65).abs() < 1e-9);
        assert!((rect.x - 0.125).abs() < 1e-9);
        assert!(rect.y.abs() < 1e-9);
    }

    #[test]
    fn configured_ratio_drives_store_and_gesture() {
        let (tx, _rx) = selection::channel();
        let config = CropConfig {
            aspect_ratio: 1.0,
            ..CropConfig::default()
        };
        let mut sidebar = Sidebar::new(&config, tx);
        sidebar.push_photo(Photo {
            key: "sq".into(),
            path: PathBuf::from("sq.png"),
            alt: "sq".into(),
            width: 400,
            height: 400,
        });
        assert_eq!(sidebar.rects().pixel_ratio(), 1.0);
        assert_eq!(sidebar.rect_for("sq"), Some(NormalizedRect::FULL));

        let handle = sidebar.pointer_down("sq", Point::new(209.0, 219.0), &thumb());
        assert_eq!(handle, Some(ResizeHandle::BottomRight));
        let rect = sidebar.pointer_move(Point::new(109.0, 219.0)).unwrap();
        assert!((rect.w - 0.5).abs() < 1e-9);
        assert!((rect.w - rect.h).abs() < 1e-9);
    }

    #[test]
    fn missing_the_crop_starts_nothing() {
        let (mut sidebar, _rx) = sidebar();
        assert_eq!(sidebar.pointer_down("p", Point::new(12.0, 120.0), &thumb()), None);
        assert!(!sidebar.gesture().is_active());
    }

    #[test]
    fn delete_mid_gesture_aborts_cleanly() {
        let (mut sidebar, _rx) = sidebar();
        sidebar.pointer_down("p", Point::new(110.0, 120.0), &thumb());
        assert!(sidebar.delete("p").is_some());
        assert!(!sidebar.gesture().is_active());
        assert_eq!(sidebar.pointer_move(Point::new(0.0, 0.0)), None);
        assert!(sidebar.rects().is_empty());
        assert!(sidebar.delete("p").is_none());
    }

    #[test]
    fn select_publishes_current_crop() {
        let (mut sidebar, rx) = sidebar();
        sidebar.pointer_down("p", Point::new(110.0, 120.0), &thumb());
        let moved = sidebar.pointer_move(Point::new(100.0, 120.0)).unwrap();
        sidebar.pointer_up();

        assert!(sidebar.select("p"));
        let selection = rx.latest().unwrap();
        assert_eq!(selection.photo.key, "p");
        assert_eq!(selection.rect, moved);
        assert!(!sidebar.select("missing"));
    }
}
