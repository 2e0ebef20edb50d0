use std::collections::HashMap;

use crate::geometry::{self, NormalizedRect};

/// Current crop rectangle of every image in the gallery, keyed by image key.
#[derive(Debug, Clone)]
pub struct CropRects {
    rects: HashMap<String, NormalizedRect>,
    pixel_ratio: f64,
}

impl CropRects {
    pub fn new(pixel_ratio: f64) -> Self {
        Self {
            rects: HashMap::new(),
            pixel_ratio,
        }
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn get(&self, key: &str) -> Option<NormalizedRect> {
        self.rects.get(key).copied()
    }

    /// Returns the rectangle for `key`, inserting the centered default for an
    /// image of `image_w x image_h` if there is none yet. The flag is `true`
    /// when the entry was created by this call.
    pub fn get_or_insert(&mut self, key: &str, image_w: u32, image_h: u32) -> (NormalizedRect, bool) {
        if let Some(rect) = self.rects.get(key) {
            return (*rect, false);
        }
        let rect = geometry::default_rect(image_w as f64, image_h as f64, self.pixel_ratio);
        self.rects.insert(key.to_owned(), rect);
        (rect, true)
    }

    /// Stores `rect` moved back inside the image bounds.
    pub fn set(&mut self, key: &str, rect: NormalizedRect) {
        self.rects.insert(key.to_owned(), geometry::clamp(rect));
    }

    pub fn remove(&mut self, key: &str) -> Option<NormalizedRect> {
        self.rects.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_key_is_initialized_once() {
        let mut rects = CropRects::new(0.75);
        let (first, created) = rects.get_or_insert("a", 800, 600);
        assert!(created);
        let (second, created) = rects.get_or_insert("a", 800, 600);
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(rects.len(), 1);
    }

    #[test]
    fn existing_key_ignores_new_dimensions() {
        let mut rects = CropRects::new(0.75);
        let (first, _) = rects.get_or_insert("a", 800, 600);
        let (again, created) = rects.get_or_insert("a", 100, 900);
        assert!(!created);
        assert_eq!(first, again);
    }

    #[test]
    fn get_has_no_side_effects() {
        let rects = CropRects::new(0.75);
        assert_eq!(rects.get("missing"), None);
        assert!(rects.is_empty());
    }

    #[test]
    fn set_clamps_and_replaces() {
        let mut rects = CropRects::new(0.75);
        rects.get_or_insert("a", 100, 100);
        rects.set("a", NormalizedRect::new(0.9, -0.5, 0.3, 0.4));
        let rect = rects.get("a").unwrap();
        assert!((rect.x - 0.7).abs() < 1e-12);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rects.get_or_insert("a", 100, 100), (rect, false));
    }

    #[test]
    fn remove_then_get_reinitializes() {
        let mut rects = CropRects::new(0.75);
        rects.get_or_insert("a", 800, 600);
        rects.set("a", NormalizedRect::new(0.0, 0.0, 0.1, 0.2));
        assert!(rects.remove("a").is_some());
        assert!(rects.remove("a").is_none());

        let (rect, created) = rects.get_or_insert("a", 600, 800);
        assert!(created);
        assert_eq!(rect, geometry::default_rect(600.0, 800.0, 0.75));
    }
}
