//! The ordered list of uploaded photos.

use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::error::UploadError;
use crate::extract::ImageSource;

#[derive(Clone, Debug, PartialEq)]
pub struct Photo {
    /// Unique per upload, so the same file added twice gets its own crop.
    pub key: String,
    pub path: PathBuf,
    /// File name without extension.
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

impl Photo {
    pub fn source(&self) -> ImageSource {
        ImageSource::Path(self.path.clone())
    }
}

/// Validates `path` as an image file and probes its pixel dimensions
/// without decoding the pixels.
pub fn probe_photo(path: &Path, key: String) -> Result<Photo, UploadError> {
    let fail = |message: String| UploadError {
        path: path.to_path_buf(),
        message,
    };

    ImageFormat::from_path(path).map_err(|_| fail("file must be an image".into()))?;
    let (width, height) =
        image::image_dimensions(path).map_err(|err| fail(format!("failed to load image: {err}")))?;
    if width == 0 || height == 0 {
        return Err(fail(format!("image has no pixels ({width}x{height})")));
    }

    let alt = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Photo {
        key,
        path: path.to_path_buf(),
        alt,
        width,
        height,
    })
}

#[derive(Debug, Default)]
pub struct Gallery {
    photos: Vec<Photo>,
    uploads: u64,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn get(&self, key: &str) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.key == key)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn push(&mut self, photo: Photo) {
        self.photos.push(photo);
    }

    pub fn remove(&mut self, key: &str) -> Option<Photo> {
        let index = self.photos.iter().position(|photo| photo.key == key)?;
        Some(self.photos.remove(index))
    }

    /// Adds every readable image among `paths` and returns the rejected ones.
    pub fn upload<I, P>(&mut self, paths: I) -> Vec<UploadError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut errors = Vec::new();
        for path in paths {
            let path = path.as_ref();
            self.uploads += 1;
            let key = format!("{}#{}", path.display(), self.uploads);
            match probe_photo(path, key) {
                Ok(photo) => {
                    log::info!("added {} ({}x{})", photo.key, photo.width, photo.height);
                    self.photos.push(photo);
                }
                Err(err) => {
                    log::warn!("upload rejected: {err}");
                    errors.push(err);
                }
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::new(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn probes_dimensions_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "beach.png", 40, 30);
        let photo = probe_photo(&path, "k".into()).unwrap();
        assert_eq!((photo.width, photo.height), (40, 30));
        assert_eq!(photo.alt, "beach");
        assert_eq!(photo.source(), ImageSource::Path(path));
    }

    #[test]
    fn upload_keeps_good_files_and_reports_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "a.png", 10, 20);
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "hello").unwrap();
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, "definitely not png").unwrap();

        let mut gallery = Gallery::new();
        let errors = gallery.upload([&good, &text, &broken]);

        assert_eq!(gallery.len(), 1);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path, text);
        assert_eq!(errors[0].message, "file must be an image");
        assert!(errors[1].message.starts_with("failed to load image"));
    }

    #[test]
    fn same_file_twice_gets_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 10, 10);
        let mut gallery = Gallery::new();
        assert!(gallery.upload([&path, &path]).is_empty());

        let keys: Vec<_> = gallery.photos().iter().map(|p| p.key.clone()).collect();
        assert_eq!(keys.len(), 2);
        assert_ne!(keys[0], keys[1]);

        let removed = gallery.remove(&keys[0]).unwrap();
        assert_eq!(removed.key, keys[0]);
        assert!(gallery.get(&keys[0]).is_none());
        assert!(gallery.get(&keys[1]).is_some());
        assert!(gallery.remove(&keys[0]).is_none());
    }
}
