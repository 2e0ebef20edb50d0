//! Runs crop extraction off the UI thread.
//!
//! Each request gets an increasing id. Only the completion for the most
//! recent request is handed out; a slower, older one that finishes later is
//! dropped so it can never replace a newer preview.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::error::CropError;
use crate::extract::{self, CropOutput, ExtractSettings, ImageSource};
use crate::geometry::NormalizedRect;

pub type RequestId = u64;

#[derive(Clone, Debug)]
pub struct CropRequest {
    pub key: String,
    pub source: ImageSource,
    pub rect: NormalizedRect,
}

#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub key: String,
    pub result: Result<CropOutput, CropError>,
}

pub struct CropWorker {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    settings: ExtractSettings,
    next_id: RequestId,
    latest: Option<RequestId>,
}

impl CropWorker {
    pub fn new(settings: ExtractSettings) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            settings,
            next_id: 1,
            latest: None,
        }
    }

    /// Starts extracting in the background; supersedes any earlier request.
    pub fn submit(&mut self, request: CropRequest) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        self.latest = Some(id);

        let tx = self.tx.clone();
        let settings = self.settings;
        thread::spawn(move || {
            let CropRequest { key, source, rect } = request;
            let result = extract::extract_crop(&source, &rect, &settings);
            // the worker may already be gone
            let _ = tx.send(Completion { id, key, result });
        });
        id
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }

    /// Forgets the pending request; its result will be discarded.
    pub fn cancel(&mut self) {
        self.latest = None;
    }

    /// Returns the completion of the latest request once it has arrived.
    pub fn poll(&mut self) -> Option<Completion> {
        let mut accepted = None;
        for completion in self.rx.try_iter() {
            if self.latest == Some(completion.id) {
                self.latest = None;
                accepted = Some(completion);
            } else {
                log::debug!("discarding stale crop #{} for {}", completion.id, completion.key);
            }
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn png(width: u32, height: u32) -> ImageSource {
        let mut bytes = Cursor::new(Vec::new());
        RgbaImage::new(width, height)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        ImageSource::Bytes(Arc::from(bytes.into_inner()))
    }

    fn wait(worker: &mut CropWorker) -> Completion {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(done) = worker.poll() {
                return done;
            }
            assert!(Instant::now() < deadline, "crop worker timed out");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn fake(worker: &CropWorker, id: RequestId, key: &str) -> Completion {
        Completion {
            id,
            key: key.to_owned(),
            result: extract::crop_decoded(
                &image::DynamicImage::new_rgba8(4, 4),
                &NormalizedRect::FULL,
                &worker.settings,
            ),
        }
    }

    #[test]
    fn completes_latest_request() {
        let mut worker = CropWorker::new(ExtractSettings::default());
        let id = worker.submit(CropRequest {
            key: "a".into(),
            source: png(40, 40),
            rect: NormalizedRect::new(0.25, 0.0, 0.5, 1.0),
        });
        assert!(worker.is_pending());

        let done = wait(&mut worker);
        assert_eq!(done.id, id);
        assert_eq!(done.key, "a");
        let output = done.result.unwrap();
        assert_eq!((output.width(), output.height()), (20, 40));
        assert!(!worker.is_pending());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut worker = CropWorker::new(ExtractSettings::default());
        let old = worker.submit(CropRequest {
            key: "old".into(),
            source: ImageSource::Bytes(Arc::from(&b"junk"[..])),
            rect: NormalizedRect::FULL,
        });
        let new = worker.submit(CropRequest {
            key: "new".into(),
            source: png(8, 8),
            rect: NormalizedRect::FULL,
        });
        assert!(new > old);

        let done = wait(&mut worker);
        assert_eq!(done.id, new);
        assert!(done.result.is_ok());
    }

    #[test]
    fn late_old_result_does_not_replace_newer_one() {
        let mut worker = CropWorker::new(ExtractSettings::default());
        worker.latest = Some(2);
        worker.tx.send(fake(&worker, 2, "new")).unwrap();
        worker.tx.send(fake(&worker, 1, "old")).unwrap();

        let done = worker.poll().unwrap();
        assert_eq!(done.key, "new");
        assert!(worker.poll().is_none());
    }

    #[test]
    fn cancelled_request_is_ignored() {
        let mut worker = CropWorker::new(ExtractSettings::default());
        worker.latest = Some(7);
        worker.cancel();
        worker.tx.send(fake(&worker, 7, "a")).unwrap();
        assert!(worker.poll().is_none());
        assert!(!worker.is_pending());
    }

    #[test]
    fn failed_extraction_is_reported() {
        let mut worker = CropWorker::new(ExtractSettings::default());
        worker.submit(CropRequest {
            key: "bad".into(),
            source: ImageSource::Bytes(Arc::from(&b"junk"[..])),
            rect: NormalizedRect::FULL,
        });
        let done = wait(&mut worker);
        assert!(matches!(done.result, Err(CropError::Decode(_))));
    }
}
