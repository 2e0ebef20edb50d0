//! Hands the confirmed crop selection from the sidebar to the display panel.
//!
//! The channel is created and owned by the application; the sidebar only
//! holds the sending half and does not know who listens.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::gallery::Photo;
use crate::geometry::NormalizedRect;

#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub photo: Photo,
    pub rect: NormalizedRect,
}

#[derive(Clone, Debug)]
pub struct SelectionSender {
    tx: Sender<Selection>,
}

#[derive(Debug)]
pub struct SelectionReceiver {
    rx: Receiver<Selection>,
}

pub fn channel() -> (SelectionSender, SelectionReceiver) {
    let (tx, rx) = mpsc::channel();
    (SelectionSender { tx }, SelectionReceiver { rx })
}

impl SelectionSender {
    /// Returns `false` when the receiving side is gone.
    pub fn publish(&self, selection: Selection) -> bool {
        log::debug!("selected {}", selection.photo.key);
        self.tx.send(selection).is_ok()
    }
}

impl SelectionReceiver {
    /// Drains pending selections and returns the newest one.
    pub fn latest(&self) -> Option<Selection> {
        self.rx.try_iter().last()
    }
}
