//! Deferred image resolution.
//!
//! Cards carry their real image URL in a side slot (`data-src`). The loader
//! watches those slots and hands out the URL the first time an image enters
//! the viewport, after which the image is no longer watched.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ImageId(pub u64);

#[derive(Debug, Default)]
pub struct LazyImageLoader {
    watched: BTreeMap<ImageId, String>,
    resolved: BTreeMap<ImageId, String>,
}

impl LazyImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a batch of freshly rendered deferred images.
    ///
    /// Safe to call repeatedly with overlapping batches: images already
    /// watched or already resolved are skipped. Returns how many were
    /// newly registered.
    pub fn observe<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = (ImageId, String)>,
    {
        let mut added = 0;
        for (id, data_src) in batch {
            if self.resolved.contains_key(&id) || self.watched.contains_key(&id) {
                continue;
            }
            self.watched.insert(id, data_src);
            added += 1;
        }
        added
    }

    /// The image scrolled into view. Returns its real URL the first time,
    /// `None` afterwards.
    pub fn enter_viewport(&mut self, id: ImageId) -> Option<String> {
        let url = self.watched.remove(&id)?;
        self.resolved.insert(id, url.clone());
        Some(url)
    }

    /// The visible `src` of an image, once resolved.
    pub fn src(&self, id: ImageId) -> Option<&str> {
        self.resolved.get(&id).map(String::as_str)
    }

    pub fn is_watched(&self, id: ImageId) -> bool {
        self.watched.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.watched.len()
    }

    /// Forget everything; used when a new search clears the view.
    pub fn reset(&mut self) {
        self.watched.clear();
        self.resolved.clear();
    }
}
