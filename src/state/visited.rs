/// Visited-URL tracking for a single crawl run
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Concurrent set of URLs that have been claimed for processing
///
/// The membership check and the insertion happen under one lock, so for any
/// URL exactly one caller of [`VisitedSet::try_visit`] ever sees `true`. That
/// caller owns the URL and is the only one allowed to create work for it.
/// URLs are compared as raw strings; callers normalize before asking.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL
    ///
    /// # Returns
    ///
    /// * `true` - The URL was absent and is now recorded; the caller owns it
    /// * `false` - The URL was already claimed
    pub fn try_visit(&self, url: &str) -> bool {
        let mut urls = self.urls.lock().unwrap_or_else(PoisonError::into_inner);
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    /// Returns true if the URL has been claimed
    pub fn contains(&self, url: &str) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    /// Returns the number of claimed URLs
    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
