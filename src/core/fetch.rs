//! Download coalescing for remote scraper images
//!
//! Several thumbnails (list row, detail header, backdrop) often ask for the same
//! poster at once. `CoalescingFetcher` keeps a registry of in-flight downloads
//! keyed by URL: the first caller runs the download, later callers block on the
//! same entry and receive its outcome. The entry is dropped once complete, so a
//! later request after failure tries again.
//!
//! The registry is an owned value; share it with `Arc` instead of a global.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};

use log::{debug, trace};

use crate::entities::{FetchError, ImageFetcher, RemoteImage};

type Outcome = Result<PathBuf, FetchError>;

/// One download in progress; waiters sleep on `ready`.
#[derive(Debug, Default)]
struct InFlight {
    outcome: Mutex<Option<Outcome>>,
    ready: Condvar,
}

impl InFlight {
    fn complete(&self, outcome: Outcome) {
        let mut slot = self.outcome.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(outcome);
        self.ready.notify_all();
    }

    fn wait(&self) -> Outcome {
        let mut slot = self.outcome.lock().unwrap_or_else(|e| e.into_inner());
        while slot.is_none() {
            slot = self.ready.wait(slot).unwrap_or_else(|e| e.into_inner());
        }
        slot.clone().unwrap_or(Err(FetchError::Aborted))
    }
}

/// Completes the entry and unregisters it even if the inner fetcher panics.
struct Completion<'a, F: ImageFetcher> {
    owner: &'a CoalescingFetcher<F>,
    url: &'a str,
    entry: Arc<InFlight>,
    outcome: Option<Outcome>,
}

impl<F: ImageFetcher> Drop for Completion<'_, F> {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or(Err(FetchError::Aborted));
        self.owner
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(self.url);
        self.entry.complete(outcome);
    }
}

/// Wraps a fetcher so concurrent requests for the same URL share one download
pub struct CoalescingFetcher<F: ImageFetcher> {
    inner: F,
    in_flight: Mutex<HashMap<String, Arc<InFlight>>>,
}

impl<F: ImageFetcher> CoalescingFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Number of downloads currently running
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: ImageFetcher> ImageFetcher for CoalescingFetcher<F> {
    fn download_if_absent(&self, image: &RemoteImage) -> Result<PathBuf, FetchError> {
        let (entry, is_owner) = {
            let mut map = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            match map.get(&image.url) {
                Some(existing) => (Arc::clone(existing), false),
                None => {
                    let entry = Arc::new(InFlight::default());
                    map.insert(image.url.clone(), Arc::clone(&entry));
                    (entry, true)
                }
            }
        };

        if !is_owner {
            trace!("Joining in-flight download of {}", image.url);
            return entry.wait();
        }

        debug!("Downloading {}", image.url);
        let mut completion = Completion {
            owner: self,
            url: &image.url,
            entry,
            outcome: None,
        };
        let outcome = self.inner.download_if_absent(image);
        completion.outcome = Some(outcome.clone());
        drop(completion);
        outcome
    }
}

/// Fetcher for images that are already on local storage: succeeds iff the
/// descriptor's local file exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileFetcher;

impl ImageFetcher for LocalFileFetcher {
    fn download_if_absent(&self, image: &RemoteImage) -> Result<PathBuf, FetchError> {
        if image.local_path.is_file() {
            Ok(image.local_path.clone())
        } else {
            Err(FetchError::NotFound(image.url.clone()))
        }
    }
}
