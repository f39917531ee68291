use parking_lot::RwLock;
use std::collections::HashSet;

use crate::models::HiringRequest;

/// Local copy of the most recent request listing.
///
/// Every fetch replaces the whole book, so repeated listings never
/// accumulate duplicates. Single-request updates are applied in place.
#[derive(Debug, Default)]
pub struct RequestBook {
    requests: RwLock<Vec<HiringRequest>>,
}

impl RequestBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a fresh listing; the first occurrence of an
    /// id wins.
    pub fn replace_all(&self, listing: Vec<HiringRequest>) -> Vec<HiringRequest> {
        let mut seen = HashSet::new();
        let deduped: Vec<HiringRequest> = listing
            .into_iter()
            .filter(|r| seen.insert(r.id))
            .collect();
        *self.requests.write() = deduped.clone();
        deduped
    }

    /// Insert or replace a single request.
    pub fn upsert(&self, request: HiringRequest) {
        let mut requests = self.requests.write();
        match requests.iter_mut().find(|r| r.id == request.id) {
            Some(existing) => *existing = request,
            None => requests.push(request),
        }
    }

    pub fn remove(&self, id: u64) -> bool {
        let mut requests = self.requests.write();
        let before = requests.len();
        requests.retain(|r| r.id != id);
        requests.len() != before
    }

    pub fn get(&self, id: u64) -> Option<HiringRequest> {
        self.requests.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.requests.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.read().is_empty()
    }
}
