//! Per-resource response cache: the client-side synchronization contract
//! between screen state and the remote API.
//!
//! Each cached collection is addressed by an optional filter (the cache key
//! is effectively `(resource, filter)` since every resource gets its own
//! `Cache`). Fetches are stamped with a per-resource monotonic sequence
//! number and responses older than the newest fetch begun for their key are
//! discarded, so rapid re-fetches cannot be clobbered by a slow earlier
//! response. Mutations invalidate every entry of the resource regardless of
//! filter; stale data stays visible until the replacement lands.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// A fetch is in flight for this key.
    Loading,
    /// The cached data matches the last applied response.
    Ready,
    /// Invalidated by a mutation; the next read must re-fetch.
    Stale,
    /// The last fetch for this key failed; previous data (if any) is kept.
    Failed,
}

#[derive(Debug)]
struct Entry<T> {
    data: Option<Vec<T>>,
    status: QueryStatus,
    /// Sequence number of the newest fetch begun for this key.
    newest_seq: u64,
    last_updated: Option<Instant>,
}

pub struct Cache<T> {
    name: &'static str,
    entries: HashMap<Option<String>, Entry<T>>,
    seq: u64,
}

impl<T> Cache<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: HashMap::new(),
            seq: 0,
        }
    }

    /// Record the start of a fetch for `filter` and return its sequence
    /// stamp. Existing data stays visible while the request is in flight.
    pub fn begin_fetch(&mut self, filter: Option<&str>) -> u64 {
        self.seq += 1;
        let seq = self.seq;
        let entry = self
            .entries
            .entry(filter.map(str::to_string))
            .or_insert_with(|| Entry {
                data: None,
                status: QueryStatus::Loading,
                newest_seq: seq,
                last_updated: None,
            });
        entry.status = QueryStatus::Loading;
        entry.newest_seq = seq;
        debug!(resource = self.name, ?filter, seq, "fetch started");
        seq
    }

    /// Apply a finished fetch. Returns false when the response was discarded
    /// because a newer fetch has since begun for the same key.
    pub fn apply(
        &mut self,
        filter: Option<&str>,
        seq: u64,
        result: Result<Vec<T>, ApiError>,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&filter.map(str::to_string)) else {
            return false;
        };
        if seq < entry.newest_seq {
            debug!(
                resource = self.name,
                ?filter,
                seq,
                newest = entry.newest_seq,
                "stale response discarded"
            );
            return false;
        }
        match result {
            Ok(data) => {
                entry.data = Some(data);
                entry.status = QueryStatus::Ready;
                entry.last_updated = Some(Instant::now());
            }
            Err(err) => {
                debug!(resource = self.name, ?filter, %err, "fetch failed");
                entry.status = QueryStatus::Failed;
            }
        }
        true
    }

    /// Mark every entry of this resource stale, whatever its filter. The
    /// next read for each key re-fetches.
    pub fn invalidate(&mut self) {
        debug!(resource = self.name, "invalidated");
        for entry in self.entries.values_mut() {
            entry.status = QueryStatus::Stale;
        }
    }

    /// Whether a fetch should be issued for this key: nothing cached yet or
    /// the entry was invalidated. In-flight and failed keys are not
    /// re-fetched automatically (failed ones wait for an explicit refresh).
    pub fn should_fetch(&self, filter: Option<&str>) -> bool {
        match self.entries.get(&filter.map(str::to_string)) {
            None => true,
            Some(entry) => entry.status == QueryStatus::Stale,
        }
    }

    pub fn is_loading(&self, filter: Option<&str>) -> bool {
        self.status(filter) == Some(QueryStatus::Loading)
    }

    pub fn status(&self, filter: Option<&str>) -> Option<QueryStatus> {
        self.entries
            .get(&filter.map(str::to_string))
            .map(|e| e.status)
    }

    /// Cached collection for this key; empty until a first response lands.
    pub fn data(&self, filter: Option<&str>) -> &[T] {
        self.entries
            .get(&filter.map(str::to_string))
            .and_then(|e| e.data.as_deref())
            .unwrap_or(&[])
    }

    pub fn last_updated(&self, filter: Option<&str>) -> Option<Instant> {
        self.entries
            .get(&filter.map(str::to_string))
            .and_then(|e| e.last_updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn cache() -> Cache<u32> {
        Cache::new("test")
    }

    #[test]
    fn missing_entry_wants_fetch_and_renders_empty() {
        let c = cache();
        assert!(c.should_fetch(None));
        assert!(c.data(None).is_empty());
        assert_eq!(c.status(None), None);
    }

    #[test]
    fn fetch_replaces_collection_for_exact_key() {
        let mut c = cache();
        let seq = c.begin_fetch(Some("documents"));
        assert!(c.is_loading(Some("documents")));
        assert!(c.apply(Some("documents"), seq, Ok(vec![1, 2])));
        assert_eq!(c.data(Some("documents")), &[1, 2]);
        assert_eq!(c.status(Some("documents")), Some(QueryStatus::Ready));
        // The unfiltered key is untouched.
        assert!(c.should_fetch(None));
    }

    #[test]
    fn stale_data_stays_visible_during_refetch() {
        let mut c = cache();
        let seq = c.begin_fetch(None);
        c.apply(None, seq, Ok(vec![1]));
        c.invalidate();
        assert_eq!(c.data(None), &[1]);
        c.begin_fetch(None);
        assert_eq!(c.data(None), &[1]);
        assert!(c.is_loading(None));
    }

    #[test]
    fn out_of_order_response_is_discarded() {
        let mut c = cache();
        let first = c.begin_fetch(None);
        let second = c.begin_fetch(None);
        assert!(c.apply(None, second, Ok(vec![2])));
        assert!(!c.apply(None, first, Ok(vec![1])));
        assert_eq!(c.data(None), &[2]);
    }

    #[test]
    fn late_response_does_not_overwrite_newer_inflight_marker() {
        let mut c = cache();
        let first = c.begin_fetch(None);
        let second = c.begin_fetch(None);
        // The older response lands first and is dropped; the key stays
        // Loading until the newer one arrives.
        assert!(!c.apply(None, first, Ok(vec![1])));
        assert!(c.is_loading(None));
        assert!(c.apply(None, second, Ok(vec![2])));
        assert_eq!(c.data(None), &[2]);
    }

    #[test]
    fn invalidate_marks_every_filter_stale() {
        let mut c = cache();
        let a = c.begin_fetch(None);
        c.apply(None, a, Ok(vec![1]));
        let b = c.begin_fetch(Some("visa"));
        c.apply(Some("visa"), b, Ok(vec![2]));
        c.invalidate();
        assert!(c.should_fetch(None));
        assert!(c.should_fetch(Some("visa")));
        // Data survives invalidation until the refetch lands.
        assert_eq!(c.data(None), &[1]);
        assert_eq!(c.data(Some("visa")), &[2]);
    }

    #[test]
    fn failed_fetch_is_an_explicit_state() {
        let mut c = cache();
        let seq = c.begin_fetch(None);
        c.apply(
            None,
            seq,
            Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR)),
        );
        assert_eq!(c.status(None), Some(QueryStatus::Failed));
        // Not re-fetched automatically; an explicit refresh restarts it.
        assert!(!c.should_fetch(None));
    }

    #[test]
    fn failed_refetch_keeps_previous_data() {
        let mut c = cache();
        let seq = c.begin_fetch(None);
        c.apply(None, seq, Ok(vec![1]));
        let seq = c.begin_fetch(None);
        c.apply(None, seq, Err(ApiError::Status(StatusCode::BAD_GATEWAY)));
        assert_eq!(c.status(None), Some(QueryStatus::Failed));
        assert_eq!(c.data(None), &[1]);
    }

    #[test]
    fn successful_apply_stamps_the_sync_time() {
        let mut c = cache();
        assert!(c.last_updated(None).is_none());
        let seq = c.begin_fetch(None);
        assert!(c.last_updated(None).is_none());
        c.apply(None, seq, Ok(vec![1]));
        let stamped = c.last_updated(None);
        assert!(stamped.is_some());
        // A failed refetch keeps the stamp of the last good response.
        let seq = c.begin_fetch(None);
        c.apply(None, seq, Err(ApiError::Status(StatusCode::BAD_GATEWAY)));
        assert_eq!(c.last_updated(None), stamped);
    }

    #[test]
    fn in_flight_key_is_not_fetched_again() {
        let mut c = cache();
        c.begin_fetch(None);
        assert!(!c.should_fetch(None));
    }
}
