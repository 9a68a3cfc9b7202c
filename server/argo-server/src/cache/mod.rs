//! Query cache with typed keys and optimistic mutation support
//!
//! An explicit, dependency-injected store for list/detail/metadata query
//! results. Keys encode the resource name plus the full, canonically
//! serialized filter/sort/pagination state, so distinct views never collide.
//!
//! Mutations synchronize the cache in one of two ways:
//!
//! - **Invalidate-and-refetch**: [`QueryCache::invalidate_resources`] drops
//!   every entry of the touched resources; the next read re-executes the
//!   query.
//! - **Optimistic patch**: [`QueryCache::update_optimistic`] snapshots the
//!   affected entries BEFORE patching them, applies the patch, runs the
//!   server operation, restores the snapshots verbatim on failure, and
//!   still invalidates on success so server-computed fields (fx rate,
//!   reference number) are reconciled on the next read.
//!
//! Every resource has a per-resource epoch counter. Reads capture the epoch
//! when they start and only store their result if the epoch is unchanged,
//! so an in-flight fetch that started before an optimistic patch can never
//! clobber the patched state.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use uuid::Uuid;

/// Typed cache key: resource name plus the state that parameterizes the view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    List {
        resource: &'static str,
        state: String,
    },
    Detail {
        resource: &'static str,
        id: Uuid,
    },
    Metadata {
        resource: &'static str,
        state: String,
    },
}

impl CacheKey {
    /// Key for a list view parameterized by the full request state
    pub fn list<S: Serialize>(resource: &'static str, state: &S) -> Self {
        Self::List {
            resource,
            state: canonical_state(state),
        }
    }

    /// Key for a single-record detail view
    pub fn detail(resource: &'static str, id: Uuid) -> Self {
        Self::Detail { resource, id }
    }

    /// Key for a metadata/aggregate-count view
    pub fn metadata<S: Serialize>(resource: &'static str, state: &S) -> Self {
        Self::Metadata {
            resource,
            state: canonical_state(state),
        }
    }

    /// The resource this key belongs to
    pub fn resource(&self) -> &'static str {
        match self {
            Self::List { resource, .. }
            | Self::Detail { resource, .. }
            | Self::Metadata { resource, .. } => resource,
        }
    }
}

/// Canonical serialization of a state struct. Field order follows the
/// struct declaration, so equal states always produce equal keys.
fn canonical_state<S: Serialize>(state: &S) -> String {
    serde_json::to_string(state).unwrap_or_else(|_| "unserializable".to_string())
}

/// Resources whose cached views a mutation of `resource` can affect.
///
/// List rows carry joined display fields (company names, quote references),
/// so mutating one resource can stale the list views of several others.
/// Missing an entry here is an observable bug: stale counts or stale rows.
pub fn touched_resources(resource: &str) -> &'static [&'static str] {
    match resource {
        "quotes" => &["quotes", "rfqs", "followUps"],
        "rfqs" => &["rfqs", "quotes"],
        "companies" => &["companies", "people", "projects", "quotes", "rfqs", "registrations"],
        "people" => &["people", "quotes", "rfqs", "registrations", "followUps"],
        "projects" => &["projects", "quotes", "rfqs"],
        "registrations" => &["registrations"],
        "followUps" => &["followUps"],
        _ => &[],
    }
}

/// In-process query cache store
#[derive(Default)]
pub struct QueryCache {
    entries: DashMap<CacheKey, Value>,
    epochs: DashMap<&'static str, u64>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn resource_epoch(&self, resource: &'static str) -> u64 {
        self.epochs.get(resource).map(|e| *e).unwrap_or(0)
    }

    fn bump_resource(&self, resource: &'static str) {
        *self.epochs.entry(resource).or_insert(0) += 1;
    }

    /// Current cached value for a key, if any
    pub fn get_value(&self, key: &CacheKey) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Start a read: capture the epoch the result will be validated against
    pub fn begin_read(&self, key: &CacheKey) -> u64 {
        self.resource_epoch(key.resource())
    }

    /// Finish a read: store the result only if no mutation intervened.
    /// Returns whether the value was stored.
    pub fn complete_read(&self, key: &CacheKey, epoch: u64, value: Value) -> bool {
        if self.resource_epoch(key.resource()) != epoch {
            return false;
        }
        self.entries.insert(key.clone(), value);
        true
    }

    /// Drop one entry and cancel in-flight reads of its resource
    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.remove(key);
        self.bump_resource(key.resource());
    }

    /// Drop every entry (lists, metadata, details) of the given resources
    /// and cancel their in-flight reads
    pub fn invalidate_resources(&self, resources: &[&'static str]) {
        for resource in resources {
            self.entries.retain(|key, _| key.resource() != *resource);
            self.bump_resource(resource);
        }
    }

    /// Read-through helper: return the cached value, or run the loader and
    /// store its result (unless a mutation intervened while loading).
    pub async fn get_or_load<T, E, F, Fut>(&self, key: CacheKey, loader: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let epoch = self.begin_read(&key);

        if let Some(hit) = self.get_value(&key) {
            if let Ok(value) = serde_json::from_value::<T>(hit) {
                return Ok(value);
            }
            // Shape mismatch (e.g. after a deploy): fall through and reload.
        }

        let value = loader().await?;
        if let Ok(json) = serde_json::to_value(&value) {
            self.complete_read(&key, epoch, json);
        }
        Ok(value)
    }

    /// Run a mutation with an optimistic cache patch.
    ///
    /// Snapshots of every affected entry are captured BEFORE the patch is
    /// applied. On failure the snapshots are restored verbatim (entries
    /// that were absent are removed again); on success the keys are
    /// invalidated so the next read picks up server-computed fields.
    pub async fn update_optimistic<T, E, Fut>(
        &self,
        keys: Vec<CacheKey>,
        patch: impl Fn(&CacheKey, &mut Value),
        op: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let snapshots: Vec<(CacheKey, Option<Value>)> = keys
            .iter()
            .map(|key| (key.clone(), self.get_value(key)))
            .collect();

        // Cancel in-flight reads before patching so a stale fetch cannot
        // overwrite the optimistic state.
        for key in &keys {
            self.bump_resource(key.resource());
        }

        for key in &keys {
            if let Some(mut entry) = self.entries.get_mut(key) {
                patch(key, entry.value_mut());
            }
        }

        match op.await {
            Ok(result) => {
                for key in &keys {
                    self.invalidate(key);
                }
                Ok(result)
            }
            Err(err) => {
                for (key, snapshot) in snapshots {
                    match snapshot {
                        Some(value) => {
                            self.entries.insert(key, value);
                        }
                        None => {
                            self.entries.remove(&key);
                        }
                    }
                }
                Err(err)
            }
        }
    }

    /// Number of cached entries (for the status endpoint)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail_key() -> CacheKey {
        CacheKey::detail("quotes", Uuid::nil())
    }

    #[tokio::test]
    async fn test_rollback_restores_snapshot_field_for_field() {
        let cache = QueryCache::new();
        let key = detail_key();
        let original = json!({"id": "1", "value": 1000.0, "outcome": "PENDING"});
        let epoch = cache.begin_read(&key);
        cache.complete_read(&key, epoch, original.clone());

        let result: Result<(), &str> = cache
            .update_optimistic(
                vec![key.clone()],
                |_, value| {
                    value["outcome"] = json!("WON");
                    value["value"] = json!(2000.0);
                },
                async { Err("server rejected") },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(cache.get_value(&key), Some(original));
    }

    #[tokio::test]
    async fn test_rollback_removes_entries_that_were_absent() {
        let cache = QueryCache::new();
        let key = detail_key();

        let result: Result<(), &str> = cache
            .update_optimistic(
                vec![key.clone()],
                |_, value| {
                    value["outcome"] = json!("WON");
                },
                async { Err("boom") },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(cache.get_value(&key), None);
    }

    #[tokio::test]
    async fn test_success_invalidates_for_reconciliation() {
        let cache = QueryCache::new();
        let key = detail_key();
        let epoch = cache.begin_read(&key);
        cache.complete_read(&key, epoch, json!({"outcome": "PENDING"}));

        let result: Result<(), &str> = cache
            .update_optimistic(
                vec![key.clone()],
                |_, value| {
                    value["outcome"] = json!("WON");
                },
                async { Ok(()) },
            )
            .await;

        assert!(result.is_ok());
        // Invalidated, not left patched: server-computed fields must be
        // refetched.
        assert_eq!(cache.get_value(&key), None);
    }

    #[tokio::test]
    async fn test_patch_is_applied_while_mutation_runs() {
        let cache = QueryCache::new();
        let key = detail_key();
        let epoch = cache.begin_read(&key);
        cache.complete_read(&key, epoch, json!({"outcome": "PENDING"}));

        // Observe the cache from inside the op future, after the patch.
        let observed = {
            let patched = cache.get_value(&key);
            let result: Result<Option<Value>, &str> = cache
                .update_optimistic(
                    vec![key.clone()],
                    |_, value| {
                        value["outcome"] = json!("WON");
                    },
                    async { Ok(cache.get_value(&key)) },
                )
                .await;
            assert_eq!(patched, Some(json!({"outcome": "PENDING"})));
            result.expect("op succeeds")
        };

        assert_eq!(observed, Some(json!({"outcome": "WON"})));
    }

    #[tokio::test]
    async fn test_stale_in_flight_read_is_discarded() {
        let cache = QueryCache::new();
        let key = CacheKey::list("quotes", &json!({"page": 1}));

        let epoch = cache.begin_read(&key);

        // A mutation lands while the read is in flight.
        cache.invalidate_resources(&["quotes"]);

        assert!(!cache.complete_read(&key, epoch, json!({"data": []})));
        assert_eq!(cache.get_value(&key), None);
    }

    #[tokio::test]
    async fn test_invalidate_resources_is_scoped() {
        let cache = QueryCache::new();
        let quotes_key = CacheKey::list("quotes", &json!({}));
        let companies_key = CacheKey::list("companies", &json!({}));
        let e1 = cache.begin_read(&quotes_key);
        cache.complete_read(&quotes_key, e1, json!(1));
        let e2 = cache.begin_read(&companies_key);
        cache.complete_read(&companies_key, e2, json!(2));

        cache.invalidate_resources(&["quotes"]);

        assert_eq!(cache.get_value(&quotes_key), None);
        assert_eq!(cache.get_value(&companies_key), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_get_or_load_caches_result() {
        let cache = QueryCache::new();
        let key = CacheKey::list("quotes", &json!({"page": 1}));

        let first: Result<i64, ()> = cache.get_or_load(key.clone(), || async { Ok(41) }).await;
        assert_eq!(first, Ok(41));

        // Second call must come from the cache, not the loader.
        let second: Result<i64, ()> = cache
            .get_or_load(key.clone(), || async { panic!("loader re-run on cache hit") })
            .await;
        assert_eq!(second, Ok(41));
    }

    #[test]
    fn test_distinct_states_produce_distinct_keys() {
        let a = CacheKey::list("quotes", &json!({"page": 1, "perPage": 40}));
        let b = CacheKey::list("quotes", &json!({"page": 2, "perPage": 40}));
        assert_ne!(a, b);

        let c = CacheKey::list("quotes", &json!({"page": 1, "perPage": 40}));
        assert_eq!(a, c);
    }

    #[test]
    fn test_touched_resources_include_self() {
        for resource in [
            "quotes",
            "rfqs",
            "companies",
            "people",
            "projects",
            "registrations",
            "followUps",
        ] {
            assert!(
                touched_resources(resource).contains(&resource),
                "{} must invalidate its own views",
                resource
            );
        }
    }
}
