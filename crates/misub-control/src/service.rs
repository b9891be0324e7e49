//! Control plane service implementation.
//!
//! This module provides the `AdminPlane` trait and the `AdminService`
//! implementation that reads and writes the dashboard collections.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use misub_core::NodeGroupId;
use misub_store::{keys, KvStore, NodeGroup, StoreError, Version};
use serde_json::{json, Value};

use crate::error::{ControlError, Result};
use crate::node_groups;
use crate::types::{
    ControlConfig, DashboardData, NodeGroupInput, SaveMisubsRequest, UpsertResult,
};

/// Trait defining the control plane operations.
///
/// The gateway talks to storage only through this trait.
#[async_trait]
pub trait AdminPlane: Send + Sync {
    /// Short name of the storage backend, for diagnostics.
    fn backend(&self) -> &'static str;

    /// Load subscriptions, profiles and worker settings in one go.
    ///
    /// Missing keys read as `[]`, `[]` and `{}` respectively.
    async fn load_dashboard(&self) -> Result<DashboardData>;

    /// Replace the subscription and profile collections.
    ///
    /// The two writes are independent; a failure between them leaves the
    /// subscriptions updated and the profiles stale.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Validation` unless both fields are arrays.
    async fn save_misubs(&self, request: SaveMisubsRequest) -> Result<()>;

    /// Return every stored node group in order.
    async fn list_node_groups(&self) -> Result<Vec<NodeGroup>>;

    /// Create a node group, or update one when the input names an id.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Validation`, `ControlError::DuplicateName` or
    /// `ControlError::GroupNotFound` for bad input.
    async fn upsert_node_group(&self, input: NodeGroupInput) -> Result<UpsertResult>;

    /// Delete a node group and return the remaining collection.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::GroupNotFound` if no group has that id.
    async fn delete_node_group(&self, id: &str) -> Result<Vec<NodeGroup>>;
}

/// The main control plane service implementation.
pub struct AdminService<S: KvStore> {
    store: Arc<S>,
    config: ControlConfig,
}

impl<S: KvStore> AdminService<S> {
    /// Create a new control plane service.
    #[must_use]
    pub fn new(store: Arc<S>, config: ControlConfig) -> Self {
        Self { store, config }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, ControlConfig::default())
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_or(&self, key: &str, default: Value) -> Result<Value> {
        Ok(self
            .store
            .get_value(key)?
            .filter(|value| !value.is_null())
            .unwrap_or(default))
    }

    /// Read the node group collection along with its version.
    fn read_node_groups(&self) -> Result<(Vec<NodeGroup>, Option<Version>)> {
        let Some(stored) = self.store.get(keys::NODE_GROUPS)? else {
            return Ok((Vec::new(), None));
        };

        let groups = if stored.value.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(stored.value)
                .map_err(|e| StoreError::Serialization(e.to_string()))?
        };

        Ok((groups, Some(stored.version)))
    }

    /// Run `apply` against the latest snapshot and write the result back.
    ///
    /// A concurrent write between the read and the write makes the
    /// compare-and-swap fail; the whole cycle then reruns on fresh data, so
    /// validation and uniqueness checks always see what gets persisted.
    fn mutate_node_groups<T>(
        &self,
        mut apply: impl FnMut(&mut Vec<NodeGroup>) -> Result<T>,
    ) -> Result<(T, Vec<NodeGroup>)> {
        let attempts = self.config.max_write_attempts.max(1);

        for attempt in 1..=attempts {
            let (mut groups, version) = self.read_node_groups()?;
            let outcome = apply(&mut groups)?;

            let value = serde_json::to_value(&groups)
                .map_err(|e| ControlError::Internal(e.to_string()))?;

            match self
                .store
                .compare_and_swap(keys::NODE_GROUPS, version, &value)
            {
                Ok(_) => return Ok((outcome, groups)),
                Err(err) if err.is_conflict() => {
                    tracing::debug!(attempt, error = %err, "Node group write lost a race; retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::warn!(attempts, "Giving up on contended node group write");
        Err(ControlError::WriteContention { attempts })
    }
}

#[async_trait]
impl<S: KvStore + 'static> AdminPlane for AdminService<S> {
    fn backend(&self) -> &'static str {
        self.store.backend()
    }

    async fn load_dashboard(&self) -> Result<DashboardData> {
        Ok(DashboardData {
            misubs: self.read_or(keys::SUBSCRIPTIONS, json!([]))?,
            profiles: self.read_or(keys::PROFILES, json!([]))?,
            config: self.read_or(keys::WORKER_CONFIG, json!({}))?,
        })
    }

    async fn save_misubs(&self, request: SaveMisubsRequest) -> Result<()> {
        let (Some(misubs @ Value::Array(_)), Some(profiles @ Value::Array(_))) =
            (request.misubs, request.profiles)
        else {
            return Err(ControlError::Validation(
                "misubs and profiles must both be arrays".to_string(),
            ));
        };

        self.store.put(keys::SUBSCRIPTIONS, &misubs)?;
        self.store.put(keys::PROFILES, &profiles)?;

        tracing::info!(
            misubs = misubs.as_array().map_or(0, Vec::len),
            profiles = profiles.as_array().map_or(0, Vec::len),
            "Saved subscription data"
        );

        Ok(())
    }

    async fn list_node_groups(&self) -> Result<Vec<NodeGroup>> {
        Ok(self.read_node_groups()?.0)
    }

    async fn upsert_node_group(&self, input: NodeGroupInput) -> Result<UpsertResult> {
        let draft = node_groups::validate(input)?;

        let ((kind, index), groups) = self.mutate_node_groups(|groups| {
            node_groups::apply_upsert(groups, draft.clone(), Utc::now())
        })?;

        let group = groups[index].clone();
        tracing::info!(
            group_id = %group.id,
            name = %group.name,
            nodes = group.node_ids.len(),
            outcome = ?kind,
            "Saved node group"
        );

        Ok(UpsertResult {
            kind,
            group,
            groups,
        })
    }

    async fn delete_node_group(&self, id: &str) -> Result<Vec<NodeGroup>> {
        let id = NodeGroupId::parse(id.trim())
            .map_err(|_| ControlError::Validation(node_groups::ID_REQUIRED.to_string()))?;

        let (removed, groups) =
            self.mutate_node_groups(|groups| node_groups::apply_delete(groups, &id))?;

        tracing::info!(
            group_id = %removed.id,
            name = %removed.name,
            remaining = groups.len(),
            "Deleted node group"
        );

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UpsertKind;
    use misub_store::{MemoryStore, Versioned};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn setup() -> AdminService<MemoryStore> {
        AdminService::with_defaults(Arc::new(MemoryStore::new()))
    }

    fn input(value: Value) -> NodeGroupInput {
        serde_json::from_value(value).unwrap()
    }

    /// Store wrapper that lets a competing writer sneak in right before the
    /// next compare-and-swap on the node group key.
    struct InterleavingStore {
        inner: MemoryStore,
        competitor: Mutex<Option<Box<dyn FnOnce(&MemoryStore) + Send>>>,
    }

    impl InterleavingStore {
        fn new(competitor: impl FnOnce(&MemoryStore) + Send + 'static) -> Self {
            Self {
                inner: MemoryStore::new(),
                competitor: Mutex::new(Some(Box::new(competitor))),
            }
        }
    }

    impl KvStore for InterleavingStore {
        fn backend(&self) -> &'static str {
            "interleaving"
        }

        fn get(&self, key: &str) -> misub_store::Result<Option<Versioned>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &Value) -> misub_store::Result<Version> {
            self.inner.put(key, value)
        }

        fn compare_and_swap(
            &self,
            key: &str,
            expected: Option<Version>,
            value: &Value,
        ) -> misub_store::Result<Version> {
            if key == keys::NODE_GROUPS {
                if let Some(competitor) = self.competitor.lock().take() {
                    competitor(&self.inner);
                }
            }
            self.inner.compare_and_swap(key, expected, value)
        }
    }

    fn competing_group(name: &'static str) -> impl FnOnce(&MemoryStore) + Send {
        move |store: &MemoryStore| {
            let now = Utc::now().to_rfc3339();
            store
                .put(
                    keys::NODE_GROUPS,
                    &json!([{
                        "id": "competitor",
                        "name": name,
                        "nodeIds": ["x"],
                        "enabled": true,
                        "createdAt": now,
                        "updatedAt": now
                    }]),
                )
                .unwrap();
        }
    }

    #[tokio::test]
    async fn empty_store_dashboard_defaults() {
        let service = setup();
        let data = service.load_dashboard().await.unwrap();
        assert_eq!(data.misubs, json!([]));
        assert_eq!(data.profiles, json!([]));
        assert_eq!(data.config, json!({}));
    }

    #[tokio::test]
    async fn save_misubs_then_load() {
        let service = setup();
        service
            .store()
            .put(keys::WORKER_CONFIG, &json!({ "FileName": "MiSub" }))
            .unwrap();

        let request = SaveMisubsRequest {
            misubs: Some(json!([{ "id": "s1", "url": "https://a.example/sub" }])),
            profiles: Some(json!([{ "id": "p1", "name": "Default" }])),
        };
        service.save_misubs(request).await.unwrap();

        let data = service.load_dashboard().await.unwrap();
        assert_eq!(data.misubs[0]["id"], "s1");
        assert_eq!(data.profiles[0]["name"], "Default");
        assert_eq!(data.config["FileName"], "MiSub");
    }

    #[tokio::test]
    async fn save_misubs_requires_arrays() {
        let service = setup();
        for request in [
            SaveMisubsRequest::default(),
            SaveMisubsRequest {
                misubs: Some(json!([])),
                profiles: None,
            },
            SaveMisubsRequest {
                misubs: Some(json!({})),
                profiles: Some(json!([])),
            },
        ] {
            let result = service.save_misubs(request).await;
            assert!(matches!(result, Err(ControlError::Validation(_))));
        }
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn node_group_round_trip() {
        let service = setup();

        let created = service
            .upsert_node_group(input(json!({ "name": "Asia", "nodeIds": ["n1", "n2"] })))
            .await
            .unwrap();
        assert_eq!(created.kind, UpsertKind::Created);
        assert_eq!(service.list_node_groups().await.unwrap(), created.groups);

        tokio::time::sleep(Duration::from_millis(5)).await;

        let id = created.group.id.to_string();
        let updated = service
            .upsert_node_group(input(json!({ "id": id, "name": "Asia", "nodeIds": ["n3"] })))
            .await
            .unwrap();
        assert_eq!(updated.kind, UpsertKind::Updated);
        assert_eq!(updated.group.created_at, created.group.created_at);
        assert!(updated.group.updated_at > created.group.updated_at);
        assert_eq!(updated.group.node_ids, vec!["n3"]);

        let remaining = service.delete_node_group(&id).await.unwrap();
        assert!(remaining.is_empty());
        assert!(service.list_node_groups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_validation_writes_nothing() {
        let service = setup();
        let result = service
            .upsert_node_group(input(json!({ "name": "Asia", "nodeIds": [] })))
            .await;
        assert!(matches!(result, Err(ControlError::Validation(_))));
        assert!(service.store().get(keys::NODE_GROUPS).unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_unknown_leaves_collection_unchanged() {
        let service = setup();
        service
            .upsert_node_group(input(json!({ "name": "Asia", "nodeIds": ["n1"] })))
            .await
            .unwrap();
        let before = service.store().get(keys::NODE_GROUPS).unwrap().unwrap();

        let result = service.delete_node_group("missing").await;
        assert!(matches!(result, Err(ControlError::GroupNotFound(_))));

        let after = service.store().get(keys::NODE_GROUPS).unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn delete_requires_id() {
        let service = setup();
        let result = service.delete_node_group("  ").await;
        assert!(
            matches!(result, Err(ControlError::Validation(message)) if message == node_groups::ID_REQUIRED)
        );
    }

    #[tokio::test]
    async fn concurrent_create_is_not_lost() {
        // Both writers read the same empty snapshot; the competitor's write
        // lands first and ours must be retried on top of it.
        let store = Arc::new(InterleavingStore::new(competing_group("Europe")));
        let service = AdminService::with_defaults(Arc::clone(&store));

        let result = service
            .upsert_node_group(input(json!({ "name": "Asia", "nodeIds": ["n1"] })))
            .await
            .unwrap();

        let names: Vec<_> = result.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Europe", "Asia"]);
        assert_eq!(service.list_node_groups().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn retry_rechecks_uniqueness() {
        let store = Arc::new(InterleavingStore::new(competing_group("Asia")));
        let service = AdminService::with_defaults(Arc::clone(&store));

        let result = service
            .upsert_node_group(input(json!({ "name": "Asia", "nodeIds": ["n1"] })))
            .await;
        assert!(matches!(result, Err(ControlError::DuplicateName(_))));

        let groups = service.list_node_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id.as_str(), "competitor");
    }

    #[tokio::test]
    async fn contention_gives_up_after_configured_attempts() {
        let store = Arc::new(InterleavingStore::new(competing_group("Europe")));
        let service = AdminService::new(
            Arc::clone(&store),
            ControlConfig {
                max_write_attempts: 1,
            },
        );

        let result = service
            .upsert_node_group(input(json!({ "name": "Asia", "nodeIds": ["n1"] })))
            .await;
        assert!(matches!(
            result,
            Err(ControlError::WriteContention { attempts: 1 })
        ));

        // The competitor's write is intact; ours never landed.
        let groups = service.list_node_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Europe");
    }

    /// Store whose conditional writes always fail with a database fault.
    #[derive(Default)]
    struct FaultyStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl KvStore for FaultyStore {
        fn backend(&self) -> &'static str {
            "faulty"
        }

        fn get(&self, key: &str) -> misub_store::Result<Option<Versioned>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &Value) -> misub_store::Result<Version> {
            self.inner.put(key, value)
        }

        fn compare_and_swap(
            &self,
            _key: &str,
            _expected: Option<Version>,
            _value: &Value,
        ) -> misub_store::Result<Version> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Database("disk unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn store_fault_is_not_retried() {
        let store = Arc::new(FaultyStore::default());
        let service = AdminService::with_defaults(Arc::clone(&store));

        let result = service
            .upsert_node_group(input(json!({ "name": "Asia", "nodeIds": ["n1"] })))
            .await;
        assert!(matches!(
            result,
            Err(ControlError::Store(StoreError::Database(_)))
        ));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn corrupt_collection_surfaces_store_error() {
        let service = setup();
        service
            .store()
            .put(keys::NODE_GROUPS, &json!({ "not": "a list" }))
            .unwrap();

        let result = service.list_node_groups().await;
        assert!(matches!(
            result,
            Err(ControlError::Store(StoreError::Serialization(_)))
        ));
    }
}
