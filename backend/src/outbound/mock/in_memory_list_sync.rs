//! In-memory list sync strategy.
//!
//! Serves the same operations as the Persistence Service over a seeded
//! collection. Every call waits for the configured latency first so the
//! propose/commit path behaves as it does against the remote store.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{ListSyncError, ListSyncStrategy};
use crate::domain::{ListId, ListPatch, NewShoppingList, Session, ShoppingList};

/// Artificial delay applied to every call unless overridden.
pub const DEFAULT_MOCK_LATENCY: Duration = Duration::from_millis(200);

/// List sync strategy over an in-memory collection.
#[derive(Debug)]
pub struct InMemoryListSync {
    lists: Mutex<Vec<ShoppingList>>,
    latency: Duration,
}

impl InMemoryListSync {
    /// Strategy seeded with `lists` and the [`DEFAULT_MOCK_LATENCY`].
    pub fn new(lists: Vec<ShoppingList>) -> Self {
        Self {
            lists: Mutex::new(lists),
            latency: DEFAULT_MOCK_LATENCY,
        }
    }

    /// Replace the artificial delay.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Copy of the stored collection.
    pub fn snapshot(&self) -> Vec<ShoppingList> {
        self.lists
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl ListSyncStrategy for InMemoryListSync {
    async fn list(
        &self,
        _session: &Session,
        archived: Option<bool>,
    ) -> Result<Vec<ShoppingList>, ListSyncError> {
        self.delay().await;
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|list| archived.is_none_or(|flag| list.is_archived() == flag))
            .collect())
    }

    async fn get(&self, _session: &Session, id: &ListId) -> Result<ShoppingList, ListSyncError> {
        self.delay().await;
        self.lists
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|list| list.id() == id)
            .cloned()
            .ok_or_else(|| ListSyncError::not_found(id.as_ref()))
    }

    async fn create(
        &self,
        _session: &Session,
        request: &NewShoppingList,
    ) -> Result<ShoppingList, ListSyncError> {
        self.delay().await;
        let id = ListId::new(Uuid::new_v4().to_string())
            .map_err(|error| ListSyncError::network(error.to_string()))?;
        let list = ShoppingList::new(id, request.title.clone(), request.owner_id.clone());
        self.lists
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(list.clone());
        Ok(list)
    }

    async fn update(
        &self,
        _session: &Session,
        id: &ListId,
        patch: &ListPatch,
        expected_revision: Option<u64>,
    ) -> Result<ShoppingList, ListSyncError> {
        self.delay().await;
        let mut lists = self.lists.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = lists
            .iter_mut()
            .find(|list| list.id() == id)
            .ok_or_else(|| ListSyncError::not_found(id.as_ref()))?;
        if let Some(expected) = expected_revision {
            if slot.revision() != expected {
                return Err(ListSyncError::conflict(format!(
                    "expected revision {expected}, found {}",
                    slot.revision()
                )));
            }
        }
        let revision = slot.revision() + 1;
        let next = slot
            .apply_patch(patch)
            .map_err(|error| ListSyncError::conflict(error.to_string()))?
            .with_revision(revision);
        *slot = next.clone();
        Ok(next)
    }

    async fn delete(&self, _session: &Session, id: &ListId) -> Result<(), ListSyncError> {
        self.delay().await;
        let mut lists = self.lists.lock().unwrap_or_else(PoisonError::into_inner);
        let before = lists.len();
        lists.retain(|list| list.id() != id);
        if lists.len() == before {
            return Err(ListSyncError::not_found(id.as_ref()));
        }
        Ok(())
    }
}
