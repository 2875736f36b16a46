//! Driven port for persisting shopping lists.
//!
//! One trait, two adapters: the in-memory mock store and the remote
//! Persistence Service. The strategy is chosen once at startup and the list
//! store never branches on which one it holds.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{ListId, ListPatch, NewShoppingList, Session, ShoppingList};

define_port_error! {
    /// Errors surfaced by a list sync strategy.
    pub enum ListSyncError {
        /// Credential missing, rejected, or lacking permission.
        Unauthorized { message: String } =>
            "persistence refused the request: {message}",
        /// The list does not exist on the persistence side.
        NotFound { list_id: String } =>
            "list {list_id} does not exist",
        /// Stored revision differs from the one the caller last read.
        Conflict { message: String } =>
            "list revision conflict: {message}",
        /// Transport failed or the service answered with an unexpected status.
        Network { message: String } =>
            "persistence transport failed: {message}",
        /// Call did not complete in time.
        Timeout { message: String } =>
            "persistence timeout: {message}",
        /// Response body could not be decoded.
        Decode { message: String } =>
            "persistence response decode failed: {message}",
    }
}

/// Port for reading and writing shopping lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListSyncStrategy: Send + Sync {
    /// Every list the session can see; `archived` filters when set.
    async fn list(
        &self,
        session: &Session,
        archived: Option<bool>,
    ) -> Result<Vec<ShoppingList>, ListSyncError>;

    /// Fetch one list by id.
    async fn get(&self, session: &Session, id: &ListId) -> Result<ShoppingList, ListSyncError>;

    /// Create a list and return the stored entity, id included.
    async fn create(
        &self,
        session: &Session,
        request: &NewShoppingList,
    ) -> Result<ShoppingList, ListSyncError>;

    /// Apply a partial update and return the stored entity.
    ///
    /// When `expected_revision` is set, a different stored revision fails
    /// with [`ListSyncError::Conflict`] and nothing is written.
    async fn update(
        &self,
        session: &Session,
        id: &ListId,
        patch: &ListPatch,
        expected_revision: Option<u64>,
    ) -> Result<ShoppingList, ListSyncError>;

    /// Delete a list irrevocably.
    async fn delete(&self, session: &Session, id: &ListId) -> Result<(), ListSyncError>;
}
