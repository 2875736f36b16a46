//! Single persistence policy over the configured strategy.
//!
//! Every call is bounded by the configured wait; an expired wait surfaces as
//! [`ErrorCode::NetworkError`](super::ErrorCode::NetworkError). Port errors
//! are mapped to domain errors here so callers only see [`Error`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::debug;

use super::ports::{ListSyncError, ListSyncStrategy, UserDirectory, UserDirectoryError};
use super::{Error, ListId, ListPatch, NewShoppingList, Session, ShoppingList, User};

/// Default bound on a persistence round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

fn map_sync_error(error: ListSyncError) -> Error {
    match error {
        ListSyncError::Unauthorized { message } => {
            Error::unauthorized(format!("persistence refused the request: {message}"))
        }
        ListSyncError::NotFound { list_id } => Error::not_found(format!("list {list_id} not found"))
            .with_details(json!({ "listId": list_id })),
        ListSyncError::Conflict { message } => {
            Error::conflict(format!("list revision conflict: {message}"))
        }
        ListSyncError::Network { message }
        | ListSyncError::Timeout { message }
        | ListSyncError::Decode { message } => {
            Error::network(format!("persistence unavailable: {message}"))
        }
    }
}

fn map_directory_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Unauthorized { message } => {
            Error::unauthorized(format!("user directory refused the request: {message}"))
        }
        UserDirectoryError::Network { message } | UserDirectoryError::Decode { message } => {
            Error::network(format!("user directory unavailable: {message}"))
        }
    }
}

/// Wraps the list sync strategy and user directory with one timeout and
/// error-mapping policy.
#[derive(Clone)]
pub struct SyncMediator {
    strategy: Arc<dyn ListSyncStrategy>,
    directory: Arc<dyn UserDirectory>,
    timeout: Duration,
}

impl SyncMediator {
    /// Mediator with the [`DEFAULT_TIMEOUT`].
    pub fn new(strategy: Arc<dyn ListSyncStrategy>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            strategy,
            directory,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the per-call bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured per-call bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, E, F>(
        &self,
        operation: &'static str,
        call: F,
        map_error: fn(E) -> Error,
    ) -> Result<T, Error>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                let error_message = error.to_string();
                debug!(%error_message, operation, "persistence call failed");
                Err(map_error(error))
            }
            Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                debug!(timeout_ms, operation, "persistence call timed out");
                Err(Error::network(format!(
                    "{operation} did not finish within {timeout_ms} ms"
                )))
            }
        }
    }

    /// Full listing visible to the session.
    pub async fn list(&self, session: &Session) -> Result<Vec<ShoppingList>, Error> {
        self.bounded("list", self.strategy.list(session, None), map_sync_error)
            .await
    }

    /// One list by id.
    pub async fn get(&self, session: &Session, id: &ListId) -> Result<ShoppingList, Error> {
        self.bounded("get", self.strategy.get(session, id), map_sync_error)
            .await
    }

    /// Persist a new list and return the stored entity.
    pub async fn create(
        &self,
        session: &Session,
        request: &NewShoppingList,
    ) -> Result<ShoppingList, Error> {
        self.bounded("create", self.strategy.create(session, request), map_sync_error)
            .await
    }

    /// Persist a partial update and return the stored entity.
    pub async fn update(
        &self,
        session: &Session,
        id: &ListId,
        patch: &ListPatch,
        expected_revision: Option<u64>,
    ) -> Result<ShoppingList, Error> {
        self.bounded(
            "update",
            self.strategy.update(session, id, patch, expected_revision),
            map_sync_error,
        )
        .await
    }

    /// Delete a list.
    pub async fn delete(&self, session: &Session, id: &ListId) -> Result<(), Error> {
        self.bounded("delete", self.strategy.delete(session, id), map_sync_error)
            .await
    }

    /// Registered users, for invitation.
    pub async fn list_users(&self, session: &Session) -> Result<Vec<User>, Error> {
        self.bounded(
            "list_users",
            self.directory.list_users(session),
            map_directory_error,
        )
        .await
    }
}
