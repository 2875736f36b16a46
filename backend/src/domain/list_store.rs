//! Canonical collection of shopping lists for a session.
//!
//! Reads are served from the committed collection. Every write validates
//! and authorises first, records a proposal, persists through the
//! [`SyncMediator`], and only then commits the authoritative entity the
//! persistence side returned. A failed write drops its proposal and leaves
//! the committed collection untouched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::{info, warn};

use super::access::{self, ListAction};
use super::list_edits::ensure_unique_title;
use super::{
    Error, ErrorCode, ListId, ListPatch, ListTitle, NewShoppingList, Session, ShoppingList,
    SyncMediator, UserId,
};

/// How updates guard against concurrent writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    /// The last write to reach the persistence side wins.
    #[default]
    LastWriteWins,
    /// Send the revision last read; a divergent stored revision is a
    /// [`ErrorCode::Conflict`].
    RevisionChecked,
}

/// Two-phase state of one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    /// No write in flight.
    Committed,
    /// An update awaits the persistence side.
    PendingUpdate,
    /// A delete awaits the persistence side.
    PendingDelete,
}

#[derive(Debug, Clone)]
enum PendingChange {
    Update(ShoppingList),
    Delete,
}

#[derive(Debug, Clone)]
struct Proposal {
    token: u64,
    change: PendingChange,
}

/// Owner of the canonical list collection.
pub struct ListStore {
    mediator: SyncMediator,
    policy: ConcurrencyPolicy,
    lists: RwLock<Vec<ShoppingList>>,
    pending: RwLock<HashMap<ListId, Proposal>>,
    next_token: AtomicU64,
}

impl ListStore {
    /// Empty store persisting through `mediator`.
    pub fn new(mediator: SyncMediator) -> Self {
        Self {
            mediator,
            policy: ConcurrencyPolicy::default(),
            lists: RwLock::new(Vec::new()),
            pending: RwLock::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        }
    }

    /// Replace the concurrency policy.
    pub fn with_policy(mut self, policy: ConcurrencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active concurrency policy.
    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Mediator used for persistence calls.
    pub fn mediator(&self) -> &SyncMediator {
        &self.mediator
    }

    /// Replace the committed collection with the strategy's full listing.
    pub async fn load(&self, session: &Session) -> Result<Vec<ShoppingList>, Error> {
        let lists = self.mediator.list(session).await?;
        info!(count = lists.len(), user_id = %session.user_id(), "lists loaded");
        *self.lists.write().unwrap_or_else(PoisonError::into_inner) = lists.clone();
        Ok(lists)
    }

    /// Alias for [`Self::load`].
    pub async fn refresh(&self, session: &Session) -> Result<Vec<ShoppingList>, Error> {
        self.load(session).await
    }

    /// Every committed list, without access filtering.
    pub fn get_all_lists(&self) -> Vec<ShoppingList> {
        self.lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// One committed list.
    pub fn get_list_by_id(&self, id: &ListId) -> Result<ShoppingList, Error> {
        self.lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|list| list.id() == id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("list {id} not found")))
    }

    /// Lists `user_id` is a member of; archived lists only when asked for.
    pub fn get_lists_by_user(&self, user_id: &UserId, include_archived: bool) -> Vec<ShoppingList> {
        self.lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|list| access::is_member(user_id, list))
            .filter(|list| include_archived || !list.is_archived())
            .cloned()
            .collect()
    }

    /// Whether a write to `id` is in flight.
    pub fn phase(&self, id: &ListId) -> ListPhase {
        match self
            .pending
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|proposal| &proposal.change)
        {
            None => ListPhase::Committed,
            Some(PendingChange::Update(_)) => ListPhase::PendingUpdate,
            Some(PendingChange::Delete) => ListPhase::PendingDelete,
        }
    }

    /// The optimistic next state of an in-flight update.
    pub fn proposed(&self, id: &ListId) -> Option<ShoppingList> {
        match self
            .pending
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|proposal| &proposal.change)
        {
            Some(PendingChange::Update(list)) => Some(list.clone()),
            Some(PendingChange::Delete) | None => None,
        }
    }

    /// Re-read one list from the persistence side and commit it.
    pub async fn fetch_list(&self, session: &Session, id: &ListId) -> Result<ShoppingList, Error> {
        match self.mediator.get(session, id).await {
            Ok(list) => {
                self.upsert(list.clone());
                Ok(list)
            }
            Err(error) => {
                self.evict_if_missing(id, &error);
                Err(error)
            }
        }
    }

    /// Create a list owned by the acting user.
    ///
    /// Errors: `InvalidTitle`, `DuplicateTitle` against the owner's lists
    /// (archived included), or the persistence failure.
    pub async fn create_list(&self, session: &Session, title: &str) -> Result<ShoppingList, Error> {
        let title = ListTitle::new(title)?;
        let owner_id = session.user_id().clone();
        ensure_unique_title(&title, &self.get_lists_by_user(&owner_id, true), None)?;

        let request = NewShoppingList { title, owner_id };
        let stored = self.mediator.create(session, &request).await?;
        info!(list_id = %stored.id(), revision = stored.revision(), "list created");
        self.upsert(stored.clone());
        Ok(stored)
    }

    /// Authorise each field of `patch`, merge it into list `id`, and persist.
    ///
    /// Errors, in order: `NotFound`, `Unauthorized`, `InvariantViolation` or
    /// `DuplicateItemName` from the merge, `DuplicateTitle`, then the
    /// persistence failure.
    pub async fn update_list(
        &self,
        session: &Session,
        id: &ListId,
        patch: ListPatch,
    ) -> Result<ShoppingList, Error> {
        let current = self.get_list_by_id(id)?;
        access::authorize_patch(session.user_id(), &patch, &current)?;
        let next = current.apply_patch(&patch)?;
        if let Some(title) = &patch.title {
            let visible = self.get_lists_by_user(current.owner_id(), true);
            ensure_unique_title(title, &visible, Some(&current))?;
        }

        let expected_revision = match self.policy {
            ConcurrencyPolicy::LastWriteWins => None,
            ConcurrencyPolicy::RevisionChecked => Some(current.revision()),
        };
        let token = self.propose(id, PendingChange::Update(next));
        let outcome = self
            .mediator
            .update(session, id, &patch, expected_revision)
            .await;
        self.settle(id, token);

        match outcome {
            Ok(stored) => {
                info!(list_id = %id, revision = stored.revision(), "list update committed");
                self.upsert(stored.clone());
                Ok(stored)
            }
            Err(error) => {
                warn!(list_id = %id, code = ?error.code(), "list update rolled back");
                self.evict_if_missing(id, &error);
                Err(error)
            }
        }
    }

    /// Delete list `id`. Owner only.
    pub async fn delete_list(&self, session: &Session, id: &ListId) -> Result<(), Error> {
        let current = self.get_list_by_id(id)?;
        access::authorize(session.user_id(), &ListAction::Delete, &current)?;

        let token = self.propose(id, PendingChange::Delete);
        let outcome = self.mediator.delete(session, id).await;
        self.settle(id, token);

        match outcome {
            Ok(()) => {
                info!(list_id = %id, "list deleted");
                self.remove(id);
                Ok(())
            }
            Err(error) => {
                warn!(list_id = %id, code = ?error.code(), "list delete rolled back");
                self.evict_if_missing(id, &error);
                Err(error)
            }
        }
    }

    /// Set `archived`. Owner only.
    pub async fn archive_list(&self, session: &Session, id: &ListId) -> Result<ShoppingList, Error> {
        self.update_list(session, id, ListPatch::archived(true)).await
    }

    /// Clear `archived`. Owner only.
    pub async fn unarchive_list(
        &self,
        session: &Session,
        id: &ListId,
    ) -> Result<ShoppingList, Error> {
        self.update_list(session, id, ListPatch::archived(false))
            .await
    }

    fn propose(&self, id: &ListId, change: PendingChange) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.pending
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), Proposal { token, change });
        token
    }

    /// Drop the proposal for `id` unless a newer one replaced it.
    fn settle(&self, id: &ListId, token: u64) {
        let mut pending = self.pending.write().unwrap_or_else(PoisonError::into_inner);
        if pending.get(id).is_some_and(|proposal| proposal.token == token) {
            pending.remove(id);
        }
    }

    fn upsert(&self, list: ShoppingList) {
        let mut lists = self.lists.write().unwrap_or_else(PoisonError::into_inner);
        match lists.iter_mut().find(|existing| existing.id() == list.id()) {
            Some(slot) => *slot = list,
            None => lists.push(list),
        }
    }

    fn remove(&self, id: &ListId) {
        self.lists
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|list| list.id() != id);
    }

    fn evict_if_missing(&self, id: &ListId, error: &Error) {
        if error.code() == ErrorCode::NotFound {
            warn!(list_id = %id, "evicting list missing on the persistence side");
            self.remove(id);
        }
    }
}

#[cfg(test)]
#[path = "list_store_tests.rs"]
mod tests;
