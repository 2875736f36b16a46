//! Item and member subeditors.
//!
//! Each operation reads the committed snapshot, checks the matching access
//! predicate, computes the next state, and hands the resulting patch to the
//! [`ListStore`]. Refusals and validation failures never reach persistence.

use std::sync::Arc;

use super::access::{self, ListAction};
use super::list_edits;
use super::{Error, ItemDraft, ItemId, ListId, ListStore, Session, ShoppingList, User, UserId};

/// Narrow mutation operations over one list.
#[derive(Clone)]
pub struct ListEditor {
    store: Arc<ListStore>,
}

impl ListEditor {
    /// Editor writing through `store`.
    pub fn new(store: Arc<ListStore>) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<ListStore> {
        &self.store
    }

    fn snapshot(
        &self,
        session: &Session,
        id: &ListId,
        action: &ListAction,
    ) -> Result<ShoppingList, Error> {
        let list = self.store.get_list_by_id(id)?;
        access::authorize(session.user_id(), action, &list)?;
        Ok(list)
    }

    /// A list the acting user may view.
    pub fn view_list(&self, session: &Session, id: &ListId) -> Result<ShoppingList, Error> {
        self.snapshot(session, id, &ListAction::View)
    }

    /// Append a validated item.
    pub async fn add_item(
        &self,
        session: &Session,
        id: &ListId,
        draft: &ItemDraft,
    ) -> Result<ShoppingList, Error> {
        let list = self.snapshot(session, id, &ListAction::MutateItems)?;
        let patch = list_edits::add_item(&list, draft)?;
        self.store.update_list(session, id, patch).await
    }

    /// Flip one item's `resolved` flag.
    pub async fn toggle_item_resolved(
        &self,
        session: &Session,
        id: &ListId,
        item_id: &ItemId,
    ) -> Result<ShoppingList, Error> {
        let list = self.snapshot(session, id, &ListAction::MutateItems)?;
        let patch = list_edits::toggle_item_resolved(&list, item_id)?;
        self.store.update_list(session, id, patch).await
    }

    /// Remove one item.
    pub async fn remove_item(
        &self,
        session: &Session,
        id: &ListId,
        item_id: &ItemId,
    ) -> Result<ShoppingList, Error> {
        let list = self.snapshot(session, id, &ListAction::MutateItems)?;
        let patch = list_edits::remove_item(&list, item_id)?;
        self.store.update_list(session, id, patch).await
    }

    /// Invite users; owner only.
    pub async fn invite_members(
        &self,
        session: &Session,
        id: &ListId,
        user_ids: &[UserId],
    ) -> Result<ShoppingList, Error> {
        let list = self.snapshot(session, id, &ListAction::Invite)?;
        let patch = list_edits::invite_members(&list, user_ids)?;
        self.store.update_list(session, id, patch).await
    }

    /// Remove a member; owner only, and never the owner.
    pub async fn remove_member(
        &self,
        session: &Session,
        id: &ListId,
        user_id: &UserId,
    ) -> Result<ShoppingList, Error> {
        let list = self.snapshot(session, id, &ListAction::RemoveMember(user_id.clone()))?;
        let patch = list_edits::remove_member(&list, user_id)?;
        self.store.update_list(session, id, patch).await
    }

    /// Rename; owner only. The list's own title never conflicts.
    pub async fn rename_list(
        &self,
        session: &Session,
        id: &ListId,
        new_title: &str,
    ) -> Result<ShoppingList, Error> {
        let list = self.snapshot(session, id, &ListAction::EditTitle)?;
        let visible = self.store.get_lists_by_user(list.owner_id(), true);
        let patch = list_edits::rename_list(&list, new_title, &visible)?;
        self.store.update_list(session, id, patch).await
    }

    /// The acting user leaves the list. Owners cannot leave.
    pub async fn leave_list(&self, session: &Session, id: &ListId) -> Result<ShoppingList, Error> {
        let list = self.snapshot(session, id, &ListAction::Leave)?;
        let patch = list_edits::leave_list(&list, session.user_id())?;
        self.store.update_list(session, id, patch).await
    }

    /// Users the owner could invite: everyone who is not already a member.
    pub async fn invite_candidates(
        &self,
        session: &Session,
        id: &ListId,
    ) -> Result<Vec<User>, Error> {
        let list = self.snapshot(session, id, &ListAction::Invite)?;
        let users = self.store.mediator().list_users(session).await?;
        Ok(list_edits::invite_candidates(&list, &users))
    }
}

#[cfg(test)]
#[path = "list_editor_tests.rs"]
mod tests;
