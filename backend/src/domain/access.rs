//! Access-control predicates over a user and a list.
//!
//! Every predicate is pure. Mutating operations call [`authorize`] (or
//! [`authorize_patch`]) before any next-state computation or persistence
//! call, so a refusal never changes state.

use std::fmt;

use super::{Error, ListPatch, ShoppingList, UserId};

/// Whether `user` is in the member set.
pub fn is_member(user: &UserId, list: &ShoppingList) -> bool {
    list.member_ids().contains(user)
}

/// Whether `user` owns the list.
pub fn is_owner(user: &UserId, list: &ShoppingList) -> bool {
    list.owner_id() == user
}

/// Members can see a list.
pub fn can_view(user: &UserId, list: &ShoppingList) -> bool {
    is_member(user, list)
}

/// Only the owner renames.
pub fn can_edit_title(user: &UserId, list: &ShoppingList) -> bool {
    is_owner(user, list)
}

/// Only the owner archives or restores.
pub fn can_archive(user: &UserId, list: &ShoppingList) -> bool {
    is_owner(user, list)
}

/// Only the owner deletes.
pub fn can_delete_list(user: &UserId, list: &ShoppingList) -> bool {
    is_owner(user, list)
}

/// Only the owner invites.
pub fn can_invite(user: &UserId, list: &ShoppingList) -> bool {
    is_owner(user, list)
}

/// Only the owner removes members, and never themselves.
pub fn can_remove_member(user: &UserId, target: &UserId, list: &ShoppingList) -> bool {
    is_owner(user, list) && target != list.owner_id()
}

/// Non-owner members may leave.
pub fn can_leave(user: &UserId, list: &ShoppingList) -> bool {
    is_member(user, list) && !is_owner(user, list)
}

/// Any member may add, resolve, or remove items.
pub fn can_mutate_items(user: &UserId, list: &ShoppingList) -> bool {
    is_member(user, list)
}

/// Actions gated by a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    View,
    EditTitle,
    Archive,
    Delete,
    Invite,
    RemoveMember(UserId),
    Leave,
    MutateItems,
}

impl ListAction {
    /// Evaluate the predicate for this action.
    pub fn is_allowed(&self, user: &UserId, list: &ShoppingList) -> bool {
        match self {
            Self::View => can_view(user, list),
            Self::EditTitle => can_edit_title(user, list),
            Self::Archive => can_archive(user, list),
            Self::Delete => can_delete_list(user, list),
            Self::Invite => can_invite(user, list),
            Self::RemoveMember(target) => can_remove_member(user, target, list),
            Self::Leave => can_leave(user, list),
            Self::MutateItems => can_mutate_items(user, list),
        }
    }
}

impl fmt::Display for ListAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View => f.write_str("view"),
            Self::EditTitle => f.write_str("edit the title of"),
            Self::Archive => f.write_str("archive"),
            Self::Delete => f.write_str("delete"),
            Self::Invite => f.write_str("invite members to"),
            Self::RemoveMember(target) => write!(f, "remove {target} from"),
            Self::Leave => f.write_str("leave"),
            Self::MutateItems => f.write_str("change items of"),
        }
    }
}

/// Return [`ErrorCode::Unauthorized`](super::ErrorCode::Unauthorized)
/// unless `user` may perform `action` on `list`.
///
/// # Examples
/// ```
/// use shared_lists::domain::access::{authorize, ListAction};
/// use shared_lists::domain::{ErrorCode, ListId, ListTitle, ShoppingList, UserId};
///
/// let owner = UserId::new("u1").expect("id");
/// let list = ShoppingList::new(
///     ListId::new("l1").expect("id"),
///     ListTitle::new("Groceries").expect("title"),
///     owner.clone(),
/// );
/// assert!(authorize(&owner, &ListAction::Archive, &list).is_ok());
///
/// let stranger = UserId::new("u3").expect("id");
/// let err = authorize(&stranger, &ListAction::MutateItems, &list).expect_err("refused");
/// assert_eq!(err.code(), ErrorCode::Unauthorized);
/// ```
pub fn authorize(user: &UserId, action: &ListAction, list: &ShoppingList) -> Result<(), Error> {
    if action.is_allowed(user, list) {
        Ok(())
    } else {
        Err(Error::unauthorized(format!(
            "user {user} may not {action} list {}",
            list.id()
        )))
    }
}

/// Authorise every field of `patch` against `list`.
///
/// Member additions need [`can_invite`]. A removal needs
/// [`can_remove_member`], or [`can_leave`] when the acting user removes
/// only themselves.
pub fn authorize_patch(user: &UserId, patch: &ListPatch, list: &ShoppingList) -> Result<(), Error> {
    if patch.title.is_some() {
        authorize(user, &ListAction::EditTitle, list)?;
    }
    if patch.archived.is_some() {
        authorize(user, &ListAction::Archive, list)?;
    }
    if patch.items.is_some() {
        authorize(user, &ListAction::MutateItems, list)?;
    }
    if let Some(next_members) = &patch.member_ids {
        if next_members.difference(list.member_ids()).next().is_some() {
            authorize(user, &ListAction::Invite, list)?;
        }
        let removed: Vec<&UserId> = list.member_ids().difference(next_members).collect();
        if removed.as_slice() == [user] {
            if !can_leave(user, list) {
                authorize(user, &ListAction::RemoveMember(user.clone()), list)?;
            }
        } else {
            for target in removed {
                authorize(user, &ListAction::RemoveMember(target.clone()), list)?;
            }
        }
    }
    Ok(())
}
