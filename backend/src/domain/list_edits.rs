//! Next-state computations for the item and member subeditors.
//!
//! Each function validates its input against the current list and returns
//! the [`ListPatch`] to hand to the list store. Nothing here authorises or
//! persists; callers gate with [`super::access`] first.

use std::collections::BTreeSet;

use super::{
    Error, Item, ItemDraft, ItemId, ItemName, ListPatch, ListTitle, Quantity, ShoppingList, Unit,
    User, UserId,
};

/// Validate `draft` and append it as an unresolved item with a fresh id.
///
/// Errors: `InvalidItemName`, `InvalidQuantity`, `InvalidUnit`,
/// `DuplicateItemName`, checked in that order.
pub fn add_item(list: &ShoppingList, draft: &ItemDraft) -> Result<ListPatch, Error> {
    let name = ItemName::new(&draft.name)?;
    let quantity = Quantity::new(draft.quantity)?;
    let unit = Unit::parse_optional(draft.unit.as_deref())?;

    if list
        .items()
        .iter()
        .any(|existing| existing.name().matches(name.as_ref()))
    {
        return Err(Error::duplicate_item_name(format!(
            "list {} already has an item named '{}'",
            list.id(),
            name.as_ref()
        )));
    }

    let mut items = list.items().to_vec();
    items.push(Item::new(ItemId::random(), name, quantity, unit, false));
    Ok(ListPatch::items(items))
}

fn item_position(list: &ShoppingList, item_id: &ItemId) -> Result<usize, Error> {
    list.items()
        .iter()
        .position(|item| item.id() == item_id)
        .ok_or_else(|| {
            Error::item_not_found(format!("item {item_id} is not on list {}", list.id()))
        })
}

/// Flip the `resolved` flag of one item.
pub fn toggle_item_resolved(list: &ShoppingList, item_id: &ItemId) -> Result<ListPatch, Error> {
    item_position(list, item_id)?;
    let items = list
        .items()
        .iter()
        .map(|item| {
            if item.id() == item_id {
                item.toggled()
            } else {
                item.clone()
            }
        })
        .collect();
    Ok(ListPatch::items(items))
}

/// Drop one item, keeping the order of the rest.
pub fn remove_item(list: &ShoppingList, item_id: &ItemId) -> Result<ListPatch, Error> {
    item_position(list, item_id)?;
    let items = list
        .items()
        .iter()
        .filter(|item| item.id() != item_id)
        .cloned()
        .collect();
    Ok(ListPatch::items(items))
}

/// Add every id that is neither the owner nor already a member.
///
/// Fails with `NoEligibleUsers` when nothing is left to add.
pub fn invite_members(list: &ShoppingList, user_ids: &[UserId]) -> Result<ListPatch, Error> {
    let eligible: BTreeSet<UserId> = user_ids
        .iter()
        .filter(|id| *id != list.owner_id() && !list.member_ids().contains(*id))
        .cloned()
        .collect();
    if eligible.is_empty() {
        return Err(Error::no_eligible_users(format!(
            "no invited user can join list {}",
            list.id()
        )));
    }
    let members = list.member_ids().union(&eligible).cloned().collect();
    Ok(ListPatch::member_ids(members))
}

/// Remove `user_id` from the member set. The owner can never be removed.
///
/// Removing a user who is not a member yields an unchanged member set.
pub fn remove_member(list: &ShoppingList, user_id: &UserId) -> Result<ListPatch, Error> {
    if user_id == list.owner_id() {
        return Err(Error::unauthorized(format!(
            "the owner of list {} cannot be removed",
            list.id()
        )));
    }
    let mut members = list.member_ids().clone();
    members.remove(user_id);
    Ok(ListPatch::member_ids(members))
}

/// Self-removal for a non-owner member.
pub fn leave_list(list: &ShoppingList, user_id: &UserId) -> Result<ListPatch, Error> {
    remove_member(list, user_id)
}

/// Validate `new_title` and check it against the *other* lists in
/// `visible`; a list never conflicts with its own current title.
pub fn rename_list(
    list: &ShoppingList,
    new_title: &str,
    visible: &[ShoppingList],
) -> Result<ListPatch, Error> {
    let title = ListTitle::new(new_title)?;
    ensure_unique_title(&title, visible, Some(list))?;
    Ok(ListPatch::title(title))
}

/// Fail with `DuplicateTitle` if a list in `visible` (other than `except`)
/// already uses `title`, ignoring case.
pub fn ensure_unique_title(
    title: &ListTitle,
    visible: &[ShoppingList],
    except: Option<&ShoppingList>,
) -> Result<(), Error> {
    let clash = visible
        .iter()
        .filter(|other| except.is_none_or(|own| own.id() != other.id()))
        .any(|other| other.title().matches(title));
    if clash {
        return Err(Error::duplicate_title(format!(
            "a list named '{title}' already exists"
        )));
    }
    Ok(())
}

/// Users who could be invited: neither the owner nor a current member.
pub fn invite_candidates(list: &ShoppingList, users: &[User]) -> Vec<User> {
    users
        .iter()
        .filter(|user| user.id() != list.owner_id() && !list.member_ids().contains(user.id()))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "list_edits_tests.rs"]
mod tests;
