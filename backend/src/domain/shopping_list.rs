//! Shopping list aggregate and its partial update.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Error, Item, UserId};

/// Maximum list title length, in characters.
pub const TITLE_MAX: usize = 20;

/// Opaque list identifier issued by the persistence side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListId(String);

impl ListId {
    /// Wrap an identifier; blank input is rejected as [`ErrorCode::NotFound`](super::ErrorCode::NotFound).
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::not_found("list id must not be empty"));
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ListId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ListId> for String {
    fn from(value: ListId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ListId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// List title, trimmed, between one and [`TITLE_MAX`] characters.
///
/// # Examples
/// ```
/// use shared_lists::domain::ListTitle;
///
/// let title = ListTitle::new("  Groceries ").expect("valid title");
/// assert_eq!(title.as_ref(), "Groceries");
/// assert!(title.matches(&ListTitle::new("GROCERIES").expect("valid title")));
/// assert!(ListTitle::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListTitle(String);

impl ListTitle {
    /// Validate a title; failures carry [`ErrorCode::InvalidTitle`](super::ErrorCode::InvalidTitle).
    pub fn new(raw: impl AsRef<str>) -> Result<Self, Error> {
        let trimmed = raw.as_ref().trim();
        let len = trimmed.chars().count();
        if len == 0 || len > TITLE_MAX {
            return Err(Error::invalid_title(format!(
                "title must be between 1 and {TITLE_MAX} characters, got {len}"
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-insensitive equality used for the duplicate-title rule.
    pub fn matches(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl AsRef<str> for ListTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ListTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ListTitle> for String {
    fn from(value: ListTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for ListTitle {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Request to create a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShoppingList {
    pub title: ListTitle,
    pub owner_id: UserId,
}

/// Field-level partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<ListTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_ids: Option<BTreeSet<UserId>>,
}

impl ListPatch {
    /// Patch touching only the title.
    pub fn title(title: ListTitle) -> Self {
        Self {
            title: Some(title),
            ..Self::default()
        }
    }

    /// Patch touching only the archived flag.
    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Self::default()
        }
    }

    /// Patch replacing the item sequence.
    pub fn items(items: Vec<Item>) -> Self {
        Self {
            items: Some(items),
            ..Self::default()
        }
    }

    /// Patch replacing the member set.
    pub fn member_ids(member_ids: BTreeSet<UserId>) -> Self {
        Self {
            member_ids: Some(member_ids),
            ..Self::default()
        }
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.archived.is_none()
            && self.items.is_none()
            && self.member_ids.is_none()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShoppingListParts {
    id: ListId,
    title: ListTitle,
    owner_id: UserId,
    #[serde(default)]
    member_ids: BTreeSet<UserId>,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    revision: u64,
}

impl TryFrom<ShoppingListParts> for ShoppingList {
    type Error = Error;

    fn try_from(parts: ShoppingListParts) -> Result<Self, Self::Error> {
        let list = Self {
            id: parts.id,
            title: parts.title,
            owner_id: parts.owner_id,
            member_ids: parts.member_ids,
            items: parts.items,
            archived: parts.archived,
            revision: parts.revision,
        };
        list.check_invariants()?;
        Ok(list)
    }
}

/// A shared shopping list.
///
/// ## Invariants
/// - `owner_id` is always contained in `member_ids`.
/// - item names are unique within the list, ignoring case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ShoppingListParts")]
pub struct ShoppingList {
    id: ListId,
    title: ListTitle,
    owner_id: UserId,
    member_ids: BTreeSet<UserId>,
    items: Vec<Item>,
    archived: bool,
    revision: u64,
}

impl ShoppingList {
    /// Fresh, empty, unarchived list whose only member is the owner.
    pub fn new(id: ListId, title: ListTitle, owner_id: UserId) -> Self {
        let member_ids = BTreeSet::from([owner_id.clone()]);
        Self {
            id,
            title,
            owner_id,
            member_ids,
            items: Vec::new(),
            archived: false,
            revision: 0,
        }
    }

    /// Rebuild a list from stored parts, enforcing the invariants.
    pub fn from_parts(
        id: ListId,
        title: ListTitle,
        owner_id: UserId,
        member_ids: BTreeSet<UserId>,
        items: Vec<Item>,
        archived: bool,
        revision: u64,
    ) -> Result<Self, Error> {
        ShoppingListParts {
            id,
            title,
            owner_id,
            member_ids,
            items,
            archived,
            revision,
        }
        .try_into()
    }

    /// List identifier.
    pub fn id(&self) -> &ListId {
        &self.id
    }

    /// Current title.
    pub fn title(&self) -> &ListTitle {
        &self.title
    }

    /// Owner.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Members, owner included.
    pub fn member_ids(&self) -> &BTreeSet<UserId> {
        &self.member_ids
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Whether the list is archived.
    pub fn is_archived(&self) -> bool {
        self.archived
    }

    /// Entity version reported by the persistence side.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Copy with the revision replaced.
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Look up an item by id.
    pub fn item(&self, id: &super::ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Merge `patch` into a copy of this list and re-check the invariants.
    ///
    /// The revision is left unchanged; the persistence side bumps it.
    pub fn apply_patch(&self, patch: &ListPatch) -> Result<Self, Error> {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(archived) = patch.archived {
            next.archived = archived;
        }
        if let Some(items) = &patch.items {
            next.items = items.clone();
        }
        if let Some(member_ids) = &patch.member_ids {
            next.member_ids = member_ids.clone();
        }
        next.check_invariants()?;
        Ok(next)
    }

    /// Verify the owner-membership and item-name invariants.
    pub fn check_invariants(&self) -> Result<(), Error> {
        if !self.member_ids.contains(&self.owner_id) {
            return Err(Error::invariant_violation(format!(
                "owner {} must remain a member of list {}",
                self.owner_id, self.id
            )));
        }
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.name().as_ref().to_lowercase()) {
                return Err(Error::duplicate_item_name(format!(
                    "item '{}' appears more than once in list {}",
                    item.name().as_ref(),
                    self.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "shopping_list_tests.rs"]
mod tests;
