//! Resolved/unresolved item counts for the list charts.

use serde::Serialize;

use super::{ListId, ListTitle, ShoppingList, UserId, access};

/// Item progress of one list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProgress {
    pub resolved: usize,
    pub unresolved: usize,
}

impl ItemProgress {
    /// Count the items of `list`.
    pub fn of(list: &ShoppingList) -> Self {
        let resolved = list.items().iter().filter(|item| item.is_resolved()).count();
        Self {
            resolved,
            unresolved: list.items().len() - resolved,
        }
    }

    pub fn total(self) -> usize {
        self.resolved + self.unresolved
    }
}

/// One row of the per-user summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub list_id: ListId,
    pub title: ListTitle,
    pub archived: bool,
    pub owned: bool,
    pub progress: ItemProgress,
}

/// Summary of every list visible to a user, with overall totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListStats {
    pub lists: Vec<ListSummary>,
    pub totals: ItemProgress,
}

/// Summarise the lists in `lists` that `user` may view.
pub fn summaries_for(user: &UserId, lists: &[ShoppingList]) -> UserListStats {
    let summaries: Vec<ListSummary> = lists
        .iter()
        .filter(|list| access::can_view(user, list))
        .map(|list| ListSummary {
            list_id: list.id().clone(),
            title: list.title().clone(),
            archived: list.is_archived(),
            owned: access::is_owner(user, list),
            progress: ItemProgress::of(list),
        })
        .collect();
    let totals = summaries
        .iter()
        .fold(ItemProgress::default(), |acc, summary| ItemProgress {
            resolved: acc.resolved + summary.progress.resolved,
            unresolved: acc.unresolved + summary.progress.unresolved,
        });
    UserListStats {
        lists: summaries,
        totals,
    }
}
