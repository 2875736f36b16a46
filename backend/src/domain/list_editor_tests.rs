//! Tests for the subeditor service.

use std::collections::BTreeSet;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    FixtureUserDirectory, ListSyncError, MockListSyncStrategy,
};
use crate::domain::{ErrorCode, ListPatch, ListTitle, SyncMediator};

fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid user id")
}

fn session(id: &str) -> Session {
    Session::new(user(id))
}

fn l1() -> ListId {
    ListId::new("l1").expect("valid list id")
}

/// `u1` owns, `u2` is a member, `u3` is a stranger.
#[fixture]
fn shared() -> ShoppingList {
    ShoppingList::new(
        l1(),
        ListTitle::new("Groceries").expect("valid title"),
        user("u1"),
    )
    .apply_patch(&ListPatch::member_ids(BTreeSet::from([user("u1"), user("u2")])))
    .expect("owner is a member")
}

fn directory() -> FixtureUserDirectory {
    FixtureUserDirectory::new(
        [("u1", "Ada"), ("u2", "Bob"), ("u3", "Cy"), ("u4", "Dee")]
            .into_iter()
            .map(|(id, name)| {
                User::try_from_strings(id, name, format!("{name}@example.com"))
                    .expect("valid user")
            })
            .collect(),
    )
}

/// Editor over a strategy that echoes patches applied to `base`, or refuses
/// every write when `allow_writes` is false.
async fn editor(base: ShoppingList, allow_writes: bool) -> ListEditor {
    let mut strategy = MockListSyncStrategy::new();
    let seed = vec![base.clone()];
    strategy
        .expect_list()
        .times(1)
        .return_once(move |_, _| Ok(seed));
    if allow_writes {
        strategy.expect_update().returning(move |_, _, patch, _| {
            base.apply_patch(patch)
                .map(|list| list.with_revision(base.revision() + 1))
                .map_err(|err| ListSyncError::decode(err.to_string()))
        });
    } else {
        strategy.expect_update().never();
    }
    let store = ListStore::new(SyncMediator::new(Arc::new(strategy), Arc::new(directory())));
    store.load(&session("u1")).await.expect("load succeeds");
    ListEditor::new(Arc::new(store))
}

#[rstest]
#[tokio::test]
async fn member_adds_item(shared: ShoppingList) {
    let editor = editor(shared, true).await;

    editor
        .add_item(&session("u2"), &l1(), &ItemDraft::new("Milk", 1.0, Some("l")))
        .await
        .expect("item added");

    let items = editor.store().get_list_by_id(&l1()).expect("list").items().to_vec();
    let milk: Vec<_> = items
        .iter()
        .filter(|item| item.name().as_ref() == "Milk")
        .collect();
    assert_eq!(milk.len(), 1);
    assert!(milk.iter().all(|item| !item.is_resolved()));
}

#[rstest]
#[tokio::test]
async fn stranger_cannot_add_items(shared: ShoppingList) {
    let editor = editor(shared.clone(), false).await;

    let err = editor
        .add_item(&session("u3"), &l1(), &ItemDraft::new("Milk", 1.0, None))
        .await
        .expect_err("refused");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(
        editor.store().get_list_by_id(&l1()).expect("list").items(),
        shared.items()
    );
}

#[rstest]
#[tokio::test]
async fn validation_fails_before_persistence(shared: ShoppingList) {
    let editor = editor(shared, false).await;

    let err = editor
        .add_item(&session("u1"), &l1(), &ItemDraft::new("Milk", 12_345_678.0, None))
        .await
        .expect_err("invalid quantity");

    assert_eq!(err.code(), ErrorCode::InvalidQuantity);
}

#[rstest]
#[case("u1")]
#[case("u2")]
#[case("u3")]
#[tokio::test]
async fn removing_the_owner_always_fails(shared: ShoppingList, #[case] caller: &str) {
    let editor = editor(shared, false).await;

    let err = editor
        .remove_member(&session(caller), &l1(), &user("u1"))
        .await
        .expect_err("owner stays");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn invite_then_remove_controls_visibility(shared: ShoppingList) {
    let editor = editor(shared, true).await;

    let invited = editor
        .invite_members(&session("u1"), &l1(), &[user("u3")])
        .await
        .expect("invited");
    assert!(access::can_view(&user("u3"), &invited));

    let removed = editor
        .remove_member(&session("u1"), &l1(), &user("u2"))
        .await
        .expect("removed");
    assert!(!access::can_view(&user("u2"), &removed));
}

#[rstest]
#[tokio::test]
async fn owner_cannot_leave(shared: ShoppingList) {
    let editor = editor(shared, false).await;

    let err = editor
        .leave_list(&session("u1"), &l1())
        .await
        .expect_err("owner stays");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn member_leaves(shared: ShoppingList) {
    let editor = editor(shared, true).await;

    let after = editor
        .leave_list(&session("u2"), &l1())
        .await
        .expect("left");

    assert_eq!(after.member_ids(), &BTreeSet::from([user("u1")]));
}

#[rstest]
#[tokio::test]
async fn rename_to_same_title_succeeds(shared: ShoppingList) {
    let editor = editor(shared, true).await;

    let renamed = editor
        .rename_list(&session("u1"), &l1(), "Groceries")
        .await
        .expect("own title never conflicts");

    assert_eq!(renamed.title().as_ref(), "Groceries");
}

#[rstest]
#[tokio::test]
async fn member_cannot_rename(shared: ShoppingList) {
    let editor = editor(shared, false).await;

    let err = editor
        .rename_list(&session("u2"), &l1(), "Mine")
        .await
        .expect_err("owner only");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn candidates_exclude_current_members(shared: ShoppingList) {
    let editor = editor(shared, false).await;

    let candidates = editor
        .invite_candidates(&session("u1"), &l1())
        .await
        .expect("candidates");

    assert_eq!(
        candidates.iter().map(User::name).collect::<Vec<_>>(),
        vec!["Cy", "Dee"]
    );
}

#[rstest]
#[tokio::test]
async fn unknown_item_is_reported(shared: ShoppingList) {
    let editor = editor(shared, false).await;
    let missing = ItemId::new("ghost").expect("valid item id");

    let err = editor
        .toggle_item_resolved(&session("u2"), &l1(), &missing)
        .await
        .expect_err("missing item");

    assert_eq!(err.code(), ErrorCode::ItemNotFound);
}
