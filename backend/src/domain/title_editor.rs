//! Title editing state machine.
//!
//! `Viewing -> Editing` is allowed only when the acting user may edit the
//! title. Cancel or a confirmed submit returns to `Viewing`; a failed
//! submit stays in `Editing` and keeps the error for display.

use super::access::{self, ListAction};
use super::{Error, ListEditor, ListId, Session, ShoppingList};

/// Current state of the title editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleEditState {
    /// Showing the committed title.
    Viewing,
    /// Holding an unsubmitted draft.
    Editing { draft: String },
}

/// Title editor bound to one list.
#[derive(Debug, Clone)]
pub struct TitleEditor {
    list_id: ListId,
    state: TitleEditState,
    last_error: Option<Error>,
}

impl TitleEditor {
    /// Editor in the `Viewing` state.
    pub fn new(list_id: ListId) -> Self {
        Self {
            list_id,
            state: TitleEditState::Viewing,
            last_error: None,
        }
    }

    /// List being edited.
    pub fn list_id(&self) -> &ListId {
        &self.list_id
    }

    /// Current state.
    pub fn state(&self) -> &TitleEditState {
        &self.state
    }

    /// Error from the last failed submit, cleared on the next transition.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Enter `Editing` with the current title as the draft.
    pub fn begin_edit(&mut self, session: &Session, list: &ShoppingList) -> Result<(), Error> {
        access::authorize(session.user_id(), &ListAction::EditTitle, list)?;
        self.state = TitleEditState::Editing {
            draft: list.title().as_ref().to_owned(),
        };
        self.last_error = None;
        Ok(())
    }

    /// Replace the draft. Ignored while `Viewing`.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        if let TitleEditState::Editing { draft } = &mut self.state {
            *draft = text.into();
        }
    }

    /// Abandon the edit.
    pub fn cancel(&mut self) {
        self.state = TitleEditState::Viewing;
        self.last_error = None;
    }

    /// Submit the draft through `editor`.
    ///
    /// Returns `Ok(None)` when no edit is in progress.
    pub async fn submit(
        &mut self,
        session: &Session,
        editor: &ListEditor,
    ) -> Result<Option<ShoppingList>, Error> {
        let TitleEditState::Editing { draft } = &self.state else {
            return Ok(None);
        };
        match editor.rename_list(session, &self.list_id, draft).await {
            Ok(list) => {
                self.state = TitleEditState::Viewing;
                self.last_error = None;
                Ok(Some(list))
            }
            Err(error) => {
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! State transitions.

    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{FixtureUserDirectory, ListSyncError, MockListSyncStrategy};
    use crate::domain::{ErrorCode, ListStore, ListTitle, SyncMediator, UserId};
    use rstest::rstest;

    fn owner_session() -> Session {
        Session::new(UserId::new("u1").expect("valid user id"))
    }

    fn groceries() -> ShoppingList {
        ShoppingList::new(
            ListId::new("l1").expect("valid list id"),
            ListTitle::new("Groceries").expect("valid title"),
            UserId::new("u1").expect("valid user id"),
        )
    }

    async fn editor(update: Result<(), ListSyncError>) -> ListEditor {
        let mut strategy = MockListSyncStrategy::new();
        strategy
            .expect_list()
            .return_once(|_, _| Ok(vec![groceries()]));
        strategy
            .expect_update()
            .return_once(move |_, _, patch, _| {
                update.and_then(|()| {
                    groceries()
                        .apply_patch(patch)
                        .map_err(|err| ListSyncError::decode(err.to_string()))
                })
            });
        let store = ListStore::new(SyncMediator::new(
            Arc::new(strategy),
            Arc::new(FixtureUserDirectory::default()),
        ));
        store.load(&owner_session()).await.expect("load succeeds");
        ListEditor::new(Arc::new(store))
    }

    #[rstest]
    fn only_the_owner_enters_editing() {
        let mut title = TitleEditor::new(groceries().id().clone());
        let member = Session::new(UserId::new("u2").expect("valid user id"));

        let err = title
            .begin_edit(&member, &groceries())
            .expect_err("not the owner");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(title.state(), &TitleEditState::Viewing);
    }

    #[rstest]
    fn cancel_returns_to_viewing() {
        let mut title = TitleEditor::new(groceries().id().clone());
        title
            .begin_edit(&owner_session(), &groceries())
            .expect("owner edits");
        title.update_draft("Weekend");
        assert_eq!(
            title.state(),
            &TitleEditState::Editing {
                draft: "Weekend".to_owned()
            }
        );

        title.cancel();

        assert_eq!(title.state(), &TitleEditState::Viewing);
    }

    #[rstest]
    #[tokio::test]
    async fn confirmed_submit_returns_to_viewing() {
        let editor = editor(Ok(())).await;
        let mut title = TitleEditor::new(groceries().id().clone());
        title
            .begin_edit(&owner_session(), &groceries())
            .expect("owner edits");
        title.update_draft("Weekend");

        let renamed = title
            .submit(&owner_session(), &editor)
            .await
            .expect("renamed")
            .expect("edit was in progress");

        assert_eq!(renamed.title().as_ref(), "Weekend");
        assert_eq!(title.state(), &TitleEditState::Viewing);
        assert!(title.last_error().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn failed_submit_stays_editing_with_error() {
        let editor = editor(Err(ListSyncError::network("offline"))).await;
        let mut title = TitleEditor::new(groceries().id().clone());
        title
            .begin_edit(&owner_session(), &groceries())
            .expect("owner edits");
        title.update_draft("Weekend");

        let err = title
            .submit(&owner_session(), &editor)
            .await
            .expect_err("network down");

        assert_eq!(err.code(), ErrorCode::NetworkError);
        assert!(matches!(title.state(), TitleEditState::Editing { .. }));
        assert_eq!(
            title.last_error().map(Error::code),
            Some(ErrorCode::NetworkError)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn submit_while_viewing_is_a_no_op() {
        let editor = editor(Ok(())).await;
        let mut title = TitleEditor::new(groceries().id().clone());

        let outcome = title
            .submit(&owner_session(), &editor)
            .await
            .expect("nothing to do");

        assert!(outcome.is_none());
    }
}
