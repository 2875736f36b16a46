//! Domain primitives, aggregates, and services.
//!
//! Purpose: own the canonical shopping-list state, the access rules over it,
//! and the two-phase write path through the configured sync strategy. Types
//! document their invariants and serialisation contracts in their Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: stable failure payload for every operation.
//! - ShoppingList, Item, User, Session: the data model.
//! - ListStore: canonical collection with propose/commit writes.
//! - ListEditor: item and member subeditors.
//! - SyncMediator: bounded wait and error mapping over the ports.

pub mod access;
pub mod error;
mod item;
pub mod list_edits;
mod list_editor;
pub mod list_stats;
mod list_store;
mod localization;
pub mod ports;
mod session;
mod shopping_list;
mod sync_mediator;
mod title_editor;
mod user;

pub use self::error::{Error, ErrorCode};
pub use self::item::{
    ITEM_NAME_MAX, Item, ItemDraft, ItemId, ItemName, ItemValidationError, QUANTITY_MAX_CHARS,
    Quantity, Unit,
};
pub use self::list_editor::ListEditor;
pub use self::list_store::{ConcurrencyPolicy, ListPhase, ListStore};
pub use self::localization::{Locale, UnsupportedLocale};
pub use self::session::{BearerToken, Session};
pub use self::shopping_list::{
    ListId, ListPatch, ListTitle, NewShoppingList, ShoppingList, TITLE_MAX,
};
pub use self::sync_mediator::{DEFAULT_TIMEOUT, SyncMediator};
pub use self::title_editor::{TitleEditState, TitleEditor};
pub use self::user::{EMAIL_MAX, EmailAddress, PasswordHash, User, UserId, UserValidationError};
