//! Persistence Service outbound adapters.
//!
//! Thin HTTP implementations of the `ListSyncStrategy` and `UserDirectory`
//! ports sharing one [`PersistenceClient`].

mod client;
mod dto;
mod http_list_sync;
mod http_user_directory;

pub use client::PersistenceClient;
pub use http_list_sync::HttpListSync;
pub use http_user_directory::HttpUserDirectory;
