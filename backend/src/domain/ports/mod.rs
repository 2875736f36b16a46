//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod list_sync_strategy;
mod user_directory;

#[cfg(test)]
pub use list_sync_strategy::MockListSyncStrategy;
pub use list_sync_strategy::{ListSyncError, ListSyncStrategy};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{FixtureUserDirectory, UserDirectory, UserDirectoryError};
