//! Driven port listing registered users for invitation.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Session, User};

define_port_error! {
    /// Errors surfaced while listing users.
    pub enum UserDirectoryError {
        /// Credential missing or rejected.
        Unauthorized { message: String } =>
            "user directory refused the request: {message}",
        /// Transport failed or the service answered with an unexpected status.
        Network { message: String } =>
            "user directory transport failed: {message}",
        /// Response body could not be decoded.
        Decode { message: String } =>
            "user directory response decode failed: {message}",
    }
}

/// Port for reading the user directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All registered users. Password hashes are never included.
    async fn list_users(&self, session: &Session) -> Result<Vec<User>, UserDirectoryError>;
}

/// Fixture implementation returning a fixed set of users.
#[derive(Debug, Clone, Default)]
pub struct FixtureUserDirectory {
    users: Vec<User>,
}

impl FixtureUserDirectory {
    /// Directory answering with `users`.
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn list_users(&self, _session: &Session) -> Result<Vec<User>, UserDirectoryError> {
        Ok(self.users.clone())
    }
}
