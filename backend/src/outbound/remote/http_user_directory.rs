//! Reqwest-backed user directory reading `/user/list`.

use async_trait::async_trait;
use reqwest::StatusCode;

use super::client::{HttpFailure, PersistenceClient};
use super::dto::{Payload, UserDto, decode_payload};
use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{Session, User};

/// User directory backed by the Persistence Service.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    client: PersistenceClient,
}

impl HttpUserDirectory {
    /// Adapter sharing `client`'s connection pool and base URL.
    pub fn new(client: PersistenceClient) -> Self {
        Self { client }
    }
}

fn map_failure(failure: HttpFailure) -> UserDirectoryError {
    match failure {
        HttpFailure::MissingCredential => {
            UserDirectoryError::unauthorized("no bearer credential in session")
        }
        HttpFailure::Transport { message, .. } => UserDirectoryError::network(message),
        HttpFailure::Status { status, message } => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                UserDirectoryError::unauthorized(message)
            }
            _ => UserDirectoryError::network(message),
        },
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn list_users(&self, session: &Session) -> Result<Vec<User>, UserDirectoryError> {
        let url = self
            .client
            .endpoint(&["user", "list"])
            .map_err(map_failure)?;
        let body = self
            .client
            .send(session, self.client.http().get(url))
            .await
            .map_err(map_failure)?;
        match decode_payload::<Vec<UserDto>>(&body).map_err(UserDirectoryError::decode)? {
            Payload::Entity(users) => users
                .into_iter()
                .map(UserDto::into_domain)
                .collect::<Result<Vec<_>, _>>()
                .map_err(UserDirectoryError::decode),
            Payload::Acknowledged { .. } => Ok(Vec::new()),
        }
    }
}
