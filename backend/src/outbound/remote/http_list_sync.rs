//! Reqwest-backed list sync strategy against the Persistence Service.
//!
//! This adapter owns transport details only: routes, the bearer header,
//! status mapping, and JSON decoding into domain lists.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::IF_MATCH;
use tracing::debug;

use super::client::{HttpFailure, PersistenceClient};
use super::dto::{Payload, ShoppingListDto, decode_payload};
use crate::domain::ports::{ListSyncError, ListSyncStrategy};
use crate::domain::{ListId, ListPatch, NewShoppingList, Session, ShoppingList};

/// List sync strategy performing HTTP calls against `/shoppingList/*`.
#[derive(Debug, Clone)]
pub struct HttpListSync {
    client: PersistenceClient,
}

impl HttpListSync {
    /// Adapter sharing `client`'s connection pool and base URL.
    pub fn new(client: PersistenceClient) -> Self {
        Self { client }
    }

    async fn fetch(
        &self,
        session: &Session,
        segments: &[&str],
        list_id: Option<&ListId>,
    ) -> Result<Vec<u8>, ListSyncError> {
        let url = self
            .client
            .endpoint(segments)
            .map_err(|failure| map_failure(failure, list_id))?;
        self.client
            .send(session, self.client.http().get(url))
            .await
            .map_err(|failure| map_failure(failure, list_id))
    }

    async fn list_all(
        &self,
        session: &Session,
        archived: Option<bool>,
    ) -> Result<Vec<ShoppingList>, ListSyncError> {
        let mut url = self
            .client
            .endpoint(&["shoppingList", "list"])
            .map_err(|failure| map_failure(failure, None))?;
        if let Some(flag) = archived {
            url.query_pairs_mut()
                .append_pair("archived", if flag { "true" } else { "false" });
        }
        let body = self
            .client
            .send(session, self.client.http().get(url))
            .await
            .map_err(|failure| map_failure(failure, None))?;
        match decode_payload::<Vec<ShoppingListDto>>(&body).map_err(ListSyncError::decode)? {
            Payload::Entity(dtos) => dtos
                .into_iter()
                .map(ShoppingListDto::into_domain)
                .collect::<Result<Vec<_>, _>>()
                .map_err(ListSyncError::decode),
            Payload::Acknowledged { .. } => Ok(Vec::new()),
        }
    }

    /// Recover the entity of a create acknowledged without one: the newest
    /// list in the listing with the requested owner and title.
    async fn find_created(
        &self,
        session: &Session,
        request: &NewShoppingList,
        ack: Option<&str>,
    ) -> Result<ShoppingList, ListSyncError> {
        debug!(
            title = %request.title,
            ack = ack.unwrap_or_default(),
            "create acknowledged without entity; re-reading listing"
        );
        self.list_all(session, None)
            .await?
            .into_iter()
            .rev()
            .find(|list| list.owner_id() == &request.owner_id && list.title() == &request.title)
            .ok_or_else(|| {
                ListSyncError::decode(format!(
                    "created list '{}' missing from listing",
                    request.title
                ))
            })
    }
}

fn map_failure(failure: HttpFailure, list_id: Option<&ListId>) -> ListSyncError {
    match failure {
        HttpFailure::MissingCredential => {
            ListSyncError::unauthorized("no bearer credential in session")
        }
        HttpFailure::Transport { message, timed_out } => {
            if timed_out {
                ListSyncError::timeout(message)
            } else {
                ListSyncError::network(message)
            }
        }
        HttpFailure::Status { status, message } => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ListSyncError::unauthorized(message)
            }
            StatusCode::NOT_FOUND => ListSyncError::not_found(
                list_id.map_or_else(|| message.clone(), |id| id.as_ref().to_owned()),
            ),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                ListSyncError::conflict(message)
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ListSyncError::timeout(message)
            }
            _ => ListSyncError::network(message),
        },
    }
}

/// A decoded entity, or the acknowledgement message when the body had none.
fn decode_entity(body: &[u8]) -> Result<Result<ShoppingList, Option<String>>, ListSyncError> {
    match decode_payload::<ShoppingListDto>(body).map_err(ListSyncError::decode)? {
        Payload::Entity(dto) => dto.into_domain().map(Ok).map_err(ListSyncError::decode),
        Payload::Acknowledged { message } => Ok(Err(message)),
    }
}

#[async_trait]
impl ListSyncStrategy for HttpListSync {
    async fn list(
        &self,
        session: &Session,
        archived: Option<bool>,
    ) -> Result<Vec<ShoppingList>, ListSyncError> {
        let lists = self.list_all(session, archived).await?;
        // Some deployments ignore the query; filter here as well.
        Ok(match archived {
            Some(flag) => lists
                .into_iter()
                .filter(|list| list.is_archived() == flag)
                .collect(),
            None => lists,
        })
    }

    async fn get(&self, session: &Session, id: &ListId) -> Result<ShoppingList, ListSyncError> {
        let body = self
            .fetch(session, &["shoppingList", "get", id.as_ref()], Some(id))
            .await?;
        decode_entity(&body)?.map_err(|_| ListSyncError::not_found(id.as_ref()))
    }

    async fn create(
        &self,
        session: &Session,
        request: &NewShoppingList,
    ) -> Result<ShoppingList, ListSyncError> {
        let url = self
            .client
            .endpoint(&["shoppingList", "create"])
            .map_err(|failure| map_failure(failure, None))?;
        let body = self
            .client
            .send(session, self.client.http().post(url).json(request))
            .await
            .map_err(|failure| map_failure(failure, None))?;
        match decode_entity(&body)? {
            Ok(list) => Ok(list),
            Err(ack) => self.find_created(session, request, ack.as_deref()).await,
        }
    }

    async fn update(
        &self,
        session: &Session,
        id: &ListId,
        patch: &ListPatch,
        expected_revision: Option<u64>,
    ) -> Result<ShoppingList, ListSyncError> {
        let mut request = self.client.http().patch(
            self.client
                .endpoint(&["shoppingList", "update", id.as_ref()])
                .map_err(|failure| map_failure(failure, Some(id)))?,
        );
        if let Some(expected) = expected_revision {
            // The service ignores If-Match and never bumps `__v`, so compare
            // the stored `updatedAt` revision before writing.
            let stored = self.get(session, id).await?;
            if stored.revision() != expected {
                return Err(ListSyncError::conflict(format!(
                    "expected revision {expected}, found {}",
                    stored.revision()
                )));
            }
            request = request.header(IF_MATCH, expected.to_string());
        }
        let body = self
            .client
            .send(session, request.json(patch))
            .await
            .map_err(|failure| map_failure(failure, Some(id)))?;
        match decode_entity(&body)? {
            Ok(list) => Ok(list),
            Err(ack) => {
                debug!(
                    list_id = %id,
                    ack = ack.as_deref().unwrap_or_default(),
                    "update acknowledged without entity; re-reading list"
                );
                self.get(session, id).await
            }
        }
    }

    async fn delete(&self, session: &Session, id: &ListId) -> Result<(), ListSyncError> {
        let url = self
            .client
            .endpoint(&["shoppingList", "delete", id.as_ref()])
            .map_err(|failure| map_failure(failure, Some(id)))?;
        self.client
            .send(session, self.client.http().delete(url))
            .await
            .map_err(|failure| map_failure(failure, Some(id)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    fn status(code: StatusCode) -> HttpFailure {
        HttpFailure::Status {
            status: code,
            message: format!("status {}", code.as_u16()),
        }
    }

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, "Unauthorized")]
    #[case::forbidden(StatusCode::FORBIDDEN, "Unauthorized")]
    #[case::not_found(StatusCode::NOT_FOUND, "NotFound")]
    #[case::conflict(StatusCode::CONFLICT, "Conflict")]
    #[case::precondition(StatusCode::PRECONDITION_FAILED, "Conflict")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "Network")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Network")]
    fn maps_http_statuses_to_port_errors(#[case] code: StatusCode, #[case] expected: &str) {
        let id = ListId::new("l1").expect("valid list id");
        let error = map_failure(status(code), Some(&id));
        let matched = match expected {
            "Unauthorized" => matches!(error, ListSyncError::Unauthorized { .. }),
            "NotFound" => error == ListSyncError::not_found("l1"),
            "Conflict" => matches!(error, ListSyncError::Conflict { .. }),
            "Timeout" => matches!(error, ListSyncError::Timeout { .. }),
            "Network" => matches!(error, ListSyncError::Network { .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{code} mapped to {error:?}");
    }

    #[rstest]
    fn bare_acknowledgement_keeps_its_message() {
        let outcome =
            decode_entity(br#"{ "status": true, "message": "List created successfully." }"#)
                .expect("decodes");

        assert_eq!(outcome, Err(Some("List created successfully.".to_owned())));
    }

    #[rstest]
    fn missing_credential_is_unauthorized() {
        assert!(matches!(
            map_failure(HttpFailure::MissingCredential, None),
            ListSyncError::Unauthorized { .. }
        ));
    }

    #[rstest]
    #[case(true, "Timeout")]
    #[case(false, "Network")]
    fn transport_failures_keep_timeout_flag(#[case] timed_out: bool, #[case] expected: &str) {
        let error = map_failure(
            HttpFailure::Transport {
                message: "connection refused".to_owned(),
                timed_out,
            },
            None,
        );
        let matched = if expected == "Timeout" {
            matches!(error, ListSyncError::Timeout { .. })
        } else {
            matches!(error, ListSyncError::Network { .. })
        };
        assert!(matched, "{error:?}");
    }
}
