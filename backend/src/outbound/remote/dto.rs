//! DTOs for decoding Persistence Service JSON.
//!
//! Responses arrive either bare or wrapped in `{status, message, data}`.
//! MongoDB identifiers (`_id`) are accepted in place of `id`. The service
//! updates with `$set`, which never bumps the version key (`__v`), so a
//! list's revision is its `updatedAt` stamp in epoch milliseconds, falling
//! back to `__v` for documents without timestamps. Decoding goes through
//! these DTOs first and is mapped into domain records in one pass.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{
    Item, ItemId, ItemName, ListId, ListTitle, PasswordHash, Quantity, ShoppingList, Unit, User,
    UserId,
};

/// Outcome of unwrapping a response body.
#[derive(Debug)]
pub(super) enum Payload<T> {
    /// An entity (or collection) was present.
    Entity(T),
    /// A `{status, message}` acknowledgement without data.
    Acknowledged { message: Option<String> },
}

/// Decode `body`, unwrapping the `{status, message, data}` envelope when
/// present.
pub(super) fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<Payload<T>, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|error| format!("invalid JSON payload: {error}"))?;
    let inner = match value {
        Value::Object(mut map) if map.contains_key("status") && !is_entity(&map) => {
            match map.remove("data") {
                Some(Value::Null) | None => {
                    let message = map
                        .remove("message")
                        .and_then(|message| message.as_str().map(str::to_owned));
                    return Ok(Payload::Acknowledged { message });
                }
                Some(data) => data,
            }
        }
        other => other,
    };
    serde_json::from_value(inner)
        .map(Payload::Entity)
        .map_err(|error| format!("unexpected payload shape: {error}"))
}

fn is_entity(map: &serde_json::Map<String, Value>) -> bool {
    map.contains_key("_id") || map.contains_key("id")
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ItemDto {
    #[serde(alias = "_id", alias = "itemId")]
    id: String,
    name: String,
    #[serde(default = "default_quantity")]
    quantity: f64,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    resolved: Option<bool>,
}

impl ItemDto {
    fn into_domain(self) -> Result<Item, String> {
        let id = ItemId::new(self.id).map_err(|error| error.to_string())?;
        let name = ItemName::new(&self.name)
            .map_err(|error| format!("item {id}: {error}"))?;
        let quantity =
            Quantity::new(self.quantity).map_err(|error| format!("item {id}: {error}"))?;
        let unit = Unit::parse_optional(self.unit.as_deref())
            .map_err(|error| format!("item {id}: {error}"))?;
        Ok(Item::new(
            id,
            name,
            quantity,
            unit,
            self.resolved.unwrap_or(false),
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ShoppingListDto {
    #[serde(alias = "_id")]
    id: String,
    title: String,
    owner_id: String,
    #[serde(default)]
    member_ids: Vec<String>,
    #[serde(default)]
    items: Vec<ItemDto>,
    #[serde(default)]
    archived: Option<bool>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "__v")]
    revision: Option<u64>,
}

impl ShoppingListDto {
    fn effective_revision(&self) -> u64 {
        self.updated_at
            .and_then(|stamp| u64::try_from(stamp.timestamp_millis()).ok())
            .or(self.revision)
            .unwrap_or(0)
    }

    pub(super) fn into_domain(self) -> Result<ShoppingList, String> {
        let revision = self.effective_revision();
        let id = ListId::new(self.id).map_err(|error| error.to_string())?;
        let title = ListTitle::new(&self.title).map_err(|error| format!("list {id}: {error}"))?;
        let owner_id =
            UserId::new(self.owner_id).map_err(|error| format!("list {id}: owner {error}"))?;
        let member_ids = self
            .member_ids
            .into_iter()
            .map(UserId::new)
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|error| format!("list {id}: member {error}"))?;
        let items = self
            .items
            .into_iter()
            .map(ItemDto::into_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| format!("list {id}: {error}"))?;
        ShoppingList::from_parts(
            id.clone(),
            title,
            owner_id,
            member_ids,
            items,
            self.archived.unwrap_or(false),
            revision,
        )
        .map_err(|error| format!("list {id}: {error}"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserDto {
    #[serde(alias = "_id")]
    id: String,
    name: String,
    email: String,
    #[serde(default)]
    password: Option<String>,
}

impl UserDto {
    pub(super) fn into_domain(self) -> Result<User, String> {
        let user = User::try_from_strings(self.id.as_str(), self.name, self.email.as_str())
            .map_err(|error| format!("user {}: {error}", self.id))?;
        Ok(match self.password {
            Some(hash) => user.with_password_hash(PasswordHash::new(hash)),
            None => user,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Decoding of the Persistence Service's response shapes.

    use super::*;
    use rstest::rstest;

    fn decode_list(body: &str) -> ShoppingList {
        match decode_payload::<ShoppingListDto>(body.as_bytes()).expect("decodes") {
            Payload::Entity(dto) => dto.into_domain().expect("valid list"),
            Payload::Acknowledged { .. } => panic!("expected an entity"),
        }
    }

    #[rstest]
    fn decodes_bare_mongo_document() {
        let list = decode_list(
            r#"{
                "_id": "65a1",
                "title": "Groceries",
                "ownerId": "u1",
                "memberIds": ["u1", "u2"],
                "archived": false,
                "items": [
                    { "_id": "i1", "name": "Milk", "quantity": 1, "unit": "l", "resolved": false },
                    { "_id": "i2", "name": "Bread", "quantity": 2, "unit": "" }
                ],
                "createdAt": "2024-01-03T10:00:00.000Z",
                "__v": 4
            }"#,
        );

        assert_eq!(list.id().as_ref(), "65a1");
        assert_eq!(list.revision(), 4, "no updatedAt, so __v is used");
        assert_eq!(list.member_ids().len(), 2);
        let units: Vec<_> = list.items().iter().map(Item::unit).collect();
        assert_eq!(units, vec![Some(Unit::Litre), None]);
    }

    #[rstest]
    fn update_stamp_drives_revision_even_when_version_key_is_unchanged() {
        let before = decode_list(
            r#"{ "_id": "l1", "title": "Party", "ownerId": "u1", "memberIds": ["u1"],
                 "updatedAt": "2024-01-03T10:00:00.000Z", "__v": 0 }"#,
        );
        let after = decode_list(
            r#"{ "_id": "l1", "title": "Party", "ownerId": "u1", "memberIds": ["u1"],
                 "updatedAt": "2024-01-03T10:00:01.500Z", "__v": 0 }"#,
        );

        assert_eq!(before.revision(), 1_704_276_000_000);
        assert_eq!(after.revision() - before.revision(), 1500);
    }

    #[rstest]
    fn unwraps_update_envelope() {
        let list = decode_list(
            r#"{
                "status": true,
                "message": "List updated successfully.",
                "data": { "_id": "l1", "title": "Party", "ownerId": "u1", "memberIds": ["u1"], "__v": 1 }
            }"#,
        );
        assert_eq!(list.title().as_ref(), "Party");
    }

    #[rstest]
    fn recognises_bare_acknowledgement() {
        let payload = decode_payload::<ShoppingListDto>(
            br#"{ "status": true, "message": "List created successfully." }"#,
        )
        .expect("decodes");
        assert!(matches!(
            payload,
            Payload::Acknowledged { message: Some(ref m) } if m == "List created successfully."
        ));
    }

    #[rstest]
    fn list_without_owner_membership_is_rejected() {
        let payload = decode_payload::<ShoppingListDto>(
            br#"{ "_id": "l1", "title": "Party", "ownerId": "u1", "memberIds": ["u2"] }"#,
        )
        .expect("decodes");
        let Payload::Entity(dto) = payload else {
            panic!("expected an entity");
        };
        assert!(dto.into_domain().is_err());
    }

    #[rstest]
    fn user_password_is_kept_private() {
        let payload = decode_payload::<Vec<UserDto>>(
            br#"{ "status": true, "data": [
                { "_id": "u1", "name": "Ada", "email": "ADA@example.com", "password": "$2b$10$abc" }
            ] }"#,
        )
        .expect("decodes");
        let Payload::Entity(users) = payload else {
            panic!("expected users");
        };
        let users: Vec<User> = users
            .into_iter()
            .map(UserDto::into_domain)
            .collect::<Result<_, _>>()
            .expect("valid users");
        let [ada] = users.as_slice() else {
            panic!("expected one user");
        };
        assert_eq!(ada.email().as_ref(), "ada@example.com");
        assert!(ada.password_hash().is_some());
        assert!(!serde_json::to_string(ada).expect("serialise").contains("abc"));
    }
}
