//! Locale selection and the user-facing message catalogue for error codes.
//!
//! The presentation layer owns its own string tables; the core only ships
//! one sentence per [`ErrorCode`] so every failure can be shown to a user
//! without an unstructured fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ErrorCode;

/// Languages the shopping-list clients are translated into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Czech.
    Cs,
}

/// Returned when a locale code is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale '{0}'")]
pub struct UnsupportedLocale(pub String);

impl Locale {
    /// Short code used in configuration, e.g. `en`.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Cs => "cs",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Older clients used upper-case ids ("EN", "CZ").
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "cs" | "cz" => Ok(Self::Cs),
            _ => Err(UnsupportedLocale(value.to_owned())),
        }
    }
}

impl ErrorCode {
    /// Human-readable message for this code.
    pub fn message(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => english(self),
            Locale::Cs => czech(self),
        }
    }
}

fn english(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::NotFound => "The list was not found.",
        ErrorCode::DuplicateTitle => "A list with this name already exists.",
        ErrorCode::DuplicateItemName => "This item already exists.",
        ErrorCode::InvalidQuantity => "Input a valid number.",
        ErrorCode::InvalidTitle => "The name must be between 1 and 20 characters.",
        ErrorCode::InvalidItemName => "The item name must be between 1 and 20 characters.",
        ErrorCode::InvalidUnit => "Choose a supported unit.",
        ErrorCode::NoEligibleUsers => "There are no users to invite.",
        ErrorCode::Unauthorized => "You are not allowed to do this.",
        ErrorCode::InvariantViolation => "The owner must remain a member of the list.",
        ErrorCode::ItemNotFound => "The item was not found.",
        ErrorCode::NetworkError => "The server could not be reached. Try again later.",
        ErrorCode::Conflict => "The list was changed by someone else. Reload and try again.",
    }
}

fn czech(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::NotFound => "Seznam nebyl nalezen.",
        ErrorCode::DuplicateTitle => "Seznam s tímto názvem již existuje.",
        ErrorCode::DuplicateItemName => "Tato položka již existuje.",
        ErrorCode::InvalidQuantity => "Zadejte platné číslo.",
        ErrorCode::InvalidTitle => "Název musí mít 1 až 20 znaků.",
        ErrorCode::InvalidItemName => "Název položky musí mít 1 až 20 znaků.",
        ErrorCode::InvalidUnit => "Vyberte podporovanou jednotku.",
        ErrorCode::NoEligibleUsers => "Nejsou žádní uživatelé k pozvání.",
        ErrorCode::Unauthorized => "K této akci nemáte oprávnění.",
        ErrorCode::InvariantViolation => "Vlastník musí zůstat členem seznamu.",
        ErrorCode::ItemNotFound => "Položka nebyla nalezena.",
        ErrorCode::NetworkError => "Server je nedostupný. Zkuste to později.",
        ErrorCode::Conflict => "Seznam mezitím změnil někdo jiný. Načtěte jej znovu.",
    }
}
