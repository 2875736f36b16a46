//! Domain-level error types.
//!
//! These errors are transport agnostic. Every core operation either returns
//! its next state or one [`Error`] carrying a stable [`ErrorCode`]; inbound
//! adapters decide how to render the message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::localization::Locale;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The list (or another addressed entity) does not exist.
    NotFound,
    /// Another visible list already uses the title.
    DuplicateTitle,
    /// The list already contains an item with the same name.
    DuplicateItemName,
    /// Quantity is not a positive decimal of at most seven characters.
    InvalidQuantity,
    /// Title is empty or longer than the allowed maximum.
    InvalidTitle,
    /// Item name is empty or longer than the allowed maximum.
    InvalidItemName,
    /// Unit code is not one of the supported units.
    InvalidUnit,
    /// Every invited user is already a member or the owner.
    NoEligibleUsers,
    /// The acting user may not perform the action.
    Unauthorized,
    /// The requested change would break a list invariant.
    InvariantViolation,
    /// The addressed item is not part of the list.
    ItemNotFound,
    /// The persistence call failed or did not finish in time.
    NetworkError,
    /// The stored revision diverged from the one last read.
    Conflict,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::NotFound,
        Self::DuplicateTitle,
        Self::DuplicateItemName,
        Self::InvalidQuantity,
        Self::InvalidTitle,
        Self::InvalidItemName,
        Self::InvalidUnit,
        Self::NoEligibleUsers,
        Self::Unauthorized,
        Self::InvariantViolation,
        Self::ItemNotFound,
        Self::NetworkError,
        Self::Conflict,
    ];

    /// Whether the failure is detected locally, before any persistence call.
    pub fn is_local(self) -> bool {
        !matches!(self, Self::NetworkError | Self::Conflict)
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is never blank; constructors fall back to the English
///   catalogue message for the code.
///
/// # Examples
/// ```
/// use shared_lists::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("list 42 not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "list 42 not found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error; blank messages are replaced by the catalogue text.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.message(Locale::En).to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            details: None,
        }
    }

    /// Create an error carrying only the catalogue message for `code`.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.message(Locale::En))
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Diagnostic message attached at the failure site.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// User-facing message for the code in the requested locale.
    pub fn localized_message(&self, locale: Locale) -> &'static str {
        self.code.message(locale)
    }

    /// Supplementary structured details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use shared_lists::domain::Error;
    ///
    /// let err = Error::conflict("stale").with_details(json!({ "expected": 1 }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::DuplicateTitle`].
    pub fn duplicate_title(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateTitle, message)
    }

    /// Convenience constructor for [`ErrorCode::DuplicateItemName`].
    pub fn duplicate_item_name(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateItemName, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidQuantity`].
    pub fn invalid_quantity(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidQuantity, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidTitle`].
    pub fn invalid_title(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidTitle, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidItemName`].
    pub fn invalid_item_name(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidItemName, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidUnit`].
    pub fn invalid_unit(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidUnit, message)
    }

    /// Convenience constructor for [`ErrorCode::NoEligibleUsers`].
    pub fn no_eligible_users(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoEligibleUsers, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::InvariantViolation`].
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvariantViolation, message)
    }

    /// Convenience constructor for [`ErrorCode::ItemNotFound`].
    pub fn item_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ItemNotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::NetworkError`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }
}

impl From<ErrorCode> for Error {
    fn from(value: ErrorCode) -> Self {
        Self::from_code(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
