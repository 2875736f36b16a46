//! Shopping-list items and their value objects.
//!
//! Items are embedded in their list; they are only addressable through the
//! owning [`ShoppingList`](super::ShoppingList).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Error;

/// Maximum item name length, in characters.
pub const ITEM_NAME_MAX: usize = 20;
/// Maximum length of the shortest decimal rendering of a quantity.
pub const QUANTITY_MAX_CHARS: usize = 7;

/// Validation errors for item value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyId,
    EmptyName,
    NameTooLong { max: usize },
    QuantityNotFinite,
    QuantityNotPositive,
    QuantityTooLong { max: usize },
    QuantityUnparseable { raw: String },
    UnknownUnit { raw: String },
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "item id must not be empty"),
            Self::EmptyName => write!(f, "item name must not be empty"),
            Self::NameTooLong { max } => write!(f, "item name must be at most {max} characters"),
            Self::QuantityNotFinite => write!(f, "quantity must be a finite number"),
            Self::QuantityNotPositive => write!(f, "quantity must be greater than zero"),
            Self::QuantityTooLong { max } => {
                write!(f, "quantity must be written with at most {max} characters")
            }
            Self::QuantityUnparseable { raw } => write!(f, "'{raw}' is not a number"),
            Self::UnknownUnit { raw } => write!(f, "unknown unit '{raw}'"),
        }
    }
}

impl std::error::Error for ItemValidationError {}

impl From<ItemValidationError> for Error {
    fn from(value: ItemValidationError) -> Self {
        let message = value.to_string();
        match value {
            ItemValidationError::EmptyId => Self::item_not_found(message),
            ItemValidationError::EmptyName | ItemValidationError::NameTooLong { .. } => {
                Self::invalid_item_name(message)
            }
            ItemValidationError::QuantityNotFinite
            | ItemValidationError::QuantityNotPositive
            | ItemValidationError::QuantityTooLong { .. }
            | ItemValidationError::QuantityUnparseable { .. } => Self::invalid_quantity(message),
            ItemValidationError::UnknownUnit { .. } => Self::invalid_unit(message),
        }
    }
}

/// Identifier of an item within its list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, ItemValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ItemValidationError::EmptyId);
        }
        Ok(Self(id))
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ItemId> for String {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ItemId {
    type Error = ItemValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Item name, trimmed, between one and [`ITEM_NAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

impl ItemName {
    /// Validate and construct an item name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ItemValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        if trimmed.chars().count() > ITEM_NAME_MAX {
            return Err(ItemValidationError::NameTooLong { max: ITEM_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-insensitive comparison used for the per-list uniqueness rule.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ItemName> for String {
    fn from(value: ItemName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ItemName {
    type Error = ItemValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Positive decimal quantity.
///
/// ## Invariants
/// - finite and strictly positive;
/// - the shortest decimal rendering is at most [`QUANTITY_MAX_CHARS`]
///   characters long (`1.25` is accepted, `0.123456` is not).
///
/// # Examples
/// ```
/// use shared_lists::domain::Quantity;
///
/// assert_eq!(Quantity::parse("007").expect("quantity").to_string(), "7");
/// assert!(Quantity::new(0.0).is_err());
/// assert!(Quantity::new(12345.678).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Quantity(f64);

impl Quantity {
    /// Validate a numeric quantity.
    pub fn new(value: f64) -> Result<Self, ItemValidationError> {
        if !value.is_finite() {
            return Err(ItemValidationError::QuantityNotFinite);
        }
        if value <= 0.0 {
            return Err(ItemValidationError::QuantityNotPositive);
        }
        if value.to_string().chars().count() > QUANTITY_MAX_CHARS {
            return Err(ItemValidationError::QuantityTooLong {
                max: QUANTITY_MAX_CHARS,
            });
        }
        Ok(Self(value))
    }

    /// Parse user input such as `"1.5"` or `"007"`.
    pub fn parse(raw: &str) -> Result<Self, ItemValidationError> {
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ItemValidationError::QuantityUnparseable {
                raw: raw.to_owned(),
            })?;
        Self::new(value)
    }

    /// Numeric value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Quantity> for f64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Quantity {
    type Error = ItemValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Units offered by the item form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "ml")]
    Millilitre,
    #[serde(rename = "dl")]
    Decilitre,
    #[serde(rename = "l")]
    Litre,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "dkg")]
    Decagram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "tsp")]
    Teaspoon,
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[serde(rename = "fl oz")]
    FluidOunce,
    #[serde(rename = "pc")]
    Piece,
    #[serde(rename = "c")]
    Cup,
    #[serde(rename = "pt")]
    Pint,
    #[serde(rename = "qt")]
    Quart,
    #[serde(rename = "gal")]
    Gallon,
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "oz")]
    Ounce,
}

impl Unit {
    /// Every supported unit, in the order the item form lists them.
    pub const ALL: [Self; 16] = [
        Self::Millilitre,
        Self::Decilitre,
        Self::Litre,
        Self::Gram,
        Self::Decagram,
        Self::Kilogram,
        Self::Teaspoon,
        Self::Tablespoon,
        Self::FluidOunce,
        Self::Piece,
        Self::Cup,
        Self::Pint,
        Self::Quart,
        Self::Gallon,
        Self::Pound,
        Self::Ounce,
    ];

    /// Wire code, e.g. `"fl oz"`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Millilitre => "ml",
            Self::Decilitre => "dl",
            Self::Litre => "l",
            Self::Gram => "g",
            Self::Decagram => "dkg",
            Self::Kilogram => "kg",
            Self::Teaspoon => "tsp",
            Self::Tablespoon => "tbsp",
            Self::FluidOunce => "fl oz",
            Self::Piece => "pc",
            Self::Cup => "c",
            Self::Pint => "pt",
            Self::Quart => "qt",
            Self::Gallon => "gal",
            Self::Pound => "lb",
            Self::Ounce => "oz",
        }
    }

    /// Parse an optional unit code; blank input means "no unit".
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, ItemValidationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(code) => code.parse().map(Some),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Unit {
    type Err = ItemValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|unit| unit.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ItemValidationError::UnknownUnit {
                raw: value.to_owned(),
            })
    }
}

/// Raw user input for a new item, validated by the add-item subeditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

impl ItemDraft {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, quantity: f64, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.map(str::to_owned),
        }
    }
}

/// One line on a shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    name: ItemName,
    quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<Unit>,
    #[serde(default)]
    resolved: bool,
}

impl Item {
    /// Assemble an item from validated parts.
    pub fn new(
        id: ItemId,
        name: ItemName,
        quantity: Quantity,
        unit: Option<Unit>,
        resolved: bool,
    ) -> Self {
        Self {
            id,
            name,
            quantity,
            unit,
            resolved,
        }
    }

    /// Item identifier.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Item name.
    pub fn name(&self) -> &ItemName {
        &self.name
    }

    /// Quantity.
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Optional unit.
    pub fn unit(&self) -> Option<Unit> {
        self.unit
    }

    /// Whether the item has been bought.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Copy of the item with `resolved` flipped.
    pub fn toggled(&self) -> Self {
        Self {
            resolved: !self.resolved,
            ..self.clone()
        }
    }
}
