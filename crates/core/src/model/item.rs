use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemError {
    #[error("item label cannot be empty")]
    EmptyLabel,

    #[error("item has no image reference")]
    MissingImage,
}

//
// ─── VALUE TYPES ───────────────────────────────────────────────────────────────
//

/// Display word of an item. Trimmed, non-empty, and the key of an item within a pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    /// # Errors
    ///
    /// Returns `ItemError::EmptyLabel` if the label is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, ItemError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ItemError::EmptyLabel);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Label {
    type Error = ItemError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Label> for String {
    fn from(value: Label) -> Self {
        value.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle to the item's picture (download URL, storage path, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    /// # Errors
    ///
    /// Returns `ItemError::MissingImage` if the reference is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, ItemError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ItemError::MissingImage);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Picks the first usable reference, preferring `primary`.
    ///
    /// Library records carry a photo upload URL while general pool records carry
    /// a catalogue image URL; either is acceptable.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::MissingImage` if neither candidate is usable.
    pub fn first_of(primary: Option<&str>, fallback: Option<&str>) -> Result<Self, ItemError> {
        primary
            .into_iter()
            .chain(fallback)
            .find(|candidate| !candidate.trim().is_empty())
            .map_or(Err(ItemError::MissingImage), Self::new)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ItemError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        value.0
    }
}

//
// ─── ITEM ──────────────────────────────────────────────────────────────────────
//

/// A labeled picture that can be asked about in a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    label: Label,
    image: ImageRef,
}

impl Item {
    #[must_use]
    pub fn new(label: Label, image: ImageRef) -> Self {
        Self { label, image }
    }

    /// Validate raw strings into an item.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if the label or image reference is blank.
    pub fn parse(label: impl Into<String>, image: impl Into<String>) -> Result<Self, ItemError> {
        Ok(Self::new(Label::new(label)?, ImageRef::new(image)?))
    }

    #[must_use]
    pub fn label(&self) -> &Label {
        &self.label
    }

    #[must_use]
    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    #[must_use]
    pub fn same_label(&self, other: &Item) -> bool {
        self.label == other.label
    }
}

//
// ─── POOL ──────────────────────────────────────────────────────────────────────
//

/// Deduplicated set of items a session draws its questions from.
///
/// Labels are unique; order follows the order items were offered in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPool {
    items: Vec<Item>,
}

impl ItemPool {
    /// Build a pool keeping the first item seen for every label.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.label.clone()))
            .collect();
        Self { items }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    #[must_use]
    pub fn contains_label(&self, label: &Label) -> bool {
        self.items.iter().any(|item| &item.label == label)
    }
}
