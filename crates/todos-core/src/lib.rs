//! Domain types & pure projections for the todos client.

/// Identifier types.
pub mod id;

use crate::id::{ItemId, OwnerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A task item as stored by the remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Server-assigned identifier (`0` only for the local placeholder).
    pub id: ItemId,
    /// Owner the item belongs to.
    #[serde(rename = "userId")]
    pub owner_id: OwnerId,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Completion flag.
    pub completed: bool,
}

impl Item {
    /// Build the unpersisted placeholder displayed while a create is in flight.
    #[must_use]
    pub fn placeholder(owner_id: OwnerId, title: impl Into<String>) -> Self {
        Self {
            id: ItemId::PLACEHOLDER,
            owner_id,
            title: title.into(),
            completed: false,
        }
    }

    /// Whether this is the local placeholder rather than a persisted item.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.id.is_placeholder()
    }

    /// Apply the fields present in `patch`.
    pub fn apply(&mut self, patch: &ItemPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// Payload for creating an item; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    /// Owner the item belongs to.
    #[serde(rename = "userId")]
    pub owner_id: OwnerId,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Completion flag, `false` for freshly created items.
    pub completed: bool,
}

impl NewItem {
    /// Validate `raw_title` and build an incomplete item for `owner_id`.
    ///
    /// # Errors
    /// Returns [`TitleError::Empty`] when the title is blank after trimming.
    pub fn new(owner_id: OwnerId, raw_title: &str) -> Result<Self, TitleError> {
        let title = normalize_title(raw_title).ok_or(TitleError::Empty)?;
        Ok(Self {
            owner_id,
            title: title.to_owned(),
            completed: false,
        })
    }
}

/// Partial update sent to the remote store. Absent fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    /// Replacement title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement completion flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl ItemPatch {
    /// Patch that only changes the completion flag.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }

    /// Patch that only changes the title.
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    /// True when the patch carries no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

/// Title validation failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TitleError {
    /// Title is empty or whitespace only.
    #[error("title should not be empty")]
    Empty,
}

/// Trim a user-supplied title, returning `None` when nothing remains.
#[must_use]
pub fn normalize_title(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Which subset of the collection is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStatus {
    /// Every item.
    #[default]
    All,
    /// Items that are not completed.
    Active,
    /// Completed items only.
    Completed,
}

impl FilterStatus {
    /// Every filter in display order.
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Label shown in filter links.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }

    /// Whether `item` belongs to this subset.
    #[must_use]
    pub const fn matches(self, item: &Item) -> bool {
        match self {
            Self::All => true,
            Self::Active => !item.completed,
            Self::Completed => item.completed,
        }
    }

    /// The filter after this one, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Completed,
            Self::Completed => Self::All,
        }
    }
}

impl fmt::Display for FilterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unknown filter name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown filter '{0}' (expected all, active or completed)")]
pub struct UnknownFilter(pub String);

impl FromStr for FilterStatus {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(UnknownFilter(other.to_owned())),
        }
    }
}

/// Project `items` through `status`, keeping relative order.
pub fn filter_items(items: &[Item], status: FilterStatus) -> impl Iterator<Item = &Item> + '_ {
    items.iter().filter(move |item| status.matches(item))
}

/// Counts derived from the authoritative collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemStats {
    /// Number of items.
    pub total: usize,
    /// Items with `completed == false`.
    pub active: usize,
    /// Items with `completed == true`.
    pub completed: usize,
}

impl ItemStats {
    /// Count `items`.
    #[must_use]
    pub fn from_items(items: &[Item]) -> Self {
        let completed = items.iter().filter(|item| item.completed).count();
        Self {
            total: items.len(),
            active: items.len() - completed,
            completed,
        }
    }

    /// At least one item is completed.
    #[must_use]
    pub const fn has_completed(&self) -> bool {
        self.completed > 0
    }

    /// The collection is non-empty and every item is completed.
    #[must_use]
    pub const fn all_completed(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    /// Footer counter text, e.g. `3 items left`.
    #[must_use]
    pub fn items_left_label(&self) -> String {
        format!("{} items left", self.active)
    }
}
