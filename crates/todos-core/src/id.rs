use serde::{Deserialize, Serialize};
use std::num::{NonZeroU64, ParseIntError};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Identifier of an item, assigned by the remote store.
///
/// `0` is reserved for the locally synthesized placeholder shown while a
/// create request is in flight.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl ItemId {
    /// Sentinel id of the not-yet-persisted placeholder item.
    pub const PLACEHOLDER: Self = Self(0);

    /// Whether this id is the placeholder sentinel.
    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Static owner identifier scoping every remote call to one logical user.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(NonZeroU64);

/// Reasons an owner identifier is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OwnerIdError {
    /// The identifier is zero, which the remote store never assigns.
    #[error("owner id must be a positive integer")]
    Zero,
    /// The identifier is not an integer at all.
    #[error("owner id is not a valid integer: {0}")]
    Malformed(#[from] ParseIntError),
}

impl OwnerId {
    /// Wrap a raw value, rejecting zero.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OwnerId {
    type Err = OwnerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s.trim().parse()?;
        Self::new(raw).ok_or(OwnerIdError::Zero)
    }
}
