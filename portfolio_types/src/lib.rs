//! Shared types for the portfolio catalog: the [`CatalogEntry`] document, the fixed
//! [`Category`] and [`Difficulty`] sets, and the pagination [`Cursor`].

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

mod entry;
pub use entry::{CatalogEntry, EntryDocument, EntryDraft, EntryPatch};
mod image;
pub use image::ImageRef;
mod page;
pub use page::{Cursor, Page, newest_first};

/// Errors raised when user-supplied values cross into the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "'{0}' is not a valid category, values are python, iot, mern, java, app, and game"
    )]
    InvalidCategory(String),

    #[error("'{0}' is not a valid difficulty, values are beginner, intermediate, and advanced")]
    InvalidDifficulty(String),

    #[error("required field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("invalid pagination cursor: {reason}")]
    InvalidCursor { reason: String },
}

/// Opaque identifier of a catalog entry, assigned by the document store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for EntryId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The technology family a project is listed under
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Python,
    Iot,
    Mern,
    Java,
    App,
    Game,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Python,
        Self::Iot,
        Self::Mern,
        Self::Java,
        Self::App,
        Self::Game,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Iot => "iot",
            Self::Mern => "mern",
            Self::Java => "java",
            Self::App => "app",
            Self::Game => "game",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "iot" => Ok(Self::Iot),
            "mern" => Ok(Self::Mern),
            "java" => Ok(Self::Java),
            "app" => Ok(Self::App),
            "game" => Ok(Self::Game),
            _ => Err(ValidationError::InvalidCategory(s.into())),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How demanding a project is to build
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(ValidationError::InvalidDifficulty(s.into())),
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
