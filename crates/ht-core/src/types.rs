//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Unknown habit kind.
    #[error("invalid habit kind: {value} (expected positive or negative)")]
    InvalidHabitKind { value: String },

    /// A date key that is not a real `YYYY-MM-DD` day.
    #[error("invalid date key: {value} (expected YYYY-MM-DD)")]
    InvalidDateKey { value: String },

    /// A calendar month outside 1..=12 or outside chrono's date range.
    #[error("invalid month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    /// Rolling average window that the charts do not offer.
    #[error("unsupported rolling window: {days} days (expected 30, 90 or 180)")]
    UnsupportedWindow { days: u32 },
}

/// Whether a habit is built (logged days are successes) or broken
/// (logged days are lapses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    /// "Do this daily."
    Positive,
    /// "Avoid this daily."
    Negative,
}

impl HabitKind {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    /// Whether a day with (or without) a log satisfies this habit.
    #[must_use]
    pub const fn is_success(self, has_log: bool) -> bool {
        match self {
            Self::Positive => has_log,
            Self::Negative => !has_log,
        }
    }
}

impl fmt::Display for HabitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HabitKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            _ => Err(ValidationError::InvalidHabitKind {
                value: s.to_string(),
            }),
        }
    }
}

/// Span of the rolling-average trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RollingWindow {
    #[default]
    Days30,
    Days90,
    Days180,
}

impl RollingWindow {
    /// Number of days plotted.
    #[must_use]
    pub const fn days(self) -> u32 {
        match self {
            Self::Days30 => 30,
            Self::Days90 => 90,
            Self::Days180 => 180,
        }
    }
}

impl TryFrom<u32> for RollingWindow {
    type Error = ValidationError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            30 => Ok(Self::Days30),
            90 => Ok(Self::Days90),
            180 => Ok(Self::Days180),
            _ => Err(ValidationError::UnsupportedWindow { days }),
        }
    }
}

impl From<RollingWindow> for u32 {
    fn from(window: RollingWindow) -> Self {
        window.days()
    }
}

impl fmt::Display for RollingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated habit identifier.
    ///
    /// Habit IDs must be non-empty strings. Uniqueness is enforced by the store.
    HabitId, "habit ID"
);

define_string_id!(
    /// A validated log entry identifier.
    LogId, "log ID"
);
