//! Identifier newtypes shared across the hangout domain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_row_id {
    ($(#[$outer:meta])* $name:ident) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database identifier.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Raw database identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

define_row_id! {
    /// Hangout primary key.
    HangoutId
}

define_row_id! {
    /// Poll time option primary key. Allocation order doubles as the poll
    /// tie-break order.
    TimeOptionId
}

define_row_id! {
    /// Place recommendation primary key.
    RecommendationId
}

/// Validation failure when parsing a [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("user id must be a valid UUID: {input}")]
pub struct UserIdError {
    input: String,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its hyphenated string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserIdError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserIdError {
                input: raw.to_owned(),
            });
        }
        Uuid::parse_str(raw).map(Self).map_err(|_| UserIdError {
            input: raw.to_owned(),
        })
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for UserId {
    type Err = UserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn user_id_rejects_malformed_input(#[case] raw: &str) {
        assert!(UserId::new(raw).is_err());
    }

    #[rstest]
    fn user_id_displays_the_hyphenated_uuid() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id = UserId::new(raw).expect("valid uuid");
        assert_eq!(id.to_string(), raw);
    }

    #[rstest]
    fn row_ids_order_by_allocation() {
        assert!(TimeOptionId::new(3) < TimeOptionId::new(11));
        assert_eq!("42".parse::<HangoutId>().expect("parses"), HangoutId::new(42));
    }
}
