//! Database enum types with Diesel serialization.
//!
//! Each enum maps to a CHECK constraint and implements `ToSql` and `FromSql`
//! for automatic conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use evento_core::error::CoreError;

/// Kind of event.
///
/// Maps to `event.category` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Conference,
    Concert,
    Seminar,
}

impl ToSql<Text, Pg> for EventCategory {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for EventCategory {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"conference" => Ok(Self::Conference),
            b"concert" => Ok(Self::Concert),
            b"seminar" => Ok(Self::Seminar),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl EventCategory {
    pub const ALL: [Self; 3] = [Self::Conference, Self::Concert, Self::Seminar];

    /// Returns the database string representation of this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conference => "conference",
            Self::Concert => "concert",
            Self::Seminar => "seminar",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Conference => "Conference",
            Self::Concert => "Concert",
            Self::Seminar => "Seminar",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown event category: {s}")))
    }
}
