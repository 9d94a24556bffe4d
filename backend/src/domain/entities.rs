//! Entity records held by the store.
//!
//! Field names double as the wire names, so the structs serialize straight
//! into the JSON bodies the API exchanges. Caps and epoch ranges are the
//! dataset's fixed bounds; validation enforces them before any record is
//! constructed.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Accepted `birth_date` values, seconds since the epoch.
pub const BIRTH_DATE_RANGE: RangeInclusive<i64> = -1_262_325_600..=915_123_600;

/// Accepted `visited_at` values, seconds since the epoch.
pub const VISITED_AT_RANGE: RangeInclusive<i64> = 946_659_600..=1_420_045_200;

/// Highest accepted visit mark.
pub const MAX_MARK: u8 = 5;

/// Byte cap for user emails.
pub const MAX_EMAIL_LEN: usize = 100;

/// Byte cap for names, countries, and cities.
pub const MAX_NAME_LEN: usize = 50;

/// User gender, serialized as `"m"` / `"f"`.
///
/// # Examples
/// ```
/// use backend::domain::Gender;
///
/// assert_eq!("f".parse::<Gender>(), Ok(Gender::Female));
/// assert!("x".parse::<Gender>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    /// Serialized as `"m"`.
    #[serde(rename = "m")]
    Male,
    /// Serialized as `"f"`.
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    /// The single-letter wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a gender string other than `"m"` or `"f"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGenderError {
    /// The unrecognised input value.
    pub input: String,
}

impl fmt::Display for ParseGenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown gender: {}", self.input)
    }
}

impl std::error::Error for ParseGenderError {}

impl std::str::FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(Self::Male),
            "f" => Ok(Self::Female),
            _ => Err(ParseGenderError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A registered traveller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Stable identifier, unique among users.
    pub id: u32,
    /// Contact address, unique across all users.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Gender.
    pub gender: Gender,
    /// Birth instant, seconds since the epoch (may be negative).
    pub birth_date: i64,
}

/// A place that can be visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    /// Stable identifier, unique among locations.
    pub id: u32,
    /// Free-text description of the place.
    pub place: String,
    /// Country name.
    pub country: String,
    /// City name.
    pub city: String,
    /// Distance from the city centre.
    pub distance: i64,
}

/// A single rated visit of a user to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Visit {
    /// Stable identifier, unique among visits.
    pub id: u32,
    /// Id of the visited [`Location`].
    pub location: u32,
    /// Id of the visiting [`User`].
    pub user: u32,
    /// Visit instant, seconds since the epoch.
    pub visited_at: i64,
    /// Rating in `[0, 5]`.
    pub mark: u8,
}
