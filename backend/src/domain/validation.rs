//! Payload validation for mutation requests.
//!
//! Mutations arrive as untyped JSON objects. Each recognized field is read
//! with its expected JSON type: a value of the wrong type rejects rather than
//! coerces, and an explicit `null` always rejects. Extraction produces a
//! patch with one `Option` per field, so "supplied" and "omitted" stay
//! distinct even for legitimately-zero values. Inserts then demand a complete
//! patch (`into_*`); updates merge the patch over the stored record
//! (`apply`).
//!
//! Referential checks for visit payloads are not performed here; they run
//! inside the store's write path so that check and write share one critical
//! section.

use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::entities::{
    BIRTH_DATE_RANGE, Gender, Location, MAX_EMAIL_LEN, MAX_MARK, MAX_NAME_LEN, User,
    VISITED_AT_RANGE, Visit,
};
use super::error::Error;

fn bad_field(name: &str) -> Error {
    Error::invalid_request(format!("invalid field: {name}"))
}

/// Borrow the object form of a decoded JSON body.
pub fn body_object(body: &Value) -> Result<&Map<String, Value>, Error> {
    body.as_object()
        .ok_or_else(|| Error::invalid_request("request body must be a JSON object"))
}

/// Look up a field, treating an explicit `null` as a rejection.
fn field<'a>(body: &'a Map<String, Value>, name: &str) -> Result<Option<&'a Value>, Error> {
    match body.get(name) {
        Some(Value::Null) => Err(bad_field(name)),
        other => Ok(other),
    }
}

fn opt_string(
    body: &Map<String, Value>,
    name: &str,
    max_len: Option<usize>,
) -> Result<Option<String>, Error> {
    let Some(value) = field(body, name)? else {
        return Ok(None);
    };
    let text = value.as_str().ok_or_else(|| bad_field(name))?;
    if max_len.is_some_and(|cap| text.len() > cap) {
        return Err(bad_field(name));
    }
    Ok(Some(text.to_owned()))
}

fn opt_int(body: &Map<String, Value>, name: &str) -> Result<Option<i64>, Error> {
    let Some(value) = field(body, name)? else {
        return Ok(None);
    };
    value.as_i64().map(Some).ok_or_else(|| bad_field(name))
}

fn opt_id(body: &Map<String, Value>, name: &str) -> Result<Option<u32>, Error> {
    let Some(raw) = opt_int(body, name)? else {
        return Ok(None);
    };
    u32::try_from(raw).map(Some).map_err(|_| bad_field(name))
}

/// Extract the mandatory `id` field of an insert payload.
pub fn required_id(body: &Map<String, Value>) -> Result<u32, Error> {
    opt_id(body, "id")?.ok_or_else(|| bad_field("id"))
}

/// Validated field-level patch for a [`User`] record.
#[derive(Debug, Clone, Default, PartialEq, Eq, ToSchema)]
pub struct UserPatch {
    /// Replacement email, `≤ 100` bytes.
    pub email: Option<String>,
    /// Replacement given name, `≤ 50` bytes.
    pub first_name: Option<String>,
    /// Replacement family name, `≤ 50` bytes.
    pub last_name: Option<String>,
    /// Replacement gender.
    pub gender: Option<Gender>,
    /// Replacement birth instant, within the plausible range.
    pub birth_date: Option<i64>,
}

impl UserPatch {
    /// Read and validate every recognized user field present in `body`.
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, Error> {
        let gender = match opt_string(body, "gender", None)? {
            Some(raw) => Some(raw.parse::<Gender>().map_err(|_| bad_field("gender"))?),
            None => None,
        };
        let birth_date = opt_int(body, "birth_date")?
            .map(|value| {
                BIRTH_DATE_RANGE
                    .contains(&value)
                    .then_some(value)
                    .ok_or_else(|| bad_field("birth_date"))
            })
            .transpose()?;
        Ok(Self {
            email: opt_string(body, "email", Some(MAX_EMAIL_LEN))?,
            first_name: opt_string(body, "first_name", Some(MAX_NAME_LEN))?,
            last_name: opt_string(body, "last_name", Some(MAX_NAME_LEN))?,
            gender,
            birth_date,
        })
    }

    /// Turn a complete patch into a record, rejecting if any field is absent.
    pub fn into_user(self, id: u32) -> Result<User, Error> {
        let Self {
            email: Some(email),
            first_name: Some(first_name),
            last_name: Some(last_name),
            gender: Some(gender),
            birth_date: Some(birth_date),
        } = self
        else {
            return Err(Error::invalid_request("insert requires every user field"));
        };
        Ok(User {
            id,
            email,
            first_name,
            last_name,
            gender,
            birth_date,
        })
    }

    /// Overwrite the supplied fields of `user`, leaving the rest untouched.
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(gender) = self.gender {
            user.gender = gender;
        }
        if let Some(birth_date) = self.birth_date {
            user.birth_date = birth_date;
        }
    }
}

/// Validated field-level patch for a [`Location`] record.
#[derive(Debug, Clone, Default, PartialEq, Eq, ToSchema)]
pub struct LocationPatch {
    /// Replacement place description (no length bound).
    pub place: Option<String>,
    /// Replacement country, `≤ 50` bytes.
    pub country: Option<String>,
    /// Replacement city, `≤ 50` bytes.
    pub city: Option<String>,
    /// Replacement distance (unconstrained).
    pub distance: Option<i64>,
}

impl LocationPatch {
    /// Read and validate every recognized location field present in `body`.
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, Error> {
        Ok(Self {
            place: opt_string(body, "place", None)?,
            country: opt_string(body, "country", Some(MAX_NAME_LEN))?,
            city: opt_string(body, "city", Some(MAX_NAME_LEN))?,
            distance: opt_int(body, "distance")?,
        })
    }

    /// Turn a complete patch into a record, rejecting if any field is absent.
    pub fn into_location(self, id: u32) -> Result<Location, Error> {
        let Self {
            place: Some(place),
            country: Some(country),
            city: Some(city),
            distance: Some(distance),
        } = self
        else {
            return Err(Error::invalid_request(
                "insert requires every location field",
            ));
        };
        Ok(Location {
            id,
            place,
            country,
            city,
            distance,
        })
    }

    /// Overwrite the supplied fields of `location`, leaving the rest untouched.
    pub fn apply(self, location: &mut Location) {
        if let Some(place) = self.place {
            location.place = place;
        }
        if let Some(country) = self.country {
            location.country = country;
        }
        if let Some(city) = self.city {
            location.city = city;
        }
        if let Some(distance) = self.distance {
            location.distance = distance;
        }
    }
}

/// Validated field-level patch for a [`Visit`] record.
///
/// The `location` and `user` references are shape-checked only; whether they
/// resolve is decided by the store at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq, ToSchema)]
pub struct VisitPatch {
    /// Replacement location reference.
    pub location: Option<u32>,
    /// Replacement user reference.
    pub user: Option<u32>,
    /// Replacement visit instant, within the valid range.
    pub visited_at: Option<i64>,
    /// Replacement mark in `[0, 5]`.
    pub mark: Option<u8>,
}

impl VisitPatch {
    /// Read and validate every recognized visit field present in `body`.
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, Error> {
        let visited_at = opt_int(body, "visited_at")?
            .map(|value| {
                VISITED_AT_RANGE
                    .contains(&value)
                    .then_some(value)
                    .ok_or_else(|| bad_field("visited_at"))
            })
            .transpose()?;
        let mark = opt_int(body, "mark")?
            .map(|value| {
                u8::try_from(value)
                    .ok()
                    .filter(|mark| *mark <= MAX_MARK)
                    .ok_or_else(|| bad_field("mark"))
            })
            .transpose()?;
        Ok(Self {
            location: opt_id(body, "location")?,
            user: opt_id(body, "user")?,
            visited_at,
            mark,
        })
    }

    /// Turn a complete patch into a record, rejecting if any field is absent.
    pub fn into_visit(self, id: u32) -> Result<Visit, Error> {
        let Self {
            location: Some(location),
            user: Some(user),
            visited_at: Some(visited_at),
            mark: Some(mark),
        } = self
        else {
            return Err(Error::invalid_request("insert requires every visit field"));
        };
        Ok(Visit {
            id,
            location,
            user,
            visited_at,
            mark,
        })
    }

    /// Overwrite the supplied fields of `visit`, leaving the rest untouched.
    pub fn apply(self, visit: &mut Visit) {
        if let Some(location) = self.location {
            visit.location = location;
        }
        if let Some(user) = self.user {
            visit.user = user;
        }
        if let Some(visited_at) = self.visited_at {
            visit.visited_at = visited_at;
        }
        if let Some(mark) = self.mark {
            visit.mark = mark;
        }
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
