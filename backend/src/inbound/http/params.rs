//! Path and query-parameter parsing for the REST endpoints.
//!
//! Path ids arrive as raw strings because the upsert routes accept the
//! literal `new` in the id position. Anything else that fails to parse as an
//! id reads as a lookup of nothing, hence `NotFound` rather than
//! `InvalidRequest`. Query filters are optional strings; an empty value
//! counts as absent, and a present value that fails to parse rejects.

use serde_json::Value;

use crate::domain::{Error, Gender};

/// Parse a path segment as an entity id; misses become `NotFound`.
pub(crate) fn parse_path_id(raw: &str) -> Result<u32, Error> {
    raw.parse::<u32>()
        .map_err(|_| Error::not_found(format!("no such resource: {raw}")))
}

/// Target of an upsert route: a fresh insert or an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpsertTarget {
    /// The path id was the literal `new`.
    Insert,
    /// The path id named an existing record to update.
    Existing(u32),
}

impl UpsertTarget {
    /// Classify the id segment of an upsert path.
    pub(crate) fn from_path(raw: &str) -> Result<Self, Error> {
        if raw == "new" {
            Ok(Self::Insert)
        } else {
            parse_path_id(raw).map(Self::Existing)
        }
    }
}

/// Decode a raw request body as JSON.
pub(crate) fn decode_body(bytes: &[u8]) -> Result<Value, Error> {
    serde_json::from_slice(bytes)
        .map_err(|_| Error::invalid_request("request body must be valid JSON"))
}

/// Parse an optional integer filter value.
pub(crate) fn parse_epoch_param(
    value: Option<String>,
    name: &'static str,
) -> Result<Option<i64>, Error> {
    let Some(raw) = value else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| Error::invalid_request(format!("{name} must be an integer")))
}

/// Parse an optional gender filter value.
pub(crate) fn parse_gender_param(value: Option<String>) -> Result<Option<Gender>, Error> {
    let Some(raw) = value else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<Gender>()
        .map(Some)
        .map_err(|_| Error::invalid_request("gender must be \"m\" or \"f\""))
}
