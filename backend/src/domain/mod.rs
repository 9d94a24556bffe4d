//! Domain core: entities, validation, the indexed store, and its read
//! operations.
//!
//! Everything in here is transport agnostic. The HTTP adapter in
//! [`crate::inbound`] translates requests into the operations this module
//! exposes and maps [`Error`] back onto the wire.

pub mod age;
pub mod entities;
pub mod error;
pub mod queries;
pub mod store;
pub mod validation;

pub use self::age::{CalendarDiff, age_in_years, calendar_diff};
pub use self::entities::{Gender, Location, ParseGenderError, User, Visit};
pub use self::error::{Error, ErrorCode};
pub use self::queries::{MarkFilter, VisitFilter, VisitSummary};
pub use self::store::Store;
pub use self::validation::{LocationPatch, UserPatch, VisitPatch, body_object, required_id};
