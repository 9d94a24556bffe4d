//! Actix middleware used by the server.

pub mod trace;

pub use trace::{Trace, TraceId};
