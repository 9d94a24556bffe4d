//! Backend library modules.
//!
//! An in-memory travels service: three related entity types (users,
//! locations, visits) behind an indexed store, a small query engine over it,
//! and a REST adapter. State lives only for the lifetime of the process; a
//! packaged dataset can be ingested once at startup.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod loader;
pub mod middleware;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::Trace;
