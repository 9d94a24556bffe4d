//! Route registration shared by the binary and the test harness.

use actix_web::web;

use crate::inbound::http::{health, locations, users, visits};

/// Register every REST endpoint on the given service config.
///
/// The binary and the handler tests both build their `App` through this
/// function, so the routing table cannot drift between them.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(users::get_user)
        .service(users::upsert_user)
        .service(users::list_user_visits)
        .service(locations::get_location)
        .service(locations::upsert_location)
        .service(locations::location_average)
        .service(visits::get_visit)
        .service(visits::upsert_visit)
        .service(health::live)
        .service(health::ready);

    #[cfg(debug_assertions)]
    cfg.service(crate::doc::openapi_json);
}
