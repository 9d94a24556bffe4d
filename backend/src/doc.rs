//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

/// Aggregated OpenAPI description of the REST surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::upsert_user,
        crate::inbound::http::users::list_user_visits,
        crate::inbound::http::locations::get_location,
        crate::inbound::http::locations::upsert_location,
        crate::inbound::http::locations::location_average,
        crate::inbound::http::visits::get_visit,
        crate::inbound::http::visits::upsert_visit,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        crate::domain::User,
        crate::domain::Location,
        crate::domain::Visit,
        crate::domain::Gender,
        crate::domain::UserPatch,
        crate::domain::LocationPatch,
        crate::domain::VisitPatch,
        crate::domain::VisitSummary,
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::inbound::http::users::VisitListingBody,
        crate::inbound::http::locations::AverageBody,
    )),
    tags(
        (name = "users", description = "User records and their visit listings"),
        (name = "locations", description = "Location records and mark aggregates"),
        (name = "visits", description = "Visit records"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

/// Serve the raw OpenAPI document (debug builds only).
#[cfg(debug_assertions)]
#[actix_web::get("/api-docs/openapi.json")]
pub async fn openapi_json() -> actix_web::web::Json<utoipa::openapi::OpenApi> {
    actix_web::web::Json(ApiDoc::openapi())
}
