//! User API handlers.
//!
//! ```text
//! GET  /users/{id}
//! POST /users/{id}          ({id} may be the literal "new")
//! GET  /users/{id}/visits
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::{Error, User, UserPatch, VisitFilter, VisitSummary, body_object, required_id};
use crate::inbound::http::ApiResult;
use crate::inbound::http::params::{UpsertTarget, decode_body, parse_epoch_param, parse_path_id};
use crate::inbound::http::state::AppState;

/// Fetch a user record.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User record", body = User),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_path_id(&path)?;
    let user = state
        .store
        .user(id)
        .ok_or_else(|| Error::not_found(format!("user {id} does not exist")))?;
    Ok(web::Json(user))
}

/// Insert a new user (`/users/new`) or update an existing one.
///
/// Inserts require every field including `id`; updates merge the supplied
/// fields over the stored record and ignore any `id` in the body.
#[utoipa::path(
    post,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id, or the literal \"new\"")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 400, description = "Malformed payload", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "upsertUser"
)]
#[post("/users/{id}")]
pub async fn upsert_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<Value>> {
    let target = UpsertTarget::from_path(&path)?;
    if let UpsertTarget::Existing(id) = target
        && state.store.user(id).is_none()
    {
        return Err(Error::not_found(format!("user {id} does not exist")));
    }
    let value = decode_body(&body)?;
    let object = body_object(&value)?;
    let patch = UserPatch::from_body(object)?;
    match target {
        UpsertTarget::Insert => state.store.create_user(required_id(object)?, patch)?,
        UpsertTarget::Existing(id) => state.store.update_user(id, patch)?,
    }
    Ok(web::Json(json!({})))
}

/// Query filters for [`list_user_visits`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitsQuery {
    /// Keep visits strictly after this instant.
    pub from_date: Option<String>,
    /// Keep visits strictly before this instant.
    pub to_date: Option<String>,
    /// Keep visits to locations in this country.
    pub country: Option<String>,
    /// Keep visits to locations strictly nearer than this.
    pub to_distance: Option<String>,
}

/// Listing envelope returned by [`list_user_visits`].
#[derive(Debug, Serialize, ToSchema)]
pub struct VisitListingBody {
    /// Matching visits, ascending by `visited_at`.
    pub visits: Vec<VisitSummary>,
}

/// List a user's visits, filtered and sorted by visit instant.
#[utoipa::path(
    get,
    path = "/users/{id}/visits",
    params(
        ("id" = String, Path, description = "User id"),
        ("fromDate" = Option<String>, Query, description = "Exclusive lower bound on visited_at"),
        ("toDate" = Option<String>, Query, description = "Exclusive upper bound on visited_at"),
        ("country" = Option<String>, Query, description = "Country of the visited location"),
        ("toDistance" = Option<String>, Query, description = "Exclusive upper bound on distance")
    ),
    responses(
        (status = 200, description = "Matching visits", body = VisitListingBody),
        (status = 400, description = "Malformed filter", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUserVisits"
)]
#[get("/users/{id}/visits")]
pub async fn list_user_visits(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<VisitsQuery>,
) -> ApiResult<web::Json<VisitListingBody>> {
    let id = parse_path_id(&path)?;
    if state.store.user(id).is_none() {
        return Err(Error::not_found(format!("user {id} does not exist")));
    }
    let query = query.into_inner();
    let filter = VisitFilter {
        from_date: parse_epoch_param(query.from_date, "fromDate")?,
        to_date: parse_epoch_param(query.to_date, "toDate")?,
        country: query.country.filter(|country| !country.is_empty()),
        to_distance: parse_epoch_param(query.to_distance, "toDistance")?,
    };
    let visits = state.store.list_visits(id, &filter)?;
    Ok(web::Json(VisitListingBody { visits }))
}
