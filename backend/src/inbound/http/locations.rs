//! Location API handlers.
//!
//! ```text
//! GET  /locations/{id}
//! POST /locations/{id}      ({id} may be the literal "new")
//! GET  /locations/{id}/avg
//! ```

use actix_web::{get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::{Error, Location, LocationPatch, MarkFilter, body_object, required_id};
use crate::inbound::http::ApiResult;
use crate::inbound::http::params::{
    UpsertTarget, decode_body, parse_epoch_param, parse_gender_param, parse_path_id,
};
use crate::inbound::http::state::AppState;

/// Fetch a location record.
#[utoipa::path(
    get,
    path = "/locations/{id}",
    params(("id" = String, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location record", body = Location),
        (status = 404, description = "Unknown location", body = Error)
    ),
    tags = ["locations"],
    operation_id = "getLocation"
)]
#[get("/locations/{id}")]
pub async fn get_location(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Location>> {
    let id = parse_path_id(&path)?;
    let location = state
        .store
        .location(id)
        .ok_or_else(|| Error::not_found(format!("location {id} does not exist")))?;
    Ok(web::Json(location))
}

/// Insert a new location (`/locations/new`) or update an existing one.
#[utoipa::path(
    post,
    path = "/locations/{id}",
    params(("id" = String, Path, description = "Location id, or the literal \"new\"")),
    request_body = LocationPatch,
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 400, description = "Malformed payload", body = Error),
        (status = 404, description = "Unknown location", body = Error)
    ),
    tags = ["locations"],
    operation_id = "upsertLocation"
)]
#[post("/locations/{id}")]
pub async fn upsert_location(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<Value>> {
    let target = UpsertTarget::from_path(&path)?;
    if let UpsertTarget::Existing(id) = target
        && state.store.location(id).is_none()
    {
        return Err(Error::not_found(format!("location {id} does not exist")));
    }
    let value = decode_body(&body)?;
    let object = body_object(&value)?;
    let patch = LocationPatch::from_body(object)?;
    match target {
        UpsertTarget::Insert => state.store.create_location(required_id(object)?, patch)?,
        UpsertTarget::Existing(id) => state.store.update_location(id, patch)?,
    }
    Ok(web::Json(json!({})))
}

/// Query filters for [`location_average`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageQuery {
    /// Keep visits strictly after this instant.
    pub from_date: Option<String>,
    /// Keep visits strictly before this instant.
    pub to_date: Option<String>,
    /// Keep visitors at least this old.
    pub from_age: Option<String>,
    /// Keep visitors strictly younger than this.
    pub to_age: Option<String>,
    /// Keep visitors of this gender.
    pub gender: Option<String>,
}

/// Aggregate envelope returned by [`location_average`].
#[derive(Debug, Serialize, ToSchema)]
pub struct AverageBody {
    /// Mean mark over the matching visits, rounded to five decimals.
    pub avg: f64,
}

/// Mean mark of a location's visits under the given filters.
#[utoipa::path(
    get,
    path = "/locations/{id}/avg",
    params(
        ("id" = String, Path, description = "Location id"),
        ("fromDate" = Option<String>, Query, description = "Exclusive lower bound on visited_at"),
        ("toDate" = Option<String>, Query, description = "Exclusive upper bound on visited_at"),
        ("fromAge" = Option<String>, Query, description = "Inclusive lower bound on visitor age"),
        ("toAge" = Option<String>, Query, description = "Exclusive upper bound on visitor age"),
        ("gender" = Option<String>, Query, description = "Visitor gender, \"m\" or \"f\"")
    ),
    responses(
        (status = 200, description = "Mean mark", body = AverageBody),
        (status = 400, description = "Malformed filter", body = Error),
        (status = 404, description = "Unknown location", body = Error)
    ),
    tags = ["locations"],
    operation_id = "locationAverage"
)]
#[get("/locations/{id}/avg")]
pub async fn location_average(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<AverageQuery>,
) -> ApiResult<web::Json<AverageBody>> {
    let id = parse_path_id(&path)?;
    if state.store.location(id).is_none() {
        return Err(Error::not_found(format!("location {id} does not exist")));
    }
    let query = query.into_inner();
    let filter = MarkFilter {
        from_date: parse_epoch_param(query.from_date, "fromDate")?,
        to_date: parse_epoch_param(query.to_date, "toDate")?,
        from_age: parse_epoch_param(query.from_age, "fromAge")?,
        to_age: parse_epoch_param(query.to_age, "toAge")?,
        gender: parse_gender_param(query.gender)?,
    };
    let avg = state.store.average_mark(id, &filter, Utc::now())?;
    Ok(web::Json(AverageBody { avg }))
}
