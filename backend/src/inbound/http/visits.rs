//! Visit API handlers.
//!
//! ```text
//! GET  /visits/{id}
//! POST /visits/{id}         ({id} may be the literal "new")
//! ```

use actix_web::{get, post, web};
use serde_json::{Value, json};

use crate::domain::{Error, Visit, VisitPatch, body_object, required_id};
use crate::inbound::http::ApiResult;
use crate::inbound::http::params::{UpsertTarget, decode_body, parse_path_id};
use crate::inbound::http::state::AppState;

/// Fetch a visit record.
#[utoipa::path(
    get,
    path = "/visits/{id}",
    params(("id" = String, Path, description = "Visit id")),
    responses(
        (status = 200, description = "Visit record", body = Visit),
        (status = 404, description = "Unknown visit", body = Error)
    ),
    tags = ["visits"],
    operation_id = "getVisit"
)]
#[get("/visits/{id}")]
pub async fn get_visit(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Visit>> {
    let id = parse_path_id(&path)?;
    let visit = state
        .store
        .visit(id)
        .ok_or_else(|| Error::not_found(format!("visit {id} does not exist")))?;
    Ok(web::Json(visit))
}

/// Insert a new visit (`/visits/new`) or update an existing one.
///
/// The referenced location and user must exist; the store checks both while
/// it applies the write, so an update can never leave a dangling reference
/// or a stale index entry.
#[utoipa::path(
    post,
    path = "/visits/{id}",
    params(("id" = String, Path, description = "Visit id, or the literal \"new\"")),
    request_body = VisitPatch,
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 400, description = "Malformed payload", body = Error),
        (status = 404, description = "Unknown visit", body = Error)
    ),
    tags = ["visits"],
    operation_id = "upsertVisit"
)]
#[post("/visits/{id}")]
pub async fn upsert_visit(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<Value>> {
    let target = UpsertTarget::from_path(&path)?;
    if let UpsertTarget::Existing(id) = target
        && state.store.visit(id).is_none()
    {
        return Err(Error::not_found(format!("visit {id} does not exist")));
    }
    let value = decode_body(&body)?;
    let object = body_object(&value)?;
    let patch = VisitPatch::from_body(object)?;
    match target {
        UpsertTarget::Insert => state.store.create_visit(required_id(object)?, patch)?,
        UpsertTarget::Existing(id) => state.store.update_visit(id, patch)?,
    }
    Ok(web::Json(json!({})))
}
