use actix_web::{HttpResponse, web};
use tracing::{info, instrument};

use crate::api::extract::SessionId;
use crate::error::AppError;
use crate::model::constraints::PlanningConstraints;
use crate::utils::session_cache::SessionRegistry;

#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}/constraints",
    params(("session_id" = String, Path,)),
    responses(
        (status = 200, description = "Current constraint form values", body = PlanningConstraints),
        (status = 404, description = "Unknown session")
    ),
    tag = "Constraints"
)]
pub async fn get_constraints(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
) -> Result<HttpResponse, AppError> {
    let session = session_id.resolve(&registry).await?;
    let constraints = session.read_constraints(|c| c.clone());
    Ok(HttpResponse::Ok().json(constraints))
}

/// Replaces every constraint value at once. The activity set is fixed per
/// session; only widget bounds are checked.
#[utoipa::path(
    put,
    path = "/api/sessions/{session_id}/constraints",
    params(("session_id" = String, Path,)),
    request_body(content = PlanningConstraints, content_type = "application/json"),
    responses(
        (status = 200, description = "Constraints replaced", body = PlanningConstraints),
        (status = 404, description = "Unknown session"),
        (status = 422, description = "Value out of bounds or activity set changed")
    ),
    tag = "Constraints"
)]
#[instrument(name = "update_constraints", skip_all, fields(session_id = %session_id.as_str()))]
pub async fn update_constraints(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
    payload: web::Json<PlanningConstraints>,
) -> Result<HttpResponse, AppError> {
    let session = session_id.resolve(&registry).await?;
    let updated = session.write_constraints(|c| {
        c.replace(payload.into_inner())?;
        Ok::<_, AppError>(c.clone())
    })?;
    info!("Constraints updated");
    Ok(HttpResponse::Ok().json(updated))
}
