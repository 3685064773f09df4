use actix_web::{HttpResponse, http::header::ContentType, web};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::api::extract::SessionId;
use crate::availability::snapshot::Snapshot;
use crate::error::AppError;
use crate::export::{ExportDocument, ExportKind, ExportWriter, validate_file_name};
use crate::model::constraints::PlanningConstraints;
use crate::model::work_state::Wording;
use crate::utils::session_cache::{PlanningSession, SessionRegistry};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// `legacy` (default) or `canonical`
    pub wording: Option<Wording>,
    /// `full` (default) or `availability_only`
    pub kind: Option<ExportKind>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExportRequest {
    pub wording: Option<Wording>,
    pub kind: Option<ExportKind>,
    /// Plain `.json` file name inside the export directory
    #[schema(example = "parametres_planning.json")]
    pub file_name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ExportResponse {
    #[schema(example = "Paramètres exportés")]
    pub message: String,
    #[schema(example = "exports/parametres_planning.json")]
    pub path: String,
    pub bytes: usize,
}

fn capture(session: &PlanningSession) -> (Snapshot, PlanningConstraints) {
    session.read_all(|store, constraints| (store.snapshot(), constraints.clone()))
}

fn render(
    snapshot: &Snapshot,
    constraints: &PlanningConstraints,
    wording: Wording,
    kind: ExportKind,
) -> Result<Vec<u8>, AppError> {
    ExportDocument {
        constraints,
        snapshot,
        wording,
        kind,
    }
    .to_pretty_json()
    .map_err(|e| AppError::Export(e.into()))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}/export",
    params(("session_id" = String, Path,), ExportQuery),
    responses(
        (status = 200, description = "Document that would be exported", body = Object,
         example = json!({
            "effectifs_journaliers": {"Téléphone": {"Min": [1, 1, 1, 1, 1, 1, 1], "Max": [5, 5, 5, 5, 5, 5, 5]}},
            "jours_consecutifs_max": {"Téléphone": 5},
            "activites_par_employe": 1,
            "disponibilites": {"Employé 1": {"2024-01-01": "Travail"}}
         })),
        (status = 404, description = "Unknown session")
    ),
    tag = "Export"
)]
pub async fn preview_export(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, AppError> {
    let session = session_id.resolve(&registry).await?;
    let (snapshot, constraints) = capture(&session);
    let body = render(
        &snapshot,
        &constraints,
        query.wording.unwrap_or_default(),
        query.kind.unwrap_or_default(),
    )?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

/// Writes the document to the export directory. A failed write leaves any
/// previous export untouched.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/export",
    params(("session_id" = String, Path,)),
    request_body(content = ExportRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "File written", body = ExportResponse),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "Unknown session"),
        (status = 500, description = "Export failed")
    ),
    tag = "Export"
)]
#[instrument(name = "write_export", skip_all, fields(session_id = %session_id.as_str()))]
pub async fn write_export(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
    writer: web::Data<ExportWriter>,
    payload: web::Json<ExportRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_id.resolve(&registry).await?;
    let request = payload.into_inner();
    let kind = request.kind.unwrap_or_default();
    let (snapshot, constraints) = capture(&session);
    let file_name = request
        .file_name
        .unwrap_or_else(|| kind.default_file_name(snapshot.granularity()).to_string());
    validate_file_name(&file_name).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let body = render(
        &snapshot,
        &constraints,
        request.wording.unwrap_or_default(),
        kind,
    )?;
    let bytes = body.len();

    let writer = writer.clone();
    let path = web::block(move || writer.write(&file_name, &body))
        .await
        .map_err(|e| AppError::Export(anyhow!("export worker failed: {}", e)))??;

    info!(path = %path.display(), bytes, "Parameters exported");
    Ok(HttpResponse::Ok().json(ExportResponse {
        message: "Paramètres exportés".to_string(),
        path: path.display().to_string(),
        bytes,
    }))
}
