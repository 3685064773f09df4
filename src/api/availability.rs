use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::api::extract::SessionId;
use crate::availability::projection::{BoardWeek, DisplayTable, GridProjection, Layout, Vocabulary};
use crate::availability::store::CellKey;
use crate::error::AppError;
use crate::model::work_state::{Segment, WorkState, Wording};
use crate::utils::session_cache::SessionRegistry;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SnapshotQuery {
    /// `legacy` (Travail/Congé, default) or `canonical` (Working/Leave)
    pub wording: Option<Wording>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GridQuery {
    /// `employee_major` (default) or `day_major`
    pub layout: Option<Layout>,
    /// `glyph` (default) or `label`
    pub vocabulary: Option<Vocabulary>,
}

impl GridQuery {
    fn projection(&self) -> GridProjection {
        GridProjection::new(
            self.layout.unwrap_or_default(),
            self.vocabulary.unwrap_or_default(),
        )
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BoardQuery {
    pub vocabulary: Option<Vocabulary>,
}

#[derive(Deserialize, ToSchema)]
pub struct ToggleRequest {
    #[schema(example = "Employé 1")]
    pub employee: String,
    #[schema(value_type = String, format = "date", example = "2024-01-01")]
    pub day: NaiveDate,
    /// Defaults to `whole_day`
    pub segment: Option<Segment>,
}

#[derive(Serialize, ToSchema)]
pub struct ToggleResponse {
    #[schema(example = "Employé 1")]
    pub employee: String,
    #[schema(value_type = String, format = "date", example = "2024-01-01")]
    pub day: NaiveDate,
    pub segment: Segment,
    pub state: WorkState,
    #[schema(example = "Congé")]
    pub label: String,
}

#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}/availability",
    params(("session_id" = String, Path,), SnapshotQuery),
    responses(
        (status = 200, description = "employee -> date -> state (-> half-day)", body = Object,
         example = json!({"Employé 1": {"2024-01-01": "Travail", "2024-01-02": "Congé"}})),
        (status = 404, description = "Unknown session")
    ),
    tag = "Availability"
)]
pub async fn get_snapshot(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
    query: web::Query<SnapshotQuery>,
) -> Result<HttpResponse, AppError> {
    let session = session_id.resolve(&registry).await?;
    let snapshot = session.read_store(|store| store.snapshot());
    let wording = query.wording.unwrap_or_default();
    Ok(HttpResponse::Ok().json(snapshot.worded(wording)))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/availability/toggle",
    params(("session_id" = String, Path,)),
    request_body(content = ToggleRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Cell flipped", body = ToggleResponse),
        (status = 404, description = "Unknown session or cell")
    ),
    tag = "Availability"
)]
#[instrument(name = "toggle_cell", skip_all, fields(session_id = %session_id.as_str()))]
pub async fn toggle_cell(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
    payload: web::Json<ToggleRequest>,
) -> Result<HttpResponse, AppError> {
    let session = session_id.resolve(&registry).await?;
    let ToggleRequest {
        employee,
        day,
        segment,
    } = payload.into_inner();
    let key = CellKey::new(employee, day, segment.unwrap_or(Segment::WholeDay));

    let state = session
        .write_store(|store| store.toggle(&key))
        .map_err(|e| {
            warn!(error = %e, "Toggle on a cell outside the grid");
            e
        })?;

    Ok(HttpResponse::Ok().json(ToggleResponse {
        employee: key.employee.to_string(),
        day: key.day,
        segment: key.segment,
        state,
        label: Wording::Legacy.state(state).to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}/availability/grid",
    params(("session_id" = String, Path,), GridQuery),
    responses(
        (status = 200, description = "Display table", body = DisplayTable),
        (status = 404, description = "Unknown session")
    ),
    tag = "Availability"
)]
pub async fn get_grid(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
    query: web::Query<GridQuery>,
) -> Result<HttpResponse, AppError> {
    let session = session_id.resolve(&registry).await?;
    let table = session.read_store(|store| query.projection().project(store));
    Ok(HttpResponse::Ok().json(table))
}

#[utoipa::path(
    put,
    path = "/api/sessions/{session_id}/availability/grid",
    params(("session_id" = String, Path,)),
    request_body(content = DisplayTable, content_type = "application/json"),
    responses(
        (status = 200, description = "Grid replaced; the new display table is returned", body = DisplayTable),
        (status = 404, description = "Unknown session"),
        (status = 422, description = "Unrecognised marker or table shape; nothing was changed")
    ),
    tag = "Availability"
)]
#[instrument(name = "replace_grid", skip_all, fields(session_id = %session_id.as_str()))]
pub async fn replace_grid(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
    payload: web::Json<DisplayTable>,
) -> Result<HttpResponse, AppError> {
    let session = session_id.resolve(&registry).await?;
    let edits = payload.into_inner();

    let table = session.write_store(|store| {
        store.bulk_replace(&edits)?;
        Ok::<_, AppError>(GridProjection::for_table(&edits).project(store))
    })?;

    tracing::debug!(rows = table.rows.len(), "Grid replaced");
    Ok(HttpResponse::Ok().json(table))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}/availability/board/{employee}",
    params(
        ("session_id" = String, Path,),
        ("employee" = String, Path, description = "Employee identifier"),
        BoardQuery
    ),
    responses(
        (status = 200, description = "Weeks of clickable cells", body = [BoardWeek]),
        (status = 404, description = "Unknown session or employee")
    ),
    tag = "Availability"
)]
pub async fn get_board(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
    path: web::Path<(String, String)>,
    query: web::Query<BoardQuery>,
) -> Result<HttpResponse, AppError> {
    let session = session_id.resolve(&registry).await?;
    let (_, employee) = path.into_inner();
    let projection = GridProjection::new(Layout::default(), query.vocabulary.unwrap_or_default());
    let board = session.read_store(|store| projection.board(store, &employee))?;
    Ok(HttpResponse::Ok().json(board))
}
