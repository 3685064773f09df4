use actix_web::{HttpResponse, http::StatusCode, web};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::api::extract::SessionId;
use crate::config::Config;
use crate::error::AppError;
use crate::model::employee::Employee;
use crate::model::horizon::Horizon;
use crate::model::work_state::{Granularity, WorkState};
use crate::utils::session_cache::{PlanningSession, SessionBlueprint, SessionRegistry};

const MAX_ROSTER_SIZE: usize = 500;
const MAX_HORIZON_DAYS: usize = 366;

/// Every field is optional; missing ones come from the server configuration.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InitializeSession {
    /// Explicit employee identifiers, in display order
    #[schema(example = json!(["Employé 1", "Employé 2"]))]
    pub roster: Option<Vec<String>>,
    /// Size of a generated numbered roster, ignored when `roster` is given
    #[schema(example = 14)]
    pub roster_size: Option<usize>,
    /// First day of the horizon, today by default
    #[schema(value_type = Option<String>, format = "date", example = "2024-01-01")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = 28)]
    pub horizon_days: Option<usize>,
    pub granularity: Option<Granularity>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    #[schema(example = "3f1c2a4e-0d6b-4f7e-9a51-2b8c7d6e5f40")]
    pub session_id: String,
    /// True when this request opened the session
    pub created: bool,
    pub granularity: Granularity,
    pub employees: Vec<String>,
    #[schema(value_type = String, format = "date", example = "2024-01-01")]
    pub start_date: NaiveDate,
    #[schema(example = 28)]
    pub horizon_days: usize,
    pub cells: usize,
    pub leave_cells: usize,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

fn blueprint(config: &Config, req: InitializeSession) -> Result<SessionBlueprint, AppError> {
    let start = req
        .start_date
        .unwrap_or_else(|| Local::now().date_naive());
    let mut blueprint = config.default_blueprint(start)?;

    if let Some(days) = req.horizon_days {
        if days > MAX_HORIZON_DAYS {
            return Err(AppError::BadRequest(format!(
                "horizon_days cannot exceed {}",
                MAX_HORIZON_DAYS
            )));
        }
        blueprint.horizon = Horizon::anchored(start, days)?;
    }

    if let Some(ids) = req.roster {
        blueprint.roster = ids.into_iter().map(Employee::from).collect();
    } else if let Some(size) = req.roster_size {
        blueprint.roster = Employee::roster(&config.employee_prefix, size.min(MAX_ROSTER_SIZE + 1));
    }
    if blueprint.roster.len() > MAX_ROSTER_SIZE {
        return Err(AppError::BadRequest(format!(
            "roster cannot exceed {} employees",
            MAX_ROSTER_SIZE
        )));
    }

    if let Some(granularity) = req.granularity {
        blueprint.granularity = granularity;
    }
    Ok(blueprint)
}

fn summary(session: &PlanningSession, created: bool) -> SessionResponse {
    session.read_store(|store| SessionResponse {
        session_id: session.id().to_string(),
        created,
        granularity: store.granularity(),
        employees: store.roster().iter().map(|e| e.to_string()).collect(),
        start_date: store.horizon().start(),
        horizon_days: store.horizon().len(),
        cells: store.cell_count(),
        leave_cells: store.count(WorkState::Leave),
        created_at: session.created_at(),
    })
}

/* =========================
Open a session under a new id
========================= */
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body(content = InitializeSession, content_type = "application/json"),
    responses(
        (status = 201, description = "Session opened", body = SessionResponse),
        (status = 400, description = "Invalid roster or horizon")
    ),
    tag = "Session"
)]
#[instrument(name = "create_session", skip_all)]
pub async fn create_session(
    registry: web::Data<SessionRegistry>,
    config: web::Data<Config>,
    payload: web::Json<InitializeSession>,
) -> Result<HttpResponse, AppError> {
    let blueprint = blueprint(&config, payload.into_inner())?;
    let session = registry.create(blueprint).await?;
    info!(session_id = session.id(), "Session created");
    Ok(HttpResponse::Created().json(summary(&session, true)))
}

/* =========================
Get-or-create: never resets an existing session
========================= */
#[utoipa::path(
    put,
    path = "/api/sessions/{session_id}",
    params(("session_id" = String, Path, description = "Client-chosen session id")),
    request_body(content = InitializeSession, content_type = "application/json"),
    responses(
        (status = 201, description = "Session opened", body = SessionResponse),
        (status = 200, description = "Session already existed and was left untouched", body = SessionResponse),
        (status = 400, description = "Invalid session id, roster or horizon")
    ),
    tag = "Session"
)]
#[instrument(name = "initialize_session", skip_all, fields(session_id = %session_id.as_str()))]
pub async fn initialize_session(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
    config: web::Data<Config>,
    payload: web::Json<InitializeSession>,
) -> Result<HttpResponse, AppError> {
    let blueprint = blueprint(&config, payload.into_inner())?;
    let (session, fresh) = registry
        .get_or_create(session_id.as_str(), blueprint)
        .await?;

    let status = if fresh {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok(HttpResponse::build(status).json(summary(&session, fresh)))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}",
    params(("session_id" = String, Path,)),
    responses(
        (status = 200, description = "Session summary", body = SessionResponse),
        (status = 404, description = "Unknown session")
    ),
    tag = "Session"
)]
pub async fn get_session(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
) -> Result<HttpResponse, AppError> {
    let session = session_id.resolve(&registry).await?;
    Ok(HttpResponse::Ok().json(summary(&session, false)))
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{session_id}",
    params(("session_id" = String, Path,)),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Unknown session")
    ),
    tag = "Session"
)]
pub async fn discard_session(
    session_id: SessionId,
    registry: web::Data<SessionRegistry>,
) -> Result<HttpResponse, AppError> {
    if !registry.discard(session_id.as_str()).await {
        return Err(AppError::SessionNotFound(session_id.0));
    }
    Ok(HttpResponse::NoContent().finish())
}
