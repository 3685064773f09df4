use crate::api::availability::{ToggleRequest, ToggleResponse};
use crate::api::export::{ExportRequest, ExportResponse};
use crate::api::session::{InitializeSession, SessionResponse};
use crate::availability::projection::{
    BoardCell, BoardWeek, DisplayRow, DisplayTable, Layout, Vocabulary,
};
use crate::export::ExportKind;
use crate::model::constraints::{ActivityConstraints, PlanningConstraints};
use crate::model::work_state::{Granularity, Segment, WorkState, Wording};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Planning Configuration API",
        version = "0.1.0",
        description = r#"
## Workforce planning configuration

Collects the inputs of a workforce planning run and exports them as JSON.
Nothing here schedules anyone: values are captured, validated against the
form bounds, and written out.

### 🔹 Key Features
- **Sessions**
  - One grid per session, opened once and never reset by a repeated initialize
- **Availability**
  - Employee × day (× half-day) grid of Travail / Congé
  - Single-cell toggles and all-or-nothing bulk replacement from an edited table
- **Constraints**
  - Daily staffing Min / Max per activity, max consecutive days, activities per employee
- **Export**
  - Legacy French document (`effectifs_journaliers`, `disponibilites`, ...) or English form
  - Atomic write into the export directory
"#,
    ),
    paths(
        crate::api::session::create_session,
        crate::api::session::initialize_session,
        crate::api::session::get_session,
        crate::api::session::discard_session,

        crate::api::availability::get_snapshot,
        crate::api::availability::toggle_cell,
        crate::api::availability::get_grid,
        crate::api::availability::replace_grid,
        crate::api::availability::get_board,

        crate::api::constraints::get_constraints,
        crate::api::constraints::update_constraints,

        crate::api::export::preview_export,
        crate::api::export::write_export
    ),
    components(
        schemas(
            InitializeSession,
            SessionResponse,
            ToggleRequest,
            ToggleResponse,
            DisplayTable,
            DisplayRow,
            BoardWeek,
            BoardCell,
            Layout,
            Vocabulary,
            WorkState,
            Segment,
            Granularity,
            Wording,
            PlanningConstraints,
            ActivityConstraints,
            ExportKind,
            ExportRequest,
            ExportResponse
        )
    ),
    tags(
        (name = "Session", description = "Planning session lifecycle"),
        (name = "Availability", description = "Availability grid"),
        (name = "Constraints", description = "Staffing and rotation constraints"),
        (name = "Export", description = "JSON export"),
    )
)]
pub struct ApiDoc;
