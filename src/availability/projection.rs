use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::availability::error::AvailabilityError;
use crate::availability::store::AvailabilityStore;
use crate::model::horizon::day_label;
use crate::model::work_state::{Segment, WorkState, Wording};

/// Which axis becomes the table rows.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Layout {
    /// One row per employee, one column per day (and half-day).
    #[default]
    EmployeeMajor,
    /// One row per day, one column per employee (and half-day).
    DayMajor,
}

/// Markers shown to the user for the two work states.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Vocabulary {
    /// `✅` / `❌`
    #[default]
    Glyph,
    /// `Travail` / `Congé`
    Label,
}

impl Vocabulary {
    pub fn marker(self, state: WorkState) -> &'static str {
        match (self, state) {
            (Vocabulary::Glyph, WorkState::Working) => "✅",
            (Vocabulary::Glyph, WorkState::Leave) => "❌",
            (Vocabulary::Label, state) => Wording::Legacy.state(state),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DisplayRow {
    #[schema(example = "Employé 1")]
    pub label: String,
    #[schema(example = json!(["✅", "❌"]))]
    pub cells: Vec<String>,
}

/// Display-oriented copy of the grid handed to the form layer, and the shape
/// expected back for a bulk edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DisplayTable {
    pub layout: Layout,
    pub vocabulary: Vocabulary,
    #[schema(example = json!(["Mon 01/01", "Tue 02/01"]))]
    pub columns: Vec<String>,
    pub rows: Vec<DisplayRow>,
}

/// One button of the clickable weekly board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BoardCell {
    #[schema(value_type = String, format = "date", example = "2024-01-01")]
    pub day: NaiveDate,
    pub segment: Segment,
    pub state: WorkState,
    #[schema(example = "✅ Mon 01/01")]
    pub label: String,
    #[schema(example = "green")]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BoardWeek {
    pub cells: Vec<BoardCell>,
}

/// Translation between work states and what the user sees. Never holds state
/// of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridProjection {
    pub layout: Layout,
    pub vocabulary: Vocabulary,
}

fn segment_suffix(segment: Segment) -> String {
    match segment {
        Segment::WholeDay => String::new(),
        half => format!(" - {}", Wording::Legacy.segment(half)),
    }
}

fn state_color(state: WorkState) -> &'static str {
    match state {
        WorkState::Working => "green",
        WorkState::Leave => "red",
    }
}

impl GridProjection {
    pub fn new(layout: Layout, vocabulary: Vocabulary) -> Self {
        Self { layout, vocabulary }
    }

    pub fn for_table(table: &DisplayTable) -> Self {
        Self::new(table.layout, table.vocabulary)
    }

    pub fn project_state(&self, state: WorkState) -> &'static str {
        self.vocabulary.marker(state)
    }

    pub fn reverse_project(&self, value: &str) -> Result<WorkState, AvailabilityError> {
        if value == self.vocabulary.marker(WorkState::Working) {
            Ok(WorkState::Working)
        } else if value == self.vocabulary.marker(WorkState::Leave) {
            Ok(WorkState::Leave)
        } else {
            Err(AvailabilityError::InvalidDisplayValue(value.to_string()))
        }
    }

    fn row_labels(&self, store: &AvailabilityStore) -> Vec<String> {
        match self.layout {
            Layout::EmployeeMajor => store.roster().iter().map(|e| e.to_string()).collect(),
            Layout::DayMajor => store.horizon().days().iter().map(|d| day_label(*d)).collect(),
        }
    }

    fn column_labels(&self, store: &AvailabilityStore) -> Vec<String> {
        let segments = store.granularity().segments();
        let heads: Vec<String> = match self.layout {
            Layout::EmployeeMajor => store.horizon().days().iter().map(|d| day_label(*d)).collect(),
            Layout::DayMajor => store.roster().iter().map(|e| e.to_string()).collect(),
        };
        heads
            .iter()
            .flat_map(|head| {
                segments
                    .iter()
                    .map(move |segment| format!("{}{}", head, segment_suffix(*segment)))
            })
            .collect()
    }

    /// Dense store offset of the cell shown at (`row`, `column`).
    fn offset(&self, store: &AvailabilityStore, row: usize, column: usize) -> usize {
        let segments = store.granularity().segments().len();
        let (major, segment) = (column / segments, column % segments);
        match self.layout {
            Layout::EmployeeMajor => store.offset_of(row, major, segment),
            Layout::DayMajor => store.offset_of(major, row, segment),
        }
    }

    fn state_shown_at(&self, store: &AvailabilityStore, row: usize, column: usize) -> WorkState {
        let segments = store.granularity().segments().len();
        let (major, segment) = (column / segments, column % segments);
        match self.layout {
            Layout::EmployeeMajor => store.state_at(row, major, segment),
            Layout::DayMajor => store.state_at(major, row, segment),
        }
    }

    pub fn project(&self, store: &AvailabilityStore) -> DisplayTable {
        let columns = self.column_labels(store);
        let rows = self
            .row_labels(store)
            .into_iter()
            .enumerate()
            .map(|(r, label)| DisplayRow {
                label,
                cells: (0..columns.len())
                    .map(|c| self.project_state(self.state_shown_at(store, r, c)).to_string())
                    .collect(),
            })
            .collect();

        DisplayTable {
            layout: self.layout,
            vocabulary: self.vocabulary,
            columns,
            rows,
        }
    }

    /// Folds an edited table back into a full dense cell vector for `store`.
    /// The table must have exactly the headers `project` would produce.
    pub(crate) fn fold(
        &self,
        store: &AvailabilityStore,
        table: &DisplayTable,
    ) -> Result<Vec<WorkState>, AvailabilityError> {
        let columns = self.column_labels(store);
        if table.columns != columns {
            return Err(AvailabilityError::ShapeMismatch(format!(
                "expected {} columns starting with {:?}",
                columns.len(),
                columns.first()
            )));
        }

        let rows = self.row_labels(store);
        if table.rows.len() != rows.len() {
            return Err(AvailabilityError::ShapeMismatch(format!(
                "expected {} rows, got {}",
                rows.len(),
                table.rows.len()
            )));
        }

        let mut cells = vec![WorkState::Working; store.cell_count()];
        for (r, (row, expected)) in table.rows.iter().zip(&rows).enumerate() {
            if &row.label != expected {
                return Err(AvailabilityError::ShapeMismatch(format!(
                    "row {} is labelled '{}', expected '{}'",
                    r, row.label, expected
                )));
            }
            if row.cells.len() != columns.len() {
                return Err(AvailabilityError::ShapeMismatch(format!(
                    "row '{}' has {} cells, expected {}",
                    row.label,
                    row.cells.len(),
                    columns.len()
                )));
            }
            for (c, value) in row.cells.iter().enumerate() {
                cells[self.offset(store, r, c)] = self.reverse_project(value)?;
            }
        }
        Ok(cells)
    }

    /// Weekly rows of clickable cells for one employee, seven days per row
    /// from the first day of the horizon.
    pub fn board(
        &self,
        store: &AvailabilityStore,
        employee: &str,
    ) -> Result<Vec<BoardWeek>, AvailabilityError> {
        let e = store
            .employee_position(employee)
            .ok_or_else(|| AvailabilityError::UnknownEmployee(employee.to_string()))?;
        let segments = store.granularity().segments();

        let mut day_offset = 0;
        let mut weeks = Vec::new();
        for week in store.horizon().weeks() {
            let mut cells = Vec::with_capacity(week.len() * segments.len());
            for (i, day) in week.iter().enumerate() {
                for (s, segment) in segments.iter().enumerate() {
                    let state = store.state_at(e, day_offset + i, s);
                    cells.push(BoardCell {
                        day: *day,
                        segment: *segment,
                        state,
                        label: format!(
                            "{} {}{}",
                            self.project_state(state),
                            day_label(*day),
                            segment_suffix(*segment)
                        ),
                        color: state_color(state).to_string(),
                    });
                }
            }
            day_offset += week.len();
            weeks.push(BoardWeek { cells });
        }
        Ok(weeks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::store::CellKey;
    use crate::model::employee::Employee;
    use crate::model::horizon::Horizon;
    use crate::model::work_state::Granularity;
    use strum::IntoEnumIterator;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn store(granularity: Granularity, days: usize) -> AvailabilityStore {
        AvailabilityStore::initialize(
            vec![Employee::from("E1"), Employee::from("E2")],
            Horizon::anchored(date(1), days).unwrap(),
            granularity,
        )
        .unwrap()
    }

    #[test]
    fn reverse_project_inverts_project() {
        for vocabulary in [Vocabulary::Glyph, Vocabulary::Label] {
            let projection = GridProjection::new(Layout::EmployeeMajor, vocabulary);
            for state in WorkState::iter() {
                let shown = projection.project_state(state);
                assert_eq!(projection.reverse_project(shown).unwrap(), state);
            }
        }
    }

    #[test]
    fn reverse_project_rejects_foreign_markers() {
        let glyph = GridProjection::new(Layout::EmployeeMajor, Vocabulary::Glyph);
        for value in ["Travail", "", "✅ ", "🟩"] {
            assert!(matches!(
                glyph.reverse_project(value),
                Err(AvailabilityError::InvalidDisplayValue(_))
            ));
        }
        let label = GridProjection::new(Layout::EmployeeMajor, Vocabulary::Label);
        assert!(label.reverse_project("✅").is_err());
        assert_eq!(label.reverse_project("Congé").unwrap(), WorkState::Leave);
    }

    #[test]
    fn default_projection_is_employee_rows_with_glyphs() {
        assert_eq!(Layout::default(), Layout::EmployeeMajor);
        assert_eq!(Vocabulary::default(), Vocabulary::Glyph);
    }

    #[test]
    fn employee_major_half_day_headers() {
        let mut store = store(Granularity::HalfDay, 2);
        store
            .toggle(&CellKey::new("E2", date(2), Segment::Morning))
            .unwrap();

        let table = GridProjection::default().project(&store);
        assert_eq!(
            table.columns,
            vec![
                "Mon 01/01 - Matin",
                "Mon 01/01 - Après-midi",
                "Tue 02/01 - Matin",
                "Tue 02/01 - Après-midi"
            ]
        );
        assert_eq!(table.rows[0].label, "E1");
        assert_eq!(table.rows[1].cells, vec!["✅", "✅", "❌", "✅"]);
    }

    #[test]
    fn day_major_transposes_the_grid() {
        let mut store = store(Granularity::WholeDay, 3);
        store
            .toggle(&CellKey::new("E1", date(3), Segment::WholeDay))
            .unwrap();

        let table = GridProjection::new(Layout::DayMajor, Vocabulary::Label).project(&store);
        assert_eq!(table.columns, vec!["E1", "E2"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2].label, "Wed 03/01");
        assert_eq!(table.rows[2].cells, vec!["Congé", "Travail"]);
    }

    #[test]
    fn fold_round_trips_every_layout() {
        let mut store = store(Granularity::HalfDay, 4);
        store
            .toggle(&CellKey::new("E1", date(4), Segment::Afternoon))
            .unwrap();
        store
            .toggle(&CellKey::new("E2", date(1), Segment::Morning))
            .unwrap();
        let before = store.snapshot();

        for layout in [Layout::EmployeeMajor, Layout::DayMajor] {
            let projection = GridProjection::new(layout, Vocabulary::Glyph);
            let table = projection.project(&store);
            store.bulk_replace(&table).unwrap();
            assert_eq!(store.snapshot(), before);
        }
    }

    #[test]
    fn fold_rejects_mismatched_shapes() {
        let store = store(Granularity::WholeDay, 2);
        let projection = GridProjection::default();

        let mut missing_row = projection.project(&store);
        missing_row.rows.pop();
        assert!(matches!(
            projection.fold(&store, &missing_row),
            Err(AvailabilityError::ShapeMismatch(_))
        ));

        let mut renamed = projection.project(&store);
        renamed.rows[0].label = "E3".to_string();
        assert!(matches!(
            projection.fold(&store, &renamed),
            Err(AvailabilityError::ShapeMismatch(_))
        ));

        let mut short = projection.project(&store);
        short.rows[1].cells.pop();
        assert!(matches!(
            projection.fold(&store, &short),
            Err(AvailabilityError::ShapeMismatch(_))
        ));

        let day_major = GridProjection::new(Layout::DayMajor, Vocabulary::Glyph);
        assert!(matches!(
            day_major.fold(&store, &projection.project(&store)),
            Err(AvailabilityError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn board_rows_hold_seven_days() {
        let mut store = store(Granularity::WholeDay, 10);
        store
            .toggle(&CellKey::new("E2", date(8), Segment::WholeDay))
            .unwrap();

        let board = GridProjection::default().board(&store, "E2").unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].cells.len(), 7);
        assert_eq!(board[1].cells.len(), 3);

        let first_of_second_week = &board[1].cells[0];
        assert_eq!(first_of_second_week.day, date(8));
        assert_eq!(first_of_second_week.state, WorkState::Leave);
        assert_eq!(first_of_second_week.label, "❌ Mon 08/01");
        assert_eq!(first_of_second_week.color, "red");

        assert!(matches!(
            GridProjection::default().board(&store, "E7"),
            Err(AvailabilityError::UnknownEmployee(_))
        ));
    }
}
