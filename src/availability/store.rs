use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::availability::error::AvailabilityError;
use crate::availability::projection::{DisplayTable, GridProjection};
use crate::availability::snapshot::{DayAvailability, EmployeeAvailability, Snapshot};
use crate::model::employee::Employee;
use crate::model::horizon::Horizon;
use crate::model::work_state::{Granularity, Segment, WorkState};

/// Address of one cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct CellKey {
    #[schema(value_type = String, example = "Employé 1")]
    pub employee: Employee,
    #[schema(value_type = String, format = "date", example = "2024-01-01")]
    pub day: NaiveDate,
    pub segment: Segment,
}

impl CellKey {
    pub fn new(employee: impl Into<Employee>, day: NaiveDate, segment: Segment) -> Self {
        Self {
            employee: employee.into(),
            day,
            segment,
        }
    }
}

/// Source of truth for the work state of every (employee, day, segment) cell.
///
/// Cells live in one dense vector laid out employee-major, then day, then
/// segment, so the cross product of roster, horizon and segments is always
/// covered exactly once.
#[derive(Debug, Clone)]
pub struct AvailabilityStore {
    roster: Vec<Employee>,
    horizon: Horizon,
    granularity: Granularity,
    employee_index: HashMap<Employee, usize>,
    day_index: HashMap<NaiveDate, usize>,
    cells: Vec<WorkState>,
}

impl AvailabilityStore {
    /// Builds a grid with every cell set to `Working`.
    pub fn initialize(
        roster: Vec<Employee>,
        horizon: Horizon,
        granularity: Granularity,
    ) -> Result<Self, AvailabilityError> {
        if roster.is_empty() {
            return Err(AvailabilityError::EmptyRoster);
        }

        let mut employee_index = HashMap::with_capacity(roster.len());
        for (i, employee) in roster.iter().enumerate() {
            if employee_index.insert(employee.clone(), i).is_some() {
                return Err(AvailabilityError::DuplicateEmployee(employee.to_string()));
            }
        }

        let day_index = horizon
            .days()
            .iter()
            .enumerate()
            .map(|(i, day)| (*day, i))
            .collect();

        let len = roster.len() * horizon.len() * granularity.segments().len();
        Ok(Self {
            roster,
            horizon,
            granularity,
            employee_index,
            day_index,
            cells: vec![WorkState::Working; len],
        })
    }

    pub fn roster(&self) -> &[Employee] {
        &self.roster
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn count(&self, state: WorkState) -> usize {
        self.cells.iter().filter(|s| **s == state).count()
    }

    pub fn employee_position(&self, employee: &str) -> Option<usize> {
        self.employee_index.get(&Employee::from(employee)).copied()
    }

    pub(crate) fn offset_of(&self, employee: usize, day: usize, segment: usize) -> usize {
        let segments = self.granularity.segments().len();
        (employee * self.horizon.len() + day) * segments + segment
    }

    pub(crate) fn state_at(&self, employee: usize, day: usize, segment: usize) -> WorkState {
        self.cells[self.offset_of(employee, day, segment)]
    }

    fn offset(&self, key: &CellKey) -> Result<usize, AvailabilityError> {
        let unknown = || AvailabilityError::UnknownCellKey {
            employee: key.employee.to_string(),
            day: key.day,
            segment: key.segment,
        };
        let employee = *self.employee_index.get(&key.employee).ok_or_else(unknown)?;
        let day = *self.day_index.get(&key.day).ok_or_else(unknown)?;
        let segment = self
            .granularity
            .segment_index(key.segment)
            .ok_or_else(unknown)?;
        Ok(self.offset_of(employee, day, segment))
    }

    pub fn state(&self, key: &CellKey) -> Result<WorkState, AvailabilityError> {
        Ok(self.cells[self.offset(key)?])
    }

    /// Flips exactly one cell and returns its new state. Unknown keys are
    /// rejected, never created.
    pub fn toggle(&mut self, key: &CellKey) -> Result<WorkState, AvailabilityError> {
        let offset = self.offset(key)?;
        let next = self.cells[offset].toggled();
        self.cells[offset] = next;
        Ok(next)
    }

    /// Overwrites the whole grid from an edited display table. The table is
    /// folded completely before anything is written, so a single bad value
    /// leaves the grid untouched.
    pub fn bulk_replace(&mut self, edits: &DisplayTable) -> Result<(), AvailabilityError> {
        let cells = GridProjection::for_table(edits).fold(self, edits)?;
        debug_assert_eq!(cells.len(), self.cells.len());
        self.cells = cells;
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let employees = self
            .roster
            .iter()
            .enumerate()
            .map(|(e, employee)| EmployeeAvailability {
                employee: employee.clone(),
                days: self
                    .horizon
                    .days()
                    .iter()
                    .enumerate()
                    .map(|(d, day)| (*day, self.day_entry(e, d)))
                    .collect(),
            })
            .collect();
        Snapshot::new(self.granularity, employees)
    }

    fn day_entry(&self, employee: usize, day: usize) -> DayAvailability {
        match self.granularity {
            Granularity::WholeDay => DayAvailability::WholeDay(self.state_at(employee, day, 0)),
            Granularity::HalfDay => DayAvailability::HalfDay {
                morning: self.state_at(employee, day, 0),
                afternoon: self.state_at(employee, day, 1),
            },
        }
    }
}
