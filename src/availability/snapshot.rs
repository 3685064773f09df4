use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::model::employee::Employee;
use crate::model::work_state::{Granularity, Segment, WorkState, Wording};

/// State of one employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayAvailability {
    WholeDay(WorkState),
    HalfDay {
        morning: WorkState,
        afternoon: WorkState,
    },
}

impl DayAvailability {
    pub fn get(&self, segment: Segment) -> Option<WorkState> {
        match (self, segment) {
            (DayAvailability::WholeDay(state), Segment::WholeDay) => Some(*state),
            (DayAvailability::HalfDay { morning, .. }, Segment::Morning) => Some(*morning),
            (DayAvailability::HalfDay { afternoon, .. }, Segment::Afternoon) => Some(*afternoon),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, segment: Segment) -> Option<&mut WorkState> {
        match (self, segment) {
            (DayAvailability::WholeDay(state), Segment::WholeDay) => Some(state),
            (DayAvailability::HalfDay { morning, .. }, Segment::Morning) => Some(morning),
            (DayAvailability::HalfDay { afternoon, .. }, Segment::Afternoon) => Some(afternoon),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeAvailability {
    pub employee: Employee,
    pub days: Vec<(NaiveDate, DayAvailability)>,
}

/// Owned copy of the grid, in roster then horizon order.
///
/// Serializes as `employee -> ISO date -> state` (or `-> segment -> state` for
/// half-day grids). The plain `Serialize` impl uses canonical wording; use
/// [`Snapshot::worded`] for the legacy strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    granularity: Granularity,
    employees: Vec<EmployeeAvailability>,
}

impl Snapshot {
    pub(crate) fn new(granularity: Granularity, employees: Vec<EmployeeAvailability>) -> Self {
        Self {
            granularity,
            employees,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    fn day(&self, employee: &str, day: NaiveDate) -> Option<&DayAvailability> {
        self.employees
            .iter()
            .find(|e| e.employee.as_str() == employee)?
            .days
            .iter()
            .find(|(d, _)| *d == day)
            .map(|(_, a)| a)
    }

    pub fn get(&self, employee: &str, day: NaiveDate, segment: Segment) -> Option<WorkState> {
        self.day(employee, day)?.get(segment)
    }

    pub fn get_mut(
        &mut self,
        employee: &str,
        day: NaiveDate,
        segment: Segment,
    ) -> Option<&mut WorkState> {
        self.employees
            .iter_mut()
            .find(|e| e.employee.as_str() == employee)?
            .days
            .iter_mut()
            .find(|(d, _)| *d == day)?
            .1
            .get_mut(segment)
    }

    pub fn worded(&self, wording: Wording) -> WordedSnapshot<'_> {
        WordedSnapshot {
            snapshot: self,
            wording,
        }
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.worded(Wording::Canonical).serialize(serializer)
    }
}

/// Borrowed view serializing a snapshot with a chosen vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct WordedSnapshot<'a> {
    snapshot: &'a Snapshot,
    wording: Wording,
}

impl Serialize for WordedSnapshot<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.snapshot.employees.iter().map(|e| {
            (
                e.employee.as_str(),
                WordedDays {
                    days: &e.days,
                    wording: self.wording,
                },
            )
        }))
    }
}

struct WordedDays<'a> {
    days: &'a [(NaiveDate, DayAvailability)],
    wording: Wording,
}

impl Serialize for WordedDays<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.days.iter().map(|(day, availability)| {
            (
                day.format("%Y-%m-%d").to_string(),
                WordedDay {
                    day: availability,
                    wording: self.wording,
                },
            )
        }))
    }
}

struct WordedDay<'a> {
    day: &'a DayAvailability,
    wording: Wording,
}

impl Serialize for WordedDay<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.day {
            DayAvailability::WholeDay(state) => serializer.serialize_str(self.wording.state(*state)),
            DayAvailability::HalfDay { morning, afternoon } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(
                    self.wording.segment(Segment::Morning),
                    self.wording.state(*morning),
                )?;
                map.serialize_entry(
                    self.wording.segment(Segment::Afternoon),
                    self.wording.state(*afternoon),
                )?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn half_day_snapshot() -> Snapshot {
        Snapshot::new(
            Granularity::HalfDay,
            vec![
                EmployeeAvailability {
                    employee: Employee::from("Employé 10"),
                    days: vec![(
                        date(1),
                        DayAvailability::HalfDay {
                            morning: WorkState::Working,
                            afternoon: WorkState::Leave,
                        },
                    )],
                },
                EmployeeAvailability {
                    employee: Employee::from("Employé 2"),
                    days: vec![(
                        date(1),
                        DayAvailability::HalfDay {
                            morning: WorkState::Working,
                            afternoon: WorkState::Working,
                        },
                    )],
                },
            ],
        )
    }

    #[test]
    fn legacy_half_day_shape() {
        let json = serde_json::to_value(half_day_snapshot().worded(Wording::Legacy)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Employé 10": {"2024-03-01": {"Matin": "Travail", "Après-midi": "Congé"}},
                "Employé 2": {"2024-03-01": {"Matin": "Travail", "Après-midi": "Travail"}}
            })
        );
    }

    #[test]
    fn keeps_roster_order_when_streamed() {
        let text = serde_json::to_string(&half_day_snapshot()).unwrap();
        let ten = text.find("Employé 10").unwrap();
        let two = text.find("Employé 2\"").unwrap();
        assert!(ten < two);
        assert!(text.contains("\"Morning\":\"Working\",\"Afternoon\":\"Leave\""));
    }

    #[test]
    fn segment_lookup_respects_granularity() {
        let snapshot = half_day_snapshot();
        assert_eq!(
            snapshot.get("Employé 10", date(1), Segment::Afternoon),
            Some(WorkState::Leave)
        );
        assert_eq!(snapshot.get("Employé 10", date(1), Segment::WholeDay), None);
        assert_eq!(snapshot.get("Employé 3", date(1), Segment::Morning), None);
    }
}
