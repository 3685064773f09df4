//! JSON export of a planning session.
//!
//! The legacy document shape is consumed by existing planning tools and its
//! keys and values must not change:
//!
//! ```text
//! {
//!     "effectifs_journaliers": { <activité>: { "Min": [7], "Max": [7] } },
//!     "jours_consecutifs_max": { <activité>: 1..=14 },
//!     "activites_par_employe": 1..=N,
//!     "disponibilites": { <employé>: { <AAAA-MM-JJ>: "Travail" | "Congé" } }
//! }
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::availability::snapshot::Snapshot;
use crate::model::constraints::{ActivityConstraints, PlanningConstraints};
use crate::model::work_state::{Granularity, Wording};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExportKind {
    /// Constraints and availability.
    #[default]
    Full,
    /// Only the availability grid.
    AvailabilityOnly,
}

impl ExportKind {
    pub fn default_file_name(self, granularity: Granularity) -> &'static str {
        match (self, granularity) {
            (ExportKind::Full, _) => "parametres_planning.json",
            (ExportKind::AvailabilityOnly, Granularity::WholeDay) => "disponibilites.json",
            (ExportKind::AvailabilityOnly, Granularity::HalfDay) => {
                "disponibilites_demi_journee.json"
            }
        }
    }
}

struct DocumentKeys {
    staffing: &'static str,
    consecutive: &'static str,
    per_employee: &'static str,
    availability: &'static str,
    min: &'static str,
    max: &'static str,
}

fn keys(wording: Wording) -> DocumentKeys {
    match wording {
        Wording::Legacy => DocumentKeys {
            staffing: "effectifs_journaliers",
            consecutive: "jours_consecutifs_max",
            per_employee: "activites_par_employe",
            availability: "disponibilites",
            min: "Min",
            max: "Max",
        },
        Wording::Canonical => DocumentKeys {
            staffing: "daily_staffing",
            consecutive: "max_consecutive_days",
            per_employee: "activities_per_employee",
            availability: "availability",
            min: "min",
            max: "max",
        },
    }
}

/// Serializable view over a session's constraints and availability.
pub struct ExportDocument<'a> {
    pub constraints: &'a PlanningConstraints,
    pub snapshot: &'a Snapshot,
    pub wording: Wording,
    pub kind: ExportKind,
}

impl ExportDocument<'_> {
    /// Four-space indented UTF-8, non-ASCII characters left as is.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

impl Serialize for ExportDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let availability = self.snapshot.worded(self.wording);
        if self.kind == ExportKind::AvailabilityOnly {
            return availability.serialize(serializer);
        }

        let keys = keys(self.wording);
        let activities = &self.constraints.activities;
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(
            keys.staffing,
            &Staffing {
                activities,
                keys: &keys,
            },
        )?;
        map.serialize_entry(keys.consecutive, &Consecutive { activities })?;
        map.serialize_entry(keys.per_employee, &self.constraints.activities_per_employee)?;
        map.serialize_entry(keys.availability, &availability)?;
        map.end()
    }
}

struct Staffing<'a> {
    activities: &'a [ActivityConstraints],
    keys: &'a DocumentKeys,
}

impl Serialize for Staffing<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.activities.iter().map(|a| {
            (
                a.activity.as_str(),
                Bounds {
                    activity: a,
                    keys: self.keys,
                },
            )
        }))
    }
}

struct Bounds<'a> {
    activity: &'a ActivityConstraints,
    keys: &'a DocumentKeys,
}

impl Serialize for Bounds<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.keys.min, &self.activity.min)?;
        map.serialize_entry(self.keys.max, &self.activity.max)?;
        map.end()
    }
}

struct Consecutive<'a> {
    activities: &'a [ActivityConstraints],
}

impl Serialize for Consecutive<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.activities
                .iter()
                .map(|a| (a.activity.as_str(), a.max_consecutive_days)),
        )
    }
}

/// Writes export files into a single directory without ever leaving a
/// truncated file behind.
#[derive(Debug, Clone)]
pub struct ExportWriter {
    dir: PathBuf,
}

impl ExportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` to a temporary file next to the target, syncs it and
    /// renames it over `file_name`. On failure the previous file is intact.
    pub fn write(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
        validate_file_name(file_name)?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating export directory {}", self.dir.display()))?;

        let target = self.dir.join(file_name);
        let temp = self
            .dir
            .join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let written = write_and_rename(&temp, &target, bytes);
        if written.is_err() {
            let _ = fs::remove_file(&temp);
        }
        written.with_context(|| format!("writing {}", target.display()))?;

        tracing::info!(path = %target.display(), bytes = bytes.len(), "Export written");
        Ok(target)
    }
}

fn write_and_rename(temp: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(temp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp, target)
}

pub fn validate_file_name(file_name: &str) -> anyhow::Result<()> {
    if file_name.is_empty()
        || file_name.starts_with('.')
        || file_name.contains(['/', '\\'])
        || file_name.contains("..")
    {
        bail!("invalid export file name '{}'", file_name);
    }
    if !file_name.ends_with(".json") {
        bail!("export file name '{}' must end with .json", file_name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::store::{AvailabilityStore, CellKey};
    use crate::model::employee::Employee;
    use crate::model::horizon::Horizon;
    use crate::model::work_state::Segment;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn store(granularity: Granularity) -> AvailabilityStore {
        AvailabilityStore::initialize(
            vec![Employee::from("E1"), Employee::from("E2")],
            Horizon::from_days(vec![date(1), date(2)]).unwrap(),
            granularity,
        )
        .unwrap()
    }

    #[test]
    fn legacy_document_matches_the_planning_tools() {
        let mut store = store(Granularity::WholeDay);
        store
            .toggle(&CellKey::new("E1", date(1), Segment::WholeDay))
            .unwrap();
        let snapshot = store.snapshot();
        let constraints = PlanningConstraints::with_defaults(&["Téléphone", "Libre"]);

        let doc = ExportDocument {
            constraints: &constraints,
            snapshot: &snapshot,
            wording: Wording::Legacy,
            kind: ExportKind::Full,
        };
        let json: serde_json::Value = serde_json::from_slice(&doc.to_pretty_json().unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "effectifs_journaliers": {
                    "Téléphone": {"Min": [1, 1, 1, 1, 1, 1, 1], "Max": [5, 5, 5, 5, 5, 5, 5]},
                    "Libre": {"Min": [1, 1, 1, 1, 1, 1, 1], "Max": [5, 5, 5, 5, 5, 5, 5]}
                },
                "jours_consecutifs_max": {"Téléphone": 5, "Libre": 5},
                "activites_par_employe": 2,
                "disponibilites": {
                    "E1": {"2024-01-01": "Congé", "2024-01-02": "Travail"},
                    "E2": {"2024-01-01": "Travail", "2024-01-02": "Travail"}
                }
            })
        );
    }

    #[test]
    fn pretty_output_keeps_accents_and_key_order() {
        let snapshot = store(Granularity::HalfDay).snapshot();
        let constraints = PlanningConstraints::default();
        let doc = ExportDocument {
            constraints: &constraints,
            snapshot: &snapshot,
            wording: Wording::Legacy,
            kind: ExportKind::Full,
        };
        let text = String::from_utf8(doc.to_pretty_json().unwrap()).unwrap();

        assert!(text.starts_with("{\n    \"effectifs_journaliers\""));
        assert!(text.contains("\"Après-midi\": \"Travail\""));
        assert!(text.contains("\"Téléphone\""));
        assert!(!text.contains("\\u00e9"));
        let staffing = text.find("effectifs_journaliers").unwrap();
        let availability = text.find("disponibilites").unwrap();
        assert!(staffing < availability);
    }

    #[test]
    fn canonical_and_availability_only_forms() {
        let snapshot = store(Granularity::WholeDay).snapshot();
        let constraints = PlanningConstraints::with_defaults(&["A"]);

        let canonical = serde_json::to_value(ExportDocument {
            constraints: &constraints,
            snapshot: &snapshot,
            wording: Wording::Canonical,
            kind: ExportKind::Full,
        })
        .unwrap();
        assert_eq!(canonical["daily_staffing"]["A"]["min"][0], 1);
        assert_eq!(canonical["max_consecutive_days"]["A"], 5);
        assert_eq!(canonical["activities_per_employee"], 1);
        assert_eq!(canonical["availability"]["E2"]["2024-01-02"], "Working");

        let only = serde_json::to_value(ExportDocument {
            constraints: &constraints,
            snapshot: &snapshot,
            wording: Wording::Legacy,
            kind: ExportKind::AvailabilityOnly,
        })
        .unwrap();
        assert_eq!(only["E1"]["2024-01-01"], "Travail");
        assert!(only.get("disponibilites").is_none());
    }

    #[test]
    fn default_file_names() {
        assert_eq!(ExportKind::default(), ExportKind::Full);
        assert_eq!(
            ExportKind::Full.default_file_name(Granularity::HalfDay),
            "parametres_planning.json"
        );
        assert_eq!(
            ExportKind::AvailabilityOnly.default_file_name(Granularity::HalfDay),
            "disponibilites_demi_journee.json"
        );
    }

    #[test]
    fn write_replaces_the_previous_export() {
        let dir = TempDir::new().unwrap();
        let writer = ExportWriter::new(dir.path().join("exports"));

        let path = writer.write("parametres_planning.json", b"{\"v\": 1}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"v\": 1}");

        writer.write("parametres_planning.json", b"{\"v\": 2}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"v\": 2}");

        let leftovers: Vec<_> = fs::read_dir(writer.dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn failed_write_cleans_up_and_keeps_the_target() {
        let dir = TempDir::new().unwrap();
        let writer = ExportWriter::new(dir.path());

        // a non-empty directory in the way makes the final rename fail
        let blocked = dir.path().join("blocked.json");
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("keep"), b"x").unwrap();

        assert!(writer.write("blocked.json", b"{}").is_err());
        assert_eq!(fs::read(blocked.join("keep")).unwrap(), b"x");

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["blocked.json".to_string()]);
    }

    #[test]
    fn rejects_unsafe_file_names() {
        let dir = TempDir::new().unwrap();
        let writer = ExportWriter::new(dir.path());
        for name in ["", "../x.json", "a/b.json", ".hidden.json", "plan.txt"] {
            assert!(writer.write(name, b"{}").is_err(), "{} accepted", name);
        }
    }
}
