use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use uuid::Uuid;

use crate::availability::error::AvailabilityError;
use crate::availability::store::AvailabilityStore;
use crate::model::constraints::PlanningConstraints;
use crate::model::employee::Employee;
use crate::model::horizon::Horizon;
use crate::model::work_state::Granularity;

/// Everything needed to open a new planning session.
#[derive(Debug, Clone)]
pub struct SessionBlueprint {
    pub roster: Vec<Employee>,
    pub horizon: Horizon,
    pub granularity: Granularity,
    pub activities: Vec<String>,
}

/// One user's grid and constraint form. Nothing is shared between sessions.
#[derive(Debug)]
pub struct PlanningSession {
    id: String,
    created_at: DateTime<Utc>,
    store: RwLock<AvailabilityStore>,
    constraints: RwLock<PlanningConstraints>,
}

impl PlanningSession {
    pub fn open(id: &str, blueprint: SessionBlueprint) -> Result<Self, AvailabilityError> {
        let store = AvailabilityStore::initialize(
            blueprint.roster,
            blueprint.horizon,
            blueprint.granularity,
        )?;
        Ok(Self {
            id: id.to_string(),
            created_at: Utc::now(),
            store: RwLock::new(store),
            constraints: RwLock::new(PlanningConstraints::with_defaults(blueprint.activities.as_slice())),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn read_store<R>(&self, f: impl FnOnce(&AvailabilityStore) -> R) -> R {
        f(&*self.store.read().expect("availability store poisoned"))
    }

    pub fn write_store<R>(&self, f: impl FnOnce(&mut AvailabilityStore) -> R) -> R {
        f(&mut *self.store.write().expect("availability store poisoned"))
    }

    pub fn read_constraints<R>(&self, f: impl FnOnce(&PlanningConstraints) -> R) -> R {
        f(&*self.constraints.read().expect("constraints poisoned"))
    }

    pub fn write_constraints<R>(&self, f: impl FnOnce(&mut PlanningConstraints) -> R) -> R {
        f(&mut *self.constraints.write().expect("constraints poisoned"))
    }

    /// Reads the grid and the constraints as one consistent view.
    /// Lock order is store, then constraints.
    pub fn read_all<R>(&self, f: impl FnOnce(&AvailabilityStore, &PlanningConstraints) -> R) -> R {
        let store = self.store.read().expect("availability store poisoned");
        let constraints = self.constraints.read().expect("constraints poisoned");
        f(&store, &constraints)
    }
}

/// Live sessions keyed by id. Idle sessions expire, which ends them.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Cache<String, Arc<PlanningSession>>,
}

impl SessionRegistry {
    pub fn new(capacity: u64, idle: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Returns the session stored under `id`, opening it from `blueprint` only
    /// if it does not exist yet. An existing session is never reset. The flag
    /// is true when the session was opened by this call.
    pub async fn get_or_create(
        &self,
        id: &str,
        blueprint: SessionBlueprint,
    ) -> Result<(Arc<PlanningSession>, bool), AvailabilityError> {
        let entry = self
            .sessions
            .entry(id.to_string())
            .or_try_insert_with(async { PlanningSession::open(id, blueprint).map(Arc::new) })
            .await
            .map_err(|e: Arc<AvailabilityError>| (*e).clone())?;

        let fresh = entry.is_fresh();
        if fresh {
            tracing::info!(session_id = id, "Planning session opened");
        }
        Ok((entry.into_value(), fresh))
    }

    /// Opens a session under a new random id.
    pub async fn create(
        &self,
        blueprint: SessionBlueprint,
    ) -> Result<Arc<PlanningSession>, AvailabilityError> {
        let id = Uuid::new_v4().to_string();
        let (session, _) = self.get_or_create(&id, blueprint).await?;
        Ok(session)
    }

    pub async fn get(&self, id: &str) -> Option<Arc<PlanningSession>> {
        self.sessions.get(id).await
    }

    /// Ends a session. Returns false if it did not exist.
    pub async fn discard(&self, id: &str) -> bool {
        let existed = self.sessions.remove(id).await.is_some();
        if existed {
            tracing::info!(session_id = id, "Planning session discarded");
        }
        existed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::store::CellKey;
    use crate::model::work_state::{Segment, WorkState};
    use chrono::NaiveDate;

    fn blueprint() -> SessionBlueprint {
        SessionBlueprint {
            roster: Employee::roster("Employé", 3),
            horizon: Horizon::anchored(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 28)
                .unwrap(),
            granularity: Granularity::WholeDay,
            activities: vec!["Téléphone".to_string(), "Libre".to_string()],
        }
    }

    fn registry() -> SessionRegistry {
        SessionRegistry::new(100, Duration::from_secs(60))
    }

    #[actix_web::test]
    async fn get_or_create_never_resets_an_existing_session() {
        let registry = registry();
        let (session, fresh) = registry.get_or_create("alpha", blueprint()).await.unwrap();
        assert!(fresh);

        let key = CellKey::new(
            "Employé 2",
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            Segment::WholeDay,
        );
        session.write_store(|store| store.toggle(&key)).unwrap();

        let mut other = blueprint();
        other.granularity = Granularity::HalfDay;
        let (again, fresh) = registry.get_or_create("alpha", other).await.unwrap();
        assert!(!fresh);
        assert!(Arc::ptr_eq(&session, &again));
        assert_eq!(
            again.read_store(|store| store.state(&key)).unwrap(),
            WorkState::Leave
        );
        assert_eq!(again.read_store(|store| store.granularity()), Granularity::WholeDay);
    }

    #[actix_web::test]
    async fn sessions_are_isolated() {
        let registry = registry();
        let (a, _) = registry.get_or_create("a", blueprint()).await.unwrap();
        let (b, _) = registry.get_or_create("b", blueprint()).await.unwrap();

        let key = CellKey::new(
            "Employé 1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Segment::WholeDay,
        );
        a.write_store(|store| store.toggle(&key)).unwrap();

        assert_eq!(a.read_store(|s| s.count(WorkState::Leave)), 1);
        assert_eq!(b.read_store(|s| s.count(WorkState::Leave)), 0);
    }

    #[actix_web::test]
    async fn read_all_never_mixes_grid_and_constraints() {
        let registry = registry();
        let (session, _) = registry.get_or_create("pair", blueprint()).await.unwrap();
        let key = CellKey::new(
            "Employé 1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Segment::WholeDay,
        );

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..500 {
                    session.write_store(|store| {
                        let state = store.toggle(&key).unwrap();
                        session.write_constraints(|c| {
                            c.activities_per_employee = match state {
                                WorkState::Leave => 1,
                                WorkState::Working => 2,
                            };
                        });
                    });
                }
            });
            for _ in 0..500 {
                session.read_all(|store, constraints| {
                    let expected = match store.state(&key).unwrap() {
                        WorkState::Leave => 1,
                        WorkState::Working => 2,
                    };
                    assert_eq!(constraints.activities_per_employee, expected);
                });
            }
        });
    }

    #[actix_web::test]
    async fn failed_open_leaves_no_session_behind() {
        let registry = registry();
        let mut empty = blueprint();
        empty.roster.clear();
        assert_eq!(
            registry.get_or_create("bad", empty).await.unwrap_err(),
            AvailabilityError::EmptyRoster
        );
        assert!(registry.get("bad").await.is_none());
    }

    #[actix_web::test]
    async fn create_and_discard() {
        let registry = registry();
        let session = registry.create(blueprint()).await.unwrap();
        assert!(Uuid::parse_str(session.id()).is_ok());
        assert!(registry.get(session.id()).await.is_some());
        assert_eq!(
            session.read_constraints(|c| c.activities_per_employee),
            2
        );

        assert!(registry.discard(session.id()).await);
        assert!(!registry.discard(session.id()).await);
        assert!(registry.get(session.id()).await.is_none());
    }
}
