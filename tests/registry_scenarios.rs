//! Integration tests for the personnel registry
//!
//! These tests drive the registry end to end against the in-memory and
//! JSON file stores: league administration, removals, date validation,
//! persistence failures and reloading by identity.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;

use personnel::auth::password::{MAX_PASSWORD_BYTES, MIN_COST};
use personnel::domain::employee::{Employee, EmployeeDraft, EmployeeId, NewEmployee};
use personnel::domain::league::{League, LeagueId};
use personnel::domain::repositories::{EmployeeRepository, LeagueRepository, PersonnelStore};
use personnel::domain::{DateRangeError, PersistenceError, PersonnelError, PersonnelRegistry};
use personnel::infrastructure::repositories::{InMemoryRepository, JsonFileRepository};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn registry_on(store: Arc<dyn PersonnelStore>) -> PersonnelRegistry {
    PersonnelRegistry::new(store).with_hash_cost(MIN_COST)
}

/// Registry with a root and a "Judo" league
async fn judo_registry() -> (PersonnelRegistry, Arc<InMemoryRepository>, EmployeeId, LeagueId) {
    let store = Arc::new(InMemoryRepository::new());
    let mut registry = registry_on(store.clone());

    let root = registry
        .create_root(NewEmployee::new("Root", "Root", "root@m2l.fr", "toor"))
        .await
        .expect("Failed to create root");
    let judo = registry
        .create_league("Judo")
        .await
        .expect("Failed to create league");

    (registry, store, root, judo)
}

fn jean() -> NewEmployee {
    NewEmployee::new("Dupont", "Jean", "jean@judo.fr", "judoka")
}

/// In-memory store that accepts every write except employee deletion
#[derive(Default)]
struct DeleteRefusingStore {
    inner: InMemoryRepository,
}

fn refused() -> PersistenceError {
    PersistenceError::SaveImpossible("deletion refused".to_string())
}

#[async_trait]
impl EmployeeRepository for DeleteRefusingStore {
    async fn insert_employee(&self, employee: &EmployeeDraft) -> Result<EmployeeId, PersistenceError> {
        self.inner.insert_employee(employee).await
    }

    async fn update_employee(&self, employee: &Employee) -> Result<(), PersistenceError> {
        self.inner.update_employee(employee).await
    }

    async fn delete_employee(&self, _id: EmployeeId) -> Result<(), PersistenceError> {
        Err(refused())
    }

    async fn remove_employee(
        &self,
        _id: EmployeeId,
        _handover: Option<&League>,
    ) -> Result<(), PersistenceError> {
        Err(refused())
    }

    async fn find_employee(&self, id: EmployeeId) -> Result<Option<Employee>, PersistenceError> {
        self.inner.find_employee(id).await
    }

    async fn find_all_employees(&self) -> Result<Vec<Employee>, PersistenceError> {
        self.inner.find_all_employees().await
    }
}

#[async_trait]
impl LeagueRepository for DeleteRefusingStore {
    async fn insert_league(&self, name: &str) -> Result<LeagueId, PersistenceError> {
        self.inner.insert_league(name).await
    }

    async fn update_league(&self, league: &League) -> Result<(), PersistenceError> {
        self.inner.update_league(league).await
    }

    async fn delete_league(&self, id: LeagueId) -> Result<(), PersistenceError> {
        self.inner.delete_league(id).await
    }

    async fn find_league(&self, id: LeagueId) -> Result<Option<League>, PersistenceError> {
        self.inner.find_league(id).await
    }

    async fn find_all_leagues(&self) -> Result<Vec<League>, PersistenceError> {
        self.inner.find_all_leagues().await
    }
}

/// Writes a hand-made roster document and loads a registry from it
async fn load_roster(path: &Path, roster: &str) -> Result<PersonnelRegistry, PersonnelError> {
    std::fs::write(path, roster).unwrap();
    let store = JsonFileRepository::open(path).await?;
    PersonnelRegistry::load(Arc::new(store)).await
}

#[tokio::test]
async fn test_removing_administrator_hands_league_to_root() {
    let (mut registry, _store, root, judo) = judo_registry().await;

    let jean = registry.add_employee(judo, jean()).await.unwrap();
    registry.set_administrator(judo, jean).await.unwrap();
    assert!(registry
        .employee(jean)
        .unwrap()
        .is_administrator(registry.league(judo).unwrap()));

    registry.remove_employee(jean).await.unwrap();

    let league = registry.league(judo).unwrap();
    assert_eq!(league.administrator(), Some(root));
    assert!(!league.contains(jean));
    assert!(registry.employee(jean).is_none());
    assert!(registry.root().unwrap().is_administrator(league));
}

#[tokio::test]
async fn test_removing_root_is_refused_and_changes_nothing() {
    let (mut registry, store, root, judo) = judo_registry().await;
    registry.add_employee(judo, jean()).await.unwrap();
    registry.set_administrator(judo, root).await.unwrap();

    let result = registry.remove_employee(root).await;

    assert!(matches!(result, Err(PersonnelError::CannotRemoveRoot)));
    assert_eq!(registry.root().map(|e| e.id()), Some(root));
    assert_eq!(registry.employees().len(), 2);
    assert_eq!(registry.league(judo).unwrap().administrator(), Some(root));
    assert!(store.find_employee(root).await.unwrap().is_some());
}

#[tokio::test]
async fn test_exactly_one_root_per_registry() {
    let (mut registry, _store, root, judo) = judo_registry().await;
    let jean = registry.add_employee(judo, jean()).await.unwrap();

    let second = registry
        .create_root(NewEmployee::new("Other", "Root", "", "x"))
        .await;
    assert!(matches!(second, Err(PersonnelError::RootAlreadyExists)));

    let roots: Vec<EmployeeId> = registry
        .employees()
        .into_iter()
        .filter(|e| registry.is_root(e))
        .map(|e| e.id())
        .collect();
    assert_eq!(roots, vec![root]);
    assert!(!registry.is_root(registry.employee(jean).unwrap()));
    assert!(registry.root().unwrap().league().is_none());
}

#[tokio::test]
async fn test_administrator_must_be_member_or_root() {
    let (mut registry, _store, root, judo) = judo_registry().await;
    let escrime = registry.create_league("Escrime").await.unwrap();
    let jean = registry.add_employee(judo, jean()).await.unwrap();

    let result = registry.set_administrator(escrime, jean).await;
    assert!(matches!(
        result,
        Err(PersonnelError::NotAMember { employee, league }) if employee == jean && league == escrime
    ));
    assert_eq!(registry.league(escrime).unwrap().administrator(), None);

    registry.set_administrator(escrime, root).await.unwrap();
    assert_eq!(
        registry.league_administrator(escrime).map(|e| e.id()),
        Some(root)
    );
}

#[tokio::test]
async fn test_administrator_is_member_after_every_mutation() {
    let (mut registry, _store, root, judo) = judo_registry().await;
    let jean = registry.add_employee(judo, jean()).await.unwrap();
    let marie = registry
        .add_employee(judo, NewEmployee::new("Curie", "Marie", "marie@judo.fr", "pw"))
        .await
        .unwrap();

    let check = |registry: &PersonnelRegistry| {
        for league in registry.leagues() {
            if let Some(admin) = league.administrator() {
                assert!(league.contains(admin) || admin == root);
            }
        }
    };

    registry.set_administrator(judo, jean).await.unwrap();
    check(&registry);
    registry.set_administrator(judo, marie).await.unwrap();
    check(&registry);
    registry.remove_employee(jean).await.unwrap();
    check(&registry);
    assert_eq!(registry.league(judo).unwrap().administrator(), Some(marie));
    registry.remove_employee(marie).await.unwrap();
    check(&registry);
    assert_eq!(registry.league(judo).unwrap().administrator(), Some(root));
}

#[tokio::test]
async fn test_removing_administrator_without_root_clears_administration() {
    let mut registry = registry_on(Arc::new(InMemoryRepository::new()));
    let judo = registry.create_league("Judo").await.unwrap();
    let jean = registry.add_employee(judo, jean()).await.unwrap();
    registry.set_administrator(judo, jean).await.unwrap();

    registry.remove_employee(jean).await.unwrap();

    assert_eq!(registry.league(judo).unwrap().administrator(), None);
}

#[tokio::test]
async fn test_date_validation_and_persistence() {
    let (mut registry, store, _root, judo) = judo_registry().await;
    let jean = registry.add_employee(judo, jean()).await.unwrap();

    registry
        .set_arrival_date(jean, Some(date(2020, 9, 1)))
        .await
        .unwrap();
    registry
        .set_departure_date(jean, Some(date(2023, 6, 30)))
        .await
        .unwrap();

    let late_arrival = registry.set_arrival_date(jean, Some(date(2024, 1, 1))).await;
    assert!(matches!(
        late_arrival,
        Err(PersonnelError::InvalidDateRange(
            DateRangeError::ArrivalAfterDeparture { .. }
        ))
    ));

    let early_departure = registry
        .set_departure_date(jean, Some(date(2019, 1, 1)))
        .await;
    assert!(matches!(
        early_departure,
        Err(PersonnelError::InvalidDateRange(
            DateRangeError::DepartureBeforeArrival { .. }
        ))
    ));

    let employee = registry.employee(jean).unwrap();
    assert_eq!(employee.arrival_date(), Some(date(2020, 9, 1)));
    assert_eq!(employee.departure_date(), Some(date(2023, 6, 30)));

    let stored = store.find_employee(jean).await.unwrap().unwrap();
    assert_eq!(stored.arrival_date(), Some(date(2020, 9, 1)));
    assert_eq!(stored.departure_date(), Some(date(2023, 6, 30)));
}

#[tokio::test]
async fn test_profile_mutators_persist() {
    let (mut registry, store, _root, judo) = judo_registry().await;
    let jean = registry.add_employee(judo, jean()).await.unwrap();

    registry.set_last_name(jean, "Durand").await.unwrap();
    registry.set_first_name(jean, "Jeanne").await.unwrap();
    registry.set_email(jean, "jeanne@judo.fr").await.unwrap();
    registry.set_password(jean, "ippon").await.unwrap();

    let stored = store.find_employee(jean).await.unwrap().unwrap();
    assert_eq!(stored.last_name(), "Durand");
    assert_eq!(stored.first_name(), "Jeanne");
    assert_eq!(stored.email(), "jeanne@judo.fr");
    assert!(stored.check_password("ippon"));
    assert!(!stored.check_password("judoka"));
}

#[tokio::test]
async fn test_save_failure_is_reported_and_memory_unchanged() {
    let (mut registry, store, _root, judo) = judo_registry().await;
    let jean = registry.add_employee(judo, jean()).await.unwrap();
    registry.set_administrator(judo, jean).await.unwrap();

    store.fail_saves(true);

    let rename = registry.set_last_name(jean, "Durand").await;
    assert!(matches!(
        rename,
        Err(PersonnelError::Persistence(PersistenceError::SaveImpossible(_)))
    ));
    assert_eq!(registry.employee(jean).unwrap().last_name(), "Dupont");

    let removal = registry.remove_employee(jean).await;
    assert!(matches!(removal, Err(PersonnelError::Persistence(_))));
    assert!(registry.league(judo).unwrap().contains(jean));
    assert_eq!(registry.league(judo).unwrap().administrator(), Some(jean));

    let hire = registry
        .add_employee(judo, NewEmployee::new("Curie", "Marie", "", "pw"))
        .await;
    assert!(hire.is_err());
    assert_eq!(registry.league(judo).unwrap().employees().len(), 1);

    store.fail_saves(false);
    registry.set_last_name(jean, "Durand").await.unwrap();
    assert_eq!(registry.employee(jean).unwrap().last_name(), "Durand");
}

#[tokio::test]
async fn test_removing_league_removes_its_members() {
    let (mut registry, store, root, judo) = judo_registry().await;
    let escrime = registry.create_league("Escrime").await.unwrap();
    let jean = registry.add_employee(judo, jean()).await.unwrap();
    let marie = registry
        .add_employee(escrime, NewEmployee::new("Curie", "Marie", "", "pw"))
        .await
        .unwrap();
    registry.set_administrator(judo, jean).await.unwrap();

    registry.remove_league(judo).await.unwrap();

    assert!(registry.league(judo).is_none());
    assert!(registry.employee(jean).is_none());
    assert!(store.find_employee(jean).await.unwrap().is_none());
    assert!(registry.employee(marie).is_some());
    assert_eq!(registry.root().map(|e| e.id()), Some(root));

    let missing = registry.remove_league(judo).await;
    assert!(matches!(missing, Err(PersonnelError::LeagueNotFound(_))));
}

#[tokio::test]
async fn test_listings_are_sorted() {
    let (mut registry, _store, _root, judo) = judo_registry().await;
    registry.create_league("Escrime").await.unwrap();
    registry.create_league("Aviron").await.unwrap();

    for (last, first) in [("Martin", "Bob"), ("Durand", "Zoe"), ("Martin", "Alice")] {
        registry
            .add_employee(judo, NewEmployee::new(last, first, "", "pw"))
            .await
            .unwrap();
    }

    let leagues: Vec<&str> = registry.leagues().into_iter().map(|l| l.name()).collect();
    assert_eq!(leagues, vec!["Aviron", "Escrime", "Judo"]);

    let names: Vec<String> = registry
        .league_employees(judo)
        .unwrap()
        .iter()
        .map(|e| format!("{} {}", e.last_name(), e.first_name()))
        .collect();
    assert_eq!(names, vec!["Durand Zoe", "Martin Alice", "Martin Bob"]);
}

#[tokio::test]
async fn test_describe_and_rename() {
    let (mut registry, _store, root, judo) = judo_registry().await;
    let jean = registry.add_employee(judo, jean()).await.unwrap();

    let root = registry.employee(root).unwrap();
    assert_eq!(registry.describe(root), "Root Root root@m2l.fr (super-user)");

    registry.rename_league(judo, "Judo-Jujitsu").await.unwrap();
    let jean = registry.employee(jean).unwrap();
    assert_eq!(
        registry.describe(jean),
        "Dupont Jean jean@judo.fr (Judo-Jujitsu)"
    );
    assert_eq!(registry.league(judo).unwrap().to_string(), "Judo-Jujitsu");
}

#[tokio::test]
async fn test_unknown_identities_are_reported() {
    let (mut registry, _store, _root, judo) = judo_registry().await;

    let ghost = EmployeeId::new(999);
    assert!(matches!(
        registry.remove_employee(ghost).await,
        Err(PersonnelError::EmployeeNotFound(id)) if id == ghost
    ));
    assert!(matches!(
        registry.set_administrator(judo, ghost).await,
        Err(PersonnelError::EmployeeNotFound(_))
    ));
    assert!(matches!(
        registry.add_employee(LeagueId::new(999), jean()).await,
        Err(PersonnelError::LeagueNotFound(_))
    ));
}

#[tokio::test]
async fn test_registry_reloads_from_json_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("personnel.json");

    let (root, judo, jean, marie) = {
        let store = Arc::new(JsonFileRepository::open(&path).await.unwrap());
        let mut registry = registry_on(store);

        let root = registry
            .create_root(NewEmployee::new("Root", "Root", "", "toor"))
            .await
            .unwrap();
        let judo = registry.create_league("Judo").await.unwrap();
        let jean = registry
            .add_employee(judo, jean().arriving(Some(date(2021, 9, 1))))
            .await
            .unwrap();
        let marie = registry
            .add_employee(judo, NewEmployee::new("Curie", "Marie", "", "pw"))
            .await
            .unwrap();
        registry.set_administrator(judo, marie).await.unwrap();
        (root, judo, jean, marie)
    };

    let store = Arc::new(JsonFileRepository::open(&path).await.unwrap());
    let mut registry = PersonnelRegistry::load(store)
        .await
        .unwrap()
        .with_hash_cost(MIN_COST);

    assert_eq!(registry.root().map(|e| e.id()), Some(root));
    let league = registry.league(judo).unwrap();
    assert_eq!(league.name(), "Judo");
    assert_eq!(league.administrator(), Some(marie));
    assert!(league.contains(jean) && league.contains(marie));

    let reloaded = registry.employee(jean).unwrap();
    assert_eq!(reloaded.arrival_date(), Some(date(2021, 9, 1)));
    assert!(reloaded.check_password("judoka"));

    // Identities keep growing after a reload
    let paul = registry
        .add_employee(judo, NewEmployee::new("Martin", "Paul", "", "pw"))
        .await
        .unwrap();
    assert!(paul > marie);

    // The root remains the only root
    assert!(matches!(
        registry.create_root(NewEmployee::new("Root", "Again", "", "x")).await,
        Err(PersonnelError::RootAlreadyExists)
    ));
}

#[tokio::test]
async fn test_corrupt_json_file_is_load_impossible() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("personnel.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let result = JsonFileRepository::open(&path).await;

    assert!(matches!(result, Err(PersistenceError::LoadImpossible(_))));
}

#[tokio::test]
async fn test_refused_deletion_keeps_the_administrator() {
    let store = Arc::new(DeleteRefusingStore::default());
    let mut registry = registry_on(store.clone());
    registry
        .create_root(NewEmployee::new("Root", "Root", "", "toor"))
        .await
        .unwrap();
    let judo = registry.create_league("Judo").await.unwrap();
    let jean = registry.add_employee(judo, jean()).await.unwrap();
    registry.set_administrator(judo, jean).await.unwrap();

    let removal = registry.remove_employee(jean).await;

    assert!(matches!(
        removal,
        Err(PersonnelError::Persistence(PersistenceError::SaveImpossible(_)))
    ));
    let league = registry.league(judo).unwrap();
    assert_eq!(league.administrator(), Some(jean));
    assert!(league.contains(jean));
    assert!(registry.employee(jean).is_some());

    let stored = store.find_league(judo).await.unwrap().unwrap();
    assert_eq!(stored.administrator(), Some(jean));
    assert!(store.find_employee(jean).await.unwrap().is_some());
}

#[tokio::test]
async fn test_inverted_tenure_in_json_file_is_load_impossible() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("personnel.json");
    let roster = r#"{
        "last_employee_id": 1,
        "last_league_id": 1,
        "leagues": [{"id": 1, "name": "Judo", "administrator": null}],
        "employees": [{
            "id": 1, "league": 1,
            "last_name": "Dupont", "first_name": "Jean", "email": "", "password_hash": "x",
            "tenure": {"arrival": "2024-01-01", "departure": "2020-01-01"}
        }]
    }"#;
    std::fs::write(&path, roster).unwrap();

    let result = JsonFileRepository::open(&path).await;

    assert!(matches!(result, Err(PersistenceError::LoadImpossible(_))));
}

#[tokio::test]
async fn test_two_roots_in_store_are_inconsistent() {
    let dir = tempfile::TempDir::new().unwrap();
    let roster = r#"{
        "last_employee_id": 2,
        "last_league_id": 0,
        "leagues": [],
        "employees": [
            {"id": 1, "league": null, "last_name": "Root", "first_name": "Root",
             "email": "", "password_hash": "x", "tenure": {"arrival": null, "departure": null}},
            {"id": 2, "league": null, "last_name": "Root", "first_name": "Again",
             "email": "", "password_hash": "x", "tenure": {"arrival": null, "departure": null}}
        ]
    }"#;

    let result = load_roster(&dir.path().join("personnel.json"), roster).await;

    assert!(matches!(result, Err(PersonnelError::InconsistentStore(_))));
}

#[tokio::test]
async fn test_member_of_missing_league_is_inconsistent() {
    let dir = tempfile::TempDir::new().unwrap();
    let roster = r#"{
        "last_employee_id": 1,
        "last_league_id": 1,
        "leagues": [{"id": 1, "name": "Judo", "administrator": null}],
        "employees": [
            {"id": 1, "league": 9, "last_name": "Dupont", "first_name": "Jean",
             "email": "", "password_hash": "x", "tenure": {"arrival": null, "departure": null}}
        ]
    }"#;

    let result = load_roster(&dir.path().join("personnel.json"), roster).await;

    assert!(matches!(result, Err(PersonnelError::InconsistentStore(_))));
}

#[tokio::test]
async fn test_administrator_from_another_league_is_inconsistent() {
    let dir = tempfile::TempDir::new().unwrap();
    let roster = r#"{
        "last_employee_id": 2,
        "last_league_id": 2,
        "leagues": [
            {"id": 1, "name": "Judo", "administrator": 2},
            {"id": 2, "name": "Escrime", "administrator": null}
        ],
        "employees": [
            {"id": 1, "league": 1, "last_name": "Dupont", "first_name": "Jean",
             "email": "", "password_hash": "x", "tenure": {"arrival": null, "departure": null}},
            {"id": 2, "league": 2, "last_name": "Curie", "first_name": "Marie",
             "email": "", "password_hash": "x", "tenure": {"arrival": null, "departure": null}}
        ]
    }"#;

    let result = load_roster(&dir.path().join("personnel.json"), roster).await;

    assert!(matches!(result, Err(PersonnelError::InconsistentStore(_))));
}

#[tokio::test]
async fn test_overlong_password_is_refused() {
    let (mut registry, _store, _root, judo) = judo_registry().await;
    let long = "a".repeat(MAX_PASSWORD_BYTES + 1);

    let hire = registry
        .add_employee(judo, NewEmployee::new("Dupont", "Jean", "", &long))
        .await;
    assert!(matches!(hire, Err(PersonnelError::Credential(_))));
    assert!(registry.league(judo).unwrap().employees().is_empty());

    let jean = registry.add_employee(judo, jean()).await.unwrap();
    let change = registry.set_password(jean, &long).await;
    assert!(matches!(change, Err(PersonnelError::Credential(_))));
    assert!(registry.employee(jean).unwrap().check_password("judoka"));
}
