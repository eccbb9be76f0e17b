//! In-memory stores and fixtures for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use time::Date;

use crate::auth::{password::hash_password, repo_types::AdminCredential, CredentialStore};
use crate::config::AppConfig;
use crate::error::StoreError;
use crate::participants::repo_types::{
    HomeRecord, NewParticipant, Participant, ParticipantDetails, ParticipantSummary,
    ParticipantUpdate, WorkRecord,
};
use crate::participants::ParticipantStore;
use crate::state::AppState;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "correct-horse";

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "DB_USER" => Some("census".into()),
        "DB_NAME" => Some("census_test".into()),
        _ => None,
    })
    .expect("test config")
}

/// Argon2 is slow in debug builds; hash the fixture password once.
fn admin_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(ADMIN_PASS).expect("hash fixture password"))
}

#[derive(Default)]
pub struct MemoryCredentials {
    rows: Mutex<HashMap<String, String>>,
}

impl MemoryCredentials {
    pub fn with_admin() -> Self {
        let store = Self::default();
        store
            .rows
            .lock()
            .unwrap()
            .insert(ADMIN_USER.into(), admin_hash().into());
        store
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentials {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminCredential>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(username)
            .map(|hash| AdminCredential {
                password_hash: hash.clone(),
            }))
    }

    async fn upsert(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        self.rows
            .lock()
            .unwrap()
            .insert(username.into(), password_hash.into());
        Ok(())
    }
}

/// Credential store whose every call fails like a dropped connection.
pub struct BrokenCredentials;

#[async_trait]
impl CredentialStore for BrokenCredentials {
    async fn find_by_username(&self, _username: &str) -> Result<Option<AdminCredential>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn upsert(&self, _username: &str, _password_hash: &str) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

#[derive(Default)]
struct Tables {
    participants: BTreeMap<String, (String, String, Date)>,
    work: HashMap<String, WorkRecord>,
    home: HashMap<String, HomeRecord>,
}

/// Mimics the three tables; one lock per operation stands in for a transaction.
#[derive(Default)]
pub struct MemoryParticipants {
    tables: Mutex<Tables>,
    broken: bool,
}

impl MemoryParticipants {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn row_counts(&self, email: &str) -> (usize, usize, usize) {
        let t = self.tables.lock().unwrap();
        (
            usize::from(t.participants.contains_key(email)),
            usize::from(t.work.contains_key(email)),
            usize::from(t.home.contains_key(email)),
        )
    }

    /// Inserts a work/home row with no participant, like a stray row in a real table.
    pub fn insert_orphans(&self, email: &str, work: WorkRecord, home: HomeRecord) {
        let mut t = self.tables.lock().unwrap();
        t.work.insert(email.into(), work);
        t.home.insert(email.into(), home);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.broken {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl ParticipantStore for MemoryParticipants {
    async fn create(&self, new: &NewParticipant) -> Result<(), StoreError> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        let p = &new.participant;
        if t.participants.contains_key(&p.email) {
            return Err(StoreError::Database(sqlx::Error::Protocol(format!(
                "duplicate key value violates unique constraint \"participants_pkey\": {}",
                p.email
            ))));
        }
        t.participants
            .insert(p.email.clone(), (p.firstname.clone(), p.lastname.clone(), p.dob));
        t.work.insert(p.email.clone(), new.work.clone());
        t.home.insert(p.email.clone(), new.home.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Participant>, StoreError> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(t.participants
            .iter()
            .map(|(email, (first, last, dob))| Participant {
                email: email.clone(),
                firstname: first.clone(),
                lastname: last.clone(),
                dob: *dob,
            })
            .collect())
    }

    async fn list_summaries(&self) -> Result<Vec<ParticipantSummary>, StoreError> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(t.participants
            .iter()
            .map(|(email, (first, last, _))| ParticipantSummary {
                firstname: first.clone(),
                lastname: last.clone(),
                email: email.clone(),
            })
            .collect())
    }

    async fn get_by_email(&self, email: &str) -> Result<ParticipantDetails, StoreError> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        t.participants
            .get(email)
            .map(|(first, last, dob)| ParticipantDetails {
                firstname: first.clone(),
                lastname: last.clone(),
                dob: *dob,
            })
            .ok_or(StoreError::NotFound("Participant not found"))
    }

    async fn get_work_by_email(&self, email: &str) -> Result<WorkRecord, StoreError> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        t.work
            .get(email)
            .cloned()
            .ok_or(StoreError::NotFound("Work info not found for this participant"))
    }

    async fn get_home_by_email(&self, email: &str) -> Result<HomeRecord, StoreError> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        t.home
            .get(email)
            .cloned()
            .ok_or(StoreError::NotFound("Home info not found for this participant"))
    }

    async fn update(&self, email: &str, u: &ParticipantUpdate) -> Result<(), StoreError> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        let Some(row) = t.participants.get_mut(email) else {
            return Err(StoreError::NotFound("Participant not found"));
        };
        *row = (u.firstname.clone(), u.lastname.clone(), u.dob);
        // UPDATE on a missing sub-row matches nothing
        if let Some(work) = t.work.get_mut(email) {
            *work = u.work.clone();
        }
        if let Some(home) = t.home.get_mut(email) {
            *home = u.home.clone();
        }
        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<(), StoreError> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        if t.participants.remove(email).is_none() {
            return Err(StoreError::NotFound("Participant not found"));
        }
        t.home.remove(email);
        t.work.remove(email);
        Ok(())
    }
}

pub fn state_with(
    participants: Arc<dyn ParticipantStore>,
    credentials: Arc<dyn CredentialStore>,
) -> AppState {
    AppState::from_parts(Arc::new(test_config()), participants, credentials)
}

/// State with an empty participant store and the fixture admin.
pub fn admin_state() -> (AppState, Arc<MemoryParticipants>) {
    let participants = Arc::new(MemoryParticipants::default());
    let state = state_with(participants.clone(), Arc::new(MemoryCredentials::with_admin()));
    (state, participants)
}
