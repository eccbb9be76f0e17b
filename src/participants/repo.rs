use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};

use super::repo_types::{
    HomeRecord, NewParticipant, Participant, ParticipantDetails, ParticipantSummary,
    ParticipantUpdate, WorkRecord,
};
use crate::error::StoreError;

/// Reads and transactional writes over `participants`, `work` and `home`.
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn create(&self, new: &NewParticipant) -> Result<(), StoreError>;
    async fn list_all(&self) -> Result<Vec<Participant>, StoreError>;
    async fn list_summaries(&self) -> Result<Vec<ParticipantSummary>, StoreError>;
    async fn get_by_email(&self, email: &str) -> Result<ParticipantDetails, StoreError>;
    async fn get_work_by_email(&self, email: &str) -> Result<WorkRecord, StoreError>;
    async fn get_home_by_email(&self, email: &str) -> Result<HomeRecord, StoreError>;
    async fn update(&self, email: &str, update: &ParticipantUpdate) -> Result<(), StoreError>;
    async fn delete(&self, email: &str) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgParticipantStore {
    pool: PgPool,
}

impl PgParticipantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type Tx<'c> = Transaction<'c, Postgres>;

async fn rollback(tx: Tx<'_>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "rollback failed");
    }
}

async fn insert_rows(tx: &mut Tx<'_>, new: &NewParticipant) -> Result<(), StoreError> {
    let p = &new.participant;
    sqlx::query(
        r#"
        INSERT INTO participants (email, firstname, lastname, dob)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&p.email)
    .bind(&p.firstname)
    .bind(&p.lastname)
    .bind(p.dob)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO work (email, companyname, salary, currency)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&p.email)
    .bind(&new.work.companyname)
    .bind(new.work.salary)
    .bind(&new.work.currency)
    .execute(&mut **tx)
    .await?;

    sqlx::query("INSERT INTO home (email, country, city) VALUES ($1, $2, $3)")
        .bind(&p.email)
        .bind(&new.home.country)
        .bind(&new.home.city)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// `Ok(false)` when no participant row matched; nothing else is touched then.
async fn update_rows(tx: &mut Tx<'_>, email: &str, u: &ParticipantUpdate) -> Result<bool, StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE participants
           SET firstname = $1, lastname = $2, dob = $3
         WHERE email = $4
        "#,
    )
    .bind(&u.firstname)
    .bind(&u.lastname)
    .bind(u.dob)
    .bind(email)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query(
        r#"
        UPDATE work
           SET companyname = $1, salary = $2, currency = $3
         WHERE email = $4
        "#,
    )
    .bind(&u.work.companyname)
    .bind(u.work.salary)
    .bind(&u.work.currency)
    .bind(email)
    .execute(&mut **tx)
    .await?;

    sqlx::query("UPDATE home SET country = $1, city = $2 WHERE email = $3")
        .bind(&u.home.country)
        .bind(&u.home.city)
        .bind(email)
        .execute(&mut **tx)
        .await?;

    Ok(true)
}

/// Locks the participant row first so a missing participant deletes nothing.
async fn delete_rows(tx: &mut Tx<'_>, email: &str) -> Result<bool, StoreError> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT email FROM participants WHERE email = $1 FOR UPDATE")
            .bind(email)
            .fetch_optional(&mut **tx)
            .await?;
    if existing.is_none() {
        return Ok(false);
    }

    // dependents first; no cascade is declared
    sqlx::query("DELETE FROM home WHERE email = $1")
        .bind(email)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM work WHERE email = $1")
        .bind(email)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM participants WHERE email = $1")
        .bind(email)
        .execute(&mut **tx)
        .await?;

    Ok(true)
}

#[async_trait]
impl ParticipantStore for PgParticipantStore {
    async fn create(&self, new: &NewParticipant) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        match insert_rows(&mut tx, new).await {
            Ok(()) => {
                tx.commit().await?;
                debug!(email = %new.participant.email, "participant rows inserted");
                Ok(())
            }
            Err(e) => {
                rollback(tx).await;
                Err(e)
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<Participant>, StoreError> {
        let rows = sqlx::query_as::<_, Participant>(
            r#"
            SELECT email, firstname, lastname, dob
            FROM participants
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_summaries(&self) -> Result<Vec<ParticipantSummary>, StoreError> {
        let rows = sqlx::query_as::<_, ParticipantSummary>(
            "SELECT firstname, lastname, email FROM participants ORDER BY email",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_email(&self, email: &str) -> Result<ParticipantDetails, StoreError> {
        sqlx::query_as::<_, ParticipantDetails>(
            "SELECT firstname, lastname, dob FROM participants WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Participant not found"))
    }

    async fn get_work_by_email(&self, email: &str) -> Result<WorkRecord, StoreError> {
        sqlx::query_as::<_, WorkRecord>(
            "SELECT companyname, salary, currency FROM work WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Work info not found for this participant"))
    }

    async fn get_home_by_email(&self, email: &str) -> Result<HomeRecord, StoreError> {
        sqlx::query_as::<_, HomeRecord>("SELECT country, city FROM home WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("Home info not found for this participant"))
    }

    async fn update(&self, email: &str, update: &ParticipantUpdate) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        match update_rows(&mut tx, email, update).await {
            Ok(true) => {
                tx.commit().await?;
                Ok(())
            }
            Ok(false) => {
                rollback(tx).await;
                Err(StoreError::NotFound("Participant not found"))
            }
            Err(e) => {
                rollback(tx).await;
                Err(e)
            }
        }
    }

    async fn delete(&self, email: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        match delete_rows(&mut tx, email).await {
            Ok(true) => {
                tx.commit().await?;
                Ok(())
            }
            Ok(false) => {
                rollback(tx).await;
                Err(StoreError::NotFound("Participant not found"))
            }
            Err(e) => {
                rollback(tx).await;
                Err(e)
            }
        }
    }
}
