use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::auth::{password::hash_password, CredentialStore, PgCredentialStore};
use crate::config::AppConfig;
use crate::participants::{ParticipantStore, PgParticipantStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub participants: Arc<dyn ParticipantStore>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    /// Builds the pool from config and hands it to the Postgres stores.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect_with(config.database.connect_options())
            .await
            .with_context(|| {
                format!(
                    "connect to database {}@{}:{}/{}",
                    config.database.user, config.database.host, config.database.port, config.database.name
                )
            })?;
        info!(
            host = %config.database.host,
            database = %config.database.name,
            "connected to postgres"
        );

        let participants = Arc::new(PgParticipantStore::new(db.clone())) as Arc<dyn ParticipantStore>;
        let credentials = Arc::new(PgCredentialStore::new(db)) as Arc<dyn CredentialStore>;
        Ok(Self::from_parts(Arc::new(config), participants, credentials))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        participants: Arc<dyn ParticipantStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            config,
            participants,
            credentials,
        }
    }

    /// Upserts the bootstrap admin from `ADMIN_USERNAME`/`ADMIN_PASSWORD`, if configured.
    pub async fn seed_admin(&self) -> anyhow::Result<()> {
        let Some(seed) = &self.config.admin_seed else {
            return Ok(());
        };
        let hash = hash_password(&seed.password)?;
        self.credentials
            .upsert(&seed.username, &hash)
            .await
            .context("upsert bootstrap admin")?;
        info!(username = %seed.username, "bootstrap admin ready");
        Ok(())
    }
}
