use anyhow::Context;
use deadpool::managed::{self, Pool, RecycleError};
use libsql::{Builder, Error};

use crate::config::Config;

use super::tables::initialize_database;

/// Hands out read-only connections; all writes go through the `Writer`.
#[derive(Debug)]
pub struct Manager {
    config: Config,
    filename: String,
}

impl Manager {
    pub fn new(config: Config, filename: String) -> Self {
        Self { config, filename }
    }
}

impl managed::Manager for Manager {
    type Type = libsql::Connection;
    type Error = Error;

    async fn create(&self) -> Result<Self::Type, Error> {
        let db = Builder::new_local(self.config.data_dir.join(&self.filename))
            .build()
            .await?;
        let conn = db.connect()?;
        initialize_database(&conn).await?;
        conn.execute("PRAGMA query_only = ON;", ()).await?;
        Ok(conn)
    }

    async fn recycle(
        &self,
        conn: &mut Self::Type,
        _: &managed::Metrics,
    ) -> managed::RecycleResult<Error> {
        let mut rows = conn
            .query("SELECT 1", ())
            .await
            .map_err(RecycleError::Backend)?;
        match rows.next().await.map_err(RecycleError::Backend)? {
            Some(_) => Ok(()),
            None => Err(RecycleError::Message("No rows returned".into())),
        }
    }
}

pub async fn new_pool(config: Config, filename: &str) -> anyhow::Result<Pool<Manager>> {
    let manager = Manager::new(config, filename.to_string());
    Pool::builder(manager)
        .max_size(10)
        .build()
        .context("Failed to build database pool")
}
