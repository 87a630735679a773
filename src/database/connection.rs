use anyhow::{Context, Result};
use libsql::{Builder, Connection};
use tokio::fs;

use crate::config::Config;

use super::tables::initialize_database;

pub async fn new_connection(config: &Config, filename: &str) -> Result<Connection> {
    fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;
    let db = Builder::new_local(config.data_dir.join(filename))
        .build()
        .await?;
    let conn = db.connect()?;
    initialize_database(&conn).await?;
    Ok(conn)
}
