//! Storage for chain configs, pending packets and resolved denoms
//!
//! The batch runner only talks to [`ProvenanceStore`]. [`PgStore`] is the
//! Postgres implementation used in production, [`memory::MemoryStore`] backs
//! tests and dry runs.

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Row;
use tracing::error;

use crate::types::{ChainConfig, DenomProvenance, PacketStatus, PendingPacket};

pub mod memory;
pub mod models;

pub use models::*;

#[async_trait]
pub trait ProvenanceStore: Send + Sync {
    /// Every registered chain config. A failure here is fatal to the cycle.
    async fn load_chain_configs(&self) -> Result<Vec<ChainConfig>>;

    /// Pending packets, least recently attempted first, at most `limit`
    async fn pending_packets(&self, limit: u32) -> Result<Vec<PendingPacket>>;

    /// Insert or refresh a record keyed by `(chain_id, denom)`. An existing
    /// record keeps its `created_at`.
    async fn upsert_denom(&self, record: &DenomProvenance) -> Result<()>;

    async fn get_denom(&self, chain_id: &str, denom: &str) -> Result<Option<DenomProvenance>>;

    /// Set a packet's status and last error. Touching a packet moves it to the
    /// back of the pending queue.
    async fn mark_packet(&self, id: i64, status: PacketStatus, error: Option<&str>) -> Result<()>;
}

/// Create a database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .wrap_err("Failed to connect to database")
}

/// Run pending migrations (uses the migration files in migrations/)
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .wrap_err("Failed to run database migrations")?;
    Ok(())
}

/// Postgres-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Register or replace a chain's channel topology
    pub async fn upsert_chain_config(&self, config: &ChainConfig) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chain_configs (chain_id, ibc_info)
            VALUES ($1, $2)
            ON CONFLICT (chain_id) DO UPDATE SET ibc_info = EXCLUDED.ibc_info, updated_at = NOW()
            "#,
        )
        .bind(&config.chain_id)
        .bind(Json(&config.ibc_info))
        .execute(&self.pool)
        .await
        .wrap_err_with(|| format!("Failed to upsert chain config {}", config.chain_id))?;

        Ok(())
    }

    /// Queue a packet for resolution
    pub async fn insert_packet(
        &self,
        sc_chain_id: &str,
        dc_chain_id: &str,
        packet: &crate::types::Packet,
    ) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO ibc_packets (sc_chain_id, dc_chain_id, source_port, source_channel,
                destination_port, destination_channel, denom, amount, sender, receiver)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(sc_chain_id)
        .bind(dc_chain_id)
        .bind(&packet.source_port)
        .bind(&packet.source_channel)
        .bind(&packet.destination_port)
        .bind(&packet.destination_channel)
        .bind(&packet.data.denom)
        .bind(&packet.data.amount)
        .bind(&packet.data.sender)
        .bind(&packet.data.receiver)
        .fetch_one(&self.pool)
        .await
        .wrap_err("Failed to insert packet")?;

        Ok(row.get("id"))
    }
}

#[async_trait]
impl ProvenanceStore for PgStore {
    async fn load_chain_configs(&self) -> Result<Vec<ChainConfig>> {
        let rows = sqlx::query_as::<_, ChainConfigRow>(
            r#"SELECT chain_id, ibc_info FROM chain_configs ORDER BY chain_id"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("SQL error loading chain configs: {:?}", e);
            e
        })
        .wrap_err("Failed to load chain configs")?;

        Ok(rows.into_iter().map(ChainConfig::from).collect())
    }

    async fn pending_packets(&self, limit: u32) -> Result<Vec<PendingPacket>> {
        let rows = sqlx::query_as::<_, PacketRow>(
            r#"SELECT id, sc_chain_id, dc_chain_id, source_port, source_channel,
                      destination_port, destination_channel, denom, amount, sender, receiver
               FROM ibc_packets WHERE status = 'pending'
               ORDER BY updated_at, id
               LIMIT $1"#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .wrap_err("Failed to get pending packets")?;

        Ok(rows.into_iter().map(PendingPacket::from).collect())
    }

    async fn upsert_denom(&self, record: &DenomProvenance) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ibc_denoms (chain_id, denom, prev_denom, prev_chain_id, base_denom,
                base_denom_chain_id, denom_path, root_denom, is_base_denom, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (chain_id, denom) DO UPDATE SET
                prev_denom = EXCLUDED.prev_denom,
                prev_chain_id = EXCLUDED.prev_chain_id,
                base_denom = EXCLUDED.base_denom,
                base_denom_chain_id = EXCLUDED.base_denom_chain_id,
                denom_path = EXCLUDED.denom_path,
                root_denom = EXCLUDED.root_denom,
                is_base_denom = EXCLUDED.is_base_denom,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&record.chain_id)
        .bind(&record.denom)
        .bind(&record.prev_denom)
        .bind(&record.prev_chain_id)
        .bind(&record.base_denom)
        .bind(&record.base_denom_chain_id)
        .bind(&record.denom_path)
        .bind(&record.root_denom)
        .bind(record.is_base_denom)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .wrap_err_with(|| {
            format!(
                "Failed to upsert denom {} on chain {}",
                record.denom, record.chain_id
            )
        })?;

        Ok(())
    }

    async fn get_denom(&self, chain_id: &str, denom: &str) -> Result<Option<DenomProvenance>> {
        let row = sqlx::query_as::<_, DenomRow>(
            r#"SELECT chain_id, denom, prev_denom, prev_chain_id, base_denom, base_denom_chain_id,
                      denom_path, root_denom, is_base_denom, created_at, updated_at
               FROM ibc_denoms WHERE chain_id = $1 AND denom = $2"#,
        )
        .bind(chain_id)
        .bind(denom)
        .fetch_optional(&self.pool)
        .await
        .wrap_err("Failed to get denom")?;

        Ok(row.map(DenomProvenance::from))
    }

    async fn mark_packet(&self, id: i64, status: PacketStatus, error: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"UPDATE ibc_packets SET status = $1, error_message = $2, updated_at = NOW() WHERE id = $3"#,
        )
        .bind(status.as_str())
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await
        .wrap_err_with(|| format!("Failed to update packet {} status to {}", id, status))?;

        Ok(())
    }
}
