//! In-memory [`ProvenanceStore`]

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use eyre::{eyre, Result};
use tokio::sync::Mutex;

use super::ProvenanceStore;
use crate::types::{ChainConfig, DenomProvenance, PacketStatus, PendingPacket};

#[derive(Debug, Clone)]
pub struct PacketEntry {
    pub packet: PendingPacket,
    pub status: PacketStatus,
    pub error: Option<String>,
    /// Logical time of the last insert or status update
    pub touched: u64,
}

#[derive(Debug, Default)]
struct Inner {
    chains: Vec<ChainConfig>,
    packets: BTreeMap<i64, PacketEntry>,
    denoms: HashMap<(String, String), DenomProvenance>,
    snapshot_error: Option<String>,
    clock: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new(chains: Vec<ChainConfig>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                chains,
                ..Default::default()
            }),
        }
    }

    pub async fn set_chains(&self, chains: Vec<ChainConfig>) {
        self.inner.lock().await.chains = chains;
    }

    /// Make `load_chain_configs` fail until cleared with `None`
    pub async fn set_snapshot_error(&self, error: Option<&str>) {
        self.inner.lock().await.snapshot_error = error.map(str::to_string);
    }

    pub async fn push_packet(&self, packet: PendingPacket) {
        let mut inner = self.inner.lock().await;
        let touched = inner.tick();
        inner.packets.insert(
            packet.id,
            PacketEntry {
                packet,
                status: PacketStatus::Pending,
                error: None,
                touched,
            },
        );
    }

    pub async fn packet(&self, id: i64) -> Option<PacketEntry> {
        self.inner.lock().await.packets.get(&id).cloned()
    }

    pub async fn denoms(&self) -> Vec<DenomProvenance> {
        self.inner.lock().await.denoms.values().cloned().collect()
    }
}

#[async_trait]
impl ProvenanceStore for MemoryStore {
    async fn load_chain_configs(&self) -> Result<Vec<ChainConfig>> {
        let inner = self.inner.lock().await;
        match &inner.snapshot_error {
            Some(error) => Err(eyre!("Failed to load chain configs: {}", error)),
            None => Ok(inner.chains.clone()),
        }
    }

    async fn pending_packets(&self, limit: u32) -> Result<Vec<PendingPacket>> {
        let inner = self.inner.lock().await;
        let mut pending: Vec<&PacketEntry> = inner
            .packets
            .values()
            .filter(|entry| entry.status == PacketStatus::Pending)
            .collect();
        pending.sort_by_key(|entry| (entry.touched, entry.packet.id));
        Ok(pending
            .into_iter()
            .take(limit as usize)
            .map(|entry| entry.packet.clone())
            .collect())
    }

    async fn upsert_denom(&self, record: &DenomProvenance) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let key = (record.chain_id.clone(), record.denom.clone());
        let mut record = record.clone();
        if let Some(existing) = inner.denoms.get(&key) {
            record.created_at = existing.created_at;
        }
        inner.denoms.insert(key, record);
        Ok(())
    }

    async fn get_denom(&self, chain_id: &str, denom: &str) -> Result<Option<DenomProvenance>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .denoms
            .get(&(chain_id.to_string(), denom.to_string()))
            .cloned())
    }

    async fn mark_packet(&self, id: i64, status: PacketStatus, error: Option<&str>) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let touched = inner.tick();
        let entry = inner
            .packets
            .get_mut(&id)
            .ok_or_else(|| eyre!("Packet {} not found", id))?;
        entry.status = status;
        entry.error = error.map(str::to_string);
        entry.touched = touched;
        Ok(())
    }
}
