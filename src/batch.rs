//! Batch resolution of pending transfer packets
//!
//! Each cycle:
//! 1. Loads every chain config into a fresh [`ChainSnapshot`] (failure aborts the cycle)
//! 2. Fetches up to `batch_size` pending packets
//! 3. Resolves the packet's denom on the sending chain and the next-hop denom on the
//!    receiving chain, `concurrency` packets at a time
//! 4. Upserts both provenance records and marks the packet
//!
//! A packet that could not be resolved, or whose records could not be written,
//! stays `pending` and is retried on a later cycle. The resolution error is kept
//! on the packet.

use std::sync::Arc;

use chrono::Utc;
use eyre::{Result, WrapErr};
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::BatchConfig;
use crate::db::ProvenanceStore;
use crate::error::TraceError;
use crate::graph::ChainSnapshot;
use crate::router::next_denom_path;
use crate::server::{SharedMetrics, SharedStats};
use crate::tracer::trace_denom;
use crate::types::{DenomProvenance, PacketStatus, PendingPacket};

/// Both sides of a resolved packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketResolution {
    pub packet_id: i64,
    /// Denom as sent, on the sending chain
    pub source: DenomProvenance,
    /// Denom as received, on the receiving chain
    pub destination: DenomProvenance,
    pub is_return: bool,
}

/// Resolve a packet against a snapshot. Pure apart from record timestamps.
pub fn resolve_packet(
    pending: &PendingPacket,
    snapshot: &ChainSnapshot,
) -> Result<PacketResolution, TraceError> {
    let source = trace_denom(&pending.packet.data.denom, &pending.sc_chain_id, snapshot)?;
    let next = next_denom_path(&pending.packet);
    let destination = trace_denom(&next.full_denom_path, &pending.dc_chain_id, snapshot)?;

    Ok(PacketResolution {
        packet_id: pending.id,
        source,
        destination,
        is_return: next.is_return,
    })
}

/// Result of handling one packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketOutcome {
    Resolved,
    /// Resolution error recorded, left pending
    Failed,
    /// Storage error, left pending
    Deferred,
}

/// Summary of one batch cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub snapshot_chains: usize,
    pub packets: usize,
    pub resolved: usize,
    pub failed: usize,
    pub deferred: usize,
}

pub struct BatchRunner<S> {
    store: Arc<S>,
    config: BatchConfig,
    stats: SharedStats,
    metrics: SharedMetrics,
}

impl<S: ProvenanceStore + 'static> BatchRunner<S> {
    pub fn new(store: Arc<S>, config: BatchConfig, stats: SharedStats, metrics: SharedMetrics) -> Self {
        Self {
            store,
            config,
            stats,
            metrics,
        }
    }

    /// Run cycles every `interval_ms` until shutdown
    pub async fn run(&self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        info!(
            interval_ms = self.config.interval_ms,
            batch_size = self.config.batch_size,
            concurrency = self.config.concurrency,
            "Batch runner starting"
        );

        let mut interval = tokio::time::interval(self.config.interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Batch runner shutdown");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!(error = %e, "Batch cycle aborted");
                    }
                }
            }
        }

        Ok(())
    }

    /// Run a single cycle
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let snapshot = match self.store.load_chain_configs().await {
            Ok(configs) => ChainSnapshot::from_configs(configs),
            Err(e) => {
                self.metrics.snapshot_failures_total.inc();
                return Err(e).wrap_err("Chain config snapshot unavailable");
            }
        };

        let packets = self
            .store
            .pending_packets(self.config.batch_size)
            .await
            .wrap_err("Failed to fetch pending packets")?;

        let mut report = CycleReport {
            snapshot_chains: snapshot.len(),
            packets: packets.len(),
            ..Default::default()
        };

        let outcomes: Vec<PacketOutcome> = stream::iter(packets)
            .map(|pending| self.process_packet(&snapshot, pending))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                PacketOutcome::Resolved => report.resolved += 1,
                PacketOutcome::Failed => report.failed += 1,
                PacketOutcome::Deferred => report.deferred += 1,
            }
        }

        self.record_cycle(&report).await;

        info!(
            chains = report.snapshot_chains,
            packets = report.packets,
            resolved = report.resolved,
            failed = report.failed,
            deferred = report.deferred,
            "Batch cycle complete"
        );

        Ok(report)
    }

    async fn process_packet(&self, snapshot: &ChainSnapshot, pending: PendingPacket) -> PacketOutcome {
        let resolution = match resolve_packet(&pending, snapshot) {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(
                    packet_id = pending.id,
                    chain_id = %e.chain_id(),
                    path = %e.path(),
                    error = %e,
                    "Denom resolution failed, will retry next cycle"
                );
                let message = e.to_string();
                if let Err(e) = self
                    .store
                    .mark_packet(pending.id, PacketStatus::Pending, Some(&message))
                    .await
                {
                    error!(packet_id = pending.id, error = %e, "Failed to record resolution error");
                    return PacketOutcome::Deferred;
                }
                return PacketOutcome::Failed;
            }
        };

        debug!(
            packet_id = pending.id,
            denom = %resolution.source.denom,
            next_denom = %resolution.destination.denom,
            is_return = resolution.is_return,
            "Packet resolved"
        );

        match self.persist(&resolution).await {
            Ok(()) => PacketOutcome::Resolved,
            Err(e) => {
                warn!(
                    packet_id = pending.id,
                    error = %e,
                    "Failed to persist resolution, will retry next cycle"
                );
                PacketOutcome::Deferred
            }
        }
    }

    async fn persist(&self, resolution: &PacketResolution) -> Result<()> {
        self.store.upsert_denom(&resolution.source).await?;
        self.store.upsert_denom(&resolution.destination).await?;
        self.store
            .mark_packet(resolution.packet_id, PacketStatus::Resolved, None)
            .await
    }

    async fn record_cycle(&self, report: &CycleReport) {
        let resolved = (report.resolved * 2) as u64;
        let failed = report.failed as u64;

        self.metrics.batch_cycles_total.inc();
        self.metrics.denoms_resolved_total.inc_by(resolved);
        self.metrics.resolution_failures_total.inc_by(failed);
        self.metrics.snapshot_chains.set(report.snapshot_chains as i64);
        self.metrics.last_cycle_packets.set(report.packets as i64);

        let mut stats = self.stats.write().await;
        stats.cycles_completed += 1;
        stats.denoms_resolved += resolved;
        stats.resolution_failures += failed;
        stats.snapshot_chains = report.snapshot_chains;
        stats.last_cycle_packets = report.packets;
        stats.last_cycle_at = Some(Utc::now());
    }
}
