use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::types::{ChainConfig, DenomProvenance, IbcInfo, Packet, PacketData, PendingPacket};

/// Row of `chain_configs`
#[derive(Debug, Clone, FromRow)]
pub struct ChainConfigRow {
    pub chain_id: String,
    pub ibc_info: Json<Vec<IbcInfo>>,
}

impl From<ChainConfigRow> for ChainConfig {
    fn from(row: ChainConfigRow) -> Self {
        ChainConfig {
            chain_id: row.chain_id,
            ibc_info: row.ibc_info.0,
        }
    }
}

/// Pending row of `ibc_packets`
#[derive(Debug, Clone, FromRow)]
pub struct PacketRow {
    pub id: i64,
    pub sc_chain_id: String,
    pub dc_chain_id: String,
    pub source_port: String,
    pub source_channel: String,
    pub destination_port: String,
    pub destination_channel: String,
    pub denom: String,
    pub amount: String,
    pub sender: String,
    pub receiver: String,
}

impl From<PacketRow> for PendingPacket {
    fn from(row: PacketRow) -> Self {
        PendingPacket {
            id: row.id,
            sc_chain_id: row.sc_chain_id,
            dc_chain_id: row.dc_chain_id,
            packet: Packet {
                source_port: row.source_port,
                source_channel: row.source_channel,
                destination_port: row.destination_port,
                destination_channel: row.destination_channel,
                data: PacketData {
                    denom: row.denom,
                    amount: row.amount,
                    sender: row.sender,
                    receiver: row.receiver,
                },
            },
        }
    }
}

/// Row of `ibc_denoms`
#[derive(Debug, Clone, FromRow)]
pub struct DenomRow {
    pub chain_id: String,
    pub denom: String,
    pub prev_denom: String,
    pub prev_chain_id: String,
    pub base_denom: String,
    pub base_denom_chain_id: String,
    pub denom_path: String,
    pub root_denom: String,
    pub is_base_denom: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DenomRow> for DenomProvenance {
    fn from(row: DenomRow) -> Self {
        DenomProvenance {
            chain_id: row.chain_id,
            denom: row.denom,
            prev_denom: row.prev_denom,
            prev_chain_id: row.prev_chain_id,
            base_denom: row.base_denom,
            base_denom_chain_id: row.base_denom_chain_id,
            denom_path: row.denom_path,
            root_denom: row.root_denom,
            is_base_denom: row.is_base_denom,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
