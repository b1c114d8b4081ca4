//! Shared data model for denom tracing
//!
//! Chain configurations describe the channel topology, packets carry the denom
//! path seen on the sending chain, and `DenomProvenance` is the resolved record
//! written back to storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel topology registered for a single chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: String,
    #[serde(default)]
    pub ibc_info: Vec<IbcInfo>,
}

/// Group of channels that connect the owning chain to one remote chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcInfo {
    /// Remote chain reached through `paths`
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub paths: Vec<ChannelPath>,
}

/// One local (port, channel) and the remote endpoint it is bound to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPath {
    #[serde(default)]
    pub state: String,
    pub port_id: String,
    pub channel_id: String,
    /// Chain on the far side of the channel
    pub chain_id: String,
    pub counterparty: CounterpartyEndpoint,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyEndpoint {
    #[serde(default)]
    pub state: String,
    pub port_id: String,
    pub channel_id: String,
}

/// Resolved far side of a channel, as returned by [`crate::graph::ChainSnapshot::counterparty`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    pub chain_id: String,
    pub port_id: String,
    pub channel_id: String,
}

/// ICS-20 transfer packet as observed on the sending chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub source_port: String,
    pub source_channel: String,
    pub destination_port: String,
    pub destination_channel: String,
    pub data: PacketData,
}

/// Fungible token packet payload. Only `denom` feeds provenance resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketData {
    pub denom: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub receiver: String,
}

/// Stored transfer waiting for its denoms to be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPacket {
    pub id: i64,
    /// Sending chain
    pub sc_chain_id: String,
    /// Receiving chain
    pub dc_chain_id: String,
    pub packet: Packet,
}

/// Resolved provenance of a denom on one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomProvenance {
    pub chain_id: String,
    /// Denom as stored on `chain_id` (`ibc/<HASH>` or a base symbol)
    pub denom: String,
    pub prev_denom: String,
    /// Empty when the denom is a base denom
    pub prev_chain_id: String,
    pub base_denom: String,
    pub base_denom_chain_id: String,
    /// Hop prefix without the root denom, e.g. `transfer/channel-0`
    pub denom_path: String,
    pub root_denom: String,
    pub is_base_denom: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One hop of a backward walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    pub denom: String,
    pub chain_id: String,
}

/// Processing status of a stored packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketStatus {
    /// Awaiting resolution, including packets whose last attempt failed
    Pending,
    Resolved,
    /// Retired by an operator; the runner never picks it up again
    Failed,
}

impl PacketStatus {
    /// Get the status as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            PacketStatus::Pending => "pending",
            PacketStatus::Resolved => "resolved",
            PacketStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PacketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_config_deserializes_without_state() {
        let json = r#"{
            "chain_id": "irishub_1",
            "ibc_info": [{
                "chain_id": "cosmoshub_4",
                "paths": [{
                    "port_id": "transfer",
                    "channel_id": "channel-12",
                    "chain_id": "cosmoshub_4",
                    "counterparty": {"port_id": "transfer", "channel_id": "channel-182"}
                }]
            }]
        }"#;

        let config: ChainConfig = serde_json::from_str(json).unwrap();
        let path = &config.ibc_info[0].paths[0];
        assert_eq!(path.state, "");
        assert_eq!(path.counterparty.channel_id, "channel-182");
    }

    #[test]
    fn test_packet_data_optional_fields() {
        let packet: Packet = serde_json::from_str(
            r#"{
                "source_port": "transfer",
                "source_channel": "channel-0",
                "destination_port": "transfer",
                "destination_channel": "channel-7",
                "data": {"denom": "uatom"}
            }"#,
        )
        .unwrap();
        assert_eq!(packet.data.denom, "uatom");
        assert!(packet.data.amount.is_empty());
    }

    #[test]
    fn test_packet_status_as_str() {
        assert_eq!(PacketStatus::Pending.as_str(), "pending");
        assert_eq!(PacketStatus::Resolved.to_string(), "resolved");
        assert_eq!(PacketStatus::Failed.to_string(), "failed");
    }
}
