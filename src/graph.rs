//! Read-only channel topology snapshot
//!
//! Built once per batch cycle from every registered chain config. Clones share
//! the same map, so a cycle that swaps in a newer snapshot never affects
//! resolutions still running against the old one.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TraceError;
use crate::types::{ChainConfig, RemoteEndpoint};

#[derive(Debug, Clone, Default)]
pub struct ChainSnapshot {
    chains: Arc<HashMap<String, ChainConfig>>,
}

impl ChainSnapshot {
    /// Build a snapshot keyed by `chain_id`. A later config with the same
    /// chain id replaces an earlier one.
    pub fn from_configs<I>(configs: I) -> Self
    where
        I: IntoIterator<Item = ChainConfig>,
    {
        let chains = configs
            .into_iter()
            .map(|config| (config.chain_id.clone(), config))
            .collect();
        Self {
            chains: Arc::new(chains),
        }
    }

    pub fn get(&self, chain_id: &str) -> Option<&ChainConfig> {
        self.chains.get(chain_id)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Far side of `port/channel` on `chain_id`.
    ///
    /// Scans `ibc_info` then `paths` in registration order and returns the
    /// first entry whose local port and channel match. If a chain registers the
    /// same local channel twice, the first registration wins.
    pub fn counterparty(
        &self,
        chain_id: &str,
        port: &str,
        channel: &str,
    ) -> Result<RemoteEndpoint, TraceError> {
        self.chains
            .get(chain_id)
            .into_iter()
            .flat_map(|config| config.ibc_info.iter())
            .flat_map(|info| info.paths.iter())
            .find(|path| path.port_id == port && path.channel_id == channel)
            // A registration with no remote chain is the end of the trace
            .filter(|path| !path.chain_id.is_empty())
            .map(|path| RemoteEndpoint {
                chain_id: path.chain_id.clone(),
                port_id: path.counterparty.port_id.clone(),
                channel_id: path.counterparty.channel_id.clone(),
            })
            .ok_or_else(|| TraceError::MissingChainConfig {
                chain_id: chain_id.to_string(),
                port: port.to_string(),
                channel: channel.to_string(),
            })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{chain, channel};
    use super::*;

    #[test]
    fn test_counterparty_found() {
        let snapshot = ChainSnapshot::from_configs(vec![chain(
            "A",
            vec![channel("transfer", "channel-0", "B", "transfer", "channel-7")],
        )]);

        let remote = snapshot.counterparty("A", "transfer", "channel-0").unwrap();
        assert_eq!(
            remote,
            RemoteEndpoint {
                chain_id: "B".to_string(),
                port_id: "transfer".to_string(),
                channel_id: "channel-7".to_string(),
            }
        );
    }

    #[test]
    fn test_counterparty_unknown_chain() {
        let snapshot = ChainSnapshot::default();
        let err = snapshot.counterparty("A", "transfer", "channel-0").unwrap_err();
        assert!(matches!(err, TraceError::MissingChainConfig { .. }));
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_counterparty_unknown_channel() {
        let snapshot = ChainSnapshot::from_configs(vec![chain(
            "A",
            vec![channel("transfer", "channel-0", "B", "transfer", "channel-7")],
        )]);

        assert_eq!(
            snapshot.counterparty("A", "transfer", "channel-9"),
            Err(TraceError::MissingChainConfig {
                chain_id: "A".to_string(),
                port: "transfer".to_string(),
                channel: "channel-9".to_string(),
            })
        );
        // Port must match too
        assert!(snapshot.counterparty("A", "wasm.terra1", "channel-0").is_err());
    }

    #[test]
    fn test_counterparty_first_registration_wins() {
        let snapshot = ChainSnapshot::from_configs(vec![chain(
            "A",
            vec![
                channel("transfer", "channel-0", "B", "transfer", "channel-7"),
                channel("transfer", "channel-0", "C", "transfer", "channel-3"),
            ],
        )]);

        let remote = snapshot.counterparty("A", "transfer", "channel-0").unwrap();
        assert_eq!(remote.chain_id, "B");
    }

    #[test]
    fn test_counterparty_without_remote_chain_is_missing() {
        let snapshot = ChainSnapshot::from_configs(vec![chain(
            "A",
            vec![
                channel("transfer", "channel-0", "", "transfer", "channel-7"),
                channel("transfer", "channel-0", "C", "transfer", "channel-3"),
            ],
        )]);

        assert_eq!(
            snapshot.counterparty("A", "transfer", "channel-0"),
            Err(TraceError::MissingChainConfig {
                chain_id: "A".to_string(),
                port: "transfer".to_string(),
                channel: "channel-0".to_string(),
            })
        );
    }

    #[test]
    fn test_clone_shares_snapshot() {
        let snapshot = ChainSnapshot::from_configs(vec![chain("A", vec![]), chain("B", vec![])]);
        let shared = snapshot.clone();
        assert_eq!(shared.len(), 2);
        assert!(Arc::ptr_eq(&snapshot.chains, &shared.chains));
        assert!(shared.get("A").is_some());
    }
}
