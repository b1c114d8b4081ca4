//! Denom provenance tracing
//!
//! Walks a denom path backwards hop by hop through the channel topology to find
//! the chain that sent the previous hop and the chain that minted the base denom.
//!
//! ## Walk
//!
//! For `transfer/channel-0/transfer/channel-5/uatom` observed on chain A:
//! 1. `transfer/channel-0` on A leads to chain B, where the token is
//!    `ibc/HASH(transfer/channel-5/uatom)`
//! 2. `transfer/channel-5` on B leads to chain C, where the token is `uatom`
//!
//! The walk stops early when a hop is not registered; the furthest resolved hop
//! is then reported as the base. When not even the first hop resolves, the
//! record is marked `is_base_denom` while still carrying the hashed denom. That
//! bookkeeping is relied on downstream and is kept as is.

use chrono::Utc;
use tracing::debug;

use crate::error::TraceError;
use crate::graph::ChainSnapshot;
use crate::path::{canonical_hash, is_ibc_denom, root_denom, split_full_path};
use crate::types::{DenomProvenance, TraceStep};

/// Resolve the provenance of `full_denom_path` as observed on `chain_id`
pub fn trace_denom(
    full_denom_path: &str,
    chain_id: &str,
    snapshot: &ChainSnapshot,
) -> Result<DenomProvenance, TraceError> {
    validate_path(full_denom_path, chain_id)?;

    let now = Utc::now();
    let denom = canonical_hash(full_denom_path);
    let root = root_denom(full_denom_path).to_string();

    if !is_ibc_denom(&denom) {
        return Ok(DenomProvenance {
            chain_id: chain_id.to_string(),
            denom: denom.clone(),
            prev_denom: String::new(),
            prev_chain_id: String::new(),
            base_denom: denom,
            base_denom_chain_id: chain_id.to_string(),
            denom_path: String::new(),
            root_denom: root,
            is_base_denom: true,
            created_at: now,
            updated_at: now,
        });
    }

    let steps = walk(full_denom_path, chain_id, &denom, snapshot)?;
    let (denom_path, _) = split_full_path(full_denom_path);

    // steps[0] is the seed; with no resolved hop the seed itself is the base
    let prev = steps.get(1);
    let base = prev.and(steps.last());

    Ok(DenomProvenance {
        chain_id: chain_id.to_string(),
        prev_denom: prev.map(|s| s.denom.clone()).unwrap_or_default(),
        prev_chain_id: prev.map(|s| s.chain_id.clone()).unwrap_or_default(),
        base_denom: base.map_or_else(|| denom.clone(), |s| s.denom.clone()),
        base_denom_chain_id: base.map_or_else(|| chain_id.to_string(), |s| s.chain_id.clone()),
        denom,
        denom_path: denom_path.to_string(),
        root_denom: root,
        is_base_denom: prev.is_none(),
        created_at: now,
        updated_at: now,
    })
}

/// Raw backward walk: the first step is the input denom on `chain_id`, the last
/// is the furthest chain the hops could be resolved to.
pub fn trace_steps(
    full_denom_path: &str,
    chain_id: &str,
    snapshot: &ChainSnapshot,
) -> Result<Vec<TraceStep>, TraceError> {
    validate_path(full_denom_path, chain_id)?;
    walk(
        full_denom_path,
        chain_id,
        &canonical_hash(full_denom_path),
        snapshot,
    )
}

fn walk(
    full_denom_path: &str,
    chain_id: &str,
    denom: &str,
    snapshot: &ChainSnapshot,
) -> Result<Vec<TraceStep>, TraceError> {
    let segments: Vec<&str> = full_denom_path.split('/').collect();
    let mut steps = vec![TraceStep {
        denom: denom.to_string(),
        chain_id: chain_id.to_string(),
    }];

    let mut current_chain_id = chain_id.to_string();
    let mut rest = segments.as_slice();

    // At most one hop per port/channel pair
    for _ in 0..segments.len() / 2 {
        let [port, channel, remaining @ ..] = rest else {
            break;
        };
        // A trailing port/channel pair with no root after it is not a hop
        if remaining.is_empty() {
            break;
        }

        let remote = match snapshot.counterparty(&current_chain_id, port, channel) {
            Ok(remote) => remote,
            Err(err) => {
                debug!(
                    chain_id = %current_chain_id,
                    path = %full_denom_path,
                    error = %err,
                    "Trace stopped at unregistered hop"
                );
                break;
            }
        };

        steps.push(TraceStep {
            denom: canonical_hash(&remaining.join("/")),
            chain_id: remote.chain_id.clone(),
        });
        current_chain_id = remote.chain_id;
        rest = remaining;
    }

    Ok(steps)
}

fn validate_path(full_denom_path: &str, chain_id: &str) -> Result<(), TraceError> {
    let malformed = |reason: &str| TraceError::MalformedPath {
        path: full_denom_path.to_string(),
        chain_id: chain_id.to_string(),
        reason: reason.to_string(),
    };

    if full_denom_path.is_empty() {
        return Err(malformed("empty path"));
    }
    if full_denom_path.split('/').any(str::is_empty) {
        return Err(malformed("empty segment"));
    }
    Ok(())
}
