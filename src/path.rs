//! Denom path codec
//!
//! A denom path is a chain of `port/channel` hops followed by a root symbol,
//! e.g. `transfer/channel-1/uiris`. Ledgers only keep the hashed form
//! `ibc/<UPPERHEX(SHA256(path))>`, computed here.

use sha2::{Digest, Sha256};

/// Prefix of hashed IBC voucher denoms
pub const IBC_DENOM_PREFIX: &str = "ibc/";

/// Last `/`-delimited segment of a denom path
pub fn root_denom(full_path: &str) -> &str {
    full_path.rsplit('/').next().unwrap_or(full_path)
}

/// Split a denom path into its hop prefix and root denom.
///
/// The prefix is empty for a single-segment path.
pub fn split_full_path(full_path: &str) -> (&str, &str) {
    match full_path.rsplit_once('/') {
        Some((prefix, root)) => (prefix, root),
        None => ("", full_path),
    }
}

/// Denom identifier stored on-chain for a full denom path.
///
/// Single-segment paths are already base denoms and are returned unchanged.
pub fn canonical_hash(full_path: &str) -> String {
    if !full_path.contains('/') {
        return full_path.to_string();
    }

    let digest = Sha256::digest(full_path.as_bytes());
    format!("{}{}", IBC_DENOM_PREFIX, hex::encode_upper(digest))
}

/// Whether a denom is an `ibc/` hashed voucher
pub fn is_ibc_denom(denom: &str) -> bool {
    denom.starts_with(IBC_DENOM_PREFIX)
}
