//! IBC Denom Tracer - Library interface
//!
//! Resolves where an IBC voucher denom came from: the chain that sent the
//! previous hop and the chain that minted the base denom.
//!
//! - [`path`] - denom path splitting and `ibc/` hash computation
//! - [`graph`] - read-only channel topology snapshot
//! - [`tracer`] - backward walk producing [`types::DenomProvenance`]
//! - [`router`] - next-hop denom path for a transfer packet
//! - [`segment`] - time windows for batch scans
//!
//! The remaining modules make up the service around them: storage, the LCD
//! client, the batch runner and the health server.

pub mod batch;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod lcd;
pub mod path;
pub mod router;
pub mod segment;
pub mod server;
pub mod tracer;
pub mod types;

pub use error::{LcdError, TraceError};
pub use graph::ChainSnapshot;
pub use path::{canonical_hash, root_denom, split_full_path};
pub use router::{next_denom_path, NextDenomPath};
pub use tracer::{trace_denom, trace_steps};
pub use types::{ChainConfig, DenomProvenance, Packet, PacketData, TraceStep};
