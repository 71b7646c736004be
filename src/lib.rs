//! Drive a validator cluster through a biphasic staking schedule and assert
//! on-chain pledges match expectations.
//!
//! # Overview
//!
//! The core of the crate is the [Engine]. Once per epoch it submits a "fake"
//! staking update (expected to be superseded before it affects long-term
//! consensus weight) and a "real" staking update (whose effect persists), one
//! transaction per validator. Before every submission round it reads the live
//! pledge of each validator from the cluster and checks it against an
//! independently maintained expectation: the maximum of the pending fake
//! update and the last three real updates.
//!
//! # Details
//!
//! Randomly generated pledges are always a multiple of [REWARD_UNIT]. A live
//! value divisible by the unit has therefore accrued no reward and must match
//! the expectation exactly; a non-divisible value has rewards in flight and
//! must fall within 10% above the expectation. Any violation aborts the run
//! with [Error::Mismatch] — it signals a staking or reward-accounting defect
//! in the cluster under inspection, not a transient condition, so nothing is
//! retried.
//!
//! The engine polls the chain height at a fixed cadence and derives boundary
//! crossings from the height alone, so it fires exactly once per epoch per
//! phase no matter how many blocks are produced between polls. A run ends
//! successfully when the overall time budget elapses and fatally when no
//! boundary fires within the per-iteration budget ([Error::Stalled]).

use commonware_cryptography::Digest;
use std::{collections::BTreeSet, future::Future};
use thiserror::Error;

mod compare;
pub use compare::verify;
mod config;
pub use config::Config;
mod engine;
pub use engine::Engine;
mod generator;
pub use generator::Generator;
mod metrics;
mod phase;
pub use phase::Boundary;
mod state;
pub use state::State;

#[cfg(test)]
pub mod mocks;

/// Granularity of generated pledge amounts.
///
/// Synthesized pledges are `k * REWARD_UNIT`, so divisibility by the unit
/// distinguishes "no reward accrued yet" from "reward in flight".
pub const REWARD_UNIT: u128 = 1_000_000;

/// Errors that can occur when running the [Engine].
#[derive(Error, Debug)]
pub enum Error {
    /// No phase boundary fired within the per-iteration budget; the cluster
    /// has stopped producing blocks.
    #[error("cluster stalled at height {height}")]
    Stalled { height: u64 },
    /// A live pledge diverged from the expectation; the cluster has a staking
    /// or reward-accounting defect.
    #[error("pledge mismatch for validator {validator}: live {live}, expected {expected}")]
    Mismatch {
        validator: u32,
        live: u128,
        expected: u128,
    },
    /// No active validator name carries a numeric id to relay through.
    #[error("no numeric id in any active validator name")]
    NoRelay,
    /// A collaborator request failed.
    #[error("chain request failed: {0}")]
    Chain(String),
}

/// A [Chain] exposes the validator cluster under inspection.
///
/// Submission is fire-and-forget: confirmation, retry, and backoff are the
/// collaborator's concern, never the engine's.
pub trait Chain: Clone + Send + 'static {
    /// The digest identifying a block.
    type Digest: Digest;

    /// Returns the latest height and block digest.
    fn latest(&mut self) -> impl Future<Output = Result<(u64, Self::Digest), Error>> + Send;

    /// Submits one staking update for `validator` through node `relay`,
    /// anchored to the `reference` block.
    fn submit(
        &mut self,
        relay: u32,
        validator: u32,
        amount: u128,
        nonce: u64,
        reference: Self::Digest,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Returns the live pledge of `validator`.
    fn pledge(&mut self, validator: u32) -> impl Future<Output = Result<u128, Error>> + Send;

    /// Returns the account names of the currently active validators.
    fn validators(&mut self) -> impl Future<Output = Result<BTreeSet<String>, Error>> + Send;
}
