//! Mock implementations for testing.

use crate::{Chain, Error};
use commonware_cryptography::sha256::{self, Digest};
use commonware_runtime::Clock;
use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
};

/// A staking update captured by the mock cluster.
#[derive(Clone, Debug)]
pub struct Submission {
    pub relay: u32,
    pub validator: u32,
    pub amount: u128,
    pub nonce: u64,
    pub reference: Digest,
}

struct Inner {
    started: SystemTime,
    block_interval: Duration,
    epoch_length: u64,

    /// Height past which no new blocks are produced.
    halt: Option<u64>,

    /// Whether pledged balances accrue a small reward.
    rewards: bool,

    /// Extra balance injected into one validator, simulating a
    /// reward-accounting defect.
    inflated: Option<(u32, u128)>,

    /// Most recent proposal per validator.
    proposals: Vec<u128>,

    /// Last proposal per validator at the end of each completed epoch.
    /// Proposals superseded within an epoch never enter this record.
    epoch_stakes: Vec<Vec<u128>>,

    /// Completed epochs already folded into `locked`.
    settled: u64,

    /// Bonded balance per validator. Raised immediately by any proposal;
    /// lowered only at epoch switches, once a stake has left the unbonding
    /// window of the last three epochs.
    locked: Vec<u128>,

    /// Reference issued by the most recent height query.
    reference: Digest,

    /// Validator account names, when overridden.
    names: Option<Vec<String>>,

    submissions: Vec<Submission>,
}

/// A simulated validator cluster.
///
/// Blocks are derived from the runtime clock at a fixed interval. Staking
/// updates follow bonding semantics: a proposal raises the bonded balance
/// immediately, while decreases take effect only once the superseded stake
/// has aged out of the last three epochs. Only the final proposal of each
/// epoch is retained as that epoch's stake.
#[derive(Clone)]
pub struct Cluster<E: Clock> {
    context: E,
    inner: Arc<Mutex<Inner>>,
}

impl<E: Clock> Cluster<E> {
    pub fn new(
        context: E,
        initial: Vec<u128>,
        epoch_length: u64,
        block_interval: Duration,
    ) -> Self {
        let inner = Inner {
            started: context.current(),
            block_interval,
            epoch_length,
            halt: None,
            rewards: false,
            inflated: None,
            proposals: initial.clone(),
            epoch_stakes: vec![initial.clone()],
            settled: 0,
            locked: initial,
            reference: sha256::hash(&0u64.to_be_bytes()),
            names: None,
            submissions: Vec::new(),
        };
        Self {
            context,
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Accrue a small reward on every bonded balance.
    pub fn with_rewards(self) -> Self {
        self.inner.lock().unwrap().rewards = true;
        self
    }

    /// Stop producing blocks past `height`.
    pub fn with_halt(self, height: u64) -> Self {
        self.inner.lock().unwrap().halt = Some(height);
        self
    }

    /// Report `names` as the active validator accounts.
    pub fn with_names(self, names: Vec<String>) -> Self {
        self.inner.lock().unwrap().names = Some(names);
        self
    }

    /// Inject `extra` balance into `validator`, breaking its accounting.
    pub fn inflate(&self, validator: u32, extra: u128) {
        self.inner.lock().unwrap().inflated = Some((validator, extra));
    }

    /// All staking updates received so far, in submission order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.inner.lock().unwrap().submissions.clone()
    }

    fn height(&self, inner: &Inner) -> u64 {
        let elapsed = self
            .context
            .current()
            .duration_since(inner.started)
            .unwrap_or_default();
        let height = (elapsed.as_millis() / inner.block_interval.as_millis()) as u64;
        match inner.halt {
            Some(halt) => height.min(halt),
            None => height,
        }
    }

    /// Folds every epoch completed below `height` into the bonded balances.
    fn settle(inner: &mut Inner, height: u64) {
        let epoch = height / inner.epoch_length;
        while inner.settled < epoch {
            inner.epoch_stakes.push(inner.proposals.clone());
            for (i, locked) in inner.locked.iter_mut().enumerate() {
                let bonded = inner
                    .epoch_stakes
                    .iter()
                    .rev()
                    .take(3)
                    .map(|stakes| stakes[i])
                    .max()
                    .unwrap_or(0);
                *locked = inner.proposals[i].max(bonded);
            }
            inner.settled += 1;
        }
    }
}

impl<E: Clock> Chain for Cluster<E> {
    type Digest = Digest;

    async fn latest(&mut self) -> Result<(u64, Digest), Error> {
        let mut inner = self.inner.lock().unwrap();
        let height = self.height(&inner);
        Self::settle(&mut inner, height);
        inner.reference = sha256::hash(&height.to_be_bytes());
        Ok((height, inner.reference))
    }

    async fn submit(
        &mut self,
        relay: u32,
        validator: u32,
        amount: u128,
        nonce: u64,
        reference: Digest,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        assert_eq!(reference, inner.reference, "stale block reference");
        let i = validator as usize;
        inner.proposals[i] = amount;
        inner.locked[i] = inner.locked[i].max(amount);
        inner.submissions.push(Submission {
            relay,
            validator,
            amount,
            nonce,
            reference,
        });
        Ok(())
    }

    async fn pledge(&mut self, validator: u32) -> Result<u128, Error> {
        let mut inner = self.inner.lock().unwrap();
        let height = self.height(&inner);
        Self::settle(&mut inner, height);
        let mut pledge = inner.locked[validator as usize];
        if inner.rewards && pledge > 0 {
            // 2% reward, offset by one so the total is never divisible by
            // the reward unit.
            pledge += pledge / 50 + 1;
        }
        if let Some((broken, extra)) = inner.inflated {
            if broken == validator {
                pledge += extra;
            }
        }
        Ok(pledge)
    }

    async fn validators(&mut self) -> Result<BTreeSet<String>, Error> {
        let inner = self.inner.lock().unwrap();
        match &inner.names {
            Some(names) => Ok(names.iter().cloned().collect()),
            None => Ok((0..inner.locked.len())
                .map(|i| format!("node{i}"))
                .collect()),
        }
    }
}
