use crate::{compare::verify, metrics, Boundary, Chain, Config, Error, Generator, State};
use commonware_macros::select;
use commonware_runtime::{Clock, Handle, Metrics, Spawner};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info};

/// Instance of the main engine for the crate.
///
/// It is responsible for:
/// - Polling the chain height and deriving phase boundary crossings
/// - Checking live pledges against the rolling expectation
/// - Submitting one staking update per validator at each boundary
pub struct Engine<E: Clock + Rng + Spawner + Metrics, C: Chain> {
    ////////////////////////////////////////
    // Interfaces
    ////////////////////////////////////////
    context: E,
    chain: C,

    ////////////////////////////////////////
    // Configuration
    ////////////////////////////////////////
    validators: u32,
    timeout: Duration,
    iteration_timeout: Duration,
    poll_interval: Duration,

    ////////////////////////////////////////
    // State
    ////////////////////////////////////////
    /// Fake boundary clock; checked before the real one.
    fake: Boundary,

    /// Real boundary clock.
    real: Boundary,

    /// Pledge source for each round.
    generator: Generator,

    /// Rolling expectation state.
    state: State,

    ////////////////////////////////////////
    // Metrics
    ////////////////////////////////////////
    metrics: metrics::Metrics,
}

impl<E: Clock + Rng + Spawner + Metrics, C: Chain> Engine<E, C> {
    /// Creates a new engine driving `chain` on the schedule in `cfg`.
    pub fn new(context: E, chain: C, cfg: Config) -> Self {
        let metrics = metrics::Metrics::init(context.clone());
        Self {
            context,
            chain,
            validators: cfg.validators,
            timeout: cfg.timeout,
            iteration_timeout: cfg.iteration_timeout,
            poll_interval: cfg.poll_interval,
            fake: Boundary::new(cfg.epoch_length, cfg.fake_offset),
            real: Boundary::new(cfg.epoch_length, cfg.real_offset),
            generator: Generator::new(cfg.validators, cfg.sequence),
            state: State::new(cfg.validators, cfg.initial_nonce),
            metrics,
        }
    }

    /// Starts the engine, returning once the overall budget elapses (`Ok`) or
    /// a fatal condition surfaces (`Err`).
    pub fn start(mut self) -> Handle<Result<(), Error>> {
        self.context.spawn_ref()(self.run())
    }

    async fn run(mut self) -> Result<(), Error> {
        let deadline = self.context.current() + self.timeout;
        let mut shutdown = self.context.stopped();

        // The first observation anchors the rolling window: it reflects
        // whatever stakes the cluster was started with.
        let initial = self.read_pledges().await?;
        info!(?initial, "initial pledges");
        self.state.record_real(initial);

        // Issue the opening real round immediately.
        let (_, reference) = self.chain.latest().await?;
        self.submit_round(reference, true).await?;
        let mut stall_deadline = self.context.current() + self.iteration_timeout;

        loop {
            if self.context.current() >= deadline {
                info!("overall budget elapsed, run complete");
                return Ok(());
            }

            let (height, reference) = self.chain.latest().await?;
            debug!(height, "polled");
            self.metrics.height.set(height as i64);

            let fake_due = self.fake.crossed(height);
            let real_due = self.real.crossed(height);

            if fake_due || real_due {
                stall_deadline = self.context.current() + self.iteration_timeout;

                // Check the state left by the previous round before touching
                // anything. The very first boundary has no prior round to
                // compare against and is skipped.
                let live = self.read_pledges().await?;
                info!(height, ?live, "current pledges");
                if self.state.comparable() {
                    let expected = self.state.expected();
                    info!(?expected, "expected pledges");
                    verify(&live, &expected)?;
                    self.metrics.checks.inc();
                }

                // A real round takes precedence when both boundaries fire in
                // the same poll: it voids the pending fake round as part of
                // the same submission step.
                self.submit_round(reference, real_due).await?;
            } else if self.context.current() >= stall_deadline {
                return Err(Error::Stalled { height });
            }

            // Advance at most one clock per poll; a deferred real boundary
            // fires again on the next iteration.
            if fake_due {
                self.fake.advance();
            } else if real_due {
                self.real.advance();
            }

            select! {
                _ = &mut shutdown => {
                    debug!("shutdown");
                    return Ok(());
                },
                _ = self.context.sleep(self.poll_interval) => {},
            }
        }
    }

    /// Submits one staking update per validator and records the round.
    async fn submit_round(&mut self, reference: C::Digest, real: bool) -> Result<(), Error> {
        let pledges = self.generator.next(&mut self.context);
        let relay = self.relay().await?;
        for (validator, &amount) in pledges.iter().enumerate() {
            let nonce = self.state.next_nonce();
            self.chain
                .submit(relay, validator as u32, amount, nonce, reference)
                .await?;
            self.metrics.submissions.inc();
        }
        info!(real, relay, ?pledges, "submitted staking updates");

        if real {
            self.state.record_real(pledges);
            self.metrics.real_rounds.inc();
        } else {
            self.state.record_fake(pledges);
            self.metrics.fake_rounds.inc();
        }
        Ok(())
    }

    /// Reads the live pledge of every validator.
    async fn read_pledges(&mut self) -> Result<Vec<u128>, Error> {
        let mut live = Vec::with_capacity(self.validators as usize);
        for validator in 0..self.validators {
            live.push(self.chain.pledge(validator).await?);
        }
        Ok(live)
    }

    /// Picks the relay node: the numeric id embedded in an active validator
    /// account name.
    async fn relay(&mut self) -> Result<u32, Error> {
        let names = self.chain.validators().await?;
        names
            .iter()
            .find_map(|name| {
                let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
                digits.parse().ok()
            })
            .ok_or(Error::NoRelay)
    }
}
