use std::time::Duration;

/// Configuration for the [`Engine`](crate::Engine).
pub struct Config {
    /// Number of validators driven by the engine.
    pub validators: u32,

    /// Number of blocks per epoch.
    pub epoch_length: u64,

    /// Height offset within each epoch at which a fake round is due.
    ///
    /// Must not exceed `epoch_length`.
    pub fake_offset: u64,

    /// Height offset within each epoch at which a real round is due.
    ///
    /// Must not exceed `epoch_length`.
    pub real_offset: u64,

    /// First nonce to attach to a submission. The counter is shared across
    /// validators and incremented once per submission.
    pub initial_nonce: u64,

    /// Overall wall-clock budget for the run. Reaching it ends the run
    /// successfully.
    pub timeout: Duration,

    /// Budget between boundary firings. Exceeding it aborts the run: the
    /// cluster has stalled.
    pub iteration_timeout: Duration,

    /// Interval between height polls.
    pub poll_interval: Duration,

    /// Pledge triplets to submit before falling back to random synthesis.
    pub sequence: Vec<Vec<u128>>,
}
