/// Tracks when the per-epoch boundary at a fixed height offset is crossed.
///
/// A boundary for offset `O` within epochs of length `E` is crossed when
/// `(h + E - O) / E` exceeds the same expression evaluated at the height of
/// the previous firing. The test fires exactly once per epoch when `h` passes
/// the point where `h % E == O % E`, no matter how many blocks were produced
/// between polls.
pub struct Boundary {
    epoch_length: u64,
    offset: u64,
    last: u64,
}

impl Boundary {
    /// Creates a boundary tracker that first fires one full epoch past
    /// `offset`.
    pub fn new(epoch_length: u64, offset: u64) -> Self {
        assert!(epoch_length > 0, "epoch length must be non-zero");
        assert!(offset <= epoch_length, "offset must not exceed epoch length");
        Self {
            epoch_length,
            offset,
            last: offset,
        }
    }

    /// Number of boundary points at or below `height`.
    fn periods(&self, height: u64) -> u64 {
        (height + self.epoch_length - self.offset) / self.epoch_length
    }

    /// Whether a boundary has been crossed since the last [Boundary::advance].
    ///
    /// Pure: repeated calls with the same `height` return the same answer.
    pub fn crossed(&self, height: u64) -> bool {
        self.periods(height) > self.periods(self.last)
    }

    /// Acknowledges a firing by moving forward exactly one epoch.
    ///
    /// The cadence is never resynchronized to the polled height: if several
    /// epochs were skipped, the boundary fires again on the next poll until
    /// it has caught up.
    pub fn advance(&mut self) {
        self.last += self.epoch_length;
    }
}
