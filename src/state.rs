/// Rolling expectation state for the oracle.
///
/// Holds the confirmed real rounds, the single pending fake round, and the
/// shared nonce counter. The history grows for the lifetime of the run but
/// only the last three entries are ever consulted. Owned exclusively by the
/// control loop; there are no shared accumulators.
pub struct State {
    history: Vec<Vec<u128>>,
    fake: Vec<u128>,
    next_nonce: u64,
}

impl State {
    pub fn new(validators: u32, initial_nonce: u64) -> Self {
        Self {
            history: Vec::new(),
            fake: vec![0; validators as usize],
            next_nonce: initial_nonce,
        }
    }

    /// Records a real round: the pending fake round is void from this moment
    /// and the triplet enters the durable history.
    pub fn record_real(&mut self, pledges: Vec<u128>) {
        for slot in &mut self.fake {
            *slot = 0;
        }
        self.history.push(pledges);
    }

    /// Records a fake round, replacing any pending one. History is untouched.
    pub fn record_fake(&mut self, pledges: Vec<u128>) {
        self.fake = pledges;
    }

    /// Expected live pledge per validator: the maximum of the pending fake
    /// round and the last three real rounds (or however many exist).
    pub fn expected(&self) -> Vec<u128> {
        (0..self.fake.len())
            .map(|i| {
                let past = self
                    .history
                    .iter()
                    .rev()
                    .take(3)
                    .map(|pledges| pledges[i])
                    .max()
                    .unwrap_or(0);
                self.fake[i].max(past)
            })
            .collect()
    }

    /// Whether enough history exists to compare against. The very first
    /// observation only seeds the baseline and has no prior round to check.
    pub fn comparable(&self) -> bool {
        self.history.len() > 1
    }

    /// Takes the next nonce. Strictly increasing, shared across validators,
    /// never reused.
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.next_nonce;
        self.next_nonce += 1;
        nonce
    }
}
