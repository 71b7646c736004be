use crate::{Error, REWARD_UNIT};

/// Checks live pledges against expectations.
///
/// A live value divisible by [REWARD_UNIT] has accrued no reward and must
/// equal the expectation exactly. A non-divisible value has rewards in flight
/// and must lie within 10% above the expectation; anything below it, or past
/// the band, is a defect in the cluster under inspection.
pub fn verify(live: &[u128], expected: &[u128]) -> Result<(), Error> {
    for (validator, (&live, &expected)) in live.iter().zip(expected.iter()).enumerate() {
        let ok = if live % REWARD_UNIT == 0 {
            live == expected
        } else {
            expected <= live && live <= expected + expected / 10
        };
        if !ok {
            return Err(Error::Mismatch {
                validator: validator as u32,
                live,
                expected,
            });
        }
    }
    Ok(())
}
