//! Bounded discrete-log recovery by baby-step giant-step.
//!
//! A decrypted tally slot holds g^count. The count is at most the number of voters, so it can be
//! recovered in O(√bound) group operations with a table of ⌈√bound⌉ baby steps.

use crate::*;
use num_bigint::BigUint;
use num_integer::Roots;
use num_traits::One;
use std::collections::HashMap;

/// Precomputed baby-step table for one group and one bound
///
/// Building the table is the expensive part, so a single instance should be reused for every
/// option of a result.
pub struct DiscreteLog {
    p: BigUint,
    baby_steps: HashMap<BigUint, u64>,
    giant_step: BigUint,
    step: u64,
    bound: u64,
}

impl DiscreteLog {
    /// Fails with `OutOfRange` if `bound` exceeds `MAX_VOTER_LIMIT`
    pub fn new(params: &GroupParameters, bound: u64) -> Result<Self, Error> {
        if bound > MAX_VOTER_LIMIT {
            return Err(Error::OutOfRange("recovery bound exceeds MAX_VOTER_LIMIT"));
        }
        let step = ceil_sqrt(bound).max(1);

        let mut baby_steps = HashMap::with_capacity(step as usize);
        let mut current = BigUint::one();
        for i in 0..step {
            baby_steps.entry(current.clone()).or_insert(i);
            current = params.mul(&current, &params.g);
        }

        // g^(-step)
        let giant_step = params
            .pow_neg(&params.g, &BigUint::from(step))
            .ok_or(Error::ParameterIntegrity("g is not invertible mod p"))?;

        log::debug!("discrete log table: {} baby steps, bound {}", step, bound);

        Ok(DiscreteLog {
            p: params.p.clone(),
            baby_steps,
            giant_step,
            step,
            bound,
        })
    }

    pub fn bound(&self) -> u64 {
        self.bound
    }

    /// Find the smallest m with g^m = value
    ///
    /// Fails with `RecoveryBoundExceeded` if there is no such m below the bound.
    pub fn recover(&self, value: &BigUint) -> Result<u64, Error> {
        let mut gamma = value % &self.p;

        for j in 0..self.step {
            if let Some(i) = self.baby_steps.get(&gamma) {
                let m = j * self.step + i;
                if m < self.bound {
                    return Ok(m);
                }
                break;
            }
            gamma = (&gamma * &self.giant_step) % &self.p;
        }

        Err(Error::RecoveryBoundExceeded(self.bound))
    }
}

/// One-off recovery. Prefer `DiscreteLog` when recovering many values.
pub fn discrete_log(value: &BigUint, params: &GroupParameters, bound: u64) -> Result<u64, Error> {
    DiscreteLog::new(params, bound)?.recover(value)
}

fn ceil_sqrt(n: u64) -> u64 {
    let root = n.sqrt();
    if root * root < n {
        root + 1
    } else {
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn params() -> GroupParameters {
        PrivateKey::fairvote(&mut OsRng).unwrap().params
    }

    #[test]
    fn ceil_sqrt_values() {
        assert_eq!(ceil_sqrt(0), 0);
        assert_eq!(ceil_sqrt(1), 1);
        assert_eq!(ceil_sqrt(2), 2);
        assert_eq!(ceil_sqrt(100), 10);
        assert_eq!(ceil_sqrt(101), 11);
        assert_eq!(ceil_sqrt(5_000_000), 2237);
    }

    #[test]
    fn recover_small_counts() {
        let params = params();
        let table = DiscreteLog::new(&params, 100).unwrap();

        for m in 0..100u64 {
            let value = params.exponentiate(&BigUint::from(m));
            assert_eq!(table.recover(&value).unwrap(), m);
        }
    }

    #[test]
    fn bound_is_exclusive() {
        let params = params();
        let table = DiscreteLog::new(&params, 100).unwrap();

        let at_bound = params.exponentiate(&BigUint::from(100u32));
        assert!(matches!(
            table.recover(&at_bound),
            Err(Error::RecoveryBoundExceeded(100))
        ));

        let far_away = params.exponentiate(&BigUint::from(1_000_000u32));
        assert!(table.recover(&far_away).is_err());

        // A zero bound recovers nothing
        let empty = DiscreteLog::new(&params, 0).unwrap();
        assert!(empty.recover(&BigUint::one()).is_err());
    }

    #[test]
    fn recover_large_count() {
        let params = params();
        let table = DiscreteLog::new(&params, DEFAULT_VOTER_LIMIT).unwrap();
        assert_eq!(table.bound(), DEFAULT_VOTER_LIMIT);

        for m in &[0u64, 2236, 2237, 2238, 1_234_567, DEFAULT_VOTER_LIMIT - 1] {
            let value = params.exponentiate(&BigUint::from(*m));
            assert_eq!(table.recover(&value).unwrap(), *m);
        }

        let value = params.exponentiate(&BigUint::from(DEFAULT_VOTER_LIMIT));
        assert!(table.recover(&value).is_err());

        assert_eq!(
            discrete_log(&params.exponentiate(&BigUint::from(42u32)), &params, 1000).unwrap(),
            42
        );
    }

    #[test]
    fn oversized_bound_is_refused() {
        let params = params();

        assert!(matches!(
            DiscreteLog::new(&params, MAX_VOTER_LIMIT + 1),
            Err(Error::OutOfRange(_))
        ));
        assert!(matches!(
            DiscreteLog::new(&params, u64::MAX),
            Err(Error::OutOfRange(_))
        ));

        let sk = PrivateKey::fairvote(&mut OsRng).unwrap();
        assert!(matches!(
            decrypt_tally(&Tally::new(&[1]), sk, u64::MAX, &mut OsRng),
            Err(Error::OutOfRange(_))
        ));
    }
}
