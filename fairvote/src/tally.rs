use crate::*;
use std::sync::{Mutex, PoisonError};

/// The encrypted running tally: one ciphertext per question and option
///
/// Every slot holds the homomorphic product of the ciphertexts folded into it. A fresh tally is
/// seeded with the identity (1, 1), so its slots decrypt to g^0.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Tally {
    pub entries: Vec<Vec<Ciphertext>>,
}

impl Tally {
    pub fn new(shape: &[usize]) -> Self {
        Tally {
            entries: shape
                .iter()
                .map(|options| vec![Ciphertext::identity(); *options])
                .collect(),
        }
    }

    /// Number of options for each question
    pub fn shape(&self) -> Vec<usize> {
        self.entries.iter().map(|q| q.len()).collect()
    }

    /// Fold a ballot into the tally
    ///
    /// Proofs are not checked here. Callers must only fold ballots that passed
    /// `Ballot::validate`. On a shape mismatch the tally is left untouched.
    pub fn fold(&mut self, ballot: &Ballot, params: &GroupParameters) -> Result<(), Error> {
        check_shape("ballot", &self.shape(), &ballot.shape())?;

        for (slots, options) in self.entries.iter_mut().zip(ballot.entries.iter()) {
            for (slot, option) in slots.iter_mut().zip(options.iter()) {
                *slot = slot.combine(&option.encrypted_choice, params);
            }
        }

        Ok(())
    }

    /// Combine with an independently computed partial tally over the same election
    pub fn merge(&mut self, other: &Tally, params: &GroupParameters) -> Result<(), Error> {
        check_shape("tally", &self.shape(), &other.shape())?;

        for (slots, others) in self.entries.iter_mut().zip(other.entries.iter()) {
            for (slot, other) in slots.iter_mut().zip(others.iter()) {
                *slot = slot.combine(other, params);
            }
        }

        Ok(())
    }

    /// Fold every ballot into a fresh tally of the given shape
    pub fn fold_all<'a, I>(shape: &[usize], ballots: I, params: &GroupParameters) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a Ballot>,
    {
        let mut tally = Tally::new(shape);
        for ballot in ballots {
            tally.fold(ballot, params)?;
        }
        Ok(tally)
    }
}

/// Fold a ballot into a copy of the tally, leaving the original untouched
pub fn fold(tally: &Tally, ballot: &Ballot, params: &GroupParameters) -> Result<Tally, Error> {
    let mut next = tally.clone();
    next.fold(ballot, params)?;
    Ok(next)
}

/// A tally that can be folded into from several threads
///
/// Folds are serialized by a mutex. Since folding commutes, the final tally does not depend on
/// the order in which threads get the lock.
pub struct SharedTally {
    params: GroupParameters,
    tally: Mutex<Tally>,
}

impl SharedTally {
    pub fn new(tally: Tally, params: GroupParameters) -> Self {
        SharedTally {
            params,
            tally: Mutex::new(tally),
        }
    }

    pub fn fold(&self, ballot: &Ballot) -> Result<(), Error> {
        // A fold either completes or leaves the tally untouched, so a poisoned lock is still
        // consistent.
        let mut tally = self.tally.lock().unwrap_or_else(PoisonError::into_inner);
        tally.fold(ballot, &self.params)
    }

    pub fn snapshot(&self) -> Tally {
        self.tally
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn into_inner(self) -> Tally {
        self.tally.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use rand::rngs::OsRng;
    use std::sync::Arc;

    #[test]
    fn empty_tally_is_identity() {
        let tally = Tally::new(&[2, 1]);
        assert_eq!(tally.entries.len(), 2);
        assert_eq!(tally.entries[0], vec![Ciphertext::identity(); 2]);
        assert_eq!(
            serde_json::to_string(&Tally::new(&[1])).unwrap(),
            r#"{"entries":[[{"alfa":"1","beta":"1"}]]}"#
        );
    }

    #[test]
    fn fold_order_does_not_matter() {
        let sk = PrivateKey::fairvote(&mut OsRng).unwrap();
        let params = sk.public();

        let ballots: Vec<Ballot> = [[1u8, 0], [0, 1], [1, 0]]
            .iter()
            .map(|c| Ballot::encrypt(&[c.to_vec()], params, &mut OsRng).unwrap())
            .collect();

        let forward = Tally::fold_all(&[2], &ballots, params).unwrap();
        let backward = Tally::fold_all(&[2], ballots.iter().rev(), params).unwrap();
        let shuffled =
            Tally::fold_all(&[2], [&ballots[1], &ballots[2], &ballots[0]].iter().copied(), params)
                .unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);

        // The slots decrypt to g^count
        let first = decrypt(&forward.entries[0][0], &sk).unwrap();
        let second = decrypt(&forward.entries[0][1], &sk).unwrap();
        assert_eq!(first, params.exponentiate(&BigUint::from(2u32)));
        assert_eq!(second, params.g);
    }

    #[test]
    fn merge_matches_sequential_fold() {
        let params = PrivateKey::fairvote(&mut OsRng).unwrap().params;
        let ballots: Vec<Ballot> = (0..4)
            .map(|i| Ballot::encrypt(&[vec![i % 2, 1 - i % 2]], &params, &mut OsRng).unwrap())
            .collect();

        let all = Tally::fold_all(&[2], &ballots, &params).unwrap();

        let mut left = Tally::fold_all(&[2], &ballots[..1], &params).unwrap();
        let right = Tally::fold_all(&[2], &ballots[1..], &params).unwrap();
        left.merge(&right, &params).unwrap();
        assert_eq!(left, all);

        assert!(left.merge(&Tally::new(&[3]), &params).is_err());
    }

    #[test]
    fn shape_mismatch_leaves_tally_untouched() {
        let params = PrivateKey::fairvote(&mut OsRng).unwrap().params;
        let tally = Tally::new(&[2, 2]);

        let ballot = Ballot::encrypt(&[vec![1, 0]], &params, &mut OsRng).unwrap();
        let mut copy = tally.clone();
        assert!(copy.fold(&ballot, &params).is_err());
        assert_eq!(copy, tally);

        let ballot = Ballot::encrypt(&[vec![1, 0], vec![0, 1, 0]], &params, &mut OsRng).unwrap();
        assert!(matches!(
            fold(&tally, &ballot, &params),
            Err(Error::BallotShape { .. })
        ));
    }

    #[test]
    fn concurrent_folds() {
        let params = PrivateKey::fairvote(&mut OsRng).unwrap().params;
        let ballots: Vec<Ballot> = (0..8)
            .map(|i| Ballot::encrypt(&[vec![(i % 3 == 0) as u8]], &params, &mut OsRng).unwrap())
            .collect();

        let shared = Arc::new(SharedTally::new(Tally::new(&[1]), params.clone()));
        let handles: Vec<_> = ballots
            .chunks(2)
            .map(|chunk| {
                let shared = Arc::clone(&shared);
                let chunk = chunk.to_vec();
                std::thread::spawn(move || {
                    for ballot in &chunk {
                        shared.fold(ballot).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let expected = Tally::fold_all(&[1], &ballots, &params).unwrap();
        assert_eq!(shared.snapshot(), expected);
    }
}
