use crate::*;
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};
use rayon::prelude::*;

/// Proof that `plaintext` is the correct decryption of `encrypted_message` under the key behind
/// the public parameters, without revealing the private key
///
/// This is a Chaum-Pedersen proof that log_g(y) = log_alfa(beta / plaintext), made
/// non-interactive with the challenge c = H(g, y, alfa, beta, plaintext, A, B).
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct KptProof {
    #[serde(with = "crate::decimal")]
    pub c: BigUint,

    #[serde(with = "crate::decimal")]
    pub z: BigUint,

    pub encrypted_message: Ciphertext,
}

impl KptProof {
    /// Decrypt `ciphertext` and prove the decryption. Returns the proof and the plaintext.
    pub fn create<R: RngCore + CryptoRng>(
        private_key: &PrivateKey,
        ciphertext: &Ciphertext,
        rng: &mut R,
    ) -> Result<(KptProof, BigUint), Error> {
        let params = private_key.public();
        let plaintext = decrypt(ciphertext, private_key)?;

        let nonce = random_scalar(&params.q, rng);
        let a = params.g.modpow(&nonce, &params.p);
        let b = ciphertext.alfa.modpow(&nonce, &params.p);

        let c = challenge(params, ciphertext, &plaintext, &a, &b);
        let z = (nonce + &c * &private_key.x) % &params.q;

        let proof = KptProof {
            c,
            z,
            encrypted_message: ciphertext.clone(),
        };

        Ok((proof, plaintext))
    }

    /// Check the proof against a claimed plaintext
    pub fn verify(&self, params: &GroupParameters, plaintext: &BigUint) -> bool {
        let ct = &self.encrypted_message;

        if !ct.is_valid(params)
            || !params.is_member(plaintext)
            || !params.is_scalar(&self.c)
            || !params.is_scalar(&self.z)
        {
            log::debug!("decryption proof rejected: value outside the order-q subgroup");
            return false;
        }
        if params.check_order().is_err() {
            return false;
        }

        let recomputed = (|| {
            // A = g^z * y^-c
            let a = params.mul(
                &params.g.modpow(&self.z, &params.p),
                &params.pow_neg(&params.y, &self.c)?,
            );

            // B = alfa^z * (beta / plaintext)^-c
            let shared = params.mul(&ct.beta, &params.invert(plaintext)?);
            let b = params.mul(
                &ct.alfa.modpow(&self.z, &params.p),
                &params.pow_neg(&shared, &self.c)?,
            );

            Some(challenge(params, ct, plaintext, &a, &b))
        })();

        match recomputed {
            Some(c) if c == self.c => true,
            _ => {
                log::debug!("decryption proof rejected: challenge mismatch");
                false
            }
        }
    }
}

fn challenge(
    params: &GroupParameters,
    ciphertext: &Ciphertext,
    plaintext: &BigUint,
    a: &BigUint,
    b: &BigUint,
) -> BigUint {
    hash_to_scalar(
        &params.q,
        &[
            &params.g,
            &params.y,
            &ciphertext.alfa,
            &ciphertext.beta,
            plaintext,
            a,
            b,
        ],
    )
}

/// The opened tally slot of a single option
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct DecryptedOption {
    /// Number of votes
    #[serde(with = "crate::decimal::count")]
    pub original_value: u64,

    /// g^original_value
    #[serde(with = "crate::decimal")]
    pub decrypted_value: BigUint,

    /// The tally ciphertext that was decrypted
    pub encrypted_value: Ciphertext,

    pub proof: KptProof,
}

impl DecryptedOption {
    pub fn verify(&self, params: &GroupParameters) -> bool {
        if self.proof.encrypted_message != self.encrypted_value {
            log::debug!("decrypted option rejected: proof is for another ciphertext");
            return false;
        }
        if params.exponentiate(&BigUint::from(self.original_value)) != self.decrypted_value {
            log::debug!("decrypted option rejected: count does not match the decrypted value");
            return false;
        }
        self.proof.verify(params, &self.decrypted_value)
    }
}

/// The published outcome of an election, question by question and option by option
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ElectionResult {
    pub entries: Vec<Vec<DecryptedOption>>,
}

impl ElectionResult {
    /// Check every decryption proof and every recovered count
    ///
    /// Parameters that fail their integrity checks are an error, not a rejected result.
    pub fn verify(&self, params: &GroupParameters) -> Result<bool, Error> {
        params.check()?;

        let options: Vec<&DecryptedOption> = self.entries.iter().flatten().collect();
        Ok(options.par_iter().all(|option| option.verify(params)))
    }

    /// Check that this result opens `tally`, then verify it
    pub fn verify_against(
        &self,
        tally: &Tally,
        params: &GroupParameters,
    ) -> Result<bool, Error> {
        params.check()?;

        if self.shape() != tally.shape() {
            log::debug!("result rejected: shape does not match the tally");
            return Ok(false);
        }

        let opens_tally = self
            .entries
            .iter()
            .flatten()
            .zip(tally.entries.iter().flatten())
            .all(|(option, slot)| &option.encrypted_value == slot);
        if !opens_tally {
            log::debug!("result rejected: ciphertexts differ from the tally");
            return Ok(false);
        }

        self.verify(params)
    }

    /// Number of options for each question
    pub fn shape(&self) -> Vec<usize> {
        self.entries.iter().map(|q| q.len()).collect()
    }

    /// The vote counts, `counts()[question][option]`
    pub fn counts(&self) -> Vec<Vec<u64>> {
        self.entries
            .iter()
            .map(|q| q.iter().map(|o| o.original_value).collect())
            .collect()
    }
}

/// Close an election: decrypt every tally slot, prove each decryption and recover the counts
///
/// The private key is consumed; once the result is published it has no further use.
pub fn decrypt_tally<R: RngCore + CryptoRng>(
    tally: &Tally,
    private_key: PrivateKey,
    bound: u64,
    rng: &mut R,
) -> Result<ElectionResult, Error> {
    let params = private_key.public();
    params.check()?;

    let table = DiscreteLog::new(params, bound)?;

    let mut entries = Vec::with_capacity(tally.entries.len());
    for slots in &tally.entries {
        let mut options = Vec::with_capacity(slots.len());
        for slot in slots {
            if !slot.is_valid(params) {
                return Err(Error::OutOfRange(
                    "tally ciphertext outside the order-q subgroup",
                ));
            }
            let (proof, plaintext) = KptProof::create(&private_key, slot, rng)?;
            let count = table.recover(&plaintext)?;

            options.push(DecryptedOption {
                original_value: count,
                decrypted_value: plaintext,
                encrypted_value: slot.clone(),
                proof,
            });
        }
        entries.push(options);
    }

    log::info!(
        "decrypted tally: {} questions, {} options",
        entries.len(),
        entries.iter().map(Vec::len).sum::<usize>()
    );

    Ok(ElectionResult { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn decryption_proofs() {
        let sk = PrivateKey::fairvote(&mut OsRng).unwrap();
        let params = sk.public().clone();

        let message = params.exponentiate(&BigUint::from(7u32));
        let ct = encrypt(&params, &message, &mut OsRng).unwrap().into_ciphertext();

        let (proof, plaintext) = KptProof::create(&sk, &ct, &mut OsRng).unwrap();
        assert_eq!(plaintext, message);
        assert!(proof.verify(&params, &plaintext));

        // Wrong plaintext
        assert!(!proof.verify(&params, &params.exponentiate(&BigUint::from(8u32))));
        assert!(!proof.verify(&params, &BigUint::from(0u32)));
        assert!(!proof.verify(&params, &params.p));

        // Tampered proof
        let mut bad = proof.clone();
        bad.z = (&bad.z + 1u32) % &params.q;
        assert!(!bad.verify(&params, &plaintext));

        let mut bad = proof.clone();
        bad.c = &bad.c + &params.q;
        assert!(!bad.verify(&params, &plaintext));

        let mut bad = proof.clone();
        bad.encrypted_message.beta = params.mul(&bad.encrypted_message.beta, &params.g);
        assert!(!bad.verify(&params, &plaintext));

        // Another key cannot produce a proof for these parameters
        let other = PrivateKey::fairvote(&mut OsRng).unwrap();
        let other_ct = encrypt(other.public(), &message, &mut OsRng)
            .unwrap()
            .into_ciphertext();
        let (other_proof, other_plaintext) = KptProof::create(&other, &other_ct, &mut OsRng).unwrap();
        assert!(other_proof.verify(other.public(), &other_plaintext));
        assert!(!other_proof.verify(&params, &other_plaintext));
    }

    #[test]
    fn close_and_audit() {
        let sk = PrivateKey::fairvote(&mut OsRng).unwrap();
        let params = sk.public().clone();

        let ballots: Vec<Ballot> = [[1u8, 0, 0], [0, 0, 1], [1, 0, 0]]
            .iter()
            .map(|c| Ballot::encrypt(&[c.to_vec()], &params, &mut OsRng).unwrap())
            .collect();
        let tally = Tally::fold_all(&[3], &ballots, &params).unwrap();

        let result = decrypt_tally(&tally, sk, DEFAULT_VOTER_LIMIT, &mut OsRng).unwrap();
        assert_eq!(result.counts(), vec![vec![2, 0, 1]]);
        assert!(result.verify(&params).unwrap());
        assert!(result.verify_against(&tally, &params).unwrap());

        // Published as JSON and checked by someone else
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""original_value":"2""#));
        let published: ElectionResult = serde_json::from_str(&json).unwrap();
        assert!(published.verify_against(&tally, &params).unwrap());

        // A result for another tally
        let other = Tally::fold_all(&[3], &ballots[..2], &params).unwrap();
        assert!(!result.verify_against(&other, &params).unwrap());
        assert!(!result.verify_against(&Tally::new(&[2]), &params).unwrap());

        // Inflated count
        let mut forged = result.clone();
        forged.entries[0][1].original_value = 1;
        assert!(!forged.verify(&params).unwrap());

        // Swapped slots
        let mut forged = result;
        forged.entries[0].swap(0, 2);
        assert!(forged.verify(&params).unwrap());
        assert!(!forged.verify_against(&tally, &params).unwrap());

        // Broken parameters are an error, not a rejected result
        let mut bad_params = params.clone();
        bad_params.g = BigUint::from(2u32);
        assert!(matches!(
            forged.verify(&bad_params),
            Err(Error::ParameterIntegrity(_))
        ));
        assert!(matches!(
            forged.verify_against(&tally, &bad_params),
            Err(Error::ParameterIntegrity(_))
        ));
    }

    #[test]
    fn recovery_bound() {
        let sk = PrivateKey::fairvote(&mut OsRng).unwrap();
        let params = sk.public().clone();

        let ballots: Vec<Ballot> = (0..3)
            .map(|_| Ballot::encrypt(&[vec![1]], &params, &mut OsRng).unwrap())
            .collect();
        let tally = Tally::fold_all(&[1], &ballots, &params).unwrap();

        assert!(matches!(
            decrypt_tally(&tally, sk.clone(), 3, &mut OsRng),
            Err(Error::RecoveryBoundExceeded(3))
        ));

        let result = decrypt_tally(&tally, sk, 4, &mut OsRng).unwrap();
        assert_eq!(result.counts(), vec![vec![3]]);
    }

    #[test]
    fn tally_outside_the_subgroup_is_an_error() {
        let sk = PrivateKey::fairvote(&mut OsRng).unwrap();
        let params = sk.public().clone();
        let minus_one = &params.p - 1u32;

        let ballot = Ballot::encrypt(&[vec![1, 0]], &params, &mut OsRng).unwrap();
        let mut tally = Tally::fold_all(&[2], &[ballot], &params).unwrap();
        tally.entries[0][0].beta = params.mul(&tally.entries[0][0].beta, &minus_one);

        assert!(matches!(
            decrypt_tally(&tally, sk.clone(), DEFAULT_VOTER_LIMIT, &mut OsRng),
            Err(Error::OutOfRange(_))
        ));

        // A decryption proof for -g over such a ciphertext never verifies
        let (proof, plaintext) = KptProof::create(&sk, &tally.entries[0][0], &mut OsRng).unwrap();
        assert!(!params.is_member(&plaintext));
        assert!(!proof.verify(&params, &plaintext));

        // Nor does one claiming -plaintext for an honest ciphertext
        let honest = tally.entries[0][1].clone();
        let (proof, plaintext) = KptProof::create(&sk, &honest, &mut OsRng).unwrap();
        assert!(proof.verify(&params, &plaintext));
        assert!(!proof.verify(&params, &params.mul(&plaintext, &minus_one)));
    }

    #[test]
    fn malformed_tally_is_an_error() {
        let sk = PrivateKey::fairvote(&mut OsRng).unwrap();
        let mut tally = Tally::new(&[1]);
        tally.entries[0][0].alfa = BigUint::from(0u32);

        assert!(decrypt_tally(&tally, sk, 10, &mut OsRng).is_err());
    }
}
