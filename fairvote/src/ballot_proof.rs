//! Disjunctive proof that a ciphertext encrypts g^0 or g^1
//!
//! The prover runs one honest Schnorr-style branch for the choice it actually encrypted and
//! simulates the other branch by picking the challenge and response first and solving for the
//! commitment. Both commitments are bound by a single Fiat-Shamir hash h, and the honest
//! challenge is fixed as h minus the simulated one, so a prover who can open neither branch
//! cannot make c0 + c1 = h.
//!
//! Slot 0 always carries the "plaintext is g^0" claim and slot 1 the "plaintext is g^1" claim,
//! whichever of them is real.

use crate::*;
use num_bigint::BigUint;
use num_traits::One;
use rand_core::{CryptoRng, RngCore};

/// A single encrypted 0/1 answer with its proof of validity
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct OrProof {
    #[serde(with = "crate::decimal")]
    pub c0: BigUint,

    #[serde(with = "crate::decimal")]
    pub s0: BigUint,

    #[serde(with = "crate::decimal")]
    pub c1: BigUint,

    #[serde(with = "crate::decimal")]
    pub s1: BigUint,

    pub encrypted_choice: Ciphertext,
}

/// One option of a ballot
pub type BallotOption = OrProof;

struct Commitment {
    a: BigUint,
    b: BigUint,
}

enum Branch {
    Honest {
        nonce: BigUint,
        commitment: Commitment,
    },
    Simulated {
        commitment: Commitment,
        challenge: BigUint,
        response: BigUint,
    },
}

impl Branch {
    /// A = g^t, B = y^t
    fn honest<R: RngCore + CryptoRng>(params: &GroupParameters, rng: &mut R) -> Self {
        let nonce = random_scalar(&params.q, rng);
        let commitment = Commitment {
            a: params.g.modpow(&nonce, &params.p),
            b: params.y.modpow(&nonce, &params.p),
        };
        Branch::Honest { nonce, commitment }
    }

    fn simulated<R: RngCore + CryptoRng>(
        params: &GroupParameters,
        ciphertext: &Ciphertext,
        message: &BigUint,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let challenge = random_scalar(&params.q, rng);
        let response = random_scalar(&params.q, rng);
        let commitment = back_solve(params, ciphertext, message, &challenge, &response)
            .ok_or(Error::OutOfRange("ciphertext components must lie in (0, p)"))?;

        Ok(Branch::Simulated {
            commitment,
            challenge,
            response,
        })
    }

    fn commitment(&self) -> &Commitment {
        match self {
            Branch::Honest { commitment, .. } => commitment,
            Branch::Simulated { commitment, .. } => commitment,
        }
    }

    fn simulated_challenge(&self) -> Option<&BigUint> {
        match self {
            Branch::Honest { .. } => None,
            Branch::Simulated { challenge, .. } => Some(challenge),
        }
    }

    /// Produce the (challenge, response) pair of this slot
    fn finish(self, honest_challenge: &BigUint, r: &BigUint, q: &BigUint) -> (BigUint, BigUint) {
        match self {
            Branch::Honest { nonce, .. } => {
                let response = (nonce + honest_challenge * r) % q;
                (honest_challenge.clone(), response)
            }
            Branch::Simulated {
                challenge,
                response,
                ..
            } => (challenge, response),
        }
    }
}

/// Recompute a commitment from its challenge and response:
/// A = g^s * alfa^-c, B = y^s * (beta / m)^-c
fn back_solve(
    params: &GroupParameters,
    ciphertext: &Ciphertext,
    message: &BigUint,
    challenge: &BigUint,
    response: &BigUint,
) -> Option<Commitment> {
    let p = &params.p;

    let a = params.mul(
        &params.g.modpow(response, p),
        &params.pow_neg(&ciphertext.alfa, challenge)?,
    );

    let quotient = params.mul(&ciphertext.beta, &params.invert(message)?);
    let b = params.mul(
        &params.y.modpow(response, p),
        &params.pow_neg(&quotient, challenge)?,
    );

    Some(Commitment { a, b })
}

fn challenge(params: &GroupParameters, slots: [&Commitment; 2], messages: &[BigUint; 2]) -> BigUint {
    hash_to_scalar(
        &params.q,
        &[
            &slots[0].a,
            &slots[0].b,
            &slots[1].a,
            &slots[1].b,
            &messages[0],
            &messages[1],
        ],
    )
}

/// The canonical messages m0 = g^0 and m1 = g^1
fn messages(params: &GroupParameters) -> [BigUint; 2] {
    [BigUint::one() % &params.p, params.g.clone() % &params.p]
}

impl OrProof {
    /// Encrypt `choice` (0 or 1) and prove that the ciphertext holds 0 or 1
    pub fn create<R: RngCore + CryptoRng>(
        params: &GroupParameters,
        choice: u8,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let encryption = encrypt_choice(params, choice, rng)?;
        OrProof::prove(params, &encryption, choice, rng)
    }

    /// Prove that an existing encryption of `choice` holds 0 or 1
    ///
    /// `choice` must be the value that was actually encrypted, otherwise the resulting proof
    /// will not verify.
    pub fn prove<R: RngCore + CryptoRng>(
        params: &GroupParameters,
        encryption: &Encryption,
        choice: u8,
        rng: &mut R,
    ) -> Result<Self, Error> {
        if choice > 1 {
            return Err(Error::InvalidChoice(choice));
        }
        params.check_order()?;

        let messages = messages(params);
        if !messages.iter().all(|m| params.is_element(m)) {
            return Err(Error::ParameterIntegrity("m0 and m1 must lie in (0, p)"));
        }

        let ciphertext = &encryption.ciphertext;
        let real = choice as usize;
        let honest = Branch::honest(params, rng);
        let simulated = Branch::simulated(params, ciphertext, &messages[1 - real], rng)?;

        let slots = if real == 0 {
            [honest, simulated]
        } else {
            [simulated, honest]
        };

        let h = challenge(
            params,
            [slots[0].commitment(), slots[1].commitment()],
            &messages,
        );
        let q = &params.q;
        let simulated_sum: BigUint = slots.iter().filter_map(Branch::simulated_challenge).sum();
        let honest_challenge = (h + q - simulated_sum % q) % q;

        let r = encryption.randomness();
        let [slot0, slot1] = slots;
        let (c0, s0) = slot0.finish(&honest_challenge, r, q);
        let (c1, s1) = slot1.finish(&honest_challenge, r, q);

        Ok(OrProof {
            c0,
            s0,
            c1,
            s1,
            encrypted_choice: ciphertext.clone(),
        })
    }

    /// Verify the proof
    ///
    /// Never fails: a malformed or forged proof, or parameters that fail the subgroup checks,
    /// simply yield `false`.
    pub fn verify(&self, params: &GroupParameters) -> bool {
        let q = &params.q;
        let ciphertext = &self.encrypted_choice;

        if !ciphertext.is_valid(params) {
            log::debug!("fairvote: ballot proof rejected, ciphertext outside the order-q subgroup");
            return false;
        }
        if ![&self.c0, &self.s0, &self.c1, &self.s1]
            .iter()
            .all(|v| params.is_scalar(v))
        {
            log::debug!("fairvote: ballot proof rejected, scalar not reduced mod q");
            return false;
        }
        if params.check_order().is_err() {
            return false;
        }

        let messages = messages(params);
        let slot0 = back_solve(params, ciphertext, &messages[0], &self.c0, &self.s0);
        let slot1 = back_solve(params, ciphertext, &messages[1], &self.c1, &self.s1);
        let (slot0, slot1) = match (slot0, slot1) {
            (Some(slot0), Some(slot1)) => (slot0, slot1),
            _ => return false,
        };

        let h = challenge(params, [&slot0, &slot1], &messages);
        let valid = (&self.c0 + &self.c1) % q == h;
        if !valid {
            log::debug!("fairvote: ballot proof rejected, challenge mismatch");
        }
        valid
    }
}
