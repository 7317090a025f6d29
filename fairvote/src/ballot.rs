use crate::*;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::{CryptoRng, RngCore};
use rayon::prelude::*;
use serde_json::Value;
use std::convert::TryFrom;

/// An encrypted ballot: one proof-carrying ciphertext per option, grouped by question
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Ballot {
    pub entries: Vec<Vec<BallotOption>>,
}

impl Ballot {
    /// Encrypt a matrix of 0/1 choices, `choices[question][option]`
    ///
    /// Every option gets its own encryption and proof, each with fresh randomness.
    pub fn encrypt<R: RngCore + CryptoRng>(
        choices: &[Vec<u8>],
        params: &GroupParameters,
        rng: &mut R,
    ) -> Result<Self, Error> {
        params.check()?;

        let mut entries = Vec::with_capacity(choices.len());
        for question in choices {
            let mut options = Vec::with_capacity(question.len());
            for choice in question {
                options.push(OrProof::create(params, *choice, rng)?);
            }
            entries.push(options);
        }

        Ok(Ballot { entries })
    }

    /// Number of options for each question
    pub fn shape(&self) -> Vec<usize> {
        self.entries.iter().map(|q| q.len()).collect()
    }

    /// Check every option proof. Returns false if any of them fails.
    pub fn verify(&self, params: &GroupParameters) -> bool {
        self.entries
            .iter()
            .all(|question| question.iter().all(|option| option.verify(params)))
    }

    /// Admission check before a ballot is folded into a tally
    ///
    /// The parameters are checked first so that an integrity problem is never reported as a
    /// bad ballot.
    pub fn validate(
        &self,
        election: &ElectionData,
        params: &GroupParameters,
    ) -> Result<(), ValidationError> {
        params.check().map_err(ValidationError::ParameterIntegrity)?;

        check_shape("ballot", &election.shape(), &self.shape())
            .map_err(ValidationError::ShapeMismatch)?;

        for (question, options) in self.entries.iter().enumerate() {
            for (option, proof) in options.iter().enumerate() {
                if !proof.verify(params) {
                    return Err(ValidationError::InvalidProof { question, option });
                }
            }
        }

        Ok(())
    }

    /// Deterministic serialization for signing: compact JSON with object keys sorted
    pub fn canonicalize(&self) -> Result<String, Error> {
        let value = serde_json::to_value(self)?;
        let mut out = String::new();
        write_canonical(&value, &mut out)?;
        Ok(out)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Verify many ballots in parallel, one result per ballot
///
/// The parameters are checked once up front. An integrity failure aborts the whole batch
/// instead of marking every ballot as invalid.
pub fn verify_ballots(ballots: &[Ballot], params: &GroupParameters) -> Result<Vec<bool>, Error> {
    params.check()?;
    Ok(ballots.par_iter().map(|b| b.verify(params)).collect())
}

fn write_canonical(value: &Value, out: &mut String) -> Result<(), Error> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(&map[key], out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }

    Ok(())
}

/// A ballot with a detached ed25519 signature over its canonical form
///
/// Who may vote, and with which key, is decided outside this crate. This type only binds a
/// ballot to a key so that it cannot be altered in transit.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SignedBallot {
    /// Hex encoded signature
    pub signature: String,

    /// Hex encoded voter public key
    pub public_key: String,

    pub vote: Ballot,
}

impl SignedBallot {
    pub fn sign(secret: &SigningKey, vote: Ballot) -> Result<Self, Error> {
        let message = vote.canonicalize()?;
        let signature = secret.sign(message.as_bytes());

        Ok(SignedBallot {
            signature: hex::encode(signature.to_bytes()),
            public_key: hex::encode(secret.verifying_key().to_bytes()),
            vote,
        })
    }

    /// Verify the signature over the canonical form of the ballot
    pub fn verify_signature(&self) -> Result<(), Error> {
        let public_key = VerifyingKey::try_from(hex::decode(&self.public_key)?.as_slice())?;
        let signature = Signature::from_slice(&hex::decode(&self.signature)?)?;
        let message = self.vote.canonicalize()?;

        Ok(public_key.verify(message.as_bytes(), &signature)?)
    }

    /// Verify the signature, then run the ballot admission checks
    pub fn validate(
        &self,
        election: &ElectionData,
        params: &GroupParameters,
    ) -> Result<(), ValidationError> {
        self.verify_signature()
            .map_err(|_| ValidationError::SignatureVerificationFailed)?;
        self.vote.validate(election, params)
    }
}
