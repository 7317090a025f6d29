use ed25519_dalek::{SigningKey, VerifyingKey};
use num_bigint::{BigUint, RandBigInt};
use rand_core::{CryptoRng, RngCore};

/// Draw a scalar uniformly from [1, q-1]. Requires q > 1.
pub fn random_scalar<R: RngCore + CryptoRng>(q: &BigUint, rng: &mut R) -> BigUint {
    rng.gen_biguint_range(&BigUint::from(1u32), q)
}

/// Generate an ed25519 key pair for signing ballots
pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
    let mut csprng = rand::rngs::OsRng {};
    let secret = SigningKey::generate(&mut csprng);
    let public = secret.verifying_key();
    (secret, public)
}
