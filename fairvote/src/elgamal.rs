use crate::*;
use num_bigint::BigUint;
use num_traits::One;
use rand_core::{CryptoRng, RngCore};

/// An exponential ElGamal ciphertext (alfa, beta) = (g^r, g^m * y^r) mod p
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Ciphertext {
    #[serde(with = "crate::decimal")]
    pub alfa: BigUint,

    #[serde(with = "crate::decimal")]
    pub beta: BigUint,
}

impl Ciphertext {
    pub fn new(alfa: BigUint, beta: BigUint) -> Self {
        Ciphertext { alfa, beta }
    }

    /// The multiplicative identity (1, 1), an encryption of zero with r = 0
    pub fn identity() -> Self {
        Ciphertext {
            alfa: BigUint::one(),
            beta: BigUint::one(),
        }
    }

    /// Homomorphic addition of the plaintexts: component-wise product mod p
    pub fn combine(&self, other: &Ciphertext, params: &GroupParameters) -> Ciphertext {
        Ciphertext {
            alfa: params.mul(&self.alfa, &other.alfa),
            beta: params.mul(&self.beta, &other.beta),
        }
    }

    /// Both components lie in (0, p)
    pub fn is_well_formed(&self, params: &GroupParameters) -> bool {
        params.is_element(&self.alfa) && params.is_element(&self.beta)
    }

    /// Both components lie in the subgroup of order q
    ///
    /// Anything outside it, such as beta * (p - 1), decrypts to a value with no discrete log
    /// base g.
    pub fn is_valid(&self, params: &GroupParameters) -> bool {
        params.is_member(&self.alfa) && params.is_member(&self.beta)
    }
}

/// A freshly produced ciphertext together with its encryption randomness
///
/// The randomness is only needed to build the ballot proof; it is never serialized.
pub struct Encryption {
    pub ciphertext: Ciphertext,
    r: BigUint,
}

impl Encryption {
    pub fn randomness(&self) -> &BigUint {
        &self.r
    }

    pub fn into_ciphertext(self) -> Ciphertext {
        self.ciphertext
    }
}

/// Encrypt a group element m, 0 < m < p
///
/// For exponential ElGamal the caller lifts the plaintext with `GroupParameters::exponentiate`
/// first (or uses `encrypt_choice`).
pub fn encrypt<R: RngCore + CryptoRng>(
    params: &GroupParameters,
    m: &BigUint,
    rng: &mut R,
) -> Result<Encryption, Error> {
    if !params.is_element(m) {
        return Err(Error::OutOfRange("plaintext must lie in (0, p)"));
    }

    let r = random_scalar(&params.q, rng);
    let alfa = params.g.modpow(&r, &params.p);
    let beta = params.mul(m, &params.y.modpow(&r, &params.p));

    Ok(Encryption {
        ciphertext: Ciphertext { alfa, beta },
        r,
    })
}

/// Encrypt a 0/1 choice in the exponent: Enc(g^choice)
pub fn encrypt_choice<R: RngCore + CryptoRng>(
    params: &GroupParameters,
    choice: u8,
    rng: &mut R,
) -> Result<Encryption, Error> {
    if choice > 1 {
        return Err(Error::InvalidChoice(choice));
    }
    encrypt(params, &params.exponentiate(&BigUint::from(choice)), rng)
}

/// Decrypt to the plaintext group element: beta * (alfa^x)^-1 mod p
///
/// For exponential ElGamal the result is g^m; use `DiscreteLog` to recover m.
pub fn decrypt(ciphertext: &Ciphertext, private_key: &PrivateKey) -> Result<BigUint, Error> {
    let params = private_key.public();
    if !ciphertext.is_well_formed(params) {
        return Err(Error::OutOfRange("ciphertext components must lie in (0, p)"));
    }

    let shared = ciphertext.alfa.modpow(&private_key.x, &params.p);
    let shared_inv = params
        .invert(&shared)
        .ok_or(Error::ParameterIntegrity("p is not prime"))?;

    Ok(params.mul(&ciphertext.beta, &shared_inv))
}
