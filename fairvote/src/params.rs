use crate::*;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};
use std::fmt;

/// Default ceiling on the number of votes a single option can receive.
///
/// The bound is part of the public election configuration: anyone re-running the
/// discrete-log recovery on a published result needs the same value.
pub const DEFAULT_VOTER_LIMIT: u64 = 5_000_000;

/// Largest accepted recovery bound. The baby-step table holds ⌈√bound⌉ group elements,
/// 100,000 of them at this limit.
pub const MAX_VOTER_LIMIT: u64 = 10_000_000_000;

const FAIRVOTE_P: &str = "16328632084933010002384055033805457329601614771185955389739167309086214800406465799038583634953752941675645562182498120750264980492381375579367675648771293800310370964745767014243638518442553823973482995267304044326777047662957480269391322789378384619428596446446984694306187644767462460965622580087564339212631775817895958409016676398975671266179637898557687317076177218843233150695157881061257053019133078545928983562221396313169622475509818442661047018436264806901023966236718367204710755935899013750306107738002364137917426595737403871114187750804346564731250609196846638183903982387884578266136503697493474682071";
const FAIRVOTE_Q: &str =
    "61329566248342901292543872769978950870633559608669337131139375508370458778917";
const FAIRVOTE_G: &str = "14887492224963187634282421537186040801304008017743492304481737382571933937568724473847106029915040150784031882206090286938661464458896494215273989547889201144857352611058572236578734319505128042602372864570426550855201448111746579871811249114781674309062693442442368697449970648232621880001709535143047913661432883287150003429802392229361583608686643243349727791976247247948618930423866180410558458272606627111270040091203073580238905303994472202930783207472394578498507764703191288249547659899997131166130259700604433891232298182348403175947450284433411265966789131024573629546048637848902243503970966798589660808533";

/// The published FairVote group (p, q, g): a 256-bit prime-order subgroup of Z_p^* for a
/// 2048-bit prime p.
pub fn fairvote_group() -> (BigUint, BigUint, BigUint) {
    // The literals are valid decimal, parsing cannot fail
    let parse = |s: &str| BigUint::parse_bytes(s.as_bytes(), 10).unwrap_or_default();
    (parse(FAIRVOTE_P), parse(FAIRVOTE_Q), parse(FAIRVOTE_G))
}

/// Public election encryption parameters
///
/// `p` is a prime modulus, `q` the prime order of the subgroup generated by `g`, and `y = g^x`
/// the election public key. Every operation in this crate takes the parameters explicitly, so
/// elections with different groups can coexist in one process.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct GroupParameters {
    #[serde(with = "crate::decimal")]
    pub p: BigUint,

    #[serde(with = "crate::decimal")]
    pub q: BigUint,

    #[serde(with = "crate::decimal")]
    pub g: BigUint,

    #[serde(with = "crate::decimal")]
    pub y: BigUint,
}

impl GroupParameters {
    /// Create parameters with no checks. Call `check` before trusting them.
    pub fn new(p: BigUint, q: BigUint, g: BigUint, y: BigUint) -> Self {
        GroupParameters { p, q, g, y }
    }

    /// Parameters over the published FairVote group with the given public key
    pub fn fairvote(y: BigUint) -> Self {
        let (p, q, g) = fairvote_group();
        GroupParameters { p, q, g, y }
    }

    /// Validate the parameters
    ///
    /// Checks the ranges of every value, that `q` divides `p - 1`, and that both `g` and `y`
    /// lie in the subgroup of order `q`. Any failure is fatal for the election: no proof built
    /// over such parameters means anything.
    pub fn check(&self) -> Result<(), Error> {
        if self.q <= BigUint::one() || self.p <= self.q {
            return Err(Error::ParameterIntegrity("q must satisfy 1 < q < p"));
        }
        if !((&self.p - 1u32) % &self.q).is_zero() {
            return Err(Error::ParameterIntegrity("q does not divide p - 1"));
        }
        if self.g <= BigUint::one() || self.g >= self.p {
            return Err(Error::ParameterIntegrity("g must satisfy 1 < g < p"));
        }
        if !self.is_element(&self.y) {
            return Err(Error::ParameterIntegrity("y must satisfy 0 < y < p"));
        }
        self.check_order()
    }

    /// Check that g and y both have order q (g^q = y^q = 1 mod p)
    pub fn check_order(&self) -> Result<(), Error> {
        if !self.g.modpow(&self.q, &self.p).is_one() {
            log::warn!("fairvote: generator is not of order q");
            return Err(Error::ParameterIntegrity(
                "g is not of order q (g^q != 1 mod p)",
            ));
        }
        if !self.y.modpow(&self.q, &self.p).is_one() {
            log::warn!("fairvote: public key outside the order-q subgroup");
            return Err(Error::ParameterIntegrity(
                "public key not in subgroup of order q (y^q != 1 mod p)",
            ));
        }
        Ok(())
    }

    /// Lift a value into the exponent: g^value mod p
    pub fn exponentiate(&self, value: &BigUint) -> BigUint {
        self.g.modpow(value, &self.p)
    }

    /// 0 < value < p
    pub fn is_element(&self, value: &BigUint) -> bool {
        !value.is_zero() && value < &self.p
    }

    /// 0 < value < p and value^q = 1 mod p, i.e. value lies in the subgroup of order q
    pub fn is_member(&self, value: &BigUint) -> bool {
        self.is_element(value) && value.modpow(&self.q, &self.p).is_one()
    }

    /// value < q
    pub fn is_scalar(&self, value: &BigUint) -> bool {
        value < &self.q
    }

    /// Multiplicative inverse mod p, if it exists
    pub fn invert(&self, value: &BigUint) -> Option<BigUint> {
        value.modinv(&self.p)
    }

    /// base^(-exp) mod p
    pub(crate) fn pow_neg(&self, base: &BigUint, exp: &BigUint) -> Option<BigUint> {
        self.invert(&base.modpow(exp, &self.p))
    }

    pub(crate) fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }
}

/// The election decryption key
///
/// Held by the election authority only. It is consumed when the tally is closed.
#[derive(Serialize, Deserialize, Clone)]
pub struct PrivateKey {
    #[serde(flatten)]
    pub params: GroupParameters,

    #[serde(with = "crate::decimal")]
    pub x: BigUint,
}

impl PrivateKey {
    /// Generate a fresh key pair over the group (p, q, g)
    pub fn generate<R: RngCore + CryptoRng>(
        p: BigUint,
        q: BigUint,
        g: BigUint,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let x = generate_private_key(&q, rng)?;
        let y = compute_public_key(&p, &g, &x);
        let params = GroupParameters::new(p, q, g, y);
        params.check()?;

        Ok(PrivateKey { params, x })
    }

    /// Generate a fresh key pair over the published FairVote group
    pub fn fairvote<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, Error> {
        let (p, q, g) = fairvote_group();
        PrivateKey::generate(p, q, g, rng)
    }

    /// Rebuild a private key, checking that x is in range and matches the public key
    pub fn from_parts(params: GroupParameters, x: BigUint) -> Result<Self, Error> {
        params.check()?;
        if x.is_zero() || !params.is_scalar(&x) {
            return Err(Error::OutOfRange("private key must lie in [1, q-1]"));
        }
        if compute_public_key(&params.p, &params.g, &x) != params.y {
            return Err(Error::ParameterIntegrity(
                "private key does not match the public key",
            ));
        }

        Ok(PrivateKey { params, x })
    }

    /// The public half of the key
    pub fn public(&self) -> &GroupParameters {
        &self.params
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("params", &self.params)
            .field("x", &"<redacted>")
            .finish()
    }
}

/// Generate a private key x uniformly in [1, q-1]
pub fn generate_private_key<R: RngCore + CryptoRng>(
    q: &BigUint,
    rng: &mut R,
) -> Result<BigUint, Error> {
    if q <= &BigUint::one() {
        return Err(Error::ParameterIntegrity("q must be greater than 1"));
    }
    Ok(random_scalar(q, rng))
}

/// Compute the public key y = g^x mod p
pub fn compute_public_key(p: &BigUint, g: &BigUint, x: &BigUint) -> BigUint {
    g.modpow(x, p)
}
