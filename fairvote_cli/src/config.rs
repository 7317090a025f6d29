use ed25519_dalek::SigningKey;
use fairvote::{DEFAULT_VOTER_LIMIT, MAX_VOTER_LIMIT};
use std::convert::TryFrom;
use std::env::var;

pub struct Config {
    /// Voter signing key. Ballots are signed when it is set.
    pub secret_key: Option<SigningKey>,

    /// Recovery bound used when closing an election
    pub voter_limit: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let secret_key = match var("FAIRVOTE_SECRET_KEY") {
            Ok(val) => Some(parse_secret_key(&val)?),
            Err(_e) => None,
        };

        let voter_limit = match var("FAIRVOTE_VOTER_LIMIT") {
            Ok(val) => parse_voter_limit(&val)?,
            Err(_e) => DEFAULT_VOTER_LIMIT,
        };

        Ok(Config {
            secret_key,
            voter_limit,
        })
    }

    /// Apply command line flags, which take precedence over the environment
    pub fn with_overrides(
        mut self,
        secret_key: Option<&str>,
        voter_limit: Option<&str>,
    ) -> Result<Self, String> {
        if let Some(val) = secret_key {
            self.secret_key = Some(parse_secret_key(val)?);
        }
        if let Some(val) = voter_limit {
            self.voter_limit = parse_voter_limit(val)?;
        }
        Ok(self)
    }
}

fn parse_secret_key(val: &str) -> Result<SigningKey, String> {
    let bytes = hex::decode(val.trim()).map_err(|e| format!("invalid secret key: {}", e))?;
    SigningKey::try_from(bytes.as_slice()).map_err(|e| format!("invalid secret key: {}", e))
}

fn parse_voter_limit(val: &str) -> Result<u64, String> {
    match val.trim().parse::<u64>() {
        Ok(limit) if limit > 0 && limit <= MAX_VOTER_LIMIT => Ok(limit),
        Ok(_) => Err(format!(
            "voter limit {:?} must lie in [1, {}]",
            val, MAX_VOTER_LIMIT
        )),
        Err(_) => Err(format!("invalid voter limit {:?}", val)),
    }
}
