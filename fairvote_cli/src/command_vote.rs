use super::{exit_with, print_json, read_params};
use crate::config::Config;
use fairvote::{Ballot, SignedBallot};
use rand::rngs::OsRng;

pub fn command_vote(matches: &clap::ArgMatches, config: &Config) {
    // Unwraps are OK, both these args are required
    let params = read_params("vote", matches.value_of("PARAMS").unwrap());
    let choices: Vec<Vec<u8>> = serde_json::from_str(matches.value_of("CHOICES").unwrap())
        .unwrap_or_else(|e| exit_with("vote", format!("invalid choices: {}", e)));

    let ballot =
        Ballot::encrypt(&choices, &params, &mut OsRng).unwrap_or_else(|e| exit_with("vote", e));

    match &config.secret_key {
        Some(secret_key) => {
            let signed =
                SignedBallot::sign(secret_key, ballot).unwrap_or_else(|e| exit_with("vote", e));
            print_json("vote", &signed);
        }
        None => {
            log::warn!("no signing key configured, printing an unsigned ballot");
            print_json("vote", &ballot);
        }
    }
}
