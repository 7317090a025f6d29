use super::{exit_with, print_json, read_json};
use crate::config::Config;
use fairvote::{decrypt_tally, PrivateKey, Tally};
use rand::rngs::OsRng;

pub fn command_close(matches: &clap::ArgMatches, config: &Config) {
    // Unwraps are OK, both these args are required
    let secret_location = matches.value_of("SECRET").unwrap();
    let private_key: PrivateKey = read_json("close", secret_location);
    let tally: Tally = read_json("close", matches.value_of("TALLY").unwrap());

    // Deserialization does not check the key against its public half
    let private_key = PrivateKey::from_parts(private_key.params, private_key.x)
        .unwrap_or_else(|e| exit_with("close", format!("{}: {}", secret_location, e)));

    let result = decrypt_tally(&tally, private_key, config.voter_limit, &mut OsRng)
        .unwrap_or_else(|e| exit_with("close", e));

    print_json("close", &result);
}
