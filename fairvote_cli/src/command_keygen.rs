use super::{exit_with, expand, print_json};
use fairvote::PrivateKey;
use rand::rngs::OsRng;
use std::fs::File;
use std::io::prelude::*;

pub fn command_keygen(matches: &clap::ArgMatches) {
    // Unwrap is OK, the arg is required
    let secret_location = expand(matches.value_of("secret").unwrap());

    let private_key =
        PrivateKey::fairvote(&mut OsRng).unwrap_or_else(|e| exit_with("keygen", e));

    let mut file = File::create(&secret_location).unwrap_or_else(|e| {
        exit_with(
            "keygen",
            format!("cannot create file {}: {}", &secret_location, e),
        )
    });

    let secret = serde_json::to_string_pretty(&private_key)
        .unwrap_or_else(|e| exit_with("keygen", e));

    file.write_all(secret.as_bytes()).unwrap_or_else(|e| {
        exit_with(
            "keygen",
            format!("unable to write secret to {}: {}", &secret_location, e),
        )
    });

    log::info!("wrote private key to {}", &secret_location);

    print_json("keygen", private_key.public());
}

pub fn command_signing_keygen(_matches: &clap::ArgMatches) {
    let (secret, public) = fairvote::generate_keypair();
    let (secret, public) = (
        hex::encode(secret.to_bytes()),
        hex::encode(public.to_bytes()),
    );

    println!("secret-key: {}", secret);
    println!("public-key: {}", public);
}
