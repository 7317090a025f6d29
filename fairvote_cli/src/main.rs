use clap::{App, AppSettings, Arg, SubCommand};
use num_enum::TryFromPrimitive;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::TryFrom;
use std::fmt::Display;

mod command_audit;
mod command_close;
mod command_keygen;
mod command_tally;
mod command_verify;
mod command_vote;
mod config;

use command_audit::command_audit;
use command_close::command_close;
use command_keygen::{command_keygen, command_signing_keygen};
use command_tally::command_tally;
use command_verify::command_verify;
use command_vote::command_vote;
use config::Config;

#[derive(TryFromPrimitive, PartialEq, Copy, Clone, Debug)]
#[repr(u8)]
enum Verbosity {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Verbosity {
    fn level_filter(self) -> log::LevelFilter {
        match self {
            Verbosity::Silent => log::LevelFilter::Off,
            Verbosity::Error => log::LevelFilter::Error,
            Verbosity::Warn => log::LevelFilter::Warn,
            Verbosity::Info => log::LevelFilter::Info,
            Verbosity::Debug => log::LevelFilter::Debug,
        }
    }
}

fn main() {
    let matches = App::new("FairVote CLI")
        .version("1.0")
        .about("Runs and audits FairVote elections")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("Only print errors"),
        )
        .arg(
            Arg::with_name("secret-key")
                .long("secret-key")
                .takes_value(true)
                .help("Hex encoded ed25519 signing key - can also be set with FAIRVOTE_SECRET_KEY"),
        )
        .arg(
            Arg::with_name("voter-limit")
                .long("voter-limit")
                .takes_value(true)
                .help("Highest number of votes an option can receive - can also be set with FAIRVOTE_VOTER_LIMIT"),
        )
        .subcommand(
            SubCommand::with_name("keygen")
                .about("Generate an election key pair")
                .arg(
                    Arg::with_name("secret")
                        .long("secret")
                        .required(true)
                        .takes_value(true)
                        .help("File to write the private key to"),
                ),
        )
        .subcommand(
            SubCommand::with_name("signing-keygen").about("Generate a voter signing key pair"),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Encrypt a ballot")
                .arg(
                    Arg::with_name("PARAMS")
                        .index(1)
                        .required(true)
                        .help("Public election parameters in JSON format"),
                )
                .arg(
                    Arg::with_name("CHOICES")
                        .index(2)
                        .required(true)
                        .help("Choices per question and option, for example [[0,1],[1,0,0]]"),
                ),
        )
        .subcommand(
            SubCommand::with_name("verify")
                .about("Verify ballots")
                .arg(
                    Arg::with_name("PARAMS")
                        .index(1)
                        .required(true)
                        .help("Public election parameters in JSON format"),
                )
                .arg(
                    Arg::with_name("BALLOT")
                        .index(2)
                        .required(true)
                        .multiple(true)
                        .help("Ballot files, signed or unsigned"),
                ),
        )
        .subcommand(
            SubCommand::with_name("tally")
                .about("Validate ballots and fold them into an encrypted tally")
                .arg(
                    Arg::with_name("PARAMS")
                        .index(1)
                        .required(true)
                        .help("Public election parameters in JSON format"),
                )
                .arg(
                    Arg::with_name("ELECTION")
                        .index(2)
                        .required(true)
                        .help("Election questions and options in JSON format"),
                )
                .arg(
                    Arg::with_name("BALLOT")
                        .index(3)
                        .multiple(true)
                        .help("Ballot files, signed or unsigned"),
                ),
        )
        .subcommand(
            SubCommand::with_name("close")
                .about("Decrypt a tally and prove the result")
                .arg(
                    Arg::with_name("SECRET")
                        .index(1)
                        .required(true)
                        .help("Private key file written by keygen"),
                )
                .arg(
                    Arg::with_name("TALLY")
                        .index(2)
                        .required(true)
                        .help("Encrypted tally in JSON format"),
                ),
        )
        .subcommand(
            SubCommand::with_name("audit")
                .about("Verify a published election result")
                .arg(
                    Arg::with_name("PARAMS")
                        .index(1)
                        .required(true)
                        .help("Public election parameters in JSON format"),
                )
                .arg(
                    Arg::with_name("RESULT")
                        .index(2)
                        .required(true)
                        .help("Election result in JSON format"),
                )
                .arg(
                    Arg::with_name("tally")
                        .long("tally")
                        .takes_value(true)
                        .help("Also check that the result opens this tally"),
                ),
        )
        .get_matches();

    let verbosity = if matches.is_present("quiet") {
        Verbosity::Error
    } else {
        let level = 2 + matches.occurrences_of("v").min(2) as u8;
        Verbosity::try_from(level).unwrap_or(Verbosity::Debug)
    };

    env_logger::Builder::new()
        .filter_level(verbosity.level_filter())
        .parse_default_env()
        .init();

    let config = Config::from_env().unwrap_or_else(|e| exit_with("config", e));
    let config = config
        .with_overrides(
            matches.value_of("secret-key"),
            matches.value_of("voter-limit"),
        )
        .unwrap_or_else(|e| exit_with("config", e));

    // Subcommands
    match matches.subcommand() {
        ("keygen", Some(matches)) => command_keygen(matches),
        ("signing-keygen", Some(matches)) => command_signing_keygen(matches),
        ("vote", Some(matches)) => command_vote(matches, &config),
        ("verify", Some(matches)) => command_verify(matches),
        ("tally", Some(matches)) => command_tally(matches),
        ("close", Some(matches)) => command_close(matches, &config),
        ("audit", Some(matches)) => command_audit(matches),
        _ => unreachable!(),
    }
}

/// Expand `~` and environment variables in a command line argument
pub fn expand(input: &str) -> String {
    shellexpand::full(input)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| input.to_owned())
}

/// Report an error on stderr and exit with status 1
pub fn exit_with(command: &str, error: impl Display) -> ! {
    eprintln!("fairvote {}: {}", command, error);
    std::process::exit(1);
}

/// Read and deserialize a JSON file, exiting on failure
pub fn read_json<T: DeserializeOwned>(command: &str, filename: &str) -> T {
    let filename = expand(filename);
    let contents = std::fs::read_to_string(&filename).unwrap_or_else(|e| {
        exit_with(command, format!("unable to read {}: {}", filename, e))
    });
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        exit_with(command, format!("unable to parse {}: {}", filename, e))
    })
}

/// Read the public election parameters and check them before use
pub fn read_params(command: &str, filename: &str) -> fairvote::GroupParameters {
    let params: fairvote::GroupParameters = read_json(command, filename);
    params
        .check()
        .unwrap_or_else(|e| exit_with(command, format!("{}: {}", filename, e)));
    params
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(command: &str, value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| exit_with(command, format!("unable to serialize output: {}", e)));
    println!("{}", json);
}
