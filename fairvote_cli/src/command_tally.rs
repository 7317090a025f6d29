use super::command_verify::{read_submission, Submission};
use super::{exit_with, print_json, read_json, read_params};
use fairvote::ElectionData;

pub fn command_tally(matches: &clap::ArgMatches) {
    // Unwraps are OK, both these args are required
    let params = read_params("tally", matches.value_of("PARAMS").unwrap());
    let election: ElectionData = read_json("tally", matches.value_of("ELECTION").unwrap());

    let mut tally = election.empty_tally();
    let mut accepted = 0;
    let mut rejected = 0;

    for filename in matches.values_of("BALLOT").into_iter().flatten() {
        let submission = read_submission("tally", filename);

        let admitted = match &submission {
            Submission::Signed(signed) => signed.validate(&election, &params),
            Submission::Unsigned(ballot) => ballot.validate(&election, &params),
        };

        match admitted {
            Ok(()) => {
                tally
                    .fold(submission.ballot(), &params)
                    .unwrap_or_else(|e| exit_with("tally", format!("{}: {}", filename, e)));
                accepted += 1;
            }
            Err(e) => {
                rejected += 1;
                log::warn!("rejected {}: {}", filename, e);
            }
        }
    }

    log::info!("{} ballots accepted, {} rejected", accepted, rejected);

    print_json("tally", &tally);
}
