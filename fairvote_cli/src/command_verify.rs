use super::{exit_with, expand, read_params};
use fairvote::{verify_ballots, Ballot, SignedBallot};

/// A ballot file, with or without a voter signature
pub enum Submission {
    Signed(SignedBallot),
    Unsigned(Ballot),
}

impl Submission {
    pub fn ballot(&self) -> &Ballot {
        match self {
            Submission::Signed(signed) => &signed.vote,
            Submission::Unsigned(ballot) => ballot,
        }
    }
}

/// Read a ballot file, signed or unsigned
pub fn read_submission(command: &str, filename: &str) -> Submission {
    let filename = expand(filename);
    let contents = std::fs::read_to_string(&filename).unwrap_or_else(|e| {
        exit_with(command, format!("unable to read {}: {}", filename, e))
    });

    let value: serde_json::Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        exit_with(command, format!("unable to parse {}: {}", filename, e))
    });

    let submission = if value.get("vote").is_some() {
        serde_json::from_value(value).map(Submission::Signed)
    } else {
        serde_json::from_value(value).map(Submission::Unsigned)
    };

    submission.unwrap_or_else(|e| {
        exit_with(command, format!("unable to parse {}: {}", filename, e))
    })
}

pub fn command_verify(matches: &clap::ArgMatches) {
    // Unwraps are OK, both these args are required
    let params = read_params("verify", matches.value_of("PARAMS").unwrap());
    let filenames: Vec<&str> = matches.values_of("BALLOT").unwrap().collect();

    let submissions: Vec<Submission> = filenames
        .iter()
        .map(|filename| read_submission("verify", filename))
        .collect();

    let ballots: Vec<Ballot> = submissions.iter().map(|s| s.ballot().clone()).collect();
    let proofs_valid =
        verify_ballots(&ballots, &params).unwrap_or_else(|e| exit_with("verify", e));

    let mut failures = 0;
    for ((filename, submission), proofs_valid) in
        filenames.iter().zip(&submissions).zip(proofs_valid)
    {
        let signature = match submission {
            Submission::Signed(signed) => signed.verify_signature().map_err(|e| e.to_string()),
            Submission::Unsigned(_) => Ok(()),
        };

        match (signature, proofs_valid) {
            (Ok(()), true) => println!("{}: ok", filename),
            (Err(e), _) => {
                failures += 1;
                println!("{}: invalid signature: {}", filename, e);
            }
            (Ok(()), false) => {
                failures += 1;
                println!("{}: invalid proof", filename);
            }
        }
    }

    if failures > 0 {
        exit_with(
            "verify",
            format!("{} of {} ballots failed", failures, filenames.len()),
        );
    }
}
