use super::{exit_with, read_json, read_params};
use fairvote::{ElectionResult, Tally};

pub fn command_audit(matches: &clap::ArgMatches) {
    // Unwraps are OK, both these args are required
    let params = read_params("audit", matches.value_of("PARAMS").unwrap());
    let result: ElectionResult = read_json("audit", matches.value_of("RESULT").unwrap());

    let valid = match matches.value_of("tally") {
        Some(filename) => {
            let tally: Tally = read_json("audit", filename);
            result.verify_against(&tally, &params)
        }
        None => result.verify(&params),
    }
    .unwrap_or_else(|e| exit_with("audit", e));

    if !valid {
        exit_with("audit", "result does not verify");
    }

    for (question, counts) in result.counts().iter().enumerate() {
        let counts: Vec<String> = counts.iter().map(u64::to_string).collect();
        println!("question {}: {}", question, counts.join(" "));
    }
    println!("result verified");
}
