use crate::*;

/// A single question and the options a voter can mark
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ElectionQuestion {
    pub question: String,
    pub options: Vec<String>,
}

/// The question/option schema of an election
///
/// Ballots, tallies and results are all indexed by question, then by option, and must agree
/// with this shape.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct ElectionData {
    pub entries: Vec<ElectionQuestion>,
}

impl ElectionData {
    /// Number of options for each question
    pub fn shape(&self) -> Vec<usize> {
        self.entries.iter().map(|q| q.options.len()).collect()
    }

    /// An empty tally for this election
    pub fn empty_tally(&self) -> Tally {
        Tally::new(&self.shape())
    }
}

/// Compare a question/option shape against the expected one
pub(crate) fn check_shape(
    what: &'static str,
    expected: &[usize],
    found: &[usize],
) -> Result<(), Error> {
    if expected.len() != found.len() {
        return Err(Error::BallotShape {
            what,
            position: "top level".to_owned(),
            expected: expected.len(),
            found: found.len(),
        });
    }

    for (question, (expected, found)) in expected.iter().zip(found.iter()).enumerate() {
        if expected != found {
            return Err(Error::BallotShape {
                what,
                position: format!("question {}", question),
                expected: *expected,
                found: *found,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn election_shape() {
        let election: ElectionData = serde_json::from_str(
            r#"{"entries":[
                {"question":"Mascot?","options":["Owl","Fox"]},
                {"question":"Budget?","options":["Low","Mid","High"]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(election.shape(), vec![2, 3]);
        assert!(check_shape("ballot", &election.shape(), &[2, 3]).is_ok());
        assert!(check_shape("ballot", &election.shape(), &[2]).is_err());

        match check_shape("ballot", &election.shape(), &[2, 2]) {
            Err(Error::BallotShape {
                expected, found, ..
            }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            _ => panic!("expected a shape error"),
        }

        let tally = election.empty_tally();
        assert_eq!(tally.shape(), vec![2, 3]);
    }
}
