use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("fairvote: invalid group parameters: {0}")]
    ParameterIntegrity(&'static str),

    #[error("fairvote: value out of range: {0}")]
    OutOfRange(&'static str),

    #[error("fairvote: choice must be 0 or 1, found {0}")]
    InvalidChoice(u8),

    #[error("fairvote: no discrete log below the bound of {0}")]
    RecoveryBoundExceeded(u64),

    #[error("fairvote: malformed decimal number: {0:?}")]
    MalformedNumber(String),

    #[error("fairvote: {what} has {found} entries at {position}, expected {expected}")]
    BallotShape {
        what: &'static str,
        position: String,
        expected: usize,
        found: usize,
    },

    #[error("fairvote: JSON error: {0}")]
    JSONDeserialization(#[from] serde_json::Error),

    #[error("fairvote: signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),

    #[error("fairvote: invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),
}

/// Ballot admission errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("fairvote validation: ballot does not match the election: {0}")]
    ShapeMismatch(Error),

    #[error("fairvote validation: proof for question {question}, option {option} failed to verify")]
    InvalidProof { question: usize, option: usize },

    #[error("fairvote validation: ballot signature verification failed")]
    SignatureVerificationFailed,

    #[error("fairvote validation: {0}")]
    ParameterIntegrity(Error),
}
