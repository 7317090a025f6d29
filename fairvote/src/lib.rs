#[macro_use]
extern crate serde;

mod ballot;
mod ballot_proof;
mod decryption;
mod discrete_log;
mod elgamal;
mod election;
mod error;
mod hash;
mod params;
mod tally;
mod util;

pub mod decimal;

pub use ballot::*;
pub use ballot_proof::*;
pub use decryption::*;
pub use discrete_log::*;
pub use elgamal::*;
pub use election::*;
pub use error::*;
pub use hash::*;
pub use params::*;
pub use tally::*;
pub use util::*;
