//! # Splitty Core
//!
//! Domain types and rules for the Splitty expense ledger:
//!
//! - [`Group`]: users sharing one bearer token and one ledger
//! - [`Transaction`]: a zero-sum set of [`Payment`]s recorded in a group
//! - [`Validator`]: field error accumulator used by every validation routine
//! - [`TokenGenerator`]: random `[A-Z0-9]{9}` access tokens

pub mod error;
pub mod group;
pub mod token;
pub mod transaction;
pub mod validator;

pub use error::{CoreError, CoreResult};
pub use group::{validate_group, Group, MAX_USERS, MIN_USERS};
pub use token::{
    is_valid_token, validate_token, RandomSource, SeededRandom, ThreadRandom, TokenGenerator,
    TOKEN_CHARSET, TOKEN_LENGTH,
};
pub use transaction::{validate_transaction, Payment, Transaction};
pub use validator::Validator;
