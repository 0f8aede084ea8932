//! Password strength checks and salted password hashes.
//!
//! A [ValidatedPassword] is a plaintext password that passed the strength
//! check at registration. It only lives long enough to be turned into a
//! [PasswordHash], which is what gets stored on the user record.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that has passed the strength check, but has not been hashed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password`.
    ///
    /// `user_inputs` are strings the password should not be derived from,
    /// such as the user's name and email address.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with suggestions for a stronger password if
    /// the password is easy to guess.
    pub fn new(raw_password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password, user_inputs);

        match analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_owned())),
            _ => {
                let feedback = analysis
                    .feedback()
                    .map(Feedback::to_string)
                    .unwrap_or_else(|| "try a longer password".to_owned());

                Err(Error::TooWeak(feedback))
            }
        }
    }

    /// Wrap `raw_password` without checking its strength.
    ///
    /// Intended for tests and tooling that need a known password.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("********")
    }
}

/// A salted bcrypt hash of a password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used for hashing passwords of registered users.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds of bcrypt.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt rejects the cost or fails to
    /// generate a salt.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash read back from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Check whether `raw_password` is the password this hash was made from.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }

    /// The hash as stored in the database.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
