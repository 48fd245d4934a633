//! Random initial passwords for accounts created by staff.

use rand::{Rng, distr::Alphanumeric};

/// Length of generated passwords. Inside the 6..=120 range the backend accepts.
pub const GENERATED_PASSWORD_LEN: usize = 12;

/// Generate a random alphanumeric password.
pub fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
