//! Opaque bearer token generation

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

/// Token length in characters (~238 bits of entropy).
pub const TOKEN_LENGTH: usize = 40;

/// Issues login tokens
pub struct TokenIssuer;

impl TokenIssuer {
    /// Generate a new token from the OS randomness source.
    /// Alphanumeric only, so it can go straight into a header or cookie.
    pub fn generate() -> String {
        OsRng
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }
}
