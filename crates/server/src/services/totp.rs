//! Time-based one-time passwords (RFC 6238).
//!
//! Parameters match the common authenticator apps: HMAC-SHA1, six digits,
//! 30 second steps. Secrets are exchanged as unpadded base32. Code generation
//! and checking are done by `totp-rs`.

use std::time::SystemTimeError;

use thiserror::Error;
use totp_rs::{Algorithm, Secret, SecretParseError, TOTP, TotpUrlError};

/// Random bytes in a generated secret (160 bits, as RFC 4226 recommends).
pub const SECRET_LEN: usize = 20;

/// Seconds per time step.
pub const DEFAULT_STEP: u64 = 30;

/// Digits per code.
pub const DEFAULT_DIGITS: usize = 6;

/// Errors from decoding a secret or computing a code.
#[derive(Debug, Error)]
pub enum TotpError {
    #[error("secret is not valid base32: {0}")]
    InvalidSecret(#[from] SecretParseError),

    #[error("secret rejected: {0}")]
    Parameters(#[from] TotpUrlError),

    #[error("system clock is before the unix epoch")]
    Clock(#[from] SystemTimeError),
}

/// Generate a new random secret, base32 encoded.
#[must_use]
pub fn generate_secret() -> String {
    let bytes: [u8; SECRET_LEN] = rand::random();
    Secret::Raw(bytes.to_vec()).to_encoded().to_string()
}

/// TOTP verifier and generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totp {
    step: u64,
    digits: usize,
    window: u8,
}

impl Default for Totp {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            digits: DEFAULT_DIGITS,
            window: 1,
        }
    }
}

impl Totp {
    /// A verifier accepting codes up to `window` steps before or after now.
    #[must_use]
    pub fn with_window(window: u8) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    /// The code for `secret` at the given unix time.
    ///
    /// # Errors
    ///
    /// Returns `TotpError` if the secret cannot be decoded or is too short.
    pub fn code_at(&self, secret: &str, unix_secs: u64) -> Result<String, TotpError> {
        Ok(self.generator(secret)?.generate(unix_secs))
    }

    /// The code for `secret` right now.
    ///
    /// # Errors
    ///
    /// Returns `TotpError` if the secret is unusable or the clock is broken.
    pub fn current_code(&self, secret: &str) -> Result<String, TotpError> {
        Ok(self.generator(secret)?.generate_current()?)
    }

    /// Check `code` against `secret` at the current time.
    ///
    /// Malformed codes and unusable secrets are simply invalid.
    #[must_use]
    pub fn check(&self, code: &str, secret: &str) -> bool {
        self.generator(secret)
            .is_ok_and(|totp| totp.check_current(code.trim()).unwrap_or(false))
    }

    /// Check `code` against `secret` at the given unix time.
    #[must_use]
    pub fn check_at(&self, code: &str, secret: &str, unix_secs: u64) -> bool {
        // totp-rs subtracts the skew from the step counter unchecked
        if unix_secs / self.step < u64::from(self.window) {
            return false;
        }
        self.generator(secret)
            .is_ok_and(|totp| totp.check(code.trim(), unix_secs))
    }

    fn generator(&self, secret: &str) -> Result<TOTP, TotpError> {
        let key = decode_secret(secret)?;
        Ok(TOTP::new(
            Algorithm::SHA1,
            self.digits,
            self.window,
            self.step,
            key,
        )?)
    }
}

/// Decode a base32 secret, tolerating lowercase, spaces and padding.
fn decode_secret(secret: &str) -> Result<Vec<u8>, TotpError> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    Ok(Secret::Encoded(normalized).to_bytes()?)
}
