//! Registry of solved training challenges.
//!
//! The shop deliberately contains weaknesses; exploiting one marks the
//! matching challenge as solved for the lifetime of the process.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::info;

/// A training challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Challenge {
    /// Log in as an account whose TOTP secret was leaked through insecure
    /// storage.
    TwoFactorAuthUnsafeSecretStorage,
}

impl Challenge {
    /// Every challenge, in display order.
    pub const ALL: [Self; 1] = [Self::TwoFactorAuthUnsafeSecretStorage];

    /// Stable key used in the API.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::TwoFactorAuthUnsafeSecretStorage => "twoFactorAuthUnsafeSecretStorageChallenge",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TwoFactorAuthUnsafeSecretStorage => "Two Factor Authentication",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// A challenge and whether it has been solved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeStatus {
    pub key: &'static str,
    pub name: &'static str,
    pub solved: bool,
}

/// Tracks which challenges have been solved.
#[derive(Debug, Default)]
pub struct ChallengeTracker {
    solved: [AtomicBool; Challenge::ALL.len()],
}

impl ChallengeTracker {
    /// Create a tracker with nothing solved.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `challenge` solved if `condition` holds.
    ///
    /// Returns `true` only for the call that solved it.
    pub fn solve_if(&self, challenge: Challenge, condition: impl FnOnce() -> bool) -> bool {
        if self.is_solved(challenge) || !condition() {
            return false;
        }
        let newly_solved = !self.flag(challenge).swap(true, Ordering::AcqRel);
        if newly_solved {
            info!(challenge = challenge.key(), "Challenge solved");
        }
        newly_solved
    }

    /// Whether `challenge` has been solved.
    #[must_use]
    pub fn is_solved(&self, challenge: Challenge) -> bool {
        self.flag(challenge).load(Ordering::Acquire)
    }

    /// Status of every challenge.
    #[must_use]
    pub fn list(&self) -> Vec<ChallengeStatus> {
        Challenge::ALL
            .iter()
            .map(|&challenge| ChallengeStatus {
                key: challenge.key(),
                name: challenge.name(),
                solved: self.is_solved(challenge),
            })
            .collect()
    }

    fn flag(&self, challenge: Challenge) -> &AtomicBool {
        // ALL covers every variant, so the index is always in bounds.
        #[allow(clippy::indexing_slicing)]
        &self.solved[challenge.index()]
    }
}
