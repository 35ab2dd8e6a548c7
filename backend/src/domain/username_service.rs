//! Username availability checks and suggestion generation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use super::ports::ProfileRepository;
use super::profile::UserId;
use super::username::{self, UsernameError};

/// Message reported whenever the profile store cannot be consulted. A store
/// failure is never treated as "available".
pub const AVAILABILITY_LOOKUP_FAILED: &str = "Failed to check username availability";

/// Suffixes tried when generating alternatives for a taken handle.
const SUGGESTION_SUFFIXES: &[&str] = &["official", "real", "pro", "new", "live", "here"];

/// Maximum number of suggestions surfaced to the caller.
const MAX_SUGGESTIONS: usize = 5;

/// Result of checking one candidate handle.
///
/// ## Invariants
/// - `is_available` is `true` only when `is_valid` is `true`; the
///   constructors enforce this.
/// - `suggestions` are non-empty only for a valid-but-taken candidate, and
///   each entry independently passed validation and an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsernameCheck {
    pub value: String,
    pub is_valid: bool,
    pub is_available: bool,
    /// Why validation rejected the candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Lookup failure, when the store could not be consulted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl UsernameCheck {
    fn invalid(value: String, error: &UsernameError) -> Self {
        Self {
            value,
            is_valid: false,
            is_available: false,
            reason: Some(error.to_string()),
            error: None,
            suggestions: Vec::new(),
        }
    }

    fn available(value: String) -> Self {
        Self {
            value,
            is_valid: true,
            is_available: true,
            reason: None,
            error: None,
            suggestions: Vec::new(),
        }
    }

    fn taken(value: String, suggestions: Vec<String>) -> Self {
        Self {
            value,
            is_valid: true,
            is_available: false,
            reason: None,
            error: None,
            suggestions,
        }
    }

    fn lookup_failed(value: String) -> Self {
        Self {
            value,
            is_valid: false,
            is_available: false,
            reason: None,
            error: Some(AVAILABILITY_LOOKUP_FAILED.to_owned()),
            suggestions: Vec::new(),
        }
    }
}

/// Source of the random integers used by the suggestion generator.
///
/// Kept behind a trait so tests can script the values while production uses
/// a seeded [`SmallRng`].
pub trait SuggestionRng: Send + Sync {
    /// Return a value in `[0, upper)`.
    fn next_below(&self, upper: u32) -> u32;
}

/// Production randomness source.
pub struct SmallRngSuggestions {
    rng: Mutex<SmallRng>,
}

impl SmallRngSuggestions {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }
}

impl SuggestionRng for SmallRngSuggestions {
    fn next_below(&self, upper: u32) -> u32 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..upper)
    }
}

/// Checks candidates against the validation rules and the profile store.
pub struct UsernameService<R: ?Sized> {
    profiles: Arc<R>,
    rng: Arc<dyn SuggestionRng>,
}

impl<R: ?Sized> UsernameService<R> {
    pub fn new(profiles: Arc<R>, rng: Arc<dyn SuggestionRng>) -> Self {
        Self { profiles, rng }
    }
}

impl<R: ProfileRepository + ?Sized> UsernameService<R> {
    /// Check a candidate handle.
    ///
    /// Invalid candidates are rejected without touching the store. A match
    /// owned by `exclude_user_id` counts as available so a user can re-claim
    /// their current handle. Any other match yields suggestions.
    pub async fn check(&self, candidate: &str, exclude_user_id: Option<&UserId>) -> UsernameCheck {
        if let Err(rule) = username::validate(candidate) {
            return UsernameCheck::invalid(candidate.to_owned(), &rule);
        }

        match self.owner_of(candidate).await {
            Err(()) => UsernameCheck::lookup_failed(candidate.to_owned()),
            Ok(None) => UsernameCheck::available(candidate.to_owned()),
            Ok(Some(owner)) if Some(&owner) == exclude_user_id => {
                UsernameCheck::available(candidate.to_owned())
            }
            Ok(Some(_)) => {
                let suggestions = self.suggest(candidate, exclude_user_id).await;
                UsernameCheck::taken(candidate.to_owned(), suggestions)
            }
        }
    }

    /// Generate up to five alternatives for a taken handle, in generation
    /// order: numbered 1-5, three random numbers, separator variants, then
    /// the fixed suffix list. Each candidate is independently validated and
    /// checked against the store.
    async fn suggest(&self, base: &str, exclude_user_id: Option<&UserId>) -> Vec<String> {
        let mut accepted = Vec::new();
        let mut seen = HashSet::new();

        for candidate in self.generate_candidates(base) {
            if accepted.len() >= MAX_SUGGESTIONS {
                break;
            }
            if !seen.insert(candidate.to_lowercase()) {
                continue;
            }
            if username::validate(&candidate).is_err() {
                continue;
            }
            match self.owner_of(&candidate).await {
                Ok(None) => accepted.push(candidate),
                Ok(Some(owner)) if Some(&owner) == exclude_user_id => accepted.push(candidate),
                Ok(Some(_)) => {}
                // A failing store makes further checks pointless; return
                // whatever already passed.
                Err(()) => break,
            }
        }
        accepted
    }

    fn generate_candidates(&self, base: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        for n in 1..=5 {
            candidates.push(format!("{base}{n}"));
        }
        for _ in 0..3 {
            let n = self.rng.next_below(1000);
            candidates.push(format!("{base}{n}"));
        }
        for separator in ['_', '-'] {
            candidates.push(format!("{base}{separator}"));
            candidates.push(format!("{separator}{base}"));
        }
        for suffix in SUGGESTION_SUFFIXES {
            candidates.push(format!("{base}_{suffix}"));
        }
        candidates
    }

    async fn owner_of(&self, candidate: &str) -> Result<Option<UserId>, ()> {
        match self
            .profiles
            .find_by_username_lower(&candidate.to_lowercase())
            .await
        {
            Ok(profile) => Ok(profile.map(|p| p.user_id)),
            Err(error) => {
                warn!(%error, candidate, "username availability lookup failed");
                Err(())
            }
        }
    }
}
