//! Username validation rules.
//!
//! A username is the public handle under which a profile page is served
//! (`droplink.example/@handle`), so the rules are deliberately strict. This
//! module is pure string validation; availability against the profile store
//! is a separate concern handled by [`crate::domain::UsernameService`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 30;

/// Handles that can never be claimed, compared case-insensitively.
const RESERVED: &[&str] = &[
    "about",
    "admin",
    "administrator",
    "api",
    "app",
    "dashboard",
    "droplink",
    "help",
    "info",
    "login",
    "mail",
    "payment",
    "payments",
    "pi",
    "privacy",
    "profile",
    "root",
    "settings",
    "signup",
    "support",
    "terms",
    "user",
    "www",
];

/// Validation errors returned by [`Username::new`].
///
/// Rules are checked in declaration order and the first violation wins;
/// errors are never aggregated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("username must be at least {USERNAME_MIN} characters")]
    TooShort,
    #[error("username must be at most {USERNAME_MAX} characters")]
    TooLong,
    #[error("username may only contain letters, numbers, underscores, or hyphens")]
    InvalidCharacters,
    #[error("this username is reserved")]
    Reserved,
    #[error("username must not contain consecutive underscores or hyphens")]
    ConsecutiveSeparators,
    #[error("username must not start or end with an underscore or hyphen")]
    EdgeSeparator,
}

/// A structurally valid username.
///
/// ## Invariants
/// - 3 to 30 characters drawn from `[A-Za-z0-9_-]`.
/// - Not a reserved word (case-insensitive).
/// - No two consecutive `_`/`-`, and neither at the start or end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use droplink_backend::domain::{Username, UsernameError};
    ///
    /// assert!(Username::new("valid_user-1").is_ok());
    /// assert_eq!(Username::new("ab").unwrap_err(), UsernameError::TooShort);
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, UsernameError> {
        let value = value.into();
        validate(&value)?;
        Ok(Self(value))
    }

    /// Borrow the handle as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Lowercased form used for case-insensitive collision lookups.
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }
}

/// Apply the username rules in order, reporting the first violation.
pub fn validate(value: &str) -> Result<(), UsernameError> {
    let length = value.chars().count();
    if length < USERNAME_MIN {
        return Err(UsernameError::TooShort);
    }
    if length > USERNAME_MAX {
        return Err(UsernameError::TooLong);
    }

    if !value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(UsernameError::InvalidCharacters);
    }

    let lowered = value.to_lowercase();
    if RESERVED.contains(&lowered.as_str()) {
        return Err(UsernameError::Reserved);
    }

    let mut previous_was_separator = false;
    for ch in value.chars() {
        let is_separator = ch == '_' || ch == '-';
        if is_separator && previous_was_separator {
            return Err(UsernameError::ConsecutiveSeparators);
        }
        previous_was_separator = is_separator;
    }

    let edge_separator = |ch: char| ch == '_' || ch == '-';
    if value.starts_with(edge_separator) || value.ends_with(edge_separator) {
        return Err(UsernameError::EdgeSeparator);
    }

    Ok(())
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
