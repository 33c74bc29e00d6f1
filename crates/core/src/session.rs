//! Session tokens — the opaque identifier handed to a client when an
//! assessment starts and used for every later lookup and submission.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An opaque, unique assessment session token.
///
/// Generated tokens are random UUID v4 values rendered as 32 lowercase hex
/// characters (122 bits from the OS RNG). Comparison is exact and
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Wrap a client-supplied token for lookup. No validation: a token that was
/// never issued simply fails to resolve.
impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
