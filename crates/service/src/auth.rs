//! Registration and login.
//!
//! Clients send a credential hash (`authhash`). The server never stores it
//! as-is: it keeps an HMAC-SHA256 digest keyed by a server-side pepper and
//! verifies logins with a constant-time comparison.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use inkwell_core::command::{LoginUser, RegisterUser};
use inkwell_core::error::{Error, Result, StoreError};
use inkwell_core::model::User;
use inkwell_core::store::{NewUser, UserStore};
use sha2::Sha256;
use tracing::{error, info, warn};

type HmacSha256 = Hmac<Sha256>;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Derives and checks stored credential digests.
#[derive(Clone)]
pub struct CredentialHasher {
    pepper: Vec<u8>,
}

impl CredentialHasher {
    pub fn new(pepper: Option<&str>) -> Self {
        if pepper.is_none() {
            warn!("No credential pepper configured; stored digests are unkeyed");
        }
        Self {
            pepper: pepper.unwrap_or_default().as_bytes().to_vec(),
        }
    }

    fn mac(&self, credential: &str) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.pepper).expect("HMAC accepts any key length");
        mac.update(credential.as_bytes());
        mac
    }

    /// Hex-encoded digest to persist.
    pub fn digest(&self, credential: &str) -> String {
        hex::encode(self.mac(credential).finalize().into_bytes())
    }

    /// Check a presented credential against a stored digest.
    pub fn verify(&self, credential: &str, stored_digest: &str) -> bool {
        let Ok(expected) = hex::decode(stored_digest) else {
            return false;
        };
        // Constant-time comparison via `verify_slice`
        self.mac(credential).verify_slice(&expected).is_ok()
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("pepper", &"[REDACTED]")
            .finish()
    }
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: CredentialHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: CredentialHasher) -> Self {
        Self { users, hasher }
    }

    /// Register a new user. Duplicate email or username is a conflict.
    pub async fn register(&self, command: RegisterUser) -> Result<User> {
        command.validate()?;

        let auth_hash = self.hasher.digest(&command.auth_hash);
        let user = self
            .users
            .create_user(NewUser {
                username: command.username,
                email: command.email,
                auth_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(detail) => {
                    info!(detail = %detail, "Registration rejected: identity taken");
                    Error::Conflict("A user with this email or username already exists".into())
                }
                other => {
                    error!(error = %other, "Failed to persist user");
                    Error::internal("could not register user")
                }
            })?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Authenticate by email and credential hash.
    ///
    /// An unknown email and a wrong credential produce the same error.
    pub async fn login(&self, command: LoginUser) -> Result<User> {
        command.validate()?;

        let user = self
            .users
            .find_user_by_email(&command.email)
            .await
            .map_err(|e| {
                error!(error = %e, "User lookup failed");
                Error::internal("could not log in")
            })?;

        match user {
            Some(user) if self.hasher.verify(&command.auth_hash, &user.auth_hash) => {
                info!(user_id = user.id, "User logged in");
                Ok(user)
            }
            _ => {
                warn!("Login rejected");
                Err(Error::Unauthorized(INVALID_CREDENTIALS.into()))
            }
        }
    }
}
