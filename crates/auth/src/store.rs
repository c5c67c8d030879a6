//! Storage contracts consumed by the token protocol.
//!
//! The gateway core never touches a database directly; it sees exactly
//! three narrow traits. Real deployments implement them over their user
//! store; [`InMemoryAuthStore`] implements all three for wiring and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use gatehouse_core::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Per-user revocation counter.
///
/// `increment` must be atomic at the storage layer (not read-modify-write
/// from request code) and strictly increasing, so that every refresh token
/// issued before an increment is rejected by the very next validation, even
/// under concurrent logout/refresh for the same user.
pub trait RevocationStore: Send + Sync {
    fn counter(&self, user: UserId) -> Result<u64, StoreError>;

    /// Atomically increment the counter; returns the new value.
    fn increment(&self, user: UserId) -> Result<u64, StoreError>;
}

/// Resolves the permission granted by a user's current role.
pub trait PermissionSource: Send + Sync {
    fn granted_permission(&self, user: UserId) -> Result<String, StoreError>;
}

/// Login seam: credential verification without exposing password handling.
pub trait CredentialSource: Send + Sync {
    /// Returns the user id on a correct email/password pair, `None` on a
    /// wrong password or unknown email. Email comparison is
    /// case-insensitive.
    fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<UserId>, StoreError>;
}

#[derive(Debug, Clone)]
struct UserRecord {
    email: String,
    password: String,
    permission: String,
    counter: u64,
}

/// In-memory implementation of all three contracts (dev/test wiring).
///
/// Passwords are held in plain text; this type never leaves test and demo
/// set-ups.
#[derive(Debug, Default)]
pub struct InMemoryAuthStore {
    users: Mutex<HashMap<UserId, UserRecord>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(
        &self,
        user: UserId,
        email: impl Into<String>,
        password: impl Into<String>,
        permission: impl Into<String>,
    ) {
        self.users.lock().unwrap().insert(
            user,
            UserRecord {
                email: email.into().to_lowercase(),
                password: password.into(),
                permission: permission.into(),
                counter: 0,
            },
        );
    }
}

impl RevocationStore for InMemoryAuthStore {
    fn counter(&self, user: UserId) -> Result<u64, StoreError> {
        let users = self.users.lock().unwrap();
        users
            .get(&user)
            .map(|r| r.counter)
            .ok_or(StoreError::UserNotFound(user))
    }

    fn increment(&self, user: UserId) -> Result<u64, StoreError> {
        // The mutation happens under the same lock as the read, which gives
        // the strictly-increasing guarantee the contract requires.
        let mut users = self.users.lock().unwrap();
        let record = users.get_mut(&user).ok_or(StoreError::UserNotFound(user))?;
        record.counter += 1;
        Ok(record.counter)
    }
}

impl PermissionSource for InMemoryAuthStore {
    fn granted_permission(&self, user: UserId) -> Result<String, StoreError> {
        let users = self.users.lock().unwrap();
        users
            .get(&user)
            .map(|r| r.permission.clone())
            .ok_or(StoreError::UserNotFound(user))
    }
}

impl CredentialSource for InMemoryAuthStore {
    fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<UserId>, StoreError> {
        let email = email.to_lowercase();
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|(_, r)| r.email == email && r.password == password)
            .map(|(id, _)| *id))
    }
}
