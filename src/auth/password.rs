/// Password Hashing and Verification
///
/// Handles password hashing with bcrypt. Plaintext passwords are never stored
/// and never reconstructed; verification relies on bcrypt's own comparison.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, AuthError, ValidationError};

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted, slow one-way hasher for account passwords.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// Create a hasher with an explicit bcrypt cost (4..=31).
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password using bcrypt with a fresh random salt
    ///
    /// # Errors
    /// Returns `AuthError::HashingFault` if bcrypt fails internally
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Auth(AuthError::HashingFault(e.to_string())))
    }

    /// Verify a password against its stored hash
    ///
    /// # Errors
    /// - `AuthError::CredentialMismatch` when the password does not match
    /// - `AuthError::HashingFault` when the stored hash is malformed
    pub fn verify(&self, hashed: &str, password: &str) -> Result<(), AppError> {
        match verify(password, hashed) {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::Auth(AuthError::CredentialMismatch)),
            Err(e) => {
                tracing::error!("Stored password hash could not be verified: {}", e);
                Err(AppError::Auth(AuthError::HashingFault(e.to_string())))
            }
        }
    }
}

/// Validate a new password before it is hashed
///
/// Requirements:
/// - Not empty
/// - At most 72 bytes (anything longer would be silently truncated by bcrypt)
pub fn validate_new_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES));
    }

    Ok(())
}
