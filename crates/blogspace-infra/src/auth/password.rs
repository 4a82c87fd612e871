//! Argon2 credential hashing for local accounts.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use blogspace_core::ports::AuthError;

pub(crate) struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub(crate) fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    pub(crate) fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    pub(crate) fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = CredentialHasher::new();

        let hash = hasher.hash("hunter22").unwrap();
        assert!(hasher.verify("hunter22", &hash).unwrap());
        assert!(!hasher.verify("hunter23", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        let hasher = CredentialHasher::new();
        assert!(matches!(
            hasher.verify("x", "not-a-hash"),
            Err(AuthError::HashingError(_))
        ));
    }
}
