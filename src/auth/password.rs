use crate::error::AppError;
use bcrypt::{hash, verify};
use lazy_static::lazy_static;

pub const HASH_COST: u32 = 10;

lazy_static! {
    // Compared against when the email is unknown, so both login failures cost one bcrypt run.
    static ref DUMMY_HASH: Option<String> = hash("taskmart-dummy-password", HASH_COST).ok();
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, HASH_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// Spends the same effort as a real verification and always reports a mismatch.
pub fn verify_against_dummy(password: &str) -> bool {
    if let Some(dummy) = DUMMY_HASH.as_ref() {
        let _ = verify(password, dummy);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password).unwrap();

        assert!(hashed.starts_with("$2b$10$"));
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match verify_password("test_password123", "invalidhashformat") {
            Err(AppError::InternalServerError(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_dummy_verification_never_matches() {
        assert!(!verify_against_dummy("taskmart-dummy-password"));
    }
}
