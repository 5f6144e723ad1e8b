//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted game or player name, in characters.
pub const MAX_NAME_LENGTH: usize = 64;
/// Largest accepted declared player count.
pub const MAX_CAPACITY: u32 = 64;

/// Validates that a display name is non-blank and at most [`MAX_NAME_LENGTH`] characters.
///
/// # Examples
///
/// ```ignore
/// validate_display_name("Lobby1") // Ok
/// validate_display_name("   ")    // Err - blank
/// ```
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }

    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("name_length");
        err.message = Some(
            format!("Name must be at most {MAX_NAME_LENGTH} characters (got {length})").into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a declared capacity is between 1 and [`MAX_CAPACITY`].
pub fn validate_capacity(capacity: u32) -> Result<(), ValidationError> {
    if capacity == 0 || capacity > MAX_CAPACITY {
        let mut err = ValidationError::new("capacity_range");
        err.message =
            Some(format!("Capacity must be between 1 and {MAX_CAPACITY} (got {capacity})").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_display_name_valid() {
        assert!(validate_display_name("Lobby1").is_ok());
        assert!(validate_display_name(&"a".repeat(MAX_NAME_LENGTH)).is_ok());
    }

    #[test]
    fn test_validate_display_name_blank() {
        assert_eq!(validate_display_name("").unwrap_err().code, "name_blank");
        assert_eq!(validate_display_name(" \t ").unwrap_err().code, "name_blank");
    }

    #[test]
    fn test_validate_display_name_too_long() {
        let name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert_eq!(validate_display_name(&name).unwrap_err().code, "name_length");
    }

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(1).is_ok());
        assert!(validate_capacity(MAX_CAPACITY).is_ok());
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(MAX_CAPACITY + 1).is_err());
    }
}
