//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a card number is 12 to 19 digits, ignoring spaces.
///
/// # Examples
///
/// ```ignore
/// validate_card_number("4242 4242 4242 4242") // Ok
/// validate_card_number("4242-4242")           // Err - separator
/// validate_card_number("4242")                // Err - too short
/// ```
pub fn validate_card_number(number: &str) -> Result<(), ValidationError> {
    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("card_number_format");
        err.message = Some("Card number must contain only digits and spaces".into());
        return Err(err);
    }

    if !(12..=19).contains(&digits.len()) {
        let mut err = ValidationError::new("card_number_length");
        err.message =
            Some(format!("Card number must be 12 to 19 digits (got {})", digits.len()).into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a card security code is 3 or 4 digits.
pub fn validate_cvc(cvc: &str) -> Result<(), ValidationError> {
    if !(3..=4).contains(&cvc.len()) || !cvc.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("cvc_format");
        err.message = Some("Security code must be 3 or 4 digits".into());
        return Err(err);
    }
    Ok(())
}
