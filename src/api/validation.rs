use std::sync::LazyLock;

use regex::Regex;

use super::ApiError;
use crate::services::{MAX_GUESTS, MIN_GUESTS};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\d\s\-\+\(\)]{5,20}$").expect("phone regex")
});

pub fn validate_id(what: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {} ID: {}. ID must be a positive integer",
            what, id
        )));
    }
    Ok(id)
}

pub fn validate_email(email: &str) -> Result<String, ApiError> {
    let trimmed = email.trim();
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ApiError::validation("Invalid email address"));
    }
    Ok(trimmed.to_lowercase())
}

pub fn validate_phone(phone: &str) -> Result<&str, ApiError> {
    let trimmed = phone.trim();
    if !PHONE_RE.is_match(trimmed) {
        return Err(ApiError::validation("Invalid phone number"));
    }
    Ok(trimmed)
}

pub fn validate_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.len() < 3 {
        return Err(ApiError::validation("Name must be at least 3 characters"));
    }
    if trimmed.len() > 100 {
        return Err(ApiError::validation("Name must be 100 characters or less"));
    }
    Ok(trimmed)
}

/// Guest count bounds are checked before any state is touched.
pub fn validate_guests(guests: i32) -> Result<i32, ApiError> {
    if !(MIN_GUESTS..=MAX_GUESTS).contains(&guests) {
        return Err(ApiError::validation(format!(
            "Number of guests must be between {} and {}",
            MIN_GUESTS, MAX_GUESTS
        )));
    }
    Ok(guests)
}

pub fn validate_password(password: &str, min_length: usize) -> Result<&str, ApiError> {
    if password.len() < min_length {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            min_length
        )));
    }
    Ok(password)
}

pub fn validate_message(message: &str) -> Result<&str, ApiError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Message cannot be empty"));
    }
    if trimmed.len() > 5000 {
        return Err(ApiError::validation(
            "Message must be 5000 characters or less",
        ));
    }
    Ok(trimmed)
}
