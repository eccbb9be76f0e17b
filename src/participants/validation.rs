use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date};

use crate::error::ApiError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref DOB_RE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Emails are stored and looked up trimmed and lowercased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `YYYY-MM-DD`, and it has to name a real day.
pub(crate) fn parse_dob(dob: &str) -> Result<Date, ApiError> {
    if !DOB_RE.is_match(dob) {
        return Err(ApiError::BadRequest("DOB must be in YYYY-MM-DD format".into()));
    }
    Date::parse(dob, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::BadRequest("DOB is not a valid calendar date".into()))
}

/// Treats blank strings like missing ones.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
