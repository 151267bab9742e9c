//! Declarative validation rules for the business-profile form.
//!
//! Single source of truth shared by the REST handlers and the onboarding
//! wizard — both validate the same field set with the same rules. Failures
//! come back as a list of per-field messages; the caller decides how to
//! surface them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BUSINESS_NAME_MIN: usize = 2;
pub const BUSINESS_NAME_MAX: usize = 255;
pub const EMAIL_MAX: usize = 255;

/// Permissive phone pattern: optional leading `+`, optional parenthesized
/// area code, 3+3+4–6 digit groups with space/dot/dash separators.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4,6}$").unwrap());

/// Intentionally loose email syntax check — the store, not the validator,
/// is the arbiter of deliverability.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// One failed field constraint. Renders as `field: message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The profile submission body. All fields default to the empty string so a
/// missing field is reported as a per-field validation error rather than a
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileForm {
    pub business_name: String,
    pub phone: String,
    pub email: String,
    pub google_review_url: String,
    pub facebook_review_url: String,
    pub yelp_review_url: String,
}

impl ProfileForm {
    /// Validate the whole form, collecting every failure.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = self.validate_basic_info();
        errors.extend(self.validate_review_links());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Rules for the first wizard step: name, phone, email.
    pub fn validate_basic_info(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let name_len = self.business_name.chars().count();
        if name_len < BUSINESS_NAME_MIN {
            errors.push(FieldError::new(
                "businessName",
                format!("must be at least {BUSINESS_NAME_MIN} characters"),
            ));
        } else if name_len > BUSINESS_NAME_MAX {
            errors.push(FieldError::new(
                "businessName",
                format!("must be at most {BUSINESS_NAME_MAX} characters"),
            ));
        }

        if self.phone.is_empty() {
            errors.push(FieldError::new("phone", "is required"));
        } else if !PHONE_RE.is_match(&self.phone) {
            errors.push(FieldError::new("phone", "is not a valid phone number"));
        }

        errors.extend(validate_email("email", &self.email));
        errors
    }

    /// Rules for the second wizard step: the three review-platform links.
    /// Google is required; Facebook and Yelp accept the empty string.
    pub fn validate_review_links(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.google_review_url.is_empty() {
            errors.push(FieldError::new("googleReviewUrl", "is required"));
        } else if !is_absolute_url(&self.google_review_url) {
            errors.push(FieldError::new(
                "googleReviewUrl",
                "must be a valid absolute URL",
            ));
        }

        for (field, value) in [
            ("facebookReviewUrl", &self.facebook_review_url),
            ("yelpReviewUrl", &self.yelp_review_url),
        ] {
            if !value.is_empty() && !is_absolute_url(value) {
                errors.push(FieldError::new(field, "must be a valid absolute URL"));
            }
        }
        errors
    }
}

/// Validate a required email field. Shared with the account-registration
/// handler, which checks the same syntax against a different field name.
pub fn validate_email(field: &'static str, value: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if value.is_empty() {
        errors.push(FieldError::new(field, "is required"));
    } else if value.chars().count() > EMAIL_MAX {
        errors.push(FieldError::new(
            field,
            format!("must be at most {EMAIL_MAX} characters"),
        ));
    } else if !EMAIL_RE.is_match(value) {
        errors.push(FieldError::new(field, "is not a valid email address"));
    }
    errors
}

fn is_absolute_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
