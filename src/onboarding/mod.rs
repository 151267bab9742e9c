//! Onboarding wizard: three linear steps gated by field validation.
//!
//!   basic-info → review-links → success
//!
//! `advance` moves one step forward only when the current step's fields
//! validate; `skip` jumps from review-links straight to success (the product
//! allows incomplete review links, deferring the requirement). The stored
//! profile row is authoritative — wizard state is derived, never persisted
//! separately.

use serde::{Deserialize, Serialize};

use crate::storage::BusinessProfileRow;
use crate::validation::{FieldError, ProfileForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    BasicInfo,
    ReviewLinks,
    Success,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "basic-info",
            WizardStep::ReviewLinks => "review-links",
            WizardStep::Success => "success",
        }
    }

    /// Move one step forward, gated by the current step's validation rules.
    /// `Success` is terminal and advances to itself.
    pub fn advance(self, form: &ProfileForm) -> Result<WizardStep, Vec<FieldError>> {
        match self {
            WizardStep::BasicInfo => {
                let errors = form.validate_basic_info();
                if errors.is_empty() {
                    Ok(WizardStep::ReviewLinks)
                } else {
                    Err(errors)
                }
            }
            WizardStep::ReviewLinks => {
                let errors = form.validate_review_links();
                if errors.is_empty() {
                    Ok(WizardStep::Success)
                } else {
                    Err(errors)
                }
            }
            WizardStep::Success => Ok(WizardStep::Success),
        }
    }

    /// The one permitted shortcut: review-links → success without validating
    /// the link fields. No other step may be skipped.
    pub fn skip(self) -> Option<WizardStep> {
        match self {
            WizardStep::ReviewLinks => Some(WizardStep::Success),
            _ => None,
        }
    }
}

/// Derive the caller's current wizard step from the stored profile.
pub fn step_for_profile(profile: Option<&BusinessProfileRow>) -> WizardStep {
    match profile {
        None => WizardStep::BasicInfo,
        Some(p) if p.onboarding_completed => WizardStep::Success,
        // A row without the flag should not occur (the upsert always sets
        // it), but resume at the second step rather than restarting.
        Some(_) => WizardStep::ReviewLinks,
    }
}
