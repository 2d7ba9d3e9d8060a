//! Intake profile collected once per session.
//!
//! The intake form asks the user for their name, how they are feeling,
//! what is on their mind, and what kind of support they are looking for.
//! All four answers are required; the profile is immutable once built.

use serde::{Deserialize, Serialize};

use crate::error::IntakeError;

/// The four-field profile a user submits before a session starts.
///
/// Immutable once created and owned exclusively by its session.
/// Construct through [`IntakeInfo::new`], which trims and rejects
/// blank fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeInfo {
    /// The user's stated name.
    pub name: String,
    /// How the user says they are feeling.
    pub feelings: String,
    /// What the user says is on their mind.
    pub concerns: String,
    /// The kind of support the user is looking for.
    pub support_type: String,
}

impl IntakeInfo {
    /// Build a validated intake profile.
    ///
    /// Each field is trimmed; a field that is empty after trimming is
    /// rejected with [`IntakeError::MissingField`].
    pub fn new(
        name: impl Into<String>,
        feelings: impl Into<String>,
        concerns: impl Into<String>,
        support_type: impl Into<String>,
    ) -> Result<Self, IntakeError> {
        let intake = Self {
            name: required(name, "name")?,
            feelings: required(feelings, "feelings")?,
            concerns: required(concerns, "concerns")?,
            support_type: required(support_type, "support_type")?,
        };
        Ok(intake)
    }
}

fn required(value: impl Into<String>, field: &'static str) -> Result<String, IntakeError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IntakeError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intake_new_trims_fields() {
        let intake =
            IntakeInfo::new("  Sam ", "overwhelmed", "work stress", "someone to listen").unwrap();
        assert_eq!(intake.name, "Sam");
        assert_eq!(intake.support_type, "someone to listen");
    }

    #[test]
    fn test_intake_rejects_blank_field() {
        let err = IntakeInfo::new("Sam", "   ", "work stress", "someone to listen").unwrap_err();
        assert_eq!(err, IntakeError::MissingField("feelings"));
        assert_eq!(err.to_string(), "required intake field 'feelings' is empty");
    }

    #[test]
    fn test_intake_serde_roundtrip() {
        let intake = IntakeInfo::new("Sam", "anxious", "deadlines", "advice").unwrap();
        let json = serde_json::to_string(&intake).unwrap();
        assert!(json.contains("\"support_type\":\"advice\""));
        let parsed: IntakeInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, intake);
    }
}
