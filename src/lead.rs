//! Lead submission.
//!
//! A prospect who finishes the calculator may leave contact details.
//! The `lead` module validates the submission and hands it to a
//! [`LeadSink`], the seam behind which email delivery lives.  The crate
//! ships only [`TracingLeadSink`], which records the lead in the log.

use serde::{Deserialize, Serialize};

use crate::error::LeadError;
use crate::models::CalculatorData;

/// Contact details plus the calculator figures they were shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    /// Missing names and emails are left to [`LeadSubmission::validate`].
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    pub calculator_data: Option<CalculatorData>,
}

impl LeadSubmission {
    /// Requires a name and a plausible email address.
    pub fn validate(&self) -> Result<(), LeadError> {
        if self.name.trim().is_empty() {
            return Err(LeadError::MissingField("name"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(LeadError::MissingField("email"));
        }
        if !looks_like_email(email) {
            return Err(LeadError::InvalidEmail(email.to_string()));
        }
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Destination for accepted leads.
///
/// Sinks must be thread-safe (`Send + Sync`) because the HTTP server
/// shares one sink across all requests.
pub trait LeadSink: Send + Sync {
    fn submit(&self, lead: &LeadSubmission) -> Result<(), LeadError>;
}

/// Records leads through `tracing` without delivering them anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLeadSink;

impl LeadSink for TracingLeadSink {
    fn submit(&self, lead: &LeadSubmission) -> Result<(), LeadError> {
        match &lead.calculator_data {
            Some(data) => tracing::info!(
                email = %lead.email,
                property_type = data.property_type.as_str(),
                acreage = data.acreage,
                projected_savings = data.projected_savings,
                equipment = %data.recommended_equipment,
                "lead received"
            ),
            None => tracing::info!(email = %lead.email, "lead received without calculator data"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(name: &str, email: &str) -> LeadSubmission {
        LeadSubmission {
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            message: String::new(),
            calculator_data: None,
        }
    }

    #[test]
    fn test_valid_lead() {
        assert!(lead("Pat Green", "pat@example.com").validate().is_ok());
    }

    #[test]
    fn test_missing_fields() {
        assert!(matches!(
            lead("  ", "pat@example.com").validate(),
            Err(LeadError::MissingField("name"))
        ));
        assert!(matches!(
            lead("Pat", "").validate(),
            Err(LeadError::MissingField("email"))
        ));
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["pat", "pat@", "@example.com", "pat@example", "pat@@example.com", "p t@example.com"] {
            assert!(
                matches!(lead("Pat", email).validate(), Err(LeadError::InvalidEmail(_))),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn test_missing_name_reaches_validation() {
        let lead: LeadSubmission =
            serde_json::from_str(r#"{"email": "pat@example.com"}"#).unwrap();
        assert!(matches!(lead.validate(), Err(LeadError::MissingField("name"))));
    }

    #[test]
    fn test_tracing_sink_accepts_leads() {
        let sink: Box<dyn LeadSink> = Box::new(TracingLeadSink);
        assert!(sink.submit(&lead("Pat", "pat@example.com")).is_ok());
    }
}
