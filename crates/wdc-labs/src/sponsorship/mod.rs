//! "Ask a sponsor to pay" flow: collect both parties' details, then hand the
//! applicant a shareable link and a pre-filled e-mail.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SPONSOR_BASE_URL;
use crate::waitlist::is_basic_email;

pub const DEFAULT_PLAN: &str = "The Career Accelerator";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorshipDetails {
    #[serde(default)]
    pub your_name: String,
    #[serde(default)]
    pub your_email: String,
    #[serde(default)]
    pub sponsor_name: String,
    #[serde(default)]
    pub sponsor_email: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SponsorshipStep {
    Form,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SponsorshipError {
    #[error("missing required sponsorship fields: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("'{field}' is not a valid email address")]
    InvalidEmail { field: &'static str },
}

/// Ready-to-send message for the sponsor's mail client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailDraft {
    pub fn mailto_url(&self) -> String {
        let to = match self.to.split_once('@') {
            Some((local, domain)) => format!("{}@{}", urlencoding::encode(local), domain),
            None => urlencoding::encode(&self.to).into_owned(),
        };
        format!(
            "mailto:{}?subject={}&body={}",
            to,
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body)
        )
    }
}

/// State of one sponsorship dialog.
#[derive(Debug, Clone)]
pub struct SponsorshipRequest {
    base_url: String,
    plan: String,
    step: SponsorshipStep,
    details: SponsorshipDetails,
}

impl SponsorshipRequest {
    pub fn new(plan: Option<&str>) -> Self {
        Self::with_base_url(DEFAULT_SPONSOR_BASE_URL, plan)
    }

    pub fn with_base_url(base_url: impl Into<String>, plan: Option<&str>) -> Self {
        let plan = plan
            .map(str::trim)
            .filter(|plan| !plan.is_empty())
            .unwrap_or(DEFAULT_PLAN);
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            plan: plan.to_string(),
            step: SponsorshipStep::Form,
            details: SponsorshipDetails::default(),
        }
    }

    pub fn plan(&self) -> &str {
        &self.plan
    }

    pub fn step(&self) -> SponsorshipStep {
        self.step
    }

    pub fn details(&self) -> &SponsorshipDetails {
        &self.details
    }

    pub fn details_mut(&mut self) -> &mut SponsorshipDetails {
        &mut self.details
    }

    pub fn set_details(&mut self, details: SponsorshipDetails) {
        self.details = details;
    }

    pub fn validate(&self) -> Result<(), SponsorshipError> {
        let required = [
            ("your_name", &self.details.your_name),
            ("your_email", &self.details.your_email),
            ("sponsor_name", &self.details.sponsor_name),
            ("sponsor_email", &self.details.sponsor_email),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(SponsorshipError::Missing(missing));
        }

        for (field, value) in [
            ("your_email", &self.details.your_email),
            ("sponsor_email", &self.details.sponsor_email),
        ] {
            if !is_basic_email(value) {
                return Err(SponsorshipError::InvalidEmail { field });
            }
        }

        Ok(())
    }

    /// `Form -> Link` once the details are complete; returns the link.
    pub fn generate_link(&mut self) -> Result<String, SponsorshipError> {
        self.validate()?;
        self.step = SponsorshipStep::Link;
        Ok(self.sponsor_link())
    }

    pub fn back_to_form(&mut self) {
        self.step = SponsorshipStep::Form;
    }

    /// Dialog closed: forget everything but the plan.
    pub fn clear(&mut self) {
        self.step = SponsorshipStep::Form;
        self.details = SponsorshipDetails::default();
    }

    pub fn sponsor_link(&self) -> String {
        format!(
            "{}/sponsor/{}?plan={}",
            self.base_url,
            urlencoding::encode(self.details.your_name.trim()),
            urlencoding::encode(&self.plan)
        )
    }

    pub fn email_draft(&self) -> EmailDraft {
        let ask = self
            .details
            .message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(
                "I'm reaching out to ask if you'd consider sponsoring my subscription to WDC Labs.",
            );

        EmailDraft {
            to: self.details.sponsor_email.trim().to_string(),
            subject: format!("Sponsorship Request for WDC Labs - {}", self.plan),
            body: format!(
                "Hi {},\n\n{}\n\nHere's my sponsorship link: {}\n\nThank you!\n{}",
                self.details.sponsor_name.trim(),
                ask,
                self.sponsor_link(),
                self.details.your_name.trim()
            ),
        }
    }
}
