use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The five inputs collected by the waitlist dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationField {
    FirstName,
    LastName,
    Email,
    WhatsappNumber,
    LinkedinUrl,
}

impl ApplicationField {
    pub const ALL: [ApplicationField; 5] = [
        ApplicationField::FirstName,
        ApplicationField::LastName,
        ApplicationField::Email,
        ApplicationField::WhatsappNumber,
        ApplicationField::LinkedinUrl,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ApplicationField::FirstName => "first_name",
            ApplicationField::LastName => "last_name",
            ApplicationField::Email => "email",
            ApplicationField::WhatsappNumber => "whatsapp_number",
            ApplicationField::LinkedinUrl => "linkedin_url",
        }
    }

    /// Accepts the snake_case name or the camelCase form used by form bindings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "first_name" | "firstName" => Some(ApplicationField::FirstName),
            "last_name" | "lastName" => Some(ApplicationField::LastName),
            "email" => Some(ApplicationField::Email),
            "whatsapp_number" | "whatsappNumber" | "whatsapp" => {
                Some(ApplicationField::WhatsappNumber)
            }
            "linkedin_url" | "linkedinUrl" | "linkedin" => Some(ApplicationField::LinkedinUrl),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw, possibly incomplete values bound to the dialog inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFields {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub whatsapp_number: String,
    #[serde(default)]
    pub linkedin_url: String,
}

impl ApplicationFields {
    pub fn get(&self, field: ApplicationField) -> &str {
        match field {
            ApplicationField::FirstName => &self.first_name,
            ApplicationField::LastName => &self.last_name,
            ApplicationField::Email => &self.email,
            ApplicationField::WhatsappNumber => &self.whatsapp_number,
            ApplicationField::LinkedinUrl => &self.linkedin_url,
        }
    }

    pub fn set(&mut self, field: ApplicationField, value: impl Into<String>) {
        let slot = match field {
            ApplicationField::FirstName => &mut self.first_name,
            ApplicationField::LastName => &mut self.last_name,
            ApplicationField::Email => &mut self.email,
            ApplicationField::WhatsappNumber => &mut self.whatsapp_number,
            ApplicationField::LinkedinUrl => &mut self.linkedin_url,
        };
        *slot = value.into();
    }

    pub fn is_empty(&self) -> bool {
        ApplicationField::ALL
            .iter()
            .all(|field| self.get(*field).is_empty())
    }
}

/// Entity written to the external store, one per successful submission.
///
/// Column names follow the hosted `waitlist` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "whatsapp")]
    pub whatsapp_number: String,
    #[serde(rename = "linkedin")]
    pub linkedin_url: String,
}

impl ApplicationRecord {
    /// Builds the record from already-validated fields, trimming each value.
    pub(crate) fn from_fields(fields: &ApplicationFields) -> Self {
        Self {
            first_name: fields.first_name.trim().to_string(),
            last_name: fields.last_name.trim().to_string(),
            email: fields.email.trim().to_string(),
            whatsapp_number: fields.whatsapp_number.trim().to_string(),
            linkedin_url: fields.linkedin_url.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    pub fn label(self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Submitting => "submitting",
            SubmissionPhase::Succeeded => "succeeded",
            SubmissionPhase::Failed => "failed",
        }
    }

    /// Whether the user may still edit fields in this phase.
    pub fn is_editable(self) -> bool {
        matches!(self, SubmissionPhase::Idle | SubmissionPhase::Failed)
    }
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields that failed validation. Empty means the form may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeSet<ApplicationField>);

impl ValidationErrors {
    pub(crate) fn insert(&mut self, field: ApplicationField) {
        self.0.insert(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: ApplicationField) -> bool {
        self.0.contains(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = ApplicationField> + '_ {
        self.0.iter().copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.fields().map(ApplicationField::name).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fields: {}", self.names().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}
