//! Ticket records as handed over by the tracker collaborator.

pub mod mentions;
pub mod sections;

use serde::{Deserialize, Serialize};

use crate::error::InputValidationError;

pub use mentions::CodeMentions;
pub use sections::{Section, TicketSections};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default)]
    pub key: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "type")]
    pub issue_type: String,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub status: String,
}

impl Ticket {
    /// Title, type and status must be present and non-blank.
    pub fn validate(&self) -> Result<(), InputValidationError> {
        let required = [
            ("title", &self.title),
            ("issue_type", &self.issue_type),
            ("status", &self.status),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(InputValidationError::MissingField { field });
            }
        }
        Ok(())
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}
