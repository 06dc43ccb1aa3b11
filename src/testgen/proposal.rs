use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Kind of test a proposal asks for.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    Functional,
    Unit,
    Integration,
    Performance,
    Security,
    Technical,
    Api,
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Functional => "Functional",
            Self::Unit => "Unit",
            Self::Integration => "Integration",
            Self::Performance => "Performance",
            Self::Security => "Security",
            Self::Technical => "Technical",
            Self::Api => "API",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        };
        f.write_str(s)
    }
}

/// One human-readable test-case recommendation.
///
/// Two proposals with the same title and type are the same proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseProposal {
    pub title: String,
    #[serde(rename = "type")]
    pub test_type: ProposalType,
    pub priority: Priority,
    pub description: String,
    pub preconditions: Vec<String>,
    pub steps: Vec<String>,
    pub expected_results: Vec<String>,
    pub based_on: String,
}

impl TestCaseProposal {
    pub fn identity(&self) -> (&str, ProposalType) {
        (&self.title, self.test_type)
    }

    /// Stable short id derived from the identity.
    ///
    /// Same title and type give the same id on every run.
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.title.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.test_type.to_string().as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("tc-{}", &digest[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(title: &str, test_type: ProposalType) -> TestCaseProposal {
        TestCaseProposal {
            title: title.into(),
            test_type,
            priority: Priority::High,
            description: String::new(),
            preconditions: vec!["p".into()],
            steps: vec!["s".into()],
            expected_results: vec!["e".into()],
            based_on: "Code Analysis".into(),
        }
    }

    #[test]
    fn id_depends_on_identity_only() {
        let a = proposal("Unit Test: login", ProposalType::Unit);
        let mut b = a.clone();
        b.priority = Priority::Low;
        b.steps.push("more".into());
        assert_eq!(a.id(), b.id());
        assert_eq!(a.id().len(), "tc-".len() + 12);

        let c = proposal("Unit Test: login", ProposalType::Functional);
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn serializes_type_field() {
        let json = serde_json::to_value(proposal("x", ProposalType::Api)).unwrap();
        assert_eq!(json["type"], "api");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["based_on"], "Code Analysis");
    }
}
