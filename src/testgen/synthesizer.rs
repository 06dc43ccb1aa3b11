//! synthesizer.rs
//!
//! Test-case proposal rules.
//!
//! Rules run in a fixed order and each one only appends. Deduplication
//! happens once at the end.

use std::collections::HashSet;

use crate::detectors::fingerprint::SourceFingerprint;
use crate::testgen::proposal::{Priority, ProposalType, TestCaseProposal};
use crate::ticket::TicketSections;

pub fn synthesize(
    fingerprints: &[SourceFingerprint],
    sections: &TicketSections,
) -> Vec<TestCaseProposal> {
    let mut out = Vec::new();

    // 1. acceptance criteria
    for line in &sections.acceptance_criteria {
        out.push(TestCaseProposal {
            title: format!("Verify {line}"),
            test_type: ProposalType::Functional,
            priority: Priority::High,
            description: format!("Verify that the acceptance criterion is met: {line}"),
            preconditions: vec!["System is deployed with the change under test".into()],
            steps: vec![
                "Set up the scenario described by the criterion".into(),
                format!("Exercise the behavior: {line}"),
            ],
            expected_results: vec![format!("{line} holds")],
            based_on: "Acceptance Criteria".into(),
        });
    }

    // 2. technical details
    for line in &sections.technical_details {
        out.push(TestCaseProposal {
            title: format!("Technical Validation: {line}"),
            test_type: ProposalType::Technical,
            priority: Priority::Medium,
            description: format!("Validate the technical requirement: {line}"),
            preconditions: vec!["Technical environment matches the ticket".into()],
            steps: vec![format!("Inspect and exercise: {line}")],
            expected_results: vec!["Implementation follows the technical detail".into()],
            based_on: "Technical Details".into(),
        });
    }

    // 3. callables
    for name in fingerprints.iter().flat_map(|f| f.callables.iter().map(|c| &c.name)) {
        out.push(TestCaseProposal {
            title: format!("Unit Test: {name}"),
            test_type: ProposalType::Unit,
            priority: Priority::High,
            description: format!("Unit tests for `{name}`"),
            preconditions: vec![format!("`{name}` is importable in isolation")],
            steps: vec![
                format!("Call `{name}` with representative inputs"),
                format!("Call `{name}` with edge-case inputs"),
            ],
            expected_results: vec![
                "Return values match the documented behavior".into(),
                "Invalid input is rejected cleanly".into(),
            ],
            based_on: "Code Analysis".into(),
        });
    }

    // 4. types
    for ty in fingerprints.iter().flat_map(|f| f.declared_types.iter()) {
        let name = &ty.name;
        let members = if ty.members.is_empty() {
            "its public surface".to_string()
        } else {
            ty.members.join(", ")
        };
        out.push(TestCaseProposal {
            title: format!("Class Test: {name}"),
            test_type: ProposalType::Unit,
            priority: Priority::High,
            description: format!("Unit tests for `{name}` covering {members}"),
            preconditions: vec![format!("An instance of `{name}` can be constructed")],
            steps: vec![
                format!("Construct `{name}`"),
                format!("Exercise {members}"),
            ],
            expected_results: vec![format!("`{name}` keeps its invariants across calls")],
            based_on: "Code Analysis".into(),
        });
    }

    // 5. endpoints
    for path in fingerprints.iter().flat_map(|f| f.api_endpoints.iter()) {
        out.push(TestCaseProposal {
            title: format!("API Test for endpoint {path}"),
            test_type: ProposalType::Api,
            priority: Priority::High,
            description: format!("Verify the functionality of the {path} endpoint"),
            preconditions: vec!["Service is running and reachable".into()],
            steps: vec![
                format!("Send a valid request to {path}"),
                format!("Send a malformed request to {path}"),
            ],
            expected_results: vec![
                "Valid request returns a success status and the documented body".into(),
                "Malformed request returns a client error".into(),
            ],
            based_on: "API Analysis".into(),
        });
    }

    // 6. persistence, one aggregate proposal
    let mut seen = HashSet::new();
    let operations: Vec<&str> = fingerprints
        .iter()
        .flat_map(|f| f.persistence_operations.iter())
        .map(String::as_str)
        .filter(|op| seen.insert(*op))
        .collect();

    if !operations.is_empty() {
        let listed = operations.join(", ");
        out.push(TestCaseProposal {
            title: "Database Integration Tests".into(),
            test_type: ProposalType::Integration,
            priority: Priority::High,
            description: format!("Integration tests for database operations: {listed}"),
            preconditions: vec!["A disposable test database is available".into()],
            steps: vec![
                "Seed the database with known fixtures".into(),
                format!("Run the code paths performing: {listed}"),
            ],
            expected_results: vec!["Stored data matches the expected state".into()],
            based_on: "Persistence Analysis".into(),
        });
    }

    dedupe_proposals(out)
}

/// Keep the first proposal for every `(title, type)`.
pub fn dedupe_proposals(proposals: Vec<TestCaseProposal>) -> Vec<TestCaseProposal> {
    let mut seen = HashSet::new();
    proposals
        .into_iter()
        .filter(|p| {
            let (title, test_type) = p.identity();
            seen.insert((title.to_owned(), test_type))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::fingerprint::{Callable, DeclaredType, FileClassification};
    use crate::detectors::language::SourceLanguage;

    fn fingerprint() -> SourceFingerprint {
        SourceFingerprint {
            language: SourceLanguage::Python,
            declared_types: vec![DeclaredType {
                name: "Foo".into(),
                members: vec!["bar".into(), "baz".into()],
            }],
            callables: vec![],
            imports: vec![],
            api_endpoints: vec![],
            persistence_operations: vec![],
            file_classification: FileClassification::Unknown,
        }
    }

    #[test]
    fn one_class_proposal_per_type() {
        let out = synthesize(&[fingerprint()], &TicketSections::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Class Test: Foo");
        assert_eq!(out[0].test_type, ProposalType::Unit);
    }

    #[test]
    fn rules_fire_in_order() {
        let mut fp = fingerprint();
        fp.callables.push(Callable {
            name: "login".into(),
            parameters: vec!["user".into()],
        });
        fp.api_endpoints.push("/login".into());
        fp.persistence_operations = vec!["session.add".into(), "users".into()];

        let mut second = fingerprint();
        second.declared_types.clear();
        second.persistence_operations = vec!["session.add".into()];

        let sections =
            TicketSections::parse("Acceptance Criteria\nuser logs in\nTechnical\nuse JWT");
        let out = synthesize(&[fp, second], &sections);

        let titles: Vec<_> = out.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Verify user logs in",
                "Technical Validation: use JWT",
                "Unit Test: login",
                "Class Test: Foo",
                "API Test for endpoint /login",
                "Database Integration Tests",
            ]
        );
        assert_eq!(out[1].priority, Priority::Medium);
        assert!(out[5].description.ends_with("session.add, users"));
        assert!(out.iter().all(|p| !p.steps.is_empty()
            && !p.preconditions.is_empty()
            && !p.expected_results.is_empty()
            && !p.based_on.is_empty()));
    }

    #[test]
    fn duplicate_titles_collapse_to_first() {
        let sections = TicketSections::parse("Acceptance Criteria\nlogin\nlogin");
        let out = synthesize(&[], &sections);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn same_title_different_type_is_kept() {
        let mut a = synthesize(&[fingerprint()], &TicketSections::default());
        let mut b = a[0].clone();
        b.test_type = ProposalType::Integration;
        a.push(b);
        assert_eq!(dedupe_proposals(a).len(), 2);
    }

    #[test]
    fn nothing_in_nothing_out() {
        assert!(synthesize(&[], &TicketSections::default()).is_empty());
    }
}
