//! render.rs
//!
//! Output shapes for the collaborators: a wiki-markup tracker comment and
//! the body of a test-management "add case" request.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::testgen::proposal::{Priority, ProposalType, TestCaseProposal};

/// Tracker comment listing every proposal, grouped by type in first-seen
/// order, followed by per-type totals.
pub fn tracker_comment(proposals: &[TestCaseProposal]) -> String {
    let mut groups: Vec<(ProposalType, Vec<&TestCaseProposal>)> = Vec::new();
    for p in proposals {
        match groups.iter_mut().find(|(t, _)| *t == p.test_type) {
            Some((_, list)) => list.push(p),
            None => groups.push((p.test_type, vec![p])),
        }
    }

    let mut out = String::from("h2. Test Cases Generated\n\n");

    for (test_type, cases) in &groups {
        let _ = write!(out, "h3. {test_type} Tests\n\n");
        for (idx, case) in cases.iter().enumerate() {
            let _ = writeln!(out, "h4. {}. {}", idx + 1, case.title);
            let _ = write!(out, "*Priority:* {}\n\n", case.priority);

            if !case.preconditions.is_empty() {
                out.push_str("*Preconditions:*\n");
                for p in &case.preconditions {
                    let _ = writeln!(out, "* {p}");
                }
                out.push('\n');
            }

            out.push_str("*Steps:*\n");
            for step in &case.steps {
                let _ = writeln!(out, "# {step}");
            }
            out.push('\n');

            out.push_str("*Expected Results:*\n");
            for result in &case.expected_results {
                let _ = writeln!(out, "* {result}");
            }
            out.push_str("\n----\n\n");
        }
    }

    out.push_str("h3. Summary\n");
    let _ = writeln!(out, "* Total Test Cases: {}", proposals.len());
    for (test_type, cases) in &groups {
        let _ = writeln!(out, "* {test_type} Tests: {}", cases.len());
    }

    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStep {
    pub content: String,
    pub expected: String,
}

/// Request body for creating one test case under `section_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCasePayload {
    pub section_id: u64,
    pub title: String,
    pub type_id: u32,
    pub priority_id: u32,
    pub estimate: String,
    pub refs: String,
    /// `TestCaseProposal::id`, stable across runs.
    pub custom_proposal_id: String,
    pub custom_steps_separated: Vec<CaseStep>,
}

pub fn test_case_payload(
    proposal: &TestCaseProposal,
    section_id: u64,
    refs: &str,
) -> TestCasePayload {
    // Expected results pair with steps by position; surplus results go on the last step.
    let mut steps: Vec<CaseStep> = proposal
        .steps
        .iter()
        .enumerate()
        .map(|(i, s)| CaseStep {
            content: s.clone(),
            expected: proposal.expected_results.get(i).cloned().unwrap_or_default(),
        })
        .collect();

    if let Some(last) = steps.last_mut() {
        let surplus = proposal.expected_results.iter().skip(proposal.steps.len());
        for extra in surplus {
            if !last.expected.is_empty() {
                last.expected.push('\n');
            }
            last.expected.push_str(extra);
        }
    }

    TestCasePayload {
        section_id,
        title: proposal.title.clone(),
        type_id: type_id(proposal.test_type),
        priority_id: priority_id(proposal.priority),
        estimate: "15m".into(),
        refs: refs.to_string(),
        custom_proposal_id: proposal.id(),
        custom_steps_separated: steps,
    }
}

fn type_id(t: ProposalType) -> u32 {
    match t {
        ProposalType::Performance => 5,
        ProposalType::Security => 7,
        _ => 1,
    }
}

fn priority_id(p: Priority) -> u32 {
    match p {
        Priority::Critical => 1,
        Priority::High => 2,
        Priority::Medium => 3,
        Priority::Low => 4,
    }
}
