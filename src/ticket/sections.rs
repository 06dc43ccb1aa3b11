//! ticket/sections.rs
//!
//! Splits a ticket description into acceptance criteria, technical
//! details, requirements and notes.
//!
//! Single forward pass. A line containing a heading keyword switches the
//! current section and is consumed; every other non-blank line lands in
//! the current section. The keyword test is a substring match, so a
//! sentence that merely mentions "requirement" also switches.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    AcceptanceCriteria,
    TechnicalDetails,
    Requirements,
    Notes,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::AcceptanceCriteria,
        Section::TechnicalDetails,
        Section::Requirements,
        Section::Notes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AcceptanceCriteria => "acceptance_criteria",
            Self::TechnicalDetails => "technical_details",
            Self::Requirements => "requirements",
            Self::Notes => "notes",
        }
    }

    /// Section a heading line switches to, if it is one.
    fn from_heading(lower: &str) -> Option<Self> {
        if lower.contains("acceptance criteria") {
            Some(Self::AcceptanceCriteria)
        } else if lower.contains("technical") || lower.contains("implementation") {
            Some(Self::TechnicalDetails)
        } else if lower.contains("requirement") {
            Some(Self::Requirements)
        } else {
            None
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized as an object whose keys keep the fixed section order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSections {
    pub acceptance_criteria: Vec<String>,
    pub technical_details: Vec<String>,
    pub requirements: Vec<String>,
    pub notes: Vec<String>,
}

impl TicketSections {
    pub fn parse(description: &str) -> Self {
        let mut sections = Self::default();
        let mut current = Section::Notes;

        for raw in description.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(next) = Section::from_heading(&line.to_lowercase()) {
                current = next;
                continue;
            }

            sections.lines_mut(current).push(strip_bullet(line).to_string());
        }

        sections
    }

    pub fn lines(&self, section: Section) -> &[String] {
        match section {
            Section::AcceptanceCriteria => &self.acceptance_criteria,
            Section::TechnicalDetails => &self.technical_details,
            Section::Requirements => &self.requirements,
            Section::Notes => &self.notes,
        }
    }

    fn lines_mut(&mut self, section: Section) -> &mut Vec<String> {
        match section {
            Section::AcceptanceCriteria => &mut self.acceptance_criteria,
            Section::TechnicalDetails => &mut self.technical_details,
            Section::Requirements => &mut self.requirements,
            Section::Notes => &mut self.notes,
        }
    }

    /// Every `(section, line)` pair in section order.
    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> + '_ {
        Section::ALL
            .into_iter()
            .flat_map(move |s| self.lines(s).iter().map(move |l| (s, l.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        Section::ALL.iter().all(|s| self.lines(*s).is_empty())
    }

    pub fn len(&self) -> usize {
        Section::ALL.iter().map(|s| self.lines(*s).len()).sum()
    }
}

fn strip_bullet(line: &str) -> &str {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim_start)
        .unwrap_or(line)
}
