// Deal extraction from free-text proposals

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::{issue_letter, issue_letters};

/// One pick per issue in canonical order; an empty string marks an unset slot.
///
/// Slots are kept as raw tokens so that malformed input can be represented
/// and rejected by the scorer instead of at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deal {
    slots: Vec<String>,
}

impl Deal {
    pub fn from_slots<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: slots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding a pick.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// Every one of `num_issues` slots holds a token for its own issue letter
    /// with an option digit in 1..=9.
    pub fn is_well_formed(&self, num_issues: usize) -> bool {
        self.slots.len() == num_issues
            && self.slots.iter().enumerate().all(|(i, slot)| {
                let mut chars = slot.chars();
                matches!(
                    (chars.next(), chars.next(), chars.next()),
                    (Some(letter), Some('1'..='9'), None) if letter == issue_letter(i)
                )
            })
    }

    /// Non-empty tokens joined in issue order, e.g. `"A2, B1, D3"`.
    pub fn canonical(&self) -> String {
        self.slots
            .iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Deal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: Vec<&str> = self
            .slots
            .iter()
            .map(|s| if s.is_empty() { "_" } else { s.as_str() })
            .collect();
        write!(f, "[{}]", shown.join(", "))
    }
}

static OPTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    issue_letters(26)
        .map(|letter| Regex::new(&format!("{}[1-9]", letter)).expect("static option regex"))
        .collect()
});

/// Pull a deal out of a free-text answer.
///
/// Newlines are removed first so a token split across lines still matches.
/// For each issue letter in order, the first `<LETTER><1-9>` occurrence wins;
/// issues with no match get an empty slot. Returns the deal and the number of
/// issues that were suggested.
pub fn extract_deal(answer: &str, num_issues: usize) -> (Deal, usize) {
    let flattened: String = answer.chars().filter(|c| *c != '\n' && *c != '\r').collect();

    let slots: Vec<String> = OPTION_PATTERNS
        .iter()
        .take(num_issues)
        .map(|pattern| {
            pattern
                .find(&flattened)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
        .collect();

    let deal = Deal { slots };
    let suggested = deal.filled();
    (deal, suggested)
}
