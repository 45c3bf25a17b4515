// Utility tables: per-party private scores for every issue option

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{issue_letter, issue_letters};
use crate::errors::NegotiationError;

/// A party's private score table.
///
/// Options are 1-indexed in deals (`A1` is the first entry of issue A) and
/// 0-indexed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityTable {
    issues: BTreeMap<char, Vec<i64>>,
    min_score: i64,
}

impl UtilityTable {
    /// Build a table from option lists in issue order (A, B, C, ...).
    pub fn from_rows(rows: Vec<Vec<i64>>, min_score: i64) -> Self {
        let issues = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| (issue_letter(i), row))
            .collect();
        Self { issues, min_score }
    }

    /// Parse a scores file body.
    ///
    /// The file has exactly `num_issues + 1` lines: one comma-separated row per
    /// issue, then a single integer holding the minimum acceptable score.
    /// Trailing blank lines are ignored.
    pub fn parse(contents: &str, num_issues: usize) -> Result<Self, NegotiationError> {
        let lines: Vec<&str> = contents.trim_end().lines().collect();
        if lines.len() != num_issues + 1 {
            return Err(NegotiationError::setup(format!(
                "scores file has {} lines, expected {} ({} issues + minimum score)",
                lines.len(),
                num_issues + 1,
                num_issues
            )));
        }

        let mut issues = BTreeMap::new();
        for (letter, line) in issue_letters(num_issues).zip(&lines) {
            let row = line
                .split(',')
                .map(|cell| cell.trim().parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| {
                    NegotiationError::setup(format!(
                        "issue {} has a non-integer score in {:?}: {}",
                        letter, line, e
                    ))
                })?;
            issues.insert(letter, row);
        }

        let min_line = lines[num_issues];
        let min_score = min_line.trim().parse::<i64>().map_err(|e| {
            NegotiationError::setup(format!(
                "minimum score line {:?} is not an integer: {}",
                min_line, e
            ))
        })?;

        Ok(Self { issues, min_score })
    }

    /// Load and parse a scores file from disk.
    pub fn load(path: &Path, num_issues: usize) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scores file {}", path.display()))?;
        Self::parse(&contents, num_issues)
            .with_context(|| format!("Invalid scores file {}", path.display()))
    }

    /// Scores for each option of `issue`, or None if the table has no such issue.
    pub fn options(&self, issue: char) -> Option<&[i64]> {
        self.issues.get(&issue).map(Vec::as_slice)
    }

    pub fn num_issues(&self) -> usize {
        self.issues.len()
    }

    pub fn min_score(&self) -> i64 {
        self.min_score
    }

    /// Render the table as prompt text, one line per option.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (issue, row) in &self.issues {
            out.push_str(&format!("Issue {}:\n", issue));
            for (i, score) in row.iter().enumerate() {
                out.push_str(&format!("  {}{}: {} points\n", issue, i + 1, score));
            }
        }
        out.push_str(&format!("Minimum acceptable total score: {}\n", self.min_score));
        out
    }
}
