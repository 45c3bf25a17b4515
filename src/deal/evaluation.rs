// Final-deal evaluation: per-party scores and the pass/veto verdict

use serde::Serialize;

use super::parser::{extract_deal, Deal};
use super::scorer::score;
use crate::game::{GameSetup, Role};
use crate::markup;

#[derive(Debug, Clone, Serialize)]
pub struct PartyScore {
    pub name: String,
    pub role: Role,
    pub score: i64,
    pub min_score: i64,
    /// The deal is complete and meets this party's minimum.
    pub accepts: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DealEvaluation {
    pub deal: Deal,
    pub issues_suggested: usize,
    pub scores: Vec<PartyScore>,
    /// At least n-1 parties accept, including both veto holders.
    pub passed: bool,
}

impl DealEvaluation {
    pub fn accepting(&self) -> usize {
        self.scores.iter().filter(|s| s.accepts).count()
    }

    pub fn score_of(&self, name: &str) -> Option<i64> {
        self.scores.iter().find(|s| s.name == name).map(|s| s.score)
    }
}

/// Score `deal` for every party and apply the voting rule.
pub fn evaluate(setup: &GameSetup, deal: Deal, issues_suggested: usize) -> DealEvaluation {
    let num_issues = setup.num_issues;
    let complete = deal.is_well_formed(num_issues);

    let scores: Vec<PartyScore> = setup
        .participants()
        .iter()
        .map(|p| {
            let points = score(&p.utility, &deal, num_issues);
            PartyScore {
                name: p.name.clone(),
                role: p.role.clone(),
                score: points,
                min_score: p.utility.min_score(),
                accepts: complete && points >= p.utility.min_score(),
            }
        })
        .collect();

    let accepting = scores.iter().filter(|s| s.accepts).count();
    let veto_ok = scores
        .iter()
        .filter(|s| s.role.is_veto())
        .all(|s| s.accepts);
    let passed = veto_ok && accepting + 1 >= scores.len();

    DealEvaluation {
        deal,
        issues_suggested,
        scores,
        passed,
    }
}

/// Extract the deal from the public part of a response and evaluate it.
///
/// Only the `<ANSWER>` section is considered, so option tokens that appear in a
/// private scratchpad do not leak into the deal.
pub fn evaluate_response(setup: &GameSetup, response: &str) -> DealEvaluation {
    let public = markup::public_text(response);
    let (deal, suggested) = extract_deal(&public, setup.num_issues);
    evaluate(setup, deal, suggested)
}
