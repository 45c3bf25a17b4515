// Deal parsing and scoring
//
// A deal is read out of a natural-language answer, then scored per party.
// Scoring is total: malformed deals are worth zero, never an error.

pub mod evaluation;
pub mod parser;
pub mod scorer;

pub use evaluation::{evaluate, evaluate_response, DealEvaluation, PartyScore};
pub use parser::{extract_deal, Deal};
pub use scorer::score;
