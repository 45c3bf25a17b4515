// Game definition: parties, roles, incentives and private score tables
//
// Everything here is loaded once from the game directory and stays read-only
// for the whole session.

pub mod participant;
pub mod setup;
pub mod utility;

pub use participant::{Incentive, Participant, ParticipantSpec, Role};
pub use setup::GameSetup;
pub use utility::UtilityTable;

/// Letter naming the issue at `index` (0 → 'A').
pub fn issue_letter(index: usize) -> char {
    debug_assert!(index < 26, "issue index {} out of range", index);
    char::from(b'A' + index as u8)
}

/// Issue letters for a game with `num_issues` issues, in canonical order.
pub fn issue_letters(num_issues: usize) -> impl Iterator<Item = char> {
    (0..num_issues.min(26)).map(issue_letter)
}
