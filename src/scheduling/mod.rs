// Turn scheduling
//
// Round 0 and the final-vote round always belong to p1. Discussion rounds in
// between are resolved by a NextSpeaker implementation: a precomputed random
// schedule or a moderator consulted every round.

use anyhow::Result;
use async_trait::async_trait;

use crate::game::GameSetup;
use crate::session::History;

pub mod assignment;
pub mod moderator;

pub use assignment::{random_assignment, StaticSchedule};
pub use moderator::{extract_next_speaker, ModeratorScheduler};

/// Where a round sits in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Round 0: p1 proposes the seeded deal.
    Opening,
    /// Rounds 1..rounds_num-1.
    Discussion,
    /// Round rounds_num: p1 consolidates the final proposal.
    FinalVote,
    /// Past the final vote.
    Done,
}

impl RoundPhase {
    pub fn for_round(round: usize, rounds_num: usize) -> Self {
        if round == 0 {
            RoundPhase::Opening
        } else if round < rounds_num {
            RoundPhase::Discussion
        } else if round == rounds_num {
            RoundPhase::FinalVote
        } else {
            RoundPhase::Done
        }
    }

    /// p1 speaks in this phase regardless of scheduler.
    pub fn is_forced(self) -> bool {
        matches!(self, RoundPhase::Opening | RoundPhase::FinalVote)
    }
}

/// Resolves who speaks in a discussion round.
#[async_trait]
pub trait NextSpeaker: Send {
    /// Name of the speaker for `round`. Implementations are only asked about
    /// discussion rounds; the caller checks the name against the roster.
    async fn next_speaker(&mut self, round: usize, history: &History) -> Result<String>;

    /// Round assignment to snapshot into the first record. Empty when speakers
    /// are chosen on the fly.
    fn round_assignment(&self) -> Vec<String>;

    fn label(&self) -> &str;
}

/// Speaker forced by the phase, if any.
pub fn forced_speaker(phase: RoundPhase, setup: &GameSetup) -> Option<&str> {
    phase.is_forced().then(|| setup.p1().name.as_str())
}
