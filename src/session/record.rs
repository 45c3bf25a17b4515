// Turn records and the append-only history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One speaker's turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub speaker: String,
    pub round: usize,
    /// Rendered prompt the speaker was given.
    pub slot_prompt: String,
    /// Raw completion text, private sections included.
    pub response: String,
    pub timestamp: DateTime<Utc>,
    /// Round-to-speaker assignment; carried by the first record only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_assignment: Option<Vec<String>>,
}

impl TurnRecord {
    pub fn new(
        speaker: impl Into<String>,
        round: usize,
        slot_prompt: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            round,
            slot_prompt: slot_prompt.into(),
            response: response.into(),
            timestamp: Utc::now(),
            round_assignment: None,
        }
    }

    pub fn with_round_assignment(mut self, assignment: Vec<String>) -> Self {
        self.round_assignment = Some(assignment);
        self
    }
}

/// Ordered turn records. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    turns: Vec<TurnRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_turns(turns: Vec<TurnRecord>) -> Self {
        Self { turns }
    }

    pub(crate) fn push(&mut self, turn: TurnRecord) {
        self.turns.push(turn);
    }

    pub(crate) fn pop(&mut self) -> Option<TurnRecord> {
        self.turns.pop()
    }

    pub fn turns(&self) -> &[TurnRecord] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&TurnRecord> {
        self.turns.last()
    }

    /// Records from rounds before `round`.
    pub fn before_round(&self, round: usize) -> impl Iterator<Item = &TurnRecord> + '_ {
        self.turns.iter().filter(move |t| t.round < round)
    }

    /// Assignment snapshot stored on the first record.
    pub fn round_assignment(&self) -> Option<&[String]> {
        self.turns
            .first()
            .and_then(|t| t.round_assignment.as_deref())
    }

    /// Number of rounds with a record. Rounds are contiguous from 0, one
    /// record each, so this is also the next round to run.
    pub fn completed_rounds(&self) -> usize {
        self.turns.len()
    }
}
