// Moderator-driven speaker selection

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::NextSpeaker;
use crate::agent::ModeratorAgent;
use crate::errors::NegotiationError;
use crate::markup::{self, Tag};
use crate::session::{History, ModeratorLog, ModeratorTurn};

/// Pull the next speaker's name out of a moderator response.
///
/// The first `<PARTY>` directive wins. A response without one is a protocol
/// violation; there is no fallback speaker.
pub fn extract_next_speaker(response: &str) -> Result<String, NegotiationError> {
    markup::first(response, Tag::Party)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            NegotiationError::protocol(format!(
                "moderator response has no <PARTY> directive: {:?}",
                truncate(response, 200)
            ))
        })
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Asks the moderator for every discussion round and records each exchange
/// in the moderator log.
pub struct ModeratorScheduler {
    agent: ModeratorAgent,
    log: ModeratorLog,
}

impl ModeratorScheduler {
    pub fn new(agent: ModeratorAgent, log: ModeratorLog) -> Self {
        Self { agent, log }
    }

    fn previous_plan(&self) -> Option<String> {
        self.log
            .last()
            .and_then(|turn| markup::last(&turn.response, Tag::Plan))
            .map(|plan| plan.trim().to_string())
            .filter(|plan| !plan.is_empty())
    }
}

#[async_trait]
impl NextSpeaker for ModeratorScheduler {
    async fn next_speaker(&mut self, round: usize, history: &History) -> Result<String> {
        let previous_plan = self.previous_plan();
        let output = self
            .agent
            .execute_round(history, round, previous_plan.as_deref())
            .await?;

        let chosen = extract_next_speaker(&output.response);
        // Rejected responses are logged too, with no chosen party.
        let logged = chosen.as_deref().unwrap_or_default();
        self.log.append(ModeratorTurn::new(
            round,
            output.slot_prompt,
            output.response,
            logged,
        ))?;

        let chosen = chosen?;
        info!("Round {}: moderator picked {}", round, chosen);
        Ok(chosen)
    }

    fn round_assignment(&self) -> Vec<String> {
        Vec::new()
    }

    fn label(&self) -> &str {
        "moderator"
    }
}
