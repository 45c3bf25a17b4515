// Speakers backed by a completion client
//
// An agent owns its standing initial prompt and a slot prompt builder. Each
// turn is one stateless call: [initial prompt, slot prompt] -> response.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

use crate::context::{
    moderator_prompt, participant_prompt, ContextSettings, ModeratorPrompts, RoundPrompts,
    MODERATOR_NAME,
};
use crate::game::{GameSetup, Participant};
use crate::providers::{CompletionClient, CompletionRequest};
use crate::session::History;

/// Prompt sent and text received for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutput {
    pub slot_prompt: String,
    pub response: String,
}

async fn complete_turn(
    client: &dyn CompletionClient,
    speaker: &str,
    model: &str,
    initial_prompt: &str,
    slot_prompt: String,
    temperature: f32,
    round: usize,
) -> Result<TurnOutput> {
    let request = CompletionRequest::turn(model, initial_prompt, slot_prompt.as_str(), temperature);

    debug!(
        "Round {}: {} prompt is {} chars via {} ({})",
        round,
        speaker,
        slot_prompt.len(),
        client.name(),
        model
    );

    let response = client
        .complete(&request)
        .await
        .with_context(|| format!("Completion failed for {} in round {}", speaker, round))?;

    Ok(TurnOutput {
        slot_prompt,
        response,
    })
}

pub struct ParticipantAgent {
    name: String,
    model: String,
    temperature: f32,
    initial_prompt: String,
    prompts: RoundPrompts,
    client: Arc<dyn CompletionClient>,
}

impl ParticipantAgent {
    pub fn new(
        participant: &Participant,
        setup: &GameSetup,
        settings: ContextSettings,
        temperature: f32,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            name: participant.name.clone(),
            model: participant.model.clone(),
            temperature,
            initial_prompt: participant_prompt(participant, setup),
            prompts: RoundPrompts::new(participant, setup, settings),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_prompt(&self) -> &str {
        &self.initial_prompt
    }

    /// Render this agent's prompt for `round` and query the model.
    pub async fn execute_round(&self, history: &History, round: usize) -> Result<TurnOutput> {
        let slot_prompt = self.prompts.render(history, round);
        complete_turn(
            self.client.as_ref(),
            &self.name,
            &self.model,
            &self.initial_prompt,
            slot_prompt,
            self.temperature,
            round,
        )
        .await
    }
}

/// Non-participant that picks the next speaker.
pub struct ModeratorAgent {
    model: String,
    temperature: f32,
    initial_prompt: String,
    prompts: ModeratorPrompts,
    client: Arc<dyn CompletionClient>,
}

impl ModeratorAgent {
    pub fn new(
        setup: &GameSetup,
        settings: ContextSettings,
        model: impl Into<String>,
        temperature: f32,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            model: model.into(),
            temperature,
            initial_prompt: moderator_prompt(setup),
            prompts: ModeratorPrompts::new(setup, settings),
            client,
        }
    }

    pub async fn execute_round(
        &self,
        history: &History,
        round: usize,
        previous_plan: Option<&str>,
    ) -> Result<TurnOutput> {
        let slot_prompt = self.prompts.render(history, round, previous_plan);
        complete_turn(
            self.client.as_ref(),
            MODERATOR_NAME,
            &self.model,
            &self.initial_prompt,
            slot_prompt,
            self.temperature,
            round,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Incentive, Role, UtilityTable};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Echo {
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for Echo {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(format!("<ANSWER>{}</ANSWER>", request.model))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct Failing;

    #[async_trait]
    impl CompletionClient for Failing {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            anyhow::bail!("upstream down")
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn setup() -> GameSetup {
        let party = |name: &str, role: Role, model: &str| Participant {
            name: name.to_string(),
            role,
            incentive: Incentive::Cooperative,
            model: model.to_string(),
            utility: UtilityTable::from_rows(vec![vec![1, 2]], 1),
        };
        GameSetup::new(
            vec![
                party("Alice", Role::P1, "model-a"),
                party("Bob", Role::P2, "model-b"),
            ],
            "A1".to_string(),
            None,
            1,
        )
        .unwrap()
    }

    fn settings() -> ContextSettings {
        ContextSettings {
            window_size: 4,
            rounds_num: 4,
        }
    }

    #[tokio::test]
    async fn test_participant_turn_sends_two_messages() {
        let client = Arc::new(Echo {
            seen: Mutex::new(Vec::new()),
        });
        let setup = setup();
        let agent = ParticipantAgent::new(
            setup.participant("Bob").unwrap(),
            &setup,
            settings(),
            0.5,
            client.clone(),
        );

        let out = agent.execute_round(&History::new(), 1).await.unwrap();
        assert_eq!(out.response, "<ANSWER>model-b</ANSWER>");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].messages.len(), 2);
        assert_eq!(seen[0].messages[0].content, agent.initial_prompt());
        assert_eq!(seen[0].slot_prompt(), out.slot_prompt);
        assert_eq!(seen[0].temperature, 0.5);
    }

    #[tokio::test]
    async fn test_completion_errors_carry_context() {
        let setup = setup();
        let agent = ModeratorAgent::new(&setup, settings(), "gpt-4.1", 0.0, Arc::new(Failing));
        let err = agent.execute_round(&History::new(), 2, None).await.unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("Moderator in round 2"));
        assert!(chain.contains("upstream down"));
    }
}
