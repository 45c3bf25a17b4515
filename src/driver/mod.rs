// Round driver: the sequential control loop
//
// For each round from the first unrecorded one through the final vote:
// resolve the speaker, render their prompt, await the completion, append the
// record. Nothing is prefetched and the store is only touched after a call
// returns.

pub mod experiment;

pub use experiment::{run_experiment, score_session, ExperimentReport};

use anyhow::Result;
use std::collections::HashMap;
use tracing::info;

use crate::agent::ParticipantAgent;
use crate::errors::NegotiationError;
use crate::game::GameSetup;
use crate::scheduling::{forced_speaker, NextSpeaker, RoundPhase};
use crate::session::{History, SessionStore, TurnRecord};

pub struct RoundDriver {
    setup: GameSetup,
    agents: HashMap<String, ParticipantAgent>,
    scheduler: Box<dyn NextSpeaker>,
    store: SessionStore,
    rounds_num: usize,
}

impl RoundDriver {
    pub fn new(
        setup: GameSetup,
        agents: Vec<ParticipantAgent>,
        scheduler: Box<dyn NextSpeaker>,
        store: SessionStore,
        rounds_num: usize,
    ) -> Self {
        let agents = agents
            .into_iter()
            .map(|agent| (agent.name().to_string(), agent))
            .collect();

        Self {
            setup,
            agents,
            scheduler,
            store,
            rounds_num,
        }
    }

    pub fn history(&self) -> &History {
        self.store.history()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn setup(&self) -> &GameSetup {
        &self.setup
    }

    /// Run every remaining round. Returns how many rounds were executed.
    pub async fn run(&mut self) -> Result<usize> {
        let start = self.store.start_round();
        if start > self.rounds_num {
            info!(
                "Session at {} already complete ({} rounds recorded)",
                self.store.path().display(),
                start
            );
            return Ok(0);
        }

        info!(
            "Running rounds {}..={} with {} scheduling",
            start,
            self.rounds_num,
            self.scheduler.label()
        );

        for round in start..=self.rounds_num {
            self.run_round(round).await?;
        }

        Ok(self.rounds_num + 1 - start)
    }

    async fn run_round(&mut self, round: usize) -> Result<()> {
        let phase = RoundPhase::for_round(round, self.rounds_num);

        let speaker = match forced_speaker(phase, &self.setup) {
            Some(p1) => p1.to_string(),
            None => {
                self.scheduler
                    .next_speaker(round, self.store.history())
                    .await?
            }
        };

        let agent = self.agents.get(&speaker).ok_or_else(|| {
            NegotiationError::protocol(format!(
                "{} scheduler named unknown party {:?} for round {}",
                self.scheduler.label(),
                speaker,
                round
            ))
        })?;

        let output = agent.execute_round(self.store.history(), round).await?;

        let mut record = TurnRecord::new(speaker, round, output.slot_prompt, output.response);
        if round == 0 {
            record = record.with_round_assignment(self.scheduler.round_assignment());
        }

        info!(
            "Round {}/{} ({:?}): {} responded with {} chars",
            round,
            self.rounds_num,
            phase,
            record.speaker,
            record.response.len()
        );

        self.store.append(record)?;
        Ok(())
    }
}
