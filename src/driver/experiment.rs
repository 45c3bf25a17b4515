// Experiment assembly: load the game, open the session, wire the driver

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::RoundDriver;
use crate::agent::{ModeratorAgent, ParticipantAgent};
use crate::config::ExperimentSettings;
use crate::context::ContextSettings;
use crate::deal::{evaluate_response, DealEvaluation};
use crate::errors::NegotiationError;
use crate::game::setup::{CONFIG_FILE, GLOBAL_INSTRUCTIONS_FILE, INITIAL_DEAL_FILE, SCORES_DIR};
use crate::game::GameSetup;
use crate::providers::CompletionClient;
use crate::scheduling::{ModeratorScheduler, NextSpeaker, StaticSchedule};
use crate::session::{History, ModeratorLog, OpenMode, SessionStore};

/// Outcome of one experiment run.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub exp_name: String,
    pub history_path: PathBuf,
    pub rounds_run: usize,
    pub rounds_recorded: usize,
    /// Present once the final-vote round is recorded.
    pub evaluation: Option<DealEvaluation>,
}

/// Run (or resume) one experiment against `client`.
pub async fn run_experiment(
    settings: &ExperimentSettings,
    game_dir: &Path,
    mode: OpenMode,
    client: Arc<dyn CompletionClient>,
) -> Result<ExperimentReport> {
    // A resumed session keeps playing the game it started with.
    let source = match mode {
        OpenMode::Resume => game_source(settings, game_dir),
        OpenMode::Create | OpenMode::Overwrite => game_dir.to_path_buf(),
    };
    let setup = GameSetup::load(&source, settings.agents_num, settings.issues_num)
        .with_context(|| format!("Failed to load game from {}", source.display()))?;

    let history_path = settings.history_path(game_dir);
    let store = SessionStore::open(&history_path, mode)?;
    if store.history().is_empty() {
        snapshot_game_files(game_dir, &settings.session_dir(game_dir))?;
    }

    let context = ContextSettings {
        window_size: settings.window_size,
        rounds_num: settings.rounds_num,
    };

    let scheduler =
        build_scheduler(settings, game_dir, mode, &setup, &store, context, client.clone())?;

    let agents = setup
        .participants()
        .iter()
        .map(|p| ParticipantAgent::new(p, &setup, context, settings.temperature, client.clone()))
        .collect();

    let mut driver = RoundDriver::new(setup, agents, scheduler, store, settings.rounds_num);
    let rounds_run = driver.run().await?;

    let evaluation = final_evaluation(driver.setup(), driver.history(), settings.rounds_num);
    if let Some(eval) = &evaluation {
        info!(
            "Final deal {}: {} of {} parties accept, {}",
            eval.deal,
            eval.accepting(),
            eval.scores.len(),
            if eval.passed { "passed" } else { "failed" }
        );
    }

    Ok(ExperimentReport {
        exp_name: settings.exp_name.clone(),
        history_path,
        rounds_run,
        rounds_recorded: driver.history().len(),
        evaluation,
    })
}

fn build_scheduler(
    settings: &ExperimentSettings,
    game_dir: &Path,
    mode: OpenMode,
    setup: &GameSetup,
    store: &SessionStore,
    context: ContextSettings,
    client: Arc<dyn CompletionClient>,
) -> Result<Box<dyn NextSpeaker>> {
    if settings.moderator {
        let agent = ModeratorAgent::new(
            setup,
            context,
            settings.moderator_model.clone(),
            settings.temperature,
            client,
        );
        let log = ModeratorLog::open(settings.moderator_log_path(game_dir), mode)?;
        return Ok(Box::new(ModeratorScheduler::new(agent, log)));
    }

    if store.history().is_empty() {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        return Ok(Box::new(StaticSchedule::generate(
            setup,
            settings.rounds_num,
            &mut rng,
        )));
    }

    let schedule = StaticSchedule::new(store.round_assignment());
    schedule
        .check(setup, settings.rounds_num)
        .map_err(|reason| NegotiationError::corrupt(store.path(), reason))?;
    Ok(Box::new(schedule))
}

/// Copy the game files next to the session so a run can be resumed and
/// scored later even if the game directory changes.
fn snapshot_game_files(game_dir: &Path, session_dir: &Path) -> Result<()> {
    fs::create_dir_all(session_dir)
        .with_context(|| format!("Failed to create {}", session_dir.display()))?;

    for file in [CONFIG_FILE, INITIAL_DEAL_FILE] {
        fs::copy(game_dir.join(file), session_dir.join(file))
            .with_context(|| format!("Failed to copy {} into session directory", file))?;
    }
    let instructions = game_dir.join(GLOBAL_INSTRUCTIONS_FILE);
    if instructions.is_file() {
        fs::copy(&instructions, session_dir.join(GLOBAL_INSTRUCTIONS_FILE))
            .context("Failed to copy global instructions into session directory")?;
    }

    let scores_src = game_dir.join(SCORES_DIR);
    let scores_dst = session_dir.join(SCORES_DIR);
    fs::create_dir_all(&scores_dst)?;
    for entry in fs::read_dir(&scores_src)
        .with_context(|| format!("Failed to read {}", scores_src.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::copy(entry.path(), scores_dst.join(entry.file_name()))?;
        }
    }
    Ok(())
}

/// Directory holding the game a session was played with: the session's own
/// snapshot when there is one, the live game directory otherwise.
pub fn game_source(settings: &ExperimentSettings, game_dir: &Path) -> PathBuf {
    let session_dir = settings.session_dir(game_dir);
    let has_snapshot = [CONFIG_FILE, INITIAL_DEAL_FILE, SCORES_DIR]
        .iter()
        .all(|name| session_dir.join(name).exists());
    if has_snapshot {
        session_dir
    } else {
        game_dir.to_path_buf()
    }
}

/// Evaluate the final-vote record, if the session got that far.
pub fn final_evaluation(
    setup: &GameSetup,
    history: &History,
    rounds_num: usize,
) -> Option<DealEvaluation> {
    let last = history.last()?;
    if last.round != rounds_num {
        return None;
    }
    Some(evaluate_response(setup, &last.response))
}

/// Score a persisted session without running anything.
pub fn score_session(settings: &ExperimentSettings, game_dir: &Path) -> Result<DealEvaluation> {
    let source = game_source(settings, game_dir);
    let setup = GameSetup::load(&source, settings.agents_num, settings.issues_num)
        .with_context(|| format!("Failed to load game from {}", source.display()))?;
    let history_path = settings.history_path(game_dir);
    let store = SessionStore::open(&history_path, OpenMode::Resume)?;

    if let Some(eval) = final_evaluation(&setup, store.history(), settings.rounds_num) {
        return Ok(eval);
    }

    let last = store.history().last().ok_or_else(|| {
        NegotiationError::corrupt(&history_path, "session has no recorded turns to score")
    })?;
    warn!(
        "Session stopped at round {} before the final vote; scoring the last response",
        last.round
    );
    Ok(evaluate_response(&setup, &last.response))
}
