// Experiment settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::NegotiationError;
use crate::providers::openai::DEFAULT_BASE_URL;

pub const DEFAULT_MODERATOR_MODEL: &str = "gpt-4.1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Completion API access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Falls back to `OPENAI_API_KEY` when unset.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Attempts per completion call, first try included.
    pub max_attempts: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_attempts: 3,
        }
    }
}

/// One experiment run: game shape, scheduling mode, and where state goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentSettings {
    pub exp_name: String,
    /// Let a moderator pick discussion speakers instead of a random schedule.
    pub moderator: bool,
    pub moderator_model: String,
    pub temperature: f32,
    pub agents_num: usize,
    pub issues_num: usize,
    /// Index of the final-vote round.
    pub rounds_num: usize,
    pub window_size: usize,
    /// Relative paths resolve against the game directory.
    pub output_dir: PathBuf,
    pub output_file: String,
    pub moderator_file: String,
    /// Seed for the static schedule; random when unset.
    pub seed: Option<u64>,
    pub api: ApiSettings,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self {
            exp_name: "all_greedy".to_string(),
            moderator: false,
            moderator_model: DEFAULT_MODERATOR_MODEL.to_string(),
            temperature: 0.0,
            agents_num: 6,
            issues_num: 5,
            rounds_num: 24,
            window_size: 6,
            output_dir: PathBuf::from("output"),
            output_file: "history.json".to_string(),
            moderator_file: "moderator_history.jsonl".to_string(),
            seed: None,
            api: ApiSettings::default(),
        }
    }
}

impl ExperimentSettings {
    /// Reject settings no session could run with.
    pub fn validate(&self) -> Result<(), NegotiationError> {
        if self.rounds_num < 1 {
            return Err(NegotiationError::setup("rounds_num must be at least 1"));
        }
        if !(1..=26).contains(&self.issues_num) {
            return Err(NegotiationError::setup(format!(
                "issues_num must be between 1 and 26, got {}",
                self.issues_num
            )));
        }
        if self.agents_num < 2 {
            return Err(NegotiationError::setup(format!(
                "agents_num must be at least 2, got {}",
                self.agents_num
            )));
        }
        if self.window_size < 1 {
            return Err(NegotiationError::setup("window_size must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(NegotiationError::setup(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        if self.exp_name.trim().is_empty() || self.output_file.trim().is_empty() {
            return Err(NegotiationError::setup(
                "exp_name and output_file must not be empty",
            ));
        }
        Ok(())
    }

    /// Directory holding this experiment's session files.
    pub fn session_dir(&self, game_dir: &Path) -> PathBuf {
        game_dir.join(&self.output_dir).join(&self.exp_name)
    }

    pub fn history_path(&self, game_dir: &Path) -> PathBuf {
        self.session_dir(game_dir).join(&self.output_file)
    }

    pub fn moderator_log_path(&self, game_dir: &Path) -> PathBuf {
        self.session_dir(game_dir).join(&self.moderator_file)
    }

    /// API key from settings, then the environment.
    pub fn resolve_api_key(&self) -> Result<String, NegotiationError> {
        self.api
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
            .ok_or_else(|| {
                NegotiationError::setup(format!(
                    "no API key: set api.api_key in experiment.toml or export {}",
                    API_KEY_ENV
                ))
            })
    }
}
