// Settings loader
// experiment.toml in the game directory, then command-line overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::settings::ExperimentSettings;
use crate::errors::NegotiationError;

pub const SETTINGS_FILE: &str = "experiment.toml";

/// Values given on the command line. `None` keeps the file or default value.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub exp_name: Option<String>,
    pub moderator: Option<bool>,
    pub moderator_model: Option<String>,
    pub temperature: Option<f32>,
    pub agents_num: Option<usize>,
    pub issues_num: Option<usize>,
    pub rounds_num: Option<usize>,
    pub window_size: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub output_file: Option<String>,
    pub seed: Option<u64>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl SettingsOverrides {
    pub fn apply(self, settings: &mut ExperimentSettings) {
        if let Some(value) = self.exp_name {
            settings.exp_name = value;
        }
        if let Some(value) = self.moderator {
            settings.moderator = value;
        }
        if let Some(value) = self.moderator_model {
            settings.moderator_model = value;
        }
        if let Some(value) = self.temperature {
            settings.temperature = value;
        }
        if let Some(value) = self.agents_num {
            settings.agents_num = value;
        }
        if let Some(value) = self.issues_num {
            settings.issues_num = value;
        }
        if let Some(value) = self.rounds_num {
            settings.rounds_num = value;
        }
        if let Some(value) = self.window_size {
            settings.window_size = value;
        }
        if let Some(value) = self.output_dir {
            settings.output_dir = value;
        }
        if let Some(value) = self.output_file {
            settings.output_file = value;
        }

        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if self.api_key.is_some() {
            settings.api.api_key = self.api_key;
        }
        if let Some(base_url) = self.base_url {
            settings.api.base_url = base_url;
        }
    }
}

/// Read `experiment.toml` from `game_dir` if present, defaults otherwise.
pub fn load_settings(game_dir: &Path) -> Result<ExperimentSettings> {
    let path = game_dir.join(SETTINGS_FILE);
    if !path.exists() {
        debug!("No {} in {}, using defaults", SETTINGS_FILE, game_dir.display());
        return Ok(ExperimentSettings::default());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let settings: ExperimentSettings = toml::from_str(&contents).map_err(|e| {
        NegotiationError::setup(format!("invalid {}: {}", path.display(), e))
    })?;

    debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load, override, validate.
pub fn resolve_settings(
    game_dir: &Path,
    overrides: SettingsOverrides,
) -> Result<ExperimentSettings> {
    let mut settings = load_settings(game_dir)?;
    overrides.apply(&mut settings);
    settings.validate()?;
    Ok(settings)
}
