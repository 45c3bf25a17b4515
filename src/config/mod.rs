// Configuration module
// Public interface for experiment settings

mod loader;
mod settings;

pub use loader::{load_settings, resolve_settings, SettingsOverrides, SETTINGS_FILE};
pub use settings::{ApiSettings, ExperimentSettings, API_KEY_ENV, DEFAULT_MODERATOR_MODEL};
