// Context window construction
//
// Every prompt is a pure function of the history, the round index and the
// static game configuration.

pub mod initial;
pub mod prompts;
pub mod window;

pub use initial::{moderator_prompt, participant_prompt, MODERATOR_NAME};
pub use prompts::{ModeratorPrompts, PhaseFlags, RoundPrompts};
pub use window::{PersonalizedView, ViewEntry};

/// Session-wide knobs the prompt builders need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSettings {
    /// Records shown in the history block.
    pub window_size: usize,
    /// Index of the final-vote round.
    pub rounds_num: usize,
}
