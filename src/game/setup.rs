// Game directory loading: participants, scores files, seeded deal

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::participant::{Incentive, Participant, ParticipantSpec, Role};
use super::utility::UtilityTable;
use crate::errors::NegotiationError;

pub const CONFIG_FILE: &str = "config.txt";
pub const SCORES_DIR: &str = "scores_files";
pub const INITIAL_DEAL_FILE: &str = "initial_deal.txt";
pub const GLOBAL_INSTRUCTIONS_FILE: &str = "global_instructions.txt";

/// Everything loaded from a game directory before a session starts.
#[derive(Debug, Clone)]
pub struct GameSetup {
    participants: Vec<Participant>,
    p1: usize,
    p2: usize,
    /// Deal text p1 opens the negotiation with.
    pub initial_deal: String,
    /// Game description shared by all parties, if the directory provides one.
    pub global_instructions: Option<String>,
    pub num_issues: usize,
}

impl GameSetup {
    /// Load a game directory.
    ///
    /// Layout:
    /// - `config.txt`: one `name,scores_file,role,incentive,model` line per party
    /// - `scores_files/<scores_file>.txt`: one per party
    /// - `initial_deal.txt`: seeded opening deal
    /// - `global_instructions.txt`: optional shared game description
    pub fn load(game_dir: &Path, num_agents: usize, num_issues: usize) -> Result<Self> {
        let config_path = game_dir.join(CONFIG_FILE);
        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let specs = parse_config(&contents, num_agents)
            .with_context(|| format!("Invalid participant config {}", config_path.display()))?;

        let mut participants = Vec::with_capacity(specs.len());
        for spec in specs {
            let path = scores_path(game_dir, &spec.scores_file);
            let utility = UtilityTable::load(&path, num_issues)?;
            debug!(
                "Loaded scores for {} ({} issues, min {})",
                spec.name,
                utility.num_issues(),
                utility.min_score()
            );
            participants.push(Participant::from_spec(spec, utility));
        }

        let deal_path = game_dir.join(INITIAL_DEAL_FILE);
        let initial_deal = fs::read_to_string(&deal_path)
            .with_context(|| format!("Failed to read {}", deal_path.display()))?
            .trim()
            .to_string();

        let instructions_path = game_dir.join(GLOBAL_INSTRUCTIONS_FILE);
        let global_instructions = if instructions_path.exists() {
            Some(
                fs::read_to_string(&instructions_path).with_context(|| {
                    format!("Failed to read {}", instructions_path.display())
                })?,
            )
        } else {
            None
        };

        Self::new(participants, initial_deal, global_instructions, num_issues)
            .map_err(anyhow::Error::from)
    }

    /// Assemble a setup from already-built participants and validate roles.
    pub fn new(
        participants: Vec<Participant>,
        initial_deal: String,
        global_instructions: Option<String>,
        num_issues: usize,
    ) -> Result<Self, NegotiationError> {
        validate_roster(&participants)?;
        let position = |role: Role| {
            participants
                .iter()
                .position(|p| p.role == role)
                .ok_or_else(|| NegotiationError::setup(format!("no party with role {}", role)))
        };
        let p1 = position(Role::P1)?;
        let p2 = position(Role::P2)?;
        Ok(Self {
            participants,
            p1,
            p2,
            initial_deal,
            global_instructions,
            num_issues,
        })
    }

    pub fn participant(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.participants.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// The opening and consolidating party.
    pub fn p1(&self) -> &Participant {
        &self.participants[self.p1]
    }

    pub fn p2(&self) -> &Participant {
        &self.participants[self.p2]
    }

    pub fn target(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.role == Role::Target)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// Parse `config.txt`; the line count must equal the declared party count.
pub fn parse_config(
    contents: &str,
    num_agents: usize,
) -> Result<Vec<ParticipantSpec>, NegotiationError> {
    let lines: Vec<&str> = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() != num_agents {
        return Err(NegotiationError::setup(format!(
            "config has {} participant lines, expected {}",
            lines.len(),
            num_agents
        )));
    }

    lines.into_iter().map(str::parse).collect()
}

pub fn scores_path(game_dir: &Path, scores_file: &str) -> PathBuf {
    game_dir.join(SCORES_DIR).join(format!("{}.txt", scores_file))
}

fn validate_roster(participants: &[Participant]) -> Result<(), NegotiationError> {
    let mut seen = HashSet::new();
    for p in participants {
        if !seen.insert(p.name.as_str()) {
            return Err(NegotiationError::setup(format!(
                "duplicate participant name {:?}",
                p.name
            )));
        }
    }

    for (role, required) in [(Role::P1, true), (Role::P2, true), (Role::Target, false)] {
        let count = participants.iter().filter(|p| p.role == role).count();
        if count > 1 || (required && count == 0) {
            return Err(NegotiationError::setup(format!(
                "expected {} party with role {}, found {}",
                if required { "exactly one" } else { "at most one" },
                role,
                count
            )));
        }
    }

    let has_target = participants.iter().any(|p| p.role == Role::Target);
    if let Some(p) = participants
        .iter()
        .find(|p| p.incentive == Incentive::TargetedAdversarial)
    {
        if !has_target {
            return Err(NegotiationError::setup(format!(
                "{} is a targeted adversary but no party has the target role",
                p.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_game(dir: &Path, config: &str) {
        fs::create_dir_all(dir.join(SCORES_DIR)).unwrap();
        fs::write(dir.join(CONFIG_FILE), config).unwrap();
        for name in ["a", "b", "c"] {
            fs::write(scores_path(dir, name), "1,2\n3,4\n5\n").unwrap();
        }
        fs::write(dir.join(INITIAL_DEAL_FILE), "A1, B1\n").unwrap();
    }

    #[test]
    fn test_load_game_directory() {
        let dir = TempDir::new().unwrap();
        write_game(
            dir.path(),
            "Alice,a,p1,cooperative,m1\nBob,b,p2,greedy,m2\nCarol,c,target,cooperative,m3\n",
        );

        let setup = GameSetup::load(dir.path(), 3, 2).unwrap();
        assert_eq!(setup.len(), 3);
        assert_eq!(setup.p1().name, "Alice");
        assert_eq!(setup.p2().name, "Bob");
        assert_eq!(setup.target().map(|p| p.name.as_str()), Some("Carol"));
        assert_eq!(setup.initial_deal, "A1, B1");
        assert!(setup.global_instructions.is_none());
        assert_eq!(setup.names(), vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn test_config_count_mismatch_is_setup_error() {
        let err = parse_config("Alice,a,p1,cooperative,m1\n", 2).unwrap_err();
        assert!(err.is_setup());
    }

    #[test]
    fn test_missing_p2_rejected() {
        let dir = TempDir::new().unwrap();
        write_game(
            dir.path(),
            "Alice,a,p1,cooperative,m1\nBob,b,member,greedy,m2\n",
        );
        let err = GameSetup::load(dir.path(), 2, 2).unwrap_err();
        let typed = crate::errors::classify(&err).unwrap();
        assert!(typed.is_setup());
        assert!(err.to_string().contains("role p2"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let dir = TempDir::new().unwrap();
        write_game(dir.path(), "Alice,a,p1,cooperative,m1\nAlice,b,p2,greedy,m2\n");
        let err = GameSetup::load(dir.path(), 2, 2).unwrap_err();
        assert!(crate::errors::classify(&err).unwrap().is_setup());
    }

    #[test]
    fn test_targeted_adversary_requires_target() {
        let dir = TempDir::new().unwrap();
        write_game(
            dir.path(),
            "Alice,a,p1,cooperative,m1\nBob,b,p2,targeted_adv,m2\n",
        );
        let err = GameSetup::load(dir.path(), 2, 2).unwrap_err();
        assert!(format!("{:#}", err).contains("targeted adversary"));
    }

    #[test]
    fn test_bad_scores_file_is_setup_error() {
        let dir = TempDir::new().unwrap();
        write_game(dir.path(), "Alice,a,p1,cooperative,m1\nBob,b,p2,greedy,m2\n");
        fs::write(scores_path(dir.path(), "b"), "1,2\n5\n").unwrap();

        let err = GameSetup::load(dir.path(), 2, 2).unwrap_err();
        assert!(crate::errors::classify(&err).unwrap().is_setup());
    }
}
