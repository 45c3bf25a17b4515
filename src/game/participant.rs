// Participants, their roles and incentive categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::utility::UtilityTable;
use crate::errors::NegotiationError;

/// Role of a party in the negotiation.
///
/// `p1` opens the session and consolidates the final deal; `p1` and `p2` both
/// hold veto power. `target` is the party a targeted adversary works against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    P1,
    P2,
    Target,
    /// Any other role label from the configuration file.
    Member(String),
}

impl Role {
    pub fn is_veto(&self) -> bool {
        matches!(self, Role::P1 | Role::P2)
    }
}

impl FromStr for Role {
    type Err = NegotiationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(NegotiationError::setup("empty role")),
            "p1" => Ok(Role::P1),
            "p2" => Ok(Role::P2),
            "target" => Ok(Role::Target),
            other => Ok(Role::Member(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::P1 => write!(f, "p1"),
            Role::P2 => write!(f, "p2"),
            Role::Target => write!(f, "target"),
            Role::Member(label) => write!(f, "{}", label),
        }
    }
}

/// What a party is instructed to optimize for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Incentive {
    Cooperative,
    Greedy,
    UntargetedAdversarial,
    TargetedAdversarial,
}

impl FromStr for Incentive {
    type Err = NegotiationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cooperative" => Ok(Incentive::Cooperative),
            "greedy" => Ok(Incentive::Greedy),
            "untargeted_adv" => Ok(Incentive::UntargetedAdversarial),
            "targeted_adv" => Ok(Incentive::TargetedAdversarial),
            other => Err(NegotiationError::setup(format!(
                "unknown incentive {:?} (expected cooperative, greedy, untargeted_adv or targeted_adv)",
                other
            ))),
        }
    }
}

impl fmt::Display for Incentive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Incentive::Cooperative => "cooperative",
            Incentive::Greedy => "greedy",
            Incentive::UntargetedAdversarial => "untargeted_adv",
            Incentive::TargetedAdversarial => "targeted_adv",
        };
        f.write_str(label)
    }
}

/// One line of `config.txt`: `name,scores_file,role,incentive,model`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSpec {
    pub name: String,
    pub scores_file: String,
    pub role: Role,
    pub incentive: Incentive,
    pub model: String,
}

impl FromStr for ParticipantSpec {
    type Err = NegotiationError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let &[name, scores_file, role, incentive, model] = fields.as_slice() else {
            return Err(NegotiationError::setup(format!(
                "config line {:?} has {} fields, expected 5 (name,scores_file,role,incentive,model)",
                line,
                fields.len()
            )));
        };

        if name.is_empty() || scores_file.is_empty() || model.is_empty() {
            return Err(NegotiationError::setup(format!(
                "config line {:?} has an empty name, scores file or model",
                line
            )));
        }

        Ok(Self {
            name: name.to_string(),
            scores_file: scores_file.to_string(),
            role: role.parse()?,
            incentive: incentive.parse()?,
            model: model.to_string(),
        })
    }
}

/// A negotiating party. Immutable once the session is set up.
#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub role: Role,
    pub incentive: Incentive,
    pub model: String,
    pub utility: UtilityTable,
}

impl Participant {
    pub fn from_spec(spec: ParticipantSpec, utility: UtilityTable) -> Self {
        Self {
            name: spec.name,
            role: spec.role,
            incentive: spec.incentive,
            model: spec.model,
            utility,
        }
    }
}
