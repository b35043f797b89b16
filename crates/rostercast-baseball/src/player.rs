// Roster, prospect, and contract data supplied by upstream collaborators.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::eta::{estimate_eta, Level};
use crate::position::{Position, SlotId};

/// Stable player identity as issued by the roster source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Established roster
// ---------------------------------------------------------------------------

/// A player currently holding a depth-chart slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstablishedPlayer {
    pub id: PlayerId,
    pub name: String,
    pub age: u32,
    /// Current skill rating on the 0-5 scale.
    pub rating: f64,
    /// Set when the slot holder is currently in the minors (e.g. an injury
    /// fill-in or a September call-up candidate).
    #[serde(default)]
    pub level: Option<Level>,
}

impl EstablishedPlayer {
    pub fn is_minor_leaguer(&self) -> bool {
        self.level.is_some_and(|l| l.is_minors())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotOccupant {
    pub slot: SlotId,
    pub player: EstablishedPlayer,
}

/// The current depth chart of one organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgRoster {
    pub org_id: String,
    pub occupants: Vec<SlotOccupant>,
}

impl OrgRoster {
    pub fn occupant(&self, slot: SlotId) -> Option<&EstablishedPlayer> {
        self.occupants
            .iter()
            .find(|o| o.slot == slot)
            .map(|o| &o.player)
    }
}

// ---------------------------------------------------------------------------
// Prospects
// ---------------------------------------------------------------------------

/// Pitching signal used to separate starters from relievers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchRepertoire {
    pub pitch_count: u32,
    pub stamina: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: PlayerId,
    pub name: String,
    /// Concrete positions after group-code expansion.
    pub positions: Vec<Position>,
    pub age: u32,
    pub level: Level,
    /// Projected peak rating on the 0-5 scale.
    pub ceiling: f64,
    #[serde(default)]
    pub repertoire: Option<PitchRepertoire>,
}

impl Prospect {
    pub fn eta(&self) -> u32 {
        estimate_eta(self.level, self.ceiling)
    }

    pub fn is_pitcher(&self) -> bool {
        self.positions.iter().any(|p| p.is_pitcher())
    }

    pub fn is_hitter(&self) -> bool {
        self.positions.iter().any(|p| p.is_hitter())
    }

    /// Starter-eligible: at least three pitches and stamina of 30 or more.
    /// Without a repertoire signal, a listed SP counts as a starter.
    pub fn is_starter(&self) -> bool {
        if !self.is_pitcher() {
            return false;
        }
        match self.repertoire {
            Some(r) => r.pitch_count >= 3 && r.stamina >= 30,
            None => self.positions.contains(&Position::StartingPitcher),
        }
    }

    pub fn is_reliever(&self) -> bool {
        self.is_pitcher() && !self.is_starter()
    }

    /// Age in the season `offset` years after the base year.
    pub fn age_at(&self, offset: u32) -> u32 {
        self.age + offset
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// A ledger entry: remaining guaranteed seasons and their salaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub player_id: PlayerId,
    /// Seasons remaining, the current season included.
    pub years_remaining: u32,
    /// Salary per remaining season, starting with the current season.
    pub salary_schedule: Vec<u64>,
    pub current_salary: u64,
}

impl Contract {
    /// Scheduled salary for the season `offset` years out, if the ledger
    /// still covers it.
    pub fn scheduled_salary(&self, offset: u32) -> Option<u64> {
        if offset >= self.years_remaining {
            return None;
        }
        self.salary_schedule.get(offset as usize).copied()
    }

    /// The most recent salary the ledger knows about.
    pub fn last_known_salary(&self) -> u64 {
        self.salary_schedule
            .last()
            .copied()
            .unwrap_or(self.current_salary)
    }

    /// Salary for `offset`, falling back to the last known salary.
    pub fn salary_for(&self, offset: u32) -> u64 {
        self.scheduled_salary(offset)
            .unwrap_or_else(|| self.last_known_salary())
    }
}

/// Contracts for one organization, keyed by player.
#[derive(Debug, Clone, Default)]
pub struct ContractBook {
    by_player: HashMap<PlayerId, Contract>,
}

impl ContractBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, contract: Contract) {
        self.by_player.insert(contract.player_id.clone(), contract);
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Contract> {
        self.by_player.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_player.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }
}

impl FromIterator<Contract> for ContractBook {
    fn from_iter<I: IntoIterator<Item = Contract>>(iter: I) -> Self {
        let mut book = ContractBook::new();
        for contract in iter {
            book.insert(contract);
        }
        book
    }
}
