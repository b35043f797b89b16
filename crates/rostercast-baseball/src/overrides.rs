// Manual edits layered on top of the generated grid.
//
// An override record pins one (organization, slot, season) cell. Records are
// produced by assign/extend edits, persisted through the override store, and
// re-applied over every rebuilt grid.

use std::fmt;

use chrono::{DateTime, Utc};
use rostercast_core::db::StoredOverride;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::assign::Reservations;
use crate::grid::{CellState, ForecastGrid, OverrideMark};
use crate::params::ForecastParams;
use crate::player::{Contract, PlayerId};
use crate::position::SlotId;
use crate::salary::estimate_salary;

// ---------------------------------------------------------------------------
// Keys and categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverrideSource {
    OrgSelect,
    SearchSelect,
    Extend,
}

impl OverrideSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideSource::OrgSelect => "org-select",
            OverrideSource::SearchSelect => "search-select",
            OverrideSource::Extend => "extend",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "org-select" => Some(OverrideSource::OrgSelect),
            "search-select" => Some(OverrideSource::SearchSelect),
            "extend" => Some(OverrideSource::Extend),
            _ => None,
        }
    }
}

/// How a player picked from outside the organization would be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acquisition {
    Trade,
    FreeAgent,
}

impl Acquisition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acquisition::Trade => "trade",
            Acquisition::FreeAgent => "free-agent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trade" => Some(Acquisition::Trade),
            "free-agent" => Some(Acquisition::FreeAgent),
            _ => None,
        }
    }
}

/// Composite key of one override: organization, slot, and season.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverrideKey {
    pub org_id: String,
    pub slot: SlotId,
    pub year: i32,
}

impl OverrideKey {
    pub fn new(org_id: impl Into<String>, slot: SlotId, year: i32) -> Self {
        OverrideKey {
            org_id: org_id.into(),
            slot,
            year,
        }
    }

    /// Storage form: `"{org}_{slot}_{year}"`.
    pub fn storage_key(&self) -> String {
        format!("{}_{}_{}", self.org_id, self.slot.label(), self.year)
    }

    /// Parse a storage key. The organization id may itself contain `_`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.rsplitn(3, '_');
        let year: i32 = parts.next()?.parse().ok()?;
        let slot = SlotId::parse(parts.next()?)?;
        let org_id = parts.next()?;
        if org_id.is_empty() {
            return None;
        }
        Some(OverrideKey::new(org_id, slot, year))
    }
}

impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub key: OverrideKey,
    pub player_id: Option<PlayerId>,
    pub player_name: Option<String>,
    pub age: u32,
    pub rating: f64,
    pub salary: u64,
    pub state: CellState,
    pub source: OverrideSource,
    pub acquisition: Option<Acquisition>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum OverrideRowError {
    #[error("malformed storage key '{0}'")]
    MalformedKey(String),

    #[error("storage key '{key}' does not match row fields ({org}, {position}, {year})")]
    KeyMismatch {
        key: String,
        org: String,
        position: String,
        year: i32,
    },

    #[error("unknown cell state '{0}'")]
    UnknownState(String),

    #[error("unknown override source '{0}'")]
    UnknownSource(String),

    #[error("unknown acquisition route '{0}'")]
    UnknownAcquisition(String),

    #[error("invalid timestamp '{value}': {source}")]
    BadTimestamp {
        value: String,
        source: chrono::ParseError,
    },
}

impl TryFrom<StoredOverride> for OverrideRecord {
    type Error = OverrideRowError;

    fn try_from(row: StoredOverride) -> Result<Self, Self::Error> {
        let key = OverrideKey::parse(&row.storage_key)
            .ok_or_else(|| OverrideRowError::MalformedKey(row.storage_key.clone()))?;
        if key.org_id != row.org_id || key.slot.label() != row.position || key.year != row.year {
            return Err(OverrideRowError::KeyMismatch {
                key: row.storage_key,
                org: row.org_id,
                position: row.position,
                year: row.year,
            });
        }
        let state =
            CellState::parse(&row.state).ok_or_else(|| OverrideRowError::UnknownState(row.state))?;
        let source = OverrideSource::parse(&row.source)
            .ok_or_else(|| OverrideRowError::UnknownSource(row.source))?;
        let acquisition = match row.acquisition {
            Some(a) => {
                Some(Acquisition::parse(&a).ok_or(OverrideRowError::UnknownAcquisition(a))?)
            }
            None => None,
        };
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| OverrideRowError::BadTimestamp {
                value: row.created_at.clone(),
                source: e,
            })?
            .with_timezone(&Utc);

        Ok(OverrideRecord {
            key,
            player_id: row.player_id.map(PlayerId),
            player_name: row.player_name,
            age: row.age,
            rating: row.rating,
            salary: row.salary,
            state,
            source,
            acquisition,
            created_at,
        })
    }
}

impl From<&OverrideRecord> for StoredOverride {
    fn from(record: &OverrideRecord) -> Self {
        StoredOverride {
            storage_key: record.key.storage_key(),
            org_id: record.key.org_id.clone(),
            position: record.key.slot.label(),
            year: record.key.year,
            player_id: record.player_id.as_ref().map(|id| id.0.clone()),
            player_name: record.player_name.clone(),
            age: record.age,
            rating: record.rating,
            salary: record.salary,
            state: record.state.label().to_string(),
            source: record.source.as_str().to_string(),
            acquisition: record.acquisition.map(|a| a.as_str().to_string()),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Convert stored rows, skipping (and logging) rows that fail to convert.
pub fn records_from_rows(rows: Vec<StoredOverride>) -> Vec<OverrideRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let key = row.storage_key.clone();
            match OverrideRecord::try_from(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping stored override {}: {}", key, e);
                    None
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Offset of the record's cell within `grid`, if the record targets it.
fn target_offset(grid: &ForecastGrid, record: &OverrideRecord) -> Option<u32> {
    if record.key.org_id != grid.org_id {
        return None;
    }
    grid.row(record.key.slot)?;
    grid.offset_of(record.key.year)
}

/// Cells and players the assigner must leave alone for these overrides.
pub fn reservations_for(grid: &ForecastGrid, records: &[OverrideRecord]) -> Reservations {
    let mut reservations = Reservations::new();
    for record in records {
        if let Some(offset) = target_offset(grid, record) {
            reservations.reserve(record.key.slot, offset, record.player_id.as_ref());
        }
    }
    reservations
}

/// Overwrite every targeted cell with its override. Records for another
/// organization, an unknown slot, or a year outside the horizon are ignored.
/// A cell keeps its level when the override names the player already there.
/// Returns the number of cells overwritten.
pub fn apply_overrides(
    grid: &mut ForecastGrid,
    records: &[OverrideRecord],
    params: &ForecastParams,
) -> usize {
    let mut applied = 0;
    for record in records {
        let Some(offset) = target_offset(grid, record) else {
            debug!("ignoring override {} outside the grid", record.key);
            continue;
        };
        let Some(cell) = grid
            .row_mut(record.key.slot)
            .and_then(|row| row.cell_mut(offset))
        else {
            continue;
        };

        let kept_level = cell
            .level
            .filter(|_| record.player_id.is_some() && cell.player_id == record.player_id);
        cell.clear();
        if record.state != CellState::Empty {
            cell.level = kept_level;
            cell.player_id = record.player_id.clone();
            cell.player_name = record.player_name.clone();
            cell.age = record.age;
            cell.rating = record.rating;
            cell.salary = record.salary;
            cell.is_prospect = record.state.is_prospect_state();
            cell.is_min_contract = params.is_minimum_contract(record.salary);
        }
        cell.state = record.state;
        cell.override_mark = Some(OverrideMark {
            source: record.source,
            acquisition: record.acquisition,
        });
        applied += 1;
    }
    applied
}

// ---------------------------------------------------------------------------
// Edit planning
// ---------------------------------------------------------------------------

/// A player chosen for a cell, as seen at the base year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenPlayer {
    pub id: PlayerId,
    pub name: String,
    /// Age in the base year.
    pub age: u32,
    pub rating: f64,
    /// Not yet in the majors.
    pub is_minor_leaguer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignRequest {
    pub slot: SlotId,
    pub year: i32,
    pub player: ChosenPlayer,
    pub source: OverrideSource,
    pub acquisition: Option<Acquisition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendRequest {
    pub slot: SlotId,
    /// First season the extension covers.
    pub start_year: i32,
    pub player: ChosenPlayer,
    pub years: u32,
    pub salary: Option<u64>,
}

/// Seasons of control the organization holds over the chosen player, as of
/// the base year.
fn control_span(player: &ChosenPlayer, contract: Option<&Contract>, params: &ForecastParams) -> u32 {
    let span = if player.is_minor_leaguer {
        params.team_control_years
    } else {
        match contract {
            Some(c) if params.is_minimum_contract(c.current_salary) => {
                c.years_remaining.max(params.remaining_control(player.age))
            }
            Some(c) => c.years_remaining,
            None => params.remaining_control(player.age),
        }
    };
    span.max(1)
}

/// Build one override per season the chosen player stays under control,
/// starting at the requested year and clipped to the horizon. The last
/// season of control is marked final when it falls inside the horizon.
///
/// Salary comes from the ledger where it still covers the season, otherwise
/// from the arbitration-tier estimate for that season of service.
pub fn plan_assignment(
    org_id: &str,
    base_year: i32,
    request: &AssignRequest,
    contract: Option<&Contract>,
    params: &ForecastParams,
    now: DateTime<Utc>,
) -> Vec<OverrideRecord> {
    let Some(start) = request
        .year
        .checked_sub(base_year)
        .and_then(|o| u32::try_from(o).ok())
        .filter(|o| *o < params.horizon_years)
    else {
        return Vec::new();
    };

    let player = &request.player;
    let span = control_span(player, contract, params);
    let control_end = start.saturating_add(span);
    let end = control_end.min(params.horizon_years);

    (start..end)
        .map(|offset| {
            let age = player.age + offset;
            let salary = contract
                .and_then(|c| c.scheduled_salary(offset))
                .unwrap_or_else(|| estimate_salary(params.service_years(age), player.rating, params));
            let state = if player.is_minor_leaguer {
                CellState::MinorLeague
            } else if offset + 1 == control_end {
                CellState::FinalYear
            } else {
                CellState::UnderContract
            };
            OverrideRecord {
                key: OverrideKey::new(org_id, request.slot, base_year + offset as i32),
                player_id: Some(player.id.clone()),
                player_name: Some(player.name.clone()),
                age,
                rating: player.rating,
                salary,
                state,
                source: request.source,
                acquisition: request.acquisition,
                created_at: now,
            }
        })
        .collect()
}

/// Build overrides for an extension: `years` consecutive seasons under
/// contract, the last one marked final. Salary stays 0 unless supplied.
pub fn plan_extension(
    org_id: &str,
    base_year: i32,
    request: &ExtendRequest,
    params: &ForecastParams,
    now: DateTime<Utc>,
) -> Vec<OverrideRecord> {
    let Some(start) = request
        .start_year
        .checked_sub(base_year)
        .and_then(|o| u32::try_from(o).ok())
    else {
        return Vec::new();
    };
    let last = start.saturating_add(request.years.max(1) - 1);
    let end = last.min(params.horizon_years.saturating_sub(1));
    let player = &request.player;

    (start..=end)
        .filter(|offset| *offset < params.horizon_years)
        .map(|offset| OverrideRecord {
            key: OverrideKey::new(org_id, request.slot, base_year + offset as i32),
            player_id: Some(player.id.clone()),
            player_name: Some(player.name.clone()),
            age: player.age + offset,
            rating: player.rating,
            salary: request.salary.unwrap_or(0),
            state: if offset == last {
                CellState::FinalYear
            } else {
                CellState::UnderContract
            },
            source: OverrideSource::Extend,
            acquisition: None,
            created_at: now,
        })
        .collect()
}
