// Season-by-slot occupancy grid and the baseline built from contracted players.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::eta::Level;
use crate::indicators::{Indicator, IndicatorKind};
use crate::overrides::{Acquisition, OverrideSource};
use crate::params::ForecastParams;
use crate::player::{ContractBook, EstablishedPlayer, OrgRoster, PlayerId};
use crate::position::{Section, SlotId};

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellState {
    UnderContract,
    FinalYear,
    Empty,
    MinorLeague,
    Prospect,
}

impl CellState {
    pub fn label(&self) -> &'static str {
        match self {
            CellState::UnderContract => "under-contract",
            CellState::FinalYear => "final-year",
            CellState::Empty => "empty",
            CellState::MinorLeague => "minor-league",
            CellState::Prospect => "prospect",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "under-contract" => Some(CellState::UnderContract),
            "final-year" => Some(CellState::FinalYear),
            "empty" => Some(CellState::Empty),
            "minor-league" => Some(CellState::MinorLeague),
            "prospect" => Some(CellState::Prospect),
            _ => None,
        }
    }

    /// States held by players who have not reached the majors.
    pub fn is_prospect_state(&self) -> bool {
        matches!(self, CellState::Prospect | CellState::MinorLeague)
    }

    /// States a prospect may be assigned over.
    pub fn is_fillable(&self) -> bool {
        matches!(
            self,
            CellState::Empty | CellState::Prospect | CellState::MinorLeague
        )
    }
}

/// Marks a cell whose content came from a manual edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideMark {
    pub source: OverrideSource,
    pub acquisition: Option<Acquisition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub year: i32,
    /// Seasons after the base year (0 = current season).
    pub offset: u32,
    pub player_id: Option<PlayerId>,
    pub player_name: Option<String>,
    pub age: u32,
    /// Current rating for established players, ceiling for prospects.
    pub rating: f64,
    pub salary: u64,
    pub state: CellState,
    pub level: Option<Level>,
    pub is_prospect: bool,
    pub is_min_contract: bool,
    pub override_mark: Option<OverrideMark>,
    pub indicators: Vec<Indicator>,
}

impl GridCell {
    pub fn empty(year: i32, offset: u32) -> Self {
        GridCell {
            year,
            offset,
            player_id: None,
            player_name: None,
            age: 0,
            rating: 0.0,
            salary: 0,
            state: CellState::Empty,
            level: None,
            is_prospect: false,
            is_min_contract: false,
            override_mark: None,
            indicators: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state == CellState::Empty
    }

    pub fn is_occupied(&self) -> bool {
        !self.is_empty()
    }

    /// Reset to the empty state, keeping year and offset.
    pub fn clear(&mut self) {
        *self = GridCell::empty(self.year, self.offset);
    }

    pub fn has_indicator(&self, kind: IndicatorKind) -> bool {
        self.indicators.iter().any(|i| i.kind == kind)
    }
}

// ---------------------------------------------------------------------------
// Rows and grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub slot: SlotId,
    pub label: String,
    pub section: Section,
    /// One cell per forecast year, ordered by offset.
    pub cells: Vec<GridCell>,
}

impl GridRow {
    pub fn empty(slot: SlotId, base_year: i32, horizon: u32) -> Self {
        GridRow {
            slot,
            label: slot.label(),
            section: slot.section(),
            cells: (0..horizon)
                .map(|offset| GridCell::empty(base_year + offset as i32, offset))
                .collect(),
        }
    }

    pub fn cell(&self, offset: u32) -> Option<&GridCell> {
        self.cells.get(offset as usize)
    }

    pub fn cell_mut(&mut self, offset: u32) -> Option<&mut GridCell> {
        self.cells.get_mut(offset as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastGrid {
    pub org_id: String,
    pub base_year: i32,
    pub horizon: u32,
    pub rows: Vec<GridRow>,
}

impl ForecastGrid {
    /// A grid with every row present and every cell empty.
    pub fn placeholder(org_id: &str, base_year: i32, params: &ForecastParams) -> Self {
        ForecastGrid {
            org_id: org_id.to_string(),
            base_year,
            horizon: params.horizon_years,
            rows: params
                .slots()
                .into_iter()
                .map(|slot| GridRow::empty(slot, base_year, params.horizon_years))
                .collect(),
        }
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.horizon).map(move |o| self.base_year + o as i32)
    }

    /// Offset of `year` within the horizon, if it falls inside it.
    pub fn offset_of(&self, year: i32) -> Option<u32> {
        let offset = year.checked_sub(self.base_year)?;
        u32::try_from(offset).ok().filter(|o| *o < self.horizon)
    }

    pub fn row(&self, slot: SlotId) -> Option<&GridRow> {
        self.rows.iter().find(|r| r.slot == slot)
    }

    pub fn row_mut(&mut self, slot: SlotId) -> Option<&mut GridRow> {
        self.rows.iter_mut().find(|r| r.slot == slot)
    }

    pub fn cell(&self, slot: SlotId, year: i32) -> Option<&GridCell> {
        let offset = self.offset_of(year)?;
        self.row(slot)?.cell(offset)
    }

    pub fn cell_mut(&mut self, slot: SlotId, year: i32) -> Option<&mut GridCell> {
        let offset = self.offset_of(year)?;
        self.row_mut(slot)?.cell_mut(offset)
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Baseline
// ---------------------------------------------------------------------------

/// Seasons (current included) a slot holder is expected to stay.
///
/// Minimum-type deals extend to the inferred team-control window so cheap
/// young players are not shown as near-term vacancies. A player without a
/// ledger entry is treated as a minimum-type deal. The current season is
/// always covered.
pub fn effective_years_remaining(
    player: &EstablishedPlayer,
    contracts: &ContractBook,
    params: &ForecastParams,
) -> u32 {
    let years = match contracts.get(&player.id) {
        Some(contract) if !params.is_minimum_contract(contract.current_salary) => {
            contract.years_remaining
        }
        Some(contract) => contract
            .years_remaining
            .max(params.remaining_control(player.age)),
        None => params.remaining_control(player.age),
    };
    years.max(1)
}

/// Build the occupancy grid from the current roster and contract ledger.
///
/// With no roster the result is a placeholder grid (all cells empty).
pub fn build_baseline(
    org_id: &str,
    base_year: i32,
    roster: Option<&OrgRoster>,
    contracts: &ContractBook,
    params: &ForecastParams,
) -> ForecastGrid {
    let mut grid = ForecastGrid::placeholder(org_id, base_year, params);
    let Some(roster) = roster else {
        return grid;
    };

    for row in grid.rows.iter_mut() {
        let Some(player) = roster.occupant(row.slot) else {
            continue;
        };
        let contract = contracts.get(&player.id);
        let covered = effective_years_remaining(player, contracts, params);
        let is_min_contract = contract
            .map(|c| params.is_minimum_contract(c.current_salary))
            .unwrap_or(true);
        debug!(
            "baseline {}: {} covered for {} season(s)",
            row.label, player.name, covered
        );

        for cell in row.cells.iter_mut() {
            if cell.offset >= covered {
                continue;
            }
            cell.state = if player.is_minor_leaguer() {
                CellState::MinorLeague
            } else if cell.offset + 1 == covered {
                CellState::FinalYear
            } else {
                CellState::UnderContract
            };
            cell.player_id = Some(player.id.clone());
            cell.player_name = Some(player.name.clone());
            cell.age = player.age + cell.offset;
            cell.rating = player.rating;
            cell.salary = contract.map(|c| c.salary_for(cell.offset)).unwrap_or(0);
            cell.level = player.level;
            cell.is_prospect = player.is_minor_leaguer();
            cell.is_min_contract = is_min_contract;
        }
    }

    grid
}
