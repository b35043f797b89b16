// Prospect assignment: fills future vacancies from the prospect pool.
//
// Each forecast year after the current one is filled independently. Within a
// year the most constrained open slot (fewest eligible, unused, ready
// prospects) is filled first with the highest-ceiling candidate, until no open
// slot has a candidate left.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::grid::{CellState, ForecastGrid, GridCell};
use crate::params::ForecastParams;
use crate::player::{PlayerId, Prospect};
use crate::position::{Section, SlotId};

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

/// Cells and players claimed by manual edits, keyed by year offset.
/// Reserved cells are never assigned and reserved players count as used.
#[derive(Debug, Clone, Default)]
pub struct Reservations {
    cells: HashSet<(SlotId, u32)>,
    players: HashMap<u32, HashSet<PlayerId>>,
}

impl Reservations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, slot: SlotId, offset: u32, player: Option<&PlayerId>) {
        self.cells.insert((slot, offset));
        if let Some(id) = player {
            self.players.entry(offset).or_default().insert(id.clone());
        }
    }

    pub fn is_reserved(&self, slot: SlotId, offset: u32) -> bool {
        self.cells.contains(&(slot, offset))
    }

    fn players_at(&self, offset: u32) -> impl Iterator<Item = &PlayerId> {
        self.players.get(&offset).into_iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// Candidate order: ceiling descending, then player id ascending.
fn rank_prospects(prospects: &[Prospect]) -> Vec<&Prospect> {
    let mut ranked: Vec<&Prospect> = prospects.iter().collect();
    ranked.sort_by(|a, b| {
        b.ceiling
            .partial_cmp(&a.ceiling)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked
}

/// Fill open cells in years 1.. of the grid. Returns the number of cells
/// assigned. The current season is never touched.
pub fn assign_prospects(
    grid: &mut ForecastGrid,
    prospects: &[Prospect],
    params: &ForecastParams,
    reservations: &Reservations,
) -> usize {
    let ranked = rank_prospects(prospects);
    let mut assigned = 0;

    for offset in 1..grid.horizon {
        let mut used: HashSet<PlayerId> = reservations.players_at(offset).cloned().collect();
        for row in &grid.rows {
            if let Some(id) = row.cell(offset).and_then(|c| c.player_id.as_ref()) {
                used.insert(id.clone());
            }
        }

        let ready: Vec<&Prospect> = ranked
            .iter()
            .copied()
            .filter(|p| p.eta() <= offset && p.age_at(offset) >= params.min_grid_age)
            .collect();
        if ready.is_empty() {
            continue;
        }

        let open = open_rows(grid, offset, Section::Lineup, reservations);
        let (n, _) = fill_greedy(grid, offset, open, &ready, &mut used, params, |slot, p| {
            p.is_hitter() && slot.accepts_hitter(&p.positions)
        });
        assigned += n;

        let open = open_rows(grid, offset, Section::Rotation, reservations);
        let (n, _) = fill_greedy(grid, offset, open, &ready, &mut used, params, |_, p| {
            p.is_starter()
        });
        assigned += n;

        // Bullpen takes relievers first, then any starters left over.
        let open = open_rows(grid, offset, Section::Bullpen, reservations);
        let (n, still_open) = fill_greedy(grid, offset, open, &ready, &mut used, params, |_, p| {
            p.is_reliever()
        });
        assigned += n;
        let (n, _) = fill_greedy(grid, offset, still_open, &ready, &mut used, params, |_, p| {
            p.is_starter()
        });
        assigned += n;
    }

    debug!("assigned {} prospect cell(s) for {}", assigned, grid.org_id);
    assigned
}

/// Row indices in `section` whose cell at `offset` may take a prospect.
fn open_rows(
    grid: &ForecastGrid,
    offset: u32,
    section: Section,
    reservations: &Reservations,
) -> Vec<usize> {
    grid.rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.section == section)
        .filter(|(_, row)| !reservations.is_reserved(row.slot, offset))
        .filter(|(_, row)| row.cell(offset).is_some_and(|c| c.state.is_fillable()))
        .map(|(i, _)| i)
        .collect()
}

/// A prospect may take an empty cell, or replace a prospect/minor-league
/// filler only with a strictly higher ceiling.
fn improves(cell: &GridCell, prospect: &Prospect) -> bool {
    match cell.state {
        CellState::Empty => true,
        CellState::Prospect | CellState::MinorLeague => prospect.ceiling > cell.rating,
        CellState::UnderContract | CellState::FinalYear => false,
    }
}

/// Most-constrained-first greedy fill. Returns the number of cells filled and
/// the rows still open, in their original order.
fn fill_greedy<F>(
    grid: &mut ForecastGrid,
    offset: u32,
    mut open: Vec<usize>,
    ready: &[&Prospect],
    used: &mut HashSet<PlayerId>,
    params: &ForecastParams,
    eligible: F,
) -> (usize, Vec<usize>)
where
    F: Fn(SlotId, &Prospect) -> bool,
{
    let mut filled = 0;

    loop {
        // (position in `open`, candidate count, best candidate)
        let mut best: Option<(usize, usize, &Prospect)> = None;
        for (i, &row_idx) in open.iter().enumerate() {
            let row = &grid.rows[row_idx];
            let Some(cell) = row.cell(offset) else {
                continue;
            };
            let mut candidates = ready
                .iter()
                .copied()
                .filter(|p| !used.contains(&p.id) && eligible(row.slot, p) && improves(cell, p));
            let Some(top) = candidates.next() else {
                continue;
            };
            let count = 1 + candidates.count();
            if best.map_or(true, |(_, c, _)| count < c) {
                best = Some((i, count, top));
            }
        }

        let Some((i, _, prospect)) = best else {
            break;
        };
        let row_idx = open.remove(i);
        if let Some(cell) = grid.rows[row_idx].cell_mut(offset) {
            place_prospect(cell, prospect, params);
        }
        used.insert(prospect.id.clone());
        filled += 1;
    }

    (filled, open)
}

fn place_prospect(cell: &mut GridCell, prospect: &Prospect, params: &ForecastParams) {
    cell.player_id = Some(prospect.id.clone());
    cell.player_name = Some(prospect.name.clone());
    cell.age = prospect.age_at(cell.offset);
    cell.rating = prospect.ceiling;
    cell.salary = params.minimum_salary;
    cell.state = CellState::Prospect;
    cell.level = Some(prospect.level);
    cell.is_prospect = true;
    cell.is_min_contract = true;
    cell.override_mark = None;
    cell.indicators.clear();
}
