// Position assessor: multi-year strength/need/extension findings per row.

use serde::{Deserialize, Serialize};

use crate::grid::ForecastGrid;
use crate::indicators::extension_candidate;
use crate::params::ForecastParams;
use crate::position::{Section, SlotId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finding {
    Strength,
    Need,
    Extension,
}

impl Finding {
    pub fn label(&self) -> &'static str {
        match self {
            Finding::Strength => "strength",
            Finding::Need => "need",
            Finding::Extension => "extension",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAssessment {
    pub slot: SlotId,
    pub label: String,
    pub section: Section,
    pub findings: Vec<Finding>,
    /// Years rated at or above the strength cutoff.
    pub strong_years: usize,
    pub empty_years: usize,
    pub current_rating: f64,
}

impl PositionAssessment {
    pub fn has(&self, finding: Finding) -> bool {
        self.findings.contains(&finding)
    }
}

pub fn assess_positions(grid: &ForecastGrid, params: &ForecastParams) -> Vec<PositionAssessment> {
    let t = &params.thresholds;

    grid.rows
        .iter()
        .map(|row| {
            let strong_years = row
                .cells
                .iter()
                .filter(|c| c.is_occupied() && c.rating >= t.strength_rating)
                .count();
            let empty_years = row.cells.iter().filter(|c| c.is_empty()).count();
            let current_rating = row.cell(0).map(|c| c.rating).unwrap_or(0.0);

            let mut findings = Vec::new();
            if strong_years >= t.strength_years {
                findings.push(Finding::Strength);
            }
            let weak_incumbent = current_rating > 0.0 && current_rating < t.need_weak_rating;
            if empty_years >= t.need_empty_years
                || (empty_years >= t.need_weak_empty_years && weak_incumbent)
            {
                findings.push(Finding::Need);
            }
            if extension_candidate(row, 0, params) {
                findings.push(Finding::Extension);
            }

            PositionAssessment {
                slot: row.slot,
                label: row.label.clone(),
                section: row.section,
                findings,
                strong_years,
                empty_years,
                current_rating,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellState;
    use crate::player::PlayerId;
    use crate::position::Position;

    fn params() -> ForecastParams {
        ForecastParams {
            lineup: vec![Position::CenterField],
            rotation_slots: 1,
            bullpen_slots: 1,
            ..ForecastParams::default()
        }
    }

    fn cf() -> SlotId {
        SlotId::lineup(Position::CenterField)
    }

    /// Fill offsets `0..years` of the CF row with one player.
    fn fill_row(grid: &mut ForecastGrid, years: u32, rating: f64, age: u32, salary: u64) {
        let row = grid.row_mut(cf()).unwrap();
        for cell in row.cells.iter_mut().take(years as usize) {
            cell.state = if cell.offset + 1 == years {
                CellState::FinalYear
            } else {
                CellState::UnderContract
            };
            cell.player_id = Some(PlayerId::new("cf"));
            cell.rating = rating;
            cell.age = age + cell.offset;
            cell.salary = salary;
        }
    }

    fn assessment(grid: &ForecastGrid) -> PositionAssessment {
        assess_positions(grid, &params())
            .into_iter()
            .find(|a| a.slot == cf())
            .unwrap()
    }

    #[test]
    fn strength_needs_five_strong_years() {
        let mut grid = ForecastGrid::placeholder("NYM", 2026, &params());
        fill_row(&mut grid, 5, 3.6, 26, 4_000_000);
        assert!(assessment(&grid).has(Finding::Strength));

        let mut grid = ForecastGrid::placeholder("NYM", 2026, &params());
        fill_row(&mut grid, 4, 3.6, 26, 4_000_000);
        assert!(!assessment(&grid).has(Finding::Strength));
    }

    #[test]
    fn need_from_three_empty_years() {
        let mut grid = ForecastGrid::placeholder("NYM", 2026, &params());
        fill_row(&mut grid, 3, 3.0, 26, 4_000_000);
        let a = assessment(&grid);
        assert_eq!(a.empty_years, 3);
        assert!(a.has(Finding::Need));

        let mut grid = ForecastGrid::placeholder("NYM", 2026, &params());
        fill_row(&mut grid, 4, 3.0, 26, 4_000_000);
        assert!(!assessment(&grid).has(Finding::Need));
    }

    #[test]
    fn need_from_two_empty_years_and_weak_incumbent() {
        let mut grid = ForecastGrid::placeholder("NYM", 2026, &params());
        fill_row(&mut grid, 4, 2.0, 26, 4_000_000);
        assert!(assessment(&grid).has(Finding::Need));

        let mut grid = ForecastGrid::placeholder("NYM", 2026, &params());
        fill_row(&mut grid, 4, 2.5, 26, 4_000_000);
        assert!(!assessment(&grid).has(Finding::Need));
    }

    #[test]
    fn extension_mirrors_ext_indicator() {
        let mut grid = ForecastGrid::placeholder("NYM", 2026, &params());
        fill_row(&mut grid, 2, 3.2, 30, 8_000_000);
        assert!(assessment(&grid).has(Finding::Extension));

        let mut grid = ForecastGrid::placeholder("NYM", 2026, &params());
        fill_row(&mut grid, 2, 3.2, 30, 8_000_000);
        grid.row_mut(cf()).unwrap().cells[0].is_min_contract = true;
        assert!(!assessment(&grid).has(Finding::Extension));
    }

    #[test]
    fn one_assessment_per_row() {
        let grid = ForecastGrid::placeholder("NYM", 2026, &params());
        let all = assess_positions(&grid, &params());
        assert_eq!(all.len(), grid.rows.len());
        assert!(all.iter().all(|a| a.has(Finding::Need)));
    }
}
