// Payroll roll-up per section and season.

use serde::{Deserialize, Serialize};

use crate::grid::ForecastGrid;
use crate::params::ForecastParams;
use crate::position::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearFinancials {
    pub year: i32,
    pub lineup: u64,
    pub rotation: u64,
    pub bullpen: u64,
    pub total: u64,
}

impl YearFinancials {
    pub fn section(&self, section: Section) -> u64 {
        match section {
            Section::Lineup => self.lineup,
            Section::Rotation => self.rotation,
            Section::Bullpen => self.bullpen,
        }
    }
}

/// Sum salaries of occupied cells per section for every forecast year.
/// Occupied cells with no recorded salary count at the league minimum.
pub fn aggregate_financials(grid: &ForecastGrid, params: &ForecastParams) -> Vec<YearFinancials> {
    (0..grid.horizon)
        .map(|offset| {
            let mut year = YearFinancials {
                year: grid.base_year + offset as i32,
                lineup: 0,
                rotation: 0,
                bullpen: 0,
                total: 0,
            };
            for row in &grid.rows {
                let Some(cell) = row.cell(offset) else {
                    continue;
                };
                if cell.is_empty() {
                    continue;
                }
                let salary = if cell.salary == 0 {
                    params.minimum_salary
                } else {
                    cell.salary
                };
                match row.section {
                    Section::Lineup => year.lineup += salary,
                    Section::Rotation => year.rotation += salary,
                    Section::Bullpen => year.bullpen += salary,
                }
            }
            year.total = year.lineup + year.rotation + year.bullpen;
            year
        })
        .collect()
}
