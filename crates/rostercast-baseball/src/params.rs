// Forecast parameters resolved from league and forecast configuration.

use rostercast_core::config::{Config, ConfigError, Thresholds};

use crate::position::{Position, Section, SlotId};

/// Everything the forecasting algorithms need to know about the league.
#[derive(Debug, Clone)]
pub struct ForecastParams {
    pub horizon_years: u32,
    pub lineup: Vec<Position>,
    pub rotation_slots: u8,
    pub bullpen_slots: u8,
    pub minimum_salary: u64,
    pub minimum_contract_ceiling: u64,
    pub expensive_salary: u64,
    pub team_control_years: u32,
    pub debut_age: u32,
    pub min_grid_age: u32,
    pub thresholds: Thresholds,
}

impl Default for ForecastParams {
    fn default() -> Self {
        ForecastParams {
            horizon_years: 6,
            lineup: Position::lineup_positions().to_vec(),
            rotation_slots: 5,
            bullpen_slots: 7,
            minimum_salary: 740_000,
            minimum_contract_ceiling: 1_000_000,
            expensive_salary: 10_000_000,
            team_control_years: 6,
            debut_age: 23,
            min_grid_age: 20,
            thresholds: Thresholds::default(),
        }
    }
}

impl ForecastParams {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let league = &config.league;

        let mut lineup = Vec::with_capacity(league.grid.lineup.len());
        for label in &league.grid.lineup {
            let position = Position::from_str_pos(label)
                .filter(|p| p.is_hitter())
                .ok_or_else(|| ConfigError::ValidationError {
                    field: "league.grid.lineup".into(),
                    message: format!("'{label}' is not a lineup position"),
                })?;
            if lineup.contains(&position) {
                return Err(ConfigError::ValidationError {
                    field: "league.grid.lineup".into(),
                    message: format!("'{label}' is listed more than once"),
                });
            }
            lineup.push(position);
        }

        let slot_count = |field: &str, n: usize| {
            u8::try_from(n).map_err(|_| ConfigError::ValidationError {
                field: field.into(),
                message: format!("at most 255 slots supported, got {n}"),
            })
        };

        Ok(ForecastParams {
            horizon_years: league.horizon_years,
            lineup,
            rotation_slots: slot_count("league.grid.rotation_slots", league.grid.rotation_slots)?,
            bullpen_slots: slot_count("league.grid.bullpen_slots", league.grid.bullpen_slots)?,
            minimum_salary: league.minimum_salary,
            minimum_contract_ceiling: league.minimum_contract_ceiling,
            expensive_salary: league.expensive_salary,
            team_control_years: league.team_control_years,
            debut_age: league.debut_age,
            min_grid_age: league.min_grid_age,
            thresholds: config.forecast.thresholds.clone(),
        })
    }

    /// Every grid row in display order: lineup, then rotation, then bullpen.
    pub fn slots(&self) -> Vec<SlotId> {
        let mut slots: Vec<SlotId> = self.lineup.iter().copied().map(SlotId::lineup).collect();
        slots.extend((1..=self.rotation_slots).map(SlotId::rotation));
        slots.extend((1..=self.bullpen_slots).map(SlotId::bullpen));
        slots
    }

    pub fn has_slot(&self, slot: SlotId) -> bool {
        match slot.section() {
            Section::Lineup => slot.number == 0 && self.lineup.contains(&slot.position),
            Section::Rotation => (1..=self.rotation_slots).contains(&slot.number),
            Section::Bullpen => (1..=self.bullpen_slots).contains(&slot.number),
        }
    }

    /// Estimated seasons of service accrued by a player of this age.
    pub fn service_years(&self, age: u32) -> u32 {
        age.saturating_sub(self.debut_age)
    }

    /// Seasons of team control left for a player of this age.
    pub fn remaining_control(&self, age: u32) -> u32 {
        self.team_control_years
            .saturating_sub(self.service_years(age))
    }

    pub fn is_minimum_contract(&self, salary: u64) -> bool {
        salary <= self.minimum_contract_ceiling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slots_in_display_order() {
        let params = ForecastParams::default();
        let slots = params.slots();
        assert_eq!(slots.len(), 9 + 5 + 7);
        assert_eq!(slots[0], SlotId::lineup(Position::Catcher));
        assert_eq!(slots[8], SlotId::lineup(Position::DesignatedHitter));
        assert_eq!(slots[9], SlotId::rotation(1));
        assert_eq!(slots[20], SlotId::bullpen(7));
        assert_eq!(slots[14].section(), Section::Bullpen);
    }

    #[test]
    fn has_slot_respects_counts() {
        let params = ForecastParams {
            lineup: vec![Position::Catcher, Position::ShortStop],
            ..ForecastParams::default()
        };
        assert!(params.has_slot(SlotId::lineup(Position::ShortStop)));
        assert!(!params.has_slot(SlotId::lineup(Position::DesignatedHitter)));
        assert!(params.has_slot(SlotId::rotation(5)));
        assert!(!params.has_slot(SlotId::rotation(6)));
        assert!(!params.has_slot(SlotId::bullpen(8)));
    }

    #[test]
    fn service_and_control_estimates() {
        let params = ForecastParams::default();
        assert_eq!(params.service_years(21), 0);
        assert_eq!(params.service_years(26), 3);
        assert_eq!(params.remaining_control(22), 6);
        assert_eq!(params.remaining_control(26), 3);
        assert_eq!(params.remaining_control(35), 0);
    }

    #[test]
    fn minimum_contract_ceiling_is_inclusive() {
        let params = ForecastParams::default();
        assert!(params.is_minimum_contract(1_000_000));
        assert!(!params.is_minimum_contract(1_000_001));
    }
}
