// End-to-end forecast pipeline for one organization.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assessment::{assess_positions, PositionAssessment};
use crate::assign::assign_prospects;
use crate::financials::{aggregate_financials, YearFinancials};
use crate::grid::{build_baseline, ForecastGrid};
use crate::indicators::apply_indicators;
use crate::overrides::{apply_overrides, reservations_for, OverrideRecord};
use crate::params::ForecastParams;
use crate::player::{ContractBook, OrgRoster, Prospect};

/// Everything a rebuild reads, already fetched from collaborators.
#[derive(Debug, Clone, Copy)]
pub struct ForecastInputs<'a> {
    pub org_id: &'a str,
    pub base_year: i32,
    pub roster: Option<&'a OrgRoster>,
    pub prospects: &'a [Prospect],
    pub contracts: &'a ContractBook,
    pub overrides: &'a [OverrideRecord],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub grid: ForecastGrid,
    pub financials: Vec<YearFinancials>,
    pub assessments: Vec<PositionAssessment>,
}

/// Build the full forecast: baseline, prospect fill, manual overrides, then
/// the derived indicators, payroll, and row findings over the merged grid.
///
/// Without roster data the baseline is a placeholder with every cell empty
/// and no prospects are placed; saved overrides still apply on top of it.
pub fn build_forecast(inputs: ForecastInputs<'_>, params: &ForecastParams) -> Forecast {
    let mut grid = build_baseline(
        inputs.org_id,
        inputs.base_year,
        inputs.roster,
        inputs.contracts,
        params,
    );

    let assigned = if inputs.roster.is_some() {
        let reservations = reservations_for(&grid, inputs.overrides);
        assign_prospects(&mut grid, inputs.prospects, params, &reservations)
    } else {
        info!("no roster data for {}, starting from a placeholder grid", inputs.org_id);
        0
    };
    let overridden = apply_overrides(&mut grid, inputs.overrides, params);
    apply_indicators(&mut grid, inputs.prospects, params);
    info!(
        "forecast {}: {} prospect cell(s), {} override(s) applied",
        inputs.org_id, assigned, overridden
    );

    let financials = aggregate_financials(&grid, params);
    let assessments = assess_positions(&grid, params);

    Forecast {
        grid,
        financials,
        assessments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eta::Level;
    use crate::grid::CellState;
    use crate::indicators::IndicatorKind;
    use crate::overrides::{
        plan_assignment, Acquisition, AssignRequest, ChosenPlayer, OverrideSource,
    };
    use crate::player::{Contract, EstablishedPlayer, PlayerId, SlotOccupant};
    use crate::position::{Position, SlotId};
    use chrono::{TimeZone, Utc};

    fn roster() -> OrgRoster {
        let occupant = |slot, id: &str, age, rating| SlotOccupant {
            slot,
            player: EstablishedPlayer {
                id: PlayerId::new(id),
                name: format!("Player {id}"),
                age,
                rating,
                level: None,
            },
        };
        OrgRoster {
            org_id: "NYM".into(),
            occupants: vec![
                occupant(SlotId::lineup(Position::ShortStop), "ss", 30, 3.2),
                occupant(SlotId::lineup(Position::Catcher), "c", 34, 2.1),
                occupant(SlotId::rotation(1), "ace", 29, 4.1),
            ],
        }
    }

    fn contracts() -> ContractBook {
        vec![
            Contract {
                player_id: PlayerId::new("ss"),
                years_remaining: 2,
                salary_schedule: vec![8_000_000, 8_000_000],
                current_salary: 8_000_000,
            },
            Contract {
                player_id: PlayerId::new("c"),
                years_remaining: 1,
                salary_schedule: vec![4_000_000],
                current_salary: 4_000_000,
            },
            Contract {
                player_id: PlayerId::new("ace"),
                years_remaining: 5,
                salary_schedule: vec![25_000_000; 5],
                current_salary: 25_000_000,
            },
        ]
        .into_iter()
        .collect()
    }

    fn prospects() -> Vec<Prospect> {
        vec![
            Prospect {
                id: PlayerId::new("ss-kid"),
                name: "Shortstop Kid".into(),
                positions: vec![Position::ShortStop],
                age: 21,
                level: Level::TripleA,
                ceiling: 4.2,
                repertoire: None,
            },
            Prospect {
                id: PlayerId::new("c-kid"),
                name: "Catcher Kid".into(),
                positions: vec![Position::Catcher],
                age: 22,
                level: Level::DoubleA,
                ceiling: 3.0,
                repertoire: None,
            },
        ]
    }

    fn build(overrides: &[OverrideRecord]) -> Forecast {
        let roster = roster();
        let contracts = contracts();
        let prospects = prospects();
        build_forecast(
            ForecastInputs {
                org_id: "NYM",
                base_year: 2026,
                roster: Some(&roster),
                prospects: &prospects,
                contracts: &contracts,
                overrides,
            },
            &ForecastParams::default(),
        )
    }

    fn cell(f: &Forecast, slot: SlotId, year: i32) -> &crate::grid::GridCell {
        f.grid.cell(slot, year).unwrap()
    }

    #[test]
    fn pipeline_produces_full_grid_and_derived_views() {
        let f = build(&[]);
        assert_eq!(f.grid.cell_count(), 21 * 6);
        assert_eq!(f.financials.len(), 6);
        assert_eq!(f.assessments.len(), 21);

        let ss = SlotId::lineup(Position::ShortStop);
        assert!(cell(&f, ss, 2026).has_indicator(IndicatorKind::Ext));
        assert!(cell(&f, ss, 2026).has_indicator(IndicatorKind::Upgrade));
        assert_eq!(
            cell(&f, ss, 2028).player_id,
            Some(PlayerId::new("ss-kid"))
        );

        let c = SlotId::lineup(Position::Catcher);
        assert!(cell(&f, c, 2026).has_indicator(IndicatorKind::Cliff));
        // Catcher Kid (Eta 2) arrives in 2028; 2027 is an open need.
        assert!(cell(&f, c, 2027).has_indicator(IndicatorKind::Fa));
        assert_eq!(cell(&f, c, 2028).state, CellState::Prospect);

        assert!(cell(&f, SlotId::rotation(1), 2026).has_indicator(IndicatorKind::Expensive));
    }

    #[test]
    fn override_wins_and_reserves_player() {
        let params = ForecastParams::default();
        let ss = SlotId::lineup(Position::ShortStop);
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        // Put the shortstop prospect at DH instead, from 2027 onward.
        let records = plan_assignment(
            "NYM",
            2026,
            &AssignRequest {
                slot: SlotId::lineup(Position::DesignatedHitter),
                year: 2027,
                player: ChosenPlayer {
                    id: PlayerId::new("ss-kid"),
                    name: "Shortstop Kid".into(),
                    age: 21,
                    rating: 4.2,
                    is_minor_leaguer: true,
                },
                source: OverrideSource::OrgSelect,
                acquisition: None,
            },
            None,
            &params,
            now,
        );

        let f = build(&records);

        let dh = SlotId::lineup(Position::DesignatedHitter);
        for year in 2027..=2031 {
            let c = cell(&f, dh, year);
            assert_eq!(c.player_id, Some(PlayerId::new("ss-kid")));
            assert!(c.override_mark.is_some());
            // Never duplicated elsewhere in the same season.
            let count = f
                .grid
                .rows
                .iter()
                .filter(|r| r.cell(year as u32 - 2026).and_then(|c| c.player_id.as_ref())
                    == Some(&PlayerId::new("ss-kid")))
                .count();
            assert_eq!(count, 1, "year {year}");
        }
        assert_ne!(cell(&f, ss, 2028).player_id, Some(PlayerId::new("ss-kid")));
    }

    #[test]
    fn clearing_overrides_reproduces_baseline() {
        let original = build(&[]);
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let records = plan_assignment(
            "NYM",
            2026,
            &AssignRequest {
                slot: SlotId::lineup(Position::LeftField),
                year: 2026,
                player: ChosenPlayer {
                    id: PlayerId::new("fa-1"),
                    name: "Free Agent".into(),
                    age: 29,
                    rating: 3.4,
                    is_minor_leaguer: false,
                },
                source: OverrideSource::SearchSelect,
                acquisition: None,
            },
            None,
            &ForecastParams::default(),
            now,
        );
        let edited = build(&records);
        assert_ne!(edited, original);

        let cleared = build(&[]);
        assert_eq!(cleared, original);
    }

    #[test]
    fn grand_total_matches_sections() {
        let f = build(&[]);
        for year in &f.financials {
            assert_eq!(year.total, year.lineup + year.rotation + year.bullpen);
        }
        assert_eq!(f.financials[0].rotation, 25_000_000);
    }

    #[test]
    fn missing_roster_gives_placeholder() {
        let contracts = ContractBook::new();
        let prospects = prospects();
        let f = build_forecast(
            ForecastInputs {
                org_id: "XXX",
                base_year: 2026,
                roster: None,
                prospects: &prospects,
                contracts: &contracts,
                overrides: &[],
            },
            &ForecastParams::default(),
        );
        assert_eq!(f.grid.cell_count(), 21 * 6);
        assert!(f.grid.rows.iter().flat_map(|r| &r.cells).all(|c| c.is_empty()));
        assert!(f.financials.iter().all(|y| y.total == 0));
        // Open cells past the current season are still needs.
        let lf = SlotId::lineup(Position::LeftField);
        assert!(cell(&f, lf, 2027).has_indicator(IndicatorKind::Fa));
        assert!(!cell(&f, lf, 2026).has_indicator(IndicatorKind::Fa));
    }

    #[test]
    fn overrides_apply_without_roster_data() {
        let params = ForecastParams::default();
        let contracts = ContractBook::new();
        let prospects = prospects();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let lf = SlotId::lineup(Position::LeftField);
        let records = plan_assignment(
            "XXX",
            2026,
            &AssignRequest {
                slot: lf,
                year: 2027,
                player: ChosenPlayer {
                    id: PlayerId::new("fa-1"),
                    name: "Free Agent".into(),
                    age: 29,
                    rating: 3.4,
                    is_minor_leaguer: false,
                },
                source: OverrideSource::SearchSelect,
                acquisition: Some(Acquisition::FreeAgent),
            },
            None,
            &params,
            now,
        );
        assert!(!records.is_empty());

        let f = build_forecast(
            ForecastInputs {
                org_id: "XXX",
                base_year: 2026,
                roster: None,
                prospects: &prospects,
                contracts: &contracts,
                overrides: &records,
            },
            &params,
        );

        let signed = cell(&f, lf, 2027);
        assert_eq!(signed.player_id, Some(PlayerId::new("fa-1")));
        assert!(signed.override_mark.is_some());
        assert!(signed.has_indicator(IndicatorKind::FaTarget));
        assert!(!signed.has_indicator(IndicatorKind::Fa));
        assert!(f.financials[1].lineup > 0);
        // Prospects are only placed over a real roster.
        assert!(f
            .grid
            .rows
            .iter()
            .flat_map(|r| &r.cells)
            .all(|c| c.state != CellState::Prospect));
    }
}
