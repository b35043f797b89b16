// Indicator engine: derived tags attached to grid cells.

use serde::{Deserialize, Serialize};

use crate::grid::{CellState, ForecastGrid, GridRow};
use crate::overrides::Acquisition;
use crate::params::ForecastParams;
use crate::player::Prospect;
use crate::position::{Section, SlotId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorKind {
    Cliff,
    Ext,
    Expensive,
    Tr,
    Upgrade,
    Fa,
    Trade,
    FaTarget,
}

impl IndicatorKind {
    pub fn code(&self) -> &'static str {
        match self {
            IndicatorKind::Cliff => "CLIFF",
            IndicatorKind::Ext => "EXT",
            IndicatorKind::Expensive => "EXPENSIVE",
            IndicatorKind::Tr => "TR",
            IndicatorKind::Upgrade => "UPGRADE",
            IndicatorKind::Fa => "FA",
            IndicatorKind::Trade => "TRADE",
            IndicatorKind::FaTarget => "FA_TARGET",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub label: String,
    pub note: String,
}

impl Indicator {
    fn new(kind: IndicatorKind, label: &str, note: String) -> Self {
        Indicator {
            kind,
            label: label.to_string(),
            note,
        }
    }
}

/// Whether the occupant at `offset` is an extension candidate: a
/// non-minimum, non-prospect player under contract whose deal ends next
/// season, rated and aged within the extension window.
pub fn extension_candidate(row: &GridRow, offset: u32, params: &ForecastParams) -> bool {
    let t = &params.thresholds;
    let (Some(cell), Some(next)) = (row.cell(offset), row.cell(offset + 1)) else {
        return false;
    };
    cell.state == CellState::UnderContract
        && !cell.is_prospect
        && !cell.is_min_contract
        && next.state == CellState::FinalYear
        && next.player_id.is_some()
        && next.player_id == cell.player_id
        && cell.rating >= t.extension_min_rating
        && cell.age <= t.extension_max_age
}

/// Whether a prospect could step into `slot` right now.
fn can_fill_now(slot: SlotId, prospect: &Prospect) -> bool {
    if prospect.eta() != 0 {
        return false;
    }
    match slot.section() {
        Section::Lineup => prospect.is_hitter() && slot.accepts_hitter(&prospect.positions),
        Section::Rotation => prospect.is_starter(),
        Section::Bullpen => prospect.is_pitcher(),
    }
}

/// Recompute every cell's indicators. Any previous indicators are replaced.
pub fn apply_indicators(grid: &mut ForecastGrid, prospects: &[Prospect], params: &ForecastParams) {
    let t = &params.thresholds;

    for row in grid.rows.iter_mut() {
        let mut per_cell: Vec<Vec<Indicator>> = Vec::with_capacity(row.cells.len());

        for cell in &row.cells {
            let mut tags = Vec::new();
            let occupied_veteran = cell.is_occupied() && !cell.is_prospect;

            if cell.is_empty()
                && !cell.is_prospect
                && (t.fa_first_offset..=t.fa_last_offset).contains(&cell.offset)
            {
                tags.push(Indicator::new(
                    IndicatorKind::Fa,
                    "FA need",
                    format!("{} has no one signed or ready for {}", row.label, cell.year),
                ));
            }

            if occupied_veteran {
                let service = params.service_years(cell.age);
                if cell.age >= t.cliff_age || service >= t.cliff_service_years {
                    tags.push(Indicator::new(
                        IndicatorKind::Cliff,
                        "Decline risk",
                        format!("age {}, ~{} service years", cell.age, service),
                    ));
                }
            }

            if extension_candidate(row, cell.offset, params) {
                tags.push(Indicator::new(
                    IndicatorKind::Ext,
                    "Extend",
                    format!(
                        "rated {:.1} at {}, deal ends after {}",
                        cell.rating,
                        cell.age,
                        cell.year + 1
                    ),
                ));
            }

            if occupied_veteran && cell.salary >= params.expensive_salary {
                tags.push(Indicator::new(
                    IndicatorKind::Expensive,
                    "Expensive",
                    format!("${} salary", cell.salary),
                ));
            }

            if occupied_veteran
                && cell.state == CellState::FinalYear
                && cell.rating < t.trade_max_rating
            {
                let has_successor = row.cells.iter().any(|later| {
                    later.offset > cell.offset
                        && later.is_prospect
                        && later.rating >= t.succession_min_rating
                });
                if !has_successor {
                    tags.push(Indicator::new(
                        IndicatorKind::Tr,
                        "Trade candidate",
                        format!("rated {:.1} in final year, no successor", cell.rating),
                    ));
                }
            }

            if cell.offset == 0 && occupied_veteran {
                let better = prospects
                    .iter()
                    .filter(|p| p.ceiling > cell.rating && can_fill_now(row.slot, p))
                    .max_by(|a, b| {
                        a.ceiling
                            .partial_cmp(&b.ceiling)
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then_with(|| b.id.cmp(&a.id))
                    });
                if let Some(p) = better {
                    tags.push(Indicator::new(
                        IndicatorKind::Upgrade,
                        "Call-up",
                        format!("{} ({:.1}) is ready now", p.name, p.ceiling),
                    ));
                }
            }

            if let Some(mark) = cell.override_mark {
                match mark.acquisition {
                    Some(Acquisition::Trade) => tags.push(Indicator::new(
                        IndicatorKind::Trade,
                        "Trade target",
                        "acquire by trade".to_string(),
                    )),
                    Some(Acquisition::FreeAgent) => tags.push(Indicator::new(
                        IndicatorKind::FaTarget,
                        "FA target",
                        "sign in free agency".to_string(),
                    )),
                    None => {}
                }
            }

            per_cell.push(tags);
        }

        for (cell, tags) in row.cells.iter_mut().zip(per_cell) {
            cell.indicators = tags;
        }
    }
}
