// Forecast planner: rebuilds the forecast from collaborators and routes
// manual edits through the override store.
//
// Every rebuild is issued a request token. A rebuild that finishes after a
// newer one was issued is reported as stale and never replaces the cached
// forecast, so the most recently issued rebuild is the authoritative one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::Utc;
use rostercast_baseball::overrides::{
    plan_assignment, plan_extension, AssignRequest, ExtendRequest, OverrideKey,
};
use rostercast_baseball::player::ContractBook;
use rostercast_baseball::position::SlotId;
use rostercast_baseball::{build_forecast, Forecast, ForecastInputs, ForecastParams};
use rostercast_core::config::{Config, ConfigError};
use tracing::{debug, info, warn};

use crate::collaborators::{ContractLedger, OverrideStore, RosterSource};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// The organization and season a rebuild targets, plus the league parameters.
#[derive(Debug, Clone)]
pub struct ForecastContext {
    pub org_id: String,
    pub base_year: i32,
    pub params: ForecastParams,
}

impl ForecastContext {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(ForecastContext {
            org_id: config.forecast.organization.id.clone(),
            base_year: config.forecast.organization.base_year,
            params: ForecastParams::from_config(config)?,
        })
    }

    /// Same league parameters, different organization.
    pub fn for_org(&self, org_id: impl Into<String>) -> Self {
        ForecastContext {
            org_id: org_id.into(),
            ..self.clone()
        }
    }

    /// Fall back to the previously selected organization when none is
    /// configured. `None` if neither names one.
    pub fn or_remembered_org(self, remembered: Option<&str>) -> Option<Self> {
        if !self.org_id.is_empty() {
            return Some(self);
        }
        let org_id = remembered.map(str::trim).filter(|id| !id.is_empty())?;
        Some(self.for_org(org_id))
    }
}

// ---------------------------------------------------------------------------
// Rebuild outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RebuildOutcome {
    /// This rebuild is the newest one issued; its forecast is now cached.
    Current(Forecast),
    /// A newer rebuild (`latest`) was issued while this one (`token`) ran.
    Stale { token: u64, latest: u64 },
}

impl RebuildOutcome {
    pub fn forecast(&self) -> Option<&Forecast> {
        match self {
            RebuildOutcome::Current(f) => Some(f),
            RebuildOutcome::Stale { .. } => None,
        }
    }

    pub fn into_forecast(self) -> Option<Forecast> {
        match self {
            RebuildOutcome::Current(f) => Some(f),
            RebuildOutcome::Stale { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

pub struct ForecastPlanner {
    roster: Arc<dyn RosterSource>,
    ledger: Arc<dyn ContractLedger>,
    store: Arc<dyn OverrideStore>,
    /// Last issued rebuild token.
    generation: AtomicU64,
    latest: Mutex<Option<(u64, Forecast)>>,
}

impl ForecastPlanner {
    pub fn new(
        roster: Arc<dyn RosterSource>,
        ledger: Arc<dyn ContractLedger>,
        store: Arc<dyn OverrideStore>,
    ) -> Self {
        ForecastPlanner {
            roster,
            ledger,
            store,
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// The forecast produced by the newest completed rebuild, if any.
    pub fn latest(&self) -> Option<Forecast> {
        self.latest
            .lock()
            .expect("forecast cache mutex poisoned")
            .as_ref()
            .map(|(_, f)| f.clone())
    }

    /// Rebuild the whole forecast for `ctx` from scratch.
    pub async fn rebuild(&self, ctx: &ForecastContext) -> anyhow::Result<RebuildOutcome> {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("rebuild {} started for {}", token, ctx.org_id);

        let roster = self
            .roster
            .fetch_roster(&ctx.org_id)
            .await
            .with_context(|| format!("failed to fetch roster for {}", ctx.org_id))?;
        let prospects = self
            .roster
            .fetch_prospects(&ctx.org_id)
            .await
            .with_context(|| format!("failed to fetch prospects for {}", ctx.org_id))?;

        let mut contracts = ContractBook::new();
        if let Some(roster) = &roster {
            for occupant in &roster.occupants {
                let id = &occupant.player.id;
                match self
                    .ledger
                    .contract(id)
                    .await
                    .with_context(|| format!("failed to fetch contract for {}", id.as_str()))?
                {
                    Some(contract) => contracts.insert(contract),
                    None => debug!("no ledger entry for {}", id.as_str()),
                }
            }
        }

        let overrides = self
            .store
            .fetch_all(&ctx.org_id)
            .await
            .with_context(|| format!("failed to fetch overrides for {}", ctx.org_id))?;

        let forecast = build_forecast(
            ForecastInputs {
                org_id: &ctx.org_id,
                base_year: ctx.base_year,
                roster: roster.as_ref(),
                prospects: &prospects,
                contracts: &contracts,
                overrides: &overrides,
            },
            &ctx.params,
        );

        let latest = self.generation.load(Ordering::SeqCst);
        if token != latest {
            info!(
                "discarding stale rebuild {} for {} (latest issued: {})",
                token, ctx.org_id, latest
            );
            return Ok(RebuildOutcome::Stale { token, latest });
        }

        let mut cache = self.latest.lock().expect("forecast cache mutex poisoned");
        if cache.as_ref().map_or(true, |(t, _)| *t < token) {
            *cache = Some((token, forecast.clone()));
        }
        Ok(RebuildOutcome::Current(forecast))
    }

    /// Put a chosen player into a cell for every season they stay under
    /// control, then rebuild.
    pub async fn assign(
        &self,
        ctx: &ForecastContext,
        request: &AssignRequest,
    ) -> anyhow::Result<RebuildOutcome> {
        let contract = self
            .ledger
            .contract(&request.player.id)
            .await
            .with_context(|| {
                format!("failed to fetch contract for {}", request.player.id.as_str())
            })?;
        let records = plan_assignment(
            &ctx.org_id,
            ctx.base_year,
            request,
            contract.as_ref(),
            &ctx.params,
            Utc::now(),
        );
        if records.is_empty() {
            warn!(
                "assignment of {} to {} {} is outside the forecast window",
                request.player.name, request.slot, request.year
            );
        } else {
            self.store.upsert_many(&records).await?;
            info!(
                "assigned {} to {} for {} season(s) from {}",
                request.player.name,
                request.slot,
                records.len(),
                request.year
            );
        }
        self.rebuild(ctx).await
    }

    /// Extend the incumbent of a cell for the requested number of seasons,
    /// then rebuild.
    pub async fn extend(
        &self,
        ctx: &ForecastContext,
        request: &ExtendRequest,
    ) -> anyhow::Result<RebuildOutcome> {
        let records = plan_extension(
            &ctx.org_id,
            ctx.base_year,
            request,
            &ctx.params,
            Utc::now(),
        );
        if records.is_empty() {
            warn!(
                "extension of {} at {} starting {} is outside the forecast window",
                request.player.name, request.slot, request.start_year
            );
        } else {
            self.store.upsert_many(&records).await?;
            info!(
                "extended {} at {} for {} season(s)",
                request.player.name,
                request.slot,
                records.len()
            );
        }
        self.rebuild(ctx).await
    }

    /// Remove the override at one cell, then rebuild.
    pub async fn clear(
        &self,
        ctx: &ForecastContext,
        slot: SlotId,
        year: i32,
    ) -> anyhow::Result<RebuildOutcome> {
        let key = OverrideKey::new(ctx.org_id.as_str(), slot, year);
        if self.store.delete_one(&key).await? {
            info!("cleared override {}", key);
        } else {
            debug!("no override at {}", key);
        }
        self.rebuild(ctx).await
    }

    /// Remove every override of the organization, then rebuild.
    pub async fn reset_all(&self, ctx: &ForecastContext) -> anyhow::Result<RebuildOutcome> {
        let removed = self.store.delete_all(&ctx.org_id).await?;
        info!("reset {}: removed {} override(s)", ctx.org_id, removed);
        self.rebuild(ctx).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::CsvDataSource;
    use crate::store::SqliteOverrideStore;
    use rostercast_baseball::grid::CellState;
    use rostercast_baseball::overrides::{ChosenPlayer, OverrideSource};
    use rostercast_baseball::player::PlayerId;
    use rostercast_baseball::position::Position;
    use rostercast_core::db::Database;

    const ROSTER: &str = "\
org,slot,player_id,name,age,rating,level
NYM,SS,ss1,Frankie Lind,30,3.2,
NYM,C,c1,Old Catcher,34,2.1,
NYM,SP1,sp1,Kodai Sen,29,4.1,
";

    const PROSPECTS: &str = "\
org,player_id,name,positions,age,level,ceiling,pitches,stamina
NYM,k1,Jett Wilder,SS,21,AAA,4.2,,
";

    const CONTRACTS: &str = "\
player_id,years_remaining,current_salary,salary_schedule
ss1,2,8000000,8000000|8000000
c1,1,4000000,4000000
sp1,5,25000000,25000000|25000000|25000000|25000000|25000000
";

    fn planner() -> (ForecastPlanner, Arc<SqliteOverrideStore>) {
        let data = Arc::new(
            CsvDataSource::from_readers(
                ROSTER.as_bytes(),
                PROSPECTS.as_bytes(),
                CONTRACTS.as_bytes(),
            )
            .unwrap(),
        );
        let store = Arc::new(SqliteOverrideStore::new(Arc::new(
            Database::open(":memory:").unwrap(),
        )));
        let planner = ForecastPlanner::new(data.clone(), data, store.clone());
        (planner, store)
    }

    fn ctx() -> ForecastContext {
        ForecastContext {
            org_id: "NYM".into(),
            base_year: 2026,
            params: ForecastParams::default(),
        }
    }

    #[test]
    fn configured_org_wins_over_remembered_one() {
        let resolved = ctx().or_remembered_org(Some("ATL")).unwrap();
        assert_eq!(resolved.org_id, "NYM");

        let unset = ctx().for_org("");
        let resolved = unset.clone().or_remembered_org(Some("ATL")).unwrap();
        assert_eq!(resolved.org_id, "ATL");
        assert_eq!(resolved.base_year, 2026);

        assert!(unset.clone().or_remembered_org(None).is_none());
        assert!(unset.or_remembered_org(Some("  ")).is_none());
    }

    #[tokio::test]
    async fn rebuild_caches_current_forecast() {
        let (planner, _) = planner();
        assert!(planner.latest().is_none());

        let outcome = planner.rebuild(&ctx()).await.unwrap();
        let forecast = outcome.forecast().cloned().unwrap();
        assert_eq!(planner.latest(), Some(forecast.clone()));

        let ss = forecast
            .grid
            .cell(SlotId::lineup(Position::ShortStop), 2026)
            .unwrap();
        assert_eq!(ss.player_id, Some(PlayerId::new("ss1")));
        assert_eq!(ss.salary, 8_000_000);
    }

    #[tokio::test]
    async fn assign_persists_then_rebuilds() {
        let (planner, store) = planner();
        let request = AssignRequest {
            slot: SlotId::lineup(Position::LeftField),
            year: 2027,
            player: ChosenPlayer {
                id: PlayerId::new("fa-7"),
                name: "Open Market".into(),
                age: 29,
                rating: 3.4,
                is_minor_leaguer: false,
            },
            source: OverrideSource::SearchSelect,
            acquisition: None,
        };

        let forecast = planner
            .assign(&ctx(), &request)
            .await
            .unwrap()
            .into_forecast()
            .unwrap();
        let cell = forecast
            .grid
            .cell(SlotId::lineup(Position::LeftField), 2027)
            .unwrap();
        assert_eq!(cell.player_id, Some(PlayerId::new("fa-7")));
        assert!(cell.override_mark.is_some());
        assert_eq!(store.fetch_all("NYM").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn assignment_outside_window_writes_nothing() {
        let (planner, store) = planner();
        let request = AssignRequest {
            slot: SlotId::lineup(Position::LeftField),
            year: 2040,
            player: ChosenPlayer {
                id: PlayerId::new("fa-7"),
                name: "Open Market".into(),
                age: 29,
                rating: 3.4,
                is_minor_leaguer: false,
            },
            source: OverrideSource::SearchSelect,
            acquisition: None,
        };
        let outcome = planner.assign(&ctx(), &request).await.unwrap();
        assert!(outcome.forecast().is_some());
        assert!(store.fetch_all("NYM").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn extend_marks_last_year_final() {
        let (planner, _) = planner();
        let ss = SlotId::lineup(Position::ShortStop);
        let request = ExtendRequest {
            slot: ss,
            start_year: 2028,
            player: ChosenPlayer {
                id: PlayerId::new("ss1"),
                name: "Frankie Lind".into(),
                age: 30,
                rating: 3.2,
                is_minor_leaguer: false,
            },
            years: 3,
            salary: Some(12_000_000),
        };

        let forecast = planner
            .extend(&ctx(), &request)
            .await
            .unwrap()
            .into_forecast()
            .unwrap();
        for year in 2028..=2029 {
            let cell = forecast.grid.cell(ss, year).unwrap();
            assert_eq!(cell.state, CellState::UnderContract);
            assert_eq!(cell.salary, 12_000_000);
        }
        assert_eq!(forecast.grid.cell(ss, 2030).unwrap().state, CellState::FinalYear);
        assert_eq!(
            forecast.grid.cell(ss, 2030).unwrap().player_id,
            Some(PlayerId::new("ss1"))
        );
    }

    #[tokio::test]
    async fn other_org_context_has_placeholder_grid() {
        let (planner, _) = planner();
        let forecast = planner
            .rebuild(&ctx().for_org("BOS"))
            .await
            .unwrap()
            .into_forecast()
            .unwrap();
        assert_eq!(forecast.grid.org_id, "BOS");
        assert!(forecast
            .grid
            .rows
            .iter()
            .flat_map(|r| &r.cells)
            .all(|c| c.is_empty()));
    }
}
