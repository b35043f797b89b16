// Collaborator seams the planner reads from and writes through.

use async_trait::async_trait;
use rostercast_baseball::overrides::{OverrideKey, OverrideRecord};
use rostercast_baseball::player::{Contract, OrgRoster, PlayerId, Prospect};

/// Supplies the current depth chart and the prospect pool of an organization.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// `None` when there is no roster data for the organization at all.
    async fn fetch_roster(&self, org_id: &str) -> anyhow::Result<Option<OrgRoster>>;

    async fn fetch_prospects(&self, org_id: &str) -> anyhow::Result<Vec<Prospect>>;
}

/// Contract ledger lookups.
#[async_trait]
pub trait ContractLedger: Send + Sync {
    async fn contract(&self, player_id: &PlayerId) -> anyhow::Result<Option<Contract>>;
}

/// Persistence for manual overrides, keyed by `"{org}_{slot}_{year}"`.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    async fn fetch_all(&self, org_id: &str) -> anyhow::Result<Vec<OverrideRecord>>;

    async fn upsert_many(&self, records: &[OverrideRecord]) -> anyhow::Result<()>;

    /// Returns whether a record existed at `key`.
    async fn delete_one(&self, key: &OverrideKey) -> anyhow::Result<bool>;

    /// Returns the number of records removed.
    async fn delete_all(&self, org_id: &str) -> anyhow::Result<usize>;
}
