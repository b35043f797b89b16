// SQLite-backed override store.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use rostercast_baseball::overrides::{records_from_rows, OverrideKey, OverrideRecord};
use rostercast_core::db::{Database, StoredOverride};

use crate::collaborators::OverrideStore;

pub struct SqliteOverrideStore {
    db: Arc<Database>,
}

impl SqliteOverrideStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OverrideStore for SqliteOverrideStore {
    async fn fetch_all(&self, org_id: &str) -> anyhow::Result<Vec<OverrideRecord>> {
        let rows = self
            .db
            .load_overrides(org_id)
            .with_context(|| format!("failed to load overrides for {org_id}"))?;
        Ok(records_from_rows(rows))
    }

    async fn upsert_many(&self, records: &[OverrideRecord]) -> anyhow::Result<()> {
        let rows: Vec<StoredOverride> = records.iter().map(StoredOverride::from).collect();
        self.db
            .upsert_overrides(&rows)
            .context("failed to persist overrides")
    }

    async fn delete_one(&self, key: &OverrideKey) -> anyhow::Result<bool> {
        self.db
            .delete_override(&key.storage_key())
            .with_context(|| format!("failed to delete override {key}"))
    }

    async fn delete_all(&self, org_id: &str) -> anyhow::Result<usize> {
        self.db
            .delete_overrides_for_org(org_id)
            .with_context(|| format!("failed to delete overrides for {org_id}"))
    }
}
