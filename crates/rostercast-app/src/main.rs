// Roster forecast entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open database and settle the organization (config, else last selection)
// 4. Load roster, prospect, and contract data
// 5. Build the planner and remember the selected organization
// 6. Rebuild the forecast and print a JSON summary to stdout

use std::sync::Arc;

use anyhow::Context;
use rostercast_app::files::CsvDataSource;
use rostercast_app::planner::{ForecastContext, ForecastPlanner, RebuildOutcome};
use rostercast_app::store::SqliteOverrideStore;
use rostercast_app::summary::ForecastSummary;
use rostercast_core::config;
use rostercast_core::db::Database;
use tracing::{info, warn};

const SELECTED_ORG_KEY: &str = "selected_org";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Roster forecast starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let ctx = ForecastContext::from_config(&config).context("invalid league configuration")?;
    info!(
        "Config loaded: league={}, base year {}, {} season horizon",
        config.league.name, ctx.base_year, ctx.params.horizon_years
    );

    // 3. Open database and settle the organization
    let db_path = config::resolve_db_path(&config);
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path = db_path.to_string_lossy().into_owned();
    let db = Arc::new(Database::open(&db_path).context("failed to open database")?);
    info!("Database opened at {}", db_path);

    let remembered = db.load_state(SELECTED_ORG_KEY)?;
    let ctx = ctx
        .or_remembered_org(remembered.as_ref().and_then(|v| v.as_str()))
        .context("no organization configured and none selected previously")?;
    info!("Planning for organization {}", ctx.org_id);

    // 4. Load roster, prospect, and contract data
    let data = Arc::new(
        CsvDataSource::load(&config.data_paths).context("failed to load roster data")?,
    );
    if !data.org_ids().contains(&ctx.org_id) {
        warn!("No roster rows for {}; the forecast will be a placeholder", ctx.org_id);
    }

    // 5. Build the planner
    let store = Arc::new(SqliteOverrideStore::new(db.clone()));
    let planner = ForecastPlanner::new(data.clone(), data, store);
    db.save_state(SELECTED_ORG_KEY, &serde_json::json!(ctx.org_id))?;

    // 6. Rebuild and print
    let forecast = match planner.rebuild(&ctx).await? {
        RebuildOutcome::Current(forecast) => forecast,
        RebuildOutcome::Stale { token, latest } => {
            anyhow::bail!("rebuild {token} superseded by {latest}")
        }
    };
    let summary = ForecastSummary::from_forecast(&forecast);
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
    );

    info!("Roster forecast finished");
    Ok(())
}

/// Set up file-based tracing. Logs go to `logs/rostercast.log` in the
/// current working directory.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("rostercast.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("rostercast_app=info,rostercast_baseball=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
