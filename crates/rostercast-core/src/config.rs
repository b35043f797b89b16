// Configuration loading and parsing (league.toml, forecast.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub forecast: ForecastConfig,
    pub db_path: String,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// Number of seasons in the forecast, current season included.
    pub horizon_years: u32,
    /// Salary floor substituted for occupied cells with no known salary.
    pub minimum_salary: u64,
    /// Contracts paying at or below this are treated as minimum-type deals.
    pub minimum_contract_ceiling: u64,
    pub expensive_salary: u64,
    pub team_control_years: u32,
    pub debut_age: u32,
    pub min_grid_age: u32,
    pub grid: GridConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    /// Lineup position labels in display order (e.g. "C", "1B", "DH").
    pub lineup: Vec<String>,
    pub rotation_slots: usize,
    pub bullpen_slots: usize,
}

// ---------------------------------------------------------------------------
// forecast.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire forecast.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ForecastFile {
    organization: OrganizationConfig,
    #[serde(default)]
    thresholds: Thresholds,
    database: DatabaseSection,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    #[serde(default)]
    path: String,
}

/// The public forecast config assembled from the forecast.toml sections.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub organization: OrganizationConfig,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationConfig {
    /// Empty means "use the organization chosen last time".
    #[serde(default)]
    pub id: String,
    /// The current season; forecast year offset 0.
    pub base_year: i32,
}

/// Cutoffs for cell indicators and row assessments.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub cliff_age: u32,
    pub cliff_service_years: u32,
    pub extension_min_rating: f64,
    pub extension_max_age: u32,
    pub trade_max_rating: f64,
    pub succession_min_rating: f64,
    pub strength_rating: f64,
    pub strength_years: usize,
    pub need_empty_years: usize,
    pub need_weak_empty_years: usize,
    pub need_weak_rating: f64,
    pub fa_first_offset: u32,
    pub fa_last_offset: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            cliff_age: 33,
            cliff_service_years: 10,
            extension_min_rating: 3.0,
            extension_max_age: 31,
            trade_max_rating: 2.5,
            succession_min_rating: 3.0,
            strength_rating: 3.5,
            strength_years: 5,
            need_empty_years: 3,
            need_weak_empty_years: 2,
            need_weak_rating: 2.5,
            fa_first_offset: 1,
            fa_last_offset: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub roster: String,
    pub prospects: String,
    pub contracts: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/forecast.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- forecast.toml (required) ---
    let forecast_path = config_dir.join("forecast.toml");
    let forecast_text = read_file(&forecast_path)?;
    let forecast_file: ForecastFile =
        toml::from_str(&forecast_text).map_err(|e| ConfigError::ParseError {
            path: forecast_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        forecast: ForecastConfig {
            organization: forecast_file.organization,
            thresholds: forecast_file.thresholds,
        },
        db_path: forecast_file.database.path,
        data_paths: forecast_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// The files `load_config_from` reads from `config/`.
const CONFIG_FILES: [&str; 2] = ["league.toml", "forecast.toml"];

fn seed_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Seed `config/` with the shipped defaults for any config file it lacks.
/// Existing files are never touched, and nothing else in `defaults/` (such as
/// `.example` templates) is copied. Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (false, false) => {
            return Err(seed_error(format!(
                "neither defaults/ nor config/ directory found in {}; \
                 run from the project root or ensure defaults/ is present",
                base_dir.display()
            )))
        }
        (false, true) => return Ok(Vec::new()),
        (true, _) => {}
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_error(format!("failed to create {}: {e}", config_dir.display())))?;

    let mut seeded = Vec::new();
    for name in CONFIG_FILES {
        let source = defaults_dir.join(name);
        if !source.is_file() {
            warn!("no shipped default for {}", name);
            continue;
        }
        let target = config_dir.join(name);
        if seed_file(&source, &target)? {
            info!("Seeded {} from defaults", target.display());
            seeded.push(target);
        }
    }
    Ok(seeded)
}

/// Copy `source` to `target` unless `target` already exists. Returns whether
/// a copy was made.
fn seed_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(seed_error(format!("failed to create {}: {e}", target.display()))),
    };
    let mut src = std::fs::File::open(source)
        .map_err(|e| seed_error(format!("failed to read {}: {e}", source.display())))?;
    std::io::copy(&mut src, &mut dest)
        .map_err(|e| seed_error(format!("failed to write {}: {e}", target.display())))?;
    Ok(true)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

/// Resolve the database location. An empty `database.path` falls back to the
/// platform data directory (e.g. `~/.local/share/rostercast/rostercast.db`).
pub fn resolve_db_path(config: &Config) -> PathBuf {
    if !config.db_path.trim().is_empty() {
        return PathBuf::from(&config.db_path);
    }
    match directories::ProjectDirs::from("", "", "rostercast") {
        Some(dirs) => dirs.data_dir().join("rostercast.db"),
        None => PathBuf::from("rostercast.db"),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;

    if league.horizon_years == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.horizon_years".into(),
            message: "must be greater than 0".into(),
        });
    }

    if league.minimum_salary == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.minimum_salary".into(),
            message: "must be greater than 0".into(),
        });
    }

    if league.grid.lineup.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.grid.lineup".into(),
            message: "must list at least one position".into(),
        });
    }

    if league.grid.rotation_slots == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.grid.rotation_slots".into(),
            message: "must be greater than 0".into(),
        });
    }

    // Rating cutoffs live on the 0-5 scale
    let t = &config.forecast.thresholds;
    let rating_fields: &[(&str, f64)] = &[
        ("thresholds.extension_min_rating", t.extension_min_rating),
        ("thresholds.trade_max_rating", t.trade_max_rating),
        ("thresholds.succession_min_rating", t.succession_min_rating),
        ("thresholds.strength_rating", t.strength_rating),
        ("thresholds.need_weak_rating", t.need_weak_rating),
    ];
    for (name, val) in rating_fields {
        if !(0.0..=5.0).contains(val) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be between 0.0 and 5.0 inclusive, got {val}"),
            });
        }
    }

    if t.fa_first_offset > t.fa_last_offset {
        return Err(ConfigError::ValidationError {
            field: "thresholds.fa_first_offset".into(),
            message: format!(
                "must not exceed fa_last_offset ({} > {})",
                t.fa_first_offset, t.fa_last_offset
            ),
        });
    }

    let org_id = &config.forecast.organization.id;
    if org_id.trim() != org_id {
        return Err(ConfigError::ValidationError {
            field: "organization.id".into(),
            message: format!("must not have surrounding whitespace, got {org_id:?}"),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
