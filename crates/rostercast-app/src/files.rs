// CSV-backed roster, prospect, and contract data.
//
// Three files, one row per record:
//   roster.csv     org,slot,player_id,name,age,rating[,level]
//   prospects.csv  org,player_id,name,positions,age,level,ceiling[,pitches,stamina]
//   contracts.csv  player_id,years_remaining,current_salary[,salary_schedule]
//
// `positions` accepts single positions and group codes separated by `/`
// (e.g. "SS/2B", "OF"). `salary_schedule` is `|`-separated, current season
// first.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use rostercast_baseball::eta::Level;
use rostercast_baseball::player::{
    Contract, ContractBook, EstablishedPlayer, OrgRoster, PitchRepertoire, PlayerId, Prospect,
    SlotOccupant,
};
use rostercast_baseball::position::{parse_position_list, SlotId};
use rostercast_core::config::DataPaths;
use serde::Deserialize;
use tracing::{info, warn};

use crate::collaborators::{ContractLedger, RosterSource};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV rows (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    org: String,
    slot: String,
    player_id: String,
    name: String,
    age: u32,
    rating: f64,
    #[serde(default)]
    level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProspectRow {
    org: String,
    player_id: String,
    name: String,
    positions: String,
    age: u32,
    level: String,
    ceiling: f64,
    #[serde(default)]
    pitches: Option<u32>,
    #[serde(default)]
    stamina: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawContractRow {
    player_id: String,
    years_remaining: u32,
    current_salary: u64,
    #[serde(default)]
    salary_schedule: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn valid_rating(r: f64) -> bool {
    r.is_finite() && (0.0..=5.0).contains(&r)
}

fn parse_schedule(s: &str) -> Option<Vec<u64>> {
    s.split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<u64>().ok())
        .collect()
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

fn load_rosters_from_reader<R: Read>(rdr: R) -> Result<HashMap<String, OrgRoster>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rosters: HashMap<String, OrgRoster> = HashMap::new();
    for result in reader.deserialize::<RawRosterRow>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim().to_string();
                let Some(slot) = SlotId::parse(&raw.slot) else {
                    warn!("skipping roster row '{}': unknown slot '{}'", name, raw.slot);
                    continue;
                };
                if !valid_rating(raw.rating) {
                    warn!("skipping roster row '{}': rating {} out of range", name, raw.rating);
                    continue;
                }
                let org = raw.org.trim().to_string();
                let roster = rosters.entry(org.clone()).or_insert_with(|| OrgRoster {
                    org_id: org,
                    occupants: Vec::new(),
                });
                if roster.occupant(slot).is_some() {
                    warn!(
                        "duplicate {} holder for {}, keeping the first ('{}' skipped)",
                        slot, roster.org_id, name
                    );
                    continue;
                }
                roster.occupants.push(SlotOccupant {
                    slot,
                    player: EstablishedPlayer {
                        id: PlayerId::new(raw.player_id.trim()),
                        name,
                        age: raw.age,
                        rating: raw.rating,
                        level: raw
                            .level
                            .as_deref()
                            .map(str::trim)
                            .filter(|l| !l.is_empty())
                            .map(Level::parse_or_rookie),
                    },
                });
            }
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(rosters)
}

fn load_prospects_from_reader<R: Read>(
    rdr: R,
) -> Result<HashMap<String, Vec<Prospect>>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut pools: HashMap<String, Vec<Prospect>> = HashMap::new();
    for result in reader.deserialize::<RawProspectRow>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim().to_string();
                let positions = parse_position_list(&raw.positions);
                if positions.is_empty() {
                    warn!(
                        "skipping prospect '{}': no known positions in '{}'",
                        name, raw.positions
                    );
                    continue;
                }
                if !valid_rating(raw.ceiling) {
                    warn!("skipping prospect '{}': ceiling {} out of range", name, raw.ceiling);
                    continue;
                }
                let repertoire = match (raw.pitches, raw.stamina) {
                    (Some(pitch_count), Some(stamina)) => Some(PitchRepertoire {
                        pitch_count,
                        stamina,
                    }),
                    _ => None,
                };
                pools
                    .entry(raw.org.trim().to_string())
                    .or_default()
                    .push(Prospect {
                        id: PlayerId::new(raw.player_id.trim()),
                        name,
                        positions,
                        age: raw.age,
                        level: Level::parse_or_rookie(&raw.level),
                        ceiling: raw.ceiling,
                        repertoire,
                    });
            }
            Err(e) => {
                warn!("skipping malformed prospect row: {}", e);
            }
        }
    }
    Ok(pools)
}

fn load_contracts_from_reader<R: Read>(rdr: R) -> Result<ContractBook, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut book = ContractBook::new();
    for result in reader.deserialize::<RawContractRow>() {
        match result {
            Ok(raw) => {
                let id = raw.player_id.trim().to_string();
                let Some(salary_schedule) = parse_schedule(&raw.salary_schedule) else {
                    warn!(
                        "skipping contract for '{}': bad salary schedule '{}'",
                        id, raw.salary_schedule
                    );
                    continue;
                };
                if book.get(&PlayerId::new(id.as_str())).is_some() {
                    warn!("duplicate contract for '{}', using latest row", id);
                }
                book.insert(Contract {
                    player_id: PlayerId::new(id),
                    years_remaining: raw.years_remaining,
                    salary_schedule,
                    current_salary: raw.current_salary,
                });
            }
            Err(e) => {
                warn!("skipping malformed contract row: {}", e);
            }
        }
    }
    Ok(book)
}

// ---------------------------------------------------------------------------
// Public path-based loading
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, DataError> {
    std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_error(path: &str, source: csv::Error) -> DataError {
    DataError::Csv {
        path: path.to_string(),
        source,
    }
}

/// In-memory roster, prospect, and contract data loaded from CSV.
#[derive(Debug, Clone, Default)]
pub struct CsvDataSource {
    rosters: HashMap<String, OrgRoster>,
    prospects: HashMap<String, Vec<Prospect>>,
    contracts: ContractBook,
}

impl CsvDataSource {
    /// Load all three files. The roster file must yield at least one row.
    pub fn load(paths: &DataPaths) -> Result<Self, DataError> {
        let rosters = load_rosters_from_reader(open(Path::new(&paths.roster))?)
            .map_err(|e| csv_error(&paths.roster, e))?;
        let prospects = load_prospects_from_reader(open(Path::new(&paths.prospects))?)
            .map_err(|e| csv_error(&paths.prospects, e))?;
        let contracts = load_contracts_from_reader(open(Path::new(&paths.contracts))?)
            .map_err(|e| csv_error(&paths.contracts, e))?;

        let source = Self::assemble(rosters, prospects, contracts)?;
        info!(
            "Loaded {} roster(s), {} prospect pool(s), {} contract(s)",
            source.rosters.len(),
            source.prospects.len(),
            source.contracts.len()
        );
        Ok(source)
    }

    /// Load from in-memory readers (used by tests and embedding callers).
    pub fn from_readers<A: Read, B: Read, C: Read>(
        roster: A,
        prospects: B,
        contracts: C,
    ) -> Result<Self, DataError> {
        Self::assemble(
            load_rosters_from_reader(roster).map_err(|e| csv_error("roster", e))?,
            load_prospects_from_reader(prospects).map_err(|e| csv_error("prospects", e))?,
            load_contracts_from_reader(contracts).map_err(|e| csv_error("contracts", e))?,
        )
    }

    fn assemble(
        rosters: HashMap<String, OrgRoster>,
        prospects: HashMap<String, Vec<Prospect>>,
        contracts: ContractBook,
    ) -> Result<Self, DataError> {
        if rosters.is_empty() {
            return Err(DataError::Validation(
                "roster CSV produced zero valid rows".into(),
            ));
        }
        Ok(CsvDataSource {
            rosters,
            prospects,
            contracts,
        })
    }

    pub fn org_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.rosters.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl RosterSource for CsvDataSource {
    async fn fetch_roster(&self, org_id: &str) -> anyhow::Result<Option<OrgRoster>> {
        Ok(self.rosters.get(org_id).cloned())
    }

    async fn fetch_prospects(&self, org_id: &str) -> anyhow::Result<Vec<Prospect>> {
        Ok(self.prospects.get(org_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ContractLedger for CsvDataSource {
    async fn contract(&self, player_id: &PlayerId) -> anyhow::Result<Option<Contract>> {
        Ok(self.contracts.get(player_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rostercast_baseball::position::Position;

    const ROSTER: &str = "\
org,slot,player_id,name,age,rating,level
NYM,SS,p1, Frankie Lind ,30,3.2,
NYM,SP1,p2,Kodai Sen,29,4.1,
NYM,XX,p3,Nobody,25,2.0,
NYM,C,p4,Bad Rating,31,7.5,
NYM,RP2,p5,Call Up,23,1.8,AAA
ATL,CF,a1,Mick Harlan,27,3.6,
";

    const PROSPECTS: &str = "\
org,player_id,name,positions,age,level,ceiling,pitches,stamina
NYM,k1,Jett Wilder,SS/OF,21,AA,3.6,,
NYM,k2,Brady Sprout,SP,23,AAA,3.4,4,60
NYM,k3,No Position,??,20,A,2.0,,
NYM,k4,Mystery Level,C,19,Indy,2.5,,
";

    const CONTRACTS: &str = "\
player_id,years_remaining,current_salary,salary_schedule
p1,2,8000000,8000000|8500000
p2,5,25000000,25000000|25000000|25000000|25000000|25000000
p4,1,abc,
p5,1,740000,
p6,3,2000000,2000000|x|3000000
";

    fn source() -> CsvDataSource {
        CsvDataSource::from_readers(
            ROSTER.as_bytes(),
            PROSPECTS.as_bytes(),
            CONTRACTS.as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn roster_rows_grouped_by_org() {
        let src = source();
        assert_eq!(src.org_ids(), vec!["ATL".to_string(), "NYM".to_string()]);

        let nym = &src.rosters["NYM"];
        assert_eq!(nym.occupants.len(), 3);
        let ss = nym.occupant(SlotId::lineup(Position::ShortStop)).unwrap();
        assert_eq!(ss.name, "Frankie Lind");
        assert!(ss.level.is_none());
        let rp = nym.occupant(SlotId::bullpen(2)).unwrap();
        assert_eq!(rp.level, Some(Level::TripleA));
    }

    #[test]
    fn prospects_expand_group_codes_and_skip_bad_rows() {
        let src = source();
        let pool = &src.prospects["NYM"];
        assert_eq!(pool.len(), 3);

        let jett = pool.iter().find(|p| p.id.as_str() == "k1").unwrap();
        assert_eq!(
            jett.positions,
            vec![
                Position::ShortStop,
                Position::LeftField,
                Position::CenterField,
                Position::RightField
            ]
        );
        assert!(jett.repertoire.is_none());

        let sprout = pool.iter().find(|p| p.id.as_str() == "k2").unwrap();
        assert!(sprout.is_starter());
        assert_eq!(sprout.eta(), 1);

        let mystery = pool.iter().find(|p| p.id.as_str() == "k4").unwrap();
        assert_eq!(mystery.level, Level::Rookie);
    }

    #[test]
    fn contracts_parse_schedules_and_skip_bad_rows() {
        let src = source();
        assert_eq!(src.contracts.len(), 3);
        let p1 = src.contracts.get(&PlayerId::new("p1")).unwrap();
        assert_eq!(p1.salary_schedule, vec![8_000_000, 8_500_000]);
        let p5 = src.contracts.get(&PlayerId::new("p5")).unwrap();
        assert!(p5.salary_schedule.is_empty());
        assert!(src.contracts.get(&PlayerId::new("p6")).is_none());
    }

    #[test]
    fn empty_roster_is_a_validation_error() {
        let err = CsvDataSource::from_readers(
            "org,slot,player_id,name,age,rating\n".as_bytes(),
            PROSPECTS.as_bytes(),
            CONTRACTS.as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let paths = DataPaths {
            roster: "/nonexistent/roster.csv".into(),
            prospects: "/nonexistent/prospects.csv".into(),
            contracts: "/nonexistent/contracts.csv".into(),
        };
        let err = CsvDataSource::load(&paths).unwrap_err();
        match err {
            DataError::Io { path, .. } => assert!(path.ends_with("roster.csv")),
            other => panic!("expected Io error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn collaborator_lookups() {
        let src = source();
        assert!(src.fetch_roster("NYM").await.unwrap().is_some());
        assert!(src.fetch_roster("BOS").await.unwrap().is_none());
        assert!(src.fetch_prospects("BOS").await.unwrap().is_empty());
        assert_eq!(
            src.contract(&PlayerId::new("p2"))
                .await
                .unwrap()
                .map(|c| c.years_remaining),
            Some(5)
        );
    }
}
