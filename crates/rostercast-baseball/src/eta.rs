// Minor-league levels and the estimated years until a prospect is MLB-ready.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Organizational level a player currently plays at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Majors,
    TripleA,
    DoubleA,
    SingleA,
    Rookie,
    International,
}

impl Level {
    /// Parse a level label, case-insensitively. Returns `None` for labels we
    /// don't recognize.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "MLB" | "MAJORS" => Some(Level::Majors),
            "AAA" => Some(Level::TripleA),
            "AA" => Some(Level::DoubleA),
            "A+" | "A" | "A-" | "HIA" | "LOA" => Some(Level::SingleA),
            "R" | "ROK" | "ROOKIE" => Some(Level::Rookie),
            "INT" | "IC" | "DSL" => Some(Level::International),
            _ => None,
        }
    }

    /// Parse a level label, falling back to rookie ball for unknown labels.
    pub fn parse_or_rookie(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            warn!("unknown level '{}', treating as rookie", s);
            Level::Rookie
        })
    }

    /// Seasons a prospect at this level typically needs before the majors.
    pub fn base_wait(&self) -> f64 {
        match self {
            Level::Majors => 0.0,
            Level::TripleA => 1.0,
            Level::DoubleA => 2.0,
            Level::SingleA => 3.0,
            Level::Rookie => 4.0,
            Level::International => 5.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Majors => "MLB",
            Level::TripleA => "AAA",
            Level::DoubleA => "AA",
            Level::SingleA => "A",
            Level::Rookie => "R",
            Level::International => "INT",
        }
    }

    pub fn is_minors(&self) -> bool {
        !matches!(self, Level::Majors)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Estimate years until MLB readiness from level and ceiling rating.
///
/// High ceilings shorten the wait: a full year at 4.0 and above, half a year
/// at 3.5 and above. The result is rounded up and never negative.
pub fn estimate_eta(level: Level, ceiling: f64) -> u32 {
    let reduction = if ceiling >= 4.0 {
        1.0
    } else if ceiling >= 3.5 {
        0.5
    } else {
        0.0
    };
    let wait = (level.base_wait() - reduction).ceil();
    if wait <= 0.0 {
        0
    } else {
        wait as u32
    }
}
