// Positions, depth-chart sections, and the slots that make up grid rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Baseball positions a grid row can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    ShortStop,
    LeftField,
    CenterField,
    RightField,
    DesignatedHitter,
    StartingPitcher,
    ReliefPitcher,
}

impl Position {
    /// Parse a single position abbreviation ("C", "1B", "SP", ...).
    ///
    /// Group codes such as "OF" or "MI" are not single positions; use
    /// [`expand_position_code`] for those.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" => Some(Position::Catcher),
            "1B" => Some(Position::FirstBase),
            "2B" => Some(Position::SecondBase),
            "3B" => Some(Position::ThirdBase),
            "SS" => Some(Position::ShortStop),
            "LF" => Some(Position::LeftField),
            "CF" => Some(Position::CenterField),
            "RF" => Some(Position::RightField),
            "DH" => Some(Position::DesignatedHitter),
            "SP" => Some(Position::StartingPitcher),
            "RP" => Some(Position::ReliefPitcher),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::ShortStop => "SS",
            Position::LeftField => "LF",
            Position::CenterField => "CF",
            Position::RightField => "RF",
            Position::DesignatedHitter => "DH",
            Position::StartingPitcher => "SP",
            Position::ReliefPitcher => "RP",
        }
    }

    /// Whether this position is a hitting position (not a pitcher).
    pub fn is_hitter(&self) -> bool {
        !self.is_pitcher()
    }

    pub fn is_pitcher(&self) -> bool {
        matches!(self, Position::StartingPitcher | Position::ReliefPitcher)
    }

    /// Deterministic ordering index for display.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Catcher => 0,
            Position::FirstBase => 1,
            Position::SecondBase => 2,
            Position::ThirdBase => 3,
            Position::ShortStop => 4,
            Position::LeftField => 5,
            Position::CenterField => 6,
            Position::RightField => 7,
            Position::DesignatedHitter => 8,
            Position::StartingPitcher => 9,
            Position::ReliefPitcher => 10,
        }
    }

    /// All concrete lineup positions, in display order.
    pub fn lineup_positions() -> [Position; 9] {
        [
            Position::Catcher,
            Position::FirstBase,
            Position::SecondBase,
            Position::ThirdBase,
            Position::ShortStop,
            Position::LeftField,
            Position::CenterField,
            Position::RightField,
            Position::DesignatedHitter,
        ]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Expand a position or position-group code into all concrete positions it
/// represents. Unknown codes expand to nothing.
pub fn expand_position_code(code: &str) -> Vec<Position> {
    match code.trim().to_uppercase().as_str() {
        "OF" => vec![Position::LeftField, Position::CenterField, Position::RightField],
        "MI" => vec![Position::SecondBase, Position::ShortStop],
        "CI" => vec![Position::FirstBase, Position::ThirdBase],
        "IF" => vec![
            Position::FirstBase,
            Position::SecondBase,
            Position::ThirdBase,
            Position::ShortStop,
        ],
        "P" => vec![Position::StartingPitcher, Position::ReliefPitcher],
        "UT" | "UTIL" => Position::lineup_positions().to_vec(),
        other => Position::from_str_pos(other).into_iter().collect(),
    }
}

/// Parse a list of codes separated by `/`, `,` or whitespace (e.g. "SS/2B",
/// "OF", "C, 1B") into a deduplicated, ordered position list.
pub fn parse_position_list(s: &str) -> Vec<Position> {
    let mut positions: Vec<Position> = s
        .split(|c: char| c == '/' || c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .flat_map(expand_position_code)
        .collect();
    positions.sort_by_key(|p| p.sort_order());
    positions.dedup();
    positions
}

// ---------------------------------------------------------------------------
// Sections and slots
// ---------------------------------------------------------------------------

/// The three depth-chart sections a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Lineup,
    Rotation,
    Bullpen,
}

impl Section {
    pub fn label(&self) -> &'static str {
        match self {
            Section::Lineup => "lineup",
            Section::Rotation => "rotation",
            Section::Bullpen => "bullpen",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the grid: a lineup position, or a numbered rotation/bullpen
/// slot. Lineup slots carry number 0; pitching slots are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId {
    pub position: Position,
    pub number: u8,
}

impl SlotId {
    pub fn lineup(position: Position) -> Self {
        SlotId {
            position,
            number: 0,
        }
    }

    pub fn rotation(number: u8) -> Self {
        SlotId {
            position: Position::StartingPitcher,
            number,
        }
    }

    pub fn bullpen(number: u8) -> Self {
        SlotId {
            position: Position::ReliefPitcher,
            number,
        }
    }

    pub fn section(&self) -> Section {
        match self.position {
            Position::StartingPitcher => Section::Rotation,
            Position::ReliefPitcher => Section::Bullpen,
            _ => Section::Lineup,
        }
    }

    /// Stable label used for display and in override storage keys
    /// ("SS", "SP3", "RP7").
    pub fn label(&self) -> String {
        if self.position.is_pitcher() {
            format!("{}{}", self.position.display_str(), self.number)
        } else {
            self.position.display_str().to_string()
        }
    }

    /// Parse a slot label produced by [`SlotId::label`].
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        for (prefix, make) in [
            ("SP", SlotId::rotation as fn(u8) -> SlotId),
            ("RP", SlotId::bullpen as fn(u8) -> SlotId),
        ] {
            if let Some(digits) = upper.strip_prefix(prefix) {
                let number: u8 = digits.parse().ok()?;
                return (number > 0).then(|| make(number));
            }
        }
        Position::from_str_pos(&upper)
            .filter(|p| p.is_hitter())
            .map(SlotId::lineup)
    }

    /// Whether a player listed at `positions` may fill this slot as a hitter.
    /// Any hitter is eligible at DH.
    pub fn accepts_hitter(&self, positions: &[Position]) -> bool {
        if self.position == Position::DesignatedHitter {
            return positions.iter().any(|p| p.is_hitter());
        }
        positions.contains(&self.position)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_pos_standard_positions() {
        assert_eq!(Position::from_str_pos("C"), Some(Position::Catcher));
        assert_eq!(Position::from_str_pos("ss"), Some(Position::ShortStop));
        assert_eq!(Position::from_str_pos("1B"), Some(Position::FirstBase));
        assert_eq!(Position::from_str_pos("DH"), Some(Position::DesignatedHitter));
        assert_eq!(Position::from_str_pos("RP"), Some(Position::ReliefPitcher));
        assert_eq!(Position::from_str_pos("OF"), None);
        assert_eq!(Position::from_str_pos("XX"), None);
    }

    #[test]
    fn group_codes_expand() {
        assert_eq!(
            expand_position_code("OF"),
            vec![Position::LeftField, Position::CenterField, Position::RightField]
        );
        assert_eq!(
            expand_position_code("mi"),
            vec![Position::SecondBase, Position::ShortStop]
        );
        assert_eq!(
            expand_position_code("CI"),
            vec![Position::FirstBase, Position::ThirdBase]
        );
        assert_eq!(expand_position_code("IF").len(), 4);
        assert_eq!(
            expand_position_code("P"),
            vec![Position::StartingPitcher, Position::ReliefPitcher]
        );
        assert_eq!(expand_position_code("UT").len(), 9);
        assert_eq!(expand_position_code("3B"), vec![Position::ThirdBase]);
        assert!(expand_position_code("??").is_empty());
    }

    #[test]
    fn parse_position_list_dedups_and_orders() {
        assert_eq!(
            parse_position_list("SS/MI"),
            vec![Position::SecondBase, Position::ShortStop]
        );
        assert_eq!(
            parse_position_list("RF, C"),
            vec![Position::Catcher, Position::RightField]
        );
        assert!(parse_position_list("").is_empty());
    }

    #[test]
    fn slot_labels_round_trip() {
        let slots = [
            SlotId::lineup(Position::Catcher),
            SlotId::lineup(Position::DesignatedHitter),
            SlotId::rotation(1),
            SlotId::rotation(5),
            SlotId::bullpen(7),
        ];
        for slot in slots {
            assert_eq!(SlotId::parse(&slot.label()), Some(slot), "slot {slot}");
        }
        assert_eq!(SlotId::rotation(3).label(), "SP3");
        assert_eq!(SlotId::lineup(Position::SecondBase).label(), "2B");
    }

    #[test]
    fn slot_parse_rejects_malformed_labels() {
        assert_eq!(SlotId::parse("SP"), None);
        assert_eq!(SlotId::parse("SP0"), None);
        assert_eq!(SlotId::parse("RPx"), None);
        assert_eq!(SlotId::parse("OF"), None);
        assert_eq!(SlotId::parse(""), None);
    }

    #[test]
    fn slot_sections() {
        assert_eq!(SlotId::lineup(Position::ShortStop).section(), Section::Lineup);
        assert_eq!(SlotId::rotation(2).section(), Section::Rotation);
        assert_eq!(SlotId::bullpen(2).section(), Section::Bullpen);
    }

    #[test]
    fn dh_accepts_any_hitter() {
        let dh = SlotId::lineup(Position::DesignatedHitter);
        assert!(dh.accepts_hitter(&[Position::Catcher]));
        assert!(!dh.accepts_hitter(&[Position::StartingPitcher]));

        let ss = SlotId::lineup(Position::ShortStop);
        assert!(ss.accepts_hitter(&[Position::SecondBase, Position::ShortStop]));
        assert!(!ss.accepts_hitter(&[Position::SecondBase]));
    }
}
