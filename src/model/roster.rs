//! Roster contract consumed by the recorder and the KPI engines.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::action::{PlayerId, Side};

/// A player as listed for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Match-local id, referenced by rally rows.
    pub id: PlayerId,
    #[serde(default)]
    pub match_id: i64,
    pub side: Side,
    #[serde(default)]
    pub number: Option<u16>,
    #[serde(default)]
    pub name: String,
    /// Identity of the player across matches.
    #[serde(default)]
    pub team_player_id: Option<i64>,
    #[serde(default)]
    pub libero: bool,
}

/// Read-only view of players and lineups.
pub trait Roster {
    /// Players on court for `side` at the given rally.
    fn players_on_court(&self, set_no: u8, side: Side, rally_no: u32) -> Vec<Player>;

    /// Full roster for `side`, including players not on court.
    fn players_for_side(&self, side: Side) -> Vec<Player>;

    /// Court zone (1..=6) of a player in the given rotation.
    fn player_zone(
        &self,
        set_no: u8,
        side: Side,
        player_id: PlayerId,
        rotation: u8,
        rally_no: u32,
    ) -> Option<u8>;

    /// Side a player belongs to, independent of any action data.
    fn side_of(&self, player_id: PlayerId) -> Option<Side> {
        Side::BOTH.into_iter().find(|side| {
            self.players_for_side(*side)
                .iter()
                .any(|p| p.id == player_id)
        })
    }

    fn number_of(&self, side: Side, player_id: PlayerId) -> Option<u16> {
        self.players_for_side(side)
            .into_iter()
            .find(|p| p.id == player_id)
            .and_then(|p| p.number)
    }
}

/// Starting lineup of one side for one set: `zones[i]` starts in zone `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineup {
    pub set_no: u8,
    pub side: Side,
    pub zones: [PlayerId; 6],
}

/// A roster held in memory, typically loaded from a JSON file:
///
/// ```json
/// {
///   "players": [{ "id": 1, "side": "CASA", "number": 7, "name": "Ana" }],
///   "lineups": [{ "set_no": 1, "side": "CASA", "zones": [1, 2, 3, 4, 5, 6] }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticRoster {
    pub players: Vec<Player>,
    #[serde(default)]
    pub lineups: Vec<Lineup>,
}

impl StaticRoster {
    pub fn new(players: Vec<Player>, lineups: Vec<Lineup>) -> Self {
        Self { players, lineups }
    }

    /// Loads the roster from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read roster file '{path}'"))?;
        let roster: StaticRoster = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse roster file '{path}'"))?;
        Ok(roster)
    }

    fn lineup(&self, set_no: u8, side: Side) -> Option<&Lineup> {
        self.lineups
            .iter()
            .find(|l| l.set_no == set_no && l.side == side)
    }

    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
}

impl Roster for StaticRoster {
    // Substitutions are tracked elsewhere; the starting lineup stands for the whole set.
    fn players_on_court(&self, set_no: u8, side: Side, _rally_no: u32) -> Vec<Player> {
        self.lineup(set_no, side)
            .map(|lineup| {
                lineup
                    .zones
                    .iter()
                    .filter_map(|id| self.player(*id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn players_for_side(&self, side: Side) -> Vec<Player> {
        self.players
            .iter()
            .filter(|p| p.side == side)
            .cloned()
            .collect()
    }

    fn player_zone(
        &self,
        set_no: u8,
        side: Side,
        player_id: PlayerId,
        rotation: u8,
        _rally_no: u32,
    ) -> Option<u8> {
        if !(1..=6).contains(&rotation) {
            return None;
        }
        let lineup = self.lineup(set_no, side)?;
        let start = lineup.zones.iter().position(|id| *id == player_id)?;
        // Each rotation moves every player one zone back (2 -> 1, 1 -> 6).
        let shift = (rotation - 1) as usize;
        Some(((start + 6 - shift) % 6 + 1) as u8)
    }
}
