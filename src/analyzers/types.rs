//! Report types produced by the KPI engines.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{Destination, PlayerId, Side};

/// Attempts, successes and their percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RateLine {
    pub attempts: u32,
    pub won: u32,
    pub percent: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ServeLine {
    pub total: u32,
    pub aces: u32,
    pub errors: u32,
    pub pressure: u32,
    pub ace_percent: u32,
    pub error_percent: u32,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReceptionLine {
    pub total: u32,
    pub perfect: u32,
    pub positive: u32,
    pub under_pressure: u32,
    pub errors: u32,
    pub perfect_percent: u32,
    pub positive_percent: u32,
    pub error_percent: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AttackLine {
    pub total: u32,
    pub kills: u32,
    pub errors: u32,
    /// Attacks stuffed by the opposing block.
    pub blocked: u32,
    pub kill_percent: u32,
    pub efficiency: f64,
}

/// Sideout and break figures of one rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RotationLine {
    pub rotation: u8,
    pub sideout: RateLine,
    #[serde(rename = "break")]
    pub breakpoint: RateLine,
}

/// Per-team aggregate of a set of rallies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamKpis {
    pub side: Side,
    pub points: u32,
    pub sideout: RateLine,
    #[serde(rename = "break")]
    pub breakpoint: RateLine,
    pub serve: ServeLine,
    pub reception: ReceptionLine,
    pub attack: AttackLine,
    pub block_points: u32,
    pub unforced_errors: u32,
    pub rotations: Vec<RotationLine>,
    /// Kills keyed by the attacker's court zone.
    pub kills_by_zone: BTreeMap<u8, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub side: Side,
    pub length: u32,
    pub from_rally: u32,
    pub to_rally: u32,
}

/// Rallies played with either side already at the clutch threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClutchTally {
    pub rallies: u32,
    pub casa_won: u32,
    pub fora_won: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerCount {
    pub player_id: PlayerId,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneCount {
    pub destination: Destination,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamInsights {
    pub worst_rotation: Option<RotationLine>,
    pub top_zone: Option<ZoneCount>,
    pub top_attackers: Vec<PlayerCount>,
    pub top_servers: Vec<PlayerCount>,
    /// Sideout percentage points gained over the previous set.
    pub sideout_delta: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    pub longest_streak: Option<Streak>,
    pub clutch: ClutchTally,
    pub casa: TeamInsights,
    pub fora: TeamInsights,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub casa: u32,
    pub fora: u32,
}

/// Complete KPI report of one set.
#[derive(Debug, Clone, Serialize)]
pub struct SetKpiReport {
    pub schema_version: u8,
    pub match_id: i64,
    pub set_no: u8,
    pub generated_at: DateTime<Utc>,
    pub rallies: u32,
    pub score: Score,
    pub casa: TeamKpis,
    pub fora: TeamKpis,
    pub insights: Insights,
}

impl SetKpiReport {
    pub fn team(&self, side: Side) -> &TeamKpis {
        match side {
            Side::Casa => &self.casa,
            Side::Fora => &self.fora,
        }
    }
}

/// How often setters chose a destination the pass quality allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DistributionLine {
    pub total: u32,
    pub within_available: u32,
    pub within_percent: u32,
}

/// Identity of a player across matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PlayerKey {
    /// Shared team roster id.
    Team(i64),
    /// Match-local id, used when no team roster id is known. Only meaningful
    /// inside its match.
    Local { match_id: i64, player_id: PlayerId },
}

/// One player's figures over every selected match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerLine {
    pub key: PlayerKey,
    pub name: String,
    pub side: Option<Side>,
    pub number: Option<u16>,
    pub match_count: u32,
    pub serve: ServeLine,
    pub reception: ReceptionLine,
    pub attack: AttackLine,
    pub block_points: u32,
    pub points: u32,
    pub distribution: DistributionLine,
}

/// A ranked entry pointing at a [`PlayerLine`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub key: PlayerKey,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rankings {
    pub top_scorers: Vec<RankingEntry>,
    pub best_attackers: Vec<RankingEntry>,
    pub best_receivers: Vec<RankingEntry>,
    pub best_servers: Vec<RankingEntry>,
}

/// Cross-match rollup.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub matches: u32,
    pub rallies: u32,
    pub teams: Vec<TeamKpis>,
    pub players: Vec<PlayerLine>,
    pub distribution: DistributionLine,
    /// Distribution keyed by reception code.
    pub distribution_by_reception: BTreeMap<u8, DistributionLine>,
    pub rankings: Rankings,
}
