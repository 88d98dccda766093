//! Statistics across several matches, per team and per player.

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

use crate::analyzers::consolidate::consolidate;
use crate::analyzers::distribution::DistributionTally;
use crate::analyzers::set_kpis::{SCHEMA_VERSION, team_kpis};
use crate::analyzers::tally::{AttackTally, ReceptionTally, ServeTally, attack_side, has_attack};
use crate::analyzers::types::{GlobalStats, PlayerKey, PlayerLine, RankingEntry, Rankings};
use crate::config::KpiConfig;
use crate::model::{Player, PlayerId, RallyRecord, Reason, Side};

/// Restricts which rallies and players enter the rollup. Empty means everything.
#[derive(Debug, Clone, Default)]
pub struct RollupFilter {
    pub match_ids: Option<Vec<i64>>,
    pub side: Option<Side>,
}

impl RollupFilter {
    fn keeps_match(&self, match_id: i64) -> bool {
        self.match_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&match_id))
    }

    fn keeps_side(&self, side: Option<Side>) -> bool {
        match self.side {
            None => true,
            Some(wanted) => side == Some(wanted),
        }
    }
}

struct PlayerTally {
    name: String,
    side: Option<Side>,
    number: Option<u16>,
    matches: BTreeSet<i64>,
    serve: ServeTally,
    reception: ReceptionTally,
    attack: AttackTally,
    block_points: u32,
    distribution: DistributionTally,
}

impl PlayerTally {
    fn new(player: Option<&Player>, side: Option<Side>) -> Self {
        Self {
            name: player.map(|p| p.name.clone()).unwrap_or_default(),
            side: player.map(|p| p.side).or(side),
            number: player.and_then(|p| p.number),
            matches: BTreeSet::new(),
            serve: ServeTally::default(),
            reception: ReceptionTally::default(),
            attack: AttackTally::default(),
            block_points: 0,
            distribution: DistributionTally::default(),
        }
    }

    fn finish(self, key: PlayerKey) -> PlayerLine {
        PlayerLine {
            key,
            name: self.name,
            side: self.side,
            number: self.number,
            match_count: self.matches.len() as u32,
            points: self.attack.kills() + self.serve.aces() + self.block_points,
            serve: self.serve.line(),
            reception: self.reception.line(),
            attack: self.attack.line(),
            block_points: self.block_points,
            distribution: self.distribution.line(),
        }
    }
}

#[derive(Clone, Copy)]
enum Role {
    Server,
    Receiver,
    Setter,
    Attacker,
    Blocker,
}

/// Resolves match-local player ids to roster entries and stable keys.
struct PlayerIndex<'a> {
    by_match: HashMap<(i64, PlayerId), &'a Player>,
}

impl<'a> PlayerIndex<'a> {
    fn new(players: &'a [Player]) -> Self {
        Self {
            by_match: players.iter().map(|p| ((p.match_id, p.id), p)).collect(),
        }
    }

    fn get(&self, match_id: i64, player_id: PlayerId) -> Option<&'a Player> {
        self.by_match.get(&(match_id, player_id)).copied()
    }

    fn key(&self, match_id: i64, player_id: PlayerId) -> PlayerKey {
        self.get(match_id, player_id)
            .and_then(|p| p.team_player_id)
            .map_or(
                PlayerKey::Local {
                    match_id,
                    player_id,
                },
                PlayerKey::Team,
            )
    }

    /// Side of a player in a rally: the roster when it knows them, the row otherwise.
    fn side(&self, rally: &RallyRecord, player_id: PlayerId, role: Role) -> Option<Side> {
        self.get(rally.match_id, player_id)
            .map(|p| p.side)
            .or_else(|| match role {
                Role::Server => rally.serve_side,
                Role::Receiver => rally.recv_side,
                Role::Setter | Role::Attacker => attack_side(rally),
                Role::Blocker => rally.point_won_by,
            })
    }
}

/// Player tallies keyed by stable identity.
struct PlayerTallies<'a> {
    index: PlayerIndex<'a>,
    filter: &'a RollupFilter,
    lines: BTreeMap<PlayerKey, PlayerTally>,
}

impl PlayerTallies<'_> {
    /// The tally of `player_id` in `rally`, unless the side filter excludes them.
    fn touch(
        &mut self,
        rally: &RallyRecord,
        player_id: Option<PlayerId>,
        role: Role,
    ) -> Option<&mut PlayerTally> {
        let player_id = player_id?;
        let side = self.index.side(rally, player_id, role);
        if !self.filter.keeps_side(side) {
            return None;
        }
        let player = self.index.get(rally.match_id, player_id);
        let tally = self
            .lines
            .entry(self.index.key(rally.match_id, player_id))
            .or_insert_with(|| PlayerTally::new(player, side));
        tally.matches.insert(rally.match_id);
        Some(tally)
    }
}

/// Computes team lines, player lines, setter distribution and rankings over
/// every rally that passes `filter`.
///
/// Players are keyed by their cross-match `team_player_id` when the roster
/// has one, so one person appearing in several matches yields one line.
pub fn compute_rollup(
    rows: &[RallyRecord],
    players: &[Player],
    filter: &RollupFilter,
    config: &KpiConfig,
) -> GlobalStats {
    let selected: Vec<RallyRecord> = rows
        .iter()
        .filter(|row| filter.keeps_match(row.match_id))
        .cloned()
        .collect();
    let rallies = consolidate(&selected);

    let teams = Side::BOTH
        .into_iter()
        .filter(|side| filter.keeps_side(Some(*side)))
        .map(|side| team_kpis(&rallies, side))
        .collect::<Vec<_>>();

    let mut tallies = PlayerTallies {
        index: PlayerIndex::new(players),
        filter,
        lines: BTreeMap::new(),
    };
    let mut distribution = DistributionTally::default();
    let mut distribution_by_reception: BTreeMap<u8, DistributionTally> = BTreeMap::new();

    for rally in &rallies {
        if let Some(server) = tallies.touch(rally, rally.s_player_id, Role::Server) {
            server.serve.observe(rally);
        }
        if let Some(receiver) = tallies.touch(rally, rally.r_player_id, Role::Receiver) {
            receiver.reception.observe(rally);
        }
        if has_attack(rally)
            && let Some(attacker) = tallies.touch(rally, rally.a_player_id, Role::Attacker)
        {
            attacker.attack.observe(rally);
        }
        if rally.reason == Some(Reason::Blk) {
            for blocker in rally.blockers() {
                if let Some(blocker) = tallies.touch(rally, blocker, Role::Blocker) {
                    blocker.block_points += 1;
                }
            }
        }

        let setter_side = match rally.setter_player_id {
            Some(setter) => tallies.index.side(rally, setter, Role::Setter),
            None => attack_side(rally),
        };
        if let Some(setter) = tallies.touch(rally, rally.setter_player_id, Role::Setter) {
            setter.distribution.observe(rally);
        }
        if filter.keeps_side(setter_side)
            && distribution.observe(rally)
            && let Some(quality) = rally.r_code
        {
            distribution_by_reception
                .entry(quality.value())
                .or_default()
                .observe(rally);
        }
    }

    let players: Vec<PlayerLine> = tallies
        .lines
        .into_iter()
        .map(|(key, tally)| tally.finish(key))
        .collect();
    let rankings = rank(&players, config);
    let matches: BTreeSet<i64> = rallies.iter().map(|r| r.match_id).collect();

    debug!(players = players.len(), "Player lines built");
    info!(
        matches = matches.len(),
        rallies = rallies.len(),
        "Rollup computed"
    );

    GlobalStats {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        matches: matches.len() as u32,
        rallies: rallies.len() as u32,
        teams,
        players,
        distribution: distribution.line(),
        distribution_by_reception: distribution_by_reception
            .into_iter()
            .map(|(quality, tally)| (quality, tally.line()))
            .collect(),
        rankings,
    }
}

/// Top `config.top_n` players by points, attack efficiency, positive
/// reception and aces. Equal values keep player-key order.
fn rank(players: &[PlayerLine], config: &KpiConfig) -> Rankings {
    let top_n = config.top_n;
    Rankings {
        top_scorers: ranked(players, top_n, |p| {
            (p.points > 0).then_some(p.points as f64)
        }),
        best_attackers: ranked(players, top_n, |p| {
            (p.attack.total >= config.min_ranked_attacks).then_some(p.attack.efficiency)
        }),
        best_receivers: ranked(players, top_n, |p| {
            (p.reception.total >= config.min_ranked_receptions)
                .then_some(p.reception.positive_percent as f64)
        }),
        best_servers: ranked(players, top_n, |p| {
            (p.serve.aces > 0).then_some(p.serve.aces as f64)
        }),
    }
}

fn ranked(
    players: &[PlayerLine],
    top_n: usize,
    value: impl Fn(&PlayerLine) -> Option<f64>,
) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = players
        .iter()
        .filter_map(|p| {
            value(p).map(|v| RankingEntry {
                key: p.key,
                name: p.name.clone(),
                value: v,
            })
        })
        .collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries.truncate(top_n);
    entries
}
