use chrono::Utc;
use std::collections::BTreeMap;
use tracing::debug;

use crate::analyzers::consolidate::consolidate;
use crate::analyzers::insights::{
    clutch_tally, longest_streak, sideout_delta, top_lists, worst_rotation,
};
use crate::analyzers::tally::TeamTally;
use crate::analyzers::types::{Insights, Score, SetKpiReport, TeamInsights, TeamKpis};
use crate::config::KpiConfig;
use crate::model::{RallyRecord, Reason, Roster, Side};

/// Version of the report layout written by [`compute_set_kpis`].
pub const SCHEMA_VERSION: u8 = 1;

/// Aggregates canonical rallies into the figures of one team.
pub fn team_kpis(rallies: &[RallyRecord], side: Side) -> TeamKpis {
    let mut tally = TeamTally::new(side);
    for rally in rallies {
        tally.observe(rally);
    }
    tally.finish()
}

/// Builds the KPI report of one set.
///
/// `rows` may hold several phases per rally; they are consolidated first.
/// Frequency lists read the raw rows so that touches of intermediate phases
/// still count. When `previous` is given, each team gets its sideout change
/// against that set.
pub fn compute_set_kpis(
    rows: &[RallyRecord],
    previous: Option<&[RallyRecord]>,
    roster: &dyn Roster,
    config: &KpiConfig,
) -> SetKpiReport {
    let rallies = consolidate(rows);
    let (match_id, set_no) = rows
        .first()
        .map_or((0, 0), |row| (row.match_id, row.set_no));

    let mut casa = team_kpis(&rallies, Side::Casa);
    let mut fora = team_kpis(&rallies, Side::Fora);
    casa.kills_by_zone = kills_by_zone(&rallies, Side::Casa, roster);
    fora.kills_by_zone = kills_by_zone(&rallies, Side::Fora, roster);

    let previous = previous.map(consolidate);
    let team_insights = |team: &TeamKpis| {
        let lists = top_lists(rows, team.side, roster, config.top_n);
        TeamInsights {
            worst_rotation: worst_rotation(team, config.min_rotation_attempts),
            top_zone: lists.top_zone,
            top_attackers: lists.top_attackers,
            top_servers: lists.top_servers,
            sideout_delta: previous
                .as_deref()
                .and_then(|prev| sideout_delta(team, &team_kpis(prev, team.side))),
        }
    };

    let insights = Insights {
        longest_streak: longest_streak(&rallies),
        clutch: clutch_tally(&rallies, config.clutch_threshold),
        casa: team_insights(&casa),
        fora: team_insights(&fora),
    };

    debug!(
        match_id,
        set_no,
        rallies = rallies.len(),
        casa = casa.points,
        fora = fora.points,
        "Set KPIs computed"
    );

    SetKpiReport {
        schema_version: SCHEMA_VERSION,
        match_id,
        set_no,
        generated_at: Utc::now(),
        rallies: rallies.len() as u32,
        score: Score {
            casa: casa.points,
            fora: fora.points,
        },
        casa,
        fora,
        insights,
    }
}

/// Kills of `side` keyed by the attacker's court zone in that rally's rotation.
fn kills_by_zone(rallies: &[RallyRecord], side: Side, roster: &dyn Roster) -> BTreeMap<u8, u32> {
    let mut zones = BTreeMap::new();
    for rally in rallies {
        if rally.reason != Some(Reason::Kill) || rally.point_won_by != Some(side) {
            continue;
        }
        let (Some(attacker), Some(rotation)) = (rally.a_player_id, rally.rotation_of(side)) else {
            continue;
        };
        if let Some(zone) =
            roster.player_zone(rally.set_no, side, attacker, rotation, rally.rally_no)
        {
            *zones.entry(zone).or_insert(0) += 1;
        }
    }
    zones
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Code, Destination, Lineup, Player, StaticRoster};

    fn player(id: i64, side: Side) -> Player {
        Player {
            id,
            match_id: 1,
            side,
            number: Some(id as u16),
            name: format!("P{id}"),
            team_player_id: None,
            libero: false,
        }
    }

    fn roster() -> StaticRoster {
        let players = (1..=6)
            .map(|id| player(id, Side::Casa))
            .chain((11..=16).map(|id| player(id, Side::Fora)))
            .collect();
        StaticRoster::new(
            players,
            vec![
                Lineup {
                    set_no: 1,
                    side: Side::Casa,
                    zones: [1, 2, 3, 4, 5, 6],
                },
                Lineup {
                    set_no: 1,
                    side: Side::Fora,
                    zones: [11, 12, 13, 14, 15, 16],
                },
            ],
        )
    }

    fn casa_receives(rally_no: u32, winner: Side) -> RallyRecord {
        RallyRecord {
            serve_side: Some(Side::Fora),
            serve_rot: Some(1),
            recv_side: Some(Side::Casa),
            recv_rot: Some(1),
            point_won_by: Some(winner),
            ..RallyRecord::new(7, 1, rally_no)
        }
    }

    #[test]
    fn test_sideout_and_score() {
        let rows: Vec<_> = (1..=10)
            .map(|n| casa_receives(n, if n <= 6 { Side::Casa } else { Side::Fora }))
            .collect();
        let report = compute_set_kpis(&rows, None, &roster(), &KpiConfig::default());

        assert_eq!(report.match_id, 7);
        assert_eq!(report.set_no, 1);
        assert_eq!(report.rallies, 10);
        assert_eq!(report.score, Score { casa: 6, fora: 4 });
        assert_eq!(report.casa.sideout.percent, 60);
        assert_eq!(report.fora.breakpoint.percent, 40);
        assert_eq!(report.team(Side::Fora).breakpoint.attempts, 10);
        assert!(report.insights.casa.sideout_delta.is_none());
    }

    #[test]
    fn test_worst_rotation_in_report() {
        let mut rows = Vec::new();
        for (n, rot, winner) in [
            (1, 1, Side::Casa),
            (2, 1, Side::Fora),
            (3, 2, Side::Casa),
            (4, 2, Side::Casa),
            (5, 2, Side::Casa),
            (6, 2, Side::Fora),
        ] {
            rows.push(RallyRecord {
                recv_rot: Some(rot),
                ..casa_receives(n, winner)
            });
        }
        let report = compute_set_kpis(&rows, None, &roster(), &KpiConfig::default());
        let worst = report.insights.casa.worst_rotation.unwrap();
        assert_eq!(worst.rotation, 1);
        assert_eq!(worst.sideout.percent, 50);
    }

    #[test]
    fn test_delta_against_previous_set() {
        let previous: Vec<_> = (1..=4)
            .map(|n| casa_receives(n, if n <= 1 { Side::Casa } else { Side::Fora }))
            .collect();
        let current: Vec<_> = (1..=4)
            .map(|n| casa_receives(n, if n <= 3 { Side::Casa } else { Side::Fora }))
            .collect();

        let report = compute_set_kpis(&current, Some(&previous), &roster(), &KpiConfig::default());
        assert_eq!(report.insights.casa.sideout_delta, Some(50));
        // FORA never received in the previous set.
        assert_eq!(report.insights.fora.sideout_delta, None);
    }

    #[test]
    fn test_multi_phase_rows_are_consolidated() {
        let phase1 = RallyRecord {
            a_player_id: Some(4),
            a_code: Code::new(2),
            point_won_by: None,
            ..casa_receives(1, Side::Casa)
        };
        let phase2 = RallyRecord {
            phase: 2,
            a_player_id: Some(4),
            a_code: Code::new(3),
            reason: Some(Reason::Kill),
            setter_player_id: Some(1),
            pass_destination: Some(Destination::Outside),
            ..casa_receives(1, Side::Casa)
        };
        let report = compute_set_kpis(&[phase1, phase2], None, &roster(), &KpiConfig::default());

        assert_eq!(report.rallies, 1);
        assert_eq!(report.casa.attack.kills, 1);
        // Raw rows feed the frequency lists, so both phases count.
        assert_eq!(report.insights.casa.top_attackers[0].count, 2);
        assert_eq!(
            report.insights.casa.top_zone.map(|z| z.destination),
            Some(Destination::Outside)
        );
    }

    #[test]
    fn test_kills_by_zone_follow_rotation() {
        // Player 4 starts in zone 4; in rotation 2 they have moved to zone 3.
        let rows = vec![
            RallyRecord {
                a_player_id: Some(4),
                reason: Some(Reason::Kill),
                ..casa_receives(1, Side::Casa)
            },
            RallyRecord {
                recv_rot: Some(2),
                a_player_id: Some(4),
                reason: Some(Reason::Kill),
                ..casa_receives(2, Side::Casa)
            },
        ];
        let report = compute_set_kpis(&rows, None, &roster(), &KpiConfig::default());
        assert_eq!(report.casa.kills_by_zone, BTreeMap::from([(3, 1), (4, 1)]));
        assert!(report.fora.kills_by_zone.is_empty());
    }

    #[test]
    fn test_empty_set() {
        let report = compute_set_kpis(&[], None, &roster(), &KpiConfig::default());
        assert_eq!(report.rallies, 0);
        assert_eq!(report.casa.sideout.percent, 0);
        assert!(report.insights.longest_streak.is_none());
        assert_eq!(report.casa.rotations.len(), 6);
    }
}
