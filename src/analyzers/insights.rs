//! Cross-cutting observations over an ordered set of rallies.

use super::tally::attack_side;
use super::types::{ClutchTally, PlayerCount, RotationLine, Streak, TeamKpis, ZoneCount};
use super::utility::FrequencyCounter;
use crate::model::{Destination, PlayerId, RallyRecord, Roster, Side};

/// Longest run of consecutive points won by the same side.
///
/// Undecided rallies are skipped without breaking the run. On equal length
/// the earlier run is kept.
pub fn longest_streak(rallies: &[RallyRecord]) -> Option<Streak> {
    let mut best: Option<Streak> = None;
    let mut current: Option<Streak> = None;

    for rally in rallies {
        let Some(winner) = rally.point_won_by else {
            continue;
        };
        current = match current {
            Some(mut run) if run.side == winner => {
                run.length += 1;
                run.to_rally = rally.rally_no;
                Some(run)
            }
            _ => Some(Streak {
                side: winner,
                length: 1,
                from_rally: rally.rally_no,
                to_rally: rally.rally_no,
            }),
        };
        if let Some(run) = current
            && best.is_none_or(|b| run.length > b.length)
        {
            best = Some(run);
        }
    }

    best
}

/// Rallies played while either side already had `threshold` points.
pub fn clutch_tally(rallies: &[RallyRecord], threshold: u32) -> ClutchTally {
    let mut tally = ClutchTally::default();
    let (mut casa, mut fora) = (0u32, 0u32);

    for rally in rallies {
        let Some(winner) = rally.point_won_by else {
            continue;
        };
        if casa >= threshold || fora >= threshold {
            tally.rallies += 1;
            match winner {
                Side::Casa => tally.casa_won += 1,
                Side::Fora => tally.fora_won += 1,
            }
        }
        match winner {
            Side::Casa => casa += 1,
            Side::Fora => fora += 1,
        }
    }

    tally
}

/// Rotation with the lowest sideout percentage among those with enough attempts.
pub fn worst_rotation(team: &TeamKpis, min_attempts: u32) -> Option<RotationLine> {
    let mut worst: Option<RotationLine> = None;
    let mut lines: Vec<&RotationLine> = team.rotations.iter().collect();
    lines.sort_by_key(|line| line.rotation);

    for line in lines {
        if line.sideout.attempts < min_attempts {
            continue;
        }
        if worst.is_none_or(|w| line.sideout.percent < w.sideout.percent) {
            worst = Some(*line);
        }
    }
    worst
}

/// Sideout percentage points gained since the previous set.
pub fn sideout_delta(current: &TeamKpis, previous: &TeamKpis) -> Option<i32> {
    if previous.sideout.attempts == 0 {
        return None;
    }
    Some(current.sideout.percent as i32 - previous.sideout.percent as i32)
}

/// Frequency lists of one team, taken from raw rows.
#[derive(Debug, Clone, Default)]
pub struct TopLists {
    pub top_zone: Option<ZoneCount>,
    pub top_attackers: Vec<PlayerCount>,
    pub top_servers: Vec<PlayerCount>,
}

/// Most used set destination and most frequent attackers and servers of `side`.
///
/// Each row is attributed through the roster first; when the roster does not
/// know the player the side is read off the row itself.
pub fn top_lists(raw: &[RallyRecord], side: Side, roster: &dyn Roster, top_n: usize) -> TopLists {
    let mut zones: FrequencyCounter<Destination> = FrequencyCounter::new();
    let mut attackers: FrequencyCounter<PlayerId> = FrequencyCounter::new();
    let mut servers: FrequencyCounter<PlayerId> = FrequencyCounter::new();

    for row in raw {
        if let Some(destination) = row.pass_destination {
            let setter_side = row
                .setter_player_id
                .and_then(|id| roster.side_of(id))
                .or_else(|| attack_side(row));
            if setter_side == Some(side) {
                zones.add(destination);
            }
        }

        if let Some(attacker) = row.a_player_id {
            let attacker_side = roster.side_of(attacker).or_else(|| attack_side(row));
            if attacker_side == Some(side) {
                attackers.add(attacker);
            }
        }

        if let Some(server) = row.s_player_id {
            let server_side = roster.side_of(server).or(row.serve_side);
            if server_side == Some(side) {
                servers.add(server);
            }
        }
    }

    let to_counts = |counter: &FrequencyCounter<PlayerId>| -> Vec<PlayerCount> {
        counter
            .top(top_n)
            .into_iter()
            .map(|(player_id, count)| PlayerCount { player_id, count })
            .collect()
    };

    TopLists {
        top_zone: zones
            .top(1)
            .into_iter()
            .next()
            .map(|(destination, count)| ZoneCount { destination, count }),
        top_attackers: to_counts(&attackers),
        top_servers: to_counts(&servers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::RateLine;
    use crate::model::StaticRoster;

    fn won(rally_no: u32, side: Option<Side>) -> RallyRecord {
        RallyRecord {
            point_won_by: side,
            ..RallyRecord::new(1, 1, rally_no)
        }
    }

    #[test]
    fn test_streak_ties_keep_first() {
        let rallies = vec![
            won(1, Some(Side::Casa)),
            won(2, Some(Side::Casa)),
            won(3, Some(Side::Fora)),
            won(4, Some(Side::Fora)),
        ];
        let streak = longest_streak(&rallies).unwrap();
        assert_eq!(streak.side, Side::Casa);
        assert_eq!(streak.length, 2);
        assert_eq!((streak.from_rally, streak.to_rally), (1, 2));
    }

    #[test]
    fn test_streak_skips_undecided_rallies() {
        let rallies = vec![
            won(1, Some(Side::Fora)),
            won(2, None),
            won(3, Some(Side::Fora)),
            won(4, Some(Side::Casa)),
        ];
        let streak = longest_streak(&rallies).unwrap();
        assert_eq!(streak.side, Side::Fora);
        assert_eq!(streak.length, 2);
        assert_eq!(streak.to_rally, 3);
        assert!(longest_streak(&[]).is_none());
    }

    #[test]
    fn test_clutch_uses_pre_point_score() {
        // CASA reaches 20 on rally 20; only rallies 21 and 22 start at 20+.
        let mut rallies: Vec<_> = (1..=20).map(|n| won(n, Some(Side::Casa))).collect();
        rallies.push(won(21, Some(Side::Fora)));
        rallies.push(won(22, Some(Side::Casa)));

        let tally = clutch_tally(&rallies, 20);
        assert_eq!(tally.rallies, 2);
        assert_eq!(tally.casa_won, 1);
        assert_eq!(tally.fora_won, 1);
    }

    #[test]
    fn test_clutch_ignores_the_point_reaching_threshold() {
        let rallies: Vec<_> = (1..=20).map(|n| won(n, Some(Side::Fora))).collect();
        assert_eq!(clutch_tally(&rallies, 20).rallies, 0);
    }

    fn team_with(rotations: &[(u8, u32, u32)]) -> TeamKpis {
        let mut lines: Vec<RotationLine> = (1..=6)
            .map(|rotation| RotationLine {
                rotation,
                ..RotationLine::default()
            })
            .collect();
        for &(rotation, won, attempts) in rotations {
            lines[rotation as usize - 1].sideout = RateLine {
                attempts,
                won,
                percent: crate::analyzers::utility::pct(won, attempts),
            };
        }
        TeamKpis {
            side: Side::Casa,
            points: 0,
            sideout: RateLine::default(),
            breakpoint: RateLine::default(),
            serve: Default::default(),
            reception: Default::default(),
            attack: Default::default(),
            block_points: 0,
            unforced_errors: 0,
            rotations: lines,
            kills_by_zone: Default::default(),
        }
    }

    #[test]
    fn test_worst_rotation() {
        let team = team_with(&[(1, 1, 2), (2, 3, 4)]);
        assert_eq!(worst_rotation(&team, 2).unwrap().rotation, 1);
    }

    #[test]
    fn test_worst_rotation_tie_and_floor() {
        let team = team_with(&[(3, 0, 1), (4, 1, 2), (5, 2, 4)]);
        // Rotation 3 is below the floor, 4 and 5 tie at 50%.
        assert_eq!(worst_rotation(&team, 2).unwrap().rotation, 4);
        assert!(worst_rotation(&team_with(&[]), 2).is_none());
    }

    #[test]
    fn test_top_lists_from_raw_rows() {
        let roster: StaticRoster = serde_json::from_str(
            r#"{ "players": [
                { "id": 1, "match_id": 1, "side": "CASA", "name": "Ana" },
                { "id": 2, "match_id": 1, "side": "CASA", "name": "Bia" },
                { "id": 9, "match_id": 1, "side": "FORA", "name": "Clara" }
            ] }"#,
        )
        .unwrap();
        let rows = vec![
            RallyRecord {
                a_player_id: Some(2),
                s_player_id: Some(9),
                serve_side: Some(Side::Fora),
                setter_player_id: Some(1),
                pass_destination: Some(Destination::Middle),
                ..RallyRecord::new(1, 1, 1)
            },
            RallyRecord {
                a_player_id: Some(1),
                setter_player_id: Some(1),
                pass_destination: Some(Destination::Outside),
                ..RallyRecord::new(1, 1, 2)
            },
            RallyRecord {
                phase: 2,
                a_player_id: Some(1),
                setter_player_id: Some(1),
                pass_destination: Some(Destination::Outside),
                ..RallyRecord::new(1, 1, 2)
            },
            RallyRecord {
                a_player_id: Some(9),
                ..RallyRecord::new(1, 1, 3)
            },
        ];

        let casa = top_lists(&rows, Side::Casa, &roster, 3);
        assert_eq!(
            casa.top_zone,
            Some(ZoneCount {
                destination: Destination::Outside,
                count: 2
            })
        );
        assert_eq!(
            casa.top_attackers,
            vec![
                PlayerCount { player_id: 1, count: 2 },
                PlayerCount { player_id: 2, count: 1 },
            ]
        );
        assert!(casa.top_servers.is_empty());

        let fora = top_lists(&rows, Side::Fora, &roster, 3);
        assert_eq!(fora.top_servers, vec![PlayerCount { player_id: 9, count: 1 }]);
        assert_eq!(fora.top_attackers, vec![PlayerCount { player_id: 9, count: 1 }]);
        assert!(fora.top_zone.is_none());
    }
}
