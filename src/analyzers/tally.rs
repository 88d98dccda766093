//! Counters shared by the set report and the cross-match rollup.
//!
//! Each tally looks at one canonical rally at a time and turns its counts
//! into a report line with [`pct`] and [`efficiency`].

use std::collections::BTreeMap;

use super::types::{AttackLine, RateLine, ReceptionLine, RotationLine, ServeLine, TeamKpis};
use super::utility::{efficiency, pct};
use crate::model::{Code, RallyRecord, Reason, Side};

/// Side credited with the rally's attack.
///
/// A kill belongs to the winner, an attack error or a stuffed attack to the
/// loser. Anything else is taken as a first attack by the receiving side,
/// which misses transition attacks since rows keep one attack each.
pub fn attack_side(rally: &RallyRecord) -> Option<Side> {
    match rally.reason {
        Some(Reason::Kill) => rally.point_won_by,
        Some(Reason::Ae) | Some(Reason::Blk) => rally.point_lost_by(),
        _ => rally.recv_side,
    }
}

/// Whether the rally contains an attack worth counting.
pub fn has_attack(rally: &RallyRecord) -> bool {
    rally.has_attack() || matches!(rally.reason, Some(Reason::Kill | Reason::Ae | Reason::Blk))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RateTally {
    attempts: u32,
    won: u32,
}

impl RateTally {
    pub fn observe(&mut self, won: bool) {
        self.attempts += 1;
        if won {
            self.won += 1;
        }
    }

    pub fn line(&self) -> RateLine {
        RateLine {
            attempts: self.attempts,
            won: self.won,
            percent: pct(self.won, self.attempts),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ServeTally {
    total: u32,
    aces: u32,
    errors: u32,
    pressure: u32,
}

impl ServeTally {
    /// Counts one serve of `rally`.
    pub fn observe(&mut self, rally: &RallyRecord) {
        self.total += 1;
        if rally.s_code == Some(Code::ERROR) || rally.reason == Some(Reason::Se) {
            self.errors += 1;
        }
        if rally.s_code == Some(Code::PERFECT) || rally.reason == Some(Reason::Ace) {
            self.aces += 1;
        }
        if matches!(rally.s_code, Some(Code::POOR | Code::GOOD)) {
            self.pressure += 1;
        }
    }

    pub fn aces(&self) -> u32 {
        self.aces
    }

    pub fn line(&self) -> ServeLine {
        ServeLine {
            total: self.total,
            aces: self.aces,
            errors: self.errors,
            pressure: self.pressure,
            ace_percent: pct(self.aces, self.total),
            error_percent: pct(self.errors, self.total),
            efficiency: efficiency(self.aces, self.errors, self.total),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReceptionTally {
    total: u32,
    perfect: u32,
    positive: u32,
    under_pressure: u32,
    errors: u32,
}

impl ReceptionTally {
    /// Counts the reception of `rally`. Missed serves leave nothing to receive.
    pub fn observe(&mut self, rally: &RallyRecord) {
        if rally.reason == Some(Reason::Se) {
            return;
        }
        self.total += 1;
        if rally.reason == Some(Reason::Ace) {
            self.errors += 1;
            return;
        }
        match rally.r_code {
            Some(Code::PERFECT) => {
                self.perfect += 1;
                self.positive += 1;
            }
            Some(Code::GOOD) => self.positive += 1,
            Some(Code::POOR) => self.under_pressure += 1,
            Some(Code::ERROR) => self.errors += 1,
            _ => {}
        }
    }

    pub fn line(&self) -> ReceptionLine {
        ReceptionLine {
            total: self.total,
            perfect: self.perfect,
            positive: self.positive,
            under_pressure: self.under_pressure,
            errors: self.errors,
            perfect_percent: pct(self.perfect, self.total),
            positive_percent: pct(self.positive, self.total),
            error_percent: pct(self.errors, self.total),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttackTally {
    total: u32,
    kills: u32,
    errors: u32,
    blocked: u32,
}

impl AttackTally {
    /// Counts the attack of `rally` for whoever the caller credits it to.
    pub fn observe(&mut self, rally: &RallyRecord) {
        self.total += 1;
        match rally.reason {
            Some(Reason::Kill) => self.kills += 1,
            Some(Reason::Ae) => self.errors += 1,
            Some(Reason::Blk) => self.blocked += 1,
            _ => {}
        }
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn line(&self) -> AttackLine {
        AttackLine {
            total: self.total,
            kills: self.kills,
            errors: self.errors,
            blocked: self.blocked,
            kill_percent: pct(self.kills, self.total),
            efficiency: efficiency(self.kills, self.errors + self.blocked, self.total),
        }
    }
}

/// Everything counted for one team.
#[derive(Debug, Clone)]
pub struct TeamTally {
    side: Side,
    points: u32,
    sideout: RateTally,
    breakpoint: RateTally,
    serve: ServeTally,
    reception: ReceptionTally,
    attack: AttackTally,
    block_points: u32,
    unforced_errors: u32,
    rotation_sideout: [RateTally; 6],
    rotation_break: [RateTally; 6],
}

impl TeamTally {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            points: 0,
            sideout: RateTally::default(),
            breakpoint: RateTally::default(),
            serve: ServeTally::default(),
            reception: ReceptionTally::default(),
            attack: AttackTally::default(),
            block_points: 0,
            unforced_errors: 0,
            rotation_sideout: [RateTally::default(); 6],
            rotation_break: [RateTally::default(); 6],
        }
    }

    pub fn observe(&mut self, rally: &RallyRecord) {
        let side = self.side;
        let won = rally.point_won_by == Some(side);
        let lost = rally.point_lost_by() == Some(side);

        if won {
            self.points += 1;
        }

        if rally.recv_side == Some(side) {
            self.sideout.observe(won);
            if let Some(slot) = rotation_slot(rally.recv_rot) {
                self.rotation_sideout[slot].observe(won);
            }
            self.reception.observe(rally);
        }

        if rally.serve_side == Some(side) {
            self.breakpoint.observe(won);
            if let Some(slot) = rotation_slot(rally.serve_rot) {
                self.rotation_break[slot].observe(won);
            }
            self.serve.observe(rally);
        }

        if has_attack(rally) && attack_side(rally) == Some(side) {
            self.attack.observe(rally);
        }

        match rally.reason {
            Some(Reason::Blk) if won => self.block_points += 1,
            Some(Reason::Se) if rally.serve_side == Some(side) => self.unforced_errors += 1,
            Some(Reason::Ae | Reason::Op) if lost => self.unforced_errors += 1,
            _ => {}
        }
    }

    pub fn finish(&self) -> TeamKpis {
        let rotations = (0..6)
            .map(|slot| RotationLine {
                rotation: slot as u8 + 1,
                sideout: self.rotation_sideout[slot].line(),
                breakpoint: self.rotation_break[slot].line(),
            })
            .collect();

        TeamKpis {
            side: self.side,
            points: self.points,
            sideout: self.sideout.line(),
            breakpoint: self.breakpoint.line(),
            serve: self.serve.line(),
            reception: self.reception.line(),
            attack: self.attack.line(),
            block_points: self.block_points,
            unforced_errors: self.unforced_errors,
            rotations,
            kills_by_zone: BTreeMap::new(),
        }
    }
}

fn rotation_slot(rotation: Option<u8>) -> Option<usize> {
    rotation
        .filter(|r| (1..=6).contains(r))
        .map(|r| r as usize - 1)
}
