//! Set-level controller around the rally wizard.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::wizard::{LastAttacker, RallyContext, RallyWizard, WizardError};
use crate::model::{Code, Player, RallyRecord, Roster, Side};
use crate::store::PointLogStore;

/// Current rotation (1..=6) of each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotations {
    pub casa: u8,
    pub fora: u8,
}

impl Rotations {
    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::Casa => self.casa,
            Side::Fora => self.fora,
        }
    }

    /// Moves `side` to its next rotation, wrapping 6 back to 1.
    pub fn advance(&mut self, side: Side) {
        let rotation = match side {
            Side::Casa => &mut self.casa,
            Side::Fora => &mut self.fora,
        };
        *rotation = *rotation % 6 + 1;
    }
}

/// Records the rallies of one set.
///
/// Owns the wizard of the rally in progress, the serving side, both
/// rotations and the last attacker used by the quick attack shortcut.
#[derive(Debug, Clone)]
pub struct SetSession {
    match_id: i64,
    set_no: u8,
    rally_no: u32,
    serving: Side,
    rotations: Rotations,
    last_attacker: Option<LastAttacker>,
    wizard: RallyWizard,
}

impl SetSession {
    pub fn new(match_id: i64, set_no: u8, serving: Side, rotations: Rotations) -> Self {
        let context = RallyContext {
            match_id,
            set_no,
            rally_no: 1,
            serve_side: serving,
            serve_rot: rotations.get(serving),
            recv_rot: rotations.get(serving.opposite()),
        };
        Self {
            match_id,
            set_no,
            rally_no: 1,
            serving,
            rotations,
            last_attacker: None,
            wizard: RallyWizard::new(context),
        }
    }

    /// Continues a set already present in the store after its last rally.
    pub fn resume(
        store: &dyn PointLogStore,
        match_id: i64,
        set_no: u8,
        serving: Side,
        rotations: Rotations,
    ) -> anyhow::Result<Self> {
        let rows = store.query(match_id, Some(set_no))?;
        let mut session = Self::new(match_id, set_no, serving, rotations);
        if let Some(last) = rows.iter().max_by_key(|r| (r.rally_no, r.phase)) {
            session.restore_after(last);
            info!(match_id, set_no, rally_no = session.rally_no, "Resuming set");
        }
        Ok(session)
    }

    pub fn match_id(&self) -> i64 {
        self.match_id
    }

    pub fn set_no(&self) -> u8 {
        self.set_no
    }

    pub fn rally_no(&self) -> u32 {
        self.rally_no
    }

    pub fn serving(&self) -> Side {
        self.serving
    }

    pub fn rotations(&self) -> Rotations {
        self.rotations
    }

    pub fn last_attacker(&self) -> Option<&LastAttacker> {
        self.last_attacker.as_ref()
    }

    pub fn wizard(&self) -> &RallyWizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut RallyWizard {
        &mut self.wizard
    }

    pub fn quick_attack(&mut self, code: Code) -> Result<(), WizardError> {
        self.wizard.quick_attack(self.last_attacker.as_ref(), code)
    }

    /// Players that can be picked for `side`: those on court plus liberos.
    pub fn eligible_players(&self, roster: &dyn Roster, side: Side) -> Vec<Player> {
        let mut players = roster.players_on_court(self.set_no, side, self.rally_no);
        for player in roster.players_for_side(side) {
            if player.libero && !players.iter().any(|p| p.id == player.id) {
                players.push(player);
            }
        }
        players
    }

    /// Saves the decided rally and starts the next one.
    ///
    /// The log is only cleared once the store accepted the record, so a
    /// failed save can simply be retried.
    pub fn commit(
        &mut self,
        store: &mut dyn PointLogStore,
        roster: &dyn Roster,
    ) -> Result<RallyRecord, WizardError> {
        let rally = self.wizard.assemble(roster)?;
        for warning in self.wizard.warnings() {
            warn!(
                rally_no = rally.rally_no,
                action = %warning.action,
                issue = %warning.kind,
                "Incomplete rally data"
            );
        }

        store.save(&rally)?;
        info!(
            match_id = rally.match_id,
            set_no = rally.set_no,
            rally_no = rally.rally_no,
            winner = ?rally.point_won_by,
            reason = ?rally.reason,
            "Rally committed"
        );

        if let Some(attack) = self.wizard.log().last_attack() {
            if let Some(player_id) = attack.player_id {
                self.last_attacker = Some(LastAttacker {
                    side: attack.side,
                    player_id,
                });
            }
        }

        self.restore_after(&rally);
        Ok(rally)
    }

    /// Discards the rally in progress.
    pub fn cancel(&mut self) {
        self.wizard.cancel();
    }

    /// Removes the last committed rally of the set and records it again.
    pub fn undo_last(&mut self, store: &mut dyn PointLogStore) -> anyhow::Result<Option<RallyRecord>> {
        let removed = store.delete_last(self.match_id, self.set_no)?;
        if let Some(rally) = &removed {
            self.rally_no = rally.rally_no;
            if let Some(side) = rally.serve_side {
                self.serving = side;
                if let Some(rot) = rally.serve_rot {
                    self.set_rotation(side, rot);
                }
                if let Some(rot) = rally.recv_rot {
                    self.set_rotation(side.opposite(), rot);
                }
            }
            info!(rally_no = rally.rally_no, "Last rally removed");
        }
        self.reset_wizard();
        Ok(removed)
    }

    /// Starts the next set; the last attacker does not carry over.
    pub fn next_set(&mut self, serving: Side, rotations: Rotations) {
        *self = Self::new(self.match_id, self.set_no.saturating_add(1), serving, rotations);
        info!(match_id = self.match_id, set_no = self.set_no, "Set started");
    }

    /// Positions the session on the rally following `rally`.
    fn restore_after(&mut self, rally: &RallyRecord) {
        if let (Some(serve_side), Some(serve_rot), Some(recv_rot)) =
            (rally.serve_side, rally.serve_rot, rally.recv_rot)
        {
            self.set_rotation(serve_side, serve_rot);
            self.set_rotation(serve_side.opposite(), recv_rot);
            self.serving = serve_side;
        }
        if let Some(winner) = rally.point_won_by {
            if winner != self.serving {
                self.rotations.advance(winner);
                self.serving = winner;
            }
        }
        self.rally_no = rally.rally_no + 1;
        self.reset_wizard();
    }

    fn set_rotation(&mut self, side: Side, rotation: u8) {
        match side {
            Side::Casa => self.rotations.casa = rotation,
            Side::Fora => self.rotations.fora = rotation,
        }
    }

    fn reset_wizard(&mut self) {
        self.wizard = RallyWizard::new(RallyContext {
            match_id: self.match_id,
            set_no: self.set_no,
            rally_no: self.rally_no,
            serve_side: self.serving,
            serve_rot: self.rotations.get(self.serving),
            recv_rot: self.rotations.get(self.serving.opposite()),
        });
    }
}
