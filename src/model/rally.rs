//! The flattened point record exchanged with the point log store.

use serde::{Deserialize, Serialize};

use super::action::{Code, Destination, KillType, PlayerId, Reason, Side};

/// Storage key of a rally row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RallyKey {
    pub match_id: i64,
    pub set_no: u8,
    pub rally_no: u32,
    pub phase: u8,
}

/// One stored rally row. Column order is the CSV/export column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RallyRecord {
    pub match_id: i64,
    pub set_no: u8,
    pub rally_no: u32,
    pub phase: u8,

    pub serve_side: Option<Side>,
    pub serve_rot: Option<u8>,
    pub recv_side: Option<Side>,
    pub recv_rot: Option<u8>,
    pub point_won_by: Option<Side>,
    pub reason: Option<Reason>,

    // serve
    pub s_player_id: Option<PlayerId>,
    pub s_no: Option<u16>,
    pub s_code: Option<Code>,

    // reception
    pub r_player_id: Option<PlayerId>,
    pub r_no: Option<u16>,
    pub r_code: Option<Code>,

    // setter
    pub setter_player_id: Option<PlayerId>,
    pub pass_destination: Option<Destination>,
    pub pass_code: Option<Code>,

    // attack
    pub a_player_id: Option<PlayerId>,
    pub a_no: Option<u16>,
    pub a_code: Option<Code>,
    pub a_pass_quality: Option<Code>,
    pub kill_type: Option<KillType>,

    // block
    pub b1_player_id: Option<PlayerId>,
    pub b1_no: Option<u16>,
    pub b2_player_id: Option<PlayerId>,
    pub b2_no: Option<u16>,
    pub b3_player_id: Option<PlayerId>,
    pub b3_no: Option<u16>,
    pub b_code: Option<Code>,

    // defense
    pub d_player_id: Option<PlayerId>,
    pub d_no: Option<u16>,
    pub d_code: Option<Code>,

    /// Offending player of a manually recorded net fault.
    #[serde(default)]
    pub fault_player_id: Option<PlayerId>,
}

impl RallyRecord {
    pub fn new(match_id: i64, set_no: u8, rally_no: u32) -> Self {
        Self {
            match_id,
            set_no,
            rally_no,
            phase: 1,
            ..Default::default()
        }
    }

    pub fn key(&self) -> RallyKey {
        RallyKey {
            match_id: self.match_id,
            set_no: self.set_no,
            rally_no: self.rally_no,
            phase: self.phase,
        }
    }

    /// The side that lost the point, if the point was decided.
    pub fn point_lost_by(&self) -> Option<Side> {
        self.point_won_by.map(Side::opposite)
    }

    /// Rotation of `side` during this rally.
    pub fn rotation_of(&self, side: Side) -> Option<u8> {
        if self.serve_side == Some(side) {
            self.serve_rot
        } else if self.recv_side == Some(side) {
            self.recv_rot
        } else {
            None
        }
    }

    pub fn blockers(&self) -> [Option<PlayerId>; 3] {
        [self.b1_player_id, self.b2_player_id, self.b3_player_id]
    }

    pub fn has_attack(&self) -> bool {
        self.a_player_id.is_some() || self.a_code.is_some()
    }
}
