//! Rule-based inference of who won the rally and why.

use serde::{Deserialize, Serialize};

use crate::model::{Action, Code, PlayerId, Reason, Side};

/// Winner and reason of a decided rally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: Side,
    pub reason: Reason,
    /// Set only for a manually recorded net fault.
    #[serde(default)]
    pub fault_player: Option<PlayerId>,
}

impl Outcome {
    pub fn new(winner: Side, reason: Reason) -> Self {
        Self {
            winner,
            reason,
            fault_player: None,
        }
    }
}

/// Infers the outcome of a rally from its touches.
///
/// Rules are tried in order and the first one that fires decides:
///
/// 1. serve 3: ace for the server
/// 2. serve 0: service error, point to the receiver
/// 3. reception 0: ace for the server
/// 4. attacks in log order: 3 kill, 0 attack error, 1 with block code 3 stuff
///    block, 1 with block code 0 block out; 1 with block code 1 or 2 keeps going
/// 5. blocks in log order: 3 stuff block, 0 block fault
/// 6. defenses with code 0: kill for the side of the latest attack before it
///
/// Returns `None` when nothing decided the rally yet.
pub fn infer_outcome(
    serve_side: Side,
    serve_code: Option<Code>,
    reception_code: Option<Code>,
    actions: &[Action],
) -> Option<Outcome> {
    let receive_side = serve_side.opposite();

    match serve_code {
        Some(Code::PERFECT) => return Some(Outcome::new(serve_side, Reason::Ace)),
        Some(Code::ERROR) => return Some(Outcome::new(receive_side, Reason::Se)),
        _ => {}
    }

    if reception_code == Some(Code::ERROR) {
        return Some(Outcome::new(serve_side, Reason::Ace));
    }

    if let Some(outcome) = actions.iter().find_map(attack_outcome) {
        return Some(outcome);
    }

    if let Some(outcome) = actions.iter().find_map(block_outcome) {
        return Some(outcome);
    }

    defense_outcome(actions)
}

fn attack_outcome(action: &Action) -> Option<Outcome> {
    let Action::Attack(attack) = action else {
        return None;
    };
    match attack.code? {
        Code::PERFECT => Some(Outcome::new(attack.side, Reason::Kill)),
        Code::ERROR => Some(Outcome::new(attack.side.opposite(), Reason::Ae)),
        Code::POOR => match attack.block_code? {
            Code::PERFECT => Some(Outcome::new(attack.side.opposite(), Reason::Blk)),
            Code::ERROR => Some(Outcome::new(attack.side, Reason::Op)),
            _ => None,
        },
        _ => None,
    }
}

fn block_outcome(action: &Action) -> Option<Outcome> {
    let Action::Block(block) = action else {
        return None;
    };
    match block.code? {
        Code::PERFECT => Some(Outcome::new(block.side, Reason::Blk)),
        Code::ERROR => Some(Outcome::new(block.side.opposite(), Reason::Op)),
        _ => None,
    }
}

fn defense_outcome(actions: &[Action]) -> Option<Outcome> {
    let mut last_attack_side = None;
    for action in actions {
        match action {
            Action::Attack(attack) => last_attack_side = Some(attack.side),
            Action::Defense(defense) if defense.code == Some(Code::ERROR) => {
                if let Some(side) = last_attack_side {
                    return Some(Outcome::new(side, Reason::Kill));
                }
            }
            _ => {}
        }
    }
    None
}
