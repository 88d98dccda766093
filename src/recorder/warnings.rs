//! Advisory data-completeness checks. None of these block a save.

use serde::Serialize;
use std::fmt;

use crate::model::{Action, ActionType, Code, RallyRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    PlayerWithoutCode,
    CodeWithoutPlayer,
    KillWithoutType,
    SetterWithoutDestination,
    TouchedBlockWithoutResult,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WarningKind::PlayerWithoutCode => "player recorded without a code",
            WarningKind::CodeWithoutPlayer => "code recorded without a player",
            WarningKind::KillWithoutType => "kill without a kill type",
            WarningKind::SetterWithoutDestination => "setter without a pass destination",
            WarningKind::TouchedBlockWithoutResult => "touched block without a block result",
        };
        f.write_str(text)
    }
}

/// One completeness issue; `index` points into the action log when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub index: Option<usize>,
    pub action: ActionType,
    pub kind: WarningKind,
}

/// Checks the touches of a rally still being recorded.
pub fn scan_actions(actions: &[Action]) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for (index, action) in actions.iter().enumerate() {
        let mut push = |kind| {
            warnings.push(Warning {
                index: Some(index),
                action: action.action_type(),
                kind,
            })
        };

        match action {
            Action::Setter(setter) => {
                if setter.setter_id.is_some() && setter.pass_code.is_none() {
                    push(WarningKind::PlayerWithoutCode);
                }
                if setter.setter_id.is_some() && setter.pass_destination.is_none() {
                    push(WarningKind::SetterWithoutDestination);
                }
            }
            Action::Block(block) => {
                if action.player_id().is_some() && block.code.is_none() {
                    push(WarningKind::PlayerWithoutCode);
                }
            }
            Action::Attack(attack) => {
                check_pair(attack.player_id.is_some(), attack.code, &mut push);
                if attack.code == Some(Code::PERFECT) && attack.kill_type.is_none() {
                    push(WarningKind::KillWithoutType);
                }
                if attack.code == Some(Code::POOR) && attack.block_code.is_none() {
                    push(WarningKind::TouchedBlockWithoutResult);
                }
            }
            Action::Serve(touch) | Action::Reception(touch) | Action::Defense(touch) => {
                check_pair(touch.player_id.is_some(), touch.code, &mut push);
            }
        }
    }

    warnings
}

/// Checks a stored rally row, for audit views.
pub fn scan_record(rally: &RallyRecord) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let mut push = |action, kind| {
        warnings.push(Warning {
            index: None,
            action,
            kind,
        })
    };

    let pairs = [
        (ActionType::Serve, rally.s_player_id.is_some(), rally.s_code),
        (ActionType::Reception, rally.r_player_id.is_some(), rally.r_code),
        (ActionType::Attack, rally.a_player_id.is_some(), rally.a_code),
        (ActionType::Defense, rally.d_player_id.is_some(), rally.d_code),
    ];
    for (action, has_player, code) in pairs {
        check_pair(has_player, code, &mut |kind| push(action, kind));
    }

    let has_blocker = rally.blockers().iter().any(Option::is_some);
    if has_blocker && rally.b_code.is_none() {
        push(ActionType::Block, WarningKind::PlayerWithoutCode);
    }
    if rally.setter_player_id.is_some() && rally.pass_code.is_none() {
        push(ActionType::Setter, WarningKind::PlayerWithoutCode);
    }
    if rally.setter_player_id.is_some() && rally.pass_destination.is_none() {
        push(ActionType::Setter, WarningKind::SetterWithoutDestination);
    }
    if rally.a_code == Some(Code::PERFECT) && rally.kill_type.is_none() {
        push(ActionType::Attack, WarningKind::KillWithoutType);
    }
    if rally.a_code == Some(Code::POOR) && rally.b_code.is_none() {
        push(ActionType::Attack, WarningKind::TouchedBlockWithoutResult);
    }

    warnings
}

fn check_pair(has_player: bool, code: Option<Code>, push: &mut impl FnMut(WarningKind)) {
    match (has_player, code.is_some()) {
        (true, false) => push(WarningKind::PlayerWithoutCode),
        (false, true) => push(WarningKind::CodeWithoutPlayer),
        _ => {}
    }
}
