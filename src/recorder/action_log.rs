//! The ordered touches of the rally in progress.
//!
//! [`ActionLog`] is a value: every [`LogCommand`] produces a new log and
//! leaves the previous one untouched, so the recorder can keep old values
//! around for undo and redo.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Action, ActionType, AttackTouch, Code, SetterTouch, Touch};

/// A single edit of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogCommand {
    /// Insert the serve, or overwrite the existing one in place.
    UpsertServe(Touch),
    /// Insert the reception right after the serve, or overwrite it in place.
    UpsertReception(Touch),
    Add(Action),
    /// Setter and attack appended together.
    AddCombo(SetterTouch, AttackTouch),
    ReplaceAt(usize, Action),
    RemoveAt(usize),
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LogError {
    #[error("a rally holds at most one {0} action")]
    Duplicate(ActionType),
    #[error("no action at index {0}")]
    OutOfRange(usize),
    #[error("cannot replace a {found} action with a {replacement} action")]
    TypeMismatch {
        found: ActionType,
        replacement: ActionType,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLog {
    actions: Vec<Action>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the log that results from applying `command` to this one.
    pub fn apply(&self, command: LogCommand) -> Result<ActionLog, LogError> {
        let mut actions = self.actions.clone();

        match command {
            LogCommand::UpsertServe(touch) => match self.position_of(ActionType::Serve) {
                Some(index) => actions[index] = Action::Serve(touch),
                None => actions.insert(0, Action::Serve(touch)),
            },
            LogCommand::UpsertReception(touch) => {
                match self.position_of(ActionType::Reception) {
                    Some(index) => actions[index] = Action::Reception(touch),
                    None => {
                        let at = self.position_of(ActionType::Serve).map_or(0, |i| i + 1);
                        actions.insert(at, Action::Reception(touch));
                    }
                }
            }
            LogCommand::Add(action) => match action {
                Action::Serve(touch) => {
                    if self.serve().is_some() {
                        return Err(LogError::Duplicate(ActionType::Serve));
                    }
                    return self.apply(LogCommand::UpsertServe(touch));
                }
                Action::Reception(touch) => {
                    if self.reception().is_some() {
                        return Err(LogError::Duplicate(ActionType::Reception));
                    }
                    return self.apply(LogCommand::UpsertReception(touch));
                }
                free => actions.push(free),
            },
            LogCommand::AddCombo(setter, attack) => {
                actions.push(Action::Setter(setter));
                actions.push(Action::Attack(attack));
            }
            LogCommand::ReplaceAt(index, replacement) => {
                let found = self.get(index).ok_or(LogError::OutOfRange(index))?;
                let locked = !found.is_free_form() || !replacement.is_free_form();
                if locked && found.action_type() != replacement.action_type() {
                    return Err(LogError::TypeMismatch {
                        found: found.action_type(),
                        replacement: replacement.action_type(),
                    });
                }
                actions[index] = replacement;
            }
            LogCommand::RemoveAt(index) => {
                if index >= actions.len() {
                    return Err(LogError::OutOfRange(index));
                }
                actions.remove(index);
            }
            LogCommand::Clear => actions.clear(),
        }

        Ok(ActionLog { actions })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn position_of(&self, kind: ActionType) -> Option<usize> {
        self.actions.iter().position(|a| a.action_type() == kind)
    }

    pub fn serve(&self) -> Option<&Touch> {
        self.actions.iter().find_map(|a| match a {
            Action::Serve(t) => Some(t),
            _ => None,
        })
    }

    pub fn reception(&self) -> Option<&Touch> {
        self.actions.iter().find_map(|a| match a {
            Action::Reception(t) => Some(t),
            _ => None,
        })
    }

    pub fn serve_code(&self) -> Option<Code> {
        self.serve().and_then(|t| t.code)
    }

    pub fn reception_code(&self) -> Option<Code> {
        self.reception().and_then(|t| t.code)
    }

    /// Most recent attack in log order.
    pub fn last_attack(&self) -> Option<&AttackTouch> {
        self.actions.iter().rev().find_map(|a| match a {
            Action::Attack(attack) => Some(attack),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockTouch, Side};

    #[test]
    fn test_apply_leaves_previous_log_untouched() {
        let empty = ActionLog::new();
        let served = empty.apply(LogCommand::UpsertServe(serve(2))).unwrap();

        assert!(empty.is_empty());
        assert_eq!(served.len(), 1);
        assert_eq!(served.serve_code(), Code::new(2));
    }

    #[test]
    fn test_upsert_serve_replaces_in_place() {
        let log = ActionLog::new()
            .apply(LogCommand::UpsertServe(serve(1)))
            .unwrap()
            .apply(LogCommand::UpsertReception(reception(2)))
            .unwrap()
            .apply(LogCommand::UpsertServe(serve(2)))
            .unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.position_of(ActionType::Serve), Some(0));
        assert_eq!(log.serve_code(), Code::new(2));
    }

    #[test]
    fn test_reception_is_inserted_after_serve() {
        let log = ActionLog::new()
            .apply(LogCommand::UpsertServe(serve(2)))
            .unwrap()
            .apply(LogCommand::Add(attack(Side::Casa, 2)))
            .unwrap()
            .apply(LogCommand::UpsertReception(reception(3)))
            .unwrap();

        assert_eq!(log.position_of(ActionType::Reception), Some(1));
        assert_eq!(log.get(2).map(Action::action_type), Some(ActionType::Attack));
    }

    #[test]
    fn test_second_serve_is_rejected() {
        let log = ActionLog::new()
            .apply(LogCommand::UpsertServe(serve(2)))
            .unwrap();
        let err = log.apply(LogCommand::Add(Action::Serve(serve(1)))).unwrap_err();
        assert_eq!(err, LogError::Duplicate(ActionType::Serve));
    }

    #[test]
    fn test_combo_appends_setter_then_attack() {
        let setter = SetterTouch {
            side: Side::Casa,
            setter_id: Some(5),
            pass_destination: None,
            pass_code: None,
        };
        let attack_touch = AttackTouch::new(Side::Casa, Some(9), Code::new(2));
        let log = ActionLog::new()
            .apply(LogCommand::AddCombo(setter, attack_touch))
            .unwrap();

        assert_eq!(log.actions(), &[Action::Setter(setter), Action::Attack(attack_touch)]);
        assert_eq!(log.last_attack(), Some(&attack_touch));
    }

    #[test]
    fn test_replace_allows_free_form_swaps_only() {
        let log = ActionLog::new()
            .apply(LogCommand::UpsertServe(serve(2)))
            .unwrap()
            .apply(LogCommand::Add(attack(Side::Casa, 2)))
            .unwrap();

        let block = Action::Block(BlockTouch {
            side: Side::Fora,
            blockers: [Some(3), None, None],
            code: Code::new(3),
        });
        let swapped = log.apply(LogCommand::ReplaceAt(1, block)).unwrap();
        assert_eq!(swapped.get(1), Some(&block));

        let err = log.apply(LogCommand::ReplaceAt(0, block)).unwrap_err();
        assert_eq!(
            err,
            LogError::TypeMismatch {
                found: ActionType::Serve,
                replacement: ActionType::Block
            }
        );
        assert_eq!(
            log.apply(LogCommand::RemoveAt(4)).unwrap_err(),
            LogError::OutOfRange(4)
        );
    }

    fn serve(code: u8) -> Touch {
        Touch::new(Side::Casa, Some(1), Code::new(code))
    }

    fn reception(code: u8) -> Touch {
        Touch::new(Side::Fora, Some(21), Code::new(code))
    }

    fn attack(side: Side, code: u8) -> Action {
        Action::Attack(AttackTouch::new(side, Some(9), Code::new(code)))
    }
}
