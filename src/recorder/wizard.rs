//! The rally recording state machine.
//!
//! A [`RallyWizard`] walks one rally through serve, reception, free action
//! entry and outcome. Every edit goes through the [`ActionLog`] reducer and is
//! followed by a fresh outcome inference, so [`RallyWizard::step`] and
//! [`RallyWizard::outcome`] always reflect the current log.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::action_log::{ActionLog, LogCommand, LogError};
use super::outcome::{Outcome, infer_outcome};
use super::warnings::{Warning, scan_actions};
use crate::model::{
    Action, ActionType, AttackTouch, Code, PlayerId, RallyRecord, Reason, Roster, SetterTouch,
    Side, Touch,
};

/// Where the rally being recorded currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Step {
    Serve,
    Reception,
    ActionEntry,
    Outcome,
}

/// Failures that block a transition. The wizard is left unchanged.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("select the receiver first")]
    ReceiverRequired,
    #[error("record the serve first")]
    ServeRequired,
    #[error("record or skip the reception first")]
    ReceptionRequired,
    #[error("the serve cannot be removed once the reception is recorded")]
    ServeLocked,
    #[error("{0} actions are recorded through their own step")]
    NotFreeForm(ActionType),
    #[error("no recent attacker to repeat")]
    NoRecentAttacker,
    #[error("a kill needs a kill type, record it as a full attack")]
    KillNeedsType,
    #[error("the rally already has an outcome")]
    AlreadyDecided,
    #[error("a net fault needs the offending player")]
    NetFaultNeedsPlayer,
    #[error("the rally has no outcome yet")]
    NoOutcome,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Fixed facts about the rally being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyContext {
    pub match_id: i64,
    pub set_no: u8,
    pub rally_no: u32,
    pub serve_side: Side,
    pub serve_rot: u8,
    pub recv_rot: u8,
}

impl RallyContext {
    pub fn recv_side(&self) -> Side {
        self.serve_side.opposite()
    }
}

/// Attacker remembered across rallies for the quick attack shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastAttacker {
    pub side: Side,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone)]
pub struct RallyWizard {
    context: RallyContext,
    log: ActionLog,
    step: Step,
    server: Option<PlayerId>,
    receiver: Option<PlayerId>,
    inferred: Option<Outcome>,
    forced: Option<Outcome>,
    undo_stack: Vec<ActionLog>,
    redo_stack: Vec<ActionLog>,
}

impl RallyWizard {
    pub fn new(context: RallyContext) -> Self {
        Self {
            context,
            log: ActionLog::new(),
            step: Step::Serve,
            server: None,
            receiver: None,
            inferred: None,
            forced: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn context(&self) -> &RallyContext {
        &self.context
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// The inferred outcome, or the manual one when no rule fired.
    ///
    /// A manual outcome only holds for the log it was set on.
    pub fn outcome(&self) -> Option<Outcome> {
        self.inferred.or(self.forced)
    }

    pub fn warnings(&self) -> Vec<Warning> {
        scan_actions(self.log.actions())
    }

    pub fn select_server(&mut self, player_id: PlayerId) -> Result<(), WizardError> {
        self.server = Some(player_id);
        if let Some(serve) = self.log.serve().copied() {
            let touch = Touch {
                player_id: Some(player_id),
                ..serve
            };
            self.apply(LogCommand::UpsertServe(touch))?;
        }
        Ok(())
    }

    /// Selects the serve code; selecting the current code again removes the serve.
    pub fn select_serve_code(&mut self, code: Code) -> Result<(), WizardError> {
        if self.log.serve_code() == Some(code) {
            return self.remove_serve();
        }
        let touch = Touch::new(self.context.serve_side, self.server, Some(code));
        self.apply(LogCommand::UpsertServe(touch))
    }

    pub fn select_receiver(&mut self, player_id: PlayerId) {
        self.receiver = Some(player_id);
    }

    pub fn select_reception_code(&mut self, code: Code) -> Result<(), WizardError> {
        if self.log.serve().is_none() {
            return Err(WizardError::ServeRequired);
        }
        let Some(receiver) = self.receiver else {
            return Err(WizardError::ReceiverRequired);
        };
        let touch = Touch::new(self.context.recv_side(), Some(receiver), Some(code));
        self.apply(LogCommand::UpsertReception(touch))
    }

    /// Moves on without a reception code, leaving an empty reception behind.
    pub fn skip_reception(&mut self) -> Result<(), WizardError> {
        if self.log.serve().is_none() {
            return Err(WizardError::ServeRequired);
        }
        let touch = Touch::new(self.context.recv_side(), None, None);
        self.apply(LogCommand::UpsertReception(touch))
    }

    pub fn add_action(&mut self, action: Action) -> Result<(), WizardError> {
        if !action.is_free_form() {
            return Err(WizardError::NotFreeForm(action.action_type()));
        }
        self.require_reception()?;
        self.apply(LogCommand::Add(action))
    }

    pub fn add_combo(&mut self, setter: SetterTouch, attack: AttackTouch) -> Result<(), WizardError> {
        self.require_reception()?;
        self.apply(LogCommand::AddCombo(setter, attack))
    }

    /// Action at `index`, for editing in place with [`Self::replace_action`].
    pub fn action_at(&self, index: usize) -> Option<&Action> {
        self.log.get(index)
    }

    pub fn replace_action(&mut self, index: usize, action: Action) -> Result<(), WizardError> {
        self.apply(LogCommand::ReplaceAt(index, action))
    }

    pub fn remove_action(&mut self, index: usize) -> Result<(), WizardError> {
        let Some(action) = self.log.get(index) else {
            return Err(LogError::OutOfRange(index).into());
        };
        match action.action_type() {
            ActionType::Serve => self.remove_serve(),
            ActionType::Reception => {
                // Back to the reception step: only the serve survives.
                let mut log = ActionLog::new();
                if let Some(serve) = self.log.serve() {
                    log = log.apply(LogCommand::UpsertServe(*serve))?;
                }
                self.receiver = None;
                self.replace_log(log);
                Ok(())
            }
            _ => self.apply(LogCommand::RemoveAt(index)),
        }
    }

    /// Appends an attack by the remembered attacker. Kills need the full flow.
    pub fn quick_attack(
        &mut self,
        last: Option<&LastAttacker>,
        code: Code,
    ) -> Result<(), WizardError> {
        let last = last.ok_or(WizardError::NoRecentAttacker)?;
        if code == Code::PERFECT {
            return Err(WizardError::KillNeedsType);
        }
        self.add_action(Action::Attack(AttackTouch::new(
            last.side,
            Some(last.player_id),
            Some(code),
        )))
    }

    /// Ends the rally by hand when no rule decided it.
    pub fn finish(&mut self, winner: Side, reason: Reason) -> Result<(), WizardError> {
        if reason == Reason::Net {
            return Err(WizardError::NetFaultNeedsPlayer);
        }
        self.force(Outcome::new(winner, reason))
    }

    /// Ends the rally with a net fault committed by `player_id` of `offender`.
    pub fn finish_net_fault(&mut self, offender: Side, player_id: PlayerId) -> Result<(), WizardError> {
        self.force(Outcome {
            winner: offender.opposite(),
            reason: Reason::Net,
            fault_player: Some(player_id),
        })
    }

    pub fn undo(&mut self) -> Result<(), WizardError> {
        let previous = self.undo_stack.pop().ok_or(WizardError::NothingToUndo)?;
        let current = std::mem::replace(&mut self.log, previous);
        self.redo_stack.push(current);
        self.forced = None;
        self.refresh();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), WizardError> {
        let next = self.redo_stack.pop().ok_or(WizardError::NothingToRedo)?;
        let current = std::mem::replace(&mut self.log, next);
        self.undo_stack.push(current);
        self.forced = None;
        self.refresh();
        Ok(())
    }

    /// Drops everything recorded for this rally.
    pub fn cancel(&mut self) {
        debug!(rally_no = self.context.rally_no, "Rally cancelled");
        *self = RallyWizard::new(self.context);
    }

    /// Flattens the log into the record handed to the point log store.
    pub fn assemble(&self, roster: &dyn Roster) -> Result<RallyRecord, WizardError> {
        let outcome = self.outcome().ok_or(WizardError::NoOutcome)?;
        Ok(flatten(&self.context, &self.log, outcome, roster))
    }

    fn remove_serve(&mut self) -> Result<(), WizardError> {
        if self.log.reception().is_some() {
            return Err(WizardError::ServeLocked);
        }
        match self.log.position_of(ActionType::Serve) {
            Some(index) => self.apply(LogCommand::RemoveAt(index)),
            None => Ok(()),
        }
    }

    fn require_reception(&self) -> Result<(), WizardError> {
        if self.log.serve().is_none() {
            return Err(WizardError::ServeRequired);
        }
        if self.log.reception().is_none() {
            return Err(WizardError::ReceptionRequired);
        }
        Ok(())
    }

    fn force(&mut self, outcome: Outcome) -> Result<(), WizardError> {
        if self.log.serve().is_none() {
            return Err(WizardError::ServeRequired);
        }
        if self.inferred.is_some() {
            return Err(WizardError::AlreadyDecided);
        }
        debug!(winner = %outcome.winner, reason = ?outcome.reason, "Outcome set manually");
        self.forced = Some(outcome);
        self.refresh();
        Ok(())
    }

    fn apply(&mut self, command: LogCommand) -> Result<(), WizardError> {
        let next = self.log.apply(command)?;
        self.replace_log(next);
        Ok(())
    }

    /// Any log change invalidates a manual outcome.
    fn replace_log(&mut self, next: ActionLog) {
        let previous = std::mem::replace(&mut self.log, next);
        self.undo_stack.push(previous);
        self.redo_stack.clear();
        self.forced = None;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.inferred = infer_outcome(
            self.context.serve_side,
            self.log.serve_code(),
            self.log.reception_code(),
            self.log.actions(),
        );
        self.step = if self.outcome().is_some() {
            Step::Outcome
        } else if self.log.serve().is_none() {
            Step::Serve
        } else if self.log.reception().is_none() {
            Step::Reception
        } else {
            Step::ActionEntry
        };
        debug!(
            rally_no = self.context.rally_no,
            step = ?self.step,
            actions = self.log.len(),
            "Rally log updated"
        );
    }
}

/// Builds the wide record, keeping the latest touch of each type.
fn flatten(
    context: &RallyContext,
    log: &ActionLog,
    outcome: Outcome,
    roster: &dyn Roster,
) -> RallyRecord {
    let number = |side: Side, id: Option<PlayerId>| id.and_then(|id| roster.number_of(side, id));

    let mut rally = RallyRecord {
        serve_side: Some(context.serve_side),
        serve_rot: Some(context.serve_rot),
        recv_side: Some(context.recv_side()),
        recv_rot: Some(context.recv_rot),
        point_won_by: Some(outcome.winner),
        reason: Some(outcome.reason),
        fault_player_id: outcome.fault_player,
        ..RallyRecord::new(context.match_id, context.set_no, context.rally_no)
    };
    let mut touched_block_code = None;

    for action in log.actions() {
        match action {
            Action::Serve(t) => {
                rally.s_player_id = t.player_id;
                rally.s_no = number(t.side, t.player_id);
                rally.s_code = t.code;
            }
            Action::Reception(t) => {
                rally.r_player_id = t.player_id;
                rally.r_no = number(t.side, t.player_id);
                rally.r_code = t.code;
            }
            Action::Setter(s) => {
                rally.setter_player_id = s.setter_id;
                rally.pass_destination = s.pass_destination;
                rally.pass_code = s.pass_code;
            }
            Action::Attack(a) => {
                rally.a_player_id = a.player_id;
                rally.a_no = number(a.side, a.player_id);
                rally.a_code = a.code;
                rally.a_pass_quality = a.pass_quality;
                rally.kill_type = a.kill_type;
                touched_block_code = a.block_code.or(touched_block_code);
            }
            Action::Block(b) => {
                let [b1, b2, b3] = b.blockers;
                rally.b1_player_id = b1;
                rally.b1_no = number(b.side, b1);
                rally.b2_player_id = b2;
                rally.b2_no = number(b.side, b2);
                rally.b3_player_id = b3;
                rally.b3_no = number(b.side, b3);
                rally.b_code = b.code;
            }
            Action::Defense(t) => {
                rally.d_player_id = t.player_id;
                rally.d_no = number(t.side, t.player_id);
                rally.d_code = t.code;
            }
        }
    }

    if rally.b_code.is_none() {
        rally.b_code = touched_block_code;
    }

    rally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockTouch, Destination, KillType, Player, StaticRoster};

    #[test]
    fn test_new_wizard_starts_at_serve() {
        let wizard = RallyWizard::new(context());
        assert_eq!(wizard.step(), Step::Serve);
        assert!(wizard.outcome().is_none());
    }

    #[test]
    fn test_serve_code_toggles_off() {
        let mut wizard = RallyWizard::new(context());
        wizard.select_serve_code(code(2)).unwrap();
        assert_eq!(wizard.step(), Step::Reception);

        wizard.select_serve_code(code(2)).unwrap();
        assert!(wizard.log().is_empty());
        assert_eq!(wizard.step(), Step::Serve);
    }

    #[test]
    fn test_serve_code_change_upserts() {
        let mut wizard = RallyWizard::new(context());
        wizard.select_server(1).unwrap();
        wizard.select_serve_code(code(1)).unwrap();
        wizard.select_serve_code(code(2)).unwrap();

        assert_eq!(wizard.log().len(), 1);
        assert_eq!(wizard.log().serve_code(), Some(code(2)));
        assert_eq!(wizard.log().serve().and_then(|t| t.player_id), Some(1));
    }

    #[test]
    fn test_ace_short_circuits_to_outcome() {
        let mut wizard = RallyWizard::new(context());
        wizard.select_serve_code(code(3)).unwrap();
        assert_eq!(wizard.step(), Step::Outcome);
        assert_eq!(wizard.outcome(), Some(Outcome::new(Side::Casa, Reason::Ace)));
    }

    #[test]
    fn test_service_error_short_circuits_to_outcome() {
        let mut wizard = RallyWizard::new(context());
        wizard.select_serve_code(code(0)).unwrap();
        assert_eq!(wizard.outcome(), Some(Outcome::new(Side::Fora, Reason::Se)));
    }

    #[test]
    fn test_reception_code_requires_receiver() {
        let mut wizard = RallyWizard::new(context());
        wizard.select_serve_code(code(2)).unwrap();

        let err = wizard.select_reception_code(code(2)).unwrap_err();
        assert!(matches!(err, WizardError::ReceiverRequired));
        assert_eq!(err.to_string(), "select the receiver first");
        assert_eq!(wizard.log().len(), 1);
        assert_eq!(wizard.step(), Step::Reception);
    }

    #[test]
    fn test_reception_error_scores_ace() {
        let mut wizard = RallyWizard::new(context());
        wizard.select_serve_code(code(2)).unwrap();
        wizard.select_receiver(21);
        wizard.select_reception_code(code(0)).unwrap();
        assert_eq!(wizard.outcome(), Some(Outcome::new(Side::Casa, Reason::Ace)));
    }

    #[test]
    fn test_skip_reception_inserts_empty_touch() {
        let mut wizard = RallyWizard::new(context());
        wizard.select_serve_code(code(1)).unwrap();
        wizard.skip_reception().unwrap();

        assert_eq!(wizard.step(), Step::ActionEntry);
        assert_eq!(
            wizard.log().reception(),
            Some(&Touch::new(Side::Fora, None, None))
        );
    }

    #[test]
    fn test_free_actions_need_reception() {
        let mut wizard = RallyWizard::new(context());
        wizard.select_serve_code(code(2)).unwrap();
        let err = wizard.add_action(attack(Side::Fora, 3)).unwrap_err();
        assert!(matches!(err, WizardError::ReceptionRequired));

        let err = wizard
            .add_action(Action::Serve(Touch::new(Side::Casa, None, None)))
            .unwrap_err();
        assert!(matches!(err, WizardError::NotFreeForm(ActionType::Serve)));
    }

    #[test]
    fn test_kill_reaches_outcome_and_edit_reopens() {
        let mut wizard = in_action_entry();
        wizard.add_action(attack(Side::Fora, 3)).unwrap();
        assert_eq!(wizard.outcome(), Some(Outcome::new(Side::Fora, Reason::Kill)));

        wizard.replace_action(2, attack(Side::Fora, 2)).unwrap();
        assert_eq!(wizard.log().len(), 3);
        assert_eq!(wizard.step(), Step::ActionEntry);
        assert!(wizard.outcome().is_none());
    }

    #[test]
    fn test_serve_cannot_be_removed_after_reception() {
        let mut wizard = in_action_entry();
        let err = wizard.remove_action(0).unwrap_err();
        assert!(matches!(err, WizardError::ServeLocked));

        let err = wizard.select_serve_code(code(2)).unwrap_err();
        assert!(matches!(err, WizardError::ServeLocked));
    }

    #[test]
    fn test_removing_reception_returns_to_reception_step() {
        let mut wizard = in_action_entry();
        wizard.add_action(attack(Side::Fora, 2)).unwrap();
        wizard.remove_action(1).unwrap();

        assert_eq!(wizard.step(), Step::Reception);
        assert_eq!(wizard.log().len(), 1);
        assert!(matches!(
            wizard.select_reception_code(code(2)),
            Err(WizardError::ReceiverRequired)
        ));
    }

    #[test]
    fn test_quick_attack_uses_remembered_player() {
        let mut wizard = in_action_entry();
        let last = LastAttacker {
            side: Side::Fora,
            player_id: 30,
        };

        assert!(matches!(
            wizard.quick_attack(None, code(2)),
            Err(WizardError::NoRecentAttacker)
        ));
        assert!(matches!(
            wizard.quick_attack(Some(&last), code(3)),
            Err(WizardError::KillNeedsType)
        ));

        wizard.quick_attack(Some(&last), code(0)).unwrap();
        assert_eq!(wizard.outcome(), Some(Outcome::new(Side::Casa, Reason::Ae)));
        assert_eq!(wizard.log().last_attack().and_then(|a| a.player_id), Some(30));
    }

    #[test]
    fn test_manual_finish_only_when_open() {
        let mut wizard = in_action_entry();
        assert!(matches!(
            wizard.finish(Side::Casa, Reason::Net),
            Err(WizardError::NetFaultNeedsPlayer)
        ));

        wizard.finish_net_fault(Side::Fora, 25).unwrap();
        let outcome = wizard.outcome().unwrap();
        assert_eq!(outcome.winner, Side::Casa);
        assert_eq!(outcome.reason, Reason::Net);
        assert_eq!(outcome.fault_player, Some(25));

        let mut decided = RallyWizard::new(context());
        decided.select_serve_code(code(3)).unwrap();
        assert!(matches!(
            decided.finish(Side::Fora, Reason::Def),
            Err(WizardError::AlreadyDecided)
        ));
    }

    #[test]
    fn test_finish_needs_a_serve() {
        let mut wizard = RallyWizard::new(context());
        assert!(matches!(
            wizard.finish(Side::Casa, Reason::Def),
            Err(WizardError::ServeRequired)
        ));
        assert!(wizard.outcome().is_none());
        assert!(matches!(
            wizard.assemble(&StaticRoster::default()),
            Err(WizardError::NoOutcome)
        ));
    }

    #[test]
    fn test_removing_reception_drops_manual_outcome() {
        let mut wizard = RallyWizard::new(context());
        wizard.select_serve_code(code(2)).unwrap();
        wizard.select_receiver(21);
        wizard.select_reception_code(code(2)).unwrap();
        wizard.finish(Side::Casa, Reason::Def).unwrap();
        assert_eq!(wizard.step(), Step::Outcome);

        wizard.remove_action(1).unwrap();
        assert_eq!(wizard.log().len(), 1);
        assert_eq!(wizard.step(), Step::Reception);
        assert!(wizard.outcome().is_none());
    }

    #[test]
    fn test_undo_after_manual_finish_reopens_rally() {
        let mut wizard = RallyWizard::new(context());
        wizard.select_serve_code(code(2)).unwrap();
        wizard.finish(Side::Fora, Reason::Op).unwrap();
        assert_eq!(wizard.outcome(), Some(Outcome::new(Side::Fora, Reason::Op)));

        wizard.undo().unwrap();
        assert!(wizard.log().is_empty());
        assert_eq!(wizard.step(), Step::Serve);
        assert!(wizard.outcome().is_none());
    }

    #[test]
    fn test_undo_and_redo_restore_logs() {
        let mut wizard = in_action_entry();
        wizard.add_action(attack(Side::Fora, 3)).unwrap();

        wizard.undo().unwrap();
        assert_eq!(wizard.log().len(), 2);
        assert_eq!(wizard.step(), Step::ActionEntry);

        wizard.redo().unwrap();
        assert_eq!(wizard.step(), Step::Outcome);
        assert!(matches!(wizard.redo(), Err(WizardError::NothingToRedo)));
    }

    #[test]
    fn test_cancel_resets_to_serve() {
        let mut wizard = in_action_entry();
        wizard.cancel();
        assert!(wizard.log().is_empty());
        assert_eq!(wizard.step(), Step::Serve);
        assert!(matches!(wizard.undo(), Err(WizardError::NothingToUndo)));
    }

    #[test]
    fn test_assemble_requires_outcome() {
        let wizard = in_action_entry();
        assert!(matches!(
            wizard.assemble(&StaticRoster::default()),
            Err(WizardError::NoOutcome)
        ));
    }

    #[test]
    fn test_assemble_flattens_touches() {
        let mut wizard = in_action_entry();
        wizard
            .add_combo(
                SetterTouch {
                    side: Side::Fora,
                    setter_id: Some(22),
                    pass_destination: Some(Destination::Outside),
                    pass_code: Some(code(2)),
                },
                AttackTouch {
                    block_code: Some(code(2)),
                    ..AttackTouch::new(Side::Fora, Some(30), Some(code(1)))
                },
            )
            .unwrap();
        wizard
            .add_action(Action::Block(BlockTouch {
                side: Side::Casa,
                blockers: [Some(3), Some(4), None],
                code: None,
            }))
            .unwrap();
        wizard
            .add_action(Action::Attack(AttackTouch {
                kill_type: Some(KillType::Floor),
                ..AttackTouch::new(Side::Fora, Some(30), Some(code(3)))
            }))
            .unwrap();

        let rally = wizard.assemble(&roster()).unwrap();
        assert_eq!(rally.phase, 1);
        assert_eq!(rally.serve_side, Some(Side::Casa));
        assert_eq!(rally.recv_side, Some(Side::Fora));
        assert_eq!(rally.serve_rot, Some(1));
        assert_eq!(rally.recv_rot, Some(4));
        assert_eq!(rally.point_won_by, Some(Side::Fora));
        assert_eq!(rally.reason, Some(Reason::Kill));
        assert_eq!(rally.r_player_id, Some(21));
        assert_eq!(rally.r_no, Some(9));
        assert_eq!(rally.setter_player_id, Some(22));
        assert_eq!(rally.pass_destination, Some(Destination::Outside));
        assert_eq!(rally.a_player_id, Some(30));
        assert_eq!(rally.a_no, Some(17));
        assert_eq!(rally.a_code, Some(code(3)));
        assert_eq!(rally.kill_type, Some(KillType::Floor));
        assert_eq!(rally.b1_player_id, Some(3));
        assert_eq!(rally.b2_player_id, Some(4));
        // No block code recorded, so the touched-block result fills it.
        assert_eq!(rally.b_code, Some(code(2)));
    }

    fn context() -> RallyContext {
        RallyContext {
            match_id: 1,
            set_no: 1,
            rally_no: 1,
            serve_side: Side::Casa,
            serve_rot: 1,
            recv_rot: 4,
        }
    }

    fn in_action_entry() -> RallyWizard {
        let mut wizard = RallyWizard::new(context());
        wizard.select_server(1).unwrap();
        wizard.select_serve_code(code(2)).unwrap();
        wizard.select_receiver(21);
        wizard.select_reception_code(code(2)).unwrap();
        assert_eq!(wizard.step(), Step::ActionEntry);
        wizard
    }

    fn code(value: u8) -> Code {
        Code::new(value).unwrap()
    }

    fn attack(side: Side, value: u8) -> Action {
        Action::Attack(AttackTouch::new(side, Some(30), Some(code(value))))
    }

    fn roster() -> StaticRoster {
        let player = |id, side, number| Player {
            id,
            match_id: 1,
            side,
            number: Some(number),
            name: String::new(),
            team_player_id: None,
            libero: false,
        };
        StaticRoster::new(
            vec![
                player(1, Side::Casa, 5),
                player(21, Side::Fora, 9),
                player(30, Side::Fora, 17),
            ],
            Vec::new(),
        )
    }
}
