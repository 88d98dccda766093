//! Replaying recorded operator input.
//!
//! A script is a JSON document holding the opening state of a set and the
//! operator commands in the order they were entered:
//!
//! ```json
//! {
//!   "match_id": 1, "set_no": 1, "serving": "CASA",
//!   "rotations": { "casa": 1, "fora": 1 },
//!   "commands": [
//!     { "op": "server", "player_id": 7 },
//!     { "op": "serve_code", "code": 3 },
//!     { "op": "commit" }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{Action, AttackTouch, Code, PlayerId, RallyRecord, Reason, Roster, SetterTouch, Side};
use crate::recorder::{Rotations, SetSession, WizardError};
use crate::store::PointLogStore;

/// One operator input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Server { player_id: PlayerId },
    ServeCode { code: Code },
    Receiver { player_id: PlayerId },
    ReceptionCode { code: Code },
    SkipReception,
    Action { action: Action },
    Combo { setter: SetterTouch, attack: AttackTouch },
    Replace { index: usize, action: Action },
    Remove { index: usize },
    QuickAttack { code: Code },
    Finish { winner: Side, reason: Reason },
    NetFault { side: Side, player_id: PlayerId },
    Undo,
    Redo,
    Cancel,
    Commit,
    UndoLast,
    NextSet { serving: Side, rotations: Rotations },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub match_id: i64,
    pub set_no: u8,
    pub serving: Side,
    pub rotations: Rotations,
    /// Continue after the rallies already stored for this set.
    #[serde(default)]
    pub resume: bool,
    pub commands: Vec<Command>,
}

impl Script {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script file '{path}'"))?;
        let script: Script = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse script file '{path}'"))?;
        Ok(script)
    }
}

/// A command the recorder refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplaySummary {
    pub committed: Vec<RallyRecord>,
    pub removed: Vec<RallyRecord>,
    pub rejected: Vec<Rejection>,
}

/// Feeds every command of `script` to a [`SetSession`] writing into `store`.
///
/// Refused commands leave the session untouched and are listed in the
/// summary. A failing store aborts the replay.
pub fn replay(
    script: &Script,
    store: &mut dyn PointLogStore,
    roster: &dyn Roster,
) -> Result<ReplaySummary> {
    let mut session = if script.resume {
        SetSession::resume(
            &*store,
            script.match_id,
            script.set_no,
            script.serving,
            script.rotations,
        )?
    } else {
        SetSession::new(script.match_id, script.set_no, script.serving, script.rotations)
    };
    let mut summary = ReplaySummary::default();

    for (index, command) in script.commands.iter().enumerate() {
        debug!(index, ?command, "Applying command");
        match apply(&mut session, command, store, roster, &mut summary) {
            Ok(()) => {}
            Err(WizardError::Store(err)) => {
                return Err(err.context(format!("command {index} could not be stored")));
            }
            Err(err) => {
                warn!(index, error = %err, "Command rejected");
                summary.rejected.push(Rejection {
                    index,
                    message: err.to_string(),
                });
            }
        }
    }

    if !session.wizard().log().is_empty() {
        warn!(
            rally_no = session.rally_no(),
            "Script ended with an uncommitted rally"
        );
    }
    Ok(summary)
}

fn apply(
    session: &mut SetSession,
    command: &Command,
    store: &mut dyn PointLogStore,
    roster: &dyn Roster,
    summary: &mut ReplaySummary,
) -> Result<(), WizardError> {
    let wizard = session.wizard_mut();
    match command {
        Command::Server { player_id } => wizard.select_server(*player_id),
        Command::ServeCode { code } => wizard.select_serve_code(*code),
        Command::Receiver { player_id } => {
            wizard.select_receiver(*player_id);
            Ok(())
        }
        Command::ReceptionCode { code } => wizard.select_reception_code(*code),
        Command::SkipReception => wizard.skip_reception(),
        Command::Action { action } => wizard.add_action(*action),
        Command::Combo { setter, attack } => wizard.add_combo(*setter, *attack),
        Command::Replace { index, action } => wizard.replace_action(*index, *action),
        Command::Remove { index } => wizard.remove_action(*index),
        Command::QuickAttack { code } => session.quick_attack(*code),
        Command::Finish { winner, reason } => wizard.finish(*winner, *reason),
        Command::NetFault { side, player_id } => wizard.finish_net_fault(*side, *player_id),
        Command::Undo => wizard.undo(),
        Command::Redo => wizard.redo(),
        Command::Cancel => {
            session.cancel();
            Ok(())
        }
        Command::Commit => {
            let rally = session.commit(store, roster)?;
            summary.committed.push(rally);
            Ok(())
        }
        Command::UndoLast => {
            if let Some(rally) = session.undo_last(store)? {
                summary.removed.push(rally);
            }
            Ok(())
        }
        Command::NextSet { serving, rotations } => {
            session.next_set(*serving, *rotations);
            Ok(())
        }
    }
}
