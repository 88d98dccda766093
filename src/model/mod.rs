//! Domain types shared by the recorder, the stores and the analyzers.

pub mod action;
pub mod rally;
pub mod roster;

pub use action::{
    Action, ActionType, AttackTouch, BlockTouch, Code, Destination, KillType, PlayerId, Reason,
    SetterTouch, Side, Touch,
};
pub use rally::{RallyKey, RallyRecord};
pub use roster::{Lineup, Player, Roster, StaticRoster};
