//! Point-by-point rally recording.
//!
//! The [`SetSession`] drives one [`RallyWizard`] per rally. The wizard edits
//! an [`ActionLog`] and re-runs [`infer_outcome`] after every edit; once the
//! rally is decided the session flattens it into a
//! [`RallyRecord`](crate::model::RallyRecord) and saves it.

pub mod action_log;
pub mod outcome;
pub mod session;
pub mod warnings;
pub mod wizard;

pub use action_log::{ActionLog, LogCommand, LogError};
pub use outcome::{Outcome, infer_outcome};
pub use session::{Rotations, SetSession};
pub use warnings::{Warning, WarningKind, scan_actions, scan_record};
pub use wizard::{LastAttacker, RallyContext, RallyWizard, Step, WizardError};
