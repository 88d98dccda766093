//! Setter distribution measured against what the pass allowed.

use super::types::DistributionLine;
use super::utility::pct;
use crate::model::{Code, Destination, RallyRecord};

/// Destinations a setter can reasonably reach from a reception of `quality`.
pub fn available_destinations(quality: Code) -> &'static [Destination] {
    match quality.value() {
        3 => &Destination::ALL,
        2 => &[
            Destination::Outside,
            Destination::Middle,
            Destination::Opposite,
            Destination::Pipe,
        ],
        1 => &[Destination::Outside, Destination::Opposite],
        _ => &[Destination::Outside],
    }
}

/// Counts set destinations and how many of them stayed within the available ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionTally {
    total: u32,
    within: u32,
}

impl DistributionTally {
    /// Counts `rally` when it has both a set destination and a reception code.
    /// Returns whether the rally was counted.
    pub fn observe(&mut self, rally: &RallyRecord) -> bool {
        let (Some(destination), Some(quality)) = (rally.pass_destination, rally.r_code) else {
            return false;
        };
        self.total += 1;
        if available_destinations(quality).contains(&destination) {
            self.within += 1;
        }
        true
    }

    pub fn line(&self) -> DistributionLine {
        DistributionLine {
            total: self.total,
            within_available: self.within,
            within_percent: pct(self.within, self.total),
        }
    }
}
