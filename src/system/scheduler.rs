//! Liquidation happens outside of this crate. When an episode ends with an
//! institution flagged for (or put through) liquidation, we let the scheduler
//! know and it takes things from there.

use crate::{
    models::institution::InstitutionID,
    resolution::Outcome,
};
use getset::Getters;
use tracing::info;

pub trait LiquidationScheduler {
    fn schedule(&mut self, institution: &InstitutionID, outcome: Outcome);
}

/// A scheduler that queues up notifications for the caller to act on.
#[derive(Clone, Debug, Default, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct LiquidationQueue {
    pending: Vec<(InstitutionID, Outcome)>,
}

impl LiquidationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything in the queue, leaving it empty.
    pub fn drain(&mut self) -> Vec<(InstitutionID, Outcome)> {
        std::mem::replace(&mut self.pending, vec![])
    }
}

impl LiquidationScheduler for LiquidationQueue {
    fn schedule(&mut self, institution: &InstitutionID, outcome: Outcome) {
        info!(institution = %institution, outcome = ?outcome, "queued for liquidation");
        self.pending.push((institution.clone(), outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queues() {
        let mut queue = LiquidationQueue::new();
        queue.schedule(&InstitutionID::new("bank"), Outcome::FlaggedForLiquidation);
        queue.schedule(&InstitutionID::new("firm"), Outcome::Liquidated);
        assert_eq!(queue.pending().len(), 2);
        let drained = queue.drain();
        assert_eq!(drained[0], (InstitutionID::new("bank"), Outcome::FlaggedForLiquidation));
        assert_eq!(drained[1], (InstitutionID::new("firm"), Outcome::Liquidated));
        assert!(queue.pending().is_empty());
    }
}
