//! Claims are what a creditor is owed going into a resolution episode, and how
//! much of that got written down (or settled) along the way. They only live as
//! long as the episode that creates them.

use crate::models::lib::agent::AgentID;
use getset::Getters;
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};

#[derive(Clone, Debug, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Claim {
    /// Who holds the claim
    creditor: AgentID,
    /// The claim's value when the episode started
    original_amount: Decimal,
    /// How much has been written down or settled so far
    written_down_amount: Decimal,
}

impl Claim {
    pub fn new(creditor: AgentID, original_amount: Decimal) -> Self {
        Self {
            creditor,
            original_amount,
            written_down_amount: Decimal::zero(),
        }
    }

    /// Reduce the claim. Never goes past the original amount.
    pub fn write_down(&mut self, amount: Decimal) {
        let capped = amount.max(Decimal::zero()).min(self.remaining());
        self.written_down_amount += capped;
    }

    /// What's still owed on this claim
    pub fn remaining(&self) -> Decimal {
        self.original_amount - self.written_down_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lib::agent::FundID;
    use rust_decimal_macros::*;

    #[test]
    fn writes_down() {
        let mut claim = Claim::new(FundID::new("fund").into(), dec!(150));
        claim.write_down(dec!(100));
        assert_eq!(claim.remaining(), dec!(50));
        claim.write_down(dec!(-20));
        assert_eq!(claim.remaining(), dec!(50));
        claim.write_down(dec!(80));
        assert_eq!(claim.written_down_amount(), &dec!(150));
        assert_eq!(claim.remaining(), dec!(0));
    }
}
