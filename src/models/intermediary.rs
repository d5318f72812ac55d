//! Intermediaries hold equity on behalf of creditors who aren't allowed to
//! hold it themselves (households and the central bank). They sell the
//! position off a little at a time, forward everything they raise to their
//! beneficiary, and disband once what's left is worth next to nothing.
//!
//! The beneficiary is stored by ID only. Anything that needs to pay the
//! beneficiary looks them up.
//!
//! See the [intermediary transactions][1] for the selling logic.
//!
//! [1]: ../../transactions/intermediary/index.html

use crate::models::{
    institution::InstitutionID,
    lib::agent::{Agent, AgentID},
};
use rust_decimal::prelude::*;

ledger_model! {
    pub struct Intermediary {
        id: <<IntermediaryID>>,
        /// Who we're selling for
        beneficiary: AgentID,
        /// The institution whose shares we hold
        stock: InstitutionID,
        /// How many shares we currently hold
        shares: Decimal,
        /// Once our holding is worth this much or less, we sell what's left
        /// and disband.
        asset_value_threshold: Decimal,
        /// The fraction of our holding we sell each period
        sell_rate: Decimal,
        /// Below this many shares we stop selling gradually and sell it all
        sell_all_below: Decimal,
        /// Running total of the proceeds passed on to the beneficiary
        #[builder(default)]
        forwarded: Decimal,
    }
    IntermediaryBuilder
}

impl Intermediary {
    /// Value our holding at the given share price
    pub fn holding_value(&self, price: Decimal) -> Decimal {
        *self.shares() * price
    }
}

impl Agent for Intermediary {
    fn agent_id(&self) -> AgentID {
        self.id().clone().into()
    }
}
