//! The share registry tracks who owns how many shares of an institution. The
//! total number of shares issued is always the sum of the registry.

use crate::models::lib::agent::AgentID;
use getset::Getters;
use ledger_derive::Ledger;
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Getters, Ledger, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct ShareRegistry {
    holders: BTreeMap<AgentID, Decimal>,
}

impl ShareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of shares issued and outstanding.
    pub fn total_issued(&self) -> Decimal {
        self.total_holders()
    }

    /// Issue new shares to a holder.
    pub fn issue<T: Into<AgentID>>(&mut self, holder: T, quantity: Decimal) {
        self.track_holders(holder, quantity);
    }

    /// Move shares between holders, returning the quantity actually moved
    /// (never more than the source holds).
    pub fn transfer(&mut self, from: &AgentID, to: &AgentID, quantity: Decimal) -> Decimal {
        let moved = quantity.min(self.get_holders(from.clone())).max(Decimal::zero());
        self.track_holders(from.clone(), -moved);
        self.track_holders(to.clone(), moved);
        moved
    }

    /// Take shares out of circulation, returning the quantity actually
    /// removed (never more than the holder has).
    pub fn retire(&mut self, holder: &AgentID, quantity: Decimal) -> Decimal {
        let retired = quantity.min(self.get_holders(holder.clone())).max(Decimal::zero());
        self.track_holders(holder.clone(), -retired);
        retired
    }

    /// Cancel every share account without compensating anyone. Returns the
    /// holdings that were terminated.
    pub fn terminate_all(&mut self) -> BTreeMap<AgentID, Decimal> {
        self.clear_holders()
    }
}
