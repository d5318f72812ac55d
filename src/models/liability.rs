//! Liabilities are what an institution owes. We only distinguish the two kinds
//! a resolution cares about: loans (bonds, interbank and commercial borrowing)
//! and deposits. Each is tracked per creditor.

use crate::models::lib::agent::AgentID;
use getset::{Getters, CopyGetters};
use ledger_derive::Ledger;
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

/// What a single creditor is owed, split by liability kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, CopyGetters, Serialize, Deserialize)]
#[getset(get_copy = "pub")]
pub struct CreditorLiability {
    loan_value: Decimal,
    deposit_value: Decimal,
}

impl CreditorLiability {
    pub fn total(&self) -> Decimal {
        self.loan_value + self.deposit_value
    }
}

/// An institution's liabilities, keyed by creditor.
#[derive(Clone, Debug, Default, PartialEq, Getters, Ledger, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Liabilities {
    loans: BTreeMap<AgentID, Decimal>,
    deposits: BTreeMap<AgentID, Decimal>,
}

impl Liabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group our liabilities by creditor.
    pub fn by_creditor(&self) -> BTreeMap<AgentID, CreditorLiability> {
        let mut creditors: BTreeMap<AgentID, CreditorLiability> = BTreeMap::new();
        for (creditor, val) in self.loans.iter() {
            creditors.entry(creditor.clone()).or_default().loan_value += *val;
        }
        for (creditor, val) in self.deposits.iter() {
            creditors.entry(creditor.clone()).or_default().deposit_value += *val;
        }
        creditors
    }

    /// Whether the given agent is owed anything by this institution.
    pub fn is_creditor(&self, agent: &AgentID) -> bool {
        self.loans.contains_key(agent) || self.deposits.contains_key(agent)
    }
}
