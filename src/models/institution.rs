//! An institution is anything with a balance sheet that can go bust: banks
//! and the firms they lend to.
//!
//! Resolution policies operate on an institution by value and hand back the
//! updated copy, which the caller is responsible for persisting.

use crate::{
    models::{
        balance_sheet::BalanceSheet,
        lib::agent::{Agent, AgentID},
    },
};
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};

/// The kinds of institution we can resolve. Some policies only apply to
/// some kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionKind {
    /// A bank. Banks are subject to capital requirements and can be bailed
    /// in or bailed out.
    Bank,
    /// A firm from the macro-economic model. The asset-threshold handler is
    /// only defined for these.
    MacroFirm,
    /// Any other firm.
    Firm,
}

/// Where an institution stands with respect to resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionStatus {
    Operating,
    /// Went through a resolution episode and came out solvent
    Resolved,
    /// Could not be resolved and is waiting on the liquidation scheduler
    FlaggedForLiquidation,
    /// Had its shares and debts cancelled and reissued
    Liquidated,
}

impl Default for InstitutionStatus {
    fn default() -> Self {
        InstitutionStatus::Operating
    }
}

ledger_model! {
    /// The `Institution` model wraps a balance sheet with some identifying
    /// information and a resolution status.
    pub struct Institution {
        id: <<InstitutionID>>,
        name: String,
        kind: InstitutionKind,
        balance_sheet: BalanceSheet,
        #[builder(default)]
        status: InstitutionStatus,
    }
    InstitutionBuilder
}

impl Institution {
    /// Assets minus liabilities
    pub fn equity(&self) -> Decimal {
        self.balance_sheet().equity()
    }
}

impl Agent for Institution {
    fn agent_id(&self) -> AgentID {
        self.id().clone().into()
    }
}
