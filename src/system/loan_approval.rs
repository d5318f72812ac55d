//! Decides whether an institution gets emergency (uncollateralized) liquidity
//! before we resort to resolving it. These are pure predicates: no state, no
//! side effects.

use crate::{
    error::{Error, Result},
    models::balance_sheet::BalanceSheet,
};
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};

/// A scalar measure of how risky an institution looks to a lender.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskMeasure {
    /// Total assets over equity. An institution with no (or negative) equity
    /// is maximally risky.
    SimpleLeverage,
}

impl Default for RiskMeasure {
    fn default() -> Self {
        RiskMeasure::SimpleLeverage
    }
}

impl RiskMeasure {
    pub fn measure(&self, sheet: &BalanceSheet) -> Decimal {
        match self {
            RiskMeasure::SimpleLeverage => {
                let equity = sheet.equity();
                if equity <= Decimal::zero() {
                    return Decimal::MAX;
                }
                sheet.total_assets() / equity
            }
        }
    }
}

/// Approve or deny an uncollateralized loan given a risk measure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanApprovalPolicy {
    /// Never lend. This is the default.
    AlwaysDeny,
    /// Lend iff `risk <= threshold`
    RiskBased {
        threshold: Decimal,
    },
}

impl Default for LoanApprovalPolicy {
    fn default() -> Self {
        LoanApprovalPolicy::AlwaysDeny
    }
}

impl LoanApprovalPolicy {
    /// A risk-based policy using the default threshold.
    pub fn risk_based() -> Self {
        LoanApprovalPolicy::RiskBased { threshold: num!(0.1) }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            LoanApprovalPolicy::RiskBased { threshold } if *threshold < Decimal::zero() => {
                Err(Error::InvalidConfiguration("negative loan approval threshold".into()))
            }
            _ => Ok(()),
        }
    }

    pub fn approve(&self, risk: Decimal) -> bool {
        match self {
            LoanApprovalPolicy::AlwaysDeny => false,
            LoanApprovalPolicy::RiskBased { threshold } => risk <= *threshold,
        }
    }
}
