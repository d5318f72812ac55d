//! Assets are tracked by class rather than by contract. The class an asset
//! belongs to is what determines its risk weight.

use getset::Getters;
use ledger_derive::Ledger;
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

/// The asset classes we know how to risk-weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Cash reserves
    Cash,
    /// Government bonds (gilts)
    GovernmentBond,
    /// Residential mortgages
    Mortgage,
    /// Loans to other banks
    InterbankLoan,
    /// Repurchase agreements
    RepoLoan,
    /// Loans to firms
    CommercialLoan,
    /// Publicly traded equity exposure
    Equity,
    /// Anything else
    Other,
}

impl AssetClass {
    /// Every asset class, in ledger order.
    pub fn all() -> Vec<Self> {
        vec![
            AssetClass::Cash,
            AssetClass::GovernmentBond,
            AssetClass::Mortgage,
            AssetClass::InterbankLoan,
            AssetClass::RepoLoan,
            AssetClass::CommercialLoan,
            AssetClass::Equity,
            AssetClass::Other,
        ]
    }
}

/// Holds an institution's asset values, bucketed by class.
#[derive(Clone, Debug, Default, PartialEq, Getters, Ledger, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct AssetBook {
    holdings: BTreeMap<AssetClass, Decimal>,
}

impl AssetBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an asset book from a list of (class, value) pairs.
    pub fn from_entries<I>(entries: I) -> Self
        where I: IntoIterator<Item = (AssetClass, Decimal)>
    {
        let mut book = Self::new();
        for (class, val) in entries {
            book.track_holdings(class, val);
        }
        book
    }

    /// Cash on hand
    pub fn cash(&self) -> Decimal {
        self.get_holdings(AssetClass::Cash)
    }
}
