//! A balance sheet ties together what an institution owns, what it owes, and
//! who owns it. Equity is never stored: it's always derived from the asset
//! and liability ledgers, so it can't drift out of sync with them.

use crate::{
    error::{Error, Result},
    models::{
        asset::AssetBook,
        liability::Liabilities,
        share::ShareRegistry,
    },
};
use getset::{Getters, MutGetters};
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};

#[derive(Clone, Debug, Default, PartialEq, Getters, MutGetters, Serialize, Deserialize)]
#[getset(get = "pub", get_mut = "pub")]
pub struct BalanceSheet {
    assets: AssetBook,
    liabilities: Liabilities,
    shares: ShareRegistry,
}

impl BalanceSheet {
    pub fn new(assets: AssetBook, liabilities: Liabilities, shares: ShareRegistry) -> Self {
        Self { assets, liabilities, shares }
    }

    /// The value of everything we own
    pub fn total_assets(&self) -> Decimal {
        self.assets.total()
    }

    /// The value of everything we owe
    pub fn total_liabilities(&self) -> Decimal {
        self.liabilities.total()
    }

    /// Assets minus liabilities. May be negative.
    pub fn equity(&self) -> Decimal {
        self.total_assets() - self.total_liabilities()
    }

    pub fn total_shares_issued(&self) -> Decimal {
        self.shares.total_issued()
    }

    /// Make sure nothing on this sheet is negative. Resolution refuses to run
    /// on a ledger that fails this check rather than trying to repair it.
    pub fn validate(&self) -> Result<()> {
        if self.assets.has_negative() {
            Err(Error::CorruptLedger("negative asset value".into()))?;
        }
        if self.liabilities.has_negative() {
            Err(Error::CorruptLedger("negative liability".into()))?;
        }
        if self.shares.has_negative() {
            Err(Error::CorruptLedger("negative share quantity".into()))?;
        }
        Ok(())
    }
}
