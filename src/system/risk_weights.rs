//! Risk weights turn a pile of assets into a single risk-weighted asset (RWA)
//! figure, which is what capital requirements are measured against.

use crate::{
    error::{Error, Result},
    models::asset::{AssetBook, AssetClass},
};
use getset::Getters;
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

/// An immutable mapping of asset class to risk weight. Classes missing from
/// the table are weighted using the `fallback` weight.
#[derive(Clone, Debug, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct RiskWeightTable {
    #[serde(default)]
    weights: BTreeMap<AssetClass, Decimal>,
    fallback: Decimal,
}

impl RiskWeightTable {
    /// Create a validated weight table.
    pub fn new(weights: BTreeMap<AssetClass, Decimal>, fallback: Decimal) -> Result<Self> {
        let table = Self { weights, fallback };
        table.validate()?;
        Ok(table)
    }

    /// Make sure no weight in the table is negative.
    pub fn validate(&self) -> Result<()> {
        if self.fallback < Decimal::zero() {
            Err(Error::InvalidConfiguration("negative fallback risk weight".into()))?;
        }
        for (class, weight) in self.weights.iter() {
            if *weight < Decimal::zero() {
                Err(Error::InvalidConfiguration(format!("negative risk weight for {:?}", class)))?;
            }
        }
        Ok(())
    }

    /// Return a copy of this table with one weight replaced.
    pub fn with_weight(&self, class: AssetClass, weight: Decimal) -> Result<Self> {
        let mut weights = self.weights.clone();
        weights.insert(class, weight);
        Self::new(weights, self.fallback)
    }

    /// Grab the weight for an asset class
    pub fn weight(&self, class: &AssetClass) -> Decimal {
        self.weights.get(class).cloned().unwrap_or(self.fallback)
    }
}

impl Default for RiskWeightTable {
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(AssetClass::Cash, num!(0));
        weights.insert(AssetClass::GovernmentBond, num!(0));
        weights.insert(AssetClass::Mortgage, num!(0.5));
        weights.insert(AssetClass::InterbankLoan, num!(0.2));
        weights.insert(AssetClass::RepoLoan, num!(0.2));
        weights.insert(AssetClass::CommercialLoan, num!(1.0));
        weights.insert(AssetClass::Equity, num!(3.0));
        weights.insert(AssetClass::Other, num!(1.0));
        Self { weights, fallback: num!(1.0) }
    }
}

/// Computes `RWA = sum(asset value * weight)` over an asset book.
#[derive(Clone, Debug, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct RiskWeightedAssetCalculator {
    table: RiskWeightTable,
}

impl RiskWeightedAssetCalculator {
    pub fn new(table: RiskWeightTable) -> Result<Self> {
        table.validate()?;
        Ok(Self { table })
    }

    pub fn calculate(&self, assets: &AssetBook) -> Result<Decimal> {
        if assets.has_negative() {
            Err(Error::CorruptLedger("negative asset value".into()))?;
        }
        let rwa = assets.holdings().iter()
            .fold(Decimal::zero(), |acc, (class, val)| acc + (*val * self.table.weight(class)));
        Ok(rwa)
    }
}
