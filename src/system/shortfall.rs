//! Measures how far an institution is from meeting its capital requirement.

use crate::{
    error::{Error, Result},
    util::number::is_effectively_zero,
};
use getset::Getters;
use rust_decimal::prelude::*;

/// Computes the resolution amount: the equity an institution would need to
/// gain to reach its target capital adequacy ratio (CAR).
#[derive(Clone, Debug, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct CapitalShortfallCalculator {
    target_car: Decimal,
}

impl CapitalShortfallCalculator {
    pub fn new(target_car: Decimal) -> Result<Self> {
        if target_car < Decimal::zero() {
            Err(Error::InvalidConfiguration("negative target CAR".into()))?;
        }
        Ok(Self { target_car })
    }

    /// `max(0, target_car * rwa - equity)`.
    ///
    /// With no risk-weighted assets, a negative equity still has to be made
    /// good, which falls out of the formula on its own.
    pub fn shortfall(&self, equity: Decimal, rwa: Decimal) -> Result<Decimal> {
        if rwa < Decimal::zero() {
            Err(Error::CorruptLedger("negative risk-weighted assets".into()))?;
        }
        let shortfall = (self.target_car * rwa) - equity;
        if shortfall <= Decimal::zero() || is_effectively_zero(&shortfall) {
            Ok(Decimal::zero())
        } else {
            Ok(shortfall)
        }
    }
}
