//! The market channel: where share prices come from and where intermediaries
//! go to sell the equity they hold.
//!
//! Real market clearing happens outside of this crate. The implementations
//! here are simple enough to drive a simulation step or a test.

use crate::{
    error::{Error, Result},
    models::{
        institution::InstitutionID,
        intermediary::IntermediaryID,
        lib::agent::AgentID,
    },
};
use getset::{Getters, CopyGetters};
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Supplies (and records) the current share price of an institution.
pub trait PriceOracle {
    /// The current price of one share, if the stock is listed.
    fn price(&self, stock: &InstitutionID) -> Option<Decimal>;

    /// Publish a new share price, generally after a resolution changes the
    /// share count.
    fn set_price(&mut self, stock: &InstitutionID, price: Decimal);
}

/// A price oracle backed by a map.
#[derive(Clone, Debug, Default, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct PriceBook {
    prices: BTreeMap<InstitutionID, Decimal>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PriceOracle for PriceBook {
    fn price(&self, stock: &InstitutionID) -> Option<Decimal> {
        self.prices.get(stock).cloned()
    }

    fn set_price(&mut self, stock: &InstitutionID, price: Decimal) {
        self.prices.insert(stock.clone(), price);
    }
}

/// The result of a sell order.
#[derive(Clone, Copy, Debug, Default, PartialEq, CopyGetters, Serialize, Deserialize)]
#[getset(get_copy = "pub")]
pub struct Sale {
    /// How many shares actually sold
    quantity: Decimal,
    /// What we got for them
    proceeds: Decimal,
}

impl Sale {
    pub fn new(quantity: Decimal, proceeds: Decimal) -> Self {
        Self { quantity, proceeds }
    }
}

/// A market an intermediary can sell shares into. Markets also know prices,
/// which is how an intermediary values whatever it hasn't sold yet.
pub trait ShareMarket: PriceOracle {
    fn sell(&mut self, seller: &IntermediaryID, stock: &InstitutionID, quantity: Decimal) -> Result<Sale>;

    /// Who ends up holding shares of `stock` sold into this market. `None`
    /// means the shares are bought back and leave circulation.
    fn buyer(&self, _stock: &InstitutionID) -> Option<AgentID> {
        None
    }
}

/// A market that fills sell orders at the listed price, optionally limited
/// to some number of shares per order.
#[derive(Clone, Debug, Default, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct FixedPriceMarket {
    prices: PriceBook,
    /// Max shares filled per order. `None` fills everything.
    depth: Option<Decimal>,
    /// Who takes the shares we buy. `None` retires them.
    buyer: Option<AgentID>,
    /// Every fill we've made, in order
    fills: Vec<(IntermediaryID, InstitutionID, Sale)>,
}

impl FixedPriceMarket {
    pub fn new(prices: PriceBook) -> Self {
        Self { prices, depth: None, buyer: None, fills: vec![] }
    }

    /// Hand every share this market buys to `buyer`.
    pub fn with_buyer<T: Into<AgentID>>(mut self, buyer: T) -> Self {
        self.buyer = Some(buyer.into());
        self
    }

    /// Create a market that fills at most `depth` shares per order.
    pub fn with_depth(prices: PriceBook, depth: Decimal) -> Result<Self> {
        if depth < Decimal::zero() {
            Err(Error::InvalidConfiguration("negative market depth".into()))?;
        }
        Ok(Self { prices, depth: Some(depth), buyer: None, fills: vec![] })
    }
}

impl PriceOracle for FixedPriceMarket {
    fn price(&self, stock: &InstitutionID) -> Option<Decimal> {
        self.prices.price(stock)
    }

    fn set_price(&mut self, stock: &InstitutionID, price: Decimal) {
        self.prices.set_price(stock, price);
    }
}

impl ShareMarket for FixedPriceMarket {
    fn sell(&mut self, seller: &IntermediaryID, stock: &InstitutionID, quantity: Decimal) -> Result<Sale> {
        if quantity < Decimal::zero() {
            Err(Error::InvalidAmount(quantity))?;
        }
        let price = match self.prices.price(stock) {
            Some(price) => price,
            None => {
                warn!(stock = %stock, "no price listed, order not filled");
                return Ok(Sale::default());
            }
        };
        let filled = match self.depth {
            Some(depth) => quantity.min(depth),
            None => quantity,
        };
        let sale = Sale::new(filled, filled * price);
        self.fills.push((seller.clone(), stock.clone(), sale));
        Ok(sale)
    }

    fn buyer(&self, _stock: &InstitutionID) -> Option<AgentID> {
        self.buyer.clone()
    }
}
