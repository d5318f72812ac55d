//! The government funds bail-outs. There's one per simulation run, created by
//! the caller and passed in wherever it's needed.

use crate::{
    error::{Error, Result},
    models::lib::agent::{Agent, AgentID, GovernmentID},
};
use getset::Getters;
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Government {
    id: GovernmentID,
    /// Cash the government is willing to spend on bail-outs
    budget: Decimal,
    /// Everything paid out so far
    #[serde(default)]
    disbursed: Decimal,
}

impl Government {
    pub fn new(id: GovernmentID, budget: Decimal) -> Result<Self> {
        if budget < Decimal::zero() {
            Err(Error::InvalidConfiguration("negative government budget".into()))?;
        }
        Ok(Self { id, budget, disbursed: Decimal::zero() })
    }

    /// Pay out `amount` from the budget, failing if we don't have it.
    pub fn fund(&mut self, amount: Decimal) -> Result<Decimal> {
        if amount < Decimal::zero() {
            Err(Error::InvalidAmount(amount))?;
        }
        if amount > self.budget {
            Err(Error::InsufficientFunds)?;
        }
        self.budget -= amount;
        self.disbursed += amount;
        info!(government = %self.id, amount = %amount, remaining = %self.budget, "government funding disbursed");
        Ok(amount)
    }
}

impl Agent for Government {
    fn agent_id(&self) -> AgentID {
        self.id.clone().into()
    }
}
