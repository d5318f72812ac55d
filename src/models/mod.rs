//! Models are the persistent objects of the resolution system: institutions
//! and the intermediaries spawned while resolving them, along with the ledgers
//! (assets, liabilities, shares) that make up a balance sheet.
//!
//! Operations never persist anything. Instead they return [Modifications]
//! describing which models were created, updated, or deleted, and the caller
//! applies those to whatever storage they like.
//!
//! [Modifications]: struct.Modifications.html

#[macro_use]
pub mod lib;

pub mod asset;
pub mod liability;
pub mod share;
pub mod balance_sheet;
pub mod claim;
load_models!{ pub mod }

use crate::error::{Error, Result};
use serde::{Serialize, Deserialize};
use std::convert::TryFrom;

load_models!{ pub enum Model }
load_models!{ pub convert Model }

/// The type of change a modification makes to a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Create,
    Update,
    Delete,
}

/// A single change to a single model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    op: Op,
    model: Model,
}

impl Modification {
    pub fn new(op: Op, model: Model) -> Self {
        Self { op, model }
    }

    /// Split this modification into its operation and model.
    pub fn into_pair(self) -> (Op, Model) {
        (self.op, self.model)
    }

    /// Unwrap the model inside this modification, making sure both the
    /// operation and the model type are what we expect. Mostly useful for
    /// testing.
    pub fn expect_op<T: TryFrom<Model, Error = Error>>(self, op: Op) -> Result<T> {
        if self.op != op {
            Err(Error::OpMismatch)?;
        }
        T::try_from(self.model)
    }
}

/// An ordered list of modifications.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifications {
    modifications: Vec<Modification>,
}

impl Modifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list with one modification in it.
    pub fn new_single<T: Into<Model>>(op: Op, model: T) -> Self {
        let mut mods = Self::new();
        mods.push(op, model);
        mods
    }

    pub fn push<T: Into<Model>>(&mut self, op: Op, model: T) {
        self.modifications.push(Modification::new(op, model.into()));
    }

    /// Append another set of modifications onto this one.
    pub fn extend(&mut self, other: Modifications) {
        self.modifications.extend(other.into_vec());
    }

    pub fn len(&self) -> usize {
        self.modifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }

    pub fn into_vec(self) -> Vec<Modification> {
        self.modifications
    }
}
