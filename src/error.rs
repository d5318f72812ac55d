//! Holds our crate-wide error type. Note that running out of liquidity during
//! a resolution episode is *not* an error: it is a regular outcome (see
//! [Outcome](../resolution/enum.Outcome.html)).

use crate::models::institution::InstitutionKind;
use thiserror::Error;

/// Everything that can go wrong when configuring or running the resolution
/// engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A builder failed to build an object
    #[error("error building object {0}")]
    BuilderFailed(String),
    /// A ledger was handed to us in an inconsistent state
    #[error("corrupt ledger: {0}")]
    CorruptLedger(String),
    /// A funding service did not have enough cash on hand
    #[error("insufficient funds")]
    InsufficientFunds,
    /// An amount passed to an operation was out of range (negative, usually)
    #[error("invalid amount: {0}")]
    InvalidAmount(rust_decimal::Decimal),
    /// A configuration value was out of range
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// An intermediary was handed an institution other than the one whose
    /// shares it holds
    #[error("institution {0} did not issue the intermediary's stock")]
    IssuerMismatch(String),
    /// The object being operated on has been deleted
    #[error("the {0} object is deleted")]
    ObjectIsDeleted(String),
    /// A modification carried a different operation than expected
    #[error("operation mismatch")]
    OpMismatch,
    /// A policy was applied to an institution it cannot handle
    #[error("policy does not apply to institutions of kind {0:?}")]
    UnsupportedDebtor(InstitutionKind),
    /// An AgentID was converted to the wrong concrete ID type
    #[error("wrong AgentID type")]
    WrongAgentIDType,
    /// A Model was converted to the wrong concrete model type
    #[error("wrong model type")]
    WrongModelType,
}

pub type Result<T> = std::result::Result<T, Error>;
