//! Services and collaborators that live alongside the resolution engine: the
//! calculators that size a shortfall, the lender of last resort, the
//! government, and the interfaces to the market and the liquidation
//! scheduler.
//!
//! Services that only exist once per simulation run (the central bank, the
//! government) are plain values created by the caller and passed in where
//! they're needed.

pub mod central_bank;
pub mod government;
pub mod loan_approval;
pub mod market;
pub mod risk_weights;
pub mod scheduler;
pub mod shortfall;
