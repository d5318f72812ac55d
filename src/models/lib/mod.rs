#[macro_use]
pub mod ledger_model;
pub mod agent;
