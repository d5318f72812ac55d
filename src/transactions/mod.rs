//! Transactions take the models they operate on (which must be passed in) and
//! return a list of modifications that the caller is responsible for applying
//! to whatever storage medium they are using.
//!
//! The logic all lives here (and in some cases the models) but storage
//! happens somewhere else and we don't touch it. Any storage system that can
//! hold our models can be used without coupling it to the resolution logic.

pub mod intermediary;

