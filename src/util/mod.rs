//! A set of utility structs and functions used when operating the core.

#[macro_use]
pub mod number;
pub mod time;

#[cfg(test)]
pub(crate) mod test;
