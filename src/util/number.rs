//! A set of utilities for working with numbers in the resolution engine.

use rust_decimal::prelude::*;

/// Create a decimal literal. Every amount, weight, and ratio in the crate is
/// written through this so the number type can be swapped in one place.
#[macro_export]
macro_rules! num {
    ($($val:tt)+) => {
        rust_decimal_macros::dec!($($val)+)
    }
}

/// Anything at or below this magnitude is treated as zero when checking
/// whether a shortfall, a debt, or a share total has been used up.
pub const EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 12);

/// Test whether a value is zero within [EPSILON](constant.EPSILON.html).
pub fn is_effectively_zero(val: &Decimal) -> bool {
    val.abs() <= EPSILON
}

/// Clamp a value between a lower and upper bound.
pub fn clamp(min: Decimal, val: Decimal, max: Decimal) -> Decimal {
    val.max(min).min(max)
}

/// Compute `part / whole`, clamped to `[0, 1]`. A `whole` that is effectively
/// zero (or negative) yields a proportion of zero.
pub fn proportion(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= EPSILON {
        return Decimal::zero();
    }
    clamp(Decimal::zero(), part / whole, Decimal::one())
}
