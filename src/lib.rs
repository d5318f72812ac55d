//! Welcome to the resolution core. This crate models how an insolvent bank or
//! firm is put back on its feet (or wound down) inside a simulated economy.
//!
//! The pieces fit together like so:
//!
//! - The [engine] measures an institution against a target capital adequacy
//!   ratio and, if it falls short, runs the configured resolution policy.
//! - The [resolution] policies (bail-in, asset-threshold, debt-for-equity
//!   swap, bail-out, liquidation) write down, pay off, or convert the claims on an
//!   institution until it's solvent again, or flag it for liquidation.
//! - The [system] module holds the calculators and the outside parties a
//!   resolution talks to: the central bank, the government, the market, and
//!   the liquidation scheduler.
//! - [transactions] holds the logic for the intermediaries that sell equity
//!   on behalf of creditors who can't hold it.
//!
//! Nothing here persists anything. Operations return the changed models (see
//! [Modifications]) and the caller stores them however it likes.
//!
//! [engine]: engine/index.html
//! [resolution]: resolution/index.html
//! [system]: system/index.html
//! [transactions]: transactions/index.html
//! [Modifications]: models/struct.Modifications.html

/// A macro that standardizes including, exporting, and creating wrapper type(s)
/// for our models.
macro_rules! load_models {
    (
        @pub use
        $( ($path:ident, $model:ident, $($extratypes:ident),*), )*
    ) => {
        pub use models::{
            $( $path::{$model, $($extratypes),*}, )*
        };
    };

    (
        @pub mod
        $( ($path:ident, $($_rest:tt)*), )*
    ) => {
        $(
            pub mod $path;
        )*
    };

    // create an enum that wraps our models
    (
        @pub enum $enumname:ident
        $( ($path:ident, $model:ident, $($_extratypes:ident),*), )*
    ) => {
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub enum $enumname {
            $(
                $model(crate::models::$path::$model),
            )*
        }
    };

    // convert models into the wrapper enum and back out again
    (
        @pub convert $enumname:ident
        $( ($path:ident, $model:ident, $($_extratypes:ident),*), )*
    ) => {
        $(
            impl From<crate::models::$path::$model> for $enumname {
                fn from(model: crate::models::$path::$model) -> Self {
                    $enumname::$model(model)
                }
            }

            impl std::convert::TryFrom<$enumname> for crate::models::$path::$model {
                type Error = crate::error::Error;

                fn try_from(val: $enumname) -> crate::error::Result<Self> {
                    match val {
                        $enumname::$model(model) => Ok(model),
                        _ => Err(crate::error::Error::WrongModelType),
                    }
                }
            }
        )*
    };

    // entry point
    ($($load_type:tt)*) => {
        load_models! {
            @$($load_type)*
            (institution, Institution, InstitutionID, InstitutionKind, InstitutionStatus),
            (intermediary, Intermediary, IntermediaryID),
        }
    };
}

pub mod error;
#[macro_use]
pub mod util;
pub mod models;
pub mod config;
pub mod system;
pub mod resolution;
pub mod transactions;
pub mod engine;

load_models!{ pub use }

