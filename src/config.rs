//! Configuration for a resolution engine. Everything here has a sensible
//! default and can be deserialized, so a caller can load a config from
//! whatever format they like and only override the values they care about.
//!
//! Configs are validated once, when the engine is built. After that the
//! policies themselves don't re-check their parameters.

use crate::{
    error::{Error, Result},
    resolution::ResolutionPolicy,
    system::{
        loan_approval::{LoanApprovalPolicy, RiskMeasure},
        risk_weights::RiskWeightTable,
    },
};
use getset::Getters;
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};

/// How intermediaries spawned during a resolution sell off their holdings.
#[derive(Clone, Debug, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
#[serde(default)]
pub struct IntermediaryConfig {
    /// A holding worth this much or less is sold off entirely and the
    /// intermediary disbands
    asset_value_threshold: Decimal,
    /// Fraction of the holding sold each period
    sell_rate: Decimal,
    /// Share count under which the whole holding is sold at once
    sell_all_below: Decimal,
}

impl Default for IntermediaryConfig {
    fn default() -> Self {
        Self {
            asset_value_threshold: num!(0.000000000001),
            sell_rate: num!(0.2),
            sell_all_below: num!(0.0001),
        }
    }
}

impl IntermediaryConfig {
    pub fn new(asset_value_threshold: Decimal, sell_rate: Decimal, sell_all_below: Decimal) -> Result<Self> {
        let config = Self { asset_value_threshold, sell_rate, sell_all_below };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.asset_value_threshold < Decimal::zero() {
            Err(Error::InvalidConfiguration("negative intermediary asset value threshold".into()))?;
        }
        // a zero rate would never sell anything
        if self.sell_rate <= Decimal::zero() || self.sell_rate > Decimal::one() {
            Err(Error::InvalidConfiguration("intermediary sell rate must be above 0 and at most 1".into()))?;
        }
        if self.sell_all_below < Decimal::zero() {
            Err(Error::InvalidConfiguration("negative intermediary sell-all quantity".into()))?;
        }
        Ok(())
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, Getters, derive_builder::Builder, Serialize, Deserialize)]
#[builder(pattern = "owned", setter(into), default, build_fn(validate = "Self::validate"))]
#[getset(get = "pub")]
#[serde(default)]
pub struct ResolutionConfig {
    /// Weights used to compute risk-weighted assets
    risk_weights: RiskWeightTable,
    /// Target capital adequacy ratio (Basel III minimum is 8%)
    target_car: Decimal,
    intermediary: IntermediaryConfig,
    /// Whether the central bank lends to a struggling institution
    loan_approval: LoanApprovalPolicy,
    risk_measure: RiskMeasure,
    /// The resolution procedure run on non-compliant institutions
    policy: ResolutionPolicy,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            risk_weights: Default::default(),
            target_car: num!(0.08),
            intermediary: Default::default(),
            loan_approval: Default::default(),
            risk_measure: Default::default(),
            policy: Default::default(),
        }
    }
}

impl ResolutionConfig {
    pub fn builder() -> ResolutionConfigBuilder {
        ResolutionConfigBuilder::default()
    }

    /// Check every parameter, returning the first one that's out of range.
    pub fn validate(&self) -> Result<()> {
        self.risk_weights.validate()?;
        if self.target_car < Decimal::zero() {
            Err(Error::InvalidConfiguration("negative target CAR".into()))?;
        }
        self.intermediary.validate()?;
        self.loan_approval.validate()?;
        self.policy.validate()?;
        Ok(())
    }
}

impl ResolutionConfigBuilder {
    /// Run the same checks as [ResolutionConfig::validate] on whatever has
    /// been set so far.
    ///
    /// [ResolutionConfig::validate]: struct.ResolutionConfig.html#method.validate
    fn validate(&self) -> std::result::Result<(), String> {
        let checks = vec![
            self.risk_weights.as_ref().map(|x| x.validate()),
            self.target_car.as_ref().map(|car| {
                if car < &Decimal::zero() {
                    Err(Error::InvalidConfiguration("negative target CAR".into()))
                } else {
                    Ok(())
                }
            }),
            self.intermediary.as_ref().map(|x| x.validate()),
            self.loan_approval.as_ref().map(|x| x.validate()),
            self.policy.as_ref().map(|x| x.validate()),
        ];
        for check in checks.into_iter().flatten() {
            check.map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::asset::AssetClass,
        resolution::asset_threshold::CashCompensation,
    };
    use rust_decimal_macros::*;

    #[test]
    fn defaults() {
        let config = ResolutionConfig::default();
        assert_eq!(config.target_car(), &dec!(0.08));
        assert_eq!(config.policy(), &ResolutionPolicy::Bailin);
        assert_eq!(config.loan_approval(), &LoanApprovalPolicy::AlwaysDeny);
        assert_eq!(config.intermediary().sell_rate(), &dec!(0.2));
        assert_eq!(config.intermediary().sell_all_below(), &dec!(0.0001));
        assert_eq!(config.risk_weights().weight(&AssetClass::Mortgage), dec!(0.5));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn builds() {
        let config = ResolutionConfig::builder()
            .target_car(dec!(0.1))
            .policy(ResolutionPolicy::Bailout)
            .build().unwrap();
        assert_eq!(config.target_car(), &dec!(0.1));
        assert_eq!(config.policy(), &ResolutionPolicy::Bailout);
        assert_eq!(config.intermediary(), &IntermediaryConfig::default());
    }

    #[test]
    fn validates() {
        let res = ResolutionConfig::builder().target_car(dec!(-0.1)).build();
        assert_eq!(res, Err("invalid configuration: negative target CAR".to_string()));

        let res = ResolutionConfig::builder()
            .policy(ResolutionPolicy::AssetThreshold { cash: CashCompensation::CashFraction { fraction: dec!(1.5) } })
            .build();
        assert!(res.is_err());

        let res = ResolutionConfig::builder()
            .loan_approval(LoanApprovalPolicy::RiskBased { threshold: dec!(-1) })
            .build();
        assert!(res.is_err());

        // deserialized configs skip the builder, so they get checked on their own
        let config: ResolutionConfig = serde_json::from_str(r#"{"target_car": -0.5}"#).unwrap();
        assert_eq!(config.validate(), Err(Error::InvalidConfiguration("negative target CAR".into())));

        assert_eq!(IntermediaryConfig::new(dec!(0), dec!(1.2), dec!(0)), Err(Error::InvalidConfiguration("intermediary sell rate must be above 0 and at most 1".into())));
        assert!(IntermediaryConfig::new(dec!(0), dec!(1), dec!(0)).is_ok());
        assert!(IntermediaryConfig::new(dec!(-1), dec!(0.2), dec!(0)).is_err());
        assert!(IntermediaryConfig::new(dec!(0), dec!(0.2), dec!(-1)).is_err());
        assert!(IntermediaryConfig::new(dec!(0), dec!(0.5), dec!(1)).is_ok());
    }

    #[test]
    fn rejects_zero_sell_rate() {
        assert_eq!(IntermediaryConfig::new(dec!(0), dec!(0), dec!(0)), Err(Error::InvalidConfiguration("intermediary sell rate must be above 0 and at most 1".into())));

        let stalled: IntermediaryConfig = serde_json::from_str(r#"{"sell_rate": 0}"#).unwrap();
        let res = ResolutionConfig::builder()
            .intermediary(stalled.clone())
            .build();
        assert_eq!(res, Err("invalid configuration: intermediary sell rate must be above 0 and at most 1".to_string()));

        let config: ResolutionConfig = serde_json::from_str(r#"{"intermediary": {"sell_rate": 0}}"#).unwrap();
        assert!(config.validate().is_err());
        assert_eq!(config.intermediary(), &stalled);
    }

    #[test]
    fn deserializes_partial() {
        let json = r#"{
            "target_car": 0.125,
            "policy": {"type": "asset_threshold"},
            "intermediary": {"sell_rate": 0.5}
        }"#;
        let config: ResolutionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.target_car(), &dec!(0.125));
        assert_eq!(config.policy(), &ResolutionPolicy::AssetThreshold { cash: CashCompensation::AllCash });
        assert_eq!(config.intermediary().sell_rate(), &dec!(0.5));
        assert_eq!(config.intermediary().sell_all_below(), &dec!(0.0001));
        assert_eq!(config.loan_approval(), &LoanApprovalPolicy::AlwaysDeny);

        let config: ResolutionConfig = serde_json::from_str(r#"{"policy": {"type": "debt_equity_swap"}}"#).unwrap();
        assert_eq!(config.policy(), &ResolutionPolicy::DebtEquitySwap);

        let json = r#"{"loan_approval": {"type": "risk_based", "threshold": 0.5}, "policy": {"type": "liquidate"}}"#;
        let config: ResolutionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.loan_approval(), &LoanApprovalPolicy::RiskBased { threshold: dec!(0.5) });
        assert_eq!(config.policy(), &ResolutionPolicy::Liquidate);
    }
}
