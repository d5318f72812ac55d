//! The engine ties the calculators and the configured policy together. Given
//! an institution, it works out the resolution amount and, if there is one,
//! runs the configured policy against it.

use crate::{
    config::ResolutionConfig,
    error::Result,
    models::{
        institution::Institution,
        lib::agent::CentralBankID,
    },
    resolution::{Resolution, ResolutionContext},
    system::{
        central_bank::CentralBank,
        risk_weights::RiskWeightedAssetCalculator,
        shortfall::CapitalShortfallCalculator,
    },
};
use getset::{CopyGetters, Getters};
use rust_decimal::prelude::*;
use tracing::{debug, info};

/// Where an institution stands against its capital requirement.
#[derive(Clone, Copy, Debug, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Assessment {
    equity: Decimal,
    /// Risk-weighted assets
    rwa: Decimal,
    /// How much equity is needed to meet the target CAR (zero if compliant)
    shortfall: Decimal,
}

impl Assessment {
    pub fn is_compliant(&self) -> bool {
        self.shortfall.is_zero()
    }
}

#[derive(Clone, Debug, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct ResolutionEngine {
    config: ResolutionConfig,
    rwa: RiskWeightedAssetCalculator,
    shortfall: CapitalShortfallCalculator,
}

impl ResolutionEngine {
    /// Build an engine, validating the config first.
    pub fn new(config: ResolutionConfig) -> Result<Self> {
        config.validate()?;
        let rwa = RiskWeightedAssetCalculator::new(config.risk_weights().clone())?;
        let shortfall = CapitalShortfallCalculator::new(*config.target_car())?;
        Ok(Self { config, rwa, shortfall })
    }

    /// Measure an institution against the target CAR.
    pub fn assess(&self, institution: &Institution) -> Result<Assessment> {
        let sheet = institution.balance_sheet();
        sheet.validate()?;
        let equity = sheet.equity();
        let rwa = self.rwa.calculate(sheet.assets())?;
        let shortfall = self.shortfall.shortfall(equity, rwa)?;
        debug!(institution = %institution.id(), equity = %equity, rwa = %rwa, shortfall = %shortfall, "institution assessed");
        Ok(Assessment { equity, rwa, shortfall })
    }

    /// Assess an institution and, if it falls short, run the configured
    /// policy on it.
    pub fn resolve(&self, institution: Institution, ctx: &mut ResolutionContext) -> Result<Resolution> {
        let assessment = self.assess(&institution)?;
        if assessment.is_compliant() {
            info!(institution = %institution.id(), "institution meets its capital target, nothing to resolve");
            return Ok(Resolution::compliant(institution));
        }
        ctx.set_intermediary_config(self.config.intermediary().clone());
        self.config.policy().resolve(institution, assessment.shortfall(), ctx)
    }

    /// Build a central bank that lends according to our loan approval
    /// settings.
    pub fn central_bank(&self, id: CentralBankID) -> Result<CentralBank> {
        CentralBank::new(id, self.config.loan_approval().clone(), *self.config.risk_measure())
    }
}
