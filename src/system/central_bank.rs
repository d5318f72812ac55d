//! The central bank is the lender of last resort: before an institution is
//! resolved, it may ask the central bank for an uncollateralized cash
//! injection loan. Whether it gets one depends on the bank's approval policy.
//!
//! Like the government, there is exactly one of these per simulation run and
//! it is passed around explicitly.

use chrono::{DateTime, Utc};
use crate::{
    error::{Error, Result},
    models::{
        Modifications,
        Op,
        asset::AssetClass,
        institution::{Institution, InstitutionID},
        lib::agent::{Agent, AgentID, CentralBankID},
    },
    system::loan_approval::{LoanApprovalPolicy, RiskMeasure},
};
use getset::Getters;
use rust_decimal::prelude::*;
use std::collections::BTreeMap;
use tracing::info;

/// Why a loan was turned down
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Denial {
    /// The approval policy said no
    Policy,
    /// The institution already has a cash injection loan outstanding
    Outstanding,
}

/// The answer to a cash injection request
#[derive(Clone, Debug, PartialEq)]
pub enum LoanDecision {
    /// The loan was made. The modifications hold the updated borrower.
    Approved(Modifications),
    Denied(Denial),
}

#[derive(Clone, Debug, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct CentralBank {
    id: CentralBankID,
    policy: LoanApprovalPolicy,
    measure: RiskMeasure,
    /// Cash injection loans we've made that haven't been settled
    outstanding: BTreeMap<InstitutionID, Decimal>,
}

impl CentralBank {
    pub fn new(id: CentralBankID, policy: LoanApprovalPolicy, measure: RiskMeasure) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            id,
            policy,
            measure,
            outstanding: BTreeMap::new(),
        })
    }

    /// Would we lend to this institution right now?
    pub fn assess(&self, institution: &Institution) -> std::result::Result<Decimal, Denial> {
        if self.outstanding.contains_key(institution.id()) {
            return Err(Denial::Outstanding);
        }
        let risk = self.measure.measure(institution.balance_sheet());
        if self.policy.approve(risk) {
            Ok(risk)
        } else {
            Err(Denial::Policy)
        }
    }

    /// Ask for an uncollateralized cash injection. On approval, the borrower
    /// gets the cash as an asset and owes us a loan of the same value.
    pub fn request_cash_injection(&mut self, mut institution: Institution, amount: Decimal, now: &DateTime<Utc>) -> Result<LoanDecision> {
        if amount <= Decimal::zero() {
            Err(Error::InvalidAmount(amount))?;
        }
        if institution.is_deleted() {
            Err(Error::ObjectIsDeleted("institution".into()))?;
        }
        let risk = match self.assess(&institution) {
            Ok(risk) => risk,
            Err(denial) => {
                info!(institution = %institution.id(), amount = %amount, reason = ?denial, "cash injection loan denied");
                return Ok(LoanDecision::Denied(denial));
            }
        };
        let lender: AgentID = self.agent_id();
        {
            let sheet = institution.balance_sheet_mut();
            sheet.assets_mut().track_holdings(AssetClass::Cash, amount);
            sheet.liabilities_mut().track_loans(lender, amount);
        }
        institution.set_updated(now.clone());
        self.outstanding.insert(institution.id().clone(), amount);
        info!(institution = %institution.id(), amount = %amount, risk = %risk, "cash injection loan approved");
        Ok(LoanDecision::Approved(Modifications::new_single(Op::Update, institution)))
    }

    /// Mark an institution's cash injection loan as settled, allowing it to
    /// borrow again. Returns the amount that was outstanding.
    pub fn settle(&mut self, institution_id: &InstitutionID) -> Option<Decimal> {
        self.outstanding.remove(institution_id)
    }
}

impl Agent for CentralBank {
    fn agent_id(&self) -> AgentID {
        self.id.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{self, test::*};
    use rust_decimal_macros::*;

    fn lender(policy: LoanApprovalPolicy) -> CentralBank {
        CentralBank::new(CentralBankID::new("cb"), policy, RiskMeasure::SimpleLeverage).unwrap()
    }

    #[test]
    fn denies_by_default() {
        let now = util::time::now();
        let bank = make_healthy_bank(&InstitutionID::new("bank"), &now);
        let mut cb = lender(LoanApprovalPolicy::default());
        let res = cb.request_cash_injection(bank, dec!(10), &now).unwrap();
        assert_eq!(res, LoanDecision::Denied(Denial::Policy));
        assert!(cb.outstanding().is_empty());
    }

    #[test]
    fn lends_when_risk_is_low() {
        let now = util::time::now();
        let bank = make_healthy_bank(&InstitutionID::new("bank"), &now);
        let leverage = RiskMeasure::SimpleLeverage.measure(bank.balance_sheet());
        let mut cb = lender(LoanApprovalPolicy::RiskBased { threshold: leverage });
        let equity = bank.equity();

        let mods = match cb.request_cash_injection(bank.clone(), dec!(10), &now).unwrap() {
            LoanDecision::Approved(mods) => mods.into_vec(),
            other => panic!("expected approval, got {:?}", other),
        };
        let borrower = mods[0].clone().expect_op::<Institution>(Op::Update).unwrap();
        assert_eq!(borrower.balance_sheet().assets().cash(), bank.balance_sheet().assets().cash() + dec!(10));
        assert_eq!(borrower.balance_sheet().liabilities().get_loans(CentralBankID::new("cb")), dec!(10));
        assert_eq!(borrower.equity(), equity);
        assert_eq!(cb.outstanding().get(bank.id()), Some(&dec!(10)));

        // one at a time
        let res = cb.request_cash_injection(bank.clone(), dec!(10), &now).unwrap();
        assert_eq!(res, LoanDecision::Denied(Denial::Outstanding));
        assert_eq!(cb.settle(bank.id()), Some(dec!(10)));
        assert!(cb.assess(&bank).is_ok());
    }

    #[test]
    fn rejects_bad_requests() {
        let now = util::time::now();
        let mut bank = make_healthy_bank(&InstitutionID::new("bank"), &now);
        let mut cb = lender(LoanApprovalPolicy::RiskBased { threshold: Decimal::MAX });
        assert_eq!(cb.request_cash_injection(bank.clone(), dec!(0), &now), Err(Error::InvalidAmount(dec!(0))));
        bank.set_deleted(Some(now.clone()));
        assert_eq!(cb.request_cash_injection(bank, dec!(5), &now), Err(Error::ObjectIsDeleted("institution".into())));
        assert_eq!(
            CentralBank::new(CentralBankID::new("cb"), LoanApprovalPolicy::RiskBased { threshold: dec!(-1) }, RiskMeasure::SimpleLeverage),
            Err(Error::InvalidConfiguration("negative loan approval threshold".into())),
        );
    }
}
