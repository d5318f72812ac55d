//! Intermediaries sell the shares they hold on behalf of their beneficiary a
//! little at a time, forwarding whatever they raise. Each call to [review]
//! is one period of that process. Once the holding is worth next to nothing,
//! the intermediary sells the rest and disbands.
//!
//! The issuing institution is passed in alongside the intermediary so its
//! share registry follows every sale. Both come back in the returned
//! modifications: the intermediary first, then the issuer.
//!
//! [review]: fn.review.html

use chrono::{DateTime, Utc};
use crate::{
    config::IntermediaryConfig,
    error::{Error, Result},
    models::{
        Modifications,
        Op,
        institution::{Institution, InstitutionID},
        intermediary::{Intermediary, IntermediaryID},
        lib::agent::AgentID,
    },
    system::market::ShareMarket,
};
use getset::{CopyGetters, Getters};
use rust_decimal::prelude::*;
use tracing::{debug, info, warn};

/// What happened to an intermediary during one period.
#[derive(Clone, Debug, PartialEq, Getters, CopyGetters)]
pub struct Forwarding {
    /// Who the proceeds go to
    #[getset(get = "pub")]
    beneficiary: AgentID,
    /// Shares sold this period
    #[getset(get_copy = "pub")]
    sold: Decimal,
    /// Cash raised (and forwarded) this period
    #[getset(get_copy = "pub")]
    proceeds: Decimal,
    /// What the remaining holding is worth at the current price
    #[getset(get_copy = "pub")]
    residual_value: Decimal,
    /// Shares the market wouldn't take when disbanding, removed from the
    /// issuer's registry without compensation
    #[getset(get_copy = "pub")]
    written_off: Decimal,
    #[getset(get_copy = "pub")]
    disbanded: bool,
}

/// Build a new intermediary holding `shares` of `stock` for `beneficiary`.
pub(crate) fn build(beneficiary: AgentID, stock: InstitutionID, shares: Decimal, config: &IntermediaryConfig, now: &DateTime<Utc>) -> Result<Intermediary> {
    Intermediary::builder()
        .id(IntermediaryID::create())
        .beneficiary(beneficiary)
        .stock(stock)
        .shares(shares)
        .asset_value_threshold(*config.asset_value_threshold())
        .sell_rate(*config.sell_rate())
        .sell_all_below(*config.sell_all_below())
        .active(true)
        .created(now.clone())
        .updated(now.clone())
        .build()
        .map_err(|e| Error::BuilderFailed(e))
}

/// Create an intermediary for a beneficiary that can't hold equity itself.
pub fn create(beneficiary: AgentID, stock: InstitutionID, shares: Decimal, config: &IntermediaryConfig, now: &DateTime<Utc>) -> Result<Modifications> {
    if shares < Decimal::zero() {
        Err(Error::InvalidAmount(shares))?;
    }
    config.validate()?;
    let model = build(beneficiary, stock, shares, config, now)?;
    Ok(Modifications::new_single(Op::Create, model))
}

/// Make sure we're working on a live intermediary and the institution whose
/// shares it holds.
fn check_issuer(subject: &Intermediary, issuer: &Institution) -> Result<()> {
    if subject.is_deleted() {
        Err(Error::ObjectIsDeleted("intermediary".into()))?;
    }
    if issuer.id() != subject.stock() {
        Err(Error::IssuerMismatch(issuer.id().to_string()))?;
    }
    Ok(())
}

/// Move sold shares out of the intermediary's account in the issuer's
/// registry: to the market's buyer if it names one, otherwise out of
/// circulation.
fn settle<M: ShareMarket>(subject: &Intermediary, issuer: &mut Institution, market: &M, sold: Decimal) -> Decimal {
    let holder: AgentID = subject.id().clone().into();
    let shares = issuer.balance_sheet_mut().shares_mut();
    match market.buyer(subject.stock()) {
        Some(buyer) => shares.transfer(&holder, &buyer, sold),
        None => shares.retire(&holder, sold),
    }
}

fn modifications(op: Op, subject: Intermediary, issuer: Institution) -> Modifications {
    let mut mods = Modifications::new_single(op, subject);
    mods.push(Op::Update, issuer);
    mods
}

/// Run one period: sell part of the holding, forward the proceeds, and
/// disband if what's left is worth no more than our threshold.
pub fn review<M: ShareMarket>(mut subject: Intermediary, mut issuer: Institution, market: &mut M, now: &DateTime<Utc>) -> Result<(Modifications, Forwarding)> {
    check_issuer(&subject, &issuer)?;
    let price = market.price(subject.stock()).unwrap_or(Decimal::zero());
    if subject.holding_value(price) <= *subject.asset_value_threshold() {
        return disband(subject, issuer, market, now);
    }

    let held = *subject.shares();
    let to_sell = if held < *subject.sell_all_below() {
        held
    } else {
        held * *subject.sell_rate()
    };
    let sale = market.sell(subject.id(), subject.stock(), to_sell)?;
    let sold = sale.quantity().min(held);
    settle(&subject, &mut issuer, market, sold);
    issuer.set_updated(now.clone());
    subject.set_shares(held - sold);
    subject.set_forwarded(*subject.forwarded() + sale.proceeds());
    subject.set_updated(now.clone());
    let residual_value = subject.holding_value(price);
    debug!(intermediary = %subject.id(), sold = %sold, proceeds = %sale.proceeds(), residual = %residual_value, "intermediary sold shares");

    if residual_value <= *subject.asset_value_threshold() {
        let (mods, last) = disband(subject, issuer, market, now)?;
        let forwarding = Forwarding {
            beneficiary: last.beneficiary,
            sold: sold + last.sold,
            proceeds: sale.proceeds() + last.proceeds,
            residual_value: last.residual_value,
            written_off: last.written_off,
            disbanded: true,
        };
        return Ok((mods, forwarding));
    }

    let forwarding = Forwarding {
        beneficiary: subject.beneficiary().clone(),
        sold,
        proceeds: sale.proceeds(),
        residual_value,
        written_off: Decimal::zero(),
        disbanded: false,
    };
    Ok((modifications(Op::Update, subject, issuer), forwarding))
}

/// Sell whatever's left, forward it, and shut the intermediary down. Any
/// shares the market wouldn't take are written off the issuer's registry.
pub fn disband<M: ShareMarket>(mut subject: Intermediary, mut issuer: Institution, market: &mut M, now: &DateTime<Utc>) -> Result<(Modifications, Forwarding)> {
    check_issuer(&subject, &issuer)?;
    let held = *subject.shares();
    let sale = if held > Decimal::zero() {
        market.sell(subject.id(), subject.stock(), held)?
    } else {
        Default::default()
    };
    let sold = sale.quantity().min(held);
    settle(&subject, &mut issuer, market, sold);
    let holder: AgentID = subject.id().clone().into();
    let left = issuer.balance_sheet().shares().get_holders(holder.clone());
    let written_off = issuer.balance_sheet_mut().shares_mut().retire(&holder, left);
    if written_off > Decimal::zero() {
        warn!(intermediary = %subject.id(), stock = %subject.stock(), written_off = %written_off, "unsold shares written off");
    }
    issuer.set_updated(now.clone());

    subject.set_shares(Decimal::zero());
    subject.set_forwarded(*subject.forwarded() + sale.proceeds());
    subject.set_active(false);
    subject.set_updated(now.clone());
    subject.set_deleted(Some(now.clone()));
    info!(intermediary = %subject.id(), beneficiary = %subject.beneficiary(), forwarded = %subject.forwarded(), "intermediary disbanded");
    let forwarding = Forwarding {
        beneficiary: subject.beneficiary().clone(),
        sold,
        proceeds: sale.proceeds(),
        residual_value: Decimal::zero(),
        written_off,
        disbanded: true,
    };
    Ok((modifications(Op::Delete, subject, issuer), forwarding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::lib::agent::{FundID, HouseholdID},
        resolution::{Outcome, ResolutionContext, ResolutionPolicy},
        system::{
            market::{FixedPriceMarket, PriceBook, PriceOracle},
            scheduler::LiquidationQueue,
        },
        util::{self, number::EPSILON, test::*},
    };
    use rust_decimal_macros::*;
    use std::convert::TryFrom;

    fn market(price: Decimal) -> FixedPriceMarket {
        let mut prices = PriceBook::new();
        prices.set_price(&InstitutionID::new("bank"), price);
        FixedPriceMarket::new(prices)
    }

    /// The bank whose shares the steward holds, with `held` of them in the
    /// steward's account next to the 100 the funds own.
    fn issuer(held: Decimal, now: &DateTime<Utc>) -> Institution {
        let mut bank = make_bank(&InstitutionID::new("bank"), now);
        bank.balance_sheet_mut().shares_mut().issue(IntermediaryID::new("steward"), held);
        bank
    }

    fn steward(held: Decimal, now: &DateTime<Utc>) -> Intermediary {
        make_intermediary(&IntermediaryID::new("steward"), &HouseholdID::new("jerry").into(), &InstitutionID::new("bank"), held, now)
    }

    fn unpack(mods: Modifications) -> (Op, Intermediary, Institution) {
        let mut mods = mods.into_vec();
        assert_eq!(mods.len(), 2);
        let issuer = mods.remove(1).expect_op::<Institution>(Op::Update).unwrap();
        let (op, model) = mods.remove(0).into_pair();
        (op, Intermediary::try_from(model).unwrap(), issuer)
    }

    fn steward_shares(issuer: &Institution) -> Decimal {
        issuer.balance_sheet().shares().get_holders(IntermediaryID::new("steward"))
    }

    #[test]
    fn can_create() {
        let now = util::time::now();
        let jerry: AgentID = HouseholdID::new("jerry").into();
        let config = IntermediaryConfig::default();
        let mods = create(jerry.clone(), InstitutionID::new("bank"), dec!(40), &config, &now).unwrap().into_vec();
        assert_eq!(mods.len(), 1);
        let intermediary = mods[0].clone().expect_op::<Intermediary>(Op::Create).unwrap();
        assert_eq!(intermediary.beneficiary(), &jerry);
        assert_eq!(intermediary.shares(), &dec!(40));
        assert_eq!(intermediary.sell_rate(), &dec!(0.2));
        assert_eq!(intermediary.asset_value_threshold(), &dec!(0.000000000001));
        assert!(intermediary.is_active());

        let res = create(jerry, InstitutionID::new("bank"), dec!(-1), &config, &now);
        assert_eq!(res, Err(Error::InvalidAmount(dec!(-1))));
    }

    #[test]
    fn sells_gradually() {
        let now = util::time::now();
        let mut market = market(dec!(2));

        let (mods, forwarding) = review(steward(dec!(100), &now), issuer(dec!(100), &now), &mut market, &now).unwrap();
        assert_eq!(forwarding.sold(), dec!(20));
        assert_eq!(forwarding.proceeds(), dec!(40));
        assert_eq!(forwarding.residual_value(), dec!(160));
        assert_eq!(forwarding.written_off(), dec!(0));
        assert!(!forwarding.disbanded());
        let (op, intermediary, bank) = unpack(mods);
        assert_eq!(op, Op::Update);
        assert_eq!(intermediary.shares(), &dec!(80));
        assert_eq!(intermediary.forwarded(), &dec!(40));
        // no buyer, so the sold shares leave circulation
        assert_eq!(steward_shares(&bank), dec!(80));
        assert_eq!(bank.balance_sheet().shares().total_issued(), dec!(180));

        let (mods, forwarding) = review(intermediary, bank, &mut market, &now).unwrap();
        assert_eq!(forwarding.sold(), dec!(16));
        let (_, intermediary, bank) = unpack(mods);
        assert_eq!(intermediary.shares(), &dec!(64));
        assert_eq!(intermediary.forwarded(), &dec!(72));
        assert_eq!(steward_shares(&bank), dec!(64));
    }

    #[test]
    fn hands_shares_to_buyer() {
        let now = util::time::now();
        let mut market = market(dec!(2)).with_buyer(FundID::new("vulture"));
        let (mods, _) = review(steward(dec!(100), &now), issuer(dec!(100), &now), &mut market, &now).unwrap();
        let (_, _, bank) = unpack(mods);
        let shares = bank.balance_sheet().shares();
        assert_eq!(shares.get_holders(FundID::new("vulture")), dec!(20));
        assert_eq!(steward_shares(&bank), dec!(80));
        assert_eq!(shares.total_issued(), dec!(200));
    }

    #[test]
    fn sells_everything_when_small() {
        let now = util::time::now();
        let mut market = market(dec!(2));
        let (mods, forwarding) = review(steward(dec!(0.00005), &now), issuer(dec!(0.00005), &now), &mut market, &now).unwrap();
        assert_eq!(forwarding.sold(), dec!(0.00005));
        assert_eq!(forwarding.proceeds(), dec!(0.0001));
        assert!(forwarding.disbanded());
        let (op, intermediary, bank) = unpack(mods);
        assert_eq!(op, Op::Delete);
        assert_eq!(intermediary.shares(), &dec!(0));
        assert!(intermediary.is_deleted());
        assert!(!bank.balance_sheet().shares().holders().contains_key(&AgentID::from(IntermediaryID::new("steward"))));
        assert_eq!(bank.balance_sheet().shares().total_issued(), dec!(100));
    }

    #[test]
    fn disbands_below_threshold() {
        let now = util::time::now();
        // worthless stock
        let mut market = market(dec!(0));
        let (mods, forwarding) = review(steward(dec!(100), &now), issuer(dec!(100), &now), &mut market, &now).unwrap();
        assert!(forwarding.disbanded());
        assert_eq!(forwarding.proceeds(), dec!(0));
        let (op, intermediary, bank) = unpack(mods);
        assert_eq!(op, Op::Delete);
        assert_eq!(intermediary.shares(), &dec!(0));
        assert_eq!(steward_shares(&bank), dec!(0));

        let res = review(intermediary.clone(), bank.clone(), &mut market, &now);
        assert_eq!(res, Err(Error::ObjectIsDeleted("intermediary".into())));
        let res = disband(intermediary, bank, &mut market, &now);
        assert_eq!(res, Err(Error::ObjectIsDeleted("intermediary".into())));
    }

    #[test]
    fn writes_off_unsold_shares() {
        let now = util::time::now();
        let mut prices = PriceBook::new();
        prices.set_price(&InstitutionID::new("bank"), dec!(2));
        let mut market = FixedPriceMarket::with_depth(prices, dec!(30)).unwrap().with_buyer(FundID::new("vulture"));
        let (mods, forwarding) = disband(steward(dec!(100), &now), issuer(dec!(100), &now), &mut market, &now).unwrap();
        assert_eq!(forwarding.sold(), dec!(30));
        assert_eq!(forwarding.proceeds(), dec!(60));
        assert_eq!(forwarding.written_off(), dec!(70));
        let (_, intermediary, bank) = unpack(mods);
        assert_eq!(intermediary.forwarded(), &dec!(60));
        let shares = bank.balance_sheet().shares();
        assert_eq!(shares.get_holders(FundID::new("vulture")), dec!(30));
        assert_eq!(steward_shares(&bank), dec!(0));
        assert_eq!(shares.total_issued(), dec!(130));
    }

    #[test]
    fn checks_issuer() {
        let now = util::time::now();
        let mut market = market(dec!(2));
        let other = make_bank(&InstitutionID::new("other"), &now);
        let res = review(steward(dec!(100), &now), other.clone(), &mut market, &now);
        assert_eq!(res, Err(Error::IssuerMismatch("other".into())));
        let res = disband(steward(dec!(100), &now), other, &mut market, &now);
        assert_eq!(res, Err(Error::IssuerMismatch("other".into())));
    }

    #[test]
    fn always_terminates() {
        let now = util::time::now();
        let mut intermediary = steward(dec!(1000), &now);
        let mut bank = issuer(dec!(1000), &now);
        let mut market = market(dec!(1));
        let mut forwarded = dec!(0);
        let mut periods = 0;
        loop {
            periods += 1;
            assert!(periods < 200);
            let (mods, forwarding) = review(intermediary, bank, &mut market, &now).unwrap();
            forwarded += forwarding.proceeds();
            let (op, next, updated) = unpack(mods);
            intermediary = next;
            bank = updated;
            assert_eq!(steward_shares(&bank), *intermediary.shares());
            if op == Op::Delete {
                break;
            }
        }
        assert!((forwarded - dec!(1000)).abs() <= EPSILON);
        assert!((*intermediary.forwarded() - dec!(1000)).abs() <= EPSILON);
        assert_eq!(steward_shares(&bank), dec!(0));
        assert!((bank.balance_sheet().shares().total_issued() - dec!(100)).abs() <= EPSILON);
    }

    #[test]
    fn disbands_after_bailin() {
        let now = util::time::now();
        let id = InstitutionID::new("bank");
        let mut prices = PriceBook::new();
        prices.set_price(&id, dec!(1));
        let mut queue = LiquidationQueue::new();
        let res = {
            let mut ctx = ResolutionContext::new(&mut prices, &mut queue, &now);
            ResolutionPolicy::Bailin.resolve(make_bank(&id, &now), dec!(180), &mut ctx).unwrap()
        };
        assert_eq!(res.outcome(), &Outcome::Resolved);
        // jerry and larry lost deposits and can't hold the shares they got
        assert_eq!(res.intermediaries().len(), 2);

        let mut bank = res.institution().clone();
        let outstanding = bank.balance_sheet().shares().total_issued();
        let mut market = FixedPriceMarket::new(prices.clone()).with_buyer(FundID::new("vulture"));
        let mut delivered = dec!(0);
        for intermediary in res.intermediaries() {
            let holder: AgentID = intermediary.id().clone().into();
            let held = *intermediary.shares();
            assert_eq!(bank.balance_sheet().shares().get_holders(holder.clone()), held);
            let (mods, forwarding) = disband(intermediary.clone(), bank, &mut market, &now).unwrap();
            assert_eq!(forwarding.sold(), held);
            assert_eq!(forwarding.written_off(), dec!(0));
            let (op, gone, updated) = unpack(mods);
            assert_eq!(op, Op::Delete);
            assert!(gone.is_deleted());
            assert_eq!(updated.balance_sheet().shares().get_holders(holder), dec!(0));
            delivered += held;
            bank = updated;
        }

        let shares = bank.balance_sheet().shares();
        assert!(shares.holders().keys().all(|holder| match holder {
            AgentID::IntermediaryID(_) => false,
            _ => true,
        }));
        assert_eq!(shares.get_holders(FundID::new("vulture")), delivered);
        assert!((shares.total_issued() - outstanding).abs() <= EPSILON);
    }
}
