//! The simplest policy there is: don't try to save the institution, just hand
//! it to the liquidation scheduler.

use crate::{
    error::Result,
    models::institution::Institution,
    resolution::{Outcome, Resolution, ResolutionContext, Stage},
    util::number::EPSILON,
};
use rust_decimal::prelude::*;

pub(crate) fn resolve(institution: Institution, shortfall: Decimal, ctx: &mut ResolutionContext) -> Result<Resolution> {
    if shortfall <= EPSILON {
        return Ok(Resolution::compliant(institution));
    }
    let mut res = Resolution::begin(institution, shortfall);
    res.open_claims();
    res.stage(Stage::Start);
    Ok(res.finish(Outcome::FlaggedForLiquidation, Stage::FlaggedForLiquidation, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::institution::{InstitutionID, InstitutionStatus},
        resolution::ResolutionPolicy,
        system::{market::PriceBook, scheduler::LiquidationQueue},
        util::{self, test::*},
    };
    use rust_decimal_macros::*;

    #[test]
    fn flags_immediately() {
        let now = util::time::now();
        let id = InstitutionID::new("firm");
        let firm = make_firm(&id, &now);
        let mut prices = PriceBook::new();
        let mut queue = LiquidationQueue::new();
        let res = {
            let mut ctx = ResolutionContext::new(&mut prices, &mut queue, &now);
            ResolutionPolicy::Liquidate.resolve(firm.clone(), dec!(5), &mut ctx).unwrap()
        };
        assert_eq!(res.outcome(), &Outcome::FlaggedForLiquidation);
        assert_eq!(res.trace(), &vec![Stage::Start, Stage::FlaggedForLiquidation]);
        assert_eq!(res.institution().balance_sheet(), firm.balance_sheet());
        assert_eq!(res.institution().status(), &InstitutionStatus::FlaggedForLiquidation);
        assert_eq!(res.claims().len(), 2);
        assert_eq!(queue.pending(), &vec![(id, Outcome::FlaggedForLiquidation)]);
    }
}
