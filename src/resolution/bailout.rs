//! Bail-out: the government covers the shortfall in cash and takes the bank's
//! equity in return. Existing shareholders are wiped out, but creditors are
//! left whole. If the government can't (or won't) pay, the bank is flagged for
//! liquidation and left as it was.

use crate::{
    error::{Error, Result},
    models::{
        asset::AssetClass,
        institution::{Institution, InstitutionKind},
        lib::agent::{Agent, AgentID},
    },
    resolution::{
        IssueBasis,
        Outcome,
        Resolution,
        ResolutionContext,
        Stage,
        require_kind,
        share_base,
    },
    util::number::EPSILON,
};
use rust_decimal::prelude::*;
use tracing::warn;

pub(crate) fn resolve(institution: Institution, shortfall: Decimal, ctx: &mut ResolutionContext) -> Result<Resolution> {
    require_kind(&institution, InstitutionKind::Bank)?;
    if shortfall <= EPSILON {
        return Ok(Resolution::compliant(institution));
    }

    let original = institution.clone();
    let stock = institution.id().clone();
    let price = ctx.price(&stock);
    let base = share_base(institution.balance_sheet().total_shares_issued(), &stock);

    let mut res = Resolution::begin(institution, shortfall);
    res.open_claims();
    res.stage(Stage::Start);
    res.terminate_shares(price);
    res.stage(Stage::StocksTerminated);

    let funding = match ctx.government.as_mut() {
        Some(government) => {
            match government.fund(shortfall) {
                Ok(amount) => Some((government.agent_id(), amount)),
                Err(Error::InsufficientFunds) => None,
                Err(e) => Err(e)?,
            }
        }
        None => {
            warn!(institution = %stock, "no government available to fund a bail-out");
            None
        }
    };
    let (government, amount): (AgentID, Decimal) = match funding {
        Some(funding) => funding,
        None => return Ok(res.abandon(original, ctx)),
    };
    res.institution.balance_sheet_mut().assets_mut().track_holdings(AssetClass::Cash, amount);
    res.totals.government_funding = amount;
    res.totals.remaining_shortfall = Decimal::zero();
    res.stage(Stage::GovernmentFunded);

    res.issue_shares(&government, base, amount, IssueBasis::Funding, ctx)?;
    res.stage(Stage::SharesIssued);

    let new_price = (res.institution.equity() / base).max(Decimal::zero());
    ctx.oracle.set_price(&stock, new_price);
    res.totals.new_share_price = Some(new_price);

    Ok(res.finish(Outcome::Resolved, Stage::Resolved, ctx))
}
