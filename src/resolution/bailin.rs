//! Bail-in: the creditors pay for the bank's recovery.
//!
//! Existing shares are cancelled, then loans are written down pro-rata,
//! then (if that wasn't enough) deposits are written down pro-rata. Everyone
//! who lost something gets a slice of a fresh share issue in proportion to
//! what they lost. If writing down every loan and every deposit still doesn't
//! cover the shortfall, nothing is changed and the bank is flagged for
//! liquidation instead.

use crate::{
    error::Result,
    models::{
        asset::AssetClass,
        institution::{Institution, InstitutionKind},
        lib::agent::AgentID,
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
    util::number::{EPSILON, proportion},
};
use rust_decimal::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Subtract what was recovered from the shortfall, snapping dust to zero.
fn reduce(remaining: Decimal, recovered: Decimal) -> Decimal {
    let left = remaining - recovered;
    if left <= EPSILON {
        Decimal::zero()
    } else {
        left
    }
}

/// Write down one class of liability by a single proportion. Returns how much
/// each creditor lost.
fn write_down<F>(remaining: Decimal, total: Decimal, scale: F) -> BTreeMap<AgentID, Decimal>
    where F: FnOnce(Decimal) -> BTreeMap<AgentID, Decimal>
{
    let p = proportion(remaining, total);
    if p.is_zero() {
        return BTreeMap::new();
    }
    scale(Decimal::one() - p)
}

pub(crate) fn resolve(institution: Institution, shortfall: Decimal, ctx: &mut ResolutionContext) -> Result<Resolution> {
    require_kind(&institution, InstitutionKind::Bank)?;
    if shortfall <= EPSILON {
        return Ok(Resolution::compliant(institution));
    }

    let original = institution.clone();
    let stock = institution.id().clone();
    let self_id: AgentID = stock.clone().into();
    let price = ctx.price(&stock);
    let base = share_base(institution.balance_sheet().total_shares_issued(), &stock);

    let mut res = Resolution::begin(institution, shortfall);
    res.open_claims();
    res.stage(Stage::Start);

    // cancel every share. shares we held in ourselves come off our equity
    // assets, which makes the hole that much deeper.
    let terminated = res.terminate_shares(price);
    let mut remaining = shortfall;
    if let Some(qty) = terminated.get(&self_id) {
        let assets = res.institution.balance_sheet_mut().assets_mut();
        let removed = (*qty * price).min(assets.get_holdings(AssetClass::Equity));
        assets.track_holdings(AssetClass::Equity, -removed);
        remaining += removed;
        res.totals.shortfall += removed;
        debug!(institution = %stock, removed = %removed, "self-held shares removed from assets");
    }
    res.stage(Stage::StocksTerminated);

    let total_loans = res.institution.balance_sheet().liabilities().total_loans();
    let loans_lost = {
        let liabilities = res.institution.balance_sheet_mut().liabilities_mut();
        write_down(remaining, total_loans, |factor| liabilities.scale_loans(factor))
    };
    let recovered: Decimal = loans_lost.values().cloned().sum();
    res.totals.loans_written_down = recovered;
    remaining = reduce(remaining, recovered);
    res.totals.remaining_shortfall = remaining;
    res.stage(Stage::LoansWrittenDown);

    let deposits_lost = if remaining > Decimal::zero() {
        let total_deposits = res.institution.balance_sheet().liabilities().total_deposits();
        let liabilities = res.institution.balance_sheet_mut().liabilities_mut();
        write_down(remaining, total_deposits, |factor| liabilities.scale_deposits(factor))
    } else {
        BTreeMap::new()
    };
    let recovered: Decimal = deposits_lost.values().cloned().sum();
    res.totals.deposits_written_down = recovered;
    remaining = reduce(remaining, recovered);
    res.totals.remaining_shortfall = remaining;
    res.stage(Stage::DepositsWrittenDown);

    if remaining > Decimal::zero() {
        return Ok(res.abandon(original, ctx));
    }

    // tally up everyone's losses. creditors are compensated for what was
    // written down. shareholders who weren't also creditors are compensated
    // for their terminated holdings.
    let mut losses: BTreeMap<(AgentID, IssueBasis), Decimal> = BTreeMap::new();
    for (creditor, lost) in loans_lost.into_iter().chain(deposits_lost.into_iter()) {
        if let Some(claim) = res.claim_mut(&creditor) {
            claim.write_down(lost);
        }
        *losses.entry((creditor, IssueBasis::WriteDown)).or_insert_with(Decimal::zero) += lost;
    }
    let liabilities = original.balance_sheet().liabilities();
    for (holder, qty) in terminated.iter() {
        let lost = *qty * price;
        if holder == &self_id || liabilities.is_creditor(holder) || lost <= EPSILON {
            continue;
        }
        losses.insert((holder.clone(), IssueBasis::TerminatedHolding), lost);
    }

    let total_loss: Decimal = losses.values().cloned().sum();
    for ((creditor, basis), lost) in losses.into_iter() {
        if lost <= Decimal::zero() {
            continue;
        }
        let quantity = base * proportion(lost, total_loss);
        res.issue_shares(&creditor, quantity, lost, basis, ctx)?;
    }
    res.stage(Stage::SharesIssued);

    let new_price = (res.institution.equity() / base).max(Decimal::zero());
    ctx.oracle.set_price(&stock, new_price);
    res.totals.new_share_price = Some(new_price);

    Ok(res.finish(Outcome::Resolved, Stage::Resolved, ctx))
}
