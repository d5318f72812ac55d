//! Debt-for-equity swap: the default way a bankrupt firm is put back on its
//! feet.
//!
//! If the firm's cash covers its loans, it pays them all off in full and
//! carries on. If it doesn't, every loan is cancelled along with every share
//! account, and the lenders become the firm's new owners. The new shares
//! (as many as there were before) are split in proportion to what each
//! lender was owed, and priced at the firm's equity once the loans are gone.
//!
//! Only loans take part. A firm whose other liabilities would still leave it
//! under water after the swap is flagged for liquidation instead, untouched.
//! Like the asset-threshold handler, this is only defined for macro firms.

use crate::{
    error::Result,
    models::{
        asset::AssetClass,
        institution::{Institution, InstitutionKind},
    },
    resolution::{
        CashPayment,
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
use tracing::debug;

pub(crate) fn resolve(institution: Institution, shortfall: Decimal, ctx: &mut ResolutionContext) -> Result<Resolution> {
    require_kind(&institution, InstitutionKind::MacroFirm)?;
    let total_loans = institution.balance_sheet().liabilities().total_loans();
    let equity = institution.equity();
    if total_loans <= EPSILON && equity >= Decimal::zero() {
        return Ok(Resolution::compliant(institution));
    }

    let original = institution.clone();
    let mut res = Resolution::begin(institution, shortfall);
    res.open_claims();
    res.stage(Stage::Start);

    if equity + total_loans < Decimal::zero() {
        return Ok(res.abandon(original, ctx));
    }

    let cash = res.institution.balance_sheet().assets().cash();
    if cash >= total_loans && equity >= Decimal::zero() {
        pay_off(&mut res);
        res.totals.remaining_shortfall = Decimal::zero();
        return Ok(res.finish(Outcome::Resolved, Stage::Resolved, ctx));
    }

    swap(&mut res, total_loans, ctx)?;
    res.totals.remaining_shortfall = Decimal::zero();
    Ok(res.finish(Outcome::Resolved, Stage::Resolved, ctx))
}

/// Pay every lender in full out of cash.
fn pay_off(res: &mut Resolution) {
    let loans = res.institution.balance_sheet_mut().liabilities_mut().clear_loans();
    let mut paid = Decimal::zero();
    for (creditor, amount) in loans.into_iter() {
        if let Some(claim) = res.claim_mut(&creditor) {
            claim.write_down(amount);
        }
        res.payments.push(CashPayment { creditor, amount });
        paid += amount;
    }
    res.institution.balance_sheet_mut().assets_mut().track_holdings(AssetClass::Cash, -paid);
    res.totals.cash_paid = paid;
    res.totals.claims_settled = paid;
    res.stage(Stage::CashCompensated);
}

/// Cancel the loans and the shares, then hand the firm to its lenders.
fn swap(res: &mut Resolution, total_loans: Decimal, ctx: &mut ResolutionContext) -> Result<()> {
    let stock = res.institution.id().clone();
    let price = ctx.price(&stock);
    let count = share_base(res.institution.balance_sheet().total_shares_issued(), &stock);

    let loans = res.institution.balance_sheet_mut().liabilities_mut().clear_loans();
    res.totals.loans_written_down = total_loans;
    res.stage(Stage::LoansWrittenDown);

    res.terminate_shares(price);
    res.stage(Stage::StocksTerminated);

    let equity = res.institution.equity().max(Decimal::zero());
    let new_price = equity / count;
    ctx.oracle.set_price(&stock, new_price);
    res.totals.new_share_price = Some(new_price);
    debug!(institution = %stock, loans = %total_loans, equity = %equity, price = %new_price, "loans swapped for equity");

    for (creditor, debt) in loans.into_iter() {
        let quantity = count * proportion(debt, total_loans);
        let value = quantity * new_price;
        res.issue_shares(&creditor, quantity, value, IssueBasis::WriteDown, ctx)?;
        if let Some(claim) = res.claim_mut(&creditor) {
            claim.write_down(debt);
        }
        let settled = value.min(debt);
        res.totals.claims_settled += settled;
        res.totals.debt_forgiven += debt - settled;
        res.totals.surplus_to_creditors += value - settled;
        res.totals.equity_value_delivered += value;
    }
    res.stage(Stage::SharesIssued);
    Ok(())
}
