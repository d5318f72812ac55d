//! The asset-threshold handler deals with a firm that can't pay its debts.
//!
//! First the firm pays what it can in cash, pro-rata. If debt remains and the
//! shareholders who aren't creditors hold enough value, shares are taken
//! from them and handed to the creditors to cover what's left. Failing that,
//! the firm is liquidated: every share and every debt is cancelled and the
//! creditors become the new owners, in proportion to what they were owed.
//!
//! This handler is only defined for macro firms. Running it on anything else
//! fails with `UnsupportedDebtor` and leaves the institution alone.

use crate::{
    error::{Error, Result},
    models::{
        asset::{AssetBook, AssetClass},
        institution::{Institution, InstitutionKind},
        lib::agent::AgentID,
    },
    resolution::{
        CashPayment,
        IssueBasis,
        Outcome,
        Resolution,
        ResolutionContext,
        ShareTransfer,
        Stage,
        require_kind,
        share_base,
    },
    util::number::EPSILON,
};
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How much of a firm's cash can go towards paying off creditors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CashCompensation {
    /// Every bit of cash on hand
    AllCash,
    /// Some fraction of the cash on hand
    CashFraction {
        fraction: Decimal,
    },
}

impl Default for CashCompensation {
    fn default() -> Self {
        CashCompensation::AllCash
    }
}

impl CashCompensation {
    pub fn validate(&self) -> Result<()> {
        match self {
            CashCompensation::CashFraction { fraction } if *fraction < Decimal::zero() || *fraction > Decimal::one() => {
                Err(Error::InvalidConfiguration("cash compensation fraction must be between 0 and 1".into()))
            }
            _ => Ok(()),
        }
    }

    /// The cash available to pay creditors out of these assets
    pub fn available(&self, assets: &AssetBook) -> Decimal {
        match self {
            CashCompensation::AllCash => assets.cash(),
            CashCompensation::CashFraction { fraction } => assets.cash() * *fraction,
        }
    }
}

pub(crate) fn resolve(institution: Institution, shortfall: Decimal, cash: &CashCompensation, ctx: &mut ResolutionContext) -> Result<Resolution> {
    require_kind(&institution, InstitutionKind::MacroFirm)?;
    cash.validate()?;
    let stock = institution.id().clone();
    let total_debt = institution.balance_sheet().total_liabilities();
    if total_debt <= EPSILON {
        return Ok(Resolution::compliant(institution));
    }

    let mut res = Resolution::begin(institution, shortfall);
    res.open_claims();
    res.stage(Stage::Start);

    // pay what we can, pro-rata
    let cash_on_hand = res.institution.balance_sheet().assets().cash();
    let available = cash.available(res.institution.balance_sheet().assets()).min(total_debt);
    let owed = res.institution.balance_sheet().liabilities().by_creditor();
    let mut paid_total = Decimal::zero();
    if available > Decimal::zero() {
        for (creditor, liability) in owed.iter() {
            let amount = ((available * liability.total()) / total_debt).min(liability.total());
            if amount.is_zero() {
                continue;
            }
            let from_loans = amount.min(liability.loan_value());
            let liabilities = res.institution.balance_sheet_mut().liabilities_mut();
            liabilities.track_loans(creditor.clone(), -from_loans);
            liabilities.track_deposits(creditor.clone(), -(amount - from_loans));
            if let Some(claim) = res.claim_mut(creditor) {
                claim.write_down(amount);
            }
            res.payments.push(CashPayment { creditor: creditor.clone(), amount });
            paid_total += amount;
        }
    }
    res.institution.balance_sheet_mut().assets_mut().track_holdings(AssetClass::Cash, -paid_total.min(cash_on_hand));
    res.totals.cash_paid = paid_total;
    res.totals.claims_settled = paid_total;
    res.stage(Stage::CashCompensated);

    let debts: BTreeMap<AgentID, Decimal> = res.claims.iter()
        .map(|c| (c.creditor().clone(), c.remaining()))
        .filter(|(_, d)| *d > Decimal::zero())
        .collect();
    let remaining_debt: Decimal = debts.values().cloned().sum();
    if remaining_debt <= EPSILON {
        settle_dust(&mut res);
        return Ok(res.finish(Outcome::Resolved, Stage::Resolved, ctx));
    }

    let price = ctx.price(&stock);
    let non_creditors: BTreeMap<AgentID, Decimal> = res.institution.balance_sheet().shares().holders().iter()
        .filter(|(holder, _)| !res.claims.iter().any(|c| c.creditor() == *holder))
        .map(|(holder, qty)| (holder.clone(), *qty))
        .collect();
    let non_creditor_value = non_creditors.values().cloned().sum::<Decimal>() * price;
    debug!(institution = %stock, remaining_debt = %remaining_debt, non_creditor_value = %non_creditor_value, "cash compensation done");

    if non_creditor_value > EPSILON && non_creditor_value >= remaining_debt {
        redistribute(&mut res, &debts, remaining_debt, &non_creditors, non_creditor_value, price, ctx)?;
        res.stage(Stage::StockRedistributed);
        return Ok(res.finish(Outcome::Resolved, Stage::Resolved, ctx));
    }

    liquidate(&mut res, &debts, remaining_debt, price, ctx)?;
    Ok(res.finish(Outcome::Liquidated, Stage::Liquidated, ctx))
}

/// Clear out any liability left over from rounding after full payment.
fn settle_dust(res: &mut Resolution) {
    let liabilities = res.institution.balance_sheet_mut().liabilities_mut();
    liabilities.clear_loans();
    liabilities.clear_deposits();
}

/// Take a fraction of every non-creditor's shares and give them to the
/// creditors, each creditor getting shares in proportion to what they're
/// still owed. The debts are cancelled in exchange.
fn redistribute(res: &mut Resolution, debts: &BTreeMap<AgentID, Decimal>, remaining_debt: Decimal, non_creditors: &BTreeMap<AgentID, Decimal>, non_creditor_value: Decimal, price: Decimal, ctx: &ResolutionContext) -> Result<()> {
    for (from, held) in non_creditors.iter() {
        let give = ((*held * remaining_debt) / non_creditor_value).min(*held);
        for (creditor, debt) in debts.iter() {
            let quantity = (give * *debt) / remaining_debt;
            if quantity.is_zero() {
                continue;
            }
            let holder = res.holder_for(creditor, quantity, ctx)?;
            let moved = res.institution.balance_sheet_mut().shares_mut().transfer(from, &holder, quantity);
            let value = moved * price;
            res.totals.equity_value_delivered += value;
            res.transfers.push(ShareTransfer {
                from: from.clone(),
                creditor: creditor.clone(),
                holder,
                quantity: moved,
                value,
            });
        }
    }
    for (creditor, debt) in debts.iter() {
        if let Some(claim) = res.claim_mut(creditor) {
            claim.write_down(*debt);
        }
    }
    res.totals.claims_settled += remaining_debt;
    settle_dust(res);
    Ok(())
}

/// Cancel all shares and debts and reissue the firm to its creditors.
fn liquidate(res: &mut Resolution, debts: &BTreeMap<AgentID, Decimal>, remaining_debt: Decimal, price: Decimal, ctx: &mut ResolutionContext) -> Result<()> {
    let stock = res.institution.id().clone();
    let count = share_base(res.institution.balance_sheet().total_shares_issued(), &stock);
    res.terminate_shares(price);
    settle_dust(res);

    let equity = res.institution.balance_sheet().total_assets();
    let new_price = equity / count;
    ctx.oracle.set_price(&stock, new_price);
    res.totals.new_share_price = Some(new_price);

    for (creditor, debt) in debts.iter() {
        let quantity = (count * *debt) / remaining_debt;
        let value = (equity * *debt) / remaining_debt;
        res.issue_shares(creditor, quantity, value, IssueBasis::WriteDown, ctx)?;
        let settled = value.min(*debt);
        if let Some(claim) = res.claim_mut(creditor) {
            claim.write_down(settled);
        }
        res.totals.claims_settled += settled;
        res.totals.debt_forgiven += *debt - settled;
        res.totals.surplus_to_creditors += value - settled;
        res.totals.equity_value_delivered += value;
    }
    Ok(())
}
