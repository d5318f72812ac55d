//! Resolution policies take an institution that's short on capital and run it
//! through a waterfall until it's solvent again, or until it's clear that it
//! can't be saved and has to be liquidated.
//!
//! Each policy consumes the institution by value and returns a [Resolution]:
//! the updated institution plus a record of everything that happened to it
//! (claims written down, shares terminated/issued/transferred, payments made,
//! intermediaries spawned). Nothing is persisted here. Call
//! [Resolution::modifications] to get the list of model changes to save.
//!
//! Running out of money is not an error. It's an [Outcome].
//!
//! [Resolution]: struct.Resolution.html
//! [Resolution::modifications]: struct.Resolution.html#method.modifications
//! [Outcome]: enum.Outcome.html

pub mod asset_threshold;
pub mod bailin;
pub mod bailout;
pub mod debt_swap;
pub mod liquidate;

use chrono::{DateTime, Utc};
use crate::{
    config::IntermediaryConfig,
    error::{Error, Result},
    models::{
        Modifications,
        Op,
        claim::Claim,
        institution::{Institution, InstitutionID, InstitutionKind, InstitutionStatus},
        intermediary::Intermediary,
        lib::agent::AgentID,
    },
    system::{
        government::Government,
        market::PriceOracle,
        scheduler::LiquidationScheduler,
    },
    transactions::intermediary as intermediary_tx,
    util::number::EPSILON,
};
use getset::{CopyGetters, Getters};
use rust_decimal::prelude::*;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub use self::asset_threshold::CashCompensation;

/// How a resolution episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing needed doing
    Compliant,
    /// The institution is solvent again
    Resolved,
    /// The institution couldn't be saved and the liquidation scheduler has
    /// been told about it. Its ledger is untouched.
    FlaggedForLiquidation,
    /// Shares and debts were cancelled and new shares issued to creditors
    Liquidated,
}

impl Outcome {
    /// Whether the liquidation scheduler needs to hear about this outcome
    pub fn needs_liquidation(&self) -> bool {
        match self {
            Outcome::FlaggedForLiquidation | Outcome::Liquidated => true,
            _ => false,
        }
    }
}

/// The states an episode moves through. Every episode's trace starts at
/// `Start` and ends at one of the terminal stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    StocksTerminated,
    LoansWrittenDown,
    DepositsWrittenDown,
    CashCompensated,
    StockRedistributed,
    GovernmentFunded,
    SharesIssued,
    Resolved,
    FlaggedForLiquidation,
    Liquidated,
}

/// What entitles the recipient of a share issue to their shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueBasis {
    /// A liability of theirs was written down or cancelled
    WriteDown,
    /// Their existing shares were terminated
    TerminatedHolding,
    /// They put up the cash to recapitalize the institution
    Funding,
}

/// A share account cancelled without compensation.
#[derive(Clone, Debug, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct TerminatedHolding {
    holder: AgentID,
    quantity: Decimal,
    /// Quantity times the share price before termination
    lost_value: Decimal,
}

/// New shares created for someone. `holder` is who actually holds them, which
/// is an intermediary when the creditor can't hold equity.
#[derive(Clone, Debug, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct ShareIssue {
    creditor: AgentID,
    holder: AgentID,
    quantity: Decimal,
    /// The value the creditor is credited with in exchange for these shares
    value: Decimal,
    basis: IssueBasis,
}

/// Existing shares moved, uncompensated, from a holder to a creditor.
#[derive(Clone, Debug, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct ShareTransfer {
    from: AgentID,
    creditor: AgentID,
    holder: AgentID,
    quantity: Decimal,
    value: Decimal,
}

/// Cash paid from the institution to a creditor.
#[derive(Clone, Debug, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct CashPayment {
    creditor: AgentID,
    amount: Decimal,
}

/// Aggregate figures for an episode, mostly useful for checking that value
/// was conserved.
#[derive(Clone, Copy, Debug, Default, PartialEq, CopyGetters, Serialize, Deserialize)]
#[getset(get_copy = "pub")]
pub struct Totals {
    /// The shortfall the episode set out to eliminate, including any value
    /// lost on self-held shares
    shortfall: Decimal,
    /// What's left of it at the end
    remaining_shortfall: Decimal,
    loans_written_down: Decimal,
    deposits_written_down: Decimal,
    /// Cash paid out to creditors
    cash_paid: Decimal,
    /// Value of equity handed to creditors, at the price used to hand it over
    equity_value_delivered: Decimal,
    /// Claims extinguished by a payment or by equity
    claims_settled: Decimal,
    /// Claims cancelled without anything in return
    debt_forgiven: Decimal,
    /// Equity value creditors received beyond what they were owed
    surplus_to_creditors: Decimal,
    /// Cash put in by the government
    government_funding: Decimal,
    /// Shares issued during the episode
    shares_issued: Decimal,
    /// The share price published at the end of the episode, if it changed
    new_share_price: Option<Decimal>,
}

impl Totals {
    /// Total value written down across loans and deposits
    pub fn written_down(&self) -> Decimal {
        self.loans_written_down + self.deposits_written_down
    }
}

/// The result of a single resolution episode.
#[derive(Clone, Debug, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Resolution {
    outcome: Outcome,
    trace: Vec<Stage>,
    /// The institution as it stands at the end of the episode
    institution: Institution,
    claims: Vec<Claim>,
    terminated: Vec<TerminatedHolding>,
    issues: Vec<ShareIssue>,
    transfers: Vec<ShareTransfer>,
    payments: Vec<CashPayment>,
    intermediaries: Vec<Intermediary>,
    totals: Totals,
}

impl Resolution {
    fn begin(institution: Institution, shortfall: Decimal) -> Self {
        let mut totals = Totals::default();
        totals.shortfall = shortfall;
        totals.remaining_shortfall = shortfall;
        Self {
            outcome: Outcome::Compliant,
            trace: vec![],
            institution,
            claims: vec![],
            terminated: vec![],
            issues: vec![],
            transfers: vec![],
            payments: vec![],
            intermediaries: vec![],
            totals,
        }
    }

    /// Create a result for an institution that needed nothing done to it.
    pub fn compliant(institution: Institution) -> Self {
        Self::begin(institution, Decimal::zero())
    }

    fn stage(&mut self, stage: Stage) {
        debug!(institution = %self.institution.id(), stage = ?stage, "resolution stage");
        self.trace.push(stage);
    }

    /// Open a claim for every creditor on the institution's books.
    fn open_claims(&mut self) {
        self.claims = self.institution.balance_sheet().liabilities().by_creditor()
            .into_iter()
            .map(|(creditor, owed)| Claim::new(creditor, owed.total()))
            .collect();
    }

    fn claim_mut(&mut self, creditor: &AgentID) -> Option<&mut Claim> {
        self.claims.iter_mut().find(|c| c.creditor() == creditor)
    }

    fn finish(mut self, outcome: Outcome, stage: Stage, ctx: &mut ResolutionContext) -> Self {
        let status = match outcome {
            Outcome::Compliant => InstitutionStatus::Operating,
            Outcome::Resolved => InstitutionStatus::Resolved,
            Outcome::FlaggedForLiquidation => InstitutionStatus::FlaggedForLiquidation,
            Outcome::Liquidated => InstitutionStatus::Liquidated,
        };
        self.stage(stage);
        self.outcome = outcome;
        self.institution.set_status(status);
        self.institution.set_updated(ctx.now.clone());
        if outcome.needs_liquidation() {
            ctx.scheduler.schedule(self.institution.id(), outcome);
        }
        info!(
            institution = %self.institution.id(),
            outcome = ?outcome,
            remaining_shortfall = %self.totals.remaining_shortfall,
            written_down = %self.totals.written_down(),
            shares_issued = %self.totals.shares_issued,
            "resolution complete"
        );
        self
    }

    /// Abandon an episode, putting back the institution as it was when the
    /// episode started and flagging it for liquidation. Anything recorded so
    /// far (besides the claims, the trace, and the remaining shortfall) is
    /// thrown out.
    fn abandon(mut self, original: Institution, ctx: &mut ResolutionContext) -> Self {
        warn!(institution = %original.id(), remaining_shortfall = %self.totals.remaining_shortfall, "shortfall cannot be covered, abandoning resolution");
        let shortfall = self.totals.shortfall;
        let remaining = self.totals.remaining_shortfall;
        self.institution = original;
        self.open_claims();
        self.terminated.clear();
        self.issues.clear();
        self.transfers.clear();
        self.payments.clear();
        self.intermediaries.clear();
        self.totals = Totals::default();
        self.totals.shortfall = shortfall;
        self.totals.remaining_shortfall = remaining;
        self.finish(Outcome::FlaggedForLiquidation, Stage::FlaggedForLiquidation, ctx)
    }

    /// Cancel every share account, recording what each holder lost at the
    /// given price.
    fn terminate_shares(&mut self, price: Decimal) -> BTreeMap<AgentID, Decimal> {
        let terminated = self.institution.balance_sheet_mut().shares_mut().terminate_all();
        for (holder, quantity) in terminated.iter() {
            self.terminated.push(TerminatedHolding {
                holder: holder.clone(),
                quantity: *quantity,
                lost_value: *quantity * price,
            });
        }
        terminated
    }

    /// Issue shares to a creditor, routing them through a new intermediary if
    /// the creditor can't hold equity.
    fn issue_shares(&mut self, creditor: &AgentID, quantity: Decimal, value: Decimal, basis: IssueBasis, ctx: &ResolutionContext) -> Result<()> {
        let holder = self.holder_for(creditor, quantity, ctx)?;
        self.institution.balance_sheet_mut().shares_mut().issue(holder.clone(), quantity);
        self.totals.shares_issued += quantity;
        self.issues.push(ShareIssue {
            creditor: creditor.clone(),
            holder,
            quantity,
            value,
            basis,
        });
        Ok(())
    }

    /// Figure out who will hold shares on behalf of a creditor. Creditors that
    /// can hold equity hold it themselves. Everyone else gets an intermediary
    /// (one per creditor per episode) that holds `quantity` more shares.
    fn holder_for(&mut self, creditor: &AgentID, quantity: Decimal, ctx: &ResolutionContext) -> Result<AgentID> {
        if creditor.can_hold_equity() {
            return Ok(creditor.clone());
        }
        let stock = self.institution.id().clone();
        let existing = self.intermediaries.iter_mut()
            .find(|i| i.beneficiary() == creditor && i.stock() == &stock);
        if let Some(intermediary) = existing {
            let held = *intermediary.shares() + quantity;
            intermediary.set_shares(held);
            return Ok(intermediary.id().clone().into());
        }
        let intermediary = intermediary_tx::build(creditor.clone(), stock, quantity, &ctx.intermediary, &ctx.now)?;
        let holder: AgentID = intermediary.id().clone().into();
        debug!(creditor = %creditor, intermediary = %holder, "intermediary created");
        self.intermediaries.push(intermediary);
        Ok(holder)
    }

    /// Turn this result into a list of model changes: the institution is
    /// updated and any intermediaries are created.
    pub fn modifications(&self) -> Modifications {
        let mut mods = Modifications::new();
        if self.outcome == Outcome::Compliant {
            return mods;
        }
        mods.push(Op::Update, self.institution.clone());
        for intermediary in self.intermediaries.iter() {
            mods.push(Op::Create, intermediary.clone());
        }
        mods
    }
}

/// The collaborators a resolution episode talks to. One of these gets built
/// per step of the simulation and handed to each episode in turn.
pub struct ResolutionContext<'a> {
    oracle: &'a mut dyn PriceOracle,
    scheduler: &'a mut dyn LiquidationScheduler,
    government: Option<&'a mut Government>,
    intermediary: IntermediaryConfig,
    now: DateTime<Utc>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(oracle: &'a mut dyn PriceOracle, scheduler: &'a mut dyn LiquidationScheduler, now: &DateTime<Utc>) -> Self {
        Self {
            oracle,
            scheduler,
            government: None,
            intermediary: IntermediaryConfig::default(),
            now: now.clone(),
        }
    }

    /// Give the context a government to fund bail-outs with.
    pub fn with_government(mut self, government: &'a mut Government) -> Self {
        self.government = Some(government);
        self
    }

    /// Set the terms any intermediaries spawned during resolution are given.
    pub fn with_intermediary_config(mut self, config: IntermediaryConfig) -> Self {
        self.intermediary = config;
        self
    }

    pub(crate) fn set_intermediary_config(&mut self, config: IntermediaryConfig) {
        self.intermediary = config;
    }

    pub fn intermediary_config(&self) -> &IntermediaryConfig {
        &self.intermediary
    }

    /// Look up a share price. Unlisted stocks are priced at zero.
    fn price(&self, stock: &InstitutionID) -> Decimal {
        match self.oracle.price(stock) {
            Some(price) => price,
            None => {
                warn!(stock = %stock, "no share price available, valuing shares at zero");
                Decimal::zero()
            }
        }
    }
}

/// The resolution procedure to run on an institution. Chosen once, in the
/// config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Write down creditors and convert their losses into equity
    Bailin,
    /// Pay creditors in cash, then in existing shares, then liquidate.
    /// Only applies to macro firms.
    AssetThreshold {
        #[serde(default)]
        cash: CashCompensation,
    },
    /// Have the government pay the shortfall in exchange for the equity
    Bailout,
    /// Pay off a firm's loans in cash if it can, otherwise swap them for the
    /// whole of its equity. Only applies to macro firms.
    DebtEquitySwap,
    /// Flag for liquidation straight away
    Liquidate,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        ResolutionPolicy::Bailin
    }
}

impl ResolutionPolicy {
    pub fn validate(&self) -> Result<()> {
        match self {
            ResolutionPolicy::AssetThreshold { cash } => cash.validate(),
            _ => Ok(()),
        }
    }

    /// Run this policy against an institution with the given shortfall.
    pub fn resolve(&self, institution: Institution, shortfall: Decimal, ctx: &mut ResolutionContext) -> Result<Resolution> {
        if institution.is_deleted() {
            Err(Error::ObjectIsDeleted("institution".into()))?;
        }
        if shortfall < Decimal::zero() {
            Err(Error::InvalidAmount(shortfall))?;
        }
        institution.balance_sheet().validate()?;
        info!(
            institution = %institution.id(),
            policy = ?self,
            shortfall = %shortfall,
            equity = %institution.equity(),
            assets = %institution.balance_sheet().total_assets(),
            liabilities = %institution.balance_sheet().total_liabilities(),
            shares = %institution.balance_sheet().total_shares_issued(),
            "resolution starting"
        );
        match self {
            ResolutionPolicy::Bailin => bailin::resolve(institution, shortfall, ctx),
            ResolutionPolicy::AssetThreshold { cash } => asset_threshold::resolve(institution, shortfall, cash, ctx),
            ResolutionPolicy::Bailout => bailout::resolve(institution, shortfall, ctx),
            ResolutionPolicy::DebtEquitySwap => debt_swap::resolve(institution, shortfall, ctx),
            ResolutionPolicy::Liquidate => liquidate::resolve(institution, shortfall, ctx),
        }
    }
}

/// Make sure a policy is being applied to a kind of institution it knows how
/// to handle.
fn require_kind(institution: &Institution, kind: InstitutionKind) -> Result<()> {
    if institution.kind() != &kind {
        warn!(institution = %institution.id(), kind = ?institution.kind(), expected = ?kind, "unsupported debtor, no action taken");
        Err(Error::UnsupportedDebtor(institution.kind().clone()))?;
    }
    Ok(())
}

/// The number of shares an institution's new equity gets split into: the
/// number it had before, or a single normalized share if it had none.
fn share_base(outstanding: Decimal, institution: &InstitutionID) -> Decimal {
    if outstanding <= EPSILON {
        warn!(institution = %institution, "no outstanding shares, issuing a single normalized unit");
        Decimal::one()
    } else {
        outstanding
    }
}
