use chrono::{DateTime, Utc};
use crate::{
    models::{
        asset::{AssetBook, AssetClass},
        balance_sheet::BalanceSheet,
        institution::{Institution, InstitutionID, InstitutionKind},
        intermediary::{Intermediary, IntermediaryID},
        liability::Liabilities,
        lib::agent::{AgentID, FundID, HouseholdID},
        share::ShareRegistry,
    },
};
use rust_decimal::prelude::*;
use rust_decimal_macros::*;

fn make_institution(id: &InstitutionID, name: &str, kind: InstitutionKind, balance_sheet: BalanceSheet, now: &DateTime<Utc>) -> Institution {
    Institution::builder()
        .id(id.clone())
        .name(name)
        .kind(kind)
        .balance_sheet(balance_sheet)
        .active(true)
        .created(now.clone())
        .updated(now.clone())
        .build().unwrap()
}

/// A bank that's 100 underwater: 550 of assets against 150 of loans and 500
/// of deposits.
pub fn make_bank(id: &InstitutionID, now: &DateTime<Utc>) -> Institution {
    let assets = AssetBook::from_entries(vec![
        (AssetClass::Cash, dec!(50)),
        (AssetClass::CommercialLoan, dec!(500)),
    ]);
    let mut liabilities = Liabilities::new();
    liabilities.set_loans(FundID::new("fund1"), dec!(100));
    liabilities.set_loans(FundID::new("fund2"), dec!(50));
    liabilities.set_deposits(HouseholdID::new("jerry"), dec!(300));
    liabilities.set_deposits(HouseholdID::new("larry"), dec!(200));
    let mut shares = ShareRegistry::new();
    shares.issue(FundID::new("fund1"), dec!(60));
    shares.issue(FundID::new("fund2"), dec!(40));
    make_institution(id, "jerry's bank", InstitutionKind::Bank, BalanceSheet::new(assets, liabilities, shares), now)
}

/// A well-capitalized bank: 1000 of assets, 500 of equity.
pub fn make_healthy_bank(id: &InstitutionID, now: &DateTime<Utc>) -> Institution {
    let assets = AssetBook::from_entries(vec![
        (AssetClass::Cash, dec!(200)),
        (AssetClass::GovernmentBond, dec!(300)),
        (AssetClass::Mortgage, dec!(500)),
    ]);
    let mut liabilities = Liabilities::new();
    liabilities.set_loans(FundID::new("fund1"), dec!(300));
    liabilities.set_deposits(HouseholdID::new("jerry"), dec!(200));
    let mut shares = ShareRegistry::new();
    shares.issue(FundID::new("fund1"), dec!(100));
    make_institution(id, "larry's bank", InstitutionKind::Bank, BalanceSheet::new(assets, liabilities, shares), now)
}

/// A macro firm with 100 of assets (20 in cash) and 120 of debt, owned
/// outright by one fund.
pub fn make_firm(id: &InstitutionID, now: &DateTime<Utc>) -> Institution {
    let assets = AssetBook::from_entries(vec![
        (AssetClass::Cash, dec!(20)),
        (AssetClass::Other, dec!(80)),
    ]);
    let mut liabilities = Liabilities::new();
    liabilities.set_loans(InstitutionID::new("lender"), dec!(90));
    liabilities.set_loans(HouseholdID::new("jerry"), dec!(30));
    let mut shares = ShareRegistry::new();
    shares.issue(FundID::new("owner"), dec!(100));
    make_institution(id, "widgetco", InstitutionKind::MacroFirm, BalanceSheet::new(assets, liabilities, shares), now)
}

/// A bank with one fund per loan (`fund0`, `fund1`, ...) and one household
/// per deposit (`h0`, `h1`, ...). `fund0` owns all 100 shares.
pub fn make_bank_with(id: &InstitutionID, loans: &[Decimal], deposits: &[Decimal], now: &DateTime<Utc>) -> Institution {
    let assets = AssetBook::from_entries(vec![
        (AssetClass::Cash, dec!(100)),
    ]);
    let mut liabilities = Liabilities::new();
    for (i, amount) in loans.iter().enumerate() {
        liabilities.set_loans(FundID::new(format!("fund{}", i)), *amount);
    }
    for (i, amount) in deposits.iter().enumerate() {
        liabilities.set_deposits(HouseholdID::new(format!("h{}", i)), *amount);
    }
    let mut shares = ShareRegistry::new();
    shares.issue(FundID::new("fund0"), dec!(100));
    make_institution(id, "generated bank", InstitutionKind::Bank, BalanceSheet::new(assets, liabilities, shares), now)
}

pub fn make_intermediary(id: &IntermediaryID, beneficiary: &AgentID, stock: &InstitutionID, shares: Decimal, now: &DateTime<Utc>) -> Intermediary {
    Intermediary::builder()
        .id(id.clone())
        .beneficiary(beneficiary.clone())
        .stock(stock.clone())
        .shares(shares)
        .asset_value_threshold(dec!(0.000000000001))
        .sell_rate(dec!(0.2))
        .sell_all_below(dec!(0.0001))
        .active(true)
        .created(now.clone())
        .updated(now.clone())
        .build().unwrap()
}
