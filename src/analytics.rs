//! Derived figures computed at read time. Nothing here is persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Deposit, PortfolioEntry};

/// `part / whole * 100`, or zero when `whole` is zero.
///
/// Every figure in this module saturates at the `Decimal` range instead of
/// overflowing, so one extreme record cannot take down a listing.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_else(|| saturated(part.is_sign_negative() != whole.is_sign_negative()))
}

fn saturated(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMetrics {
    pub purchase_value: Decimal,
    pub current_value: Decimal,
    pub profit: Decimal,
    pub profit_percent: Decimal,
}

pub fn position_metrics(entry: &PortfolioEntry) -> PositionMetrics {
    let purchase_value = entry.quantity.saturating_mul(entry.average_price);
    let current_value = entry.quantity.saturating_mul(entry.reference_price);
    let profit = current_value.saturating_sub(purchase_value);
    PositionMetrics {
        purchase_value,
        current_value,
        profit,
        profit_percent: percent_of(profit, purchase_value),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositMetrics {
    pub total_return: Decimal,
    pub total_return_percent: Decimal,
    pub days_active: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_maturity: Option<i64>,
}

pub fn deposit_metrics(deposit: &Deposit, today: NaiveDate) -> DepositMetrics {
    let total_return = deposit.current_balance.saturating_sub(deposit.principal);
    DepositMetrics {
        total_return,
        total_return_percent: percent_of(total_return, deposit.principal),
        days_active: (today - deposit.start_date).num_days(),
        days_to_maturity: deposit
            .maturity_date
            .map(|maturity| (maturity - today).num_days()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_purchase_value: Decimal,
    pub total_current_value: Decimal,
    pub total_profit: Decimal,
    pub total_profit_percent: Decimal,
    pub positions: usize,
}

pub fn portfolio_summary<'a>(entries: impl IntoIterator<Item = &'a PortfolioEntry>) -> PortfolioSummary {
    let mut summary = entries
        .into_iter()
        .map(position_metrics)
        .fold(PortfolioSummary::default(), |mut acc, m| {
            acc.total_purchase_value = acc.total_purchase_value.saturating_add(m.purchase_value);
            acc.total_current_value = acc.total_current_value.saturating_add(m.current_value);
            acc.total_profit = acc.total_profit.saturating_add(m.profit);
            acc.positions += 1;
            acc
        });
    summary.total_profit_percent = percent_of(summary.total_profit, summary.total_purchase_value);
    summary
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositSummary {
    pub total_principal: Decimal,
    pub total_current_balance: Decimal,
    pub total_earned_interest: Decimal,
    pub total_return: Decimal,
    pub total_return_percent: Decimal,
    pub active_deposits: usize,
    /// Inactive deposits count as matured.
    pub matured_deposits: usize,
}

pub fn deposit_summary<'a>(deposits: impl IntoIterator<Item = &'a Deposit>) -> DepositSummary {
    let mut summary = deposits
        .into_iter()
        .fold(DepositSummary::default(), |mut acc, d| {
            acc.total_principal = acc.total_principal.saturating_add(d.principal);
            acc.total_current_balance = acc.total_current_balance.saturating_add(d.current_balance);
            acc.total_earned_interest = acc.total_earned_interest.saturating_add(d.earned_interest);
            if d.is_active {
                acc.active_deposits += 1;
            } else {
                acc.matured_deposits += 1;
            }
            acc
        });
    summary.total_return = summary
        .total_current_balance
        .saturating_sub(summary.total_principal);
    summary.total_return_percent = percent_of(summary.total_return, summary.total_principal);
    summary
}
