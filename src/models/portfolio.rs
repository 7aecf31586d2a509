use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::Resource;
use crate::validation::{Payload, ValidationErrors};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "RON")]
    Ron,
}

/// One position in a dated portfolio snapshot. Instrument details are copied
/// by value from the company at entry time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioEntry {
    pub date: NaiveDate,
    pub currency: Currency,
    pub instrument: String,
    pub isin: String,
    pub issuer: String,
    pub quantity: Decimal,
    pub locked: Decimal,
    pub average_price: Decimal,
    pub reference_price: Decimal,
}

/// Snapshot date selected by `?date=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFilter {
    #[default]
    Any,
    On(NaiveDate),
    /// Not a calendar date; matches nothing.
    Unparseable,
}

impl DateFilter {
    /// An absent or empty value selects every date.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Self::Any,
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Self::On)
                .unwrap_or(Self::Unparseable),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioFilter {
    pub date: DateFilter,
}

impl PortfolioFilter {
    pub fn on(raw: Option<&str>) -> Self {
        Self { date: DateFilter::parse(raw) }
    }
}

const BILLION: i64 = 1_000_000_000;

impl Resource for PortfolioEntry {
    type Filter = PortfolioFilter;

    const COLLECTION: &'static str = "portfolio_entries";
    const SINGULAR: &'static str = "portfolio entry";
    const PLURAL: &'static str = "portfolio entries";
    const DUPLICATE_MESSAGE: &'static str =
        "Portfolio entry with this date and instrument already exists";

    fn validate(payload: &Value) -> Result<Self, ValidationErrors> {
        let min_price = Decimal::new(1, 3);
        let max_price = Decimal::from(1_000_000);
        let billion = Decimal::from(BILLION);

        let mut p = Payload::new(payload);
        let date = p.date("date", "Date");
        let instrument = p.text("instrument", "Instrument name", 100);
        let isin = p.isin("isin");
        let issuer = p.text("issuer", "Issuer name", 200);
        let quantity = p.bounded(
            "quantity",
            "Quantity",
            (Decimal::ZERO, "Quantity must be 0 or greater"),
            (billion, "Quantity cannot exceed 1 billion units"),
        );
        let locked = p.bounded(
            "locked",
            "Locked amount",
            (Decimal::ZERO, "Locked amount must be 0 or greater"),
            (billion, "Locked amount cannot exceed 1 billion units"),
        );
        let average_price = p.bounded(
            "averagePrice",
            "Average price",
            (min_price, "Average price must be at least 0.001 RON"),
            (max_price, "Average price cannot exceed 1,000,000 RON"),
        );
        let reference_price = p.bounded(
            "referencePrice",
            "Reference price",
            (min_price, "Reference price must be at least 0.001 RON"),
            (max_price, "Reference price cannot exceed 1,000,000 RON"),
        );

        // Runs whenever both numbers parsed, independent of other failures.
        if let (Some(quantity), Some(locked)) = (quantity, locked) {
            if locked > quantity {
                p.issue("locked", "Locked amount cannot exceed quantity");
            }
        }

        match (date, instrument, isin, issuer, quantity, locked, average_price, reference_price) {
            (
                Some(date),
                Some(instrument),
                Some(isin),
                Some(issuer),
                Some(quantity),
                Some(locked),
                Some(average_price),
                Some(reference_price),
            ) if p.is_valid() => Ok(PortfolioEntry {
                date,
                currency: Currency::Ron,
                instrument,
                isin,
                issuer,
                quantity,
                locked,
                average_price,
                reference_price,
            }),
            _ => Err(p.into_errors()),
        }
    }

    fn same_natural_key(&self, other: &Self) -> bool {
        self.date == other.date && self.instrument == other.instrument
    }

    fn matches(&self, filter: &PortfolioFilter) -> bool {
        match filter.date {
            DateFilter::Any => true,
            DateFilter::On(date) => self.date == date,
            DateFilter::Unparseable => false,
        }
    }

    /// Newest snapshot first, then alphabetical within a date.
    fn list_order(&self, other: &Self) -> Ordering {
        other
            .date
            .cmp(&self.date)
            .then_with(|| self.instrument.cmp(&other.instrument))
    }
}
