//! Table layout for the Postgres backend: DDL and the row mapping of each
//! resource.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::models::{Company, Currency, DateFilter, Deposit, PortfolioEntry, Resource};

/// Owned bind parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Decimal(Decimal),
    Date(NaiveDate),
    OptionalDate(Option<NaiveDate>),
    Bool(bool),
}

/// Row restriction derived from a resource filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    All,
    Equals(&'static str, SqlValue),
    /// The filter can never match, e.g. an unparseable date.
    Nothing,
}

pub trait PgResource: Resource {
    /// Non-id columns, in the order of [`PgResource::values`].
    const COLUMNS: &'static [&'static str];
    const NATURAL_KEY: &'static [&'static str];
    const ORDER_BY: &'static str;

    fn values(&self) -> Vec<SqlValue>;

    fn natural_key(&self) -> Vec<SqlValue>;

    fn filter_clause(filter: &Self::Filter) -> FilterClause;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

impl PgResource for Company {
    const COLUMNS: &'static [&'static str] = &["instrument", "isin", "issuer"];
    const NATURAL_KEY: &'static [&'static str] = &["instrument"];
    const ORDER_BY: &'static str = "instrument COLLATE \"C\" ASC";

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.instrument.clone()),
            SqlValue::Text(self.isin.clone()),
            SqlValue::Text(self.issuer.clone()),
        ]
    }

    fn natural_key(&self) -> Vec<SqlValue> {
        vec![SqlValue::Text(self.instrument.clone())]
    }

    fn filter_clause(_filter: &()) -> FilterClause {
        FilterClause::All
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Company {
            instrument: row.try_get("instrument")?,
            isin: row.try_get("isin")?,
            issuer: row.try_get("issuer")?,
        })
    }
}

impl PgResource for PortfolioEntry {
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "instrument",
        "isin",
        "issuer",
        "quantity",
        "locked",
        "average_price",
        "reference_price",
    ];
    const NATURAL_KEY: &'static [&'static str] = &["date", "instrument"];
    const ORDER_BY: &'static str = "date DESC, instrument COLLATE \"C\" ASC";

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Date(self.date),
            SqlValue::Text(self.instrument.clone()),
            SqlValue::Text(self.isin.clone()),
            SqlValue::Text(self.issuer.clone()),
            SqlValue::Decimal(self.quantity),
            SqlValue::Decimal(self.locked),
            SqlValue::Decimal(self.average_price),
            SqlValue::Decimal(self.reference_price),
        ]
    }

    fn natural_key(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Date(self.date),
            SqlValue::Text(self.instrument.clone()),
        ]
    }

    fn filter_clause(filter: &Self::Filter) -> FilterClause {
        match filter.date {
            DateFilter::Any => FilterClause::All,
            DateFilter::On(date) => FilterClause::Equals("date", SqlValue::Date(date)),
            DateFilter::Unparseable => FilterClause::Nothing,
        }
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(PortfolioEntry {
            date: row.try_get("date")?,
            currency: Currency::Ron,
            instrument: row.try_get("instrument")?,
            isin: row.try_get("isin")?,
            issuer: row.try_get("issuer")?,
            quantity: row.try_get("quantity")?,
            locked: row.try_get("locked")?,
            average_price: row.try_get("average_price")?,
            reference_price: row.try_get("reference_price")?,
        })
    }
}

impl PgResource for Deposit {
    const COLUMNS: &'static [&'static str] = &[
        "bank",
        "deposit_name",
        "principal",
        "interest_rate",
        "start_date",
        "maturity_date",
        "current_balance",
        "earned_interest",
        "is_active",
        "auto_renew",
    ];
    const NATURAL_KEY: &'static [&'static str] = &["bank", "deposit_name"];
    const ORDER_BY: &'static str = "start_date DESC, bank COLLATE \"C\" ASC, deposit_name COLLATE \"C\" ASC";

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.bank.clone()),
            SqlValue::Text(self.deposit_name.clone()),
            SqlValue::Decimal(self.principal),
            SqlValue::Decimal(self.interest_rate),
            SqlValue::Date(self.start_date),
            SqlValue::OptionalDate(self.maturity_date),
            SqlValue::Decimal(self.current_balance),
            SqlValue::Decimal(self.earned_interest),
            SqlValue::Bool(self.is_active),
            SqlValue::Bool(self.auto_renew),
        ]
    }

    fn natural_key(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.bank.clone()),
            SqlValue::Text(self.deposit_name.clone()),
        ]
    }

    fn filter_clause(filter: &Self::Filter) -> FilterClause {
        match filter.is_active {
            Some(active) => FilterClause::Equals("is_active", SqlValue::Bool(active)),
            None => FilterClause::All,
        }
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Deposit {
            bank: row.try_get("bank")?,
            deposit_name: row.try_get("deposit_name")?,
            principal: row.try_get("principal")?,
            interest_rate: row.try_get("interest_rate")?,
            start_date: row.try_get("start_date")?,
            maturity_date: row.try_get("maturity_date")?,
            current_balance: row.try_get("current_balance")?,
            earned_interest: row.try_get("earned_interest")?,
            is_active: row.try_get("is_active")?,
            auto_renew: row.try_get("auto_renew")?,
        })
    }
}

pub fn global_statements() -> Vec<String> {
    vec![
        "CREATE TABLE IF NOT EXISTS users (\
            id TEXT PRIMARY KEY, \
            email TEXT NOT NULL UNIQUE, \
            name TEXT NOT NULL, \
            password_hash TEXT NOT NULL)"
            .to_string(),
    ]
}

/// Schema, tables and natural-key unique indexes for one partition. The
/// caller validates `schema` first.
pub fn partition_statements(schema: &str) -> Vec<String> {
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\""),
        format!(
            "CREATE TABLE IF NOT EXISTS \"{schema}\".companies (\
                id TEXT PRIMARY KEY, \
                instrument TEXT NOT NULL, \
                isin TEXT NOT NULL, \
                issuer TEXT NOT NULL)"
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS companies_instrument_key \
                ON \"{schema}\".companies (instrument)"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS \"{schema}\".portfolio_entries (\
                id TEXT PRIMARY KEY, \
                date DATE NOT NULL, \
                instrument TEXT NOT NULL, \
                isin TEXT NOT NULL, \
                issuer TEXT NOT NULL, \
                quantity NUMERIC NOT NULL, \
                locked NUMERIC NOT NULL, \
                average_price NUMERIC NOT NULL, \
                reference_price NUMERIC NOT NULL)"
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS portfolio_entries_date_instrument_key \
                ON \"{schema}\".portfolio_entries (date, instrument)"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS \"{schema}\".deposits (\
                id TEXT PRIMARY KEY, \
                bank TEXT NOT NULL, \
                deposit_name TEXT NOT NULL, \
                principal NUMERIC NOT NULL, \
                interest_rate NUMERIC NOT NULL, \
                start_date DATE NOT NULL, \
                maturity_date DATE, \
                current_balance NUMERIC NOT NULL, \
                earned_interest NUMERIC NOT NULL, \
                is_active BOOLEAN NOT NULL, \
                auto_renew BOOLEAN NOT NULL)"
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS deposits_bank_name_key \
                ON \"{schema}\".deposits (bank, deposit_name)"
        ),
    ]
}
