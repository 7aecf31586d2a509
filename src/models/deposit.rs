use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::Resource;
use crate::validation::{Payload, ValidationErrors};

/// A term deposit held at a bank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub bank: String,
    pub deposit_name: String,
    pub principal: Decimal,
    /// Annual rate in percent, e.g. `5.5`.
    pub interest_rate: Decimal,
    pub start_date: NaiveDate,
    pub maturity_date: Option<NaiveDate>,
    pub current_balance: Decimal,
    pub earned_interest: Decimal,
    pub is_active: bool,
    pub auto_renew: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositFilter {
    pub is_active: Option<bool>,
}

impl DepositFilter {
    /// `?isActive=true` selects active deposits; any other value selects the
    /// inactive ones.
    pub fn from_query(is_active: Option<&str>) -> Self {
        Self {
            is_active: is_active.map(|v| v == "true"),
        }
    }
}

impl Resource for Deposit {
    type Filter = DepositFilter;

    const COLLECTION: &'static str = "deposits";
    const SINGULAR: &'static str = "deposit";
    const PLURAL: &'static str = "deposits";
    const DUPLICATE_MESSAGE: &'static str = "Deposit with this bank and name already exists";

    fn validate(payload: &Value) -> Result<Self, ValidationErrors> {
        let billion = Decimal::from(1_000_000_000);

        let mut p = Payload::new(payload);
        let bank = p.text("bank", "Bank name", 100);
        let deposit_name = p.text("depositName", "Deposit name", 100);

        let principal = p.number("principal", "Principal");
        if let Some(principal) = principal {
            if principal <= Decimal::ZERO {
                p.issue("principal", "Principal must be greater than 0");
            } else if principal > billion {
                p.issue("principal", "Principal cannot exceed 1 billion RON");
            }
        }

        let interest_rate = p.bounded(
            "interestRate",
            "Interest rate",
            (Decimal::ZERO, "Interest rate must be 0 or greater"),
            (Decimal::ONE_HUNDRED, "Interest rate cannot exceed 100%"),
        );
        let start_date = p.date("startDate", "Start date");
        let maturity_date = p.optional_date("maturityDate", "Maturity date");
        if let (Some(start), Some(Some(maturity))) = (start_date, maturity_date) {
            if maturity < start {
                p.issue("maturityDate", "Maturity date cannot be before start date");
            }
        }

        let current_balance = p.bounded(
            "currentBalance",
            "Current balance",
            (Decimal::ZERO, "Current balance must be 0 or greater"),
            (billion, "Current balance cannot exceed 1 billion RON"),
        );
        let earned_interest = p.bounded(
            "earnedInterest",
            "Earned interest",
            (Decimal::ZERO, "Earned interest must be 0 or greater"),
            (billion, "Earned interest cannot exceed 1 billion RON"),
        );
        let is_active = p.boolean("isActive", "Active flag");
        let auto_renew = p.boolean("autoRenew", "Auto-renew flag");

        match (
            bank,
            deposit_name,
            principal,
            interest_rate,
            start_date,
            maturity_date,
            current_balance,
            earned_interest,
            is_active,
            auto_renew,
        ) {
            (
                Some(bank),
                Some(deposit_name),
                Some(principal),
                Some(interest_rate),
                Some(start_date),
                Some(maturity_date),
                Some(current_balance),
                Some(earned_interest),
                Some(is_active),
                Some(auto_renew),
            ) if p.is_valid() => Ok(Deposit {
                bank,
                deposit_name,
                principal,
                interest_rate,
                start_date,
                maturity_date,
                current_balance,
                earned_interest,
                is_active,
                auto_renew,
            }),
            _ => Err(p.into_errors()),
        }
    }

    fn same_natural_key(&self, other: &Self) -> bool {
        self.bank == other.bank && self.deposit_name == other.deposit_name
    }

    fn matches(&self, filter: &DepositFilter) -> bool {
        filter.is_active.map_or(true, |active| self.is_active == active)
    }

    /// Most recent start first, then bank and deposit name.
    fn list_order(&self, other: &Self) -> Ordering {
        other
            .start_date
            .cmp(&self.start_date)
            .then_with(|| self.bank.cmp(&other.bank))
            .then_with(|| self.deposit_name.cmp(&other.deposit_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> Value {
        json!({
            "bank": "ING",
            "depositName": "Economii 12M",
            "principal": 1000,
            "interestRate": 6.5,
            "startDate": "2024-01-15",
            "maturityDate": "",
            "currentBalance": 1050,
            "earnedInterest": 50,
            "isActive": true,
            "autoRenew": false,
        })
    }

    #[test]
    fn empty_maturity_date_means_none() {
        let deposit = Deposit::validate(&body()).unwrap();
        assert_eq!(deposit.maturity_date, None);
        assert_eq!(deposit.principal, Decimal::from(1000));
    }

    #[test]
    fn rejects_non_positive_principal_and_bad_rate() {
        let mut payload = body();
        payload["principal"] = json!(0);
        payload["interestRate"] = json!(120);
        let errors = Deposit::validate(&payload).unwrap_err();
        assert_eq!(
            errors.messages_for("principal").collect::<Vec<_>>(),
            vec!["Principal must be greater than 0"]
        );
        assert_eq!(
            errors.messages_for("interestRate").collect::<Vec<_>>(),
            vec!["Interest rate cannot exceed 100%"]
        );
    }

    #[test]
    fn maturity_cannot_precede_start() {
        let mut payload = body();
        payload["maturityDate"] = json!("2023-12-31");
        let errors = Deposit::validate(&payload).unwrap_err();
        assert!(errors.has_field("maturityDate"));
    }

    #[test]
    fn balances_are_capped_at_one_billion() {
        let mut payload = body();
        payload["principal"] = json!(1);
        payload["currentBalance"] = json!("1000000000000000000000000000");
        payload["earnedInterest"] = json!("1000000001");
        let errors = Deposit::validate(&payload).unwrap_err();
        assert_eq!(
            errors.messages_for("currentBalance").collect::<Vec<_>>(),
            vec!["Current balance cannot exceed 1 billion RON"]
        );
        assert_eq!(
            errors.messages_for("earnedInterest").collect::<Vec<_>>(),
            vec!["Earned interest cannot exceed 1 billion RON"]
        );
    }

    #[test]
    fn flags_must_be_booleans() {
        let mut payload = body();
        payload["isActive"] = json!("yes");
        payload.as_object_mut().unwrap().remove("autoRenew");
        let errors = Deposit::validate(&payload).unwrap_err();
        assert!(errors.has_field("isActive"));
        assert_eq!(
            errors.messages_for("autoRenew").collect::<Vec<_>>(),
            vec!["Auto-renew flag is required"]
        );
    }

    #[test]
    fn is_active_filter_follows_query_text() {
        let deposit = Deposit::validate(&body()).unwrap();
        assert!(deposit.matches(&DepositFilter::from_query(None)));
        assert!(deposit.matches(&DepositFilter::from_query(Some("true"))));
        assert!(!deposit.matches(&DepositFilter::from_query(Some("false"))));
        assert!(!deposit.matches(&DepositFilter::from_query(Some("yes"))));
    }

    #[test]
    fn orders_by_start_then_bank_then_name() {
        let a = Deposit::validate(&body()).unwrap();
        let mut b = a.clone();
        b.bank = "BCR".into();
        let mut c = a.clone();
        c.start_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let mut all = vec![a.clone(), b.clone(), c.clone()];
        all.sort_by(|x, y| x.list_order(y));
        assert_eq!(all, vec![c, b, a]);
    }
}
