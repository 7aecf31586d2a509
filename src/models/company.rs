use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use super::Resource;
use crate::validation::{Payload, ValidationErrors};

/// A listed instrument the user tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub instrument: String,
    pub isin: String,
    pub issuer: String,
}

impl Resource for Company {
    type Filter = ();

    const COLLECTION: &'static str = "companies";
    const SINGULAR: &'static str = "company";
    const PLURAL: &'static str = "companies";
    const DUPLICATE_MESSAGE: &'static str = "Company with this instrument already exists";

    fn validate(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut p = Payload::new(payload);
        let instrument = p.text("instrument", "Instrument name", 100);
        let isin = p.isin("isin");
        let issuer = p.text("issuer", "Issuer name", 200);

        match (instrument, isin, issuer) {
            (Some(instrument), Some(isin), Some(issuer)) if p.is_valid() => Ok(Company {
                instrument,
                isin,
                issuer,
            }),
            _ => Err(p.into_errors()),
        }
    }

    fn same_natural_key(&self, other: &Self) -> bool {
        self.instrument == other.instrument
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }

    fn list_order(&self, other: &Self) -> Ordering {
        self.instrument.cmp(&other.instrument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ISIN_LENGTH_MESSAGE, ISIN_PATTERN_MESSAGE};
    use serde_json::json;

    #[test]
    fn accepts_and_normalizes_valid_company() {
        let company = Company::validate(&json!({
            "instrument": "  DIGI ",
            "isin": "RO123456789A",
            "issuer": "Digi Communications",
        }))
        .unwrap();

        assert_eq!(company.instrument, "DIGI");
        assert_eq!(company.isin, "RO123456789A");
        assert_eq!(company.issuer, "Digi Communications");
    }

    #[test]
    fn rejects_lowercase_isin() {
        let errors = Company::validate(&json!({
            "instrument": "DIGI",
            "isin": "ro123456789a",
            "issuer": "Digi Communications",
        }))
        .unwrap_err();

        assert_eq!(errors.messages_for("isin").collect::<Vec<_>>(), vec![ISIN_PATTERN_MESSAGE]);
    }

    #[test]
    fn reports_every_invalid_field() {
        let errors = Company::validate(&json!({
            "instrument": "",
            "isin": "RO12",
            "issuer": "x".repeat(201),
        }))
        .unwrap_err();

        assert_eq!(
            errors.messages_for("instrument").collect::<Vec<_>>(),
            vec!["Instrument name is required"]
        );
        assert_eq!(
            errors.messages_for("isin").collect::<Vec<_>>(),
            vec![ISIN_LENGTH_MESSAGE, ISIN_PATTERN_MESSAGE]
        );
        assert_eq!(
            errors.messages_for("issuer").collect::<Vec<_>>(),
            vec!["Issuer name must be 200 characters or less"]
        );
    }

    #[test]
    fn orders_by_instrument() {
        let a = Company { instrument: "BRD".into(), isin: "RO0000000001".into(), issuer: "x".into() };
        let b = Company { instrument: "TLV".into(), isin: "RO0000000002".into(), issuer: "y".into() };
        assert_eq!(a.list_order(&b), Ordering::Less);
        assert!(a.same_natural_key(&Company { issuer: "other".into(), ..a.clone() }));
    }
}
