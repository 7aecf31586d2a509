//! Payload checking shared by every resource schema.
//!
//! A [`Payload`] walks a raw JSON body field by field. Each accessor either
//! returns the normalized value or records a [`FieldIssue`] and returns
//! `None`; nothing short-circuits, so a single pass reports every problem in
//! the body.

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed")]
pub struct ValidationErrors {
    issues: Vec<FieldIssue>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.issues
            .iter()
            .filter(move |issue| issue.field == field)
            .map(|issue| issue.message.as_str())
    }
}

pub const ISIN_LENGTH_MESSAGE: &str = "ISIN must be exactly 12 characters";
pub const ISIN_PATTERN_MESSAGE: &str =
    "ISIN must be 12 alphanumeric characters (e.g., RO1234567890)";

fn isin_regex() -> &'static Regex {
    static ISIN_REGEX: OnceLock<Regex> = OnceLock::new();
    ISIN_REGEX.get_or_init(|| Regex::new(r"^[A-Z0-9]{12}$").expect("isin regex compiles"))
}

fn date_regex() -> &'static Regex {
    static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
    DATE_REGEX.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex compiles"))
}

static EMPTY: OnceLock<Map<String, Value>> = OnceLock::new();

/// Field-by-field reader over a JSON request body.
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> Payload<'a> {
    pub fn new(body: &'a Value) -> Self {
        let mut errors = ValidationErrors::default();
        let fields = match body {
            Value::Object(map) => map,
            _ => {
                errors.push("", "Expected a JSON object");
                EMPTY.get_or_init(Map::new)
            }
        };
        Self { fields, errors }
    }

    /// Present and non-null value for `field`, or a "required" issue.
    fn present(&mut self, field: &str, label: &str) -> Option<&'a Value> {
        let fields: &'a Map<String, Value> = self.fields;
        match fields.get(field) {
            None | Some(Value::Null) => {
                self.errors.push(field, format!("{label} is required"));
                None
            }
            Some(value) => Some(value),
        }
    }

    fn string(&mut self, field: &str, label: &str) -> Option<&'a str> {
        match self.present(field, label)? {
            Value::String(s) => Some(s.as_str()),
            _ => {
                self.errors.push(field, format!("{label} must be a string"));
                None
            }
        }
    }

    /// Required string, trimmed, between 1 and `max` characters.
    pub fn text(&mut self, field: &str, label: &str, max: usize) -> Option<String> {
        let trimmed = self.string(field, label)?.trim();
        if trimmed.is_empty() {
            self.errors.push(field, format!("{label} is required"));
            return None;
        }
        if trimmed.chars().count() > max {
            self.errors
                .push(field, format!("{label} must be {max} characters or less"));
            return None;
        }
        Some(trimmed.to_string())
    }

    /// Twelve uppercase alphanumerics. The pattern is applied to the value as
    /// submitted, so lowercase input is rejected rather than corrected.
    pub fn isin(&mut self, field: &str) -> Option<String> {
        let raw = self.string(field, "ISIN")?;
        let mut ok = true;
        if raw.chars().count() != 12 {
            self.errors.push(field, ISIN_LENGTH_MESSAGE);
            ok = false;
        }
        if !isin_regex().is_match(raw) {
            self.errors.push(field, ISIN_PATTERN_MESSAGE);
            ok = false;
        }
        ok.then(|| raw.to_ascii_uppercase())
    }

    pub fn date(&mut self, field: &str, label: &str) -> Option<NaiveDate> {
        let raw = self.string(field, label)?;
        self.parse_date(field, label, raw)
    }

    /// Absent, null and empty string all mean "no date".
    pub fn optional_date(&mut self, field: &str, label: &str) -> Option<Option<NaiveDate>> {
        let fields: &'a Map<String, Value> = self.fields;
        match fields.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(s)) if s.trim().is_empty() => Some(None),
            Some(Value::String(s)) => self.parse_date(field, label, s).map(Some),
            Some(_) => {
                self.errors.push(field, format!("{label} must be a string"));
                None
            }
        }
    }

    fn parse_date(&mut self, field: &str, label: &str, raw: &str) -> Option<NaiveDate> {
        if !date_regex().is_match(raw) {
            self.errors
                .push(field, format!("{label} must be in YYYY-MM-DD format"));
            return None;
        }
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.errors
                    .push(field, format!("{label} is not a valid calendar date"));
                None
            }
        }
    }

    /// JSON number or numeric string.
    pub fn number(&mut self, field: &str, label: &str) -> Option<Decimal> {
        let parsed = match self.present(field, label)? {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) if !s.trim().is_empty() => parse_decimal(s.trim()),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.push(field, format!("{label} must be a number"));
        }
        parsed
    }

    /// Number that must fall inside `[min, max]`. Out-of-range values are
    /// reported but still returned so cross-field rules can run on them.
    pub fn bounded(
        &mut self,
        field: &str,
        label: &str,
        (min, min_message): (Decimal, &str),
        (max, max_message): (Decimal, &str),
    ) -> Option<Decimal> {
        let value = self.number(field, label)?;
        if value < min {
            self.errors.push(field, min_message);
        }
        if value > max {
            self.errors.push(field, max_message);
        }
        Some(value)
    }

    pub fn boolean(&mut self, field: &str, label: &str) -> Option<bool> {
        match self.present(field, label)? {
            Value::Bool(b) => Some(*b),
            _ => {
                self.errors.push(field, format!("{label} must be true or false"));
                None
            }
        }
    }

    pub fn issue(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(field, message);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[test]
    fn text_is_trimmed_and_length_checked() {
        let body = json!({ "name": "  Digi  ", "long": "x".repeat(101), "blank": "   " });
        let mut p = Payload::new(&body);

        assert_eq!(p.text("name", "Name", 100).as_deref(), Some("Digi"));
        assert_eq!(p.text("long", "Long", 100), None);
        assert_eq!(p.text("blank", "Blank", 100), None);
        assert_eq!(p.text("absent", "Absent", 100), None);

        let errors = p.into_errors();
        assert_eq!(
            errors.messages_for("long").collect::<Vec<_>>(),
            vec!["Long must be 100 characters or less"]
        );
        assert!(errors.has_field("blank"));
        assert_eq!(
            errors.messages_for("absent").collect::<Vec<_>>(),
            vec!["Absent is required"]
        );
    }

    #[test]
    fn isin_reports_every_problem() {
        let body = json!({ "a": "RO1234567890", "b": "ro123456789a", "c": "RO12" });
        let mut p = Payload::new(&body);

        assert_eq!(p.isin("a").as_deref(), Some("RO1234567890"));
        assert_eq!(p.isin("b"), None);
        assert_eq!(p.isin("c"), None);

        let errors = p.into_errors();
        assert_eq!(errors.messages_for("b").collect::<Vec<_>>(), vec![ISIN_PATTERN_MESSAGE]);
        assert_eq!(
            errors.messages_for("c").collect::<Vec<_>>(),
            vec![ISIN_LENGTH_MESSAGE, ISIN_PATTERN_MESSAGE]
        );
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        let body = json!({ "n": 12.5, "s": " 3.25 ", "bad": "abc", "flag": true, "big": 1e9 });
        let mut p = Payload::new(&body);

        assert_eq!(p.number("n", "N"), Some(dec("12.5")));
        assert_eq!(p.number("s", "S"), Some(dec("3.25")));
        assert_eq!(p.number("big", "Big"), Some(dec("1000000000")));
        assert_eq!(p.number("bad", "Bad"), None);
        assert_eq!(p.number("flag", "Flag"), None);
        assert_eq!(p.into_errors().issues().len(), 2);
    }

    #[test]
    fn bounded_still_returns_out_of_range_values() {
        let body = json!({ "q": -1 });
        let mut p = Payload::new(&body);
        let value = p.bounded(
            "q",
            "Quantity",
            (Decimal::ZERO, "too small"),
            (dec("10"), "too big"),
        );
        assert_eq!(value, Some(dec("-1")));
        assert_eq!(p.into_errors().messages_for("q").collect::<Vec<_>>(), vec!["too small"]);
    }

    #[test]
    fn dates_must_exist_on_the_calendar() {
        let body = json!({ "ok": "2024-02-29", "shape": "2024/01/01", "cal": "2023-02-30", "empty": "" });
        let mut p = Payload::new(&body);

        assert!(p.date("ok", "Date").is_some());
        assert!(p.date("shape", "Date").is_none());
        assert!(p.date("cal", "Date").is_none());
        assert_eq!(p.optional_date("empty", "Maturity date"), Some(None));
        assert_eq!(p.optional_date("absent", "Maturity date"), Some(None));

        let errors = p.into_errors();
        assert_eq!(
            errors.messages_for("shape").collect::<Vec<_>>(),
            vec!["Date must be in YYYY-MM-DD format"]
        );
        assert_eq!(
            errors.messages_for("cal").collect::<Vec<_>>(),
            vec!["Date is not a valid calendar date"]
        );
    }

    #[test]
    fn booleans_must_be_json_booleans() {
        let body = json!({ "yes": true, "str": "true" });
        let mut p = Payload::new(&body);
        assert_eq!(p.boolean("yes", "Active"), Some(true));
        assert_eq!(p.boolean("str", "Active"), None);
        assert!(!p.is_valid());
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        let body = json!([1, 2, 3]);
        let mut p = Payload::new(&body);
        assert!(p.text("instrument", "Instrument name", 100).is_none());
        let errors = p.into_errors();
        assert!(errors.has_field(""));
        assert!(errors.has_field("instrument"));
    }
}
