//! Field normalization across record schema generations
//!
//! Each record kind has a current and a legacy field name for the same
//! concept (e.g. `amount` vs `expenditureAmount`). The normalized values are
//! expressed as pipeline expressions so every view reads the same canonical
//! fields, and so `normalize_record` can apply the identical logic to a
//! single document.

use serde::Serialize;
use serde_json::Value;

use crate::pipeline::eval::evaluate;
use crate::pipeline::value::{as_number, to_double};
use crate::pipeline::Expr;

/// Canonical field names written by the normalizing projection
pub mod fields {
    pub const AMOUNT: &str = "amount";
    pub const DATE: &str = "date";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const CATEGORY: &str = "category";
    pub const DESCRIPTION: &str = "description";
    /// Member identifier as plain text, for joins and distinct counts
    pub const MP_KEY: &str = "mpKey";
}

/// A concept stored under a current name or, in older records, a legacy name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSource {
    pub current: &'static str,
    pub legacy: &'static str,
}

impl FieldSource {
    pub const fn new(current: &'static str, legacy: &'static str) -> Self {
        Self { current, legacy }
    }

    /// Current value, falling back to the legacy one
    pub fn expr(&self) -> Expr {
        Expr::field(self.current).or(Expr::field(self.legacy))
    }
}

/// Where each normalized concept lives for one record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub amount: FieldSource,
    pub date: FieldSource,
    /// Explicit year field; when absent the year is derived from the date
    pub year: &'static str,
    pub month: &'static str,
    pub category: FieldSource,
    pub description: FieldSource,
    /// Raw fields carried through the projection unchanged
    pub passthrough: &'static [&'static str],
    /// Raw fields carried through as text
    pub text: &'static [&'static str],
    /// Raw fields carried through as numbers
    pub numbers: &'static [&'static str],
}

pub const EXPENDITURE_FIELDS: FieldMap = FieldMap {
    amount: FieldSource::new("amount", "expenditureAmount"),
    date: FieldSource::new("expenditureDate", "date"),
    year: "year",
    month: "month",
    category: FieldSource::new("category", "workCategory"),
    description: FieldSource::new("workDescription", "description"),
    passthrough: &["mpId", "lsTerm"],
    text: &["house", "state", "vendor"],
    numbers: &[],
};

pub const COMPLETED_WORK_FIELDS: FieldMap = FieldMap {
    amount: FieldSource::new("finalAmount", "cost"),
    date: FieldSource::new("completedDate", "completionDate"),
    year: "completionYear",
    month: "completionMonth",
    category: FieldSource::new("category", "workCategory"),
    description: FieldSource::new("workDescription", "work"),
    passthrough: &["mpId", "lsTerm"],
    text: &["house", "state"],
    numbers: &["beneficiaries"],
};

pub const RECOMMENDED_WORK_FIELDS: FieldMap = FieldMap {
    amount: FieldSource::new("recommendedAmount", "cost"),
    date: FieldSource::new("recommendationDate", "date"),
    year: "recommendationYear",
    month: "recommendationMonth",
    category: FieldSource::new("category", "workCategory"),
    description: FieldSource::new("workDescription", "work"),
    passthrough: &["mpId", "lsTerm"],
    text: &["house", "state"],
    numbers: &["beneficiaries"],
};

impl FieldMap {
    /// Numeric amount, 0 when absent or not coercible, never negative
    pub fn amount(&self) -> Expr {
        Expr::Max(vec![
            self.amount.expr().to_double().or(Expr::lit(0)),
            Expr::lit(0),
        ])
    }

    /// Explicit year when coercible and representable, else the year of
    /// the record date
    pub fn year(&self) -> Expr {
        Expr::field(self.year)
            .to_int()
            .within(i32::MIN as f64, i32::MAX as f64)
            .or(self.date.expr().year())
    }

    /// Explicit month when it is 1-12, else the month of the record date
    pub fn month(&self) -> Expr {
        Expr::field(self.month)
            .to_int()
            .within(1.0, 12.0)
            .or(self.date.expr().month())
    }

    pub fn date(&self) -> Expr {
        self.date.expr().iso_date()
    }

    pub fn category(&self) -> Expr {
        self.category.expr().to_text()
    }

    pub fn description(&self) -> Expr {
        self.description.expr().to_text()
    }

    /// Fields of the normalizing projection: canonical values plus the
    /// carried-through raw fields. Every field has one JSON type (or null)
    /// whatever the stored record holds.
    pub fn projection(&self) -> Vec<(String, Expr)> {
        let mut out = vec![
            (fields::AMOUNT.to_string(), self.amount()),
            (fields::YEAR.to_string(), self.year()),
            (fields::MONTH.to_string(), self.month()),
            (fields::DATE.to_string(), self.date()),
            (fields::CATEGORY.to_string(), self.category()),
            (fields::DESCRIPTION.to_string(), self.description()),
            (
                fields::MP_KEY.to_string(),
                Expr::field("mpId").to_id_string(),
            ),
        ];
        out.extend(
            self.passthrough
                .iter()
                .map(|name| (name.to_string(), Expr::field(*name))),
        );
        out.extend(
            self.text
                .iter()
                .map(|name| (name.to_string(), Expr::field(*name).to_text())),
        );
        out.extend(
            self.numbers
                .iter()
                .map(|name| (name.to_string(), Expr::field(*name).to_double())),
        );
        out
    }
}

/// Canonical values of one record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub amount: f64,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Normalize a single raw document with the same expressions the views use
pub fn normalize_record(map: &FieldMap, doc: &Value) -> NormalizedRecord {
    let text = |expr: Expr| match evaluate(&expr, doc) {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    };

    NormalizedRecord {
        amount: as_number(&evaluate(&map.amount(), doc)).unwrap_or(0.0),
        year: to_double(&evaluate(&map.year(), doc)).map(|n| n as i32),
        month: to_double(&evaluate(&map.month(), doc)).map(|n| n as u32),
        date: text(map.date()),
        category: text(map.category()),
        description: text(map.description()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_current_fields_win() {
        let doc = json!({
            "amount": 1200, "expenditureAmount": 99,
            "expenditureDate": "2021-06-10", "date": "2019-01-01",
            "category": "Roads", "workCategory": "Other",
            "workDescription": "Village road", "description": "old",
        });
        let record = normalize_record(&EXPENDITURE_FIELDS, &doc);
        assert_eq!(record.amount, 1200.0);
        assert_eq!(record.year, Some(2021));
        assert_eq!(record.month, Some(6));
        assert_eq!(record.date.as_deref(), Some("2021-06-10"));
        assert_eq!(record.category.as_deref(), Some("Roads"));
        assert_eq!(record.description.as_deref(), Some("Village road"));
    }

    #[test]
    fn test_legacy_fields_fill_in() {
        let doc = json!({
            "expenditureAmount": "2,500.50",
            "date": "15-03-2020",
            "workCategory": "Education",
            "description": "School building",
        });
        let record = normalize_record(&EXPENDITURE_FIELDS, &doc);
        assert_eq!(record.amount, 2500.5);
        assert_eq!(record.year, Some(2020));
        assert_eq!(record.month, Some(3));
        assert_eq!(record.date.as_deref(), Some("2020-03-15"));
        assert_eq!(record.category.as_deref(), Some("Education"));
        assert_eq!(record.description.as_deref(), Some("School building"));
    }

    #[test]
    fn test_amount_defaults_and_clamps() {
        let missing = normalize_record(&EXPENDITURE_FIELDS, &json!({}));
        assert_eq!(missing.amount, 0.0);
        assert_eq!(missing.year, None);

        let garbage = normalize_record(&EXPENDITURE_FIELDS, &json!({ "amount": "n/a" }));
        assert_eq!(garbage.amount, 0.0);

        let negative = normalize_record(&EXPENDITURE_FIELDS, &json!({ "amount": -400 }));
        assert_eq!(negative.amount, 0.0);

        let wrapped = normalize_record(
            &EXPENDITURE_FIELDS,
            &json!({ "amount": { "$numberDecimal": "75.25" } }),
        );
        assert_eq!(wrapped.amount, 75.25);
    }

    #[test]
    fn test_explicit_year_beats_date() {
        let doc = json!({ "year": "2022", "month": 4, "expenditureDate": "2019-12-01" });
        let record = normalize_record(&EXPENDITURE_FIELDS, &doc);
        assert_eq!(record.year, Some(2022));
        assert_eq!(record.month, Some(4));
    }

    #[test]
    fn test_unparseable_explicit_year_falls_back_to_date() {
        let doc = json!({ "year": "FY", "expenditureDate": "2019-12-01" });
        let record = normalize_record(&EXPENDITURE_FIELDS, &doc);
        assert_eq!(record.year, Some(2019));
    }

    #[test]
    fn test_mistyped_fields_are_coerced() {
        let doc = json!({
            "amount": 10, "workCategory": 7, "workDescription": ["a"],
            "year": 1e12, "month": -1, "expenditureDate": "2022-08-09",
        });
        let record = normalize_record(&EXPENDITURE_FIELDS, &doc);
        assert_eq!(record.category.as_deref(), Some("7"));
        assert_eq!(record.description, None);
        assert_eq!(record.year, Some(2022));
        assert_eq!(record.month, Some(8));

        let undated = normalize_record(&EXPENDITURE_FIELDS, &json!({ "month": 13 }));
        assert_eq!(undated.month, None);
    }

    #[test]
    fn test_work_field_maps() {
        let completed = json!({
            "cost": 5000, "completionDate": "2023-02-01", "work": "Borewell",
        });
        let record = normalize_record(&COMPLETED_WORK_FIELDS, &completed);
        assert_eq!(record.amount, 5000.0);
        assert_eq!(record.year, Some(2023));
        assert_eq!(record.description.as_deref(), Some("Borewell"));

        let recommended = json!({
            "recommendedAmount": 800, "cost": 1, "recommendationYear": 2024, "date": "2020-01-01",
        });
        let record = normalize_record(&RECOMMENDED_WORK_FIELDS, &recommended);
        assert_eq!(record.amount, 800.0);
        assert_eq!(record.year, Some(2024));
        assert_eq!(record.month, Some(1));
    }

    #[test]
    fn test_projection_carries_passthrough_fields() {
        let names: Vec<String> = EXPENDITURE_FIELDS
            .projection()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        for expected in ["amount", "year", "month", "date", "mpKey", "vendor", "house", "lsTerm", "state"] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }
}
