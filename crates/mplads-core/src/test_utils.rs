//! Test utilities for mplads-core
//!
//! A small population covering both houses, three Lok Sabha terms and both
//! generations of record layout, available as a seeded [`MemoryStore`] or
//! loaded into a [`Database`].

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::config::AnalyticsConfig;
use crate::db::Database;
use crate::error::Result;
use crate::models::Collection;
use crate::store::{MemoryStore, RecordStore};
use crate::views::Analytics;

/// Reference date for trailing windows in fixtures
pub fn fixture_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default()
}

/// Member profiles. One uses the `{"$oid"}` identifier form.
pub fn members() -> Vec<Value> {
    vec![
        json!({
            "_id": { "$oid": "ls17-a" }, "name": "Asha Nair", "constituency": "Kochi",
            "party": "P1", "state": "Kerala", "house": "Lok Sabha",
        }),
        json!({
            "_id": "ls18-b", "name": "Bhim Rao", "constituency": "Patna",
            "party": "P2", "state": "Bihar", "house": "Lok Sabha",
        }),
        json!({ "_id": "rs-c", "name": "Chitra Das", "state": "Kerala", "house": "Rajya Sabha" }),
        json!({ "_id": "ls18-d", "name": "Dev Singh", "state": "Punjab", "house": "Lok Sabha" }),
    ]
}

/// Per-member allocation and utilization. Covers numeric text, missing
/// counts, utilization above 100 and a term outside the selectable ones.
pub fn member_summaries() -> Vec<Value> {
    vec![
        json!({
            "_id": "s1", "mpId": "ls17-a", "name": "Asha Nair", "constituency": "Kochi",
            "party": "P1", "state": "Kerala", "house": "Lok Sabha", "lsTerm": 17,
            "allocatedAmount": 500, "totalExpenditure": 460, "utilizationPercentage": 92,
            "completedWorksCount": 12, "recommendedWorksCount": 15,
        }),
        json!({
            "_id": "s2", "mpId": "ls18-b", "name": "Bhim Rao", "constituency": "Patna",
            "party": "P2", "state": "Bihar", "house": "Lok Sabha", "lsTerm": 18,
            "allocatedAmount": 500, "totalExpenditure": 250, "utilizationPercentage": 50,
            "completedWorksCount": 5, "recommendedWorksCount": 9,
        }),
        json!({
            "_id": "s3", "mpId": "ls18-d", "name": "Dev Singh", "state": "Punjab",
            "house": "Lok Sabha", "lsTerm": 18, "allocatedAmount": 500,
            "totalExpenditure": "500", "utilizationPercentage": 100,
            "completedWorksCount": 8, "recommendedWorksCount": 8,
        }),
        json!({
            "_id": "s4", "mpId": "rs-c", "name": "Chitra Das", "state": "Kerala",
            "house": "Rajya Sabha", "allocatedAmount": 400, "totalExpenditure": 100,
            "utilizationPercentage": 25, "completedWorksCount": 3, "recommendedWorksCount": 4,
        }),
        json!({
            "_id": "s5", "mpId": "rs-e", "name": "Esha Rao", "state": "Goa",
            "house": "Rajya Sabha", "allocatedAmount": 400, "totalExpenditure": 0,
            "utilizationPercentage": 105,
        }),
        json!({
            "_id": "s6", "mpId": "ls16-f", "name": "Farah Khan", "state": "Kerala",
            "house": "Lok Sabha", "lsTerm": 16, "utilizationPercentage": 80,
        }),
    ]
}

/// Expenditure records in current and legacy layouts
pub fn expenditures() -> Vec<Value> {
    vec![
        json!({
            "_id": "e1", "mpId": { "$oid": "ls17-a" }, "house": "Lok Sabha", "lsTerm": 17,
            "state": "Kerala", "amount": 100, "expenditureDate": "2023-04-10",
            "category": "Roads", "workDescription": "Village road repair",
            "vendor": "Kerala Builders",
        }),
        json!({
            "_id": "e2", "mpId": "ls17-a", "house": "Lok Sabha", "lsTerm": 17,
            "state": "Kerala", "expenditureAmount": "250.50", "date": "15-08-2022",
            "workCategory": "Education", "description": "School building",
        }),
        json!({
            "_id": "e3", "mpId": "ls18-b", "house": "Lok Sabha", "lsTerm": 18,
            "state": "Bihar", "amount": 300, "year": 2024, "month": 7,
            "expenditureDate": "2024-07-01", "category": "Roads", "vendor": "Patna Infra",
        }),
        json!({
            "_id": "e4", "mpId": "ls18-d", "house": "Lok Sabha", "lsTerm": 18,
            "state": "Punjab", "amount": 75.25, "expenditureDate": "2024-11-20",
            "category": "Health",
        }),
        json!({
            "_id": "e5", "mpId": "rs-c", "house": "Rajya Sabha", "state": "Kerala",
            "amount": 200, "expenditureDate": "2023-01-05", "category": "Education",
        }),
        json!({
            "_id": "e6", "mpId": "ghost", "house": "Rajya Sabha", "state": "Goa",
            "amount": -50, "expenditureDate": "2024-02-02", "category": "Roads",
        }),
        json!({
            "_id": "e7", "mpId": "ls16-f", "house": "Lok Sabha", "lsTerm": 16,
            "state": "Kerala", "amount": 999, "expenditureDate": "2020-01-01",
        }),
        json!({
            "_id": "e8", "mpId": "ls18-b", "house": "Lok Sabha", "lsTerm": 18,
            "state": "Bihar", "amount": 120, "category": "Sanitation",
        }),
    ]
}

pub fn works_completed() -> Vec<Value> {
    vec![
        json!({
            "_id": "w1", "mpId": "ls17-a", "house": "Lok Sabha", "lsTerm": 17,
            "state": "Kerala", "finalAmount": 400, "completedDate": "2023-06-15",
            "category": "Roads", "workDescription": "Road", "beneficiaries": 1200,
        }),
        json!({
            "_id": "w2", "mpId": "ls18-b", "house": "Lok Sabha", "lsTerm": 18,
            "state": "Bihar", "cost": "150", "completionDate": "2024-03-01",
            "work": "Handpump", "beneficiaries": 300,
        }),
        json!({
            "_id": "w3", "mpId": "rs-c", "house": "Rajya Sabha", "state": "Kerala",
            "finalAmount": 220, "completionYear": 2023, "completionMonth": 9,
            "category": "Education",
        }),
    ]
}

pub fn works_recommended() -> Vec<Value> {
    vec![
        json!({
            "_id": "r1", "mpId": "ls18-d", "house": "Lok Sabha", "lsTerm": 18,
            "state": "Punjab", "recommendedAmount": 600, "recommendationDate": "2024-05-05",
        }),
        json!({
            "_id": "r2", "mpId": "rs-c", "house": "Rajya Sabha", "state": "Kerala",
            "cost": 90, "date": "2022-12-12",
        }),
    ]
}

/// Every fixture collection with its documents
pub fn fixture_collections() -> Vec<(Collection, Vec<Value>)> {
    vec![
        (Collection::Members, members()),
        (Collection::MemberSummaries, member_summaries()),
        (Collection::Expenditures, expenditures()),
        (Collection::WorksCompleted, works_completed()),
        (Collection::WorksRecommended, works_recommended()),
    ]
}

/// In-memory store holding every fixture collection
pub fn seeded_store() -> MemoryStore {
    fixture_collections()
        .into_iter()
        .fold(MemoryStore::new(), |store, (collection, docs)| {
            store.with_documents(collection, docs)
        })
}

/// Rajya Sabha records whose fields hold the wrong JSON types: a numeric
/// category and vendor, an out-of-range month and year, a numeric state and
/// an object description, plus member profiles with numeric names
pub fn mistyped_store() -> MemoryStore {
    MemoryStore::new()
        .with_documents(
            Collection::Members,
            vec![
                json!({ "_id": "rs-c", "name": 42, "constituency": ["x"] }),
                json!({ "_id": "rs-e", "name": "Esha Rao" }),
            ],
        )
        .with_documents(
            Collection::MemberSummaries,
            vec![json!({
                "_id": "s4", "mpId": "rs-c", "name": 42, "state": 7, "house": "Rajya Sabha",
                "allocatedAmount": 400, "totalExpenditure": 140, "utilizationPercentage": 35,
            })],
        )
        .with_documents(
            Collection::Expenditures,
            vec![
                json!({
                    "_id": "x1", "mpId": "rs-c", "house": "Rajya Sabha", "state": "Goa",
                    "amount": 100, "expenditureDate": "2024-03-01", "category": "Roads",
                    "vendor": "Goa Works",
                }),
                json!({
                    "_id": "x2", "mpId": "rs-c", "house": "Rajya Sabha", "state": "Goa",
                    "amount": 40, "expenditureDate": "2023-02-01", "workCategory": 7,
                }),
                json!({
                    "_id": "x3", "mpId": "rs-e", "house": "Rajya Sabha", "state": 12,
                    "amount": 60, "expenditureDate": "2022-05-06", "month": -1,
                    "year": 99_999_999_999_i64, "vendor": 12345,
                    "workDescription": { "text": "Hall" },
                }),
            ],
        )
}

/// Load every fixture collection into `db`
pub fn seed_database(db: &Database) -> Result<()> {
    for (collection, docs) in fixture_collections() {
        db.insert_documents(collection, &docs)?;
    }
    Ok(())
}

/// Views over `store` with the default configuration and the fixture date
pub fn analytics<S: RecordStore>(store: S) -> Analytics<S> {
    Analytics::new(store, AnalyticsConfig::default()).with_today(fixture_today())
}
