//! Data models for the analytics core
//!
//! Domain enums (collections, houses, terms, metrics) and the typed results
//! each view returns. Results serialize with camelCase keys, matching the
//! field names the pipelines project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Record collections the engine reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Expenditures,
    WorksCompleted,
    WorksRecommended,
    MemberSummaries,
    Members,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expenditures => "expenditures",
            Self::WorksCompleted => "works_completed",
            Self::WorksRecommended => "works_recommended",
            Self::MemberSummaries => "mp_summaries",
            Self::Members => "mps",
        }
    }

    pub fn all() -> &'static [Collection] {
        &[
            Self::Expenditures,
            Self::WorksCompleted,
            Self::WorksRecommended,
            Self::MemberSummaries,
            Self::Members,
        ]
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::all().iter().map(Collection::as_str).collect();
                format!("Unknown collection: {} (valid: {})", s, names.join(", "))
            })
    }
}

/// Chamber of parliament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum House {
    #[serde(rename = "Lok Sabha")]
    LokSabha,
    #[serde(rename = "Rajya Sabha")]
    RajyaSabha,
}

impl House {
    /// Value stored in the `house` field of every collection
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LokSabha => "Lok Sabha",
            Self::RajyaSabha => "Rajya Sabha",
        }
    }

    pub fn all() -> &'static [House] {
        &[Self::LokSabha, Self::RajyaSabha]
    }

    /// Resolve a house parameter. Anything that is not a recognizable house
    /// (absent, "both", "all", garbage) means both houses.
    pub fn selection(raw: Option<&str>) -> Option<House> {
        let raw = raw?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse() {
            Ok(house) => Some(house),
            Err(_) => {
                let lowered = raw.to_lowercase();
                if lowered != "both" && lowered != "all" {
                    warn!(house = raw, "Unrecognized house, using both houses");
                }
                None
            }
        }
    }
}

impl std::str::FromStr for House {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match compact.as_str() {
            "loksabha" | "ls" | "lok" => Ok(Self::LokSabha),
            "rajyasabha" | "rs" | "rajya" => Ok(Self::RajyaSabha),
            _ => Err(format!(
                "Unknown house: {} (valid: Lok Sabha, Rajya Sabha)",
                s
            )),
        }
    }
}

/// Lok Sabha terms present in the data
pub const LOK_SABHA_TERMS: [u8; 2] = [17, 18];

/// Which Lok Sabha term(s) are in scope for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermSelection {
    Single(u8),
    Both,
}

impl TermSelection {
    /// Resolve a raw term parameter: "17"/"18" pick one term, "both"/"all"
    /// pick both, anything else falls back to `default`
    pub fn resolve(raw: Option<&str>, default: TermSelection) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => default,
            Some(s) => s.parse().unwrap_or_else(|_| {
                warn!(term = s, "Unrecognized term, using default");
                default
            }),
        }
    }

    pub fn terms(&self) -> Vec<u8> {
        match self {
            Self::Single(term) => vec![*term],
            Self::Both => LOK_SABHA_TERMS.to_vec(),
        }
    }
}

impl std::str::FromStr for TermSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        if lowered == "both" || lowered == "all" {
            return Ok(Self::Both);
        }
        match lowered.parse::<u8>() {
            Ok(term) if LOK_SABHA_TERMS.contains(&term) => Ok(Self::Single(term)),
            _ => Err(format!("Unknown term: {} (valid: 17, 18, both)", s)),
        }
    }
}

impl std::fmt::Display for TermSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(term) => write!(f, "{}", term),
            Self::Both => f.write_str("both"),
        }
    }
}

impl Serialize for TermSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Single(term) => serializer.serialize_u8(*term),
            Self::Both => serializer.serialize_str("both"),
        }
    }
}

impl<'de> Deserialize<'de> for TermSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Time bucket for trend views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Yearly,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Monthly => "monthly",
        }
    }

    /// Resolve a raw granularity, defaulting to yearly
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or(Self::Yearly)
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yearly" | "year" | "annual" => Ok(Self::Yearly),
            "monthly" | "month" => Ok(Self::Monthly),
            _ => Err(format!(
                "Unknown granularity: {} (valid: yearly, monthly)",
                s
            )),
        }
    }
}

/// Ranking metric for top performers, sourced from member summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Utilization,
    TotalExpenditure,
    CompletedWorks,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utilization => "utilization",
            Self::TotalExpenditure => "total_expenditure",
            Self::CompletedWorks => "completed_works",
        }
    }

    /// Member summary field holding this metric
    pub fn field(&self) -> &'static str {
        match self {
            Self::Utilization => "utilizationPercentage",
            Self::TotalExpenditure => "totalExpenditure",
            Self::CompletedWorks => "completedWorksCount",
        }
    }

    pub fn all() -> &'static [Metric] {
        &[Self::Utilization, Self::TotalExpenditure, Self::CompletedWorks]
    }

    /// Resolve a raw metric, falling back to utilization
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::Utilization,
            Some(s) => s.parse().unwrap_or_else(|_| {
                warn!(metric = s, "Unrecognized metric, using utilization");
                Self::Utilization
            }),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match compact.as_str() {
            "utilization" | "utilisation" | "utilizationpercentage" => Ok(Self::Utilization),
            "expenditure" | "totalexpenditure" | "spent" => Ok(Self::TotalExpenditure),
            "works" | "completedworks" | "completedworkscount" => Ok(Self::CompletedWorks),
            _ => Err(format!(
                "Unknown metric: {} (valid: utilization, total_expenditure, completed_works)",
                s
            )),
        }
    }
}

/// Which works collection a works listing reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkKind {
    Completed,
    Recommended,
}

impl WorkKind {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Completed => Collection::WorksCompleted,
            Self::Recommended => Collection::WorksRecommended,
        }
    }

    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("recommended") => Self::Recommended,
            _ => Self::Completed,
        }
    }
}

/// Raw request parameters, exactly as received (all optional).
///
/// Every view resolves the subset it needs; malformed values are dropped or
/// clamped during resolution, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    pub state: Option<String>,
    pub house: Option<String>,
    pub term: Option<String>,
    pub granularity: Option<String>,
    pub top_n: Option<String>,
    pub metric: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub mp_id: Option<String>,
    pub year: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub kind: Option<String>,
}

impl FilterParams {
    /// Build from query-string style pairs; unknown keys are ignored
    pub fn from_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            params.set(key.as_ref(), value.as_ref());
        }
        params
    }

    /// Set one parameter by its public name (snake_case or camelCase)
    pub fn set(&mut self, key: &str, value: &str) {
        let value = Some(value.to_string());
        match key {
            "start_year" | "startYear" => self.start_year = value,
            "end_year" | "endYear" => self.end_year = value,
            "state" => self.state = value,
            "house" => self.house = value,
            "term" | "lsTerm" => self.term = value,
            "granularity" => self.granularity = value,
            "top_n" | "topN" | "limit_top" => self.top_n = value,
            "metric" => self.metric = value,
            "page" => self.page = value,
            "limit" => self.limit = value,
            "sort" => self.sort = value,
            "mp_id" | "mpId" => self.mp_id = value,
            "year" => self.year = value,
            "min_amount" | "minAmount" => self.min_amount = value,
            "max_amount" | "maxAmount" => self.max_amount = value,
            "category" => self.category = value,
            "search" => self.search = value,
            "kind" => self.kind = value,
            other => warn!(param = other, "Ignoring unknown filter parameter"),
        }
    }
}

// ========== Utilization trends ==========

/// One period of the utilization trend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendPoint {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub total_expenditure: f64,
    pub transaction_count: i64,
    pub average_transaction: f64,
    pub mp_count: i64,
    pub works_completed: i64,
    pub works_cost: f64,
}

/// Scope-wide allocation and spending, from member summaries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendSummary {
    pub total_allocated: f64,
    pub total_expenditure: f64,
    pub overall_utilization: f64,
    pub average_utilization: f64,
    pub member_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendFilters {
    pub house: Option<House>,
    pub term: TermSelection,
    pub state: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsReport {
    pub data: Vec<TrendPoint>,
    pub summary: TrendSummary,
    pub filters: TrendFilters,
    pub generated_at: DateTime<Utc>,
}

// ========== Top performers ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Performer {
    pub rank: u32,
    pub mp_id: Option<String>,
    pub name: Option<String>,
    pub constituency: Option<String>,
    pub party: Option<String>,
    pub state: Option<String>,
    pub house: Option<String>,
    pub term: Option<i64>,
    pub allocated_amount: f64,
    pub total_expenditure: f64,
    pub utilization_percentage: f64,
    pub completed_works_count: f64,
    pub recommended_works_count: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopulationStats {
    pub member_count: i64,
    pub average_utilization: f64,
    pub average_expenditure: f64,
    pub average_completed_works: f64,
    pub total_allocated: f64,
    pub total_expenditure: f64,
}

/// Best member of one state for the selected metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateLeader {
    pub state: Option<String>,
    pub mp_id: Option<String>,
    pub name: Option<String>,
    pub house: Option<String>,
    pub value: f64,
    pub member_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformerFilters {
    pub house: Option<House>,
    pub term: TermSelection,
    pub state: Option<String>,
    pub metric: Metric,
    pub top_n: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformersReport {
    pub data: Vec<Performer>,
    pub statistics: PopulationStats,
    pub state_leaders: Vec<StateLeader>,
    pub filters: PerformerFilters,
    pub generated_at: DateTime<Utc>,
}

// ========== Performance distribution ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub label: String,
    /// Inclusive lower bound; none for the overflow bucket
    pub min: Option<f64>,
    /// Exclusive upper bound (inclusive for the last range); none for overflow
    pub max: Option<f64>,
    pub count: i64,
    pub share: f64,
    pub average_utilization: f64,
    pub total_allocated: f64,
    pub total_expenditure: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseComparison {
    pub house: Option<String>,
    pub member_count: i64,
    pub average_utilization: f64,
    pub total_allocated: f64,
    pub total_expenditure: f64,
    pub overall_utilization: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionFilters {
    pub house: Option<House>,
    pub term: TermSelection,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    pub buckets: Vec<DistributionBucket>,
    pub total_members: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_comparison: Option<Vec<HouseComparison>>,
    pub filters: DistributionFilters,
    pub generated_at: DateTime<Utc>,
}

// ========== Expenditure list ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenditureRow {
    pub id: Option<String>,
    pub mp_id: Option<String>,
    pub mp_name: Option<String>,
    pub constituency: Option<String>,
    pub party: Option<String>,
    pub state: Option<String>,
    pub house: Option<String>,
    pub term: Option<i64>,
    pub amount: f64,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub vendor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenditureSummary {
    pub total_amount: f64,
    pub average_amount: f64,
    pub max_amount: f64,
    pub min_amount: f64,
    pub total_transactions: i64,
    pub unique_mps: i64,
    pub unique_categories: i64,
    pub unique_vendors: i64,
}

/// Echo of the resolved record filters shared by list views
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilterEcho {
    pub house: Option<House>,
    pub term: Option<TermSelection>,
    pub state: Option<String>,
    pub mp_id: Option<String>,
    pub year: Option<i32>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

// ========== Expenditure categories ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct YearAmount {
    pub year: Option<i32>,
    pub amount: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryTotal {
    pub category: String,
    pub total_amount: f64,
    pub transaction_count: i64,
    pub share: f64,
    pub yearly: Vec<YearAmount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryTotals {
    pub total_amount: f64,
    pub transaction_count: i64,
    pub category_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesReport {
    pub data: Vec<CategoryTotal>,
    pub summary: CategoryTotals,
    pub filters: RecordFilterEcho,
    pub generated_at: DateTime<Utc>,
}

// ========== Works ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkRow {
    pub id: Option<String>,
    pub mp_id: Option<String>,
    pub mp_name: Option<String>,
    pub constituency: Option<String>,
    pub state: Option<String>,
    pub house: Option<String>,
    pub term: Option<i64>,
    pub amount: f64,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub beneficiaries: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorksSummary {
    pub total_cost: f64,
    pub average_cost: f64,
    pub total_beneficiaries: f64,
    pub total_works: i64,
    pub unique_mps: i64,
}

// ========== Filter options ==========

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub houses: Vec<House>,
    pub terms: Vec<u8>,
    pub default_term: TermSelection,
    pub states: Vec<String>,
    pub years: Vec<i32>,
    pub categories: Vec<String>,
    pub metrics: Vec<Metric>,
    pub granularities: Vec<Granularity>,
    pub sort_fields: Vec<&'static str>,
    pub max_limit: u64,
    pub filters: DistributionFilters,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_house_parsing() {
        assert_eq!("Lok Sabha".parse::<House>().unwrap(), House::LokSabha);
        assert_eq!("lok_sabha".parse::<House>().unwrap(), House::LokSabha);
        assert_eq!("RS".parse::<House>().unwrap(), House::RajyaSabha);
        assert!("Vidhan Sabha".parse::<House>().is_err());

        assert_eq!(House::selection(Some("Rajya Sabha")), Some(House::RajyaSabha));
        assert_eq!(House::selection(Some("both")), None);
        assert_eq!(House::selection(Some("")), None);
        assert_eq!(House::selection(None), None);
    }

    #[test]
    fn test_term_resolution() {
        let default = TermSelection::Single(18);
        assert_eq!(TermSelection::resolve(None, default), default);
        assert_eq!(TermSelection::resolve(Some("17"), default), TermSelection::Single(17));
        assert_eq!(TermSelection::resolve(Some("Both"), default), TermSelection::Both);
        assert_eq!(TermSelection::resolve(Some("16"), default), default);
        assert_eq!(TermSelection::resolve(Some("x"), default), default);
        assert_eq!(TermSelection::Both.terms(), vec![17, 18]);
    }

    #[test]
    fn test_term_serde() {
        assert_eq!(serde_json::to_value(TermSelection::Single(17)).unwrap(), 17);
        assert_eq!(serde_json::to_value(TermSelection::Both).unwrap(), "both");

        let parsed: TermSelection = serde_json::from_str("18").unwrap();
        assert_eq!(parsed, TermSelection::Single(18));
        let parsed: TermSelection = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(parsed, TermSelection::Both);
        assert!(serde_json::from_str::<TermSelection>("16").is_err());
    }

    #[test]
    fn test_metric_aliases_and_fallback() {
        assert_eq!(Metric::resolve(Some("totalExpenditure")), Metric::TotalExpenditure);
        assert_eq!(Metric::resolve(Some("completed_works")), Metric::CompletedWorks);
        assert_eq!(Metric::resolve(Some("popularity")), Metric::Utilization);
        assert_eq!(Metric::resolve(None), Metric::Utilization);
        assert_eq!(Metric::CompletedWorks.field(), "completedWorksCount");
    }

    #[test]
    fn test_granularity_default() {
        assert_eq!(Granularity::resolve(Some("Monthly")), Granularity::Monthly);
        assert_eq!(Granularity::resolve(Some("weekly")), Granularity::Yearly);
        assert_eq!(Granularity::resolve(None), Granularity::Yearly);
    }

    #[test]
    fn test_collection_from_str() {
        assert_eq!(
            "mp_summaries".parse::<Collection>().unwrap(),
            Collection::MemberSummaries
        );
        assert_eq!(
            "works-completed".parse::<Collection>().unwrap(),
            Collection::WorksCompleted
        );
        assert!("budgets".parse::<Collection>().is_err());
    }

    #[test]
    fn test_filter_params_from_pairs() {
        let params = FilterParams::from_pairs(&[
            ("house", "Lok Sabha"),
            ("minAmount", "100"),
            ("unknown", "x"),
        ]);
        assert_eq!(params.house.as_deref(), Some("Lok Sabha"));
        assert_eq!(params.min_amount.as_deref(), Some("100"));
        assert!(params.search.is_none());
    }
}
