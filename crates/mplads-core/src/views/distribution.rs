//! Utilization distribution across fixed buckets

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::performers::scored_members;
use super::{acc, named, Analytics};
use crate::error::Result;
use crate::models::{
    Collection, DistributionBucket, DistributionFilters, DistributionReport, FilterParams,
    HouseComparison,
};
use crate::pipeline::value::as_number;
use crate::pipeline::{Accumulator, Expr, SortOrder, Stage};
use crate::shape::{self, percentage};
use crate::store::RecordStore;

/// Utilization bucket boundaries; the last bucket includes 100
pub const UTILIZATION_BOUNDARIES: [f64; 6] = [0.0, 25.0, 50.0, 75.0, 90.0, 100.0];

/// Bucket id for utilization outside [0, 100]
pub const OVERFLOW_BUCKET: &str = "overflow";

const OVERFLOW_LABEL: &str = "Other";

fn bucket_outputs() -> Vec<(String, Accumulator)> {
    vec![
        acc("count", Accumulator::Count),
        acc(
            "averageUtilization",
            Accumulator::Avg(Expr::field("utilizationPercentage")),
        ),
        acc("totalAllocated", Accumulator::Sum(Expr::field("allocatedAmount"))),
        acc("totalExpenditure", Accumulator::Sum(Expr::field("totalExpenditure"))),
    ]
}

fn rounded_outputs() -> Vec<(String, Expr)> {
    vec![
        named("count", Expr::field("count")),
        named("averageUtilization", Expr::field("averageUtilization").round(2)),
        named("totalAllocated", Expr::field("totalAllocated").round(2)),
        named("totalExpenditure", Expr::field("totalExpenditure").round(2)),
    ]
}

impl<S: RecordStore> Analytics<S> {
    /// Member counts per utilization bucket. When both houses are in scope
    /// the houses are also compared side by side.
    pub async fn performance_distribution(&self, params: &FilterParams) -> Result<DistributionReport> {
        let scope = self.scope(params);
        let base = scored_members(&scope);

        let buckets = base
            .clone()
            .stage(Stage::Bucket {
                group_by: Expr::field("utilizationPercentage"),
                boundaries: UTILIZATION_BOUNDARIES.to_vec(),
                default: OVERFLOW_BUCKET.to_string(),
                output: bucket_outputs(),
            })
            .stage(Stage::Project(rounded_outputs()));

        let comparison_fields = vec![
            named("house", Expr::field("_id.house")),
            named("memberCount", Expr::field("count")),
            named("averageUtilization", Expr::field("averageUtilization").round(2)),
            named("totalAllocated", Expr::field("totalAllocated").round(2)),
            named("totalExpenditure", Expr::field("totalExpenditure").round(2)),
        ];
        let comparison = base
            .stage(Stage::Group {
                key: vec![named("house", Expr::field("house"))],
                accumulators: bucket_outputs(),
            })
            .stage(Stage::Project(comparison_fields))
            .stage(Stage::Sort(vec![("house".to_string(), SortOrder::Asc)]));

        let collection = Collection::MemberSummaries;
        let compare_houses = scope.house.is_none();
        let (buckets, comparison) = tokio::try_join!(self.run(collection, &buckets), async {
            if compare_houses {
                self.run(collection, &comparison).await.map(Some)
            } else {
                Ok(None)
            }
        })?;

        let buckets = fill_buckets(&buckets);
        let total_members: i64 = buckets.iter().map(|b| b.count).sum();
        let buckets = buckets
            .into_iter()
            .map(|b| DistributionBucket {
                share: percentage(b.count as f64, total_members as f64),
                ..b
            })
            .collect::<Vec<_>>();

        let house_comparison = match comparison {
            Some(docs) => {
                let mut rows: Vec<HouseComparison> = shape::rows(docs)?;
                for row in &mut rows {
                    row.overall_utilization =
                        percentage(row.total_expenditure, row.total_allocated);
                }
                Some(rows)
            }
            None => None,
        };
        info!(members = total_members, "Performance distribution complete");

        Ok(DistributionReport {
            buckets,
            total_members,
            house_comparison,
            filters: DistributionFilters {
                house: scope.house,
                term: scope.term,
                state: scope.state.clone(),
            },
            generated_at: Utc::now(),
        })
    }
}

/// Every bucket in boundary order, zero-filled, overflow last
fn fill_buckets(docs: &[Value]) -> Vec<DistributionBucket> {
    let mut out: Vec<DistributionBucket> = UTILIZATION_BOUNDARIES
        .windows(2)
        .map(|w| {
            let doc = docs.iter().find(|d| as_number(&d["_id"]) == Some(w[0]));
            bucket(format!("{}-{}", w[0], w[1]), Some(w[0]), Some(w[1]), doc)
        })
        .collect();
    let overflow = docs
        .iter()
        .find(|d| d["_id"].as_str() == Some(OVERFLOW_BUCKET));
    out.push(bucket(OVERFLOW_LABEL.to_string(), None, None, overflow));
    out
}

fn bucket(label: String, min: Option<f64>, max: Option<f64>, doc: Option<&Value>) -> DistributionBucket {
    let number = |field: &str| doc.and_then(|d| as_number(&d[field])).unwrap_or(0.0);
    DistributionBucket {
        label,
        min,
        max,
        count: number("count") as i64,
        share: 0.0,
        average_utilization: number("averageUtilization"),
        total_allocated: number("totalAllocated"),
        total_expenditure: number("totalExpenditure"),
    }
}
