//! Utilization trends

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{acc, named, record_prefix, year_range, Analytics};
use crate::error::Result;
use crate::gate::Scope;
use crate::models::{
    Collection, FilterParams, Granularity, TrendFilters, TrendPoint, TrendSummary, TrendsReport,
};
use crate::normalize::{fields, FieldMap, COMPLETED_WORK_FIELDS, EXPENDITURE_FIELDS};
use crate::pipeline::{Accumulator, Expr, Filter, Pipeline, SortOrder, Stage};
use crate::sanitize;
use crate::shape::{self, percentage};
use crate::store::RecordStore;

/// Completed works of one period
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PeriodWorks {
    year: i32,
    month: Option<u32>,
    house: Option<String>,
    state: Option<String>,
    works_completed: i64,
    works_cost: f64,
}

type PeriodKey = (i32, Option<u32>, Option<String>, Option<String>);

/// Period grouping: year (and month), split by house when both houses are
/// in scope and by state when a state filter is given
fn period_key(granularity: Granularity, scope: &Scope) -> Vec<(String, Expr)> {
    let mut key = vec![named("year", Expr::field(fields::YEAR))];
    if granularity == Granularity::Monthly {
        key.push(named("month", Expr::field(fields::MONTH)));
    }
    if scope.house.is_none() {
        key.push(named("house", Expr::field("house")));
    }
    if scope.state.is_some() {
        key.push(named("state", Expr::field("state")));
    }
    key
}

fn period_fields() -> Vec<(String, Expr)> {
    ["year", "month", "house", "state"]
        .iter()
        .map(|name| named(name, Expr::field(format!("_id.{}", name))))
        .collect()
}

fn dated_records(map: &FieldMap, scope: &Scope, start: Option<i32>, end: Option<i32>) -> Pipeline {
    let mut post = vec![Filter::Ne(fields::YEAR.to_string(), Value::Null)];
    post.extend(year_range(start, end));
    record_prefix(map, scope.filter(), false, Filter::all(post))
}

impl<S: RecordStore> Analytics<S> {
    /// Expenditure and completed-works totals per period, with the scope's
    /// overall allocation and utilization
    pub async fn utilization_trends(&self, params: &FilterParams) -> Result<TrendsReport> {
        let scope = self.scope(params);
        let granularity = Granularity::resolve(params.granularity.as_deref());
        let mut start_year = sanitize::parse_year(params.start_year.as_deref());
        let end_year = sanitize::parse_year(params.end_year.as_deref());

        if granularity == Granularity::Monthly {
            let window_start =
                self.today.year() - (self.config.monthly_window_years as i32 - 1);
            start_year = Some(start_year.map_or(window_start, |s| s.max(window_start)));
        }

        let key = period_key(granularity, &scope);
        let sort: Vec<(String, SortOrder)> = key
            .iter()
            .map(|(name, _)| (format!("_id.{}", name), SortOrder::Asc))
            .collect();

        let mut expenditure_fields = period_fields();
        expenditure_fields.extend([
            named("totalExpenditure", Expr::field("totalExpenditure").round(2)),
            named("transactionCount", Expr::field("transactionCount")),
            named("averageTransaction", Expr::field("averageTransaction").round(2)),
            named("mpCount", Expr::field("mps").size()),
        ]);
        let expenditures = dated_records(&EXPENDITURE_FIELDS, &scope, start_year, end_year)
            .stage(Stage::Group {
                key: key.clone(),
                accumulators: vec![
                    acc("totalExpenditure", Accumulator::Sum(Expr::field(fields::AMOUNT))),
                    acc("transactionCount", Accumulator::Count),
                    acc("averageTransaction", Accumulator::Avg(Expr::field(fields::AMOUNT))),
                    acc("mps", Accumulator::AddToSet(Expr::field(fields::MP_KEY))),
                ],
            })
            .stage(Stage::Sort(sort.clone()))
            .stage(Stage::Project(expenditure_fields));

        let mut works_fields = period_fields();
        works_fields.extend([
            named("worksCompleted", Expr::field("worksCompleted")),
            named("worksCost", Expr::field("worksCost").round(2)),
        ]);
        let works = dated_records(&COMPLETED_WORK_FIELDS, &scope, start_year, end_year)
            .stage(Stage::Group {
                key,
                accumulators: vec![
                    acc("worksCompleted", Accumulator::Count),
                    acc("worksCost", Accumulator::Sum(Expr::field(fields::AMOUNT))),
                ],
            })
            .stage(Stage::Sort(sort))
            .stage(Stage::Project(works_fields));

        let summary = member_totals(&scope);

        let (expenditures, works, summary) = tokio::try_join!(
            self.run(Collection::Expenditures, &expenditures),
            self.run(Collection::WorksCompleted, &works),
            self.run(Collection::MemberSummaries, &summary),
        )?;

        let data = merge_periods(shape::rows(expenditures)?, shape::rows(works)?);
        let mut summary: TrendSummary = shape::single_or_default(summary)?;
        summary.overall_utilization = percentage(summary.total_expenditure, summary.total_allocated);
        info!(
            granularity = granularity.as_str(),
            points = data.len(),
            "Utilization trends complete"
        );

        Ok(TrendsReport {
            data,
            summary,
            filters: TrendFilters {
                house: scope.house,
                term: scope.term,
                state: scope.state.clone(),
                start_year,
                end_year,
                granularity,
            },
            generated_at: Utc::now(),
        })
    }
}

/// Allocation, spending and average utilization of the members in scope
fn member_totals(scope: &Scope) -> Pipeline {
    Pipeline::new()
        .filter(scope.filter())
        .stage(Stage::Group {
            key: Vec::new(),
            accumulators: vec![
                acc(
                    "totalAllocated",
                    Accumulator::Sum(Expr::number_or_zero("allocatedAmount")),
                ),
                acc(
                    "totalExpenditure",
                    Accumulator::Sum(Expr::number_or_zero("totalExpenditure")),
                ),
                acc(
                    "averageUtilization",
                    Accumulator::Avg(Expr::number_or_zero("utilizationPercentage")),
                ),
                acc("memberCount", Accumulator::Count),
            ],
        })
        .stage(Stage::Project(vec![
            named("totalAllocated", Expr::field("totalAllocated").round(2)),
            named("totalExpenditure", Expr::field("totalExpenditure").round(2)),
            named("averageUtilization", Expr::field("averageUtilization").round(2)),
            named("memberCount", Expr::field("memberCount")),
        ]))
}

/// Attach completed-works figures to expenditure periods. Periods with
/// works but no spending are kept with zero expenditure.
fn merge_periods(expenditures: Vec<TrendPoint>, works: Vec<PeriodWorks>) -> Vec<TrendPoint> {
    let mut points: BTreeMap<PeriodKey, TrendPoint> = BTreeMap::new();
    for point in expenditures {
        let key = (point.year, point.month, point.house.clone(), point.state.clone());
        points.insert(key, point);
    }
    for period in works {
        let key = (period.year, period.month, period.house.clone(), period.state.clone());
        let point = points.entry(key).or_insert_with(|| TrendPoint {
            year: period.year,
            month: period.month,
            house: period.house,
            state: period.state,
            ..Default::default()
        });
        point.works_completed = period.works_completed;
        point.works_cost = period.works_cost;
    }
    points.into_values().collect()
}
