//! Expenditure category rollup

use chrono::Utc;
use tracing::info;

use super::{acc, named, record_prefix, Analytics, RecordFilters};
use crate::error::Result;
use crate::models::{CategoriesReport, CategoryTotal, CategoryTotals, Collection, FilterParams};
use crate::normalize::{fields, EXPENDITURE_FIELDS};
use crate::pipeline::{Accumulator, Expr, Filter, Pipeline, SortOrder, Stage};
use crate::shape::{self, percentage, round2};
use crate::store::RecordStore;

/// Label for records without a category
pub const UNCATEGORIZED: &str = "Uncategorized";


fn category_key() -> Expr {
    Expr::field(fields::CATEGORY).or(Expr::lit(UNCATEGORIZED))
}

/// (year, category) totals, rolled up per category with the yearly
/// breakdown in year order, largest categories first
pub(crate) fn rollup_stages(top_n: u64) -> Pipeline {
    Pipeline::new()
        .stage(Stage::Group {
            key: vec![
                named("year", Expr::field(fields::YEAR)),
                named("category", category_key()),
            ],
            accumulators: vec![
                acc("amount", Accumulator::Sum(Expr::field(fields::AMOUNT))),
                acc("count", Accumulator::Count),
            ],
        })
        .stage(Stage::Sort(vec![("_id.year".to_string(), SortOrder::Asc)]))
        .stage(Stage::Group {
            key: vec![named("category", Expr::field("_id.category"))],
            accumulators: vec![
                acc("totalAmount", Accumulator::Sum(Expr::field("amount"))),
                acc("transactionCount", Accumulator::Sum(Expr::field("count"))),
                acc(
                    "yearly",
                    Accumulator::Push(Expr::Object(vec![
                        named("year", Expr::field("_id.year")),
                        named("amount", Expr::field("amount")),
                        named("count", Expr::field("count")),
                    ])),
                ),
            ],
        })
        .stage(Stage::Sort(vec![
            ("totalAmount".to_string(), SortOrder::Desc),
            ("_id.category".to_string(), SortOrder::Asc),
        ]))
        .stage(Stage::Limit(top_n))
        .stage(Stage::Project(vec![
            named("category", Expr::field("_id.category")),
            named("totalAmount", Expr::field("totalAmount").round(2)),
            named("transactionCount", Expr::field("transactionCount")),
            named("yearly", Expr::field("yearly")),
        ]))
}

impl<S: RecordStore> Analytics<S> {
    /// Top expenditure categories by total amount, each with a per-year
    /// breakdown and its share of all spending in scope
    pub async fn expenditure_categories(&self, params: &FilterParams) -> Result<CategoriesReport> {
        let scope = self.scope(params);
        let records = RecordFilters::resolve(params);

        let prefix = record_prefix(
            &EXPENDITURE_FIELDS,
            Filter::all(vec![scope.filter(), records.pre_filter()]),
            true,
            records.post_filter(),
        );
        let rollup = prefix.clone().then(rollup_stages(self.config.category_top_n));
        let totals = prefix
            .stage(Stage::Group {
                key: Vec::new(),
                accumulators: vec![
                    acc("totalAmount", Accumulator::Sum(Expr::field(fields::AMOUNT))),
                    acc("transactionCount", Accumulator::Count),
                    acc("categories", Accumulator::AddToSet(category_key())),
                ],
            })
            .stage(Stage::Project(vec![
                named("totalAmount", Expr::field("totalAmount").round(2)),
                named("transactionCount", Expr::field("transactionCount")),
                named("categoryCount", Expr::field("categories").size()),
            ]));

        let (rollup, totals) = tokio::try_join!(
            self.run(Collection::Expenditures, &rollup),
            self.run(Collection::Expenditures, &totals),
        )?;

        let summary: CategoryTotals = shape::single_or_default(totals)?;
        let mut data: Vec<CategoryTotal> = shape::rows(rollup)?;
        for category in &mut data {
            category.share = percentage(category.total_amount, summary.total_amount);
            for year in &mut category.yearly {
                year.amount = round2(year.amount);
            }
        }
        info!(categories = data.len(), "Category rollup complete");

        Ok(CategoriesReport {
            data,
            summary,
            filters: records.echo(&scope, None),
            generated_at: Utc::now(),
        })
    }
}
