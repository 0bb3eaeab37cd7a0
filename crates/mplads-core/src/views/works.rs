//! Paginated completed and recommended works

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::{acc, named, record_prefix, Analytics, ListPipelines, RecordFilters, TOTAL};
use crate::error::Result;
use crate::models::{FilterParams, RecordFilterEcho, WorkKind, WorkRow, WorksSummary};
use crate::normalize::{
    fields, FieldMap, COMPLETED_WORK_FIELDS, RECOMMENDED_WORK_FIELDS,
};
use crate::paging::{Page, SortAlias, SortSpec};
use crate::pipeline::{Accumulator, Expr, Filter, SortOrder};
use crate::shape::{self, Envelope, PaginationMeta};
use crate::store::RecordStore;

/// Record filters plus the works collection that was read
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkFilters {
    pub kind: WorkKind,
    #[serde(flatten)]
    pub records: RecordFilterEcho,
}

pub type WorkList = Envelope<WorkRow, WorksSummary, WorkFilters>;

/// Public sort keys for the works list
pub const WORK_SORTS: &[SortAlias] = &[
    ("date", fields::DATE),
    ("amount", fields::AMOUNT),
    ("cost", fields::AMOUNT),
    ("year", fields::YEAR),
    ("category", fields::CATEGORY),
    ("beneficiaries", "beneficiaries"),
    ("mp", "mpName"),
];

const DEFAULT_SORT: SortSpec = SortSpec::new("date", fields::DATE, SortOrder::Desc);


fn field_map(kind: WorkKind) -> &'static FieldMap {
    match kind {
        WorkKind::Completed => &COMPLETED_WORK_FIELDS,
        WorkKind::Recommended => &RECOMMENDED_WORK_FIELDS,
    }
}

impl<S: RecordStore> Analytics<S> {
    /// Works of the selected kind in scope, one page at a time
    pub async fn works_list(&self, params: &FilterParams) -> Result<WorkList> {
        let kind = WorkKind::resolve(params.kind.as_deref());
        let scope = self.scope(params);
        let records = RecordFilters::resolve(params);
        let page = Page::resolve(
            params.page.as_deref(),
            params.limit.as_deref(),
            &self.config.pagination,
        );
        let sort = SortSpec::resolve(params.sort.as_deref(), WORK_SORTS, DEFAULT_SORT);

        let prefix = record_prefix(
            field_map(kind),
            Filter::all(vec![scope.filter(), records.pre_filter()]),
            true,
            records.post_filter(),
        );
        let lists = ListPipelines::compose(
            prefix,
            &sort,
            &page,
            row_fields(),
            vec![
                acc("totalCost", Accumulator::Sum(Expr::field(fields::AMOUNT))),
                acc("averageCost", Accumulator::Avg(Expr::field(fields::AMOUNT))),
                acc(
                    "totalBeneficiaries",
                    Accumulator::Sum(Expr::number_or_zero("beneficiaries")),
                ),
                acc("totalWorks", Accumulator::Count),
                acc("mps", Accumulator::AddToSet(Expr::field(fields::MP_KEY))),
            ],
            vec![
                named("totalCost", Expr::field("totalCost").round(2)),
                named("averageCost", Expr::field("averageCost").round(2)),
                named("totalBeneficiaries", Expr::field("totalBeneficiaries")),
                named("totalWorks", Expr::field("totalWorks")),
                named("uniqueMps", Expr::field("mps").size()),
            ],
        );

        let collection = kind.collection();
        let (data, count, summary) = tokio::try_join!(
            self.run(collection, &lists.data),
            self.run(collection, &lists.count),
            self.run(collection, &lists.summary),
        )?;

        let total = shape::count_total(&count, TOTAL);
        let data: Vec<WorkRow> = shape::rows(data)?;
        info!(kind = ?kind, rows = data.len(), total, "Works list complete");

        Ok(Envelope {
            data,
            pagination: PaginationMeta::new(&page, total),
            summary: shape::single_or_default(summary)?,
            filters: WorkFilters {
                kind,
                records: records.echo(&scope, Some(&sort)),
            },
            generated_at: Utc::now(),
        })
    }
}

fn row_fields() -> Vec<(String, Expr)> {
    vec![
        named("id", Expr::field("_id").to_id_string()),
        named("mpId", Expr::field(fields::MP_KEY)),
        named("mpName", Expr::field("mpName")),
        named("constituency", Expr::field("constituency")),
        named("state", Expr::field("state")),
        named("house", Expr::field("house")),
        named("term", Expr::field("lsTerm").to_int()),
        named("amount", Expr::field(fields::AMOUNT).round(2)),
        named("year", Expr::field(fields::YEAR)),
        named("month", Expr::field(fields::MONTH)),
        named("date", Expr::field(fields::DATE)),
        named("category", Expr::field(fields::CATEGORY)),
        named("description", Expr::field(fields::DESCRIPTION)),
        named("beneficiaries", Expr::field("beneficiaries").to_double()),
    ]
}
