//! Paginated expenditure list

use chrono::Utc;
use tracing::info;

use super::{acc, named, record_prefix, Analytics, ListPipelines, RecordFilters, TOTAL};
use crate::error::Result;
use crate::models::{
    Collection, ExpenditureRow, ExpenditureSummary, FilterParams, RecordFilterEcho,
};
use crate::normalize::{fields, EXPENDITURE_FIELDS};
use crate::paging::{Page, SortAlias, SortSpec};
use crate::pipeline::{Accumulator, Expr, Filter, SortOrder};
use crate::shape::{self, Envelope, PaginationMeta};
use crate::store::RecordStore;

pub type ExpenditureList = Envelope<ExpenditureRow, ExpenditureSummary, RecordFilterEcho>;

/// Public sort keys for the expenditure list
pub const EXPENDITURE_SORTS: &[SortAlias] = &[
    ("date", fields::DATE),
    ("amount", fields::AMOUNT),
    ("year", fields::YEAR),
    ("month", fields::MONTH),
    ("category", fields::CATEGORY),
    ("state", "state"),
    ("vendor", "vendor"),
    ("mp", "mpName"),
    ("mpName", "mpName"),
];

const DEFAULT_SORT: SortSpec = SortSpec::new("date", fields::DATE, SortOrder::Desc);


impl<S: RecordStore> Analytics<S> {
    /// Expenditure records in scope, one page at a time, with a summary over
    /// every matching record
    pub async fn expenditure_list(&self, params: &FilterParams) -> Result<ExpenditureList> {
        let scope = self.scope(params);
        let records = RecordFilters::resolve(params);
        let page = Page::resolve(
            params.page.as_deref(),
            params.limit.as_deref(),
            &self.config.pagination,
        );
        let sort = SortSpec::resolve(params.sort.as_deref(), EXPENDITURE_SORTS, DEFAULT_SORT);

        let prefix = record_prefix(
            &EXPENDITURE_FIELDS,
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
                acc("totalAmount", Accumulator::Sum(Expr::field(fields::AMOUNT))),
                acc("averageAmount", Accumulator::Avg(Expr::field(fields::AMOUNT))),
                acc("maxAmount", Accumulator::Max(Expr::field(fields::AMOUNT))),
                acc("minAmount", Accumulator::Min(Expr::field(fields::AMOUNT))),
                acc("totalTransactions", Accumulator::Count),
                acc("mps", Accumulator::AddToSet(Expr::field(fields::MP_KEY))),
                acc("categories", Accumulator::AddToSet(Expr::field(fields::CATEGORY))),
                acc("vendors", Accumulator::AddToSet(Expr::field("vendor"))),
            ],
            vec![
                named("totalAmount", Expr::field("totalAmount").round(2)),
                named("averageAmount", Expr::field("averageAmount").round(2)),
                named("maxAmount", Expr::field("maxAmount").round(2)),
                named("minAmount", Expr::field("minAmount").round(2)),
                named("totalTransactions", Expr::field("totalTransactions")),
                named("uniqueMps", Expr::field("mps").size()),
                named("uniqueCategories", Expr::field("categories").size()),
                named("uniqueVendors", Expr::field("vendors").size()),
            ],
        );

        let collection = Collection::Expenditures;
        let (data, count, summary) = tokio::try_join!(
            self.run(collection, &lists.data),
            self.run(collection, &lists.count),
            self.run(collection, &lists.summary),
        )?;

        let total = shape::count_total(&count, TOTAL);
        let data: Vec<ExpenditureRow> = shape::rows(data)?;
        info!(rows = data.len(), total, page = page.page, "Expenditure list complete");

        Ok(Envelope {
            data,
            pagination: PaginationMeta::new(&page, total),
            summary: shape::single_or_default(summary)?,
            filters: records.echo(&scope, Some(&sort)),
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
        named("party", Expr::field("party")),
        named("state", Expr::field("state")),
        named("house", Expr::field("house")),
        named("term", Expr::field("lsTerm").to_int()),
        named("amount", Expr::field(fields::AMOUNT).round(2)),
        named("year", Expr::field(fields::YEAR)),
        named("month", Expr::field(fields::MONTH)),
        named("date", Expr::field(fields::DATE)),
        named("category", Expr::field(fields::CATEGORY)),
        named("description", Expr::field(fields::DESCRIPTION)),
        named("vendor", Expr::field("vendor")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{analytics, mistyped_store, seeded_store};

    #[tokio::test]
    async fn test_rows_count_and_summary_agree() {
        let analytics = analytics(seeded_store());
        let params = FilterParams::from_pairs(&[("house", "both"), ("term", "both")]);
        let list = analytics.expenditure_list(&params).await.unwrap();

        assert_eq!(list.data.len() as u64, list.pagination.total);
        assert_eq!(list.summary.total_transactions as u64, list.pagination.total);
        let sum: f64 = list.data.iter().map(|r| r.amount).sum();
        assert!((sum - list.summary.total_amount).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_default_sort_is_newest_first() {
        let analytics = analytics(seeded_store());
        let list = analytics
            .expenditure_list(&FilterParams::from_pairs(&[("term", "both")]))
            .await
            .unwrap();
        let dates: Vec<&str> = list
            .data
            .iter()
            .filter_map(|r| r.date.as_deref())
            .collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
        assert_eq!(list.filters.sort.as_deref(), Some("-date"));
    }

    #[tokio::test]
    async fn test_member_join_and_missing_member() {
        let analytics = analytics(seeded_store());
        let list = analytics
            .expenditure_list(&FilterParams::from_pairs(&[("term", "both"), ("sort", "amount")]))
            .await
            .unwrap();

        let joined = list
            .data
            .iter()
            .find(|r| r.mp_id.as_deref() == Some("ls17-a"))
            .unwrap();
        assert_eq!(joined.mp_name.as_deref(), Some("Asha Nair"));

        let orphan = list
            .data
            .iter()
            .find(|r| r.mp_id.as_deref() == Some("ghost"))
            .unwrap();
        assert_eq!(orphan.mp_name, None);
    }

    #[tokio::test]
    async fn test_search_with_metacharacters_is_literal() {
        let analytics = analytics(seeded_store());
        let params = FilterParams::from_pairs(&[("term", "both"), ("search", "(unbalanced[")]);
        let list = analytics.expenditure_list(&params).await.unwrap();
        assert!(list.data.is_empty());
        assert_eq!(list.pagination.total, 0);
        assert_eq!(list.summary, ExpenditureSummary::default());
    }

    #[tokio::test]
    async fn test_pagination_window() {
        let analytics = analytics(seeded_store());
        let all = analytics
            .expenditure_list(&FilterParams::from_pairs(&[("term", "both"), ("sort", "amount")]))
            .await
            .unwrap();
        let page2 = analytics
            .expenditure_list(&FilterParams::from_pairs(&[
                ("term", "both"),
                ("sort", "amount"),
                ("limit", "2"),
                ("page", "2"),
            ]))
            .await
            .unwrap();

        assert_eq!(page2.data.len(), 2);
        assert_eq!(page2.data[0], all.data[2]);
        assert_eq!(page2.data[1], all.data[3]);
        assert!(page2.pagination.has_prev);
        assert_eq!(page2.pagination.total, all.pagination.total);
        assert_eq!(page2.summary, all.summary);
    }

    #[tokio::test]
    async fn test_mistyped_fields_do_not_fail_the_list() {
        let analytics = analytics(mistyped_store());
        let list = analytics
            .expenditure_list(&FilterParams::from_pairs(&[("house", "rs"), ("sort", "amount")]))
            .await
            .unwrap();

        assert_eq!(list.pagination.total, 3);
        let amounts: Vec<f64> = list.data.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![40.0, 60.0, 100.0]);

        let numeric_category = &list.data[0];
        assert_eq!(numeric_category.category.as_deref(), Some("7"));
        assert_eq!(numeric_category.mp_name.as_deref(), Some("42"));
        assert_eq!(numeric_category.constituency, None);

        let out_of_range = &list.data[1];
        assert_eq!(out_of_range.vendor.as_deref(), Some("12345"));
        assert_eq!(out_of_range.state.as_deref(), Some("12"));
        assert_eq!(out_of_range.year, Some(2022));
        assert_eq!(out_of_range.month, Some(5));
        assert_eq!(out_of_range.description, None);

        assert_eq!(list.summary.total_transactions, 3);
        assert_eq!(list.summary.unique_vendors, 2);
        assert_eq!(list.summary.unique_categories, 2);
    }
}
