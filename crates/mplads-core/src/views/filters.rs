//! Filter option lists for building query forms

use chrono::Utc;
use serde_json::Value;

use super::expenditures::EXPENDITURE_SORTS;
use super::{acc, named, record_prefix, Analytics};
use crate::error::Result;
use crate::models::{
    Collection, DistributionFilters, FilterOptions, FilterParams, Granularity, House, Metric,
    LOK_SABHA_TERMS,
};
use crate::normalize::{fields, EXPENDITURE_FIELDS};
use crate::pipeline::value::to_double;
use crate::pipeline::{Accumulator, Expr, Filter, Pipeline, SortOrder, Stage};
use crate::store::RecordStore;

impl<S: RecordStore> Analytics<S> {
    /// Distinct states, years and categories in scope, plus the static
    /// option lists. States ignore the state filter so the list stays whole.
    pub async fn filter_options(&self, params: &FilterParams) -> Result<FilterOptions> {
        let scope = self.scope(params);

        let states = Pipeline::new()
            .filter(Filter::all(vec![
                scope.gate(),
                Filter::Ne("state".to_string(), Value::Null),
            ]))
            .stage(Stage::Group {
                key: vec![named("state", Expr::field("state"))],
                accumulators: Vec::new(),
            })
            .stage(Stage::Sort(vec![("_id.state".to_string(), SortOrder::Asc)]));

        let values = record_prefix(&EXPENDITURE_FIELDS, scope.filter(), false, Filter::always())
            .stage(Stage::Group {
                key: Vec::new(),
                accumulators: vec![
                    acc("years", Accumulator::AddToSet(Expr::field(fields::YEAR))),
                    acc("categories", Accumulator::AddToSet(Expr::field(fields::CATEGORY))),
                ],
            });

        let (states, values) = tokio::try_join!(
            self.run(Collection::MemberSummaries, &states),
            self.run(Collection::Expenditures, &values),
        )?;

        let states: Vec<String> = states
            .iter()
            .filter_map(|doc| doc["_id"]["state"].as_str())
            .map(str::to_string)
            .collect();

        let values = values.into_iter().next().unwrap_or(Value::Null);
        let mut years: Vec<i32> = values["years"]
            .as_array()
            .map(|items| items.iter().filter_map(to_double).map(|y| y as i32).collect())
            .unwrap_or_default();
        years.sort_unstable();
        years.dedup();

        let mut categories: Vec<String> = values["categories"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        categories.sort();

        Ok(FilterOptions {
            houses: House::all().to_vec(),
            terms: LOK_SABHA_TERMS.to_vec(),
            default_term: self.config.default_term,
            states,
            years,
            categories,
            metrics: Metric::all().to_vec(),
            granularities: vec![Granularity::Yearly, Granularity::Monthly],
            sort_fields: EXPENDITURE_SORTS.iter().map(|(key, _)| *key).collect(),
            max_limit: self.config.pagination.max_limit,
            filters: DistributionFilters {
                house: scope.house,
                term: scope.term,
                state: scope.state.clone(),
            },
            generated_at: Utc::now(),
        })
    }
}
