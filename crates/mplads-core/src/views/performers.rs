//! Top performers from member summaries

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::{acc, named, Analytics};
use crate::error::Result;
use crate::gate::Scope;
use crate::models::{
    Collection, FilterParams, Metric, Performer, PerformerFilters, PerformersReport,
    PopulationStats, StateLeader,
};
use crate::pipeline::{Accumulator, Expr, Filter, Pipeline, SortOrder, Stage};
use crate::sanitize;
use crate::shape;
use crate::store::RecordStore;

const NUMERIC_FIELDS: &[&str] = &[
    "allocatedAmount",
    "totalExpenditure",
    "utilizationPercentage",
    "completedWorksCount",
    "recommendedWorksCount",
];

const TEXT_FIELDS: &[&str] = &["name", "constituency", "party", "state", "house"];

/// Members in scope with numeric fields defaulted to 0, descriptive fields
/// as text and a text member key
pub(crate) fn scored_members(scope: &Scope) -> Pipeline {
    let mut defaults: Vec<(String, Expr)> = NUMERIC_FIELDS
        .iter()
        .map(|name| named(name, Expr::number_or_zero(name)))
        .collect();
    defaults.extend(
        TEXT_FIELDS
            .iter()
            .map(|name| named(name, Expr::field(*name).to_text())),
    );
    defaults.push(named(
        "mpKey",
        Expr::field("mpId").or(Expr::field("_id")).to_id_string(),
    ));
    Pipeline::new()
        .filter(scope.filter())
        .stage(Stage::AddFields(defaults))
}

/// Metric descending, then name and member key for a stable order
fn ranking_sort(metric: Metric) -> Stage {
    Stage::Sort(vec![
        (metric.field().to_string(), SortOrder::Desc),
        ("name".to_string(), SortOrder::Asc),
        ("mpKey".to_string(), SortOrder::Asc),
    ])
}

impl<S: RecordStore> Analytics<S> {
    /// Members ranked by the selected metric, with population averages and
    /// the best member of each state
    pub async fn top_performers(&self, params: &FilterParams) -> Result<PerformersReport> {
        let scope = self.scope(params);
        let metric = Metric::resolve(params.metric.as_deref());
        let ranking_config = &self.config.ranking;
        let top_n = sanitize::parse_integer(params.top_n.as_deref())
            .unwrap_or(ranking_config.default_top_n as i64)
            .clamp(1, ranking_config.max_top_n as i64) as u64;

        let base = scored_members(&scope);

        let ranking = base
            .clone()
            .stage(ranking_sort(metric))
            .stage(Stage::Limit(top_n))
            .stage(Stage::Project(vec![
                named("mpId", Expr::field("mpKey")),
                named("name", Expr::field("name")),
                named("constituency", Expr::field("constituency")),
                named("party", Expr::field("party")),
                named("state", Expr::field("state")),
                named("house", Expr::field("house")),
                named("term", Expr::field("lsTerm").to_int()),
                named("allocatedAmount", Expr::field("allocatedAmount").round(2)),
                named("totalExpenditure", Expr::field("totalExpenditure").round(2)),
                named("utilizationPercentage", Expr::field("utilizationPercentage").round(2)),
                named("completedWorksCount", Expr::field("completedWorksCount")),
                named("recommendedWorksCount", Expr::field("recommendedWorksCount")),
            ]));

        let statistics = base
            .clone()
            .stage(Stage::Group {
                key: Vec::new(),
                accumulators: vec![
                    acc("memberCount", Accumulator::Count),
                    acc(
                        "averageUtilization",
                        Accumulator::Avg(Expr::field("utilizationPercentage")),
                    ),
                    acc(
                        "averageExpenditure",
                        Accumulator::Avg(Expr::field("totalExpenditure")),
                    ),
                    acc(
                        "averageCompletedWorks",
                        Accumulator::Avg(Expr::field("completedWorksCount")),
                    ),
                    acc("totalAllocated", Accumulator::Sum(Expr::field("allocatedAmount"))),
                    acc("totalExpenditure", Accumulator::Sum(Expr::field("totalExpenditure"))),
                ],
            })
            .stage(Stage::Project(vec![
                named("memberCount", Expr::field("memberCount")),
                named("averageUtilization", Expr::field("averageUtilization").round(2)),
                named("averageExpenditure", Expr::field("averageExpenditure").round(2)),
                named("averageCompletedWorks", Expr::field("averageCompletedWorks").round(2)),
                named("totalAllocated", Expr::field("totalAllocated").round(2)),
                named("totalExpenditure", Expr::field("totalExpenditure").round(2)),
            ]));

        let leaders = base
            .filter(Filter::Ne("state".to_string(), Value::Null))
            .stage(ranking_sort(metric))
            .stage(Stage::Group {
                key: vec![named("state", Expr::field("state"))],
                accumulators: vec![
                    acc("mpId", Accumulator::First(Expr::field("mpKey"))),
                    acc("name", Accumulator::First(Expr::field("name"))),
                    acc("house", Accumulator::First(Expr::field("house"))),
                    acc("value", Accumulator::First(Expr::field(metric.field()))),
                    acc("memberCount", Accumulator::Count),
                ],
            })
            .stage(Stage::Project(vec![
                named("state", Expr::field("_id.state")),
                named("mpId", Expr::field("mpId")),
                named("name", Expr::field("name")),
                named("house", Expr::field("house")),
                named("value", Expr::field("value").round(2)),
                named("memberCount", Expr::field("memberCount")),
            ]))
            .stage(Stage::Sort(vec![("state".to_string(), SortOrder::Asc)]));

        let collection = Collection::MemberSummaries;
        let (ranking, statistics, leaders) = tokio::try_join!(
            self.run(collection, &ranking),
            self.run(collection, &statistics),
            self.run(collection, &leaders),
        )?;

        let mut data: Vec<Performer> = shape::rows(ranking)?;
        for (i, performer) in data.iter_mut().enumerate() {
            performer.rank = i as u32 + 1;
        }
        info!(metric = metric.as_str(), count = data.len(), "Top performers complete");

        Ok(PerformersReport {
            data,
            statistics: shape::single_or_default::<PopulationStats>(statistics)?,
            state_leaders: shape::rows::<StateLeader>(leaders)?,
            filters: PerformerFilters {
                house: scope.house,
                term: scope.term,
                state: scope.state.clone(),
                metric,
                top_n,
            },
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{analytics, mistyped_store, seeded_store};

    #[tokio::test]
    async fn test_ranked_by_utilization_by_default() {
        let analytics = analytics(seeded_store());
        let report = analytics
            .top_performers(&FilterParams::from_pairs(&[("term", "both")]))
            .await
            .unwrap();

        let names: Vec<&str> = report
            .data
            .iter()
            .filter_map(|p| p.name.as_deref())
            .collect();
        assert_eq!(
            names,
            vec!["Esha Rao", "Dev Singh", "Asha Nair", "Bhim Rao", "Chitra Das"]
        );
        assert_eq!(report.data[0].rank, 1);
        assert_eq!(report.data[4].rank, 5);
        assert_eq!(report.filters.metric, Metric::Utilization);
        assert_eq!(report.statistics.member_count, 5);
    }

    #[tokio::test]
    async fn test_numeric_text_and_missing_values_are_ranked() {
        let analytics = analytics(seeded_store());
        let report = analytics
            .top_performers(&FilterParams::from_pairs(&[
                ("term", "both"),
                ("metric", "total_expenditure"),
                ("top_n", "2"),
            ]))
            .await
            .unwrap();

        assert_eq!(report.data.len(), 2);
        assert_eq!(report.data[0].name.as_deref(), Some("Dev Singh"));
        assert_eq!(report.data[0].total_expenditure, 500.0);

        let works = analytics
            .top_performers(&FilterParams::from_pairs(&[
                ("term", "both"),
                ("metric", "completed_works"),
            ]))
            .await
            .unwrap();
        let last = works.data.last().unwrap();
        assert_eq!(last.name.as_deref(), Some("Esha Rao"));
        assert_eq!(last.completed_works_count, 0.0);
    }

    #[tokio::test]
    async fn test_top_n_is_clamped() {
        let analytics = analytics(seeded_store());
        let report = analytics
            .top_performers(&FilterParams::from_pairs(&[("top_n", "0")]))
            .await
            .unwrap();
        assert_eq!(report.filters.top_n, 1);
        assert_eq!(report.data.len(), 1);

        let report = analytics
            .top_performers(&FilterParams::from_pairs(&[("top_n", "100000")]))
            .await
            .unwrap();
        assert_eq!(report.filters.top_n, analytics.config().ranking.max_top_n);
    }

    #[tokio::test]
    async fn test_state_leaders() {
        let analytics = analytics(seeded_store());
        let report = analytics
            .top_performers(&FilterParams::from_pairs(&[("term", "both")]))
            .await
            .unwrap();

        let states: Vec<&str> = report
            .state_leaders
            .iter()
            .filter_map(|l| l.state.as_deref())
            .collect();
        assert_eq!(states, vec!["Bihar", "Goa", "Kerala", "Punjab"]);

        let kerala = &report.state_leaders[2];
        assert_eq!(kerala.name.as_deref(), Some("Asha Nair"));
        assert_eq!(kerala.value, 92.0);
        assert_eq!(kerala.member_count, 2);
    }

    #[tokio::test]
    async fn test_numeric_names_and_states_are_text() {
        let analytics = analytics(mistyped_store());
        let report = analytics
            .top_performers(&FilterParams::from_pairs(&[("house", "rs")]))
            .await
            .unwrap();

        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].name.as_deref(), Some("42"));
        assert_eq!(report.data[0].state.as_deref(), Some("7"));
        assert_eq!(report.state_leaders[0].state.as_deref(), Some("7"));
    }
}
