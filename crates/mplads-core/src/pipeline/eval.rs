//! In-process pipeline evaluation over JSON documents
//!
//! Used by both record stores. The evaluator never mutates its inputs
//! beyond the documents handed to it; `$lookup` targets are passed in
//! separately and only read.

use std::collections::HashMap;

use chrono::Datelike;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use super::value::{
    as_number, canonical_key, compare_values, get_path, id_key, lookup_path, number_value,
    parse_date, set_path, to_double, values_equal,
};
use super::{Accumulator, Expr, Filter, Pipeline, SortOrder, Stage};
use crate::error::{Error, Result};
use crate::models::Collection;

/// Foreign collections available to `$lookup` stages
pub type Lookups = HashMap<Collection, Vec<Value>>;

/// Run every stage of `pipeline` over `docs`
pub fn run(pipeline: &Pipeline, docs: Vec<Value>, lookups: &Lookups) -> Result<Vec<Value>> {
    let mut docs = docs;
    for stage in pipeline.stages() {
        docs = apply(stage, docs, lookups)?;
    }
    Ok(docs)
}

fn apply(stage: &Stage, docs: Vec<Value>, lookups: &Lookups) -> Result<Vec<Value>> {
    match stage {
        Stage::Match(filter) => {
            let compiled = CompiledFilter::compile(filter)?;
            Ok(docs.into_iter().filter(|doc| compiled.matches(doc)).collect())
        }
        Stage::Lookup {
            from,
            local_field,
            foreign_field,
            as_field,
        } => {
            let foreign = lookups.get(from).map(Vec::as_slice).unwrap_or(&[]);
            Ok(lookup(docs, foreign, local_field, foreign_field, as_field))
        }
        Stage::Project(fields) => Ok(docs.into_iter().map(|doc| project(&doc, fields)).collect()),
        Stage::AddFields(fields) => Ok(docs
            .into_iter()
            .map(|mut doc| {
                let computed: Vec<(&String, Value)> = fields
                    .iter()
                    .map(|(name, expr)| (name, evaluate(expr, &doc)))
                    .collect();
                for (name, value) in computed {
                    set_path(&mut doc, name, value);
                }
                doc
            })
            .collect()),
        Stage::Group { key, accumulators } => Ok(group(docs, key, accumulators)),
        Stage::Sort(keys) => {
            let mut docs = docs;
            docs.sort_by(|a, b| {
                for (path, order) in keys {
                    let ord = compare_values(get_path(a, path), get_path(b, path));
                    let ord = match order {
                        SortOrder::Asc => ord,
                        SortOrder::Desc => ord.reverse(),
                    };
                    if ord.is_ne() {
                        return ord;
                    }
                }
                std::cmp::Ordering::Equal
            });
            Ok(docs)
        }
        Stage::Skip(n) => Ok(docs.into_iter().skip(*n as usize).collect()),
        Stage::Limit(n) => Ok(docs.into_iter().take(*n as usize).collect()),
        Stage::Bucket {
            group_by,
            boundaries,
            default,
            output,
        } => bucket(docs, group_by, boundaries, default, output),
        Stage::Count(name) => {
            if docs.is_empty() {
                return Ok(Vec::new());
            }
            let mut out = Map::new();
            out.insert(name.clone(), Value::from(docs.len() as i64));
            Ok(vec![Value::Object(out)])
        }
    }
}

fn lookup(
    docs: Vec<Value>,
    foreign: &[Value],
    local_field: &str,
    foreign_field: &str,
    as_field: &str,
) -> Vec<Value> {
    let mut index: HashMap<String, Vec<&Value>> = HashMap::new();
    for candidate in foreign {
        if let Some(key) = id_key(get_path(candidate, foreign_field)) {
            index.entry(key).or_default().push(candidate);
        }
    }

    docs.into_iter()
        .map(|mut doc| {
            let joined: Vec<Value> = id_key(get_path(&doc, local_field))
                .and_then(|key| index.get(&key))
                .map(|found| found.iter().map(|v| (*v).clone()).collect())
                .unwrap_or_default();
            set_path(&mut doc, as_field, Value::Array(joined));
            doc
        })
        .collect()
}

fn project(doc: &Value, fields: &[(String, Expr)]) -> Value {
    let mut out = Value::Object(Map::new());
    let lists_id = fields.iter().any(|(name, _)| name == "_id");
    if !lists_id {
        if let Some(id) = lookup_path(doc, "_id") {
            set_path(&mut out, "_id", id.clone());
        }
    }
    for (name, expr) in fields {
        set_path(&mut out, name, evaluate(expr, doc));
    }
    out
}

fn group(docs: Vec<Value>, key: &[(String, Expr)], accumulators: &[(String, Accumulator)]) -> Vec<Value> {
    let mut groups: Vec<(Value, Vec<AccState>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for doc in &docs {
        let group_key = if key.is_empty() {
            Value::Null
        } else {
            let mut map = Map::new();
            for (name, expr) in key {
                map.insert(name.clone(), evaluate(expr, doc));
            }
            Value::Object(map)
        };

        let slot = *index.entry(canonical_key(&group_key)).or_insert_with(|| {
            groups.push((
                group_key.clone(),
                accumulators.iter().map(|(_, acc)| AccState::new(acc)).collect(),
            ));
            groups.len() - 1
        });

        for ((_, acc), state) in accumulators.iter().zip(groups[slot].1.iter_mut()) {
            state.update(acc, doc);
        }
    }

    groups
        .into_iter()
        .map(|(id, states)| finish_group(id, accumulators, states))
        .collect()
}

fn finish_group(id: Value, accumulators: &[(String, Accumulator)], states: Vec<AccState>) -> Value {
    let mut out = Map::new();
    out.insert("_id".to_string(), id);
    for ((name, _), state) in accumulators.iter().zip(states) {
        out.insert(name.clone(), state.finish());
    }
    Value::Object(out)
}

fn bucket(
    docs: Vec<Value>,
    group_by: &Expr,
    boundaries: &[f64],
    default: &str,
    output: &[(String, Accumulator)],
) -> Result<Vec<Value>> {
    if boundaries.len() < 2 || boundaries.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::Pipeline(format!(
            "bucket boundaries must be at least two strictly ascending values, got {:?}",
            boundaries
        )));
    }

    let slots = boundaries.len() - 1;
    // Final slot holds the default bucket
    let mut states: Vec<Option<Vec<AccState>>> = (0..=slots).map(|_| None).collect();

    for doc in &docs {
        let slot = as_number(&evaluate(group_by, doc))
            .and_then(|v| bucket_slot(v, boundaries))
            .unwrap_or(slots);
        let entry = states[slot]
            .get_or_insert_with(|| output.iter().map(|(_, acc)| AccState::new(acc)).collect());
        for ((_, acc), state) in output.iter().zip(entry.iter_mut()) {
            state.update(acc, doc);
        }
    }

    Ok(states
        .into_iter()
        .enumerate()
        .filter_map(|(slot, state)| {
            let state = state?;
            let id = if slot == slots {
                Value::String(default.to_string())
            } else {
                number_value(boundaries[slot])
            };
            Some(finish_group(id, output, state))
        })
        .collect())
}

/// Index of the bucket containing `v`; the last bucket includes its upper bound
fn bucket_slot(v: f64, boundaries: &[f64]) -> Option<usize> {
    let last = boundaries.len() - 1;
    if v == boundaries[last] {
        return Some(last - 1);
    }
    boundaries
        .windows(2)
        .position(|w| v >= w[0] && v < w[1])
}

enum AccState {
    Sum(f64),
    Avg { total: f64, count: u64 },
    Min(Option<Value>),
    Max(Option<Value>),
    First(Option<Value>),
    Count(i64),
    Set(Vec<Value>),
    Push(Vec<Value>),
}

impl AccState {
    fn new(acc: &Accumulator) -> Self {
        match acc {
            Accumulator::Sum(_) => Self::Sum(0.0),
            Accumulator::Avg(_) => Self::Avg { total: 0.0, count: 0 },
            Accumulator::Min(_) => Self::Min(None),
            Accumulator::Max(_) => Self::Max(None),
            Accumulator::First(_) => Self::First(None),
            Accumulator::Count => Self::Count(0),
            Accumulator::AddToSet(_) => Self::Set(Vec::new()),
            Accumulator::Push(_) => Self::Push(Vec::new()),
        }
    }

    fn update(&mut self, acc: &Accumulator, doc: &Value) {
        match (self, acc) {
            (Self::Sum(total), Accumulator::Sum(e)) => {
                if let Some(n) = as_number(&evaluate(e, doc)) {
                    *total += n;
                }
            }
            (Self::Avg { total, count }, Accumulator::Avg(e)) => {
                if let Some(n) = as_number(&evaluate(e, doc)) {
                    *total += n;
                    *count += 1;
                }
            }
            (Self::Min(current), Accumulator::Min(e)) => {
                let v = evaluate(e, doc);
                if !v.is_null()
                    && current
                        .as_ref()
                        .map_or(true, |c| compare_values(&v, c).is_lt())
                {
                    *current = Some(v);
                }
            }
            (Self::Max(current), Accumulator::Max(e)) => {
                let v = evaluate(e, doc);
                if !v.is_null()
                    && current
                        .as_ref()
                        .map_or(true, |c| compare_values(&v, c).is_gt())
                {
                    *current = Some(v);
                }
            }
            (Self::First(current), Accumulator::First(e)) => {
                if current.is_none() {
                    *current = Some(evaluate(e, doc));
                }
            }
            (Self::Count(n), Accumulator::Count) => *n += 1,
            (Self::Set(items), Accumulator::AddToSet(e)) => {
                let v = evaluate(e, doc);
                if !v.is_null() && !items.iter().any(|existing| values_equal(existing, &v)) {
                    items.push(v);
                }
            }
            (Self::Push(items), Accumulator::Push(e)) => items.push(evaluate(e, doc)),
            _ => {}
        }
    }

    fn finish(self) -> Value {
        match self {
            Self::Sum(total) => number_value(total),
            Self::Avg { total, count } => {
                if count == 0 {
                    Value::Null
                } else {
                    number_value(total / count as f64)
                }
            }
            Self::Min(v) | Self::Max(v) | Self::First(v) => v.unwrap_or(Value::Null),
            Self::Count(n) => Value::from(n),
            Self::Set(items) | Self::Push(items) => Value::Array(items),
        }
    }
}

/// Evaluate an expression against one document. Never fails: type
/// mismatches produce null.
pub fn evaluate(expr: &Expr, doc: &Value) -> Value {
    match expr {
        Expr::Field(path) => get_path(doc, path).clone(),
        Expr::Literal(v) => v.clone(),
        Expr::IfNull(exprs) => exprs
            .iter()
            .map(|e| evaluate(e, doc))
            .find(|v| !v.is_null())
            .unwrap_or(Value::Null),
        Expr::ToDouble(e) => to_double(&evaluate(e, doc))
            .map(number_value)
            .unwrap_or(Value::Null),
        Expr::ToInt(e) => to_double(&evaluate(e, doc))
            .map(|n| Value::from(n.trunc() as i64))
            .unwrap_or(Value::Null),
        Expr::ToIdString(e) => id_key(&evaluate(e, doc))
            .map(Value::String)
            .unwrap_or(Value::Null),
        Expr::ToText(e) => match evaluate(e, doc) {
            Value::String(s) => Value::String(s),
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            _ => Value::Null,
        },
        Expr::Within(e, min, max) => match evaluate(e, doc) {
            Value::Number(n) if n.as_f64().is_some_and(|v| v >= *min && v <= *max) => {
                Value::Number(n)
            }
            _ => Value::Null,
        },
        Expr::Year(e) => parse_date(&evaluate(e, doc))
            .map(|d| Value::from(d.year()))
            .unwrap_or(Value::Null),
        Expr::Month(e) => parse_date(&evaluate(e, doc))
            .map(|d| Value::from(d.month()))
            .unwrap_or(Value::Null),
        Expr::IsoDate(e) => parse_date(&evaluate(e, doc))
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        Expr::Add(exprs) => numeric_fold(exprs, doc, 0.0, |acc, n| acc + n),
        Expr::Multiply(exprs) => numeric_fold(exprs, doc, 1.0, |acc, n| acc * n),
        Expr::Subtract(a, b) => match (as_number(&evaluate(a, doc)), as_number(&evaluate(b, doc))) {
            (Some(x), Some(y)) => number_value(x - y),
            _ => Value::Null,
        },
        Expr::Divide(a, b) => match (as_number(&evaluate(a, doc)), as_number(&evaluate(b, doc))) {
            (Some(x), Some(y)) if y != 0.0 => number_value(x / y),
            _ => Value::Null,
        },
        Expr::Max(exprs) => exprs
            .iter()
            .filter_map(|e| as_number(&evaluate(e, doc)))
            .fold(None, |best: Option<f64>, n| Some(best.map_or(n, |b| b.max(n))))
            .map(number_value)
            .unwrap_or(Value::Null),
        Expr::Round(e, places) => as_number(&evaluate(e, doc))
            .map(|n| number_value(round_to(n, *places)))
            .unwrap_or(Value::Null),
        Expr::Size(e) => match evaluate(e, doc) {
            Value::Array(items) => Value::from(items.len() as i64),
            _ => Value::from(0),
        },
        Expr::First(e) => match evaluate(e, doc) {
            Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
            _ => Value::Null,
        },
        Expr::Object(fields) => {
            let mut map = Map::new();
            for (name, e) in fields {
                map.insert(name.clone(), evaluate(e, doc));
            }
            Value::Object(map)
        }
    }
}

fn numeric_fold(exprs: &[Expr], doc: &Value, init: f64, op: fn(f64, f64) -> f64) -> Value {
    let mut acc = init;
    for e in exprs {
        match as_number(&evaluate(e, doc)) {
            Some(n) => acc = op(acc, n),
            None => return Value::Null,
        }
    }
    number_value(acc)
}

/// Round half away from zero to `places` decimals
pub fn round_to(n: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (n * factor).round() / factor
}

enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Filter with regexes compiled once per stage
enum CompiledFilter<'f> {
    Eq(&'f str, &'f Value),
    Ne(&'f str, &'f Value),
    In(&'f str, &'f [Value]),
    Compare(&'f str, CompareOp, &'f Value),
    Regex(&'f str, Regex),
    Exists(&'f str, bool),
    And(Vec<CompiledFilter<'f>>),
    Or(Vec<CompiledFilter<'f>>),
    Not(Box<CompiledFilter<'f>>),
}

impl<'f> CompiledFilter<'f> {
    fn compile(filter: &'f Filter) -> Result<Self> {
        Ok(match filter {
            Filter::Eq(path, v) => Self::Eq(path, v),
            Filter::Ne(path, v) => Self::Ne(path, v),
            Filter::In(path, values) => Self::In(path, values),
            Filter::Gt(path, v) => Self::Compare(path, CompareOp::Gt, v),
            Filter::Gte(path, v) => Self::Compare(path, CompareOp::Gte, v),
            Filter::Lt(path, v) => Self::Compare(path, CompareOp::Lt, v),
            Filter::Lte(path, v) => Self::Compare(path, CompareOp::Lte, v),
            Filter::Regex {
                path,
                pattern,
                case_insensitive,
            } => {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(*case_insensitive)
                    .build()
                    .map_err(|e| Error::Pipeline(format!("invalid pattern on {}: {}", path, e)))?;
                Self::Regex(path, regex)
            }
            Filter::Exists(path, exists) => Self::Exists(path, *exists),
            Filter::And(filters) => Self::And(
                filters
                    .iter()
                    .map(CompiledFilter::compile)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Filter::Or(filters) => Self::Or(
                filters
                    .iter()
                    .map(CompiledFilter::compile)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Filter::Not(inner) => Self::Not(Box::new(CompiledFilter::compile(inner)?)),
        })
    }

    fn matches(&self, doc: &Value) -> bool {
        match self {
            Self::Eq(path, v) => values_equal(get_path(doc, path), v),
            Self::Ne(path, v) => !values_equal(get_path(doc, path), v),
            Self::In(path, values) => {
                let actual = get_path(doc, path);
                values.iter().any(|v| values_equal(actual, v))
            }
            Self::Compare(path, op, v) => {
                let actual = get_path(doc, path);
                let comparable = matches!(
                    (actual, v),
                    (Value::Number(_), Value::Number(_)) | (Value::String(_), Value::String(_))
                );
                if !comparable {
                    return false;
                }
                let ord = compare_values(actual, v);
                match op {
                    CompareOp::Gt => ord.is_gt(),
                    CompareOp::Gte => ord.is_ge(),
                    CompareOp::Lt => ord.is_lt(),
                    CompareOp::Lte => ord.is_le(),
                }
            }
            Self::Regex(path, regex) => match get_path(doc, path) {
                Value::String(s) => regex.is_match(s),
                _ => false,
            },
            Self::Exists(path, exists) => lookup_path(doc, path).is_some() == *exists,
            Self::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(doc)),
            Self::Not(inner) => !inner.matches(doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs() -> Vec<Value> {
        vec![
            json!({ "_id": "1", "house": "Lok Sabha", "lsTerm": 17, "amount": 100, "state": "Kerala" }),
            json!({ "_id": "2", "house": "Lok Sabha", "lsTerm": 18, "amount": "250.5", "state": "Tamil Nadu" }),
            json!({ "_id": "3", "house": "Rajya Sabha", "amount": 50, "state": "Kerala" }),
        ]
    }

    fn run_stages(stages: Vec<Stage>, input: Vec<Value>) -> Vec<Value> {
        let pipeline = stages.into_iter().fold(Pipeline::new(), Pipeline::stage);
        run(&pipeline, input, &Lookups::new()).unwrap()
    }

    #[test]
    fn test_match_numeric_equality_across_encodings() {
        let out = run_stages(vec![Stage::Match(Filter::eq("lsTerm", 17.0))], docs());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["_id"], json!("1"));
    }

    #[test]
    fn test_match_missing_field_reads_null() {
        let out = run_stages(
            vec![Stage::Match(Filter::Eq("lsTerm".to_string(), Value::Null))],
            docs(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["_id"], json!("3"));
    }

    #[test]
    fn test_range_ignores_mismatched_types() {
        // "250.5" is text, so a numeric range does not see it
        let out = run_stages(vec![Stage::Match(Filter::gte("amount", 60))], docs());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["_id"], json!("1"));
    }

    #[test]
    fn test_regex_case_insensitive() {
        let out = run_stages(vec![Stage::Match(Filter::regex_ci("state", "kerala"))], docs());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_invalid_regex_is_pipeline_error() {
        let pipeline = Pipeline::new().stage(Stage::Match(Filter::regex_ci("state", "(")));
        let err = run(&pipeline, docs(), &Lookups::new()).unwrap_err();
        assert!(matches!(err, Error::Pipeline(_)));
    }

    #[test]
    fn test_project_keeps_id_and_computes() {
        let out = run_stages(
            vec![Stage::Project(vec![(
                "amount".to_string(),
                Expr::number_or_zero("amount"),
            )])],
            docs(),
        );
        assert_eq!(out[1], json!({ "_id": "2", "amount": 250.5 }));
        assert!(out[0].get("house").is_none());
    }

    #[test]
    fn test_group_sum_count_and_set() {
        let out = run_stages(
            vec![
                Stage::AddFields(vec![("amount".to_string(), Expr::number_or_zero("amount"))]),
                Stage::Group {
                    key: vec![("state".to_string(), Expr::field("state"))],
                    accumulators: vec![
                        ("total".to_string(), Accumulator::Sum(Expr::field("amount"))),
                        ("count".to_string(), Accumulator::Count),
                        ("houses".to_string(), Accumulator::AddToSet(Expr::field("house"))),
                    ],
                },
            ],
            docs(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["_id"], json!({ "state": "Kerala" }));
        assert_eq!(out[0]["total"], json!(150));
        assert_eq!(out[0]["count"], json!(2));
        assert_eq!(out[0]["houses"].as_array().unwrap().len(), 2);
        assert_eq!(out[1]["total"], json!(250.5));
    }

    #[test]
    fn test_group_without_key_on_empty_input() {
        let out = run_stages(
            vec![Stage::Group {
                key: vec![],
                accumulators: vec![("count".to_string(), Accumulator::Count)],
            }],
            vec![],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_sort_is_stable_with_desc() {
        let input = vec![
            json!({ "_id": "a", "v": 1 }),
            json!({ "_id": "b", "v": 2 }),
            json!({ "_id": "c", "v": 1 }),
        ];
        let out = run_stages(vec![Stage::Sort(vec![("v".to_string(), SortOrder::Desc)])], input);
        let ids: Vec<&str> = out.iter().map(|d| d["_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_skip_limit_and_count() {
        let out = run_stages(vec![Stage::Skip(1), Stage::Limit(1)], docs());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["_id"], json!("2"));

        let counted = run_stages(vec![Stage::Count("total".to_string())], docs());
        assert_eq!(counted, vec![json!({ "total": 3 })]);

        let empty = run_stages(vec![Stage::Count("total".to_string())], vec![]);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_lookup_matches_raw_and_oid_identifiers() {
        let mut lookups = Lookups::new();
        lookups.insert(
            Collection::Members,
            vec![json!({ "_id": { "$oid": "m1" }, "name": "A. Member" })],
        );
        let pipeline = Pipeline::new().stage(Stage::Lookup {
            from: Collection::Members,
            local_field: "mpId".to_string(),
            foreign_field: "_id".to_string(),
            as_field: "member".to_string(),
        });
        let input = vec![
            json!({ "_id": "x", "mpId": "m1" }),
            json!({ "_id": "y", "mpId": { "$oid": "m1" } }),
            json!({ "_id": "z", "mpId": "missing" }),
        ];
        let out = run(&pipeline, input, &lookups).unwrap();
        assert_eq!(out[0]["member"][0]["name"], json!("A. Member"));
        assert_eq!(out[1]["member"][0]["name"], json!("A. Member"));
        assert_eq!(out[2]["member"], json!([]));
    }

    #[test]
    fn test_bucket_last_boundary_inclusive() {
        let input: Vec<Value> = [10.0, 92.0, 100.0, 100.5, -1.0]
            .iter()
            .map(|u| json!({ "u": u }))
            .collect();
        let out = run_stages(
            vec![Stage::Bucket {
                group_by: Expr::field("u"),
                boundaries: vec![0.0, 25.0, 50.0, 75.0, 90.0, 100.0],
                default: "Other".to_string(),
                output: vec![("count".to_string(), Accumulator::Count)],
            }],
            input,
        );
        assert_eq!(
            out,
            vec![
                json!({ "_id": 0, "count": 1 }),
                json!({ "_id": 90, "count": 2 }),
                json!({ "_id": "Other", "count": 2 }),
            ]
        );
    }

    #[test]
    fn test_bucket_rejects_unsorted_boundaries() {
        let pipeline = Pipeline::new().stage(Stage::Bucket {
            group_by: Expr::field("u"),
            boundaries: vec![10.0, 5.0],
            default: "Other".to_string(),
            output: vec![],
        });
        assert!(run(&pipeline, vec![], &Lookups::new()).is_err());
    }

    #[test]
    fn test_expressions() {
        let doc = json!({
            "a": 10, "b": 4, "text": "7", "date": "2022-11-05",
            "list": [ { "n": 1 }, { "n": 2 } ], "oid": { "$oid": "abc" }
        });
        assert_eq!(evaluate(&Expr::field("a").divide(Expr::field("b")), &doc), json!(2.5));
        assert_eq!(evaluate(&Expr::field("a").divide(Expr::lit(0)), &doc), Value::Null);
        assert_eq!(evaluate(&Expr::field("text").to_int(), &doc), json!(7));
        assert_eq!(evaluate(&Expr::field("date").year(), &doc), json!(2022));
        assert_eq!(evaluate(&Expr::field("date").month(), &doc), json!(11));
        assert_eq!(
            evaluate(&Expr::lit("05-11-2022").iso_date(), &doc),
            json!("2022-11-05")
        );
        assert_eq!(evaluate(&Expr::field("list").size(), &doc), json!(2));
        assert_eq!(evaluate(&Expr::field("missing").size(), &doc), json!(0));
        assert_eq!(evaluate(&Expr::field("list").first(), &doc), json!({ "n": 1 }));
        assert_eq!(evaluate(&Expr::field("oid").to_id_string(), &doc), json!("abc"));
        assert_eq!(evaluate(&Expr::field("a").to_text(), &doc), json!("10"));
        assert_eq!(evaluate(&Expr::field("text").to_text(), &doc), json!("7"));
        assert_eq!(evaluate(&Expr::field("list").to_text(), &doc), Value::Null);
        assert_eq!(evaluate(&Expr::field("oid").to_text(), &doc), Value::Null);
        assert_eq!(evaluate(&Expr::field("b").within(1.0, 12.0), &doc), json!(4));
        assert_eq!(evaluate(&Expr::field("a").within(1.0, 5.0), &doc), Value::Null);
        assert_eq!(evaluate(&Expr::field("text").within(1.0, 12.0), &doc), Value::Null);
        assert_eq!(
            evaluate(&Expr::Max(vec![Expr::lit(-5), Expr::lit(0)]), &doc),
            json!(0)
        );
        assert_eq!(evaluate(&Expr::lit(2.346).round(2), &doc), json!(2.35));
        assert_eq!(
            evaluate(&Expr::field("missing").or(Expr::field("a")), &doc),
            json!(10)
        );
    }
}
