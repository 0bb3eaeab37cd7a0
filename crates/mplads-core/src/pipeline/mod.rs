//! Store-agnostic aggregation pipelines
//!
//! A pipeline is an ordered list of stages (`$match`, `$lookup`, `$project`,
//! `$group`, ...) over JSON documents. Views compose pipelines from these
//! types; a `RecordStore` executes them.
//!
//! Pipelines render to MongoDB-style aggregation documents with
//! [`Pipeline::to_document`]. The rendering is used for debug logging and for
//! asserting that sibling pipelines share an identical filter prefix.
//!
//! ## Evaluation semantics
//! See [`eval`] for the in-process evaluator. Two deliberate differences from
//! MongoDB: `$bucket` treats the final boundary as inclusive, and numeric
//! conversions never raise (they yield null, like `$convert` with `onError`).

use serde_json::{json, Map, Value};

use crate::models::Collection;

pub mod eval;
pub mod value;

/// Sort direction for a `$sort` key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_i32(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// Computed expression evaluated against a single document
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Dotted path into the current document; missing reads as null
    Field(String),
    Literal(Value),
    /// First non-null operand
    IfNull(Vec<Expr>),
    /// Numeric coercion of numbers, numeric text and extended-JSON numbers.
    /// Yields null when the input is not coercible.
    ToDouble(Box<Expr>),
    /// Like `ToDouble`, truncated to an integer
    ToInt(Box<Expr>),
    /// Identifier as plain text, unwrapping `{"$oid": ...}`
    ToIdString(Box<Expr>),
    /// Scalar as text: strings unchanged, numbers and booleans rendered.
    /// Null for anything else.
    ToText(Box<Expr>),
    /// Numeric value when it lies in `[min, max]`, else null
    Within(Box<Expr>, f64, f64),
    Year(Box<Expr>),
    Month(Box<Expr>),
    /// Date rendered as `YYYY-MM-DD`; null when unparseable
    IsoDate(Box<Expr>),
    Add(Vec<Expr>),
    Subtract(Box<Expr>, Box<Expr>),
    Multiply(Vec<Expr>),
    /// Null when the divisor is zero or either side is non-numeric
    Divide(Box<Expr>, Box<Expr>),
    /// Largest numeric operand, ignoring nulls
    Max(Vec<Expr>),
    Round(Box<Expr>, u32),
    /// Array length; zero for anything that is not an array
    Size(Box<Expr>),
    /// First array element
    First(Box<Expr>),
    Object(Vec<(String, Expr)>),
}

impl Expr {
    pub fn field(path: impl Into<String>) -> Self {
        Self::Field(path.into())
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// `self`, or `fallback` when `self` evaluates to null
    pub fn or(self, fallback: Expr) -> Self {
        Self::IfNull(vec![self, fallback])
    }

    pub fn to_double(self) -> Self {
        Self::ToDouble(Box::new(self))
    }

    pub fn to_int(self) -> Self {
        Self::ToInt(Box::new(self))
    }

    pub fn to_id_string(self) -> Self {
        Self::ToIdString(Box::new(self))
    }

    pub fn to_text(self) -> Self {
        Self::ToText(Box::new(self))
    }

    pub fn within(self, min: f64, max: f64) -> Self {
        Self::Within(Box::new(self), min, max)
    }

    pub fn year(self) -> Self {
        Self::Year(Box::new(self))
    }

    pub fn month(self) -> Self {
        Self::Month(Box::new(self))
    }

    pub fn iso_date(self) -> Self {
        Self::IsoDate(Box::new(self))
    }

    pub fn round(self, places: u32) -> Self {
        Self::Round(Box::new(self), places)
    }

    pub fn size(self) -> Self {
        Self::Size(Box::new(self))
    }

    pub fn first(self) -> Self {
        Self::First(Box::new(self))
    }

    pub fn divide(self, divisor: Expr) -> Self {
        Self::Divide(Box::new(self), Box::new(divisor))
    }

    /// Numeric value of `path`, defaulting to 0 when absent or not numeric
    pub fn number_or_zero(path: &str) -> Self {
        Self::field(path).to_double().or(Self::lit(0))
    }

    fn to_document(&self) -> Value {
        match self {
            Self::Field(path) => Value::String(format!("${}", path)),
            Self::Literal(value) => match value {
                Value::String(s) if s.starts_with('$') => json!({ "$literal": s }),
                Value::Array(_) | Value::Object(_) => json!({ "$literal": value }),
                other => other.clone(),
            },
            Self::IfNull(exprs) => json!({ "$ifNull": render_all(exprs) }),
            Self::ToDouble(e) => convert(e, "double"),
            Self::ToInt(e) => convert(e, "int"),
            Self::ToIdString(e) => json!({ "$toString": e.to_document() }),
            Self::ToText(e) => convert(e, "string"),
            Self::Within(e, min, max) => {
                let value = e.to_document();
                json!({
                    "$cond": [
                        { "$and": [
                            { "$isNumber": value },
                            { "$gte": [value, min] },
                            { "$lte": [value, max] },
                        ] },
                        value,
                        null,
                    ]
                })
            }
            Self::Year(e) => json!({ "$year": convert(e, "date") }),
            Self::Month(e) => json!({ "$month": convert(e, "date") }),
            Self::IsoDate(e) => json!({
                "$dateToString": { "format": "%Y-%m-%d", "date": convert(e, "date"), "onNull": null }
            }),
            Self::Add(exprs) => json!({ "$add": render_all(exprs) }),
            Self::Subtract(a, b) => json!({ "$subtract": [a.to_document(), b.to_document()] }),
            Self::Multiply(exprs) => json!({ "$multiply": render_all(exprs) }),
            Self::Divide(a, b) => json!({ "$divide": [a.to_document(), b.to_document()] }),
            Self::Max(exprs) => json!({ "$max": render_all(exprs) }),
            Self::Round(e, places) => json!({ "$round": [e.to_document(), places] }),
            Self::Size(e) => json!({ "$size": { "$ifNull": [e.to_document(), []] } }),
            Self::First(e) => json!({ "$first": e.to_document() }),
            Self::Object(fields) => render_fields(fields),
        }
    }
}

fn convert(input: &Expr, to: &str) -> Value {
    json!({ "$convert": { "input": input.to_document(), "to": to, "onError": null, "onNull": null } })
}

fn render_all(exprs: &[Expr]) -> Vec<Value> {
    exprs.iter().map(Expr::to_document).collect()
}

fn render_fields(fields: &[(String, Expr)]) -> Value {
    let mut map = Map::new();
    for (name, expr) in fields {
        map.insert(name.clone(), expr.to_document());
    }
    Value::Object(map)
}

/// Predicate over a document, the body of a `$match` stage
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Ne(String, Value),
    In(String, Vec<Value>),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    /// Pattern match on string values; non-strings never match
    Regex {
        path: String,
        pattern: String,
        case_insensitive: bool,
    },
    Exists(String, bool),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(path.into(), value.into())
    }

    pub fn is_in(path: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In(path.into(), values)
    }

    pub fn gte(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gte(path.into(), value.into())
    }

    pub fn lte(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lte(path.into(), value.into())
    }

    /// Case-insensitive pattern. Callers pass already-escaped text.
    pub fn regex_ci(path: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Regex {
            path: path.into(),
            pattern: pattern.into(),
            case_insensitive: true,
        }
    }

    /// Filter that matches every document
    pub fn always() -> Self {
        Self::And(Vec::new())
    }

    /// Conjunction of `filters`, collapsing the trivial cases
    pub fn all(filters: Vec<Filter>) -> Self {
        let mut flat = Vec::with_capacity(filters.len());
        for filter in filters {
            match filter {
                Self::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Self::And(flat)
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Self::And(inner) if inner.is_empty())
    }

    pub fn to_document(&self) -> Value {
        match self {
            Self::Eq(path, value) => json!({ path.as_str(): value }),
            Self::Ne(path, value) => json!({ path.as_str(): { "$ne": value } }),
            Self::In(path, values) => json!({ path.as_str(): { "$in": values } }),
            Self::Gt(path, value) => json!({ path.as_str(): { "$gt": value } }),
            Self::Gte(path, value) => json!({ path.as_str(): { "$gte": value } }),
            Self::Lt(path, value) => json!({ path.as_str(): { "$lt": value } }),
            Self::Lte(path, value) => json!({ path.as_str(): { "$lte": value } }),
            Self::Regex {
                path,
                pattern,
                case_insensitive,
            } => {
                let options = if *case_insensitive { "i" } else { "" };
                json!({ path.as_str(): { "$regex": pattern, "$options": options } })
            }
            Self::Exists(path, exists) => json!({ path.as_str(): { "$exists": exists } }),
            Self::And(filters) if filters.is_empty() => json!({}),
            Self::And(filters) => json!({ "$and": filters.iter().map(Filter::to_document).collect::<Vec<_>>() }),
            Self::Or(filters) => json!({ "$or": filters.iter().map(Filter::to_document).collect::<Vec<_>>() }),
            Self::Not(filter) => json!({ "$nor": [filter.to_document()] }),
        }
    }
}

/// Group accumulator
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    Sum(Expr),
    Avg(Expr),
    Min(Expr),
    Max(Expr),
    First(Expr),
    Count,
    /// Distinct non-null values
    AddToSet(Expr),
    Push(Expr),
}

impl Accumulator {
    fn to_document(&self) -> Value {
        match self {
            Self::Sum(e) => json!({ "$sum": e.to_document() }),
            Self::Avg(e) => json!({ "$avg": e.to_document() }),
            Self::Min(e) => json!({ "$min": e.to_document() }),
            Self::Max(e) => json!({ "$max": e.to_document() }),
            Self::First(e) => json!({ "$first": e.to_document() }),
            Self::Count => json!({ "$sum": 1 }),
            Self::AddToSet(e) => json!({ "$addToSet": e.to_document() }),
            Self::Push(e) => json!({ "$push": e.to_document() }),
        }
    }
}

fn render_accumulators(accumulators: &[(String, Accumulator)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, acc) in accumulators {
        map.insert(name.clone(), acc.to_document());
    }
    map
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    /// Outer join: `as_field` receives every foreign document whose
    /// `foreign_field` identifier equals the local identifier (possibly none)
    Lookup {
        from: Collection,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },
    /// Replace each document with `_id` plus the listed computed fields
    Project(Vec<(String, Expr)>),
    AddFields(Vec<(String, Expr)>),
    /// Group by the named key expressions; an empty key groups everything
    Group {
        key: Vec<(String, Expr)>,
        accumulators: Vec<(String, Accumulator)>,
    },
    Sort(Vec<(String, SortOrder)>),
    Skip(u64),
    Limit(u64),
    /// Fixed-boundary bucketing; `[b[i], b[i+1])` with the last bucket closed
    Bucket {
        group_by: Expr,
        boundaries: Vec<f64>,
        default: String,
        output: Vec<(String, Accumulator)>,
    },
    /// Single document `{name: n}`, or no documents when nothing reaches it
    Count(String),
}

impl Stage {
    pub fn to_document(&self) -> Value {
        match self {
            Self::Match(filter) => json!({ "$match": filter.to_document() }),
            Self::Lookup {
                from,
                local_field,
                foreign_field,
                as_field,
            } => json!({
                "$lookup": {
                    "from": from.as_str(),
                    "localField": local_field,
                    "foreignField": foreign_field,
                    "as": as_field,
                }
            }),
            Self::Project(fields) => json!({ "$project": render_fields(fields) }),
            Self::AddFields(fields) => json!({ "$addFields": render_fields(fields) }),
            Self::Group { key, accumulators } => {
                let mut body = render_accumulators(accumulators);
                let id = if key.is_empty() {
                    Value::Null
                } else {
                    render_fields(key)
                };
                body.insert("_id".to_string(), id);
                json!({ "$group": body })
            }
            Self::Sort(keys) => {
                let mut map = Map::new();
                for (path, order) in keys {
                    map.insert(path.clone(), json!(order.as_i32()));
                }
                json!({ "$sort": map })
            }
            Self::Skip(n) => json!({ "$skip": n }),
            Self::Limit(n) => json!({ "$limit": n }),
            Self::Bucket {
                group_by,
                boundaries,
                default,
                output,
            } => json!({
                "$bucket": {
                    "groupBy": group_by.to_document(),
                    "boundaries": boundaries,
                    "default": default,
                    "output": render_accumulators(output),
                }
            }),
            Self::Count(name) => json!({ "$count": name }),
        }
    }
}

/// Ordered list of stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage (builder style)
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append a `$match`, skipping it when the filter matches everything
    pub fn filter(self, filter: Filter) -> Self {
        if filter.is_always() {
            self
        } else {
            self.stage(Stage::Match(filter))
        }
    }

    /// Append every stage of `other`
    pub fn then(mut self, other: Pipeline) -> Self {
        self.stages.extend(other.stages);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Whether this pipeline begins with exactly the stages of `prefix`
    pub fn starts_with(&self, prefix: &Pipeline) -> bool {
        self.stages.starts_with(&prefix.stages)
    }

    /// Collections referenced by `$lookup` stages
    pub fn lookups(&self) -> Vec<Collection> {
        let mut collections = Vec::new();
        for stage in &self.stages {
            if let Stage::Lookup { from, .. } = stage {
                if !collections.contains(from) {
                    collections.push(*from);
                }
            }
        }
        collections
    }

    pub fn to_document(&self) -> Value {
        Value::Array(self.stages.iter().map(Stage::to_document).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_all_flattens_and_collapses() {
        let single = Filter::all(vec![Filter::eq("house", "Rajya Sabha")]);
        assert_eq!(single, Filter::eq("house", "Rajya Sabha"));

        let nested = Filter::all(vec![
            Filter::all(vec![Filter::eq("a", 1), Filter::eq("b", 2)]),
            Filter::eq("c", 3),
        ]);
        match nested {
            Filter::And(inner) => assert_eq!(inner.len(), 3),
            other => panic!("expected conjunction, got {:?}", other),
        }

        assert!(Filter::all(vec![]).is_always());
    }

    #[test]
    fn test_pipeline_skips_trivial_match() {
        let pipeline = Pipeline::new().filter(Filter::always()).stage(Stage::Limit(5));
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn test_render_match_and_group() {
        let pipeline = Pipeline::new()
            .filter(Filter::Or(vec![
                Filter::eq("house", "Rajya Sabha"),
                Filter::all(vec![
                    Filter::eq("house", "Lok Sabha"),
                    Filter::eq("lsTerm", 18),
                ]),
            ]))
            .stage(Stage::Group {
                key: vec![("year".to_string(), Expr::field("year"))],
                accumulators: vec![
                    ("total".to_string(), Accumulator::Sum(Expr::field("amount"))),
                    ("count".to_string(), Accumulator::Count),
                ],
            });

        let doc = pipeline.to_document();
        assert_eq!(
            doc[0]["$match"]["$or"][1]["$and"][1],
            json!({ "lsTerm": 18 })
        );
        assert_eq!(doc[1]["$group"]["_id"], json!({ "year": "$year" }));
        assert_eq!(doc[1]["$group"]["count"], json!({ "$sum": 1 }));
    }

    #[test]
    fn test_literal_dollar_string_is_escaped() {
        let doc = Expr::lit("$amount").to_document();
        assert_eq!(doc, json!({ "$literal": "$amount" }));
    }

    #[test]
    fn test_lookups_are_deduplicated() {
        let lookup = Stage::Lookup {
            from: Collection::Members,
            local_field: "mpId".to_string(),
            foreign_field: "_id".to_string(),
            as_field: "member".to_string(),
        };
        let pipeline = Pipeline::new().stage(lookup.clone()).stage(lookup);
        assert_eq!(pipeline.lookups(), vec![Collection::Members]);
    }

    #[test]
    fn test_starts_with() {
        let prefix = Pipeline::new().stage(Stage::Match(Filter::eq("a", 1)));
        let full = prefix.clone().stage(Stage::Limit(1));
        assert!(full.starts_with(&prefix));
        assert!(!prefix.starts_with(&full));
    }
}
