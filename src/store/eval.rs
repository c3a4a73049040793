use bson::{Bson, Document};
use std::cmp::Ordering;

use crate::errors::PaginateError;

// Safety limits to prevent resource abuse
const MAX_PATH_DEPTH: usize = 32;
const MAX_IN_SET: usize = 1000;
const MAX_SORT_FIELDS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A parsed `$match` predicate.
#[derive(Debug, Clone)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Exists { path: String, exists: bool },
    In { path: String, values: Vec<Bson> },
    Cmp { path: String, op: CmpOp, value: Bson },
    #[cfg(feature = "regex")]
    Regex { path: String, regex: regex::Regex },
}

/// One `$sort` key: field path and direction (`true` = ascending).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub ascending: bool,
}

fn invalid(msg: impl Into<String>) -> PaginateError {
    PaginateError::InvalidStage(msg.into())
}

fn filter_list(op: &str, v: &Bson) -> Result<Vec<Filter>, PaginateError> {
    let Bson::Array(items) = v else {
        return Err(invalid(format!("{op} expects an array")));
    };
    items
        .iter()
        .map(|item| match item {
            Bson::Document(d) => parse_filter(d),
            _ => Err(invalid(format!("{op} elements must be documents"))),
        })
        .collect()
}

/// Parse a `$match` document.
pub fn parse_filter(spec: &Document) -> Result<Filter, PaginateError> {
    let mut parts = Vec::with_capacity(spec.len());
    for (key, value) in spec {
        let f = match key.as_str() {
            "$and" => Filter::And(filter_list(key, value)?),
            "$or" => Filter::Or(filter_list(key, value)?),
            "$nor" => Filter::Not(Box::new(Filter::Or(filter_list(key, value)?))),
            k if k.starts_with('$') => return Err(invalid(format!("unsupported query operator {k}"))),
            path => parse_field(path, value)?,
        };
        parts.push(f);
    }
    Ok(match parts.len() {
        0 => Filter::True,
        1 => parts.remove(0),
        _ => Filter::And(parts),
    })
}

fn parse_field(path: &str, value: &Bson) -> Result<Filter, PaginateError> {
    let ops = match value {
        Bson::Document(d) if d.keys().next().is_some_and(|k| k.starts_with('$')) => d,
        other => return Ok(Filter::Cmp { path: path.into(), op: CmpOp::Eq, value: other.clone() }),
    };
    let mut parts = Vec::with_capacity(ops.len());
    for (op, arg) in ops {
        let path = path.to_string();
        let f = match op.as_str() {
            "$eq" => Filter::Cmp { path, op: CmpOp::Eq, value: arg.clone() },
            "$ne" => Filter::Not(Box::new(Filter::Cmp { path, op: CmpOp::Eq, value: arg.clone() })),
            "$gt" => Filter::Cmp { path, op: CmpOp::Gt, value: arg.clone() },
            "$gte" => Filter::Cmp { path, op: CmpOp::Gte, value: arg.clone() },
            "$lt" => Filter::Cmp { path, op: CmpOp::Lt, value: arg.clone() },
            "$lte" => Filter::Cmp { path, op: CmpOp::Lte, value: arg.clone() },
            "$in" | "$nin" => {
                let Bson::Array(values) = arg else {
                    return Err(invalid(format!("{op} expects an array")));
                };
                if values.len() > MAX_IN_SET {
                    return Err(invalid(format!("{op} set too large: {}", values.len())));
                }
                let f = Filter::In { path, values: values.clone() };
                if op == "$in" { f } else { Filter::Not(Box::new(f)) }
            }
            "$exists" => Filter::Exists { path, exists: truthy(arg) },
            #[cfg(feature = "regex")]
            "$regex" => {
                let Bson::String(pattern) = arg else {
                    return Err(invalid("$regex expects a string"));
                };
                let case_insensitive =
                    ops.get_str("$options").map(|o| o.contains('i')).unwrap_or(false);
                let regex = regex::RegexBuilder::new(pattern)
                    .case_insensitive(case_insensitive)
                    .build()
                    .map_err(|e| invalid(format!("$regex: {e}")))?;
                Filter::Regex { path, regex }
            }
            #[cfg(feature = "regex")]
            "$options" => continue,
            other => return Err(invalid(format!("unsupported query operator {other}"))),
        };
        parts.push(f);
    }
    Ok(if parts.len() == 1 { parts.remove(0) } else { Filter::And(parts) })
}

fn truthy(v: &Bson) -> bool {
    match v {
        Bson::Boolean(b) => *b,
        Bson::Int32(i) => *i != 0,
        Bson::Int64(i) => *i != 0,
        Bson::Double(f) => *f != 0.0,
        Bson::Null | Bson::Undefined => false,
        _ => true,
    }
}

/// Parse a `$sort` document: `{ field: 1 | -1, ... }`.
pub fn parse_sort(spec: &Document) -> Result<Vec<SortSpec>, PaginateError> {
    if spec.is_empty() {
        return Err(invalid("$sort needs at least one key"));
    }
    if spec.len() > MAX_SORT_FIELDS {
        return Err(invalid(format!("$sort spec too long: {}", spec.len())));
    }
    spec.iter()
        .map(|(field, dir)| {
            let ascending = match dir {
                Bson::Int32(1) | Bson::Int64(1) => true,
                Bson::Int32(-1) | Bson::Int64(-1) => false,
                Bson::Double(f) if *f == 1.0 => true,
                Bson::Double(f) if *f == -1.0 => false,
                other => return Err(invalid(format!("$sort direction for {field} must be 1 or -1, got {other}"))),
            };
            Ok(SortSpec { field: field.clone(), ascending })
        })
        .collect()
}

pub fn eval_filter(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Or(fs) => fs.iter().any(|f| eval_filter(doc, f)),
        Filter::Not(f) => !eval_filter(doc, f),
        Filter::Exists { path, exists } => get_path(doc, path).is_some() == *exists,
        Filter::In { path, values } => {
            get_path(doc, path).is_some_and(|v| values.iter().any(|x| values_equal(v, x)))
        }
        Filter::Cmp { path, op, value } => match get_path(doc, path) {
            Some(v) => {
                let c = compare_bson(v, value);
                match op {
                    CmpOp::Eq => values_equal(v, value),
                    // Range operators only match within the same type bracket.
                    _ if !same_bracket(v, value) => false,
                    CmpOp::Gt => c == Ordering::Greater,
                    CmpOp::Gte => c != Ordering::Less,
                    CmpOp::Lt => c == Ordering::Less,
                    CmpOp::Lte => c != Ordering::Greater,
                }
            }
            None => matches!((op, value), (CmpOp::Eq, Bson::Null)),
        },
        #[cfg(feature = "regex")]
        Filter::Regex { path, regex } => {
            matches!(get_path(doc, path), Some(Bson::String(s)) if regex.is_match(s))
        }
    }
}

pub(crate) fn compare_docs(a: &Document, b: &Document, sort: &[SortSpec]) -> Ordering {
    for s in sort {
        let ord = match (get_path(a, &s.field), get_path(b, &s.field)) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if s.ascending { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

pub(crate) fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.split('.').count() > MAX_PATH_DEPTH {
        return None;
    }
    let mut parts = path.split('.');
    let mut cur = doc.get(parts.next()?)?;
    for part in parts {
        match cur {
            Bson::Document(d) => cur = d.get(part)?,
            _ => return None,
        }
    }
    Some(cur)
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_))
}

fn as_f64_num(x: &Bson) -> f64 {
    match x {
        Bson::Int32(i) => f64::from(*i),
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f,
        Bson::Decimal128(d) => d.to_string().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn same_bracket(a: &Bson, b: &Bson) -> bool {
    (is_num(a) && is_num(b)) || type_rank(a) == type_rank(b)
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    if is_num(a) && is_num(b) {
        return as_f64_num(a) == as_f64_num(b);
    }
    a == b
}

/// Total order over BSON values: numbers compare numerically across widths, strings and
/// booleans by value, everything else by type rank.
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if is_num(a) && is_num(b) {
        return as_f64_num(a).total_cmp(&as_f64_num(b));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

// Ordering of types follows the server's comparison order; numbers share one bracket.
fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::Symbol(_) | Bson::String(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::DbPointer(_) => 12,
        Bson::JavaScriptCode(_) | Bson::JavaScriptCodeWithScope(_) => 13,
        Bson::MaxKey => 255,
    }
}
