// eval.rs - Document-store matching semantics for compiled predicates.
//
// Follows the way a document store evaluates a `$match`:
//
// - dotted paths descend through nested objects and fan out over arrays of
//   objects, so `org.owners` on a to-many join sees every joined owner list
// - `field == v` holds when any reached value equals `v`, or is an array
//   containing `v`
// - a missing field compares equal to null
// - `$ne` / `$nin` are the exact negations of `$eq` / `$in`
//
// Field-to-field comparisons follow `$expr` semantics instead: each side is
// one value (missing → null) and arrays are not unwrapped.

use serde_json::{Map, Value};
use sift_filter::{CompareOp, Predicate};

pub(crate) static NULL: Value = Value::Null;

/// Every value reached by following `path` from `doc`.
pub fn path_values<'a>(doc: &'a Map<String, Value>, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    if let Some((head, rest)) = segments.split_first() {
        if let Some(value) = doc.get(*head) {
            collect(value, rest, &mut out);
        }
    }
    out
}

fn collect<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        out.push(value);
        return;
    };
    match value {
        Value::Object(map) => {
            if let Some(next) = map.get(*head) {
                collect(next, rest, out);
            }
        }
        Value::Array(items) => {
            for item in items.iter().filter(|item| item.is_object()) {
                collect(item, segments, out);
            }
        }
        _ => {}
    }
}

/// The single value at `path`, descending through objects only.
pub fn get_path<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set `path` to `value`, creating intermediate objects as needed.
pub fn set_path(doc: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            doc.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = doc
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                set_path(map, rest, value);
            }
        }
    }
}

/// Remove the value at `path`, if present.
pub fn remove_path(doc: &mut Map<String, Value>, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(map)) = doc.get_mut(head) {
                remove_path(map, rest);
            }
        }
    }
}

/// Whether `doc` satisfies `predicate`.
pub fn matches(predicate: &Predicate, doc: &Map<String, Value>) -> bool {
    match predicate {
        Predicate::AlwaysTrue => true,
        Predicate::AlwaysFalse => false,
        Predicate::Compare { field, op, value } => {
            let reached = path_values(doc, field);
            match op {
                CompareOp::Eq => equals_any(&reached, value),
                CompareOp::Ne => !equals_any(&reached, value),
                CompareOp::In => member_of(&reached, value),
                CompareOp::Nin => !member_of(&reached, value),
            }
        }
        Predicate::FieldCompare { left, op, right } => {
            let left = get_path(doc, left).unwrap_or(&NULL);
            let right = get_path(doc, right).unwrap_or(&NULL);
            match op {
                CompareOp::Eq => left == right,
                CompareOp::Ne => left != right,
                CompareOp::In => right.as_array().is_some_and(|items| items.contains(left)),
                CompareOp::Nin => !right.as_array().is_some_and(|items| items.contains(left)),
            }
        }
        Predicate::And(children) => children.iter().all(|child| matches(child, doc)),
        Predicate::Or(children) => children.iter().any(|child| matches(child, doc)),
    }
}

fn equals_any(reached: &[&Value], target: &Value) -> bool {
    if reached.is_empty() {
        return target.is_null();
    }
    reached.iter().any(|value| {
        *value == target
            || value
                .as_array()
                .is_some_and(|items| items.contains(target))
    })
}

fn member_of(reached: &[&Value], set: &Value) -> bool {
    match set {
        Value::Array(items) => items.iter().any(|item| equals_any(reached, item)),
        other => equals_any(reached, other),
    }
}
