// predicate.rs - Target-native predicates and their MongoDB rendering.
//
// Predicates are field-addressed: the left side of every comparison is a
// dotted field address in the (joined) record, the right side a value.
// `AlwaysTrue` / `AlwaysFalse` are the sentinels for an unconditional access
// path and for "no access at all"; they render as an `_id` existence test,
// which every stored document satisfies.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::registry::ID_FIELD;

/// Native comparison operator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    In,
    Nin,
}

impl CompareOp {
    /// MongoDB query operator name.
    pub fn operator(self) -> &'static str {
        match self {
            CompareOp::Eq => "$eq",
            CompareOp::Ne => "$ne",
            CompareOp::In => "$in",
            CompareOp::Nin => "$nin",
        }
    }

    /// Whether the right-hand side is a set.
    pub fn is_membership(self) -> bool {
        matches!(self, CompareOp::In | CompareOp::Nin)
    }

    /// Evaluate the operator on two literal values.
    pub fn apply(self, left: &Value, right: &Value) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::In => to_set(right.clone()).contains(left),
            CompareOp::Nin => !to_set(right.clone()).contains(left),
        }
    }
}

/// Coerce a value into a set: lists pass through, anything else becomes a
/// single-element list.
pub fn to_set(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// A compiled boolean predicate over one (joined) record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every record.
    AlwaysTrue,
    /// Matches no record.
    AlwaysFalse,
    /// `field <op> value`. Membership operators always carry a list value.
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    /// `left <op> right` where both sides are field addresses.
    FieldCompare {
        left: String,
        op: CompareOp,
        right: String,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Build a field comparison, wrapping scalars into sets for `In`/`Nin`.
    pub fn compare(field: impl Into<String>, op: CompareOp, value: Value) -> Self {
        let value = if op.is_membership() {
            Value::Array(to_set(value))
        } else {
            value
        };
        Predicate::Compare {
            field: field.into(),
            op,
            value,
        }
    }

    /// `_id == value`; used to narrow a query to a single record.
    pub fn id_eq(value: impl Into<Value>) -> Self {
        Predicate::compare(ID_FIELD, CompareOp::Eq, value.into())
    }

    /// Render as a MongoDB `$match` document.
    pub fn to_document(&self) -> Value {
        match self {
            Predicate::AlwaysTrue => json!({ ID_FIELD: { "$exists": true } }),
            Predicate::AlwaysFalse => json!({ ID_FIELD: { "$exists": false } }),
            Predicate::Compare { field, op, value } => {
                let mut condition = Map::new();
                condition.insert(op.operator().to_string(), value.clone());
                let mut doc = Map::new();
                doc.insert(field.clone(), Value::Object(condition));
                Value::Object(doc)
            }
            Predicate::FieldCompare { left, op, right } => {
                let operands = json!([format!("${}", left), format!("${}", right)]);
                // `$nin` has no aggregation-expression form.
                let expr = match op {
                    CompareOp::Nin => json!({ "$not": [{ "$in": operands }] }),
                    _ => json!({ op.operator(): operands }),
                };
                json!({ "$expr": expr })
            }
            Predicate::And(children) => json!({
                "$and": children.iter().map(Predicate::to_document).collect::<Vec<_>>()
            }),
            Predicate::Or(children) => json!({
                "$or": children.iter().map(Predicate::to_document).collect::<Vec<_>>()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_set_wraps_scalars_only() {
        assert_eq!(to_set(json!("admin")), vec![json!("admin")]);
        assert_eq!(to_set(json!(["a", "b"])), vec![json!("a"), json!("b")]);
        assert_eq!(to_set(Value::Null), vec![Value::Null]);
        assert_eq!(to_set(json!([])), Vec::<Value>::new());
    }

    #[test]
    fn membership_compare_coerces_scalar() {
        assert_eq!(
            Predicate::compare("role", CompareOp::In, json!("admin")),
            Predicate::compare("role", CompareOp::In, json!(["admin"]))
        );
        assert_eq!(
            Predicate::compare("age", CompareOp::Eq, json!([5])),
            Predicate::Compare {
                field: "age".to_string(),
                op: CompareOp::Eq,
                value: json!([5]),
            }
        );
    }

    #[test]
    fn renders_native_operators() {
        assert_eq!(
            Predicate::compare("org.is_public", CompareOp::Eq, json!(true)).to_document(),
            json!({ "org.is_public": { "$eq": true } })
        );
        assert_eq!(
            Predicate::compare("name", CompareOp::Ne, json!("x")).to_document(),
            json!({ "name": { "$ne": "x" } })
        );
        assert_eq!(
            Predicate::compare("role", CompareOp::Nin, json!("guest")).to_document(),
            json!({ "role": { "$nin": ["guest"] } })
        );
    }

    #[test]
    fn renders_sentinels_as_id_existence() {
        assert_eq!(
            Predicate::AlwaysTrue.to_document(),
            json!({ "_id": { "$exists": true } })
        );
        assert_eq!(
            Predicate::AlwaysFalse.to_document(),
            json!({ "_id": { "$exists": false } })
        );
    }

    #[test]
    fn renders_field_comparisons_as_expr() {
        let eq = Predicate::FieldCompare {
            left: "owner_id".to_string(),
            op: CompareOp::Eq,
            right: "org.owner_id".to_string(),
        };
        assert_eq!(
            eq.to_document(),
            json!({ "$expr": { "$eq": ["$owner_id", "$org.owner_id"] } })
        );

        let nin = Predicate::FieldCompare {
            left: "a".to_string(),
            op: CompareOp::Nin,
            right: "b".to_string(),
        };
        assert_eq!(
            nin.to_document(),
            json!({ "$expr": { "$not": [{ "$in": ["$a", "$b"] }] } })
        );
    }

    #[test]
    fn renders_boolean_combinators() {
        let predicate = Predicate::Or(vec![
            Predicate::AlwaysTrue,
            Predicate::And(vec![
                Predicate::compare("a", CompareOp::Eq, json!(1)),
                Predicate::compare("b", CompareOp::Eq, json!(2)),
            ]),
        ]);
        assert_eq!(
            predicate.to_document(),
            json!({ "$or": [
                { "_id": { "$exists": true } },
                { "$and": [{ "a": { "$eq": 1 } }, { "b": { "$eq": 2 } }] }
            ]})
        );
    }

    #[test]
    fn literal_comparisons() {
        assert!(CompareOp::Eq.apply(&json!(5), &json!(5)));
        assert!(CompareOp::Ne.apply(&json!(5), &json!("5")));
        assert!(CompareOp::In.apply(&json!("a"), &json!("a")));
        assert!(CompareOp::In.apply(&json!("a"), &json!(["b", "a"])));
        assert!(CompareOp::Nin.apply(&json!("c"), &json!(["b", "a"])));
    }
}
