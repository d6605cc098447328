// filter.rs - The abstract filter handed over by the policy evaluator.
//
// A Filter is a boolean formula in disjunctive normal form: it matches a
// record iff some conjunct's conditions all hold. The two vacuous cases are
// significant:
//
// - no disjuncts at all     → the principal has no access (deny-all)
// - an empty conjunct       → that access path is unconditional (allow-all)
//
// Filters are created per request, consumed by one compilation and dropped.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// One side of a condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operand {
    /// A field of a type participating in the filter.
    Projection { source: String, field: String },
    /// An immediate scalar or list value.
    Literal { value: Value },
    /// A whole entity instance. Never compilable: conditions must compare a
    /// unique key field instead.
    Instance { type_name: String },
}

impl Operand {
    pub fn projection(source: impl Into<String>, field: impl Into<String>) -> Self {
        Operand::Projection {
            source: source.into(),
            field: field.into(),
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Operand::Literal {
            value: value.into(),
        }
    }

    pub fn instance(type_name: impl Into<String>) -> Self {
        Operand::Instance {
            type_name: type_name.into(),
        }
    }

    pub fn is_projection(&self) -> bool {
        matches!(self, Operand::Projection { .. })
    }
}

/// Comparison between the two operands of a condition.
///
/// Deserializes from its name. Names the compiler has no translation for
/// are kept as `Unknown` so they fail at compile time with a clear error
/// rather than at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Comparator {
    Eq,
    Neq,
    In,
    Nin,
    Unknown(String),
}

impl From<String> for Comparator {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Eq" => Comparator::Eq,
            "Neq" => Comparator::Neq,
            "In" => Comparator::In,
            "Nin" => Comparator::Nin,
            _ => Comparator::Unknown(name),
        }
    }
}

impl From<Comparator> for String {
    fn from(comparator: Comparator) -> Self {
        comparator.to_string()
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Eq => write!(f, "Eq"),
            Comparator::Neq => write!(f, "Neq"),
            Comparator::In => write!(f, "In"),
            Comparator::Nin => write!(f, "Nin"),
            Comparator::Unknown(name) => write!(f, "{}", name),
        }
    }
}

/// An atomic comparison `left <comparator> right`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub left: Operand,
    #[serde(rename = "cmp", alias = "comparator")]
    pub comparator: Comparator,
    pub right: Operand,
}

impl Condition {
    pub fn new(left: Operand, comparator: Comparator, right: Operand) -> Self {
        Self {
            left,
            comparator,
            right,
        }
    }
}

/// Conditions interpreted as a logical AND.
pub type Conjunct = Vec<Condition>;

/// A relation the filter traverses: `left.name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RelationRef {
    pub left: String,
    pub name: String,
}

/// The filter for "records of type `root` visible to the principal".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    /// Type of the records being selected.
    #[serde(alias = "model")]
    pub root: String,

    /// Relations the conditions traverse, in discovery order.
    #[serde(default)]
    pub relations: Vec<RelationRef>,

    /// OR of ANDs.
    #[serde(default, alias = "conditions")]
    pub disjuncts: Vec<Conjunct>,
}

impl Filter {
    /// A filter over `root` with no disjuncts (matches nothing).
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            relations: Vec::new(),
            disjuncts: Vec::new(),
        }
    }

    pub fn with_relation(mut self, left: impl Into<String>, name: impl Into<String>) -> Self {
        self.relations.push(RelationRef {
            left: left.into(),
            name: name.into(),
        });
        self
    }

    pub fn with_disjunct(mut self, conjunct: Conjunct) -> Self {
        self.disjuncts.push(conjunct);
        self
    }

    /// Structural SHA-256 of `(root, relations, disjuncts)`, lowercase hex.
    ///
    /// Two filters with the same fingerprint compile to the same query
    /// against the same registry.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"root\0");
        hasher.update(self.root.as_bytes());
        for relation in &self.relations {
            hasher.update(b"\0rel\0");
            hasher.update(relation.left.as_bytes());
            hasher.update(b".");
            hasher.update(relation.name.as_bytes());
        }
        for conjunct in &self.disjuncts {
            hasher.update(b"\0or");
            for condition in conjunct {
                hasher.update(b"\0and\0");
                hash_operand(&mut hasher, &condition.left);
                hasher.update(condition.comparator.to_string().as_bytes());
                hash_operand(&mut hasher, &condition.right);
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

fn hash_operand(hasher: &mut Sha256, operand: &Operand) {
    match operand {
        Operand::Projection { source, field } => {
            hasher.update(b"P:");
            hasher.update(source.as_bytes());
            hasher.update(b".");
            hasher.update(field.as_bytes());
        }
        Operand::Literal { value } => {
            hasher.update(b"L:");
            hasher.update(value.to_string().as_bytes());
        }
        Operand::Instance { type_name } => {
            hasher.update(b"I:");
            hasher.update(type_name.as_bytes());
        }
    }
    hasher.update(b"\0");
}
