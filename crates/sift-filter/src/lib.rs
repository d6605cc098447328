//! # sift-filter
//!
//! Compiles authorization data filters into document-store queries.
//!
//! A policy evaluator describes "records of type T the principal may see" as
//! a [`Filter`]: a root type, the relations it traverses, and a boolean
//! formula in disjunctive normal form over field conditions. The
//! [`FilterCompiler`] turns that into a [`CompiledQuery`]: join stages for
//! every cross-collection relation followed by one match stage, targeted at
//! the root type's collection. A [`QueryExecutor`] runs it.
//!
//! ## Key invariants
//!
//! - **No disjuncts → deny-all**: a filter without grants matches no record.
//! - **Empty conjunct → allow-all**: an access path with no conditions is
//!   unconditional.
//! - **Deterministic joins**: join stages follow relation discovery order.
//! - **Frozen registry**: a [`TypeRegistry`] is validated once when built and
//!   never mutated afterwards.

pub mod compiler;
pub mod condition;
pub mod config;
pub mod error;
pub mod filter;
pub mod formula;
pub mod paths;
pub mod predicate;
pub mod query;
pub mod registry;

pub use compiler::{compile, FilterCompiler};
pub use config::RegistryConfig;
pub use error::{FilterError, RegistryError};
pub use filter::{Comparator, Condition, Conjunct, Filter, Operand, RelationRef};
pub use paths::{JoinStage, RelationPaths};
pub use predicate::{to_set, CompareOp, Predicate};
pub use query::{CompiledQuery, QueryExecutor, Record, Stage};
pub use registry::{
    Cardinality, FieldKind, RelationDescriptor, TypeDescriptor, TypeRegistry,
    TypeRegistryBuilder, ID_FIELD,
};
