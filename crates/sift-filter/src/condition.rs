// condition.rs - Compiles one atomic condition into a predicate.
//
// Steps:
// 1. Map the comparator onto a native operator (unknown names fail).
// 2. Resolve each operand: projections become dotted field addresses,
//    literals pass through, instances fail.
// 3. If only the right operand is a projection, swap sides: native predicates
//    are field-addressed, so the field must sit on the left. Two projections
//    keep their order, since `In`/`Nin` are not symmetric.
// 4. Emit. `In`/`Nin` wrap scalar values into single-element sets. A
//    condition between two literals is evaluated on the spot and becomes a
//    sentinel.

use serde_json::Value;

use crate::error::FilterError;
use crate::filter::{Comparator, Condition, Operand};
use crate::paths::RelationPaths;
use crate::predicate::{CompareOp, Predicate};
use crate::registry::TypeRegistry;

/// An operand after path resolution.
#[derive(Debug, Clone, PartialEq)]
enum Resolved {
    Field(String),
    Value(Value),
}

/// Native operator for a filter comparator.
pub fn compare_op(comparator: &Comparator) -> Result<CompareOp, FilterError> {
    match comparator {
        Comparator::Eq => Ok(CompareOp::Eq),
        Comparator::Neq => Ok(CompareOp::Ne),
        Comparator::In => Ok(CompareOp::In),
        Comparator::Nin => Ok(CompareOp::Nin),
        Comparator::Unknown(name) => Err(FilterError::UnsupportedComparator {
            comparator: name.clone(),
        }),
    }
}

/// Compile a single condition against the resolved relation paths.
pub fn compile_condition(
    registry: &TypeRegistry,
    paths: &RelationPaths,
    condition: &Condition,
) -> Result<Predicate, FilterError> {
    let op = compare_op(&condition.comparator)?;
    let mut left = resolve(registry, paths, &condition.left)?;
    let mut right = resolve(registry, paths, &condition.right)?;
    if !condition.left.is_projection() && condition.right.is_projection() {
        std::mem::swap(&mut left, &mut right);
    }

    Ok(match (left, right) {
        (Resolved::Field(left), Resolved::Field(right)) => {
            Predicate::FieldCompare { left, op, right }
        }
        (Resolved::Field(field), Resolved::Value(value))
        | (Resolved::Value(value), Resolved::Field(field)) => {
            Predicate::compare(field, op, value)
        }
        (Resolved::Value(left), Resolved::Value(right)) => {
            if op.apply(&left, &right) {
                Predicate::AlwaysTrue
            } else {
                Predicate::AlwaysFalse
            }
        }
    })
}

fn resolve(
    registry: &TypeRegistry,
    paths: &RelationPaths,
    operand: &Operand,
) -> Result<Resolved, FilterError> {
    match operand {
        Operand::Projection { source, field } => {
            let descriptor = registry.require(source)?;
            if !descriptor.has_field(field) {
                return Err(FilterError::UnknownField {
                    type_name: source.clone(),
                    field: field.clone(),
                });
            }
            Ok(Resolved::Field(paths.address(source, field)?))
        }
        Operand::Literal { value } => Ok(Resolved::Value(value.clone())),
        Operand::Instance { type_name } => Err(FilterError::UnsupportedOperand {
            type_name: type_name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::registry::{FieldKind, RelationDescriptor, TypeDescriptor};
    use serde_json::json;

    fn registry() -> TypeRegistry {
        TypeRegistry::builder()
            .register(
                TypeDescriptor::new("User")
                    .storage_id("users")
                    .field("age", FieldKind::Integer)
                    .field("role", FieldKind::String)
                    .field("roles", FieldKind::List)
                    .field("org_id", FieldKind::Id)
                    .relation("org", RelationDescriptor::join("Org", "org_id", "_id")),
            )
            .register(
                TypeDescriptor::new("Org")
                    .storage_id("orgs")
                    .field("owner_id", FieldKind::Id),
            )
            .build()
            .unwrap()
    }

    fn compile(condition: Condition) -> Result<Predicate, FilterError> {
        let registry = registry();
        let filter = Filter::new("User").with_relation("User", "org");
        let paths = RelationPaths::resolve(&registry, &filter).unwrap();
        compile_condition(&registry, &paths, &condition)
    }

    #[test]
    fn literal_left_is_normalized() {
        let forward = compile(Condition::new(
            Operand::projection("User", "age"),
            Comparator::Eq,
            Operand::literal(5),
        ))
        .unwrap();
        let swapped = compile(Condition::new(
            Operand::literal(5),
            Comparator::Eq,
            Operand::projection("User", "age"),
        ))
        .unwrap();
        assert_eq!(forward, swapped);
        assert_eq!(forward, Predicate::compare("age", CompareOp::Eq, json!(5)));

        let ne_forward = compile(Condition::new(
            Operand::projection("User", "age"),
            Comparator::Neq,
            Operand::literal(5),
        ))
        .unwrap();
        let ne_swapped = compile(Condition::new(
            Operand::literal(5),
            Comparator::Neq,
            Operand::projection("User", "age"),
        ))
        .unwrap();
        assert_eq!(ne_forward, ne_swapped);
    }

    #[test]
    fn in_with_bare_scalar_matches_in_with_list() {
        let scalar = compile(Condition::new(
            Operand::projection("User", "role"),
            Comparator::In,
            Operand::literal("admin"),
        ))
        .unwrap();
        let list = compile(Condition::new(
            Operand::projection("User", "role"),
            Comparator::In,
            Operand::literal(json!(["admin"])),
        ))
        .unwrap();
        assert_eq!(scalar, list);

        let nin = compile(Condition::new(
            Operand::projection("User", "role"),
            Comparator::Nin,
            Operand::literal("guest"),
        ))
        .unwrap();
        assert_eq!(
            nin,
            Predicate::compare("role", CompareOp::Nin, json!(["guest"]))
        );
    }

    #[test]
    fn value_in_list_field_becomes_field_membership() {
        // "admin" in user.roles
        let predicate = compile(Condition::new(
            Operand::literal("admin"),
            Comparator::In,
            Operand::projection("User", "roles"),
        ))
        .unwrap();
        assert_eq!(
            predicate,
            Predicate::compare("roles", CompareOp::In, json!(["admin"]))
        );
    }

    #[test]
    fn joined_projection_uses_relation_prefix() {
        let predicate = compile(Condition::new(
            Operand::projection("Org", "owner_id"),
            Comparator::Eq,
            Operand::literal("u1"),
        ))
        .unwrap();
        assert_eq!(
            predicate,
            Predicate::compare("org.owner_id", CompareOp::Eq, json!("u1"))
        );
    }

    #[test]
    fn two_projections_compare_fields() {
        let predicate = compile(Condition::new(
            Operand::projection("User", "_id"),
            Comparator::Eq,
            Operand::projection("Org", "owner_id"),
        ))
        .unwrap();
        assert_eq!(
            predicate,
            Predicate::FieldCompare {
                left: "_id".to_string(),
                op: CompareOp::Eq,
                right: "org.owner_id".to_string(),
            }
        );
    }

    #[test]
    fn field_membership_keeps_operand_order() {
        for (comparator, op) in [
            (Comparator::In, CompareOp::In),
            (Comparator::Nin, CompareOp::Nin),
        ] {
            let predicate = compile(Condition::new(
                Operand::projection("User", "role"),
                comparator,
                Operand::projection("User", "roles"),
            ))
            .unwrap();
            assert_eq!(
                predicate,
                Predicate::FieldCompare {
                    left: "role".to_string(),
                    op,
                    right: "roles".to_string(),
                }
            );
        }
    }

    #[test]
    fn two_literals_fold_to_sentinels() {
        let truthy = compile(Condition::new(
            Operand::literal(1),
            Comparator::Eq,
            Operand::literal(1),
        ))
        .unwrap();
        assert_eq!(truthy, Predicate::AlwaysTrue);

        let falsy = compile(Condition::new(
            Operand::literal("a"),
            Comparator::In,
            Operand::literal(json!(["b"])),
        ))
        .unwrap();
        assert_eq!(falsy, Predicate::AlwaysFalse);
    }

    #[test]
    fn instance_operand_rejected() {
        let err = compile(Condition::new(
            Operand::projection("User", "org"),
            Comparator::Eq,
            Operand::instance("Org"),
        ))
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::UnsupportedOperand {
                type_name: "Org".to_string()
            }
        );
    }

    #[test]
    fn unknown_comparator_rejected() {
        let err = compile(Condition::new(
            Operand::projection("User", "age"),
            Comparator::Unknown("Lt".to_string()),
            Operand::literal(30),
        ))
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::UnsupportedComparator {
                comparator: "Lt".to_string()
            }
        );
    }

    #[test]
    fn undeclared_field_rejected() {
        let err = compile(Condition::new(
            Operand::projection("User", "agee"),
            Comparator::Eq,
            Operand::literal(5),
        ))
        .unwrap_err();
        assert!(matches!(err, FilterError::UnknownField { field, .. } if field == "agee"));
    }
}
