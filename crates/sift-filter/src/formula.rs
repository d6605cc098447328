// formula.rs - Composes compiled conditions into the final DNF predicate.
//
// An empty conjunct is unconditionally true; an empty disjunct list is
// unconditionally false. Single-element ANDs / ORs are emitted bare so the
// generated queries stay minimal and stable.

use crate::predicate::Predicate;

/// AND of `predicates`; `AlwaysTrue` when empty.
pub fn join_with_and(predicates: Vec<Predicate>) -> Predicate {
    join(predicates, Predicate::AlwaysTrue, Predicate::And)
}

/// OR of `predicates`; `AlwaysFalse` when empty.
pub fn join_with_or(predicates: Vec<Predicate>) -> Predicate {
    join(predicates, Predicate::AlwaysFalse, Predicate::Or)
}

/// OR of ANDs over already-compiled conjuncts.
pub fn compile_formula(conjuncts: Vec<Vec<Predicate>>) -> Predicate {
    join_with_or(conjuncts.into_iter().map(join_with_and).collect())
}

fn join(
    mut predicates: Vec<Predicate>,
    empty: Predicate,
    combine: fn(Vec<Predicate>) -> Predicate,
) -> Predicate {
    match predicates.len() {
        0 => empty,
        1 => predicates.remove(0),
        _ => combine(predicates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::CompareOp;
    use serde_json::json;

    fn eq(field: &str, value: i64) -> Predicate {
        Predicate::compare(field, CompareOp::Eq, json!(value))
    }

    #[test]
    fn no_disjuncts_is_deny_all() {
        assert_eq!(compile_formula(vec![]), Predicate::AlwaysFalse);
    }

    #[test]
    fn single_empty_conjunct_is_allow_all() {
        assert_eq!(compile_formula(vec![vec![]]), Predicate::AlwaysTrue);
    }

    #[test]
    fn single_elements_are_not_wrapped() {
        assert_eq!(compile_formula(vec![vec![eq("a", 1)]]), eq("a", 1));
    }

    #[test]
    fn or_of_ands() {
        let predicate = compile_formula(vec![vec![eq("a", 1), eq("b", 2)], vec![eq("c", 3)]]);
        assert_eq!(
            predicate,
            Predicate::Or(vec![Predicate::And(vec![eq("a", 1), eq("b", 2)]), eq("c", 3)])
        );
    }

    #[test]
    fn empty_conjunct_branch_becomes_always_true() {
        let predicate = compile_formula(vec![vec![], vec![eq("a", 1)]]);
        assert_eq!(
            predicate,
            Predicate::Or(vec![Predicate::AlwaysTrue, eq("a", 1)])
        );
    }

    #[test]
    fn and_preserves_order() {
        assert_eq!(
            join_with_and(vec![eq("b", 2), eq("a", 1)]),
            Predicate::And(vec![eq("b", 2), eq("a", 1)])
        );
    }
}
