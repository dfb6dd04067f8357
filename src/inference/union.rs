//! Union arm: at most one child per family, kept in kind order.
//!
//! A family is the set of kinds that join without producing a union:
//! Integer/FloatingPoint, String/Binary, and every other kind on its own.
//! With one child per family, adding an alternative is a lookup plus a join,
//! so a field that flips between two shapes stays a two-child union however
//! many records repeat the flip.
use super::{Kind, Ty};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Family {
    Numeric,
    Text,
    Single(Kind),
}

fn family(kind: Kind) -> Family {
    match kind {
        Kind::Integer | Kind::FloatingPoint => Family::Numeric,
        Kind::String | Kind::Binary => Family::Text,
        other => Family::Single(other),
    }
}

/// New union from two nodes of different families.
pub(super) fn pair(a: Ty, b: Ty) -> Ty {
    let mut children = Vec::with_capacity(2);
    insert_child(&mut children, a);
    insert_child(&mut children, b);
    Ty::Union(children)
}

pub(super) fn join_unions(mut a: Vec<Ty>, b: Vec<Ty>) -> Vec<Ty> {
    for child in b {
        insert_child(&mut a, child);
    }
    a
}

/// Union-child merge: widen the child of the same family, or insert in kind
/// order.
pub(super) fn insert_child(children: &mut Vec<Ty>, x: Ty) {
    match x {
        Ty::Null => {}
        Ty::Union(nested) => {
            for child in nested {
                insert_child(children, child);
            }
        }
        x => {
            let fam = family(x.kind());
            match children.iter().position(|c| family(c.kind()) == fam) {
                // family members are adjacent in kind order, so the slot stays sorted
                Some(at) => {
                    let existing = std::mem::replace(&mut children[at], Ty::Null);
                    children[at] = super::join(existing, x);
                }
                None => {
                    let at = children.partition_point(|c| c.kind() < x.kind());
                    children.insert(at, x);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{FloatRange, IntRange};

    #[test]
    fn pair_is_canonically_ordered() {
        assert_eq!(pair(Ty::Str, Ty::Bool), pair(Ty::Bool, Ty::Str));
        assert_eq!(pair(Ty::Str, Ty::Bool), Ty::Union(vec![Ty::Bool, Ty::Str]));
    }

    #[test]
    fn same_family_children_are_widened() {
        let mut children = vec![Ty::Int(IntRange::point(1)), Ty::Str];
        insert_child(&mut children, Ty::Int(IntRange::point(10)));
        assert_eq!(children, [Ty::Int(IntRange::new(1, 10)), Ty::Str]);

        insert_child(&mut children, Ty::Float(FloatRange::point(0.5)));
        assert_eq!(children, [Ty::Float(FloatRange::new(0.5, 10.0)), Ty::Str]);

        insert_child(&mut children, Ty::Binary);
        assert_eq!(children, [Ty::Float(FloatRange::new(0.5, 10.0)), Ty::Str]);
    }

    #[test]
    fn binary_child_is_upgraded_by_string() {
        let mut children = vec![Ty::Bool, Ty::Binary];
        insert_child(&mut children, Ty::Str);
        assert_eq!(children, [Ty::Bool, Ty::Str]);
    }

    #[test]
    fn nulls_and_nested_unions_flatten() {
        let mut children = vec![Ty::Bool, Ty::Str];
        insert_child(&mut children, Ty::Null);
        insert_child(&mut children, Ty::Union(vec![Ty::Timestamp, Ty::Str]));
        assert_eq!(children, [Ty::Bool, Ty::Str, Ty::Timestamp]);
    }
}
