//! Canonicalization laws of the expression algebra.
//!
//! These exercise the smart constructors through observable behavior:
//! failure absorption and elimination, transform fusion, and the
//! guarantee that construction order does not change the language being
//! denoted, only the shape of its parse values.

use gramarye::{Kind, Language, Value};

#[test]
fn test_failure_absorbs_sequences() {
    let mut lang: Language<char> = Language::new();
    let x = lang.symbol('x');
    let dead = lang.failure();

    let left = lang.sequence(dead, x);
    let right = lang.sequence(x, dead);
    assert_eq!(lang.kind(left), Kind::Failure);
    assert_eq!(lang.kind(right), Kind::Failure);
    assert!(!lang.matches(left, "x".chars()));
    assert!(!lang.matches(right, "x".chars()));
}

#[test]
fn test_failure_is_union_identity() {
    let mut lang: Language<char> = Language::new();
    let x = lang.symbol('x');
    let dead = lang.failure();

    // The composition is x itself, not a union node wrapping it.
    assert_eq!(lang.union(dead, x), x);
    assert_eq!(lang.union(x, dead), x);
    assert_eq!(lang.kind(x), Kind::Terminal);
}

#[test]
fn test_failure_elimination_cascades() {
    let mut lang: Language<char> = Language::new();
    let x = lang.symbol('x');
    let dead_a = lang.failure();
    let dead_b = lang.failure();

    let folded = lang.union(dead_a, dead_b);
    assert_eq!(lang.kind(folded), Kind::Failure);
    assert_eq!(lang.union(folded, x), x);
}

#[test]
fn test_transform_chains_fuse_in_application_order() {
    let mut lang = Language::new();
    let a = lang.symbol('a');
    let first = lang.reduce(a, |values| {
        values.into_iter().map(|_| Value::Symbol('b')).collect()
    });
    let second = lang.reduce(first, |values| {
        values
            .into_iter()
            .map(|value| match value {
                Value::Symbol('b') => Value::Symbol('c'),
                other => other,
            })
            .collect()
    });

    // Two reductions, one transform node; the inner action runs first.
    assert_eq!(lang.kind(second), Kind::Transform);
    let forest = lang.parse(second, "a".chars()).unwrap();
    assert_eq!(forest, vec![Value::Symbol('c')]);
}

#[test]
fn test_union_construction_order_is_immaterial() {
    let mut lang = Language::new();
    let (a1, b1, c1) = (lang.symbol('a'), lang.symbol('b'), lang.symbol('c'));
    let left_first = lang.union(a1, b1);
    let left_nested = lang.union(left_first, c1);

    let (a2, b2, c2) = (lang.symbol('a'), lang.symbol('b'), lang.symbol('c'));
    let right_first = lang.union(b2, c2);
    let right_nested = lang.union(a2, right_first);

    for input in ["a", "b", "c"] {
        assert!(lang.matches(left_nested, input.chars()));
        assert!(lang.matches(right_nested, input.chars()));
    }
    assert!(!lang.matches(left_nested, "d".chars()));
    assert!(!lang.matches(right_nested, "d".chars()));
}

#[test]
fn test_sequence_association_only_reshapes_pairs() {
    let mut lang = Language::new();
    let (a1, b1, c1) = (lang.symbol('a'), lang.symbol('b'), lang.symbol('c'));
    let ab = lang.sequence(a1, b1);
    let left_nested = lang.sequence(ab, c1);

    let (a2, b2, c2) = (lang.symbol('a'), lang.symbol('b'), lang.symbol('c'));
    let bc = lang.sequence(b2, c2);
    let right_nested = lang.sequence(a2, bc);

    // Both accept the same strings; the pair shape follows the written
    // nesting even though the left-nested chain was re-associated
    // internally.
    let left_forest = lang.parse(left_nested, "abc".chars()).unwrap();
    assert_eq!(
        left_forest,
        vec![Value::pair(
            Value::pair(Value::Symbol('a'), Value::Symbol('b')),
            Value::Symbol('c')
        )]
    );

    let right_forest = lang.parse(right_nested, "abc".chars()).unwrap();
    assert_eq!(
        right_forest,
        vec![Value::pair(
            Value::Symbol('a'),
            Value::pair(Value::Symbol('b'), Value::Symbol('c'))
        )]
    );

    assert!(!lang.matches(left_nested, "ab".chars()));
    assert!(!lang.matches(right_nested, "acb".chars()));
}

#[test]
fn test_continuation_operands_fold_out_of_sequences() {
    let mut lang = Language::new();
    let done = lang.continuation(|_| vec![Value::Symbol('a')]);
    let b = lang.symbol('b');

    let seq = lang.sequence(done, b);
    assert_eq!(lang.kind(seq), Kind::Transform);

    let forest = lang.parse(seq, "b".chars()).unwrap();
    assert_eq!(
        forest,
        vec![Value::pair(Value::Symbol('a'), Value::Symbol('b'))]
    );
}
