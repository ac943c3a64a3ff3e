//! Single-step derivative behavior and whole-input matching.

use gramarye::{Kind, Language, ParseError, Value};
use rstest::rstest;

#[rstest]
#[case('a', true)]
#[case('b', false)]
#[case('z', false)]
fn test_terminal_derivative_follows_predicate(#[case] symbol: char, #[case] accepted: bool) {
    let mut lang = Language::new();
    let a = lang.symbol('a');

    let residual = lang.derive(a, &symbol);
    assert_eq!(lang.accepts_empty(residual), accepted);
}

#[test]
fn test_sequence_matches_in_order() {
    let mut lang = Language::new();
    let a = lang.symbol('a');
    let b = lang.symbol('b');
    let ab = lang.sequence(a, b);

    let forest = lang.parse(ab, "ab".chars()).unwrap();
    assert_eq!(
        forest,
        vec![Value::pair(Value::Symbol('a'), Value::Symbol('b'))]
    );

    let err = lang.parse(ab, "ba".chars()).unwrap_err();
    assert_eq!(
        err,
        ParseError::Mismatch {
            position: 0,
            symbol: 'b'
        }
    );
}

#[rstest]
#[case('a')]
#[case('b')]
fn test_union_accepts_either_branch(#[case] symbol: char) {
    let mut lang = Language::new();
    let a = lang.symbol('a');
    let b = lang.symbol('b');
    let either = lang.union(a, b);

    let residual = lang.derive(either, &symbol);
    assert!(lang.accepts_empty(residual));
    assert_eq!(lang.evaluate(residual), vec![Value::Symbol(symbol)]);
}

#[test]
fn test_union_rejects_unmatched_symbols() {
    let mut lang = Language::new();
    let a = lang.symbol('a');
    let b = lang.symbol('b');
    let either = lang.union(a, b);

    let residual = lang.derive(either, &'z');
    assert_eq!(lang.kind(residual), Kind::Failure);
    assert_eq!(lang.failure_cause(residual), Some(&Value::Symbol('z')));
}

#[test]
fn test_one_of_matches_any_listed_symbol() {
    let mut lang = Language::new();
    let vowel = lang.one_of("aeiou".chars());

    for hit in ["a", "e", "u"] {
        assert!(lang.matches(vowel, hit.chars()));
    }
    assert!(!lang.matches(vowel, "z".chars()));
    assert!(!lang.matches(vowel, "ae".chars()));
}

#[test]
fn test_actions_apply_on_evaluation() {
    let mut lang = Language::new();
    let a = lang.symbol('a');
    let b = lang.symbol('b');
    let ab = lang.sequence(a, b);
    let first_only = lang.reduce(ab, |values| {
        values
            .into_iter()
            .map(|value| match value {
                Value::Pair(left, _) => *left,
                other => other,
            })
            .collect()
    });

    let forest = lang.parse(first_only, "ab".chars()).unwrap();
    assert_eq!(forest, vec![Value::Symbol('a')]);
}

#[test]
fn test_repeated_queries_agree() {
    let mut lang = Language::new();
    let a = lang.symbol('a');
    let b = lang.symbol('b');
    let ab = lang.sequence(a, b);
    let expr = lang.union(ab, a);

    assert_eq!(lang.accepts_empty(expr), lang.accepts_empty(expr));

    let once = lang.derive(expr, &'a');
    let twice = lang.derive(expr, &'a');
    assert_eq!(lang.accepts_empty(once), lang.accepts_empty(twice));
    assert_eq!(lang.evaluate(once), lang.evaluate(twice));
}

#[test]
fn test_parse_forests_serialize_and_round_trip() {
    let mut lang = Language::new();
    let a = lang.symbol('a');
    let b = lang.symbol('b');
    let ab = lang.sequence(a, b);

    let forest = lang.parse(ab, "ab".chars()).unwrap();
    let json = serde_json::to_string(&forest).unwrap();
    assert_eq!(json, r#"[{"Pair":[{"Symbol":"a"},{"Symbol":"b"}]}]"#);

    let back: Vec<Value<char>> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, forest);
}

#[test]
fn test_parse_rejects_trailing_input() {
    let mut lang = Language::new();
    let a = lang.symbol('a');

    let err = lang.parse(a, "ab".chars()).unwrap_err();
    assert_eq!(
        err,
        ParseError::Mismatch {
            position: 1,
            symbol: 'b'
        }
    );
}
