//! Property-based tests for indexing, slicing, and rendering laws
//!
//! Verifies:
//! 1. Negative indices count from the end, and fail past the start
//! 2. Slices clamp their endpoints instead of failing
//! 3. Unions keep order and duplicates
//! 4. Canonical rendering compiles back to an equivalent query
//! 5. Evaluation is deterministic

use proptest::prelude::*;

use jsonpath_dialect::{compile, evaluate, ErrorKind, Value};

// ── Strategies ──────────────────────────────────────────────────────────

fn array_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-1000i64..1000, 0..20)
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        key_strategy().prop_map(|k| format!(".{}", k)),
        key_strategy().prop_map(|k| format!("['{}']", k)),
        (-5i64..5).prop_map(|i| format!("[{}]", i)),
        Just("[*]".to_string()),
        Just("..".to_string()),
        (-5i64..5, -5i64..5).prop_map(|(a, b)| format!("[{}:{}]", a, b)),
        (0i64..5, 0i64..5).prop_map(|(a, b)| format!("[{},{}]", a, b)),
        Just(".length".to_string()),
    ]
}

fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 0..6).prop_map(|segments| {
        let mut path = "$".to_string();
        for segment in segments {
            // '..' needs a following segment
            if path.ends_with("..") && segment.starts_with('.') {
                path.push_str(segment.trim_start_matches('.'));
            } else {
                path.push_str(&segment);
            }
        }
        if path.ends_with("..") {
            path.push('*');
        }
        path
    })
}

fn doc_strategy() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        (-100i64..100).prop_map(serde_json::Value::from),
        "[a-z]{0,5}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    })
}

fn array_doc(items: &[i64]) -> Value {
    Value::Array(items.iter().copied().map(Value::Integer).collect())
}

fn eval(path: &str, doc: &Value) -> Result<Value, jsonpath_dialect::EvalError> {
    evaluate(&compile(path).unwrap(), doc)
}

// ── Index and slice laws ────────────────────────────────────────────────

proptest! {
    /// Index(-k) == Index(len - k) for 1 <= k <= len
    #[test]
    fn prop_negative_index_counts_from_end(items in array_strategy(), k in 1usize..25) {
        let doc = array_doc(&items);
        let negative = eval(&format!("$[-{}]", k), &doc);

        if k <= items.len() {
            let positive = eval(&format!("$[{}]", items.len() - k), &doc);
            prop_assert_eq!(negative.unwrap(), positive.unwrap());
        } else {
            prop_assert_eq!(negative.unwrap_err().kind(), ErrorKind::IndexOutOfRange);
        }
    }

    /// [a:b] over length N yields max(0, min(b, N) - max(a, 0)) elements
    #[test]
    fn prop_range_clamps(items in array_strategy(), a in 0i64..30, b in 0i64..30) {
        let doc = array_doc(&items);
        let result = eval(&format!("$[{}:{}]", a, b), &doc).unwrap();

        let n = items.len() as i64;
        let expected = (b.min(n) - a.max(0)).max(0) as usize;
        prop_assert_eq!(result.len(), Some(expected));
    }

    /// Reversing twice gives the original sequence
    #[test]
    fn prop_reverse_slice(items in array_strategy()) {
        let doc = array_doc(&items);
        let reversed = eval("$[::-1]", &doc).unwrap();
        let twice = eval("$[::-1]", &reversed).unwrap();
        prop_assert_eq!(twice, doc);
    }

    /// A union repeats members in the order given
    #[test]
    fn prop_union_keeps_duplicates(items in prop::collection::vec(-100i64..100, 1..10), i in 0usize..10) {
        let i = i % items.len();
        let doc = array_doc(&items);
        let result = eval(&format!("$[{},{}]", i, i), &doc).unwrap();
        prop_assert_eq!(result, array_doc(&[items[i], items[i]]));
    }
}

// ── Rendering and determinism ───────────────────────────────────────────

proptest! {
    /// Canonical rendering compiles back to the same query
    #[test]
    fn prop_canonical_round_trip(path in path_strategy()) {
        let query = compile(&path).unwrap();
        let rendered = compile(&query.to_string()).unwrap();
        prop_assert_eq!(rendered, query);
    }

    /// The same query over the same document always gives the same answer
    #[test]
    fn prop_evaluation_deterministic(path in path_strategy(), doc in doc_strategy()) {
        let doc = Value::from(doc);
        let query = compile(&path).unwrap();
        let first = evaluate(&query, &doc);
        let second = evaluate(&query, &doc);
        prop_assert_eq!(first, second);
    }
}
