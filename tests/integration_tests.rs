use jsonpath_dialect::{compile, decode, evaluate, Query, Value};
use serde_json::json;

fn store() -> Value {
    Value::from(json!({
        "store": {
            "book": [
                {
                    "category": "reference",
                    "author": "Nigel Rees",
                    "title": "Sayings of the Century",
                    "price": 8.95
                },
                {
                    "category": "fiction",
                    "author": "Evelyn Waugh",
                    "title": "Sword of Honour",
                    "price": 12.99
                },
                {
                    "category": "fiction",
                    "author": "Herman Melville",
                    "title": "Moby Dick",
                    "isbn": "0-553-21311-3",
                    "price": 8.99
                },
                {
                    "category": "fiction",
                    "author": "J. R. R. Tolkien",
                    "title": "The Lord of the Rings",
                    "isbn": "0-395-19395-8",
                    "price": 22.99
                }
            ],
            "bicycle": {
                "color": "red",
                "price": 19.95
            }
        },
        "expensive": 10
    }))
}

fn run(path: &str, doc: &Value) -> Value {
    let query = compile(path).unwrap_or_else(|e| panic!("failed to compile {}: {}", path, e));
    evaluate(&query, doc).unwrap_or_else(|e| panic!("failed to evaluate {}: {}", path, e))
}

fn titles(result: &Value) -> Vec<String> {
    let Value::Array(books) = result else {
        panic!("expected an array of books, got {}", result);
    };
    books
        .iter()
        .map(|book| match book {
            Value::Object(map) => map["title"].as_str().unwrap_or_default().to_string(),
            other => panic!("expected a book, got {}", other),
        })
        .collect()
}

fn authors() -> Value {
    Value::from(json!([
        "Nigel Rees",
        "Evelyn Waugh",
        "Herman Melville",
        "J. R. R. Tolkien"
    ]))
}

#[test]
fn test_all_authors() {
    assert_eq!(run("$.store.book[*].author", &store()), authors());
}

#[test]
fn test_all_authors_recursive() {
    assert_eq!(run("$..author", &store()), authors());
}

#[test]
fn test_third_book() {
    assert_eq!(titles(&run("$..book[2]", &store())), vec!["Moby Dick"]);
}

#[test]
fn test_last_book_by_slice() {
    assert_eq!(titles(&run("$..book[-1:]", &store())), vec!["The Lord of the Rings"]);
}

#[test]
fn test_last_book_by_script() {
    assert_eq!(
        titles(&run("$..book[(@.length-1)]", &store())),
        vec!["The Lord of the Rings"]
    );
}

#[test]
fn test_books_with_isbn() {
    assert_eq!(
        titles(&run("$..book[?(@.isbn)]", &store())),
        vec!["Moby Dick", "The Lord of the Rings"]
    );
}

#[test]
fn test_cheap_books() {
    assert_eq!(
        titles(&run("$..book[?(@.price<10)]", &store())),
        vec!["Sayings of the Century", "Moby Dick"]
    );
}

#[test]
fn test_books_cheaper_than_expensive_marker() {
    assert_eq!(
        titles(&run("$.store.book[?(@.price < $.expensive)]", &store())),
        vec!["Sayings of the Century", "Moby Dick"]
    );
}

#[test]
fn test_first_two_books() {
    assert_eq!(
        titles(&run("$..book[0,1]", &store())),
        vec!["Sayings of the Century", "Sword of Honour"]
    );
    assert_eq!(
        titles(&run("$..book[:2]", &store())),
        vec!["Sayings of the Century", "Sword of Honour"]
    );
}

#[test]
fn test_all_prices_in_store() {
    let Value::Array(prices) = run("$.store..price", &store()) else {
        panic!("expected an array of prices");
    };
    assert_eq!(prices.len(), 5);
    assert!(prices.contains(&Value::Float(19.95)));
}

#[test]
fn test_regex_filter() {
    assert_eq!(
        run("$.store.book[?(@.author =~ /Tolkien$/)].title", &store()),
        Value::from(json!(["The Lord of the Rings"]))
    );
}

#[test]
fn test_compound_filter() {
    assert_eq!(
        run("$.store.book[?(@.category == 'fiction' && @.price < 20)].title", &store()),
        Value::from(json!(["Sword of Honour", "Moby Dick"]))
    );
}

#[test]
fn test_filter_truthiness() {
    let doc = Value::from(json!([
        {"key": true},
        {"key": false},
        {"key": 1},
        {"key": ""},
        {"key": null},
        {"some": "x"}
    ]));
    assert_eq!(run("$[?(@.key)]", &doc), Value::from(json!([{"key": true}, {"key": 1}])));
}

#[test]
fn test_numeric_normalisation() {
    let doc = Value::from(json!([{"key": 42}, {"key": 42.0}, {"key": "42"}]));
    assert_eq!(
        run("$[?(@.key==42)]", &doc),
        Value::from(json!([{"key": 42}, {"key": 42.0}]))
    );
}

#[test]
fn test_bare_current_equality_matches_nothing() {
    let doc = Value::from(json!([42, 42.0, "42", 7]));
    assert_eq!(run("$[?(@==42)]", &doc), Value::from(json!([])));
}

#[test]
fn test_decode_bytes() {
    let doc = decode(br#"{"a": [1, 2.5, "x"]}"#).unwrap();
    assert_eq!(run("$.a[1]", &doc), Value::Float(2.5));
    assert!(decode(b"{not json").is_err());
}

#[test]
fn test_round_trip_evaluates_identically() {
    let doc = store();
    for path in [
        "$.store.book[*].author",
        "$..author",
        "$..book[2]",
        "$..book[-1:]",
        "$..book[?(@.isbn)]",
        "$..book[?(@.price<10)]",
        "$..book[(@.length-1)]",
        "$.store['book','bicycle']",
        "$.store.*",
    ] {
        let query = compile(path).unwrap();
        let rendered: Query = compile(&query.to_string()).unwrap();
        assert_eq!(
            evaluate(&query, &doc).unwrap(),
            evaluate(&rendered, &doc).unwrap(),
            "{} and {} disagree",
            path,
            query
        );
    }
}

#[test]
fn test_evaluation_is_idempotent() {
    let doc = store();
    let query = compile("$..book[?(@.price > 10)].title").unwrap();
    assert_eq!(evaluate(&query, &doc).unwrap(), evaluate(&query, &doc).unwrap());
}

#[test]
fn test_query_shared_across_threads() {
    let doc = store();
    let query = compile("$..book[?(@.isbn)].title").unwrap();
    let expected = evaluate(&query, &doc).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| evaluate(&query, &doc).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_evaluation_logs_with_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();

    // dropped elements are traced, not reported
    assert_eq!(
        run("$.store.book[*].isbn", &store()),
        Value::from(json!(["0-553-21311-3", "0-395-19395-8"]))
    );
}
