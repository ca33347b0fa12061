//! End-to-end tests for parsing and applying queries.

use iplens_query::{
    Condition, Dataset, ErrorKind, Operator, Predicate, QueryError, Record, SelectSpec,
    execute_query, filter, parse, project,
};
use rstest::{fixture, rstest};

// ============================================================================
// Test Fixtures
// ============================================================================

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// A small set of looked-up addresses with uneven field sets
#[fixture]
fn addresses() -> Dataset {
    Dataset::from([
        (
            "8.8.8.8".to_string(),
            record(&[
                ("country_code", "US"),
                ("region_code", "CA"),
                ("city", "Mountain View"),
                ("name", "GOGL"),
            ]),
        ),
        (
            "189.36.244.240".to_string(),
            record(&[
                ("country_code", "BR"),
                ("region_code", "SP"),
                ("city", "Sao Paulo"),
            ]),
        ),
        (
            "45.5.24.47".to_string(),
            record(&[("country_code", "US"), ("region_code", "TX")]),
        ),
        ("10.0.0.1".to_string(), record(&[])),
    ])
}

fn keys(dataset: &Dataset) -> Vec<&str> {
    dataset.keys().map(String::as_str).collect()
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_wildcard_with_single_condition() {
    let query = parse("GET * WHERE country = us").unwrap();
    assert_eq!(query.fields, SelectSpec::All);
    assert_eq!(
        query.conditions,
        vec![Condition::new(
            "country",
            Predicate::AnyOf(vec!["us".to_string()])
        )]
    );
}

#[test]
fn test_parse_fields_and_ordered_conditions() {
    let query = parse("GET a, b WHERE x > 5 AND y < 2").unwrap();
    assert_eq!(
        query.fields,
        SelectSpec::Fields(vec!["a".to_string(), "b".to_string()])
    );
    let ops: Vec<Operator> = query.conditions.iter().map(Condition::operator).collect();
    assert_eq!(ops, [Operator::Gt, Operator::Lt]);
    assert_eq!(query.conditions[0].field, "x");
    assert_eq!(query.conditions[1].field, "y");
}

#[test]
fn test_parse_eq_value_list() {
    let query = parse("GET * WHERE country_code = US , BR,MX").unwrap();
    assert_eq!(
        query.conditions[0].predicate,
        Predicate::AnyOf(vec!["US".to_string(), "BR".to_string(), "MX".to_string()])
    );
}

#[test]
fn test_parse_trims_surrounding_whitespace() {
    let query = parse("  GET city  ").unwrap();
    assert_eq!(query.fields, SelectSpec::Fields(vec!["city".to_string()]));
    assert!(query.conditions.is_empty());
}

#[test]
fn test_parse_blank_where_has_no_conditions() {
    let query = parse("GET city WHERE   ").unwrap();
    assert!(query.conditions.is_empty());
}

#[test]
fn test_parse_empty_field_list_is_preserved() {
    let query = parse("GET  WHERE a = 1").unwrap();
    assert_eq!(query.fields, SelectSpec::Fields(vec![String::new()]));
}

#[rstest]
#[case::lowercase("get * WHERE a = 1")]
#[case::no_space("GET*")]
#[case::bare("GET")]
#[case::empty("")]
#[case::select("SELECT *")]
fn test_parse_missing_prefix(#[case] input: &str) {
    let err = parse(input).unwrap_err();
    assert_eq!(err, QueryError::MissingGetPrefix);
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_parse_multiple_where() {
    let err = parse("GET a WHERE x = 1 WHERE y = 2").unwrap_err();
    assert_eq!(err, QueryError::MultipleWhere);
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_parse_condition_without_operator() {
    let err = parse("GET a WHERE nonsense").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.to_string().contains("nonsense"));
}

#[test]
fn test_parse_trailing_and_is_rejected() {
    let err = parse("GET a WHERE x = 1 AND").unwrap_err();
    assert_eq!(
        err,
        QueryError::MissingOperator {
            clause: String::new()
        }
    );
}

#[test]
fn test_parse_malformed_clause_reports_clause() {
    let err = parse("GET a WHERE x = 1 AND  < 5").unwrap_err();
    assert_eq!(
        err,
        QueryError::MalformedCondition {
            clause: "< 5".to_string()
        }
    );
    assert!(err.to_string().contains("< 5"));
}

#[rstest]
#[case::repeated_eq("GET a WHERE a = b = c", "a = b = c")]
#[case::repeated_gt("GET a WHERE x > 1 > 2", "x > 1 > 2")]
fn test_parse_repeated_operator_rejected(#[case] input: &str, #[case] clause: &str) {
    let err = parse(input).unwrap_err();
    assert_eq!(
        err,
        QueryError::MalformedCondition {
            clause: clause.to_string()
        }
    );
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[rstest]
#[case("GET *")]
#[case("GET city, asn")]
#[case("GET city WHERE country_code = US, BR AND region_code < CO")]
#[case("GET a, a, * WHERE x > 10")]
fn test_display_round_trip(#[case] input: &str) {
    let query = parse(input).unwrap();
    assert_eq!(parse(&query.to_string()).unwrap(), query);
}

#[test]
fn test_query_serializes_for_explain() {
    let query = parse("GET * WHERE country = us, mx AND rank > 5").unwrap();
    let json = serde_json::to_value(&query).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "fields": "*",
            "conditions": [
                {"field": "country", "predicate": {"op": "=", "operand": ["us", "mx"]}},
                {"field": "rank", "predicate": {"op": ">", "operand": "5"}}
            ]
        })
    );
}

// ============================================================================
// Filtering and Projection
// ============================================================================

#[test]
fn test_filter_eq() {
    let data = Dataset::from([
        ("k1".to_string(), record(&[("c", "us")])),
        ("k2".to_string(), record(&[("c", "mx")])),
    ]);
    let conditions = [Condition::new("c", Predicate::AnyOf(vec!["us".to_string()]))];
    assert_eq!(
        filter(&data, &conditions),
        Dataset::from([("k1".to_string(), record(&[("c", "us")]))])
    );
}

#[rstest]
#[case::eq(Predicate::AnyOf(vec!["US".to_string()]))]
#[case::gt(Predicate::GreaterThan(String::new()))]
#[case::lt(Predicate::LessThan("~".to_string()))]
fn test_filter_drops_missing_field_for_every_operator(
    addresses: Dataset,
    #[case] predicate: Predicate,
) {
    let result = filter(&addresses, &[Condition::new("country_code", predicate)]);
    assert!(!result.contains_key("10.0.0.1"));
}

#[rstest]
fn test_lexicographic_not_numeric() {
    let data = Dataset::from([("k".to_string(), record(&[("n", "9")]))]);
    assert!(execute_query(&data, "GET * WHERE n < 10").unwrap().is_empty());
    assert_eq!(execute_query(&data, "GET * WHERE n > 10").unwrap().len(), 1);
}

#[rstest]
fn test_project_wildcard_is_identity(addresses: Dataset) {
    assert_eq!(project(&addresses, &SelectSpec::All), addresses);
}

#[test]
fn test_project_single_field() {
    let data = Dataset::from([("k1".to_string(), record(&[("a", "1"), ("b", "2")]))]);
    assert_eq!(
        project(&data, &SelectSpec::Fields(vec!["a".to_string()])),
        Dataset::from([("k1".to_string(), record(&[("a", "1")]))])
    );
}

// ============================================================================
// Pipeline
// ============================================================================

#[rstest]
fn test_execute_query_filters_then_projects(addresses: Dataset) {
    let result = execute_query(
        &addresses,
        "GET city WHERE country_code = US AND region_code < CO",
    )
    .unwrap();
    assert_eq!(keys(&result), ["8.8.8.8"]);
    assert_eq!(result["8.8.8.8"], record(&[("city", "Mountain View")]));
}

#[rstest]
fn test_execute_query_condition_on_unselected_field(addresses: Dataset) {
    let result = execute_query(&addresses, "GET name WHERE country_code = US").unwrap();
    assert_eq!(keys(&result), ["45.5.24.47", "8.8.8.8"]);
    assert!(result["45.5.24.47"].is_empty());
}

#[rstest]
#[case("GET *")]
#[case("GET city")]
#[case("GET nothing_matches")]
fn test_execute_query_without_where_keeps_all_records(addresses: Dataset, #[case] query: &str) {
    let result = execute_query(&addresses, query).unwrap();
    assert_eq!(keys(&result), keys(&addresses));
}

#[rstest]
fn test_execute_query_error_leaves_dataset_untouched(addresses: Dataset) {
    let snapshot = addresses.clone();
    assert!(execute_query(&addresses, "GET * WHERE a = 1 WHERE b = 2").is_err());
    assert_eq!(addresses, snapshot);
}

#[rstest]
fn test_parsed_query_is_reusable(addresses: Dataset) {
    let query = parse("GET city WHERE country_code = BR").unwrap();
    let first = query.apply(&addresses);
    let second = query.apply(&first);
    assert_eq!(keys(&first), ["189.36.244.240"]);
    // The second pass has lost country_code through projection.
    assert!(second.is_empty());
}
