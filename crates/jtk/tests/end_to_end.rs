//! End-to-end scenarios spanning lex → parse → validate → serialize →
//! partition → parallelize, exercised through the facade crate's public
//! surface rather than any single component in isolation.

use jtk::{
    parallel_parse, parallel_validate, parse, serialize, validate_recovery, validate_strict,
    write_file, ParallelOptions, SerializeOptions, Value,
};

fn obj(pairs: &[(&str, Value)]) -> Value {
    Value::Object(pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect())
}

#[test]
fn object_with_four_entries_round_trips() {
    let input = r#"{"n":42,"s":"hi","b":true,"z":null}"#;
    let value = parse(input).expect("well-formed object parses");

    let expected = obj(&[
        ("n", Value::Number(42.0)),
        ("s", Value::String("hi".to_string())),
        ("b", Value::Bool(true)),
        ("z", Value::Null),
    ]);
    assert_eq!(value, expected);
    assert_eq!(value.size().unwrap(), 4);

    let compact = serialize(&value, &SerializeOptions::compact());
    let reparsed = parse(&compact).expect("serialized form reparses");
    assert_eq!(reparsed, value);
}

#[test]
fn small_array_partitions_and_parallel_parses_in_order() {
    let input = b"[1, 2, 3, 4, 5]";
    let ranges = jtk::partition(input, 2);
    assert_eq!(ranges.len(), 2);

    let merged = parallel_parse(input, &ParallelOptions { workers: 2, ..ParallelOptions::default() }, None)
        .expect("parallel parse of a simple numeric array succeeds");
    let expected = Value::Array(vec![
        Value::Number(1.0),
        Value::Number(2.0),
        Value::Number(3.0),
        Value::Number(4.0),
        Value::Number(5.0),
    ]);
    assert_eq!(merged, expected);
}

#[test]
fn trailing_comma_is_a_single_diagnostic_in_both_parse_and_validate() {
    let input = r#"{"a": 1,}"#;

    let parse_err = parse(input).expect_err("trailing comma before '}' is rejected");
    assert!(parse_err.message.contains("trailing comma"));

    let result = validate_strict(input);
    assert!(!result.valid);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].line, parse_err.line);
    assert_eq!(result.diagnostics[0].column, parse_err.column);
}

#[test]
fn duplicate_keys_keep_the_last_assignment() {
    let value = parse(r#"{"a":1, "a":2}"#).unwrap();
    let map = value.as_object().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["a"], Value::Number(2.0));
}

#[test]
fn cyrillic_string_decodes_to_the_expected_scalar_values() {
    let value = parse("\"Привет\"").unwrap();
    let s = value.as_str().unwrap();
    assert_eq!(s, "Привет");
    assert_eq!(s.as_bytes().len(), 12);
}

#[test]
fn one_megabyte_array_with_one_malformed_element_is_caught_under_recovery_and_parallel_validate() {
    let mut input = String::from("[\n");
    let mut expected_line = 0usize;
    let target_index = 500;
    let mut index = 0;
    while input.len() < 1_000_000 {
        if index > 0 {
            input.push_str(",\n");
        }
        if index == target_index {
            input.push_str("truu");
            expected_line = input.lines().count();
        } else {
            input.push_str("0");
        }
        index += 1;
    }
    input.push_str("\n]");

    let sequential = validate_recovery(&input);
    assert!(!sequential.valid);
    assert!(!sequential.diagnostics.is_empty());
    assert!(sequential.diagnostics.iter().any(|d| d.line == expected_line));

    let parallel = parallel_validate(input.as_bytes(), &ParallelOptions { workers: 4, ..ParallelOptions::default() }, None);
    assert!(!parallel.valid);
    assert!(parallel.diagnostics.iter().any(|d| d.line == expected_line));
}

#[test]
fn file_convenience_round_trips_through_disk() {
    let value = obj(&[("answer", Value::Number(42.0))]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");

    write_file(&value, &SerializeOptions::pretty(), &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.ends_with('\n'));
    let reparsed = parse(contents.trim_end()).unwrap();
    assert_eq!(reparsed, value);
}

#[test]
fn path_resolver_navigates_a_parsed_tree() {
    let value = parse(r#"{"a": {"b": [10, 20, {"c": 30}]}}"#).unwrap();
    let found = jtk::resolve(&value, "a.b[2].c").unwrap();
    assert_eq!(*found, Value::Number(30.0));
}
