//! Unit tests for `PropertyMap` and `PropertyValue`.

use edgeable::{GraphError, PropertyMap, PropertyValue};

#[test]
fn test_property_map_builder() {
    let props = PropertyMap::new()
        .with("city", "Lisbon")
        .with("population", 545_000)
        .with("capital", true)
        .with("elevation", 2.5);

    assert_eq!(props.get_string("city"), Some("Lisbon"));
    assert_eq!(props.get_int("population"), Some(545_000));
    assert_eq!(props.get_bool("capital"), Some(true));
    assert_eq!(props.get_float("elevation"), Some(2.5));
}

#[test]
fn test_property_map_wrong_type_yields_none() {
    let props = PropertyMap::new()
        .with("text", "value")
        .with("number", 123i64);

    assert_eq!(props.get_int("text"), None);
    assert_eq!(props.get_string("number"), None);
}

#[test]
fn test_property_map_lists() {
    let props = PropertyMap::new()
        .with("tags", vec!["coastal".to_string(), "hilly".to_string()])
        .with("zones", vec![1i64, 2, 3]);

    assert_eq!(props.get_string_list("tags").map(<[String]>::len), Some(2));
    assert_eq!(props.get_int_list("zones"), Some(&[1i64, 2, 3][..]));
}

#[test]
fn test_insert_returns_previous_value() {
    let mut props = PropertyMap::new();

    assert_eq!(props.insert("k", 1i64), None);
    assert_eq!(props.insert("k", 2i64), Some(PropertyValue::Int(1)));
    assert_eq!(props.remove("k"), Some(PropertyValue::Int(2)));
    assert!(props.is_empty());
}

#[test]
fn test_merge_overwrites_and_keeps_order() {
    let mut props = PropertyMap::new().with("a", 1i64).with("b", 2i64);
    props.merge(&PropertyMap::new().with("b", 20i64).with("c", 30i64));

    let keys: Vec<&String> = props.keys().collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(props.get_int("b"), Some(20));
}

#[test]
fn test_remove_preserves_order() {
    let mut props = PropertyMap::new()
        .with("a", 1i64)
        .with("b", 2i64)
        .with("c", 3i64);
    props.remove("a");

    let keys: Vec<&String> = props.keys().collect();
    assert_eq!(keys, vec!["b", "c"]);
}

#[test]
fn test_validate_rejects_empty_key() {
    let props = PropertyMap::new().with("", 1i64);
    assert!(matches!(
        props.validate(),
        Err(GraphError::InvalidArgument { .. })
    ));
    assert!(PropertyMap::new().with("ok", 1i64).validate().is_ok());
}

#[test]
fn test_numeric_view() {
    assert_eq!(PropertyValue::Int(2).as_f64(), Some(2.0));
    assert_eq!(PropertyValue::Float(0.5).as_f64(), Some(0.5));
    assert_eq!(PropertyValue::from("2").as_f64(), None);
    assert_eq!(PropertyValue::Null.as_f64(), None);
}

#[test]
fn test_property_map_json_shape() {
    let props = PropertyMap::new().with("name", "A").with("rank", 1i64);
    let json = serde_json::to_value(&props).unwrap();

    assert!(json.is_object());
    let back: PropertyMap = serde_json::from_value(json).unwrap();
    assert_eq!(back, props);
}

#[test]
fn test_collect_into_property_map() {
    let props: PropertyMap = vec![
        ("x".to_string(), PropertyValue::Int(1)),
        ("y".to_string(), PropertyValue::Bool(false)),
    ]
    .into_iter()
    .collect();

    assert_eq!(props.len(), 2);
    assert_eq!(props.get_bool("y"), Some(false));
}
