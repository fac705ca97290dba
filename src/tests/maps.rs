use std::collections::BTreeMap;

use crate::{Dump, Field, Map, Options, Ref, Value};

#[test]
fn maps() {
    let strings = Value::map(
        "string",
        "string",
        vec![
            (Value::str("hello"), Value::str("there")),
            (Value::str("something"), Value::str("something something")),
            (Value::str("another string"), Value::str("indeed")),
        ],
    );
    let ints = Value::map(
        "int",
        "string",
        vec![
            (Value::Int(3), Value::str("three")),
            (Value::Int(1), Value::str("one")),
            (Value::Int(2), Value::str("two")),
        ],
    );
    let pointers = Value::map(
        "int",
        "*app.BlankStruct",
        vec![(
            Value::Int(2),
            Value::reference("app.BlankStruct", Value::record("app.BlankStruct", vec![])),
        )],
    );

    let list = Value::list("interface {}", vec![strings, ints, pointers]);
    insta::assert_snapshot!(Options::bare().sdump(&[list]), @r###"
    []interface {}{
      map[string]string{
        "another string": "indeed",
        "hello": "there",
        "something": "something something",
      },
      map[int]string{
        1: "one",
        2: "two",
        3: "three",
      },
      map[int]*app.BlankStruct{
        2: &app.BlankStruct{},
      },
    }
    "###);
}

#[test]
fn keys_ordered_by_text_not_value() {
    let mut map = BTreeMap::new();
    map.insert(9i64, true);
    map.insert(10i64, false);

    assert_eq!(
        Options::default().with_compact(true).sdump(&[map.to_value()]),
        "map[int64]bool{10:false,9:true}"
    );
}

#[test]
fn nil_and_empty_maps_differ() {
    let values = vec![
        Value::Map(Map::nil("string", "int")),
        Value::map("string", "int", vec![]),
    ];
    assert_eq!(Options::default().sdump(&values), "map[string]int(nil) map[string]int{}");
}

#[test]
fn record_keys() {
    let key = |x: i64, y: i64| {
        Value::record(
            "app.Point",
            vec![
                Field::public("X", Value::Int(x)),
                Field::public("Y", Value::Int(y)),
            ],
        )
    };
    let map = Value::map(
        "app.Point",
        "string",
        vec![
            (key(2, 0), Value::str("b")),
            (key(1, 5), Value::str("a")),
        ],
    );

    insta::assert_snapshot!(Options::default().with_compact(true).sdump(&[map]), @r###"map[app.Point]string{app.Point{X:1,Y:5}:"a",app.Point{X:2,Y:0}:"b"}"###);
}

#[test]
fn equal_key_text_keeps_entry_order() {
    // Both keys are references to distinct cells holding the same value.
    let map = Value::map(
        "*int",
        "string",
        vec![
            (Value::reference("int", Value::Int(1)), Value::str("first")),
            (Value::reference("int", Value::Int(1)), Value::str("second")),
        ],
    );

    assert_eq!(
        Options::default().with_compact(true).sdump(&[map]),
        r#"map[*int]string{&1:"first",&1:"second"}"#
    );
}

#[test]
fn shared_map_values() {
    let shared = Value::map("string", "int", vec![(Value::str("n"), Value::Int(1))]);
    let outer = Value::map(
        "string",
        "map[string]int",
        vec![(Value::str("b"), shared.clone()), (Value::str("a"), shared)],
    );

    insta::assert_snapshot!(Options::default().sdump(&[outer]), @r###"
    map[string]map[string]int{
      "a": map[string]int{ // p0
        "n": 1,
      },
      "b": p0,
    }
    "###);
}

#[test]
fn cycle_through_key_terminates() {
    let key = Ref::new("app.Node", Value::nil());
    let map = Value::map("*app.Node", "int", vec![(Value::Ref(key.clone()), Value::Int(1))]);
    key.set(Value::record("app.Node", vec![Field::public("M", map.clone())]));

    insta::assert_snapshot!(Options::bare().sdump(&[map.clone()]), @r###"
    map[*app.Node]int{ // p0
      &app.Node{
        M: p0,
      }: 1,
    }
    "###);
    assert_eq!(
        Options::default().with_compact(true).sdump(&[map]),
        "map[*app.Node]int{/*p0*/&app.Node{M:p0}:1}"
    );
}

#[test]
fn reference_shared_by_key_and_value() {
    let shared = Value::reference(
        "app.T",
        Value::record("app.T", vec![Field::public("N", Value::Int(1))]),
    );
    let map = Value::map("*app.T", "*app.T", vec![(shared.clone(), shared)]);

    let out = Options::bare().sdump(&[map.clone()]);
    assert_eq!(out.matches("N: 1").count(), 1);
    insta::assert_snapshot!(out, @r###"
    map[*app.T]*app.T{
      &app.T{ // p0
        N: 1,
      }: p0,
    }
    "###);
    assert_eq!(
        Options::default().with_compact(true).sdump(&[map]),
        "map[*app.T]*app.T{&app.T{/*p0*/N:1}:p0}"
    );
}
