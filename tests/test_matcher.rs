use json_filter::{EvalError, Filter, OperandKind, Operator, OperatorRegistry};
use proptest::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;

fn filter(raw: Value) -> Filter {
    Filter::from_value(&raw).expect("filter should compile")
}

fn matches(filter: &Filter, doc: Value) -> bool {
    filter.matches(&doc).expect("match should not fail")
}

#[test]
fn test_range_on_nested_field() {
    let f = filter(json!({"user.level": {"$gt": 10, "$lt": 20}}));

    assert!(!matches(&f, json!({"user": {"aaaa": 11}})));
    assert!(matches(&f, json!({"user": {"level": 11}})));
    assert!(!matches(&f, json!({"user": {"level": 7}})));
    assert!(matches(&f, json!({"user": {"level": 19}})));
    assert!(!matches(&f, json!({"user": {"level": 40}})));
}

#[test]
fn test_explicit_and_implicit_in() {
    for f in [
        filter(json!({"user.race": {"$in": ["elf", "ork"]}})),
        filter(json!({"user.race": ["elf", "ork"]})),
    ] {
        assert!(matches(&f, json!({"user": {"race": "ork"}})));
        assert!(!matches(&f, json!({"user": {"race": "human"}})));
    }
}

#[test]
fn test_nested_and_inside_or() {
    let f = filter(json!({
        "$or": [
            {"$and": [{"user.sex": "male"}, {"user.class": "warrior"}, {"user.age": {"$gte": 18}}]},
            {"user.level": {"$gte": 40}}
        ]
    }));

    assert!(matches(&f, json!({"user": {"level": 40, "class": "mage"}})));
    assert!(matches(
        &f,
        json!({"user": {"level": 39, "class": "warrior", "sex": "male", "age": 21}})
    ));
    assert!(!matches(
        &f,
        json!({"user": {"level": 39, "class": "warrior", "sex": "male", "age": 16}})
    ));
    assert!(!matches(&f, json!({"user": {"level": 39, "class": "mage", "sex": "male"}})));
}

#[test]
fn test_implicit_eq() {
    let f = filter(json!({"user.weapon": "axe"}));
    assert!(!matches(&f, json!({"user": {"weapon": "sword"}})));
    assert!(matches(&f, json!({"user": {"weapon": "axe"}})));
}

#[test]
fn test_explicit_and_keeps_its_own_selectors() {
    let f = filter(json!({
        "user.level": {
            "$gt": 20,
            "$and": [{"user.age": {"$gt": 14, "$lt": 20}}, {"user.sex": "male"}]
        }
    }));

    assert!(matches(&f, json!({"user": {"level": 22, "age": 18, "sex": "male"}})));
    assert!(!matches(&f, json!({"user": {"level": 22, "age": 28, "sex": "male"}})));
}

#[test]
fn test_val_compares_two_fields() {
    let f = filter(json!({"user.age": {"$gt": {"$val": "user.level"}}}));
    assert!(matches(&f, json!({"user": {"level": 23, "age": 33}})));
    assert!(!matches(&f, json!({"user": {"level": 23, "age": 13}})));

    let f = filter(json!({"user.age": {"$val": "user.level"}}));
    assert!(matches(&f, json!({"user": {"level": 23, "age": 23}})));
    assert!(!matches(&f, json!({"user": {"level": 23, "age": 13}})));
}

#[test]
fn test_empty() {
    let f = filter(json!({"xyz": {"$empty": true}}));

    for doc in [
        json!({}),
        json!({"xyz": null}),
        json!({"xyz": 0}),
        json!({"xyz": ""}),
        json!({"xyz": "0"}),
        json!({"xyz": false}),
        json!({"xyz": []}),
        json!({"xyz": {}}),
    ] {
        assert!(matches(&f, doc.clone()), "{doc} should be empty");
    }

    for doc in [
        json!({"xyz": 1}),
        json!({"xyz": "null"}),
        json!({"xyz": "undefined"}),
        json!({"xyz": "false"}),
        json!({"xyz": true}),
        json!({"xyz": [0]}),
        json!({"xyz": {"a": 1}}),
    ] {
        assert!(!matches(&f, doc.clone()), "{doc} should not be empty");
    }
}

#[test]
fn test_escaped_dots_in_field_names() {
    let f = Filter::create(r#"{"user.\\.add\\.com": "iddqd"}"#).unwrap();

    assert!(matches(&f, json!({"user": {".add.com": "iddqd"}})));
    assert!(!matches(&f, json!({"user": {".add.com": "iddqd1111"}})));
    assert!(!matches(&f, json!({"user": {"add": {"com": "iddqd"}}})));
    assert!(!matches(&f, json!({"user": {"\\": {"add\\": {"com": "iddqd"}}}})));
}

#[test]
fn test_bracket_selectors() {
    let f = filter(json!({"items[1].name": "b"}));
    assert!(matches(&f, json!({"items": [{"name": "a"}, {"name": "b"}]})));
    assert!(!matches(&f, json!({"items": [{"name": "b"}]})));
}

#[test]
fn test_failing_operator_reports_error() {
    let registry = OperatorRegistry::create_defaults().with(
        Operator::new("$throw", OperandKind::Value, |_, _, _, _| {
            Err(EvalError::custom("aaaa"))
        })
        .unwrap(),
    );
    let f = Filter::create_with(r#"{"user": {"$throw": "aaaa"}}"#, Arc::new(registry)).unwrap();

    let err = f.matches(&json!({"user": {"level": 11}})).unwrap_err();
    assert_eq!(err.operator, "$throw");
    assert_eq!(err.context, Some(json!({"level": 11})));
    assert!(err.to_string().contains("aaaa"));
}

#[test]
fn test_regex() {
    let f = filter(json!({"aaa": {"$regex": "baboon"}}));
    assert!(matches(&f, json!({"aaa": "baboon"})));
    assert!(matches(&f, json!({"aaa": "baboon has red ass"})));
    assert!(matches(&f, json!({"aaa": "i don't like baboons"})));
    assert!(matches(&f, json!({"aaa": "killdababoonsda"})));
    assert!(!matches(&f, json!({"aaa": "babo4on"})));
    assert!(!matches(&f, json!({"aaa": 12})));
}

#[test]
fn test_regex_with_flags() {
    let f = filter(json!({"aaa": {"$regex": "/baboon/i"}}));
    assert!(matches(&f, json!({"aaa": "baBoon has red ass"})));
    assert!(!matches(&f, json!({"aaa": "babo4on"})));
}

#[test]
fn test_regex_alternatives_share_context() {
    let f = filter(json!({"aaa": [{"$regex": "/baboon/i"}, {"$regex": "/monkey/i"}]}));

    assert!(matches(&f, json!({"aaa": "There are Baboons in Africa"})));
    assert!(matches(&f, json!({"aaa": "There is a lonely Monkey by the Limpopo river"})));
    assert!(matches(&f, json!({"aaa": "All baboons are monkeys"})));
    assert!(!matches(&f, json!({"aaa": "babo4on und makakas"})));
}

#[test]
fn test_regex_pattern_from_another_field() {
    let f = filter(json!({"name": {"$regex": {"$val": "pattern"}}}));
    assert!(matches(&f, json!({"name": "gorilla", "pattern": "^gor"})));
    assert!(!matches(&f, json!({"name": "gorilla", "pattern": "^ril"})));
}

#[test]
fn test_not() {
    let f = filter(json!({"aaa": {"$not": {"$lt": 5}}}));
    assert!(matches(&f, json!({"aaa": 10})));
    assert!(matches(&f, json!({"aaa": 5})));
    assert!(!matches(&f, json!({"aaa": 1})));

    let f = filter(json!({"aaa": {"$not": {"$not": {"$lt": 5}}}}));
    assert!(!matches(&f, json!({"aaa": 10})));
    assert!(!matches(&f, json!({"aaa": 5})));
    assert!(matches(&f, json!({"aaa": 1})));
}

#[test]
fn test_sub() {
    let f = filter(json!({"ts": {"$sub": {"user.lastLoginTime": {"$lt": 300}}}}));

    assert!(matches(&f, json!({"ts": 1461764062, "user": {"lastLoginTime": 1461763862}})));
    assert!(!matches(&f, json!({"ts": 1461764062, "user": {"lastLoginTime": 1461763362}})));
    assert!(!matches(&f, json!({"ts": 1461764062})));
    assert!(!matches(&f, json!({"user": {"lastLoginTime": 1461763362}})));
}

#[test]
fn test_left_handed_floor() {
    let f = filter(json!({"avg": {"$floor": {"$gt": 1}}}));
    assert!(matches(&f, json!({"avg": 2.89})));
    assert!(!matches(&f, json!({"avg": 1.89})));
    assert!(!matches(&f, json!({"avg": 0.89})));

    let f = filter(json!({"avg": {"$floor": 1}}));
    assert!(!matches(&f, json!({"avg": 2.89})));
    assert!(matches(&f, json!({"avg": 1.89})));
    assert!(!matches(&f, json!({"avg": 0.89})));
}

#[test]
fn test_right_handed_floor() {
    let f = filter(json!({"tm": {"$gt": {"$floorRH": "avg"}}}));
    assert!(!matches(&f, json!({"tm": 2, "avg": 2.89})));
    assert!(matches(&f, json!({"tm": 2, "avg": 1.89})));

    let f = filter(json!({"tm": {"$floorRH": "avg"}}));
    assert!(!matches(&f, json!({"tm": 1, "avg": 2.89})));
    assert!(matches(&f, json!({"tm": 1, "avg": 1.89})));
}

#[test]
fn test_right_handed_operand_on_missing_field() {
    let f = filter(json!({"a": {"$gt": {"$val": "missing"}}}));
    assert!(!matches(&f, json!({"a": 5})));
    assert!(!matches(&f, json!({"a": -5})));

    let f = filter(json!({"a": {"$lt": {"$floorRH": "missing"}}}));
    assert!(!matches(&f, json!({"a": -1})));

    let f = filter(json!({"a": {"$gte": {"$roundRH": "missing"}}}));
    assert!(!matches(&f, json!({"a": 0})));

    // a missing field equals another missing field or null, nothing else
    let f = filter(json!({"a": {"$val": "missing"}}));
    assert!(matches(&f, json!({})));
    assert!(matches(&f, json!({"a": null})));
    assert!(!matches(&f, json!({"a": 0})));

    let f = filter(json!({"a": {"$ne": {"$ceilRH": "missing"}}}));
    assert!(matches(&f, json!({"a": 0})));

    let f = filter(json!({"name": {"$regex": {"$val": "missing"}}}));
    assert!(matches(&f, json!({"name": "anything"})));
    assert!(!matches(&f, json!({"name": 1})));
}

#[test]
fn test_val_compares_structured_values() {
    let f = filter(json!({"a": {"$val": "b"}}));
    assert!(matches(&f, json!({"a": {"x": [1, 2]}, "b": {"x": [1, 2]}})));
    assert!(!matches(&f, json!({"a": {"x": [1, 2]}, "b": {"x": [1, 2], "y": 0}})));
    assert!(matches(&f, json!({"a": [1, "2"], "b": [1, 2]})));
    assert!(!matches(&f, json!({"a": [1, 2], "b": [2, 1]})));
    assert!(!matches(&f, json!({"a": "1,2", "b": [1, 2]})));
}

#[test]
fn test_round_and_ceil() {
    let f = filter(json!({"x": {"$round": 3}}));
    assert!(matches(&f, json!({"x": 2.5})));
    assert!(!matches(&f, json!({"x": 2.49})));

    let f = filter(json!({"x": {"$ceil": {"$gte": 3}}}));
    assert!(matches(&f, json!({"x": 2.01})));
    assert!(!matches(&f, json!({"x": 1.99})));
    assert!(!matches(&f, json!({})));
}

#[test]
fn test_exists() {
    let f = filter(json!({"a.b": {"$exists": true}}));
    assert!(matches(&f, json!({"a": {"b": null}})));
    assert!(!matches(&f, json!({"a": {}})));

    let f = filter(json!({"a.b": {"$exists": false}}));
    assert!(matches(&f, json!({"a": 1})));
}

#[test]
fn test_nin_and_all() {
    let f = filter(json!({"tags": {"$nin": ["x", "y"]}}));
    assert!(matches(&f, json!({"tags": ["a", "b"]})));
    assert!(!matches(&f, json!({"tags": ["a", "y"]})));

    let f = filter(json!({"tags": {"$all": ["a", "b"]}}));
    assert!(matches(&f, json!({"tags": ["a", "b", "a"]})));
    assert!(!matches(&f, json!({"tags": ["a", "c"]})));
}

#[test]
fn test_list_operators_on_missing_field() {
    let f = filter(json!({"tags": {"$in": ["a", "b"]}}));
    assert!(!matches(&f, json!({})));

    let f = filter(json!({"tags": {"$in": ["a", null]}}));
    assert!(matches(&f, json!({})));

    let f = filter(json!({"tags": {"$nin": ["a", "b"]}}));
    assert!(matches(&f, json!({})));

    let f = filter(json!({"tags": {"$all": ["a", "b"]}}));
    assert!(!matches(&f, json!({})));
}

#[test]
fn test_mod() {
    let f = filter(json!({"n": {"$mod": [4, 1]}}));
    assert!(matches(&f, json!({"n": 9})));
    assert!(matches(&f, json!({"n": "13"})));
    assert!(!matches(&f, json!({"n": 10})));
    assert!(!matches(&f, json!({})));

    assert!(Filter::from_value(&json!({"n": {"$mod": [4]}})).is_err());
    assert!(Filter::from_value(&json!({"n": {"$mod": [4, 1, 2]}})).is_err());
}

#[test]
fn test_nor() {
    let f = filter(json!({"$nor": [{"a": 1}, {"b": 2}]}));
    assert!(matches(&f, json!({"a": 2, "b": 1})));
    assert!(!matches(&f, json!({"a": 1, "b": 1})));
}

#[test]
fn test_overriding_eq_changes_dependent_operators() {
    let registry = OperatorRegistry::create_defaults().with(
        Operator::new("$eq", OperandKind::Value, |ctx, operand, _, _| {
            let lower = |v: &Value| v.as_str().map(str::to_lowercase);
            let same = match (ctx, operand.as_value()) {
                (Some(a), Some(b)) => lower(a).is_some() && lower(a) == lower(b),
                _ => false,
            };
            Ok(Some(Value::Bool(same)))
        })
        .unwrap(),
    );
    let registry = Arc::new(registry);

    let f = Filter::create_with(r#"{"race": ["ELF", "ork"]}"#, Arc::clone(&registry)).unwrap();
    assert!(f.matches(&json!({"race": "elf"})).unwrap());

    let f = Filter::create_with(r#"{"race": {"$ne": "Ork"}}"#, registry).unwrap();
    assert!(!f.matches(&json!({"race": "ORK"})).unwrap());
}

#[test]
fn test_field_conditions_against_other_fields() {
    let ts = 1461764062.118;
    let f = filter(json!({
        "user.registrationTime": {
            "$empty": false,
            "$ne": {"$floorRH": "ts"},
            "$eq": {"$val": "user.lastLoginTime"}
        }
    }));

    assert!(matches(
        &f,
        json!({"ts": ts, "user": {"registrationTime": 1461764000, "lastLoginTime": 1461764000}})
    ));
    assert!(!matches(&f, json!({"ts": ts, "user": {}})));
    assert!(!matches(
        &f,
        json!({"ts": ts, "user": {"registrationTime": 1461764000, "lastLoginTime": 1461764001}})
    ));
    assert!(!matches(
        &f,
        json!({"ts": ts, "user": {"registrationTime": 1461764062, "lastLoginTime": 1461764062}})
    ));
}

#[test]
fn test_query_1695() {
    let f = filter(json!({
        "info_type": {"$ne": "supersonic"},
        "$or": [
            {"type": {"$ne": ".user.freePayment"}},
            {"$not": {"info_type": {"$regex": "/tapjoy/i"}}}
        ]
    }));

    assert!(matches(&f, json!({"type": ".user.payment", "info_type": "aaaa"})));
    assert!(matches(&f, json!({"type": ".user.payment", "info_type": "tapjoy"})));
    assert!(matches(&f, json!({"type": ".user.payment", "info_type": "TaPjoY"})));
    assert!(!matches(&f, json!({"type": ".user.payment", "info_type": "supersonic"})));
    assert!(matches(&f, json!({"type": ".user.freePayment", "info_type": "aaaa"})));
    assert!(!matches(&f, json!({"type": ".user.freePayment", "info_type": "supersonic"})));
    assert!(!matches(&f, json!({"type": ".user.freePayment", "info_type": "tapjoy"})));
    assert!(!matches(&f, json!({"type": ".user.freePayment", "info_type": "  tApjoyUUUU"})));
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(|n| json!(n)),
        "[a-c]{0,2}".prop_map(Value::String),
    ]
}

proptest! {
    #[test]
    fn prop_matching_is_deterministic(value in scalar(), operand in scalar()) {
        let f = filter(json!({"x": {"$gt": operand}}));
        let doc = json!({"x": value});
        prop_assert_eq!(f.matches(&doc).unwrap(), f.matches(&doc).unwrap());
    }

    #[test]
    fn prop_ne_complements_eq(value in scalar(), operand in scalar()) {
        let eq = filter(json!({"x": {"$eq": operand.clone()}}));
        let ne = filter(json!({"x": {"$ne": operand}}));
        let doc = json!({"x": value});
        prop_assert_ne!(eq.matches(&doc).unwrap(), ne.matches(&doc).unwrap());
    }

    #[test]
    fn prop_double_negation(value in -50i64..50, bound in -50i64..50) {
        let plain = filter(json!({"x": {"$lt": bound}}));
        let doubled = filter(json!({"x": {"$not": {"$not": {"$lt": bound}}}}));
        let doc = json!({"x": value});
        prop_assert_eq!(plain.matches(&doc).unwrap(), doubled.matches(&doc).unwrap());
    }

    #[test]
    fn prop_implicit_forms_match_explicit(value in scalar(), a in scalar(), b in scalar()) {
        let doc = json!({"x": value});

        let implicit_eq = filter(json!({"x": a.clone()}));
        let explicit_eq = filter(json!({"x": {"$eq": a.clone()}}));
        prop_assert_eq!(implicit_eq.matches(&doc).unwrap(), explicit_eq.matches(&doc).unwrap());

        let implicit_in = filter(json!({"x": [a.clone(), b.clone()]}));
        let explicit_in = filter(json!({"x": {"$in": [a, b]}}));
        prop_assert_eq!(implicit_in.matches(&doc).unwrap(), explicit_in.matches(&doc).unwrap());
    }
}
