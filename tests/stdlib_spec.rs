//! Spec tests for the standard library: string helpers, map lookup,
//! base64, and the timestamp/duration kinds with their operator
//! extensions, all exercised end-to-end through the standard
//! environment.
use sable::ast::{Node, Value, ValueType};
use sable::env::Env;
use sable::program::{Program, Variables, VariablesType};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn int(i: i64) -> Node {
    Node::literal(Value::Int(i))
}

fn string(s: &str) -> Node {
    Node::literal(Value::String(s.to_string()))
}

fn binop(op: &str, lhs: Node, rhs: Node) -> Node {
    Node::call(op, vec![lhs, rhs])
}

fn run(node: Node) -> Result<Value, String> {
    let env = Env::standard();
    let program = Program::new(node, VariablesType::new());
    env.run(&program, &Variables::new())
        .map_err(|err| err.to_string())
}

fn check(node: Node) -> Result<ValueType, String> {
    let env = Env::standard();
    let program = Program::new(node, VariablesType::new());
    env.check(&program).map_err(|err| err.to_string())
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

#[test]
fn contains_receiver_style() {
    let node = Node::method_call(string("hello"), "contains", vec![string("ell")]);
    assert_eq!(run(node).unwrap(), Value::Bool(true));
}

#[test]
fn starts_and_ends_with() {
    assert_eq!(
        run(Node::call("startsWith", vec![string("hello"), string("he")])).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        run(Node::call("endsWith", vec![string("hello"), string("lo")])).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn index_of_uses_default_offset() {
    assert_eq!(
        run(Node::call("indexOf", vec![string("hello"), string("l")])).unwrap(),
        Value::Int(2)
    );
    assert_eq!(
        run(Node::call(
            "indexOf",
            vec![string("hello"), string("l"), int(3)]
        ))
        .unwrap(),
        Value::Int(3)
    );
}

#[test]
fn substring_and_reverse() {
    assert_eq!(
        run(Node::call("substring", vec![string("tacocat"), int(4)])).unwrap(),
        Value::String("cat".to_string())
    );
    assert_eq!(
        run(Node::call("reverse", vec![string("abc")])).unwrap(),
        Value::String("cba".to_string())
    );
}

#[test]
fn split_then_join_round_trips() {
    let split = Node::call("split", vec![string("a,b,c"), string(",")]);
    let node = Node::call("join", vec![split, string("-")]);
    assert_eq!(run(node).unwrap(), Value::String("a-b-c".to_string()));
}

#[test]
fn matches_regex() {
    assert_eq!(
        run(Node::call(
            "matches",
            vec![string("cel-like"), string("^[a-z-]+$")]
        ))
        .unwrap(),
        Value::Bool(true)
    );
    assert!(run(Node::call("matches", vec![string("x"), string("(")])).is_err());
}

#[test]
fn string_helper_types_check() {
    assert_eq!(
        check(Node::call("upperAscii", vec![string("x")])).unwrap().kind(),
        "string"
    );
    assert_eq!(
        check(Node::call("split", vec![string("a,b"), string(",")]))
            .unwrap()
            .to_string(),
        "list<string>"
    );
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

#[test]
fn has_and_get() {
    let map = Node::map(vec![(string("k"), int(1)), (string("j"), int(2))]);
    assert_eq!(
        run(Node::call("has", vec![map.clone(), string("k")])).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        run(Node::call("get", vec![map.clone(), string("j")])).unwrap(),
        Value::Int(2)
    );
    assert!(run(Node::call("get", vec![map, string("z")])).is_err());
}

#[test]
fn get_with_default_returns_stored_value() {
    let map = Node::map(vec![(string("k"), int(1))]);
    assert_eq!(
        run(Node::call(
            "get",
            vec![map.clone(), string("k"), int(99)]
        ))
        .unwrap(),
        Value::Int(1)
    );
    assert_eq!(
        run(Node::call("get", vec![map, string("z"), int(99)])).unwrap(),
        Value::Int(99)
    );
}

#[test]
fn get_resolves_value_type() {
    let map = Node::map(vec![(string("k"), int(1))]);
    assert_eq!(
        check(Node::call("get", vec![map, string("k")])).unwrap().kind(),
        "int"
    );
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

#[test]
fn base64_round_trip() {
    let encoded = Node::call("base64Encode", vec![string("hello")]);
    let decoded = Node::call("base64Decode", vec![encoded]);
    let node = Node::call("string", vec![decoded]);
    assert_eq!(run(node).unwrap(), Value::String("hello".to_string()));
}

#[test]
fn base64_encode_value() {
    assert_eq!(
        run(Node::call("base64Encode", vec![string("hello")])).unwrap(),
        Value::String("aGVsbG8=".to_string())
    );
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

fn duration_lit(s: &str) -> Node {
    Node::call("duration", vec![string(s)])
}

fn timestamp_lit(s: &str) -> Node {
    Node::call("timestamp", vec![string(s)])
}

#[test]
fn duration_addition_combines_units() {
    let node = binop(
        "_==_",
        binop("_+_", duration_lit("1h"), duration_lit("30m")),
        duration_lit("90m"),
    );
    assert_eq!(run(node).unwrap(), Value::Bool(true));
}

#[test]
fn duration_to_int_is_nanoseconds() {
    assert_eq!(
        run(Node::call("int", vec![duration_lit("1s")])).unwrap(),
        Value::Int(1_000_000_000)
    );
}

#[test]
fn duration_to_string_is_seconds_form() {
    assert_eq!(
        run(Node::call("string", vec![duration_lit("90s")])).unwrap(),
        Value::String("90s".to_string())
    );
}

#[test]
fn duration_accessors_truncate() {
    assert_eq!(
        run(Node::method_call(duration_lit("1h30m"), "getHours", vec![])).unwrap(),
        Value::Int(1)
    );
    assert_eq!(
        run(Node::method_call(duration_lit("1h30m"), "getMinutes", vec![])).unwrap(),
        Value::Int(90)
    );
}

#[test]
fn timestamp_calendar_accessors() {
    let ts = timestamp_lit("2023-01-02T03:04:05Z");
    assert_eq!(
        run(Node::method_call(ts.clone(), "getFullYear", vec![])).unwrap(),
        Value::Int(2023)
    );
    // Months are 0-based, day-of-week counts from Sunday.
    assert_eq!(
        run(Node::method_call(ts.clone(), "getMonth", vec![])).unwrap(),
        Value::Int(0)
    );
    assert_eq!(
        run(Node::method_call(ts.clone(), "getDate", vec![])).unwrap(),
        Value::Int(2)
    );
    assert_eq!(
        run(Node::method_call(ts.clone(), "getDayOfWeek", vec![])).unwrap(),
        Value::Int(1)
    );
    assert_eq!(
        run(Node::method_call(ts, "getHours", vec![])).unwrap(),
        Value::Int(3)
    );
}

#[test]
fn timestamp_accessor_honors_zone_argument() {
    let ts = timestamp_lit("2023-01-02T03:04:05Z");
    assert_eq!(
        run(Node::method_call(ts, "getHours", vec![string("+08:00")])).unwrap(),
        Value::Int(11)
    );
}

#[test]
fn timestamp_accessor_resolves_named_zone() {
    // 03:04 UTC on January 2nd is 22:04 the previous day in EST.
    let ts = timestamp_lit("2023-01-02T03:04:05Z");
    assert_eq!(
        run(Node::method_call(
            ts.clone(),
            "getHours",
            vec![string("America/New_York")]
        ))
        .unwrap(),
        Value::Int(22)
    );
    let err = run(Node::method_call(ts, "getHours", vec![string("Nowhere/Else")])).unwrap_err();
    assert!(err.contains("unknown time zone"));
}

#[test]
fn timestamp_plus_duration_shifts() {
    let shifted = binop(
        "_+_",
        timestamp_lit("2023-01-02T03:04:05Z"),
        duration_lit("1h"),
    );
    assert_eq!(
        run(Node::method_call(shifted, "getHours", vec![])).unwrap(),
        Value::Int(4)
    );
}

#[test]
fn timestamp_difference_is_a_duration() {
    let node = binop(
        "_==_",
        binop(
            "_-_",
            timestamp_lit("2023-01-02T04:04:05Z"),
            timestamp_lit("2023-01-02T03:04:05Z"),
        ),
        duration_lit("1h"),
    );
    assert_eq!(run(node).unwrap(), Value::Bool(true));
}

#[test]
fn timestamp_ordering() {
    let node = binop(
        "_<_",
        timestamp_lit("2023-01-02T03:04:05Z"),
        timestamp_lit("2024-01-02T03:04:05Z"),
    );
    assert_eq!(run(node).unwrap(), Value::Bool(true));
}

#[test]
fn timestamp_int_conversion_is_unix_seconds() {
    assert_eq!(
        run(Node::call("int", vec![timestamp_lit("1970-01-01T00:01:00Z")])).unwrap(),
        Value::Int(60)
    );
}

#[test]
fn timestamp_from_int_range_checked() {
    assert!(run(Node::call("timestamp", vec![int(253402300800)])).is_err());
    assert_eq!(
        check(Node::call("timestamp", vec![int(0)])).unwrap().kind(),
        "timestamp"
    );
}

#[test]
fn now_checks_as_timestamp() {
    assert_eq!(check(Node::call("now", vec![])).unwrap().kind(), "timestamp");
}

#[test]
fn duration_checks_as_duration() {
    assert_eq!(
        check(binop("_+_", duration_lit("1h"), duration_lit("1m")))
            .unwrap()
            .kind(),
        "duration"
    );
}
