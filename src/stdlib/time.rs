//! Timestamps and durations as externally registered kinds, plus the
//! operator extensions that teach `_+_`, `_-_`, the orderings, and the
//! `int`/`string` conversions about them.
//!
//! A timestamp is seconds/nanos since the Unix epoch plus a zone
//! string (empty means UTC); a duration is a nanosecond count. Zone
//! strings are fixed numeric offsets such as `"+08:00"` or IANA names
//! such as `"America/New_York"`.
use std::any::Any;
use std::cmp::Ordering;
use std::sync::{Arc, LazyLock};

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Offset, SecondsFormat, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

use crate::ast::function::{
    Definition, FnError, Function, ADD, GREATER, GREATER_EQUALS, INT, LESS, LESS_EQUALS, STRING,
    SUBTRACT,
};
use crate::ast::types::{ExternalType, FunctionType, ValueType};
use crate::ast::value::{ExternalValue, Value};
use crate::native::{FromValue, IntoValue, NativeFunction};

pub const KIND_TIMESTAMP: &str = "timestamp";
pub const KIND_DURATION: &str = "duration";

/// Seconds between `0001-01-01T00:00:00Z` and the Unix epoch.
pub const MIN_UNIX_TIME: i64 = -62135596800;
/// Seconds between `9999-12-31T23:59:59Z` and the Unix epoch.
pub const MAX_UNIX_TIME: i64 = 253402300799;

const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;

static TIMESTAMP_TYPE: LazyLock<Arc<ExternalType>> =
    LazyLock::new(|| Arc::new(ExternalType::new(KIND_TIMESTAMP, 0)));
static DURATION_TYPE: LazyLock<Arc<ExternalType>> =
    LazyLock::new(|| Arc::new(ExternalType::new(KIND_DURATION, 0)));

pub fn timestamp_type() -> ValueType {
    ValueType::External(TIMESTAMP_TYPE.clone())
}

pub fn duration_type() -> ValueType {
    ValueType::External(DURATION_TYPE.clone())
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TimestampValue {
    pub sec: i64,
    pub nsec: i64,
    pub tz: String,
}

impl TimestampValue {
    pub fn new(sec: i64, nsec: i64, tz: impl Into<String>) -> TimestampValue {
        TimestampValue {
            sec,
            nsec,
            tz: tz.into(),
        }
    }
}

impl ExternalValue for TimestampValue {
    fn value_type(&self) -> ValueType {
        timestamp_type()
    }

    fn equal(&self, other: &dyn ExternalValue) -> bool {
        other
            .as_any()
            .downcast_ref::<TimestampValue>()
            .is_some_and(|o| self == o)
    }

    fn display(&self) -> String {
        format!("sec: {}, nanoSec: {}, tz: {}", self.sec, self.nsec, self.tz)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DurationValue {
    pub nanos: i64,
}

impl DurationValue {
    pub fn new(nanos: i64) -> DurationValue {
        DurationValue { nanos }
    }
}

impl ExternalValue for DurationValue {
    fn value_type(&self) -> ValueType {
        duration_type()
    }

    fn equal(&self, other: &dyn ExternalValue) -> bool {
        other
            .as_any()
            .downcast_ref::<DurationValue>()
            .is_some_and(|o| self == o)
    }

    fn display(&self) -> String {
        self.nanos.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl FromValue for TimestampValue {
    fn value_type() -> ValueType {
        timestamp_type()
    }

    fn from_value(value: &Value) -> Result<TimestampValue, FnError> {
        if let Value::External(ext) = value {
            if let Some(ts) = ext.as_any().downcast_ref::<TimestampValue>() {
                return Ok(ts.clone());
            }
        }
        Err(FnError::new(format!(
            "expected timestamp argument, got {}",
            value.value_type()
        )))
    }
}

impl IntoValue for TimestampValue {
    fn value_type() -> ValueType {
        timestamp_type()
    }

    fn into_value(self) -> Value {
        Value::External(Arc::new(self))
    }
}

impl FromValue for DurationValue {
    fn value_type() -> ValueType {
        duration_type()
    }

    fn from_value(value: &Value) -> Result<DurationValue, FnError> {
        if let Value::External(ext) = value {
            if let Some(d) = ext.as_any().downcast_ref::<DurationValue>() {
                return Ok(d.clone());
            }
        }
        Err(FnError::new(format!(
            "expected duration argument, got {}",
            value.value_type()
        )))
    }
}

impl IntoValue for DurationValue {
    fn value_type() -> ValueType {
        duration_type()
    }

    fn into_value(self) -> Value {
        Value::External(Arc::new(self))
    }
}

// ---------------------------------------------------------------------------
// Calendar helpers
// ---------------------------------------------------------------------------

enum Zone {
    Fixed(FixedOffset),
    Named(Tz),
}

/// `""` means UTC; anything with a colon is a numeric offset
/// (`"+08:00"`); everything else resolves as an IANA zone name.
fn time_zone(tz: &str) -> Result<Zone, FnError> {
    match tz.find(':') {
        None => {
            if tz.is_empty() {
                let utc = FixedOffset::east_opt(0)
                    .ok_or_else(|| FnError::new("invalid time zone offset"))?;
                return Ok(Zone::Fixed(utc));
            }
            tz.parse::<Tz>()
                .map(Zone::Named)
                .map_err(|_| FnError::new(format!("unknown time zone {}", tz)))
        }
        Some(colon) => {
            let hours: i32 = tz[..colon]
                .parse()
                .map_err(|_| FnError::new(format!("invalid time zone offset {}", tz)))?;
            let minutes: i32 = tz[colon + 1..]
                .parse()
                .map_err(|_| FnError::new(format!("invalid time zone offset {}", tz)))?;
            let total_minutes = if tz.starts_with('-') {
                hours * 60 - minutes
            } else {
                hours * 60 + minutes
            };
            FixedOffset::east_opt(total_minutes * 60)
                .map(Zone::Fixed)
                .ok_or_else(|| FnError::new(format!("invalid time zone offset {}", tz)))
        }
    }
}

/// Materialize a timestamp in its own zone, or in `tz` when given.
/// Named zones pin the offset in effect at that instant.
fn load_timestamp(value: &TimestampValue, tz: &str) -> Result<DateTime<FixedOffset>, FnError> {
    let use_tz = if tz.is_empty() { value.tz.as_str() } else { tz };
    let instant = Utc
        .timestamp_opt(value.sec, value.nsec as u32)
        .single()
        .ok_or_else(|| FnError::new("invalid timestamp"))?;
    match time_zone(use_tz)? {
        Zone::Fixed(offset) => Ok(instant.with_timezone(&offset)),
        Zone::Named(zone) => {
            let local = instant.with_timezone(&zone);
            let offset = local.offset().fix();
            Ok(local.with_timezone(&offset))
        }
    }
}

fn export_timestamp(t: &DateTime<FixedOffset>) -> TimestampValue {
    TimestampValue::new(
        t.timestamp(),
        t.timestamp_subsec_nanos() as i64,
        t.offset().to_string(),
    )
}

fn now() -> TimestampValue {
    let t = Utc::now();
    TimestampValue::new(t.timestamp(), t.timestamp_subsec_nanos() as i64, "UTC")
}

fn shift_timestamp(value: &TimestampValue, nanos: i64) -> Result<TimestampValue, FnError> {
    let t = load_timestamp(value, "")?;
    let shifted = t
        .checked_add_signed(Duration::nanoseconds(nanos))
        .ok_or_else(|| FnError::new("timestamp overflow"))?;
    if shifted.timestamp() < MIN_UNIX_TIME || shifted.timestamp() > MAX_UNIX_TIME {
        return Err(FnError::new("timestamp overflow"));
    }
    Ok(export_timestamp(&shifted))
}

/// Parse a duration literal such as `"1h30m"`, `"-2.5s"`, `"300ms"`.
/// Units: `ns`, `us`, `ms`, `s`, `m`, `h`.
fn parse_duration(input: &str) -> Result<i64, FnError> {
    let invalid = || FnError::new(format!("invalid duration {:?}", input));

    let mut rest = input;
    let mut negative = false;
    if let Some(r) = rest.strip_prefix('-') {
        negative = true;
        rest = r;
    } else if let Some(r) = rest.strip_prefix('+') {
        rest = r;
    }
    if rest == "0" {
        return Ok(0);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: i64 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid());
        }
        let number: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale: f64 = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];

        total = total
            .checked_add((number * scale) as i64)
            .ok_or_else(|| FnError::new(format!("duration {:?} overflows", input)))?;
    }

    Ok(if negative { -total } else { total })
}

/// Render a duration the way conversions expect: seconds with an `s`
/// suffix (`"90s"`, `"1.5s"`).
fn format_duration(nanos: i64) -> String {
    format!("{}s", nanos as f64 / 1e9)
}

// ---------------------------------------------------------------------------
// Library functions
// ---------------------------------------------------------------------------

const FUNCTION_DURATION: &str = "duration";
const FUNCTION_TIMESTAMP: &str = "timestamp";
const FUNCTION_NOW: &str = "now";

fn timestamp_accessor(name: &'static str, field: fn(&DateTime<FixedOffset>) -> i64) -> Function {
    NativeFunction::binary(name, move |v: TimestampValue, tz: String| {
        let t = load_timestamp(&v, &tz)?;
        Ok(field(&t))
    })
    .with_default(Value::String(String::new()))
    .into_function()
}

/// Accessors shared by durations (total units) and timestamps (clock
/// fields, optionally in a given zone).
fn clock_accessor(
    name: &'static str,
    duration_field: fn(&DurationValue) -> i64,
    timestamp_field: fn(&DateTime<FixedOffset>) -> i64,
) -> Function {
    let mut function =
        NativeFunction::unary(name, move |d: DurationValue| Ok(duration_field(&d)))
            .into_function();
    function.combine(
        &NativeFunction::binary(name, move |v: TimestampValue, tz: String| {
            let t = load_timestamp(&v, &tz)?;
            Ok(timestamp_field(&t))
        })
        .with_default(Value::String(String::new()))
        .into_function(),
    );
    function
}

fn duration_function() -> Function {
    Function::new(
        FUNCTION_DURATION,
        vec![
            Definition::new(
                FunctionType::new(FUNCTION_DURATION, vec![duration_type()], duration_type()),
                |args| Ok(args[0].clone()),
            ),
            Definition::new(
                FunctionType::new(FUNCTION_DURATION, vec![ValueType::Int], duration_type()),
                |args| {
                    let nanos = i64::from_value(&args[0])?;
                    Ok(DurationValue::new(nanos).into_value())
                },
            ),
            Definition::new(
                FunctionType::new(FUNCTION_DURATION, vec![ValueType::String], duration_type()),
                |args| {
                    let s = String::from_value(&args[0])?;
                    Ok(DurationValue::new(parse_duration(&s)?).into_value())
                },
            ),
        ],
    )
}

fn timestamp_function() -> Function {
    Function::new(
        FUNCTION_TIMESTAMP,
        vec![
            Definition::new(
                FunctionType::new(FUNCTION_TIMESTAMP, vec![timestamp_type()], timestamp_type()),
                |args| Ok(args[0].clone()),
            ),
            Definition::new(
                FunctionType::new(FUNCTION_TIMESTAMP, vec![ValueType::Int], timestamp_type()),
                |args| {
                    let sec = i64::from_value(&args[0])?;
                    if !(MIN_UNIX_TIME..=MAX_UNIX_TIME).contains(&sec) {
                        return Err(FnError::new("timestamp overflow"));
                    }
                    Ok(TimestampValue::new(sec, 0, "UTC").into_value())
                },
            ),
            Definition::new(
                FunctionType::new(FUNCTION_TIMESTAMP, vec![ValueType::String], timestamp_type()),
                |args| {
                    let s = String::from_value(&args[0])?;
                    let t = DateTime::parse_from_rfc3339(&s)
                        .map_err(|err| FnError::new(format!("invalid timestamp {:?}: {}", s, err)))?;
                    if t.timestamp() < MIN_UNIX_TIME || t.timestamp() > MAX_UNIX_TIME {
                        return Err(FnError::new("timestamp overflow"));
                    }
                    Ok(export_timestamp(&t).into_value())
                },
            ),
        ],
    )
}

fn now_function() -> Function {
    Function::new(
        FUNCTION_NOW,
        vec![Definition::new(
            FunctionType::new(FUNCTION_NOW, vec![], timestamp_type()),
            |_args| Ok(now().into_value()),
        )],
    )
}

pub(crate) fn functions() -> Vec<Function> {
    vec![
        now_function(),
        timestamp_accessor("getFullYear", |t| t.year() as i64),
        timestamp_accessor("getMonth", |t| t.month0() as i64),
        timestamp_accessor("getDayOfYear", |t| t.ordinal0() as i64),
        timestamp_accessor("getDate", |t| t.day() as i64),
        timestamp_accessor("getDayOfMonth", |t| t.day0() as i64),
        timestamp_accessor("getDayOfWeek", |t| t.weekday().num_days_from_sunday() as i64),
        clock_accessor(
            "getHours",
            |d| d.nanos / NANOS_PER_HOUR,
            |t| t.hour() as i64,
        ),
        clock_accessor(
            "getMinutes",
            |d| d.nanos / NANOS_PER_MINUTE,
            |t| t.minute() as i64,
        ),
        clock_accessor(
            "getSeconds",
            |d| d.nanos / NANOS_PER_SECOND,
            |t| t.second() as i64,
        ),
        clock_accessor(
            "getMilliseconds",
            |d| d.nanos / NANOS_PER_MILLI,
            |t| (t.nanosecond() / 1_000_000) as i64,
        ),
        duration_function(),
        timestamp_function(),
    ]
}

// ---------------------------------------------------------------------------
// Operator extensions
// ---------------------------------------------------------------------------

fn add_extension() -> Function {
    Function::new(
        ADD,
        vec![
            Definition::new(
                FunctionType::new(ADD, vec![duration_type(), duration_type()], duration_type()),
                |args| {
                    let x = DurationValue::from_value(&args[0])?;
                    let y = DurationValue::from_value(&args[1])?;
                    x.nanos
                        .checked_add(y.nanos)
                        .map(|n| DurationValue::new(n).into_value())
                        .ok_or_else(|| FnError::new("int overflow"))
                },
            ),
            Definition::new(
                FunctionType::new(ADD, vec![duration_type(), timestamp_type()], timestamp_type()),
                |args| {
                    let d = DurationValue::from_value(&args[0])?;
                    let t = TimestampValue::from_value(&args[1])?;
                    Ok(shift_timestamp(&t, d.nanos)?.into_value())
                },
            ),
            Definition::new(
                FunctionType::new(ADD, vec![timestamp_type(), duration_type()], timestamp_type()),
                |args| {
                    let t = TimestampValue::from_value(&args[0])?;
                    let d = DurationValue::from_value(&args[1])?;
                    Ok(shift_timestamp(&t, d.nanos)?.into_value())
                },
            ),
        ],
    )
}

fn subtract_extension() -> Function {
    Function::new(
        SUBTRACT,
        vec![
            Definition::new(
                FunctionType::new(
                    SUBTRACT,
                    vec![duration_type(), duration_type()],
                    duration_type(),
                ),
                |args| {
                    let x = DurationValue::from_value(&args[0])?;
                    let y = DurationValue::from_value(&args[1])?;
                    x.nanos
                        .checked_sub(y.nanos)
                        .map(|n| DurationValue::new(n).into_value())
                        .ok_or_else(|| FnError::new("int overflow"))
                },
            ),
            Definition::new(
                FunctionType::new(
                    SUBTRACT,
                    vec![timestamp_type(), duration_type()],
                    timestamp_type(),
                ),
                |args| {
                    let t = TimestampValue::from_value(&args[0])?;
                    let d = DurationValue::from_value(&args[1])?;
                    let negated = d
                        .nanos
                        .checked_neg()
                        .ok_or_else(|| FnError::new("int overflow"))?;
                    Ok(shift_timestamp(&t, negated)?.into_value())
                },
            ),
            Definition::new(
                FunctionType::new(
                    SUBTRACT,
                    vec![timestamp_type(), timestamp_type()],
                    duration_type(),
                ),
                |args| {
                    let x = TimestampValue::from_value(&args[0])?;
                    let y = TimestampValue::from_value(&args[1])?;
                    let t1 = load_timestamp(&x, "")?;
                    let t2 = load_timestamp(&y, "")?;
                    t1.signed_duration_since(t2)
                        .num_nanoseconds()
                        .map(|n| DurationValue::new(n).into_value())
                        .ok_or_else(|| FnError::new("duration overflow"))
                },
            ),
        ],
    )
}

fn time_ordering(name: &'static str, accept: fn(Ordering) -> bool) -> Function {
    Function::new(
        name,
        vec![
            Definition::new(
                FunctionType::new(name, vec![duration_type(), duration_type()], ValueType::Bool),
                move |args| {
                    let x = DurationValue::from_value(&args[0])?;
                    let y = DurationValue::from_value(&args[1])?;
                    Ok(Value::Bool(accept(x.nanos.cmp(&y.nanos))))
                },
            ),
            Definition::new(
                FunctionType::new(
                    name,
                    vec![timestamp_type(), timestamp_type()],
                    ValueType::Bool,
                ),
                move |args| {
                    let x = TimestampValue::from_value(&args[0])?;
                    let y = TimestampValue::from_value(&args[1])?;
                    Ok(Value::Bool(accept((x.sec, x.nsec).cmp(&(y.sec, y.nsec)))))
                },
            ),
        ],
    )
}

fn int_extension() -> Function {
    Function::new(
        INT,
        vec![
            Definition::new(
                FunctionType::new(INT, vec![duration_type()], ValueType::Int),
                |args| Ok(Value::Int(DurationValue::from_value(&args[0])?.nanos)),
            ),
            Definition::new(
                FunctionType::new(INT, vec![timestamp_type()], ValueType::Int),
                |args| Ok(Value::Int(TimestampValue::from_value(&args[0])?.sec)),
            ),
        ],
    )
}

fn string_extension() -> Function {
    Function::new(
        STRING,
        vec![
            Definition::new(
                FunctionType::new(STRING, vec![duration_type()], ValueType::String),
                |args| {
                    let d = DurationValue::from_value(&args[0])?;
                    Ok(Value::String(format_duration(d.nanos)))
                },
            ),
            Definition::new(
                FunctionType::new(STRING, vec![timestamp_type()], ValueType::String),
                |args| {
                    let t = TimestampValue::from_value(&args[0])?;
                    let loaded = load_timestamp(&t, "")?;
                    Ok(Value::String(
                        loaded.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    ))
                },
            ),
        ],
    )
}

pub(crate) fn operator_extensions() -> Vec<Function> {
    vec![
        add_extension(),
        subtract_extension(),
        time_ordering(LESS, Ordering::is_lt),
        time_ordering(LESS_EQUALS, Ordering::is_le),
        time_ordering(GREATER, Ordering::is_gt),
        time_ordering(GREATER_EQUALS, Ordering::is_ge),
        int_extension(),
        string_extension(),
    ]
}
