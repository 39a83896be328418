//! `System.String` members.
//!
//! Lengths and indices count Unicode scalar values.

use std::sync::Arc;

use sharpexpr_core::{
    ArrayValue, DataType, MemberEntry, MethodEntry, NativeFn, Param, PrimitiveKind,
    RegistrationError, RuntimeError, Value, arg, library, primitives, receiver,
};
use sharpexpr_registry::TypeRegistry;

fn string() -> DataType {
    DataType::string()
}

fn int() -> DataType {
    DataType::int32()
}

fn char_type() -> DataType {
    DataType::primitive(PrimitiveKind::Char)
}

fn params(names_and_types: &[(&str, DataType)]) -> Vec<Param> {
    names_and_types
        .iter()
        .map(|(name, ty)| Param::new(name, *ty))
        .collect()
}

fn out_of_range(name: &str) -> RuntimeError {
    RuntimeError::Format {
        message: format!("Specified argument was out of the range of valid values. (Parameter '{name}')"),
    }
}

/// Text of a value as concatenation sees it; `null` is empty.
fn text(value: &Value) -> String {
    value.to_string()
}

fn concat_all(values: &[Value]) -> Value {
    Value::from(values.iter().map(text).collect::<String>())
}

/// Flattens a trailing `params` array argument.
fn spread(args: &[Value]) -> Vec<Value> {
    match args {
        [Value::Array(array)] => array.items.to_vec(),
        other => other.to_vec(),
    }
}

fn ignore_case(comparison: &Value) -> bool {
    matches!(comparison, Value::Enum { bits, .. } if bits % 2 == 1)
}

fn char_count(s: &str) -> usize {
    s.chars().count()
}

fn substring(s: &str, start: i32, length: Option<i32>) -> Result<Value, RuntimeError> {
    let total = char_count(s) as i64;
    let start = i64::from(start);
    if start < 0 || start > total {
        return Err(out_of_range("startIndex"));
    }
    let length = match length {
        Some(len) if len < 0 || start + i64::from(len) > total => {
            return Err(out_of_range("length"));
        }
        Some(len) => i64::from(len),
        None => total - start,
    };
    Ok(Value::from(
        s.chars()
            .skip(start as usize)
            .take(length as usize)
            .collect::<String>(),
    ))
}

fn index_of(haystack: &str, needle: &str) -> i32 {
    match haystack.find(needle) {
        Some(byte) => haystack[..byte].chars().count() as i32,
        None => -1,
    }
}

/// Replaces `{0}`, `{1}`, ... with the matching argument; `{{`/`}}` escape.
pub fn format(template: &str, args: &[Value]) -> Result<String, RuntimeError> {
    let bad = || RuntimeError::Format {
        message: "Input string was not in a correct format.".to_string(),
    };
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_digit() => digits.push(d),
                        _ => return Err(bad()),
                    }
                }
                let index: usize = digits.parse().map_err(|_| bad())?;
                let value = args.get(index).ok_or_else(bad)?;
                out.push_str(&text(value));
            }
            '}' => return Err(bad()),
            other => out.push(other),
        }
    }
    Ok(out)
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let entry = registry.get_mut(primitives::STRING)?;

    entry.add_member(MemberEntry::constant("Empty", Value::from("")));
    entry.add_member(MemberEntry::property(
        "Length",
        int(),
        NativeFn::method0(|s: Arc<str>| char_count(&s) as i32),
    ));
    entry.add_member(MemberEntry::indexer(
        "Chars",
        params(&[("index", int())]),
        char_type(),
        NativeFn::new(|this, args| {
            let s: Arc<str> = receiver(this)?;
            let index: i32 = arg(args, 0)?;
            usize::try_from(index)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(Value::Char)
                .ok_or(RuntimeError::IndexOutOfRange)
        }),
    ));

    install_concat(entry);

    let object = DataType::object();
    let string_array = string().array_of();
    entry.add_method(MethodEntry::static_fn(
        "Format",
        vec![Param::new("format", string()), Param::variadic("args", object)],
        string(),
        NativeFn::new(|_, args| {
            let template: Arc<str> = arg(args, 0)?;
            let rest = spread(&args[1.min(args.len())..]);
            Ok(Value::from(format(&template, &rest)?))
        }),
    ));
    for element in [string(), object] {
        entry.add_method(MethodEntry::static_fn(
            "Join",
            vec![Param::new("separator", string()), Param::variadic("values", element)],
            string(),
            NativeFn::new(|_, args| {
                let separator: Option<Arc<str>> = arg(args, 0)?;
                let parts: Vec<String> = spread(&args[1.min(args.len())..]).iter().map(text).collect();
                Ok(Value::from(parts.join(separator.as_deref().unwrap_or(""))))
            }),
        ));
    }
    entry.add_method(MethodEntry::static_fn(
        "IsNullOrEmpty",
        params(&[("value", string())]),
        DataType::bool(),
        NativeFn::from_fn1(|s: Option<Arc<str>>| s.is_none_or(|s| s.is_empty())),
    ));
    entry.add_method(MethodEntry::static_fn(
        "IsNullOrWhiteSpace",
        params(&[("value", string())]),
        DataType::bool(),
        NativeFn::from_fn1(|s: Option<Arc<str>>| s.is_none_or(|s| s.trim().is_empty())),
    ));
    entry.add_method(MethodEntry::static_fn(
        "Compare",
        params(&[("strA", string()), ("strB", string())]),
        int(),
        NativeFn::from_fn2(|a: Option<Arc<str>>, b: Option<Arc<str>>| a.cmp(&b) as i32),
    ));
    entry.add_method(MethodEntry::static_fn(
        "Equals",
        params(&[("a", string()), ("b", string())]),
        DataType::bool(),
        NativeFn::from_fn2(|a: Option<Arc<str>>, b: Option<Arc<str>>| a == b),
    ));

    let comparison = DataType::simple(library::STRING_COMPARISON);
    entry.add_method(MethodEntry::instance(
        "Equals",
        params(&[("value", string())]),
        DataType::bool(),
        NativeFn::method1(|s: Arc<str>, other: Option<Arc<str>>| other.is_some_and(|o| o == s)),
    ));
    entry.add_method(MethodEntry::instance(
        "Equals",
        params(&[("value", string()), ("comparisonType", comparison)]),
        DataType::bool(),
        NativeFn::new(|this, args| {
            let s: Arc<str> = receiver(this)?;
            let other: Option<Arc<str>> = arg(args, 0)?;
            let comparison: Value = arg(args, 1)?;
            Ok(Value::Bool(other.is_some_and(|o| {
                if ignore_case(&comparison) {
                    sharpexpr_core::eq_ignore_case(&s, &o)
                } else {
                    s == o
                }
            })))
        }),
    ));

    install_instance_methods(entry, string_array);
    Ok(())
}

fn install_concat(entry: &mut sharpexpr_core::TypeEntry) {
    let object = DataType::object();
    let concat = || NativeFn::new(|_, args| Ok(concat_all(&spread(args))));
    for arity in 2..=4 {
        let list: Vec<Param> = (0..arity)
            .map(|i| Param::new(&format!("str{i}"), string()))
            .collect();
        entry.add_method(MethodEntry::static_fn("Concat", list, string(), concat()));
    }
    entry.add_method(MethodEntry::static_fn(
        "Concat",
        vec![Param::variadic("values", string())],
        string(),
        concat(),
    ));
    for arity in 1..=3 {
        let list: Vec<Param> = (0..arity)
            .map(|i| Param::new(&format!("arg{i}"), object))
            .collect();
        entry.add_method(MethodEntry::static_fn("Concat", list, string(), concat()));
    }
    entry.add_method(MethodEntry::static_fn(
        "Concat",
        vec![Param::variadic("args", object)],
        string(),
        concat(),
    ));
}

fn install_instance_methods(entry: &mut sharpexpr_core::TypeEntry, string_array: DataType) {
    let nullary: [(&str, fn(&str) -> String); 5] = [
        ("ToUpper", str::to_uppercase),
        ("ToLower", str::to_lowercase),
        ("Trim", |s| s.trim().to_string()),
        ("TrimStart", |s| s.trim_start().to_string()),
        ("TrimEnd", |s| s.trim_end().to_string()),
    ];
    for (name, f) in nullary {
        entry.add_method(MethodEntry::instance(
            name,
            vec![],
            string(),
            NativeFn::method0(move |s: Arc<str>| f(&s)),
        ));
    }

    let predicates: [(&str, fn(&str, &str) -> bool); 3] = [
        ("Contains", |s, v| s.contains(v)),
        ("StartsWith", |s, v| s.starts_with(v)),
        ("EndsWith", |s, v| s.ends_with(v)),
    ];
    for (name, f) in predicates {
        entry.add_method(MethodEntry::instance(
            name,
            params(&[("value", string())]),
            DataType::bool(),
            NativeFn::method1(move |s: Arc<str>, v: Arc<str>| f(&s, &v)),
        ));
    }

    entry.add_method(MethodEntry::instance(
        "IndexOf",
        params(&[("value", string())]),
        int(),
        NativeFn::method1(|s: Arc<str>, v: Arc<str>| index_of(&s, &v)),
    ));
    entry.add_method(MethodEntry::instance(
        "IndexOf",
        params(&[("value", char_type())]),
        int(),
        NativeFn::method1(|s: Arc<str>, c: char| index_of(&s, c.encode_utf8(&mut [0; 4]))),
    ));
    entry.add_method(MethodEntry::instance(
        "Substring",
        params(&[("startIndex", int())]),
        string(),
        NativeFn::new(|this, args| {
            let s: Arc<str> = receiver(this)?;
            substring(&s, arg(args, 0)?, None)
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "Substring",
        params(&[("startIndex", int()), ("length", int())]),
        string(),
        NativeFn::new(|this, args| {
            let s: Arc<str> = receiver(this)?;
            substring(&s, arg(args, 0)?, Some(arg(args, 1)?))
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "Replace",
        params(&[("oldValue", string()), ("newValue", string())]),
        string(),
        NativeFn::method2(|s: Arc<str>, old: Arc<str>, new: Option<Arc<str>>| {
            if old.is_empty() {
                s.to_string()
            } else {
                s.replace(&*old, new.as_deref().unwrap_or(""))
            }
        }),
    ));
    for (name, left) in [("PadLeft", true), ("PadRight", false)] {
        entry.add_method(MethodEntry::instance(
            name,
            vec![
                Param::new("totalWidth", int()),
                Param::new("paddingChar", char_type()).with_default(Value::Char(' ')),
            ],
            string(),
            NativeFn::method2(move |s: Arc<str>, width: i32, pad: char| {
                let missing = usize::try_from(width).unwrap_or(0).saturating_sub(char_count(&s));
                let padding: String = std::iter::repeat_n(pad, missing).collect();
                if left {
                    format!("{padding}{s}")
                } else {
                    format!("{s}{padding}")
                }
            }),
        ));
    }
    entry.add_method(MethodEntry::instance(
        "Split",
        vec![Param::variadic("separator", char_type())],
        string_array,
        NativeFn::new(|this, args| {
            let s: Arc<str> = receiver(this)?;
            let separators: Vec<char> = spread(args)
                .iter()
                .filter_map(|v| match v {
                    Value::Char(c) => Some(*c),
                    _ => None,
                })
                .collect();
            let parts: Vec<Value> = if separators.is_empty() {
                s.split(char::is_whitespace).map(Value::from).collect()
            } else {
                s.split(separators.as_slice()).map(Value::from).collect()
            };
            Ok(Value::Array(ArrayValue::new(string(), parts)))
        }),
    ));
    let options = DataType::simple(library::STRING_SPLIT_OPTIONS);
    entry.add_method(MethodEntry::instance(
        "Split",
        params(&[("separator", char_type()), ("options", options)]),
        string_array,
        NativeFn::new(|this, args| {
            let s: Arc<str> = receiver(this)?;
            let separator: char = arg(args, 0)?;
            let options: Value = arg(args, 1)?;
            Ok(split_with(s.split(separator), &options))
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "Split",
        vec![
            Param::new("separator", string()),
            Param::new("options", options).with_default(Value::Enum {
                type_hash: library::STRING_SPLIT_OPTIONS,
                bits: 0,
            }),
        ],
        string_array,
        NativeFn::new(|this, args| {
            let s: Arc<str> = receiver(this)?;
            let separator: Option<Arc<str>> = arg(args, 0)?;
            let options: Value = arg(args, 1)?;
            let separator = separator.as_deref().unwrap_or("");
            if separator.is_empty() {
                return Ok(split_with(std::iter::once(&*s), &options));
            }
            Ok(split_with(s.split(separator), &options))
        }),
    ));
}

/// Apply `TrimEntries` (2) then `RemoveEmptyEntries` (1) to split parts.
fn split_with<'a>(parts: impl Iterator<Item = &'a str>, options: &Value) -> Value {
    let bits = match options {
        Value::Enum { bits, .. } => *bits,
        _ => 0,
    };
    let parts = parts
        .map(|part| if bits & 2 != 0 { part.trim() } else { part })
        .filter(|part| bits & 1 == 0 || !part.is_empty())
        .map(Value::from)
        .collect();
    Value::Array(ArrayValue::new(string(), parts))
}
