//! `System.Text.RegularExpressions.Regex` static helpers and `RegexOptions`.
//!
//! Patterns are compiled per call with the `regex` crate. Only the options
//! with a direct equivalent change matching; the rest are accepted and ignored.

use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use sharpexpr_core::{
    ArrayValue, DataType, MethodEntry, NativeFn, Param, PrimitiveKind, RegistrationError,
    RuntimeError, TypeEntry, Value, arg, library,
};
use sharpexpr_registry::TypeRegistry;

use crate::host::flags;

pub const IGNORE_CASE: i64 = 1;
pub const MULTILINE: i64 = 2;
pub const SINGLELINE: i64 = 16;
pub const IGNORE_PATTERN_WHITESPACE: i64 = 32;

pub fn compile(pattern: &str, options: i64) -> Result<Regex, RuntimeError> {
    RegexBuilder::new(pattern)
        .case_insensitive(options & IGNORE_CASE != 0)
        .multi_line(options & MULTILINE != 0)
        .dot_matches_new_line(options & SINGLELINE != 0)
        .ignore_whitespace(options & IGNORE_PATTERN_WHITESPACE != 0)
        .build()
        .map_err(|e| RuntimeError::Format {
            message: format!("Invalid pattern '{pattern}'. {e}"),
        })
}

/// Input, pattern and the optional trailing `RegexOptions` of a call.
fn inputs(args: &[Value], options_at: usize) -> Result<(Arc<str>, Regex), RuntimeError> {
    let input: Arc<str> = arg(args, 0)?;
    let pattern: Arc<str> = arg(args, 1)?;
    let options = args.get(options_at).map(flags).unwrap_or(0);
    Ok((input, compile(&pattern, options)?))
}

pub fn regex_options() -> TypeEntry {
    [
        ("None", 0),
        ("IgnoreCase", IGNORE_CASE),
        ("Multiline", MULTILINE),
        ("ExplicitCapture", 4),
        ("Compiled", 8),
        ("Singleline", SINGLELINE),
        ("IgnorePatternWhitespace", IGNORE_PATTERN_WHITESPACE),
        ("RightToLeft", 64),
        ("ECMAScript", 256),
        ("CultureInvariant", 512),
        ("NonBacktracking", 1024),
    ]
    .into_iter()
    .fold(
        TypeEntry::enumeration("System.Text.RegularExpressions", "RegexOptions", PrimitiveKind::Int32),
        |entry, (name, bits)| entry.with_enum_value(name, bits),
    )
}

pub fn regex() -> TypeEntry {
    let string = DataType::string();
    let options = DataType::simple(library::REGEX_OPTIONS);
    let mut entry = TypeEntry::class("System.Text.RegularExpressions", "Regex");

    let with_options = |mut params: Vec<Param>, extended: bool| {
        if extended {
            params.push(Param::new("options", options));
        }
        params
    };
    let input_pattern = || {
        vec![
            Param::new("input", string),
            Param::new("pattern", string),
        ]
    };

    for extended in [false, true] {
        entry.add_method(MethodEntry::static_fn(
            "IsMatch",
            with_options(input_pattern(), extended),
            DataType::bool(),
            NativeFn::new(|_, args| {
                let (input, regex) = inputs(args, 2)?;
                Ok(Value::Bool(regex.is_match(&input)))
            }),
        ));
        entry.add_method(MethodEntry::static_fn(
            "Count",
            with_options(input_pattern(), extended),
            DataType::int32(),
            NativeFn::new(|_, args| {
                let (input, regex) = inputs(args, 2)?;
                Ok(Value::Int32(regex.find_iter(&input).count() as i32))
            }),
        ));
        entry.add_method(MethodEntry::static_fn(
            "Split",
            with_options(input_pattern(), extended),
            string.array_of(),
            NativeFn::new(|_, args| {
                let (input, regex) = inputs(args, 2)?;
                let parts = regex.split(&input).map(Value::from).collect();
                Ok(Value::Array(ArrayValue::new(DataType::string(), parts)))
            }),
        ));
        let mut replace = input_pattern();
        replace.push(Param::new("replacement", string));
        entry.add_method(MethodEntry::static_fn(
            "Replace",
            with_options(replace, extended),
            string,
            NativeFn::new(|_, args| {
                let (input, regex) = inputs(args, 3)?;
                let replacement: Arc<str> = arg(args, 2)?;
                Ok(Value::from(regex.replace_all(&input, &*replacement).into_owned()))
            }),
        ));
    }
    entry.add_method(MethodEntry::static_fn(
        "Escape",
        vec![Param::new("str", string)],
        string,
        NativeFn::from_fn1(|s: Arc<str>| regex::escape(&s)),
    ));
    entry
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    registry.register(regex_options())?;
    registry.register(regex())?;
    Ok(())
}
