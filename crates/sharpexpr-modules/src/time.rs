//! `TimeSpan`, `DateTime` and `DateTimeKind`.
//!
//! A [`TimeSpan`] counts 100-nanosecond ticks. A [`DateTime`] is a calendar
//! instant between the years 1 and 9999 tagged with a [`DateTimeKind`];
//! calendar arithmetic and the system clock go through chrono.

use std::cmp::Ordering;
use std::fmt;

use chrono::{
    Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use sharpexpr_core::{
    DataType, MemberEntry, MethodEntry, NativeFn, Param, PrimitiveKind, RegistrationError,
    RuntimeError, TypeEntry, Value, arg, library, receiver,
};
use sharpexpr_registry::TypeRegistry;

use crate::host::{flags, host_value, relational};

pub const TICKS_PER_MILLISECOND: i64 = 10_000;
pub const TICKS_PER_SECOND: i64 = 1_000 * TICKS_PER_MILLISECOND;
pub const TICKS_PER_MINUTE: i64 = 60 * TICKS_PER_SECOND;
pub const TICKS_PER_HOUR: i64 = 60 * TICKS_PER_MINUTE;
pub const TICKS_PER_DAY: i64 = 24 * TICKS_PER_HOUR;

/// Ticks of `DateTime.MaxValue` (9999-12-31 23:59:59.9999999).
pub const MAX_DATE_TICKS: i64 = 3_155_378_975_999_999_999;
/// Ticks of `DateTime.UnixEpoch`.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

fn too_long() -> RuntimeError {
    RuntimeError::Format {
        message: "TimeSpan overflowed because the duration is too long.".to_string(),
    }
}

fn unrepresentable() -> RuntimeError {
    RuntimeError::Format {
        message: "The added or subtracted value results in an un-representable DateTime."
            .to_string(),
    }
}

// =============================================================================
// TimeSpan
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpan {
    pub ticks: i64,
}

host_value!(TimeSpan, "TimeSpan", library::TIME_SPAN);

impl TimeSpan {
    pub const ZERO: TimeSpan = TimeSpan { ticks: 0 };
    pub const MIN: TimeSpan = TimeSpan { ticks: i64::MIN };
    pub const MAX: TimeSpan = TimeSpan { ticks: i64::MAX };

    pub const fn from_ticks(ticks: i64) -> Self {
        Self { ticks }
    }

    /// `value` units of `ticks_per_unit` ticks each, truncated toward zero.
    pub fn from_units(value: f64, ticks_per_unit: i64) -> Result<Self, RuntimeError> {
        if value.is_nan() {
            return Err(RuntimeError::Format {
                message: "TimeSpan does not accept floating point Not-a-Number values."
                    .to_string(),
            });
        }
        let ticks = value * ticks_per_unit as f64;
        if ticks >= i64::MAX as f64 || ticks < i64::MIN as f64 {
            return Err(too_long());
        }
        Ok(Self::from_ticks(ticks as i64))
    }

    pub fn days(self) -> i32 {
        (self.ticks / TICKS_PER_DAY) as i32
    }

    pub fn hours(self) -> i32 {
        (self.ticks / TICKS_PER_HOUR % 24) as i32
    }

    pub fn minutes(self) -> i32 {
        (self.ticks / TICKS_PER_MINUTE % 60) as i32
    }

    pub fn seconds(self) -> i32 {
        (self.ticks / TICKS_PER_SECOND % 60) as i32
    }

    pub fn milliseconds(self) -> i32 {
        (self.ticks / TICKS_PER_MILLISECOND % 1000) as i32
    }

    pub fn total(self, ticks_per_unit: i64) -> f64 {
        self.ticks as f64 / ticks_per_unit as f64
    }

    pub fn checked_add(self, other: TimeSpan) -> Result<Self, RuntimeError> {
        self.ticks.checked_add(other.ticks).map(Self::from_ticks).ok_or_else(too_long)
    }

    pub fn checked_sub(self, other: TimeSpan) -> Result<Self, RuntimeError> {
        self.ticks.checked_sub(other.ticks).map(Self::from_ticks).ok_or_else(too_long)
    }

    pub fn negate(self) -> Result<Self, RuntimeError> {
        self.ticks.checked_neg().map(Self::from_ticks).ok_or_else(|| RuntimeError::Format {
            message: "Negating the minimum value of a twos complement number is invalid."
                .to_string(),
        })
    }

    pub fn duration(self) -> Result<Self, RuntimeError> {
        if self.ticks < 0 { self.negate() } else { Ok(self) }
    }

    /// Parse the constant format `[-][d.]hh:mm[:ss[.fffffff]]`, or a bare day count.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let mut fields = text.split(':');
        let head = fields.next()?;
        let Some(minutes) = fields.next() else {
            let days: i64 = head.parse().ok()?;
            let ticks = days.checked_mul(TICKS_PER_DAY)?;
            return Some(Self::from_ticks(if negative { -ticks } else { ticks }));
        };
        let (days, hours): (i64, i64) = match head.split_once('.') {
            Some((days, hours)) => (days.parse().ok()?, hours.parse().ok()?),
            None => (0, head.parse().ok()?),
        };
        let minutes: i64 = minutes.parse().ok()?;
        let (seconds, fraction): (i64, i64) = match fields.next() {
            None => (0, 0),
            Some(seconds) => match seconds.split_once('.') {
                Some((seconds, fraction)) => (seconds.parse().ok()?, fraction_ticks(fraction)?),
                None => (seconds.parse().ok()?, 0),
            },
        };
        if fields.next().is_some()
            || days < 0
            || !(0..24).contains(&hours)
            || !(0..60).contains(&minutes)
            || !(0..60).contains(&seconds)
        {
            return None;
        }
        let ticks = days
            .checked_mul(TICKS_PER_DAY)?
            .checked_add(hours * TICKS_PER_HOUR + minutes * TICKS_PER_MINUTE)?
            .checked_add(seconds * TICKS_PER_SECOND + fraction)?;
        Some(Self::from_ticks(if negative { -ticks } else { ticks }))
    }
}

fn fraction_ticks(digits: &str) -> Option<i64> {
    if digits.is_empty() || digits.len() > 7 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    format!("{digits:0<7}").parse().ok()
}

/// The constant (`c`) format.
impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ticks < 0 {
            write!(f, "-")?;
        }
        let ticks = self.ticks.unsigned_abs();
        let day = TICKS_PER_DAY as u64;
        let days = ticks / day;
        let rem = ticks % day;
        if days > 0 {
            write!(f, "{days}.")?;
        }
        write!(
            f,
            "{:02}:{:02}:{:02}",
            rem / TICKS_PER_HOUR as u64,
            rem / TICKS_PER_MINUTE as u64 % 60,
            rem / TICKS_PER_SECOND as u64 % 60
        )?;
        let fraction = rem % TICKS_PER_SECOND as u64;
        if fraction > 0 {
            write!(f, ".{fraction:07}")?;
        }
        Ok(())
    }
}

// =============================================================================
// DateTime
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateTimeKind {
    #[default]
    Unspecified = 0,
    Utc = 1,
    Local = 2,
}

impl DateTimeKind {
    fn from_bits(bits: i64) -> Self {
        match bits {
            1 => DateTimeKind::Utc,
            2 => DateTimeKind::Local,
            _ => DateTimeKind::Unspecified,
        }
    }

    fn value(self) -> Value {
        Value::Enum {
            type_hash: library::DATE_TIME_KIND,
            bits: self as i64,
        }
    }
}

/// Equality and ordering look at the instant only, never the kind.
#[derive(Debug, Clone, Copy)]
pub struct DateTime {
    pub value: NaiveDateTime,
    pub kind: DateTimeKind,
}

host_value!(DateTime, "DateTime", library::DATE_TIME);

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.value.cmp(&other.value))
    }
}

impl DateTime {
    pub fn new(value: NaiveDateTime, kind: DateTimeKind) -> Result<Self, RuntimeError> {
        if (1..=9999).contains(&value.year()) {
            Ok(Self { value, kind })
        } else {
            Err(unrepresentable())
        }
    }

    pub fn from_ticks(ticks: i64, kind: DateTimeKind) -> Result<Self, RuntimeError> {
        if !(0..=MAX_DATE_TICKS).contains(&ticks) {
            return Err(unrepresentable());
        }
        let days = i32::try_from(ticks / TICKS_PER_DAY + 1).map_err(|_| unrepresentable())?;
        let rem = ticks % TICKS_PER_DAY;
        let date = NaiveDate::from_num_days_from_ce_opt(days).ok_or_else(unrepresentable)?;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(
            (rem / TICKS_PER_SECOND) as u32,
            (rem % TICKS_PER_SECOND * 100) as u32,
        )
        .ok_or_else(unrepresentable)?;
        Ok(Self {
            value: date.and_time(time),
            kind,
        })
    }

    pub fn now() -> Self {
        Self {
            value: Local::now().naive_local(),
            kind: DateTimeKind::Local,
        }
    }

    pub fn utc_now() -> Self {
        Self {
            value: Utc::now().naive_utc(),
            kind: DateTimeKind::Utc,
        }
    }

    pub fn ticks(&self) -> i64 {
        let days = i64::from(self.value.num_days_from_ce() - 1);
        let seconds = i64::from(self.value.num_seconds_from_midnight());
        let nanos = i64::from(self.value.nanosecond().min(999_999_999));
        days * TICKS_PER_DAY + seconds * TICKS_PER_SECOND + nanos / 100
    }

    pub fn date(&self) -> Self {
        Self {
            value: self.value.date().and_time(NaiveTime::MIN),
            kind: self.kind,
        }
    }

    pub fn time_of_day(&self) -> TimeSpan {
        TimeSpan::from_ticks(self.ticks() % TICKS_PER_DAY)
    }

    pub fn shifted(&self, span: TimeSpan) -> Result<Self, RuntimeError> {
        let ticks = self.ticks().checked_add(span.ticks).ok_or_else(unrepresentable)?;
        Self::from_ticks(ticks, self.kind)
    }

    pub fn add_months(&self, months: i32) -> Result<Self, RuntimeError> {
        let shift = Months::new(months.unsigned_abs());
        let shifted = if months < 0 {
            self.value.checked_sub_months(shift)
        } else {
            self.value.checked_add_months(shift)
        };
        Self::new(shifted.ok_or_else(unrepresentable)?, self.kind)
    }

    pub fn difference(&self, other: &DateTime) -> TimeSpan {
        TimeSpan::from_ticks(self.ticks() - other.ticks())
    }

    /// Unspecified instants are taken as local time.
    pub fn to_universal(&self) -> Result<Self, RuntimeError> {
        if self.kind == DateTimeKind::Utc {
            return Ok(*self);
        }
        let local = Local
            .from_local_datetime(&self.value)
            .earliest()
            .ok_or_else(unrepresentable)?;
        Self::new(local.naive_utc(), DateTimeKind::Utc)
    }

    /// Unspecified instants are taken as UTC.
    pub fn to_local(&self) -> Result<Self, RuntimeError> {
        if self.kind == DateTimeKind::Local {
            return Ok(*self);
        }
        Self::new(
            Local.from_utc_datetime(&self.value).naive_local(),
            DateTimeKind::Local,
        )
    }

    /// ISO 8601 with or without an offset, or the invariant `MM/dd/yyyy` forms.
    pub fn parse(text: &str) -> Result<Self, RuntimeError> {
        const DATE_TIMES: [&str; 4] = [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%m/%d/%Y %H:%M:%S",
        ];
        const DATES: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

        let trimmed = text.trim();
        if let Ok(with_offset) = chrono::DateTime::parse_from_rfc3339(trimmed) {
            return Self::new(
                with_offset.with_timezone(&Local).naive_local(),
                DateTimeKind::Local,
            );
        }
        let parsed = DATE_TIMES
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
            .or_else(|| {
                DATES.iter().find_map(|format| {
                    NaiveDate::parse_from_str(trimmed, format)
                        .ok()
                        .map(|date| date.and_time(NaiveTime::MIN))
                })
            });
        match parsed {
            Some(value) => Self::new(value, DateTimeKind::Unspecified),
            None => Err(RuntimeError::Format {
                message: format!("String '{text}' was not recognized as a valid DateTime."),
            }),
        }
    }
}

/// Invariant culture `MM/dd/yyyy HH:mm:ss`.
impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.format("%m/%d/%Y %H:%M:%S"))
    }
}

fn days_in_month(year: i32, month: i32) -> Result<i32, RuntimeError> {
    let out_of_range = || RuntimeError::Format {
        message: "Year, Month, and Day parameters describe an un-representable DateTime."
            .to_string(),
    };
    if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
        return Err(out_of_range());
    }
    let first = NaiveDate::from_ymd_opt(year, month as u32, 1).ok_or_else(out_of_range)?;
    let next = first
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    Ok(next.signed_duration_since(first).num_days() as i32)
}

fn is_leap_year(year: i32) -> Result<bool, RuntimeError> {
    if !(1..=9999).contains(&year) {
        return Err(RuntimeError::Format {
            message: "Year must be between 1 and 9999.".to_string(),
        });
    }
    Ok(NaiveDate::from_ymd_opt(year, 2, 29).is_some())
}

// =============================================================================
// Registration
// =============================================================================

pub fn date_time_kind() -> TypeEntry {
    TypeEntry::enumeration("System", "DateTimeKind", PrimitiveKind::Int32)
        .with_enum_value("Unspecified", 0)
        .with_enum_value("Utc", 1)
        .with_enum_value("Local", 2)
}

fn double() -> DataType {
    DataType::primitive(PrimitiveKind::Double)
}

fn long() -> DataType {
    DataType::primitive(PrimitiveKind::Int64)
}

pub fn time_span() -> TypeEntry {
    let span = DataType::simple(library::TIME_SPAN);
    let mut entry = TypeEntry::value_type("System", "TimeSpan");
    for (name, value) in [
        ("Zero", TimeSpan::ZERO),
        ("MinValue", TimeSpan::MIN),
        ("MaxValue", TimeSpan::MAX),
    ] {
        entry.add_member(MemberEntry::static_field(
            name,
            span,
            NativeFn::constant(value.into()),
        ));
    }
    for (name, per) in [
        ("TicksPerMillisecond", TICKS_PER_MILLISECOND),
        ("TicksPerSecond", TICKS_PER_SECOND),
        ("TicksPerMinute", TICKS_PER_MINUTE),
        ("TicksPerHour", TICKS_PER_HOUR),
        ("TicksPerDay", TICKS_PER_DAY),
    ] {
        entry.add_member(MemberEntry::constant(name, Value::Int64(per)));
    }

    for (unit, per) in [
        ("Days", TICKS_PER_DAY),
        ("Hours", TICKS_PER_HOUR),
        ("Minutes", TICKS_PER_MINUTE),
        ("Seconds", TICKS_PER_SECOND),
        ("Milliseconds", TICKS_PER_MILLISECOND),
    ] {
        entry.add_method(MethodEntry::static_fn(
            &format!("From{unit}"),
            vec![Param::new("value", double())],
            span,
            NativeFn::new(move |_, args| Ok(TimeSpan::from_units(arg(args, 0)?, per)?.into())),
        ));
        entry.add_member(MemberEntry::property(
            &format!("Total{unit}"),
            double(),
            NativeFn::method0(move |span: TimeSpan| span.total(per)),
        ));
    }
    entry.add_method(MethodEntry::static_fn(
        "FromTicks",
        vec![Param::new("value", long())],
        span,
        NativeFn::from_fn1(TimeSpan::from_ticks),
    ));
    entry.add_method(MethodEntry::static_fn(
        "Parse",
        vec![Param::new("input", DataType::string())],
        span,
        NativeFn::new(|_, args| {
            let text: std::sync::Arc<str> = arg(args, 0)?;
            TimeSpan::parse(&text)
                .map(Value::from)
                .ok_or_else(|| RuntimeError::Format {
                    message: "String was not recognized as a valid TimeSpan.".to_string(),
                })
        }),
    ));

    let components: [(&str, fn(TimeSpan) -> i32); 5] = [
        ("Days", TimeSpan::days),
        ("Hours", TimeSpan::hours),
        ("Minutes", TimeSpan::minutes),
        ("Seconds", TimeSpan::seconds),
        ("Milliseconds", TimeSpan::milliseconds),
    ];
    for (name, component) in components {
        entry.add_member(MemberEntry::property(
            name,
            DataType::int32(),
            NativeFn::method0(component),
        ));
    }
    entry.add_member(MemberEntry::property(
        "Ticks",
        long(),
        NativeFn::method0(|span: TimeSpan| span.ticks),
    ));

    let binary: [(&str, &str, fn(TimeSpan, TimeSpan) -> Result<TimeSpan, RuntimeError>); 2] = [
        ("Add", "op_Addition", TimeSpan::checked_add),
        ("Subtract", "op_Subtraction", TimeSpan::checked_sub),
    ];
    for (method, operator, apply) in binary {
        entry.add_method(MethodEntry::instance(
            method,
            vec![Param::new("ts", span)],
            span,
            NativeFn::new(move |this, args| {
                Ok(apply(receiver(this)?, arg(args, 0)?)?.into())
            }),
        ));
        entry.add_method(MethodEntry::static_fn(
            operator,
            vec![Param::new("t1", span), Param::new("t2", span)],
            span,
            NativeFn::new(move |_, args| Ok(apply(arg(args, 0)?, arg(args, 1)?)?.into())),
        ));
    }
    let unary: [(&str, fn(TimeSpan) -> Result<TimeSpan, RuntimeError>); 2] =
        [("Negate", TimeSpan::negate), ("Duration", TimeSpan::duration)];
    for (name, apply) in unary {
        entry.add_method(MethodEntry::instance(
            name,
            vec![],
            span,
            NativeFn::new(move |this, _| Ok(apply(receiver(this)?)?.into())),
        ));
    }
    entry.add_method(MethodEntry::static_fn(
        "op_UnaryNegation",
        vec![Param::new("t", span)],
        span,
        NativeFn::new(|_, args| Ok(arg::<TimeSpan>(args, 0)?.negate()?.into())),
    ));
    entry.add_method(MethodEntry::static_fn(
        "op_UnaryPlus",
        vec![Param::new("t", span)],
        span,
        NativeFn::from_fn1(|t: TimeSpan| t),
    ));
    entry.add_method(MethodEntry::instance(
        "CompareTo",
        vec![Param::new("value", span)],
        DataType::int32(),
        NativeFn::method1(|a: TimeSpan, b: TimeSpan| a.cmp(&b) as i32),
    ));
    relational::<TimeSpan>(&mut entry, true);
    entry
}

pub fn date_time() -> TypeEntry {
    let date = DataType::simple(library::DATE_TIME);
    let span = DataType::simple(library::TIME_SPAN);
    let int = DataType::int32();
    let mut entry = TypeEntry::value_type("System", "DateTime");

    let clocks: [(&str, fn() -> DateTime); 3] = [
        ("Now", DateTime::now),
        ("UtcNow", DateTime::utc_now),
        ("Today", || DateTime::now().date()),
    ];
    for (name, clock) in clocks {
        entry.add_member(MemberEntry::static_property(
            name,
            date,
            NativeFn::from_fn0(clock),
        ));
    }
    for (name, ticks, kind) in [
        ("MinValue", 0, DateTimeKind::Unspecified),
        ("MaxValue", MAX_DATE_TICKS, DateTimeKind::Unspecified),
        ("UnixEpoch", UNIX_EPOCH_TICKS, DateTimeKind::Utc),
    ] {
        entry.add_member(MemberEntry::static_field(
            name,
            date,
            NativeFn::new(move |_, _| Ok(DateTime::from_ticks(ticks, kind)?.into())),
        ));
    }

    entry.add_method(MethodEntry::static_fn(
        "Parse",
        vec![Param::new("s", DataType::string())],
        date,
        NativeFn::new(|_, args| {
            let text: std::sync::Arc<str> = arg(args, 0)?;
            Ok(DateTime::parse(&text)?.into())
        }),
    ));
    entry.add_method(MethodEntry::static_fn(
        "IsLeapYear",
        vec![Param::new("year", int)],
        DataType::bool(),
        NativeFn::new(|_, args| Ok(is_leap_year(arg(args, 0)?)?.into())),
    ));
    entry.add_method(MethodEntry::static_fn(
        "DaysInMonth",
        vec![Param::new("year", int), Param::new("month", int)],
        int,
        NativeFn::new(|_, args| Ok(days_in_month(arg(args, 0)?, arg(args, 1)?)?.into())),
    ));
    entry.add_method(MethodEntry::static_fn(
        "SpecifyKind",
        vec![
            Param::new("value", date),
            Param::new("kind", DataType::simple(library::DATE_TIME_KIND)),
        ],
        date,
        NativeFn::new(|_, args| {
            let value: DateTime = arg(args, 0)?;
            let kind = DateTimeKind::from_bits(flags(&arg::<Value>(args, 1)?));
            Ok(DateTime { kind, ..value }.into())
        }),
    ));
    entry.add_method(MethodEntry::static_fn(
        "Compare",
        vec![Param::new("t1", date), Param::new("t2", date)],
        int,
        NativeFn::from_fn2(|a: DateTime, b: DateTime| a.value.cmp(&b.value) as i32),
    ));

    let calendar: [(&str, fn(&DateTime) -> i32); 8] = [
        ("Year", |d| d.value.year()),
        ("Month", |d| d.value.month() as i32),
        ("Day", |d| d.value.day() as i32),
        ("DayOfYear", |d| d.value.ordinal() as i32),
        ("Hour", |d| d.value.hour() as i32),
        ("Minute", |d| d.value.minute() as i32),
        ("Second", |d| d.value.second() as i32),
        ("Millisecond", |d| (d.value.nanosecond() / 1_000_000).min(999) as i32),
    ];
    for (name, component) in calendar {
        entry.add_member(MemberEntry::property(
            name,
            int,
            NativeFn::method0(move |d: DateTime| component(&d)),
        ));
    }
    entry.add_member(MemberEntry::property(
        "DayOfWeek",
        DataType::simple(library::DAY_OF_WEEK),
        NativeFn::method0(|d: DateTime| Value::Enum {
            type_hash: library::DAY_OF_WEEK,
            bits: i64::from(d.value.weekday().num_days_from_sunday()),
        }),
    ));
    entry.add_member(MemberEntry::property(
        "Kind",
        DataType::simple(library::DATE_TIME_KIND),
        NativeFn::method0(|d: DateTime| d.kind.value()),
    ));
    entry.add_member(MemberEntry::property(
        "Ticks",
        long(),
        NativeFn::method0(|d: DateTime| d.ticks()),
    ));
    entry.add_member(MemberEntry::property(
        "Date",
        date,
        NativeFn::method0(|d: DateTime| d.date()),
    ));
    entry.add_member(MemberEntry::property(
        "TimeOfDay",
        span,
        NativeFn::method0(|d: DateTime| d.time_of_day()),
    ));

    for (unit, per) in [
        ("Days", TICKS_PER_DAY),
        ("Hours", TICKS_PER_HOUR),
        ("Minutes", TICKS_PER_MINUTE),
        ("Seconds", TICKS_PER_SECOND),
        ("Milliseconds", TICKS_PER_MILLISECOND),
    ] {
        entry.add_method(MethodEntry::instance(
            &format!("Add{unit}"),
            vec![Param::new("value", double())],
            date,
            NativeFn::new(move |this, args| {
                let d: DateTime = receiver(this)?;
                let span = TimeSpan::from_units(arg(args, 0)?, per).map_err(|_| unrepresentable())?;
                Ok(d.shifted(span)?.into())
            }),
        ));
    }
    entry.add_method(MethodEntry::instance(
        "AddTicks",
        vec![Param::new("value", long())],
        date,
        NativeFn::new(|this, args| {
            let d: DateTime = receiver(this)?;
            Ok(d.shifted(TimeSpan::from_ticks(arg(args, 0)?))?.into())
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "AddMonths",
        vec![Param::new("months", int)],
        date,
        NativeFn::new(|this, args| {
            let d: DateTime = receiver(this)?;
            Ok(d.add_months(arg(args, 0)?)?.into())
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "AddYears",
        vec![Param::new("value", int)],
        date,
        NativeFn::new(|this, args| {
            let d: DateTime = receiver(this)?;
            let years: i32 = arg(args, 0)?;
            let months = years.checked_mul(12).ok_or_else(unrepresentable)?;
            Ok(d.add_months(months)?.into())
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "Add",
        vec![Param::new("value", span)],
        date,
        NativeFn::new(|this, args| {
            let d: DateTime = receiver(this)?;
            Ok(d.shifted(arg(args, 0)?)?.into())
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "Subtract",
        vec![Param::new("value", span)],
        date,
        NativeFn::new(|this, args| {
            let d: DateTime = receiver(this)?;
            Ok(d.shifted(arg::<TimeSpan>(args, 0)?.negate()?)?.into())
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "Subtract",
        vec![Param::new("value", date)],
        span,
        NativeFn::method1(|a: DateTime, b: DateTime| a.difference(&b)),
    ));
    let conversions: [(&str, fn(&DateTime) -> Result<DateTime, RuntimeError>); 2] = [
        ("ToUniversalTime", DateTime::to_universal),
        ("ToLocalTime", DateTime::to_local),
    ];
    for (name, convert) in conversions {
        entry.add_method(MethodEntry::instance(
            name,
            vec![],
            date,
            NativeFn::new(move |this, _| Ok(convert(&receiver(this)?)?.into())),
        ));
    }

    entry.add_method(MethodEntry::static_fn(
        "op_Addition",
        vec![Param::new("d", date), Param::new("t", span)],
        date,
        NativeFn::new(|_, args| {
            let d: DateTime = arg(args, 0)?;
            Ok(d.shifted(arg(args, 1)?)?.into())
        }),
    ));
    entry.add_method(MethodEntry::static_fn(
        "op_Subtraction",
        vec![Param::new("d", date), Param::new("t", span)],
        date,
        NativeFn::new(|_, args| {
            let d: DateTime = arg(args, 0)?;
            Ok(d.shifted(arg::<TimeSpan>(args, 1)?.negate()?)?.into())
        }),
    ));
    entry.add_method(MethodEntry::static_fn(
        "op_Subtraction",
        vec![Param::new("d1", date), Param::new("d2", date)],
        span,
        NativeFn::from_fn2(|a: DateTime, b: DateTime| a.difference(&b)),
    ));
    relational::<DateTime>(&mut entry, true);
    entry
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    registry.register(date_time_kind())?;
    registry.register(time_span())?;
    registry.register(date_time())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> DateTime {
        DateTime::parse(text).unwrap()
    }

    #[test]
    fn time_span_components_and_totals() {
        let span = TimeSpan::from_ticks(
            TICKS_PER_DAY + 2 * TICKS_PER_HOUR + 3 * TICKS_PER_MINUTE + 4 * TICKS_PER_SECOND
                + 500 * TICKS_PER_MILLISECOND,
        );
        assert_eq!(
            (span.days(), span.hours(), span.minutes(), span.seconds(), span.milliseconds()),
            (1, 2, 3, 4, 500)
        );
        assert_eq!(span.to_string(), "1.02:03:04.5000000");
        assert_eq!(TimeSpan::from_units(1.5, TICKS_PER_MINUTE).unwrap().total(TICKS_PER_SECOND), 90.0);
        assert_eq!(TimeSpan::from_units(-5.0, TICKS_PER_SECOND).unwrap().to_string(), "-00:00:05");
    }

    #[test]
    fn time_span_rejects_nan_and_overflow() {
        assert!(TimeSpan::from_units(f64::NAN, TICKS_PER_SECOND).is_err());
        assert!(TimeSpan::from_units(1e300, TICKS_PER_DAY).is_err());
        assert!(TimeSpan::MAX.checked_add(TimeSpan::from_ticks(1)).is_err());
        assert!(TimeSpan::MIN.negate().is_err());
    }

    #[test]
    fn time_span_parse_constant_format() {
        assert_eq!(TimeSpan::parse("00:00:05"), Some(TimeSpan::from_ticks(5 * TICKS_PER_SECOND)));
        assert_eq!(TimeSpan::parse("3"), Some(TimeSpan::from_ticks(3 * TICKS_PER_DAY)));
        assert_eq!(
            TimeSpan::parse("-1.00:00:00.25").map(|t| t.ticks),
            Some(-(TICKS_PER_DAY + TICKS_PER_SECOND / 4))
        );
        assert_eq!(TimeSpan::parse("10:30"), Some(TimeSpan::from_ticks(10 * TICKS_PER_HOUR + 30 * TICKS_PER_MINUTE)));
        assert_eq!(TimeSpan::parse("24:00:00"), None);
        assert_eq!(TimeSpan::parse("abc"), None);
    }

    #[test]
    fn date_time_ticks_round_trip_through_calendar() {
        let epoch = DateTime::from_ticks(UNIX_EPOCH_TICKS, DateTimeKind::Utc).unwrap();
        assert_eq!(epoch.to_string(), "01/01/1970 00:00:00");
        assert_eq!(at("1970-01-01").ticks(), UNIX_EPOCH_TICKS);
        let max = DateTime::from_ticks(MAX_DATE_TICKS, DateTimeKind::Unspecified).unwrap();
        assert_eq!(max.value.year(), 9999);
        assert_eq!(max.ticks(), MAX_DATE_TICKS);
        assert!(max.shifted(TimeSpan::from_ticks(1)).is_err());
        assert!(DateTime::from_ticks(-1, DateTimeKind::Utc).is_err());
    }

    #[test]
    fn date_time_calendar_arithmetic() {
        let leap = at("2024-01-31 10:00:00");
        assert_eq!(leap.add_months(1).unwrap().to_string(), "02/29/2024 10:00:00");
        assert_eq!(leap.add_months(-2).unwrap().value.month(), 11);
        let later = at("2024-02-01T12:30:00");
        assert_eq!(later.difference(&leap).to_string(), "1.02:30:00");
        assert_eq!(later.time_of_day().to_string(), "12:30:00");
        assert_eq!(days_in_month(2023, 2).unwrap(), 28);
        assert_eq!(days_in_month(9999, 12).unwrap(), 31);
        assert!(is_leap_year(2000).unwrap());
        assert!(!is_leap_year(1900).unwrap());
        assert!(is_leap_year(0).is_err());
    }

    #[test]
    fn date_time_equality_ignores_kind() {
        let a = at("2020-05-06");
        let b = DateTime { kind: DateTimeKind::Utc, ..a };
        assert_eq!(Value::from(a), Value::from(b));
        assert!(DateTime::parse("not a date").is_err());
    }

    #[test]
    fn hashes_match_library_constants() {
        assert_eq!(time_span().type_hash, library::TIME_SPAN);
        assert_eq!(date_time().type_hash, library::DATE_TIME);
        assert_eq!(date_time_kind().type_hash, library::DATE_TIME_KIND);
        assert!(date_time().is_value_type());
    }
}
