//! `System.Guid` backed by [`uuid::Uuid`].

use std::fmt;
use std::sync::Arc;

use sharpexpr_core::{
    DataType, MemberEntry, MethodEntry, NativeFn, Param, RegistrationError, RuntimeError,
    TypeEntry, Value, arg, library, receiver,
};
use sharpexpr_registry::TypeRegistry;
use uuid::Uuid;

use crate::host::{host_value, relational};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Guid(pub Uuid);

host_value!(Guid, "Guid", library::GUID);

fn unrecognized() -> RuntimeError {
    RuntimeError::Format {
        message: "Unrecognized Guid format.".to_string(),
    }
}

impl Guid {
    pub fn parse(text: &str) -> Result<Self, RuntimeError> {
        let text = text.trim();
        let inner = match (text.chars().next(), text.chars().last()) {
            (Some('{'), Some('}')) | (Some('('), Some(')')) => &text[1..text.len() - 1],
            _ => text,
        };
        if inner.len() != 32 && inner.len() != 36 {
            return Err(unrecognized());
        }
        Uuid::try_parse(inner).map(Guid).map_err(|_| unrecognized())
    }

    /// `N`, `D`, `B` and `P`; an empty format means `D`.
    pub fn format(&self, format: &str) -> Result<String, RuntimeError> {
        let hyphenated = self.0.hyphenated().to_string();
        match format {
            "" | "D" | "d" => Ok(hyphenated),
            "N" | "n" => Ok(self.0.simple().to_string()),
            "B" | "b" => Ok(format!("{{{hyphenated}}}")),
            "P" | "p" => Ok(format!("({hyphenated})")),
            _ => Err(RuntimeError::Format {
                message: format!("Unsupported Guid format '{format}'."),
            }),
        }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

pub fn guid() -> TypeEntry {
    let guid = DataType::simple(library::GUID);
    let mut entry = TypeEntry::value_type("System", "Guid");
    entry.add_member(MemberEntry::static_field(
        "Empty",
        guid,
        NativeFn::constant(Guid(Uuid::nil()).into()),
    ));
    entry.add_method(MethodEntry::static_fn(
        "NewGuid",
        vec![],
        guid,
        NativeFn::from_fn0(|| Guid(Uuid::new_v4())),
    ));
    entry.add_method(MethodEntry::static_fn(
        "Parse",
        vec![Param::new("input", DataType::string())],
        guid,
        NativeFn::new(|_, args| {
            let text: Arc<str> = arg(args, 0)?;
            Ok(Guid::parse(&text)?.into())
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "ToString",
        vec![Param::new("format", DataType::string())],
        DataType::string(),
        NativeFn::new(|this, args| {
            let guid: Guid = receiver(this)?;
            let format: Option<Arc<str>> = arg(args, 0)?;
            Ok(guid.format(format.as_deref().unwrap_or(""))?.into())
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "CompareTo",
        vec![Param::new("value", guid)],
        DataType::int32(),
        NativeFn::method1(|a: Guid, b: Guid| a.cmp(&b) as i32),
    ));
    relational::<Guid>(&mut entry, false);
    entry
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    registry.register(guid())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

    #[test]
    fn parse_accepts_every_standard_layout() {
        let expected = Guid::parse(TEXT).unwrap();
        for layout in [
            "0f8fad5bd9cb469fa16570867728950e",
            "{0F8FAD5B-D9CB-469F-A165-70867728950E}",
            "(0f8fad5b-d9cb-469f-a165-70867728950e)",
        ] {
            assert_eq!(Guid::parse(layout).unwrap(), expected);
        }
        assert!(Guid::parse("0f8fad5b").is_err());
        assert!(Guid::parse("{0f8fad5b-d9cb-469f-a165-70867728950e").is_err());
    }

    #[test]
    fn format_specifiers() {
        let guid = Guid::parse(TEXT).unwrap();
        assert_eq!(guid.to_string(), TEXT);
        assert_eq!(guid.format("N").unwrap(), "0f8fad5bd9cb469fa16570867728950e");
        assert_eq!(guid.format("B").unwrap(), format!("{{{TEXT}}}"));
        assert!(guid.format("Q").is_err());
    }

    #[test]
    fn guids_compare_by_value() {
        assert_eq!(Value::from(Guid::parse(TEXT).unwrap()), Value::from(Guid::parse(TEXT).unwrap()));
        assert_ne!(Guid(Uuid::new_v4()), Guid(Uuid::new_v4()));
        assert_eq!(guid().type_hash, library::GUID);
    }
}
