//! Built-in enumerations.

use sharpexpr_core::{PrimitiveKind, RegistrationError, TypeEntry};
use sharpexpr_registry::TypeRegistry;

pub fn day_of_week() -> TypeEntry {
    [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ]
    .iter()
    .zip(0..)
    .fold(
        TypeEntry::enumeration("System", "DayOfWeek", PrimitiveKind::Int32),
        |entry, (name, bits)| entry.with_enum_value(name, bits),
    )
}

/// Odd values ignore case.
pub fn string_comparison() -> TypeEntry {
    TypeEntry::enumeration("System", "StringComparison", PrimitiveKind::Int32)
        .with_enum_value("CurrentCulture", 0)
        .with_enum_value("CurrentCultureIgnoreCase", 1)
        .with_enum_value("InvariantCulture", 2)
        .with_enum_value("InvariantCultureIgnoreCase", 3)
        .with_enum_value("Ordinal", 4)
        .with_enum_value("OrdinalIgnoreCase", 5)
}

pub fn string_split_options() -> TypeEntry {
    TypeEntry::enumeration("System", "StringSplitOptions", PrimitiveKind::Int32)
        .with_enum_value("None", 0)
        .with_enum_value("RemoveEmptyEntries", 1)
        .with_enum_value("TrimEntries", 2)
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    registry.register(day_of_week())?;
    registry.register(string_comparison())?;
    registry.register(string_split_options())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_core::library;

    #[test]
    fn hashes_match_library_constants() {
        assert_eq!(day_of_week().type_hash, library::DAY_OF_WEEK);
        assert_eq!(string_comparison().type_hash, library::STRING_COMPARISON);
        assert_eq!(string_split_options().type_hash, library::STRING_SPLIT_OPTIONS);
        assert_eq!(day_of_week().enum_name_of(6), Some("Saturday"));
    }
}
