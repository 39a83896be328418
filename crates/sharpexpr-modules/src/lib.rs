//! Built-in class library for the sharpexpr expression language.
//!
//! This crate fills a [`TypeRegistry`] with the types every expression can
//! use without host registration:
//!
//! - **object** - `Object.ToString/Equals/GetHashCode`, `ReferenceEquals`
//! - **primitives** - `MinValue`/`MaxValue`, `Parse` and friends on the scalars
//! - **string** - `String` members, `Concat` overloads, `Format`, `Join`
//! - **array** - `Array.Length`, `Array.Rank`
//! - **math** - `Math` and `MathF`
//! - **convert** - `Convert.ToInt32(object)` and friends
//! - **enums** - `DayOfWeek`, `StringComparison`, `StringSplitOptions`
//! - **time** - `TimeSpan`, `DateTime`, `DateTimeKind`
//! - **guid** - `Guid`
//! - **pattern** - `Regex` and `RegexOptions`
//!
//! # Usage
//!
//! ```
//! let registry = sharpexpr_modules::standard_registry().unwrap();
//! assert!(registry.get(sharpexpr_core::library::MATH).is_some());
//! ```

pub mod array;
pub mod convert;
pub mod enums;
pub mod guid;
mod host;
pub mod math;
pub mod object;
pub mod pattern;
pub mod primitives;
pub mod string;
pub mod time;

use sharpexpr_core::RegistrationError;
use sharpexpr_registry::TypeRegistry;

/// Install every built-in module into `registry`, which must already hold the
/// primitive entries (see [`TypeRegistry::with_primitives`]).
pub fn install_all(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    object::install(registry)?;
    primitives::install(registry)?;
    string::install(registry)?;
    array::install(registry)?;
    enums::install(registry)?;
    math::install(registry)?;
    convert::install(registry)?;
    time::install(registry)?;
    guid::install(registry)?;
    pattern::install(registry)?;
    Ok(())
}

/// A registry with primitives and the whole built-in library.
pub fn standard_registry() -> Result<TypeRegistry, RegistrationError> {
    let mut registry = TypeRegistry::with_primitives();
    install_all(&mut registry)?;
    Ok(registry)
}
