//! The table-backed binder.

use std::sync::Arc;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use sharpexpr_core::{
    BindError, DataType, MemberEntry, MethodEntry, PrimitiveKind, RegistrationError, TypeHash,
    library, primitives,
};
use sharpexpr_registry::TypeRegistry;
use sharpexpr_syntax::Identifier;

use crate::overload::{Resolution, resolve};

use super::Binder;

/// Built-in type names (lower-cased) and whether the type is a static import.
pub const BUILTIN_TYPES: [(&str, DataType, bool); 37] = [
    ("bool", DataType::primitive(PrimitiveKind::Bool), false),
    ("boolean", DataType::primitive(PrimitiveKind::Bool), false),
    ("byte", DataType::primitive(PrimitiveKind::UInt8), false),
    ("sbyte", DataType::primitive(PrimitiveKind::Int8), false),
    ("short", DataType::primitive(PrimitiveKind::Int16), false),
    ("ushort", DataType::primitive(PrimitiveKind::UInt16), false),
    ("int", DataType::primitive(PrimitiveKind::Int32), false),
    ("uint", DataType::primitive(PrimitiveKind::UInt32), false),
    ("long", DataType::primitive(PrimitiveKind::Int64), false),
    ("ulong", DataType::primitive(PrimitiveKind::UInt64), false),
    ("int8", DataType::primitive(PrimitiveKind::Int8), false),
    ("uint8", DataType::primitive(PrimitiveKind::UInt8), false),
    ("int16", DataType::primitive(PrimitiveKind::Int16), false),
    ("uint16", DataType::primitive(PrimitiveKind::UInt16), false),
    ("int32", DataType::primitive(PrimitiveKind::Int32), false),
    ("uint32", DataType::primitive(PrimitiveKind::UInt32), false),
    ("int64", DataType::primitive(PrimitiveKind::Int64), false),
    ("uint64", DataType::primitive(PrimitiveKind::UInt64), false),
    ("float", DataType::primitive(PrimitiveKind::Float), false),
    ("single", DataType::primitive(PrimitiveKind::Float), false),
    ("double", DataType::primitive(PrimitiveKind::Double), false),
    ("decimal", DataType::primitive(PrimitiveKind::Decimal), false),
    ("char", DataType::primitive(PrimitiveKind::Char), false),
    ("string", DataType::simple(primitives::STRING), true),
    ("object", DataType::simple(primitives::OBJECT), true),
    ("convert", DataType::simple(library::CONVERT), false),
    ("math", DataType::simple(library::MATH), true),
    ("mathf", DataType::simple(library::MATHF), true),
    ("dayofweek", DataType::simple(library::DAY_OF_WEEK), false),
    ("stringcomparison", DataType::simple(library::STRING_COMPARISON), false),
    ("stringsplitoptions", DataType::simple(library::STRING_SPLIT_OPTIONS), true),
    ("timespan", DataType::simple(library::TIME_SPAN), false),
    ("datetime", DataType::simple(library::DATE_TIME), false),
    ("datetimekind", DataType::simple(library::DATE_TIME_KIND), false),
    ("guid", DataType::simple(library::GUID), false),
    ("regex", DataType::simple(library::REGEX), false),
    ("regexoptions", DataType::simple(library::REGEX_OPTIONS), false),
];

lazy_static! {
    static ref BUILTIN_INDEX: FxHashMap<&'static str, (DataType, bool)> = BUILTIN_TYPES
        .iter()
        .map(|&(name, data_type, import_as_static)| (name, (data_type, import_as_static)))
        .collect();
}

#[derive(Debug, Clone, Copy)]
struct TypeImport {
    data_type: DataType,
    import_as_static: bool,
}

/// Binder over a [`TypeRegistry`]: built-in names plus host-registered types.
///
/// Register every host type before the first bind query; the binder is not
/// meant to be mutated while an expression is being built.
#[derive(Debug, Clone)]
pub struct DefaultBinder {
    registry: Arc<TypeRegistry>,
    /// Registration order, so library-wide scans are deterministic.
    user_types: Vec<TypeImport>,
    user_index: FxHashMap<String, usize>,
}

impl DefaultBinder {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            user_types: Vec::new(),
            user_index: FxHashMap::default(),
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Make a registered type nameable from expressions under its short name.
    ///
    /// With `import_as_static` its static members and methods also resolve
    /// unqualified. Names colliding with a built-in name are ignored; a repeated
    /// user name replaces the earlier registration.
    pub fn register_type(
        &mut self,
        type_hash: TypeHash,
        import_as_static: bool,
    ) -> Result<(), RegistrationError> {
        let entry = self
            .registry
            .get(type_hash)
            .ok_or(RegistrationError::UnknownType { hash: type_hash })?;
        let key = entry.name.to_lowercase();
        if BUILTIN_INDEX.contains_key(key.as_str()) {
            debug!(name = %entry.name, "type name shadows a built-in; registration ignored");
            return Ok(());
        }

        let import = TypeImport {
            data_type: entry.data_type(),
            import_as_static,
        };
        debug!(name = %entry.qualified_name(), import_as_static, "registered type");
        match self.user_index.get(&key) {
            Some(&slot) => self.user_types[slot] = import,
            None => {
                self.user_index.insert(key, self.user_types.len());
                self.user_types.push(import);
            }
        }
        Ok(())
    }

    /// Static-import types in lookup order: built-ins first, then user types.
    fn static_imports(&self) -> impl Iterator<Item = DataType> + '_ {
        BUILTIN_TYPES
            .iter()
            .filter(|(_, _, import_as_static)| *import_as_static)
            .map(|&(_, data_type, _)| data_type)
            .chain(
                self.user_types
                    .iter()
                    .filter(|import| import.import_as_static)
                    .map(|import| import.data_type),
            )
            .filter(|data_type| self.registry.contains(data_type.type_hash))
    }

    fn owners(&self, owner: Option<&DataType>) -> Vec<DataType> {
        match owner {
            Some(owner) => vec![*owner],
            None => self.static_imports().collect(),
        }
    }
}

impl Binder for DefaultBinder {
    fn types(&self) -> &TypeRegistry {
        &self.registry
    }

    fn bind_type(&self, name: &Identifier) -> Option<DataType> {
        let key = name.normalized();
        let found = BUILTIN_INDEX
            .get(key.as_str())
            .map(|&(data_type, _)| data_type)
            .or_else(|| {
                self.user_index
                    .get(&key)
                    .map(|&slot| self.user_types[slot].data_type)
            })
            .filter(|data_type| self.registry.contains(data_type.type_hash));
        trace!(name = %name, found = found.is_some(), "bind type");
        found
    }

    fn bind_member(
        &self,
        owner: Option<&DataType>,
        name: &Identifier,
        is_static: bool,
    ) -> Result<Option<Arc<MemberEntry>>, BindError> {
        let mut found: Vec<Arc<MemberEntry>> = Vec::new();
        for owner in self.owners(owner) {
            found.extend(self.registry.find_members(&owner, name.name(), is_static));
        }
        trace!(name = %name, is_static, matches = found.len(), "bind member");

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => {
                debug!(name = %name, matches = found.len(), "ambiguous member");
                let mut candidates: Vec<String> = found
                    .iter()
                    .map(|m| self.registry.member_candidate(m))
                    .collect();
                candidates.sort();
                Err(BindError::AmbiguousMatch { candidates })
            }
        }
    }

    fn bind_method(
        &self,
        owner: Option<&DataType>,
        name: &Identifier,
        arg_types: &[DataType],
        is_static: bool,
    ) -> Result<Option<Arc<MethodEntry>>, BindError> {
        let mut candidates: Vec<Arc<MethodEntry>> = Vec::new();
        for owner in self.owners(owner) {
            candidates.extend(self.registry.find_methods(&owner, name.name(), is_static));
        }
        trace!(name = %name, is_static, candidates = candidates.len(), "bind method");

        match resolve(&self.registry, &candidates, arg_types) {
            Resolution::Match { index, .. } => Ok(Some(Arc::clone(&candidates[index]))),
            Resolution::NoMatch => Ok(None),
            Resolution::Ambiguous(tied) => {
                let mut listed: Vec<String> = tied
                    .into_iter()
                    .map(|i| self.registry.method_candidate(&candidates[i]))
                    .collect();
                listed.sort();
                Err(BindError::AmbiguousMatch { candidates: listed })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_core::{NativeFn, TypeEntry, Value};

    fn registry_with(entries: Vec<TypeEntry>) -> Arc<TypeRegistry> {
        let mut registry = sharpexpr_modules::standard_registry().unwrap();
        for entry in entries {
            registry.register(entry).unwrap();
        }
        Arc::new(registry)
    }

    fn with_value(namespace: &str, name: &str, value: i32) -> TypeEntry {
        TypeEntry::static_class(namespace, name)
            .with_member(MemberEntry::constant("Value", Value::Int32(value)))
    }

    #[test]
    fn built_in_names_are_case_insensitive() {
        let binder = DefaultBinder::new(registry_with(vec![]));
        assert_eq!(
            binder.bind_type(&Identifier::new("INT")),
            Some(DataType::int32())
        );
        assert_eq!(
            binder.bind_type(&Identifier::new("Math")),
            Some(DataType::simple(library::MATH))
        );
        assert_eq!(
            binder.bind_type(&Identifier::new("StringComparison")),
            Some(DataType::simple(library::STRING_COMPARISON))
        );
        assert_eq!(binder.bind_type(&Identifier::new("Widget")), None);
    }

    #[test]
    fn library_types_bind_by_short_name() {
        let binder = DefaultBinder::new(registry_with(vec![]));
        for (name, hash) in [
            ("TimeSpan", library::TIME_SPAN),
            ("datetime", library::DATE_TIME),
            ("Guid", library::GUID),
            ("Regex", library::REGEX),
            ("RegexOptions", library::REGEX_OPTIONS),
        ] {
            assert_eq!(binder.bind_type(&Identifier::new(name)), Some(DataType::simple(hash)));
        }
        let member = binder
            .bind_member(None, &Identifier::new("RemoveEmptyEntries"), true)
            .unwrap()
            .unwrap();
        assert_eq!(member.declaring_type, library::STRING_SPLIT_OPTIONS);
    }

    #[test]
    fn registration_rules() {
        let shadow = TypeEntry::class("App", "Int");
        let shadow_hash = shadow.type_hash;
        let widget = TypeEntry::class("App", "Widget");
        let widget_hash = widget.type_hash;
        let other_widget = TypeEntry::class("Other", "Widget");
        let other_hash = other_widget.type_hash;
        let mut binder = DefaultBinder::new(registry_with(vec![shadow, widget, other_widget]));

        binder.register_type(shadow_hash, false).unwrap();
        assert_eq!(
            binder.bind_type(&Identifier::new("int")),
            Some(DataType::int32())
        );

        binder.register_type(widget_hash, false).unwrap();
        binder.register_type(other_hash, false).unwrap();
        assert_eq!(
            binder.bind_type(&Identifier::new("widget")),
            Some(DataType::simple(other_hash))
        );

        assert_eq!(
            binder.register_type(TypeHash::from_name("App.Missing"), false),
            Err(RegistrationError::UnknownType {
                hash: TypeHash::from_name("App.Missing")
            })
        );
    }

    #[test]
    fn library_wide_member_lookup() {
        let alpha = with_value("App", "Alpha", 1);
        let alpha_hash = alpha.type_hash;
        let mut binder = DefaultBinder::new(registry_with(vec![alpha]));

        assert!(binder
            .bind_member(None, &Identifier::new("value"), true)
            .unwrap()
            .is_none());

        binder.register_type(alpha_hash, true).unwrap();
        let member = binder
            .bind_member(None, &Identifier::new("value"), true)
            .unwrap()
            .unwrap();
        assert_eq!(member.declaring_type, alpha_hash);

        assert!(binder
            .bind_member(None, &Identifier::new("value"), false)
            .unwrap()
            .is_none());
    }

    #[test]
    fn unrelated_imports_are_ambiguous() {
        let alpha = with_value("App", "Alpha", 1);
        let beta = with_value("App", "Beta", 2);
        let (a, b) = (alpha.type_hash, beta.type_hash);
        let mut binder = DefaultBinder::new(registry_with(vec![alpha, beta]));
        binder.register_type(a, true).unwrap();
        binder.register_type(b, true).unwrap();

        let err = binder
            .bind_member(None, &Identifier::new("Value"), true)
            .unwrap_err();
        assert_eq!(
            err,
            BindError::AmbiguousMatch {
                candidates: vec![
                    "Int32 Value (in App.Alpha)".to_string(),
                    "Int32 Value (in App.Beta)".to_string(),
                ]
            }
        );
    }

    #[test]
    fn math_and_mathf_constants_clash() {
        let binder = DefaultBinder::new(registry_with(vec![]));
        let err = binder
            .bind_member(None, &Identifier::new("pi"), true)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ambiguous match found:\n    Double PI (in System.Math)\n    Single PI (in System.MathF)"
        );
    }

    #[test]
    fn method_lookup_resolves_overloads() {
        let binder = DefaultBinder::new(registry_with(vec![]));
        let double = DataType::primitive(PrimitiveKind::Double);
        let math = DataType::simple(library::MATH);

        let max = binder
            .bind_method(Some(&math), &Identifier::new("max"), &[double, DataType::int32()], true)
            .unwrap()
            .unwrap();
        assert_eq!(max.return_type, double);

        let none = binder
            .bind_method(Some(&math), &Identifier::new("max"), &[DataType::string()], true)
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn tied_overloads_list_only_the_tie() {
        let sink = |name: &str, ty: DataType| {
            MethodEntry::static_fn(
                name,
                vec![sharpexpr_core::Param::new("a", ty), sharpexpr_core::Param::new("b", DataType::int32())],
                DataType::void(),
                NativeFn::constant(Value::Null),
            )
        };
        let long = DataType::primitive(PrimitiveKind::Int64);
        let host = TypeEntry::static_class("App", "Host")
            .with_method(sink("Put", long))
            .with_method(MethodEntry::static_fn(
                "Put",
                vec![
                    sharpexpr_core::Param::new("a", DataType::int32()),
                    sharpexpr_core::Param::new("b", long),
                ],
                DataType::void(),
                NativeFn::constant(Value::Null),
            ))
            .with_method(sink("Put", DataType::string()));
        let host_type = host.data_type();
        let binder = DefaultBinder::new(registry_with(vec![host]));

        let err = binder
            .bind_method(
                Some(&host_type),
                &Identifier::new("Put"),
                &[DataType::int32(), DataType::int32()],
                true,
            )
            .unwrap_err();
        let BindError::AmbiguousMatch { candidates } = err else {
            panic!("expected ambiguity");
        };
        assert_eq!(
            candidates,
            vec![
                "Void Put(Int32, Int64) (in App.Host)".to_string(),
                "Void Put(Int64, Int32) (in App.Host)".to_string(),
            ]
        );
    }
}
